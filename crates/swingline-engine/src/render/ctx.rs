/// Device handles a renderer needs, plus the format its present pass writes.
///
/// Windowed: built by [`Gpu::render_ctx`](crate::device::Gpu::render_ctx) with
/// the swapchain format. Headless: [`GpuDevice::render_ctx`](crate::device::GpuDevice::render_ctx)
/// with any renderable format.
#[derive(Clone, Copy)]
pub struct RenderCtx<'a> {
    pub device: &'a wgpu::Device,
    pub queue: &'a wgpu::Queue,
    pub target_format: wgpu::TextureFormat,
}

impl<'a> RenderCtx<'a> {
    pub fn new(device: &'a wgpu::Device, queue: &'a wgpu::Queue, target_format: wgpu::TextureFormat) -> Self {
        Self { device, queue, target_format }
    }
}

/// Where the present pass records: an open encoder and the view it clears and
/// draws into. The view's format must equal the `target_format` the renderer
/// was built with.
pub struct RenderTarget<'a> {
    pub encoder: &'a mut wgpu::CommandEncoder,
    pub color_view: &'a wgpu::TextureView,
}

impl<'a> RenderTarget<'a> {
    pub fn new(encoder: &'a mut wgpu::CommandEncoder, color_view: &'a wgpu::TextureView) -> Self {
        Self { encoder, color_view }
    }
}
