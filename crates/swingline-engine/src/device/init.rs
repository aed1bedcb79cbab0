/// Options for adapter, device and swapchain creation.
///
/// Shared by the windowed [`Gpu`](super::Gpu) and [`GpuDevice::headless`](super::GpuDevice::headless);
/// the swapchain fields are ignored by the latter.
#[derive(Debug, Clone)]
pub struct GpuInit {
    /// Use an sRGB swapchain format when one is offered.
    ///
    /// Off by default so the encoded identity colors are displayed unaltered.
    pub prefer_srgb: bool,

    pub present_mode: wgpu::PresentMode,

    /// Requested composite alpha; replaced by the first supported mode when
    /// the surface does not offer it.
    pub alpha_mode: Option<wgpu::CompositeAlphaMode>,

    pub backends: wgpu::Backends,

    /// Ask for a software adapter (lavapipe, WARP, ...) instead of hardware.
    pub force_fallback_adapter: bool,

    pub required_limits: wgpu::Limits,

    /// Swapchain latency hint.
    pub desired_maximum_frame_latency: u32,
}

impl Default for GpuInit {
    fn default() -> Self {
        Self {
            prefer_srgb: false,
            // Vsync-paced; every backend supports it.
            present_mode: wgpu::PresentMode::Fifo,
            alpha_mode: None,
            backends: wgpu::Backends::all(),
            force_fallback_adapter: false,
            required_limits: wgpu::Limits::downlevel_defaults(),
            desired_maximum_frame_latency: 2,
        }
    }
}

impl GpuInit {
    /// Same options, asking for a software adapter.
    pub fn fallback(&self) -> Self {
        Self {
            force_fallback_adapter: true,
            ..self.clone()
        }
    }

    pub(crate) fn instance(&self) -> wgpu::Instance {
        wgpu::Instance::new(&wgpu::InstanceDescriptor {
            backends: self.backends,
            ..Default::default()
        })
    }
}
