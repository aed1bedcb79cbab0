use winit::dpi::PhysicalSize;
use winit::window::Window;

use crate::error::{Result, VoronoiError};
use crate::render::RenderCtx;

use super::surface;
use super::{GpuDevice, GpuInit, SurfaceErrorAction};

/// One acquired swapchain image plus the encoder recording into it.
///
/// Hold it only for the duration of a frame: while it lives, the next
/// swapchain image cannot be acquired.
pub struct SurfaceFrame {
    pub texture: wgpu::SurfaceTexture,
    pub view: wgpu::TextureView,
    pub encoder: wgpu::CommandEncoder,
}

/// A [`GpuDevice`] presenting into one window.
///
/// `'w` is the window borrow; the surface must not outlive the window it was
/// created from.
pub struct Gpu<'w> {
    surface: wgpu::Surface<'w>,
    device: GpuDevice,
    config: wgpu::SurfaceConfiguration,
    size: PhysicalSize<u32>,
}

impl<'w> Gpu<'w> {
    /// Creates the surface, acquires a device able to present to it and
    /// configures the swapchain at the window's current size.
    pub async fn new(window: &'w Window, init: GpuInit) -> Result<Self> {
        let size = window.inner_size();
        if size.width == 0 || size.height == 0 {
            return Err(VoronoiError::context_init("window has zero size"));
        }

        let instance = init.instance();
        let surface = instance
            .create_surface(window)
            .map_err(|e| VoronoiError::context_init(format!("failed to create surface: {e}")))?;

        let device = GpuDevice::request(&instance, Some(&surface), &init).await?;

        let caps = surface.get_capabilities(device.adapter());
        let format = surface::choose_surface_format(&caps, init.prefer_srgb)
            .ok_or_else(|| VoronoiError::context_init("surface advertises no formats"))?;

        let config = wgpu::SurfaceConfiguration {
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            format,
            width: size.width,
            height: size.height,
            present_mode: init.present_mode,
            alpha_mode: surface::choose_alpha_mode(&caps, init.alpha_mode),
            view_formats: vec![],
            desired_maximum_frame_latency: init.desired_maximum_frame_latency,
        };
        surface.configure(device.device(), &config);
        log::debug!("swapchain {format:?} {}x{} ({:?})", size.width, size.height, init.present_mode);

        Ok(Self {
            surface,
            device,
            config,
            size,
        })
    }

    pub fn surface_format(&self) -> wgpu::TextureFormat {
        self.config.format
    }

    /// Last size reported by the window, in physical pixels. May be 0-area
    /// while minimized.
    pub fn size(&self) -> PhysicalSize<u32> {
        self.size
    }

    pub fn device(&self) -> &wgpu::Device {
        self.device.device()
    }

    pub fn queue(&self) -> &wgpu::Queue {
        self.device.queue()
    }

    /// Render context whose present pass targets the swapchain format.
    pub fn render_ctx(&self) -> RenderCtx<'_> {
        self.device.render_ctx(self.config.format)
    }

    pub fn resize(&mut self, new_size: PhysicalSize<u32>) {
        self.size = new_size;
        if surface::resize_config(&mut self.config, new_size) {
            self.surface.configure(self.device.device(), &self.config);
        }
    }

    /// Acquires the next swapchain image and opens an encoder for it.
    pub fn begin_frame(&self) -> std::result::Result<SurfaceFrame, wgpu::SurfaceError> {
        let texture = self.surface.get_current_texture()?;
        let view = texture
            .texture
            .create_view(&wgpu::TextureViewDescriptor::default());
        let encoder = self
            .device()
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("swingline frame encoder"),
            });

        Ok(SurfaceFrame {
            texture,
            view,
            encoder,
        })
    }

    /// Submits the frame's commands and presents its image.
    ///
    /// With FIFO presentation this is where the loop waits for vertical sync.
    pub fn submit(&self, frame: SurfaceFrame) {
        let SurfaceFrame {
            texture,
            view,
            encoder,
        } = frame;
        self.queue().submit(std::iter::once(encoder.finish()));
        drop(view);
        texture.present();
    }

    /// Classifies `err` and rebuilds the swapchain when that is the remedy.
    pub fn handle_surface_error(&mut self, err: wgpu::SurfaceError) -> SurfaceErrorAction {
        let action = SurfaceErrorAction::classify(&err);
        if action == SurfaceErrorAction::Reconfigured && self.size.width > 0 && self.size.height > 0 {
            self.surface.configure(self.device.device(), &self.config);
        }
        action
    }
}
