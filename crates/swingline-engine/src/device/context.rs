use crate::error::{Result, VoronoiError};
use crate::render::offscreen::{COLOR_FORMAT, DEPTH_FORMAT};
use crate::render::RenderCtx;

use super::GpuInit;

/// Adapter + logical device + queue, independent of any window.
///
/// The windowed [`Gpu`](super::Gpu) wraps one of these; offscreen rendering
/// and tests use it directly via [`GpuDevice::headless`].
pub struct GpuDevice {
    adapter: wgpu::Adapter,
    device: wgpu::Device,
    queue: wgpu::Queue,
}

impl GpuDevice {
    /// Acquires a device with no presentation surface.
    pub async fn headless(init: &GpuInit) -> Result<Self> {
        let instance = init.instance();
        Self::request(&instance, None, init).await
    }

    pub(crate) async fn request(
        instance: &wgpu::Instance,
        compatible_surface: Option<&wgpu::Surface<'_>>,
        init: &GpuInit,
    ) -> Result<Self> {
        let adapter = instance
            .request_adapter(&wgpu::RequestAdapterOptions {
                power_preference: wgpu::PowerPreference::HighPerformance,
                compatible_surface,
                force_fallback_adapter: init.force_fallback_adapter,
            })
            .await
            .map_err(|e| VoronoiError::context_init(format!("no suitable GPU adapter: {e}")))?;

        check_capabilities(&adapter)?;

        let (device, queue) = adapter
            .request_device(&wgpu::DeviceDescriptor {
                label: Some("swingline device"),
                required_features: wgpu::Features::empty(),
                required_limits: init.required_limits.clone(),
                experimental_features: wgpu::ExperimentalFeatures::disabled(),
                memory_hints: wgpu::MemoryHints::Performance,
                trace: wgpu::Trace::Off,
            })
            .await
            .map_err(|e| VoronoiError::context_init(format!("device request failed: {e}")))?;

        let info = adapter.get_info();
        log::info!("using {} ({:?}, {:?})", info.name, info.device_type, info.backend);

        Ok(Self { adapter, device, queue })
    }

    pub fn adapter(&self) -> &wgpu::Adapter {
        &self.adapter
    }

    pub fn device(&self) -> &wgpu::Device {
        &self.device
    }

    pub fn queue(&self) -> &wgpu::Queue {
        &self.queue
    }

    /// Renderer-facing view of this device, drawing into `target_format`.
    pub fn render_ctx(&self, target_format: wgpu::TextureFormat) -> RenderCtx<'_> {
        RenderCtx::new(&self.device, &self.queue, target_format)
    }
}

/// The offscreen pass needs a renderable + sampleable 8-bit color format and a
/// float depth attachment.
fn check_capabilities(adapter: &wgpu::Adapter) -> Result<()> {
    let required = [
        (
            COLOR_FORMAT,
            wgpu::TextureUsages::RENDER_ATTACHMENT
                | wgpu::TextureUsages::TEXTURE_BINDING
                | wgpu::TextureUsages::COPY_SRC,
        ),
        (DEPTH_FORMAT, wgpu::TextureUsages::RENDER_ATTACHMENT),
    ];

    for (format, usages) in required {
        let features = adapter.get_texture_format_features(format);
        if !features.allowed_usages.contains(usages) {
            return Err(VoronoiError::context_init(format!(
                "adapter cannot use {format:?} as {usages:?}"
            )));
        }
    }

    Ok(())
}
