#![allow(dead_code)]

use swingline_engine::device::{GpuDevice, GpuInit};
use swingline_engine::render::RenderCtx;
use swingline_engine::render::offscreen::COLOR_FORMAT;
use swingline_engine::render::readback::IdMap;
use swingline_engine::render::voronoi::VoronoiRenderer;
use swingline_engine::render::geometry::SeedOffset;
use swingline_engine::config::FULL_COVERAGE_RADIUS;
use swingline_engine::VoronoiConfig;

/// Headless device, preferring hardware and falling back to a software
/// adapter. `None` (with a note on stderr) only when neither exists.
pub fn device() -> Option<GpuDevice> {
    let init = GpuInit::default();
    let hardware = match pollster::block_on(GpuDevice::headless(&init)) {
        Ok(gpu) => return Some(gpu),
        Err(err) => err,
    };
    match pollster::block_on(GpuDevice::headless(&init.fallback())) {
        Ok(gpu) => Some(gpu),
        Err(err) => {
            eprintln!("skipping GPU test: {hardware}; software fallback: {err}");
            None
        }
    }
}

/// Presentation target used in place of a window surface.
pub fn ctx(gpu: &GpuDevice) -> RenderCtx<'_> {
    gpu.render_ctx(COLOR_FORMAT)
}

/// 400x400 config whose cones cover the viewport from any seed.
pub fn covering_config() -> VoronoiConfig {
    VoronoiConfig {
        cone_radius: FULL_COVERAGE_RADIUS,
        ..VoronoiConfig::default()
    }
}

/// Euclidean distance from a seed to a clip-space point.
pub fn distance(seed: &SeedOffset, p: [f32; 2]) -> f32 {
    let dx = p[0] - seed.offset[0];
    let dy = p[1] - seed.offset[1];
    (dx * dx + dy * dy).sqrt()
}

/// Renders `offsets` offscreen and decodes the color attachment.
pub fn render_ids(gpu: &GpuDevice, config: &VoronoiConfig, offsets: &[SeedOffset]) -> IdMap {
    let ctx = ctx(gpu);
    let renderer = VoronoiRenderer::with_offsets(&ctx, config, offsets.to_vec()).unwrap();
    renderer.render_offscreen(&ctx);
    renderer.read_color(&ctx).unwrap().ids()
}
