use std::path::PathBuf;

use anyhow::Context;
use winit::dpi::PhysicalSize;

use swingline_engine::core::{App, AppControl, FrameCtx};
use swingline_engine::device::{Gpu, GpuInit};
use swingline_engine::logging::{init_logging, LoggingConfig};
use swingline_engine::render::voronoi::VoronoiRenderer;
use swingline_engine::window::{Runtime, RuntimeConfig};
use swingline_engine::{SeedSource, VoronoiConfig};

/// Fixes the seed placement (`u64`).
const SEED_VAR: &str = "SWINGLINE_SEED";
/// Writes the diagram to this path as a PNG after the offscreen pass.
const EXPORT_VAR: &str = "SWINGLINE_EXPORT";

struct SwinglineApp {
    config: VoronoiConfig,
    export: Option<PathBuf>,
    renderer: Option<VoronoiRenderer>,
}

impl App for SwinglineApp {
    fn on_start(&mut self, gpu: &Gpu<'_>) -> anyhow::Result<()> {
        let ctx = gpu.render_ctx();
        let renderer = VoronoiRenderer::new(&ctx, &self.config)?;
        renderer.render_offscreen(&ctx);

        if let Some(path) = &self.export {
            renderer
                .export_png(&ctx, path)
                .with_context(|| format!("failed to export {}", path.display()))?;
        }

        self.renderer = Some(renderer);
        Ok(())
    }

    fn on_frame(&mut self, ctx: &mut FrameCtx<'_, '_>) -> AppControl {
        let Some(renderer) = &self.renderer else {
            return AppControl::Exit;
        };
        ctx.present(|target| renderer.present(target))
    }
}

fn seed_source() -> anyhow::Result<SeedSource> {
    match std::env::var(SEED_VAR) {
        Ok(raw) => {
            let seed = raw
                .trim()
                .parse::<u64>()
                .with_context(|| format!("{SEED_VAR}={raw:?} is not an unsigned integer"))?;
            Ok(SeedSource::Fixed(seed))
        }
        Err(_) => Ok(SeedSource::Entropy),
    }
}

fn run() -> anyhow::Result<()> {
    let config = VoronoiConfig {
        seeds: seed_source()?,
        ..VoronoiConfig::default()
    };
    config.validate()?;

    let app = SwinglineApp {
        export: std::env::var_os(EXPORT_VAR).map(PathBuf::from),
        renderer: None,
        config: config.clone(),
    };

    Runtime::run(
        RuntimeConfig {
            title: "swingline".to_string(),
            initial_size: PhysicalSize::new(config.width, config.height),
        },
        GpuInit::default(),
        app,
    )
}

fn main() {
    init_logging(LoggingConfig::default());

    if let Err(err) = run() {
        eprintln!("swingline: {err:#}");
        std::process::exit(1);
    }
}
