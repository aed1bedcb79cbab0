use anyhow::{Context, Result};
use ouroboros::self_referencing;

use winit::application::ApplicationHandler;
use winit::dpi::PhysicalSize;
use winit::event::WindowEvent;
use winit::event_loop::{ActiveEventLoop, ControlFlow, EventLoop};
use winit::window::{Window, WindowId};

use crate::core::{App, AppControl, FrameCtx};
use crate::device::{Gpu, GpuInit};

/// Window title and size.
///
/// The size is physical so the swapchain and the offscreen target can match
/// pixel for pixel.
#[derive(Debug, Clone)]
pub struct RuntimeConfig {
    pub title: String,
    pub initial_size: PhysicalSize<u32>,
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            title: "swingline".to_string(),
            initial_size: PhysicalSize::new(400, 400),
        }
    }
}

pub struct Runtime;

impl Runtime {
    /// Opens one window and drives `app` until the window closes, the app
    /// returns [`AppControl::Exit`], or startup fails.
    ///
    /// Blocks the calling thread. A startup error (window, GPU or
    /// [`App::on_start`]) is returned after the event loop has shut down.
    pub fn run<A>(config: RuntimeConfig, gpu_init: GpuInit, app: A) -> Result<()>
    where
        A: App + 'static,
    {
        let event_loop = EventLoop::new().context("failed to create winit EventLoop")?;
        let mut handler = Handler {
            config,
            gpu_init,
            app,
            phase: Phase::Pending,
        };

        event_loop
            .run_app(&mut handler)
            .context("winit event loop terminated with error")?;

        match handler.phase {
            Phase::Failed(err) => Err(err),
            _ => Ok(()),
        }
    }
}

/// The window and the surface borrowing it, kept together so neither can
/// outlive the other.
#[self_referencing]
struct Surfaced {
    window: Window,

    #[borrows(window)]
    #[covariant]
    gpu: Gpu<'this>,
}

enum Phase {
    /// Waiting for the platform's first `resumed`.
    Pending,
    Running(Surfaced),
    Closed,
    Failed(anyhow::Error),
}

struct Handler<A> {
    config: RuntimeConfig,
    gpu_init: GpuInit,
    app: A,
    phase: Phase,
}

impl<A: App> Handler<A> {
    fn open(&mut self, event_loop: &ActiveEventLoop) -> Result<Surfaced> {
        let attrs = Window::default_attributes()
            .with_title(self.config.title.clone())
            .with_inner_size(self.config.initial_size);
        let window = event_loop
            .create_window(attrs)
            .context("failed to create window")?;

        let gpu_init = self.gpu_init.clone();
        let surfaced = SurfacedTryBuilder {
            window,
            gpu_builder: |w| pollster::block_on(Gpu::new(w, gpu_init)),
        }
        .try_build()
        .context("GPU initialization failed")?;

        let app = &mut self.app;
        surfaced
            .with_gpu(|gpu| app.on_start(gpu))
            .context("application startup failed")?;

        Ok(surfaced)
    }

    fn close(&mut self, event_loop: &ActiveEventLoop) {
        // Drops the surface before the window.
        self.phase = Phase::Closed;
        event_loop.exit();
    }
}

impl<A: App> ApplicationHandler for Handler<A> {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if !matches!(self.phase, Phase::Pending) {
            return;
        }

        self.phase = match self.open(event_loop) {
            Ok(surfaced) => {
                surfaced.with_window(|w| w.request_redraw());
                Phase::Running(surfaced)
            }
            Err(err) => {
                log::error!("{err:#}");
                event_loop.exit();
                Phase::Failed(err)
            }
        };
    }

    fn about_to_wait(&mut self, event_loop: &ActiveEventLoop) {
        event_loop.set_control_flow(ControlFlow::Wait);

        // Redraw continuously; FIFO presentation paces the loop.
        if let Phase::Running(surfaced) = &self.phase {
            surfaced.with_window(|w| w.request_redraw());
        }
    }

    fn window_event(&mut self, event_loop: &ActiveEventLoop, id: WindowId, event: WindowEvent) {
        let Phase::Running(surfaced) = &mut self.phase else {
            return;
        };
        if surfaced.with_window(|w| w.id()) != id {
            return;
        }

        let app = &mut self.app;
        let mut control = app.on_window_event(&event);

        match &event {
            WindowEvent::CloseRequested => control = AppControl::Exit,

            WindowEvent::Resized(size) => {
                surfaced.with_gpu_mut(|gpu| gpu.resize(*size));
            }

            WindowEvent::ScaleFactorChanged { .. } => {
                let size = surfaced.with_window(|w| w.inner_size());
                surfaced.with_gpu_mut(|gpu| gpu.resize(size));
            }

            WindowEvent::RedrawRequested if control == AppControl::Continue => {
                control = surfaced.with_mut(|fields| {
                    app.on_frame(&mut FrameCtx {
                        window: fields.window,
                        gpu: fields.gpu,
                    })
                });
            }

            _ => {}
        }

        if control == AppControl::Exit {
            log::info!("closing window");
            self.close(event_loop);
        }
    }
}
