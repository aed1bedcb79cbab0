use winit::event::WindowEvent;

use crate::device::Gpu;

use super::ctx::FrameCtx;

/// Whether the runtime should keep going after a callback.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum AppControl {
    Continue,
    Exit,
}

pub trait App {
    /// Runs once, after the window and its [`Gpu`] exist and before the first
    /// frame. Build GPU resources and run one-off passes here.
    ///
    /// Returning an error closes the window; [`Runtime::run`](crate::window::Runtime::run)
    /// then returns that error.
    fn on_start(&mut self, gpu: &Gpu<'_>) -> anyhow::Result<()>;

    /// Sees every window event before the runtime handles it.
    fn on_window_event(&mut self, event: &WindowEvent) -> AppControl {
        let _ = event;
        AppControl::Continue
    }

    fn on_frame(&mut self, ctx: &mut FrameCtx<'_, '_>) -> AppControl;
}
