use winit::window::Window;

use crate::device::{Gpu, SurfaceErrorAction};
use crate::render::RenderTarget;

use super::app::AppControl;

/// What `App::on_frame` may touch: the window and its GPU.
///
/// `'a` is the callback, `'w` the window borrow inside [`Gpu`].
pub struct FrameCtx<'a, 'w> {
    pub window: &'a Window,
    pub gpu: &'a mut Gpu<'w>,
}

impl FrameCtx<'_, '_> {
    /// Records `draw` into the next swapchain image and presents it.
    ///
    /// A failed acquire is resolved through [`Gpu::handle_surface_error`]:
    /// only a fatal error turns into `Exit`, anything else skips the frame.
    pub fn present<F>(&mut self, draw: F) -> AppControl
    where
        F: FnOnce(&mut RenderTarget<'_>),
    {
        let mut frame = match self.gpu.begin_frame() {
            Ok(frame) => frame,
            Err(err) => {
                log::warn!("could not acquire frame: {err}");
                return match self.gpu.handle_surface_error(err) {
                    SurfaceErrorAction::Fatal => AppControl::Exit,
                    _ => AppControl::Continue,
                };
            }
        };

        draw(&mut RenderTarget::new(&mut frame.encoder, &frame.view));

        self.window.pre_present_notify();
        self.gpu.submit(frame);
        AppControl::Continue
    }
}
