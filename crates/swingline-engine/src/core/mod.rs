//! The contract between [`Runtime`](crate::window::Runtime) and the program
//! it drives: one startup hook once a GPU exists, then one call per frame.

mod app;
mod ctx;

pub use app::{App, AppControl};
pub use ctx::FrameCtx;
