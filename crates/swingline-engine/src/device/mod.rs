//! GPU acquisition.
//!
//! [`GpuDevice`] is the adapter/device/queue triple and works without a
//! window (tests, PNG export). [`Gpu`] adds a window surface on top of one and
//! hands out frames to draw into.

mod context;
mod gpu;
mod init;
mod surface;

pub use context::GpuDevice;
pub use gpu::{Gpu, SurfaceFrame};
pub use init::GpuInit;
pub use surface::SurfaceErrorAction;
