//! Swingline engine crate.
//!
//! Draws a Voronoi diagram on the GPU by rendering one depth-tested cone per
//! seed into an offscreen target, then copies that target to a window every
//! frame. Each pixel of the offscreen color attachment encodes the index of
//! the seed that owns it, so the target doubles as a lookup table.
//!
//! Layers, bottom up:
//! - [`encoding`]: instance index <-> 24-bit RGB
//! - [`device`]: wgpu adapter/device/surface acquisition
//! - [`render`]: geometry, shader programs, offscreen target, passes, readback
//! - [`window`] + [`core`]: the winit runtime and the application contract

pub mod config;
pub mod core;
pub mod device;
pub mod encoding;
pub mod error;
pub mod logging;
pub mod render;
pub mod window;

pub use config::{SeedSource, VoronoiConfig};
pub use error::{Result, VoronoiError};
