//! The winit event loop and the single window it owns.

mod runtime;

pub use runtime::{Runtime, RuntimeConfig};
