//! GPU rendering subsystem.
//!
//! Voronoi-by-depth: every seed is drawn as an instanced cone whose apex sits
//! on the seed, and the depth test keeps, per pixel, the nearest apex. The
//! first pass stamps instance identities into an offscreen color attachment;
//! the second pass copies that attachment texel-for-texel onto the surface.
//!
//! Convention:
//! - CPU geometry is in clip space (`[-1, 1]²`, +Y up).
//! - Cone depth is authored in `[-1, 1]` and remapped to wgpu's `[0, 1]` in
//!   the vertex stage.

mod ctx;
pub mod geometry;
pub mod offscreen;
pub mod readback;
pub mod shader;
pub mod voronoi;

pub use ctx::{RenderCtx, RenderTarget};
