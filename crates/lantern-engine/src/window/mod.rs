//! Window + runtime loop.
//!
//! Owns the `winit` EventLoop and Window, creates the GL surface and drives
//! the [`Renderer`](crate::render::Renderer) once per redraw.

mod runtime;

pub use runtime::{Runtime, RuntimeConfig};
