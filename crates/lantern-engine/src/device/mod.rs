//! Graphics device setup.
//!
//! This module is responsible for:
//! - describing the drawing buffer the renderer needs ([`ContextAttributes`])
//! - creating the glutin context and window surface, and loading GL ([`GlSurface`])
//! - presenting frames and tracking surface size

mod init;
mod surface;

pub use init::ContextAttributes;
pub use surface::GlSurface;
