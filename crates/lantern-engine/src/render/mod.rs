//! Draw-command compiler.
//!
//! [`Renderer`] turns an entity list into GL calls once per frame. Each step
//! has its own module:
//! - `program`: shader compilation and linking
//! - `uniforms`: per-program uniform setter tables
//! - `geometry`: index and vertex buffers
//! - `texture`: lazy texture upload
//! - [`settings`]: per-draw render state apply/revert

mod error;
mod geometry;
mod program;
mod renderer;
pub mod settings;
mod texture;
mod uniforms;

pub use error::RenderError;
pub use renderer::{FrameReport, Renderer, SessionState};

pub(crate) use uniforms::UniformTable;
