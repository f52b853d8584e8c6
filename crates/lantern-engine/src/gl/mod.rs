//! Graphics-context seam.
//!
//! The renderer talks to the GPU only through [`GraphicsContext`]. Two
//! implementations are provided:
//! - [`GlowContext`]: OpenGL / GLES through `glow`
//! - [`HeadlessContext`]: in-memory state machine for tests and headless runs

mod context;
mod glow_backend;
pub mod headless;
mod types;

pub use context::GraphicsContext;
pub use glow_backend::GlowContext;
pub use headless::HeadlessContext;
pub use types::{
    ActiveVariable, BlendFactor, BlendOperation, BufferTarget, Capability, ClearMask,
    CompareFunction, Face, GlType, MagFilter, MinFilter, Primitive, ScalarKind, ShaderStage,
    StencilOperation, TextureUpload, UniformData, Wrap,
};
