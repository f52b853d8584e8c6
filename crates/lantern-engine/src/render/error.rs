use thiserror::Error;

use crate::gl::ShaderStage;

/// Authoring or context error that aborts a frame.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum RenderError {
    #[error("{stage} shader failed to compile:\n{log}")]
    ShaderCompile { stage: ShaderStage, log: String },

    #[error("program failed to link:\n{log}")]
    ProgramLink { log: String },

    #[error("vertex {vertex} has no value for attribute `{attribute}`")]
    MissingAttribute { attribute: String, vertex: usize },

    #[error(
        "attribute `{attribute}` expects {expected} but vertex {vertex} provides {found}"
    )]
    AttributeMismatch {
        attribute: String,
        vertex: usize,
        expected: &'static str,
        found: &'static str,
    },

    #[error("attribute `{attribute}` has a type vertex buffers cannot express ({ty:?})")]
    UnsupportedAttribute {
        attribute: String,
        ty: crate::gl::GlType,
    },

    #[error("geometry needs index {index}, beyond the 16-bit index range")]
    IndexOverflow { index: u64 },

    #[error("index {index} is out of range for geometry with {vertices} vertices")]
    IndexOutOfRange { index: u32, vertices: usize },

    #[error("uniform `{uniform}` expects {expected} but was given {found}")]
    UniformMismatch {
        uniform: String,
        expected: &'static str,
        found: &'static str,
    },

    /// A GPU object could not be created.
    #[error("graphics context error: {0}")]
    Context(String),

    #[error("renderer has no graphics context attached")]
    NotReady,
}
