use std::sync::Arc;

/// Shader source text shared by every clone of a [`Shader`].
#[derive(Debug)]
pub(crate) struct ShaderSource {
    pub(crate) text: String,
}

/// Handle to GLSL source, usable as either pipeline stage.
///
/// Cloning is cheap and preserves identity: the renderer compiles each handle
/// once per session. Two handles created separately from equal text are
/// compiled separately.
#[derive(Debug, Clone)]
pub struct Shader(Arc<ShaderSource>);

impl Shader {
    pub fn new(source: impl Into<String>) -> Self {
        Self(Arc::new(ShaderSource {
            text: source.into(),
        }))
    }

    #[inline]
    pub fn source(&self) -> &str {
        &self.0.text
    }

    /// `true` if both handles refer to the same source object.
    #[inline]
    pub fn same(&self, other: &Shader) -> bool {
        Arc::ptr_eq(&self.0, &other.0)
    }

    #[inline]
    pub(crate) fn shared(&self) -> &Arc<ShaderSource> {
        &self.0
    }
}
