use thiserror::Error;

/// Outcome of a failed texture load.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TextureError {
    /// The source could not be read or decoded.
    #[error("texture load failed: {0}")]
    Load(String),
    /// Non-power-of-two dimensions with mipmapping or repeat wrapping.
    #[error("texture size {width}x{height} requires clamp-to-edge wrapping and a non-mipmap minify filter")]
    Size { width: u32, height: u32 },
}
