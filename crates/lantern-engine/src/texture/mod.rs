//! Textures.
//!
//! Responsibilities:
//! - hold decoded RGBA8 pixels behind a cheap-to-clone [`Texture`] handle
//! - validate sizes against the sampling options
//! - decode encoded images off the render thread ([`load`])
//!
//! Upload to the GPU happens lazily in the renderer, the first time a texture
//! is bound to a sampler.

mod error;
mod handle;
mod loader;

pub use error::TextureError;
pub use handle::{validate_size, Texture, TextureOptions};
pub use loader::{decode, load, PendingTexture, TextureSource};

pub(crate) use handle::TextureData;
