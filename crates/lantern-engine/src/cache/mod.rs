//! Session-scoped GPU resource cache.
//!
//! Every table here is a memoization table: a key is populated at most once
//! and its entry is never replaced or evicted while the cache lives. The whole
//! cache is dropped together with its [`Renderer`](crate::render::Renderer).

mod identity;
mod store;

pub use identity::{Identity, IdentityTable};
pub use store::{CacheStats, ProgramKey, ResourceCache};

pub(crate) use store::{
    AttributeBuffer, AttributeSlot, BufferSet, GeometryStore, LinkedProgram, ProgramStore,
    TextureStore,
};
