//! Lantern engine crate.
//!
//! Turns per-frame lists of scene entities into OpenGL draw calls, creating
//! every GPU object lazily and caching it for the rest of the session.
//!
//! Layers, bottom up:
//! - [`gl`]: the graphics-context seam, with a glow backend and a headless one
//! - [`scene`]: shaders, geometry, uniforms, settings and entities
//! - [`texture`]: texture handles and asynchronous loading
//! - [`cache`]: identity tables and the session resource cache
//! - [`render`]: the draw orchestrator and its compilers
//! - [`device`], [`window`], [`app`]: glutin/winit hosting

pub mod app;
pub mod cache;
pub mod device;
pub mod gl;
pub mod logging;
pub mod render;
pub mod scene;
pub mod texture;
pub mod window;
