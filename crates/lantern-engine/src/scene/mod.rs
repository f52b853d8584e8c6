//! Scene (entity) types.
//!
//! Responsibilities:
//! - describe one draw as an immutable [`Entity`]
//! - provide cheap-to-clone handles ([`Shader`], [`Geometry`]) whose identity,
//!   not content, drives GPU caching
//! - carry uniform values and per-draw render settings

mod entity;
mod geometry;
mod setting;
mod shader;
mod uniform;
mod vertex;

pub use entity::Entity;
pub use geometry::{DrawMode, Geometry};
pub use setting::{BlendEquation, Setting, StencilFace};
pub use shader::Shader;
pub use uniform::{UniformValue, Uniforms};
pub use vertex::{AttributeValue, Vertex};

pub(crate) use geometry::GeometryData;
pub(crate) use shader::ShaderSource;
