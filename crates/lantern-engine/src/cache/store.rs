use std::collections::HashMap;

use crate::gl::{GlType, GraphicsContext, ScalarKind};
use crate::render::UniformTable;
use crate::scene::{GeometryData, ShaderSource};
use crate::texture::TextureData;

use super::{Identity, IdentityTable};

/// Cache key of a linked program: (vertex shader, fragment shader), in that order.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub struct ProgramKey {
    pub vertex: Identity,
    pub fragment: Identity,
}

/// One active vertex attribute of a linked program.
#[derive(Debug, Clone)]
pub(crate) struct AttributeSlot {
    pub(crate) name: String,
    pub(crate) location: u32,
    pub(crate) ty: GlType,
}

pub(crate) struct LinkedProgram<C: GraphicsContext> {
    pub(crate) program: C::Program,
    /// Enumerated once, right after linking.
    pub(crate) attributes: Vec<AttributeSlot>,
}

/// Shader identities, compiled shaders and linked programs.
pub(crate) struct ProgramStore<C: GraphicsContext> {
    pub(crate) ids: IdentityTable<ShaderSource>,
    pub(crate) shaders: HashMap<Identity, C::Shader>,
    pub(crate) programs: HashMap<ProgramKey, LinkedProgram<C>>,
}

/// Vertex buffer holding one attribute of every vertex.
pub(crate) struct AttributeBuffer<C: GraphicsContext> {
    pub(crate) buffer: C::Buffer,
    pub(crate) components: usize,
    pub(crate) kind: ScalarKind,
}

/// GPU buffers built for one geometry.
pub(crate) struct BufferSet<C: GraphicsContext> {
    pub(crate) index_buffer: C::Buffer,
    pub(crate) index_count: usize,
    /// Attribute name → vertex buffer. Grows as programs with new attribute
    /// names draw the geometry; entries are never replaced.
    pub(crate) attributes: HashMap<String, AttributeBuffer<C>>,
}

/// Geometry identities and their buffer sets.
pub(crate) struct GeometryStore<C: GraphicsContext> {
    pub(crate) ids: IdentityTable<GeometryData>,
    pub(crate) buffers: HashMap<Identity, BufferSet<C>>,
}

/// Texture identities and realized GPU textures.
pub(crate) struct TextureStore<C: GraphicsContext> {
    pub(crate) ids: IdentityTable<TextureData>,
    pub(crate) realized: HashMap<Identity, C::Texture>,
}

/// Realized GPU objects keyed by the identity of the scene handles that
/// produced them.
pub struct ResourceCache<C: GraphicsContext> {
    pub(crate) programs: ProgramStore<C>,
    pub(crate) uniform_tables: HashMap<ProgramKey, UniformTable<C>>,
    pub(crate) geometry: GeometryStore<C>,
    pub(crate) textures: TextureStore<C>,
}

/// Entry counts per table.
#[derive(Debug, Copy, Clone, Default, Eq, PartialEq)]
pub struct CacheStats {
    pub shaders: usize,
    pub programs: usize,
    pub uniform_tables: usize,
    /// Geometries that received an identity.
    pub geometries_seen: usize,
    pub buffer_sets: usize,
    pub attribute_buffers: usize,
    pub textures: usize,
}

impl<C: GraphicsContext> Default for ResourceCache<C> {
    fn default() -> Self {
        Self {
            programs: ProgramStore {
                ids: IdentityTable::new(),
                shaders: HashMap::new(),
                programs: HashMap::new(),
            },
            uniform_tables: HashMap::new(),
            geometry: GeometryStore {
                ids: IdentityTable::new(),
                buffers: HashMap::new(),
            },
            textures: TextureStore {
                ids: IdentityTable::new(),
                realized: HashMap::new(),
            },
        }
    }
}

impl<C: GraphicsContext> ResourceCache<C> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn stats(&self) -> CacheStats {
        CacheStats {
            shaders: self.programs.shaders.len(),
            programs: self.programs.programs.len(),
            uniform_tables: self.uniform_tables.len(),
            geometries_seen: self.geometry.ids.len(),
            buffer_sets: self.geometry.buffers.len(),
            attribute_buffers: self
                .geometry
                .buffers
                .values()
                .map(|b| b.attributes.len())
                .sum(),
            textures: self.textures.realized.len(),
        }
    }
}

impl<C: GraphicsContext> std::fmt::Debug for ResourceCache<C> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ResourceCache")
            .field("stats", &self.stats())
            .finish()
    }
}
