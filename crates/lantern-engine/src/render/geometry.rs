//! Geometry → GPU buffers.
//!
//! A geometry gets one 16-bit index buffer and, per attribute name, one vertex
//! buffer built from that field of every vertex. Attribute buffers are created
//! on demand, so a geometry drawn by several programs only uploads the
//! attributes some program actually reads.

use std::collections::hash_map::Entry;
use std::collections::HashMap;

use crate::cache::{AttributeBuffer, AttributeSlot, BufferSet, GeometryStore, LinkedProgram};
use crate::gl::{BufferTarget, GraphicsContext, ScalarKind};
use crate::scene::{Geometry, GeometryData};

use super::RenderError;

/// Largest index count addressable with 16-bit indices.
const MAX_INDEXED_VERTICES: usize = u16::MAX as usize + 1;

/// Flattened index triples, or `0..n` for non-indexed modes.
///
/// Every explicit index must name an existing vertex.
pub(crate) fn index_data(geometry: &GeometryData) -> Result<Vec<u16>, RenderError> {
    let vertices = geometry.vertices.len();
    match &geometry.indices {
        Some(triples) => triples
            .iter()
            .flatten()
            .map(|&i| {
                let index = u16::try_from(i)
                    .map_err(|_| RenderError::IndexOverflow { index: u64::from(i) })?;
                if usize::from(index) >= vertices {
                    return Err(RenderError::IndexOutOfRange { index: i, vertices });
                }
                Ok(index)
            })
            .collect(),
        None => {
            let size = geometry.mode.element_size();
            let count = geometry.vertices.len() / size * size;
            if count > MAX_INDEXED_VERTICES {
                return Err(RenderError::IndexOverflow {
                    index: count as u64 - 1,
                });
            }
            Ok((0..count).map(|i| i as u16).collect())
        }
    }
}

/// Packed values of `slot` for every vertex, validated against its type.
pub(crate) fn attribute_data(
    geometry: &GeometryData,
    slot: &AttributeSlot,
) -> Result<AttributeBytes, RenderError> {
    let (components, kind) =
        slot.ty
            .attribute_layout()
            .ok_or_else(|| RenderError::UnsupportedAttribute {
                attribute: slot.name.clone(),
                ty: slot.ty.clone(),
            })?;

    let mut bytes = Vec::with_capacity(geometry.vertices.len() * components * 4);
    for (index, vertex) in geometry.vertices.iter().enumerate() {
        let value = vertex
            .get(&slot.name)
            .ok_or_else(|| RenderError::MissingAttribute {
                attribute: slot.name.clone(),
                vertex: index,
            })?;
        if value.components() != components || value.kind() != kind {
            return Err(RenderError::AttributeMismatch {
                attribute: slot.name.clone(),
                vertex: index,
                expected: slot.ty.glsl_name(),
                found: value.type_name(),
            });
        }
        value.write_bytes(&mut bytes);
    }

    Ok(AttributeBytes {
        bytes,
        components,
        kind,
    })
}

pub(crate) struct AttributeBytes {
    pub(crate) bytes: Vec<u8>,
    pub(crate) components: usize,
    pub(crate) kind: ScalarKind,
}

fn create_buffer_set<C: GraphicsContext>(
    ctx: &mut C,
    geometry: &GeometryData,
) -> Result<BufferSet<C>, RenderError> {
    let indices = index_data(geometry)?;
    let index_buffer = ctx
        .create_buffer(BufferTarget::ElementArray, bytemuck::cast_slice(&indices))
        .map_err(RenderError::Context)?;
    log::debug!("created buffer set with {} indices", indices.len());
    Ok(BufferSet {
        index_buffer,
        index_count: indices.len(),
        attributes: HashMap::new(),
    })
}

impl<C: GraphicsContext> GeometryStore<C> {
    /// Returns the buffer set of `geometry`, creating the index buffer on first
    /// sight and any attribute buffer `program` reads that is not built yet.
    pub(crate) fn resolve(
        &mut self,
        ctx: &mut C,
        geometry: &Geometry,
        program: &LinkedProgram<C>,
    ) -> Result<&BufferSet<C>, RenderError> {
        let data = geometry.shared();
        let id = self.ids.identify(data);

        let set = match self.buffers.entry(id) {
            Entry::Occupied(entry) => entry.into_mut(),
            Entry::Vacant(entry) => entry.insert(create_buffer_set(ctx, data)?),
        };

        for slot in &program.attributes {
            match set.attributes.get(&slot.name) {
                Some(existing) => check_layout(existing, slot, data)?,
                None => {
                    let AttributeBytes {
                        bytes,
                        components,
                        kind,
                    } = attribute_data(data, slot)?;
                    let buffer = ctx
                        .create_buffer(BufferTarget::Array, &bytes)
                        .map_err(RenderError::Context)?;
                    log::debug!("created vertex buffer for attribute `{}`", slot.name);
                    set.attributes.insert(
                        slot.name.clone(),
                        AttributeBuffer {
                            buffer,
                            components,
                            kind,
                        },
                    );
                }
            }
        }

        Ok(&*set)
    }
}

/// A buffer built for another program must match this program's reading of it.
fn check_layout<C: GraphicsContext>(
    existing: &AttributeBuffer<C>,
    slot: &AttributeSlot,
    geometry: &GeometryData,
) -> Result<(), RenderError> {
    if slot.ty.attribute_layout() == Some((existing.components, existing.kind)) {
        return Ok(());
    }
    let found = geometry
        .vertices
        .first()
        .and_then(|v| v.get(&slot.name))
        .map_or("nothing", |v| v.type_name());
    Err(RenderError::AttributeMismatch {
        attribute: slot.name.clone(),
        vertex: 0,
        expected: slot.ty.glsl_name(),
        found,
    })
}

/// Binds the index buffer and every attribute `program` reads.
pub(crate) fn bind<C: GraphicsContext>(
    ctx: &mut C,
    set: &BufferSet<C>,
    program: &LinkedProgram<C>,
) {
    ctx.bind_buffer(BufferTarget::ElementArray, Some(set.index_buffer));
    for slot in &program.attributes {
        if let Some(attribute) = set.attributes.get(&slot.name) {
            ctx.bind_buffer(BufferTarget::Array, Some(attribute.buffer));
            ctx.vertex_attribute(slot.location, attribute.components, attribute.kind);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gl::{GlType, HeadlessContext, ScalarKind, ShaderStage};
    use crate::render::program;
    use crate::scene::{DrawMode, Vertex};

    fn data(mode: DrawMode, vertices: Vec<Vertex>, indices: Option<Vec<[u32; 3]>>) -> GeometryData {
        GeometryData {
            mode,
            vertices,
            indices,
        }
    }

    fn slot(name: &str, ty: GlType) -> AttributeSlot {
        AttributeSlot {
            name: name.to_string(),
            location: 0,
            ty,
        }
    }

    fn position(x: f32) -> Vertex {
        Vertex::new().with("position", [x, 0.0f32])
    }

    #[test]
    fn sequential_indices_cover_whole_elements() {
        let g = data(DrawMode::Triangles, (0..6).map(|i| position(i as f32)).collect(), None);
        assert_eq!(index_data(&g).unwrap(), [0, 1, 2, 3, 4, 5]);

        let g = data(DrawMode::LineStrip, (0..3).map(|i| position(i as f32)).collect(), None);
        assert_eq!(index_data(&g).unwrap(), [0, 1, 2]);
    }

    #[test]
    fn explicit_indices_are_flattened_in_order() {
        let g = data(
            DrawMode::IndexedTriangles,
            (0..4).map(|i| position(i as f32)).collect(),
            Some(vec![[0, 1, 2], [2, 3, 0]]),
        );
        assert_eq!(index_data(&g).unwrap(), [0, 1, 2, 2, 3, 0]);
    }

    #[test]
    fn index_beyond_u16_overflows() {
        let g = data(
            DrawMode::IndexedTriangles,
            vec![position(0.0)],
            Some(vec![[70_000, 0, 0]]),
        );
        assert_eq!(
            index_data(&g),
            Err(RenderError::IndexOverflow { index: 70_000 })
        );
    }

    #[test]
    fn index_past_last_vertex_is_out_of_range() {
        let g = data(
            DrawMode::IndexedTriangles,
            (0..3).map(|i| position(i as f32)).collect(),
            Some(vec![[0, 1, 2], [0, 1, 60_000]]),
        );
        assert_eq!(
            index_data(&g),
            Err(RenderError::IndexOutOfRange {
                index: 60_000,
                vertices: 3,
            })
        );

        let g = data(
            DrawMode::IndexedTriangles,
            (0..3).map(|i| position(i as f32)).collect(),
            Some(vec![[0, 1, 3]]),
        );
        assert_eq!(
            index_data(&g),
            Err(RenderError::IndexOutOfRange {
                index: 3,
                vertices: 3,
            })
        );
    }

    #[test]
    fn out_of_range_geometry_uploads_nothing() {
        let mut ctx = HeadlessContext::new(8, 8);
        let g = data(
            DrawMode::IndexedTriangles,
            (0..3).map(|i| position(i as f32)).collect(),
            Some(vec![[0, 1, 5]]),
        );
        assert!(create_buffer_set(&mut ctx, &g).is_err());
        assert_eq!(ctx.stats().buffers_created, 0);
    }

    #[test]
    fn sequential_indices_overflow_past_65536_vertices() {
        let at_limit = data(DrawMode::Points, vec![position(0.0); 65_536], None);
        assert_eq!(index_data(&at_limit).unwrap().len(), 65_536);

        let over = data(DrawMode::Points, vec![position(0.0); 65_537], None);
        assert_eq!(
            index_data(&over),
            Err(RenderError::IndexOverflow { index: 65_536 })
        );
    }

    #[test]
    fn attribute_data_packs_each_vertex() {
        let g = data(
            DrawMode::Points,
            vec![
                Vertex::new().with("id", [1i32, 2]),
                Vertex::new().with("id", [3i32, 4]),
            ],
            None,
        );
        let packed = attribute_data(&g, &slot("id", GlType::IntVec2)).unwrap();
        assert_eq!(packed.components, 2);
        assert_eq!(packed.kind, ScalarKind::Int);
        assert_eq!(packed.bytes, bytemuck::cast_slice::<i32, u8>(&[1, 2, 3, 4]));
    }

    #[test]
    fn missing_field_names_the_vertex() {
        let g = data(
            DrawMode::Points,
            vec![position(0.0), Vertex::new().with("color", [1.0f32, 1.0, 1.0])],
            None,
        );
        assert_eq!(
            attribute_data(&g, &slot("position", GlType::FloatVec2)).err(),
            Some(RenderError::MissingAttribute {
                attribute: "position".to_string(),
                vertex: 1,
            })
        );
    }

    #[test]
    fn shape_mismatch_is_reported() {
        let g = data(DrawMode::Points, vec![position(0.0)], None);
        assert_eq!(
            attribute_data(&g, &slot("position", GlType::FloatVec3)).err(),
            Some(RenderError::AttributeMismatch {
                attribute: "position".to_string(),
                vertex: 0,
                expected: "vec3",
                found: "vec2",
            })
        );
    }

    #[test]
    fn matrix_attribute_is_unsupported() {
        let g = data(DrawMode::Points, vec![position(0.0)], None);
        assert!(matches!(
            attribute_data(&g, &slot("model", GlType::FloatMat4)),
            Err(RenderError::UnsupportedAttribute { .. })
        ));
    }

    fn linked(ctx: &mut HeadlessContext, vertex_source: &str) -> LinkedProgram<HeadlessContext> {
        let vs = program::compile(ctx, ShaderStage::Vertex, vertex_source).unwrap();
        let fs = program::compile(ctx, ShaderStage::Fragment, "void main() {}").unwrap();
        program::link(ctx, vs, fs).unwrap()
    }

    #[test]
    fn attribute_buffers_are_shared_by_name_across_programs() {
        let mut ctx = HeadlessContext::new(1, 1);
        let mut store = crate::cache::ResourceCache::<HeadlessContext>::new().geometry;
        let geometry = Geometry::triangles([[
            position(0.0).with("weight", 1.0f32),
            position(1.0).with("weight", 1.0f32),
            position(2.0).with("weight", 1.0f32),
        ]]);

        let only_position = linked(&mut ctx, "attribute vec2 position; void main() {}");
        let both = linked(
            &mut ctx,
            "attribute vec2 position; attribute float weight; void main() {}",
        );

        store.resolve(&mut ctx, &geometry, &only_position).unwrap();
        assert_eq!(ctx.stats().buffers_created, 2);

        let set = store.resolve(&mut ctx, &geometry, &both).unwrap();
        assert_eq!(set.attributes.len(), 2);
        assert_eq!(set.index_count, 3);
        // Only `weight` was new.
        assert_eq!(ctx.stats().buffers_created, 3);
        assert_eq!(store.buffers.len(), 1);
    }

    #[test]
    fn conflicting_layout_for_shared_name_is_a_mismatch() {
        let mut ctx = HeadlessContext::new(1, 1);
        let mut store = crate::cache::ResourceCache::<HeadlessContext>::new().geometry;
        let geometry = Geometry::points([position(0.0)]);

        let vec2 = linked(&mut ctx, "attribute vec2 position; void main() {}");
        let vec3 = linked(&mut ctx, "attribute vec3 position; void main() {}");

        store.resolve(&mut ctx, &geometry, &vec2).unwrap();
        assert!(matches!(
            store.resolve(&mut ctx, &geometry, &vec3),
            Err(RenderError::AttributeMismatch { .. })
        ));
    }
}
