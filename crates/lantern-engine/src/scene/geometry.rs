use std::sync::Arc;

use crate::gl::Primitive;

use super::Vertex;

/// How a geometry's vertices are assembled into primitives.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub enum DrawMode {
    Points,
    Lines,
    LineStrip,
    LineLoop,
    Triangles,
    TriangleStrip,
    TriangleFan,
    IndexedTriangles,
}

impl DrawMode {
    /// Number of vertices (or indices) making up one element.
    #[inline]
    pub fn element_size(self) -> usize {
        match self {
            DrawMode::Triangles | DrawMode::IndexedTriangles => 3,
            DrawMode::Lines => 2,
            _ => 1,
        }
    }

    #[inline]
    pub fn primitive(self) -> Primitive {
        match self {
            DrawMode::Points => Primitive::Points,
            DrawMode::Lines => Primitive::Lines,
            DrawMode::LineStrip => Primitive::LineStrip,
            DrawMode::LineLoop => Primitive::LineLoop,
            DrawMode::Triangles | DrawMode::IndexedTriangles => Primitive::Triangles,
            DrawMode::TriangleStrip => Primitive::TriangleStrip,
            DrawMode::TriangleFan => Primitive::TriangleFan,
        }
    }
}

#[derive(Debug)]
pub(crate) struct GeometryData {
    pub(crate) mode: DrawMode,
    /// Flattened in element order.
    pub(crate) vertices: Vec<Vertex>,
    /// Only for `IndexedTriangles`.
    pub(crate) indices: Option<Vec<[u32; 3]>>,
}

/// Vertex data plus a draw mode.
///
/// Cloning is cheap and preserves identity: GPU buffers are built once per
/// handle and reused by every later draw of it (or of its clones).
#[derive(Debug, Clone)]
pub struct Geometry(Arc<GeometryData>);

impl Geometry {
    fn from_parts(mode: DrawMode, vertices: Vec<Vertex>, indices: Option<Vec<[u32; 3]>>) -> Self {
        Self(Arc::new(GeometryData {
            mode,
            vertices,
            indices,
        }))
    }

    pub fn points(vertices: impl IntoIterator<Item = Vertex>) -> Self {
        Self::from_parts(DrawMode::Points, vertices.into_iter().collect(), None)
    }

    pub fn lines(lines: impl IntoIterator<Item = [Vertex; 2]>) -> Self {
        Self::from_parts(DrawMode::Lines, lines.into_iter().flatten().collect(), None)
    }

    pub fn triangles(triangles: impl IntoIterator<Item = [Vertex; 3]>) -> Self {
        Self::from_parts(
            DrawMode::Triangles,
            triangles.into_iter().flatten().collect(),
            None,
        )
    }

    pub fn line_strip(vertices: impl IntoIterator<Item = Vertex>) -> Self {
        Self::from_parts(DrawMode::LineStrip, vertices.into_iter().collect(), None)
    }

    pub fn line_loop(vertices: impl IntoIterator<Item = Vertex>) -> Self {
        Self::from_parts(DrawMode::LineLoop, vertices.into_iter().collect(), None)
    }

    pub fn triangle_strip(vertices: impl IntoIterator<Item = Vertex>) -> Self {
        Self::from_parts(DrawMode::TriangleStrip, vertices.into_iter().collect(), None)
    }

    pub fn triangle_fan(vertices: impl IntoIterator<Item = Vertex>) -> Self {
        Self::from_parts(DrawMode::TriangleFan, vertices.into_iter().collect(), None)
    }

    /// Shared vertices addressed by index triples.
    pub fn indexed_triangles(
        vertices: impl IntoIterator<Item = Vertex>,
        indices: impl IntoIterator<Item = [u32; 3]>,
    ) -> Self {
        Self::from_parts(
            DrawMode::IndexedTriangles,
            vertices.into_iter().collect(),
            Some(indices.into_iter().collect()),
        )
    }

    #[inline]
    pub fn mode(&self) -> DrawMode {
        self.0.mode
    }

    #[inline]
    pub fn vertices(&self) -> &[Vertex] {
        &self.0.vertices
    }

    #[inline]
    pub fn indices(&self) -> Option<&[[u32; 3]]> {
        self.0.indices.as_deref()
    }

    /// Number of elements (points, lines, triangles, or strip vertices).
    pub fn element_count(&self) -> usize {
        match &self.0.indices {
            Some(indices) => indices.len(),
            None => self.0.vertices.len() / self.0.mode.element_size(),
        }
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.0.vertices.is_empty()
    }

    /// `true` if both handles refer to the same geometry object.
    #[inline]
    pub fn same(&self, other: &Geometry) -> bool {
        Arc::ptr_eq(&self.0, &other.0)
    }

    #[inline]
    pub(crate) fn shared(&self) -> &Arc<GeometryData> {
        &self.0
    }
}
