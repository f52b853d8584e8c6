//! Backend-neutral vocabulary for the graphics-context seam.
//!
//! These enums mirror the GL/GLES state machine closely enough that every value
//! maps to exactly one GL constant (see `gl::glow_backend`), while staying free of raw
//! `u32` enums in the core.

/// Programmable pipeline stage.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub enum ShaderStage {
    Vertex,
    Fragment,
}

impl std::fmt::Display for ShaderStage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ShaderStage::Vertex => f.write_str("vertex"),
            ShaderStage::Fragment => f.write_str("fragment"),
        }
    }
}

/// Type of an active attribute or uniform, as reported by program reflection.
#[derive(Debug, Clone, Eq, PartialEq, Hash)]
pub enum GlType {
    Float,
    FloatVec2,
    FloatVec3,
    FloatVec4,
    Int,
    IntVec2,
    IntVec3,
    IntVec4,
    Bool,
    FloatMat4,
    Sampler2d,
    /// Any other type the backend reports (matrices other than 4x4, cube
    /// samplers, ...). Carries the raw backend enum for diagnostics.
    Other(u32),
}

impl GlType {
    /// Component count and numeric kind for types usable as vertex attributes.
    pub fn attribute_layout(&self) -> Option<(usize, ScalarKind)> {
        match self {
            GlType::Float => Some((1, ScalarKind::Float)),
            GlType::FloatVec2 => Some((2, ScalarKind::Float)),
            GlType::FloatVec3 => Some((3, ScalarKind::Float)),
            GlType::FloatVec4 => Some((4, ScalarKind::Float)),
            GlType::Int => Some((1, ScalarKind::Int)),
            GlType::IntVec2 => Some((2, ScalarKind::Int)),
            GlType::IntVec3 => Some((3, ScalarKind::Int)),
            GlType::IntVec4 => Some((4, ScalarKind::Int)),
            _ => None,
        }
    }

    /// GLSL spelling, for diagnostics.
    pub fn glsl_name(&self) -> &'static str {
        match self {
            GlType::Float => "float",
            GlType::FloatVec2 => "vec2",
            GlType::FloatVec3 => "vec3",
            GlType::FloatVec4 => "vec4",
            GlType::Int => "int",
            GlType::IntVec2 => "ivec2",
            GlType::IntVec3 => "ivec3",
            GlType::IntVec4 => "ivec4",
            GlType::Bool => "bool",
            GlType::FloatMat4 => "mat4",
            GlType::Sampler2d => "sampler2D",
            GlType::Other(_) => "unsupported type",
        }
    }
}

/// Numeric kind of vertex attribute data.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub enum ScalarKind {
    Float,
    Int,
}

/// One entry of a program's active attribute or uniform list.
#[derive(Debug, Clone, Eq, PartialEq)]
pub struct ActiveVariable {
    pub name: String,
    pub ty: GlType,
    /// Array length (1 for non-arrays).
    pub size: i32,
}

/// Draw primitive topology.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub enum Primitive {
    Points,
    Lines,
    LineStrip,
    LineLoop,
    Triangles,
    TriangleStrip,
    TriangleFan,
}

/// Buffer binding point.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub enum BufferTarget {
    Array,
    ElementArray,
}

/// Toggleable pipeline capability.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub enum Capability {
    Blend,
    DepthTest,
    StencilTest,
    ScissorTest,
    CullFace,
    PolygonOffsetFill,
    SampleCoverage,
    SampleAlphaToCoverage,
}

impl Capability {
    pub const ALL: [Capability; 8] = [
        Capability::Blend,
        Capability::DepthTest,
        Capability::StencilTest,
        Capability::ScissorTest,
        Capability::CullFace,
        Capability::PolygonOffsetFill,
        Capability::SampleCoverage,
        Capability::SampleAlphaToCoverage,
    ];
}

#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub enum BlendOperation {
    Add,
    Subtract,
    ReverseSubtract,
}

#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub enum BlendFactor {
    Zero,
    One,
    SrcColor,
    OneMinusSrcColor,
    DstColor,
    OneMinusDstColor,
    SrcAlpha,
    OneMinusSrcAlpha,
    DstAlpha,
    OneMinusDstAlpha,
    ConstantColor,
    OneMinusConstantColor,
    ConstantAlpha,
    OneMinusConstantAlpha,
    SrcAlphaSaturate,
}

/// Depth and stencil comparison function.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub enum CompareFunction {
    Never,
    Always,
    Less,
    LessOrEqual,
    Equal,
    GreaterOrEqual,
    Greater,
    NotEqual,
}

#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub enum StencilOperation {
    Keep,
    Zero,
    Replace,
    Increment,
    Decrement,
    Invert,
    IncrementWrap,
    DecrementWrap,
}

#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub enum Face {
    Front,
    Back,
    FrontAndBack,
}

/// Buffers affected by a clear.
#[derive(Debug, Copy, Clone, Default, Eq, PartialEq)]
pub struct ClearMask {
    pub color: bool,
    pub depth: bool,
    pub stencil: bool,
}

/// Value written to a uniform location.
#[derive(Debug, Copy, Clone, PartialEq)]
pub enum UniformData {
    Int(i32),
    Float(f32),
    Vec2([f32; 2]),
    Vec3([f32; 3]),
    Vec4([f32; 4]),
    /// Column-major, uploaded without transpose.
    Mat4([f32; 16]),
}

#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub enum MagFilter {
    Linear,
    Nearest,
}

#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub enum MinFilter {
    Linear,
    Nearest,
    NearestMipmapNearest,
    LinearMipmapNearest,
    NearestMipmapLinear,
    LinearMipmapLinear,
}

impl MinFilter {
    #[inline]
    pub fn uses_mipmaps(self) -> bool {
        !matches!(self, MinFilter::Linear | MinFilter::Nearest)
    }
}

#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub enum Wrap {
    Repeat,
    ClampToEdge,
    MirroredRepeat,
}

/// Everything a backend needs to create and parameterize a 2D RGBA8 texture.
///
/// `pixels` are tightly packed rows, already flipped when flip-Y was requested.
#[derive(Debug, Clone, Copy)]
pub struct TextureUpload<'a> {
    pub width: u32,
    pub height: u32,
    pub pixels: &'a [u8],
    pub mag_filter: MagFilter,
    pub min_filter: MinFilter,
    pub wrap_s: Wrap,
    pub wrap_t: Wrap,
    pub generate_mipmaps: bool,
}
