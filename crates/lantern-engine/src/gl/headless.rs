//! In-memory graphics context.
//!
//! `HeadlessContext` tracks GL state the way a driver would (capabilities,
//! masks, bound objects, uniform values) without rasterizing anything. It is
//! used by the test suite and for headless runs where no window exists.
//!
//! Reflection is emulated: every `attribute`/`in` (vertex stage) and `uniform`
//! declaration is reported as active, with GLSL types mapped to [`GlType`].
//! Compilation fails for sources without a `main` entry point or containing an
//! `#error` directive; linking fails when a fragment input has no matching
//! vertex output or a uniform is declared with conflicting types.

use std::collections::{HashMap, HashSet};

use super::context::GraphicsContext;
use super::types::{
    ActiveVariable, BlendFactor, BlendOperation, BufferTarget, Capability, ClearMask,
    CompareFunction, Face, GlType, MagFilter, MinFilter, Primitive, ScalarKind, ShaderStage,
    StencilOperation, TextureUpload, UniformData, Wrap,
};

#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub struct ShaderHandle(u32);

#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub struct ProgramHandle(u32);

#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub struct BufferHandle(u32);

#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub struct TextureHandle(u32);

#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub struct UniformLocation {
    program: ProgramHandle,
    index: usize,
}

/// Per-face stencil state.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct StencilFaceState {
    pub func: CompareFunction,
    pub reference: i32,
    pub mask: u32,
    pub fail: StencilOperation,
    pub depth_fail: StencilOperation,
    pub pass: StencilOperation,
    pub write_mask: u32,
}

impl Default for StencilFaceState {
    fn default() -> Self {
        Self {
            func: CompareFunction::Always,
            reference: 0,
            mask: u32::MAX,
            fail: StencilOperation::Keep,
            depth_fail: StencilOperation::Keep,
            pass: StencilOperation::Keep,
            write_mask: u32::MAX,
        }
    }
}

/// Snapshot of fixed-function state. Defaults match a freshly created GL context.
#[derive(Debug, Clone, PartialEq)]
pub struct PipelineState {
    pub enabled: HashSet<Capability>,
    pub blend_color: [f32; 4],
    pub blend_equation: (BlendOperation, BlendOperation),
    pub blend_func: [BlendFactor; 4],
    pub depth_func: CompareFunction,
    pub depth_mask: bool,
    pub depth_range: (f32, f32),
    pub stencil_front: StencilFaceState,
    pub stencil_back: StencilFaceState,
    pub scissor: [i32; 4],
    pub color_mask: [bool; 4],
    pub cull_face: Face,
    pub polygon_offset: (f32, f32),
    pub sample_coverage: (f32, bool),
    pub clear_color: [f32; 4],
    pub clear_depth: f32,
    pub clear_stencil: i32,
    pub viewport: [i32; 4],
}

impl Default for PipelineState {
    fn default() -> Self {
        Self {
            enabled: HashSet::new(),
            blend_color: [0.0; 4],
            blend_equation: (BlendOperation::Add, BlendOperation::Add),
            blend_func: [
                BlendFactor::One,
                BlendFactor::Zero,
                BlendFactor::One,
                BlendFactor::Zero,
            ],
            depth_func: CompareFunction::Less,
            depth_mask: true,
            depth_range: (0.0, 1.0),
            stencil_front: StencilFaceState::default(),
            stencil_back: StencilFaceState::default(),
            scissor: [0; 4],
            color_mask: [true; 4],
            cull_face: Face::Back,
            polygon_offset: (0.0, 0.0),
            sample_coverage: (1.0, false),
            clear_color: [0.0; 4],
            clear_depth: 1.0,
            clear_stencil: 0,
            viewport: [0; 4],
        }
    }
}

impl PipelineState {
    #[inline]
    pub fn is_enabled(&self, capability: Capability) -> bool {
        self.enabled.contains(&capability)
    }

    fn stencil_faces(&mut self, face: Face) -> impl Iterator<Item = &mut StencilFaceState> {
        let (front, back) = match face {
            Face::Front => (true, false),
            Face::Back => (false, true),
            Face::FrontAndBack => (true, true),
        };
        let PipelineState {
            stencil_front,
            stencil_back,
            ..
        } = self;
        [(front, stencil_front), (back, stencil_back)]
            .into_iter()
            .filter_map(|(selected, state)| selected.then_some(state))
    }
}

/// One recorded `draw_elements` call.
#[derive(Debug, Clone)]
pub struct DrawRecord {
    pub program: Option<ProgramHandle>,
    pub primitive: Primitive,
    pub count: usize,
    /// Contents of the bound element buffer at draw time.
    pub indices: Vec<u16>,
    /// Attribute location → (buffer, components, kind).
    pub attributes: HashMap<u32, (BufferHandle, usize, ScalarKind)>,
    /// Texture unit → texture.
    pub textures: HashMap<u32, TextureHandle>,
    pub state: PipelineState,
}

/// Object-creation counters.
#[derive(Debug, Copy, Clone, Default, Eq, PartialEq)]
pub struct HeadlessStats {
    pub shaders_compiled: usize,
    pub programs_linked: usize,
    pub buffers_created: usize,
    pub textures_created: usize,
    pub clears: usize,
}

/// A texture as stored by the headless context.
#[derive(Debug, Clone)]
pub struct TextureRecord {
    pub width: u32,
    pub height: u32,
    pub pixels: Vec<u8>,
    pub mag_filter: MagFilter,
    pub min_filter: MinFilter,
    pub wrap_s: Wrap,
    pub wrap_t: Wrap,
    pub mipmapped: bool,
}

#[derive(Debug, Clone)]
struct ShaderRecord {
    stage: ShaderStage,
    declarations: Vec<Declaration>,
}

#[derive(Debug, Clone)]
struct ProgramRecord {
    attributes: Vec<ActiveVariable>,
    uniforms: Vec<ActiveVariable>,
    uniform_values: HashMap<usize, UniformData>,
}

#[derive(Debug, Clone)]
struct BufferRecord {
    data: Vec<u8>,
}

/// Headless [`GraphicsContext`] implementation.
#[derive(Debug)]
pub struct HeadlessContext {
    size: (u32, u32),
    next_handle: u32,

    shaders: HashMap<ShaderHandle, ShaderRecord>,
    programs: HashMap<ProgramHandle, ProgramRecord>,
    buffers: HashMap<BufferHandle, BufferRecord>,
    textures: HashMap<TextureHandle, TextureRecord>,

    current_program: Option<ProgramHandle>,
    array_binding: Option<BufferHandle>,
    element_binding: Option<BufferHandle>,
    attribute_bindings: HashMap<u32, (BufferHandle, usize, ScalarKind)>,
    texture_units: HashMap<u32, TextureHandle>,

    state: PipelineState,
    draws: Vec<DrawRecord>,
    stats: HeadlessStats,
}

impl HeadlessContext {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            size: (width, height),
            next_handle: 1,
            shaders: HashMap::new(),
            programs: HashMap::new(),
            buffers: HashMap::new(),
            textures: HashMap::new(),
            current_program: None,
            array_binding: None,
            element_binding: None,
            attribute_bindings: HashMap::new(),
            texture_units: HashMap::new(),
            state: PipelineState::default(),
            draws: Vec::new(),
            stats: HeadlessStats::default(),
        }
    }

    pub fn resize(&mut self, width: u32, height: u32) {
        self.size = (width, height);
    }

    pub fn state(&self) -> &PipelineState {
        &self.state
    }

    pub fn stats(&self) -> HeadlessStats {
        self.stats
    }

    /// Draw calls recorded since creation (or the last [`take_draws`](Self::take_draws)).
    pub fn draws(&self) -> &[DrawRecord] {
        &self.draws
    }

    pub fn take_draws(&mut self) -> Vec<DrawRecord> {
        std::mem::take(&mut self.draws)
    }

    /// Last value written to the uniform `name` of `program`.
    pub fn uniform_value(&self, program: ProgramHandle, name: &str) -> Option<UniformData> {
        let record = self.programs.get(&program)?;
        let index = record.uniforms.iter().position(|u| u.name == name)?;
        record.uniform_values.get(&index).copied()
    }

    pub fn buffer_data(&self, buffer: BufferHandle) -> Option<&[u8]> {
        self.buffers.get(&buffer).map(|b| b.data.as_slice())
    }

    pub fn texture(&self, texture: TextureHandle) -> Option<&TextureRecord> {
        self.textures.get(&texture)
    }

    fn next(&mut self) -> u32 {
        let h = self.next_handle;
        self.next_handle = self.next_handle.wrapping_add(1);
        h
    }
}

impl GraphicsContext for HeadlessContext {
    type Shader = ShaderHandle;
    type Program = ProgramHandle;
    type Buffer = BufferHandle;
    type Texture = TextureHandle;
    type UniformLocation = UniformLocation;

    fn compile_shader(&mut self, stage: ShaderStage, source: &str) -> Result<Self::Shader, String> {
        let source = strip_comments(source);

        if let Some((line, message)) = source
            .lines()
            .enumerate()
            .find_map(|(i, l)| l.trim().strip_prefix("#error").map(|m| (i + 1, m.trim())))
        {
            return Err(format!("ERROR: 0:{line}: '#error' : {message}"));
        }
        if !source.contains("void main") {
            return Err("ERROR: 0:0: 'main' : function not defined".to_string());
        }

        let declarations = parse_declarations(stage, &source);
        let handle = ShaderHandle(self.next());
        self.shaders.insert(
            handle,
            ShaderRecord {
                stage,
                declarations,
            },
        );
        self.stats.shaders_compiled += 1;
        Ok(handle)
    }

    fn link_program(
        &mut self,
        vertex: Self::Shader,
        fragment: Self::Shader,
    ) -> Result<Self::Program, String> {
        let vs = self
            .shaders
            .get(&vertex)
            .ok_or_else(|| "ERROR: invalid vertex shader object".to_string())?;
        let fs = self
            .shaders
            .get(&fragment)
            .ok_or_else(|| "ERROR: invalid fragment shader object".to_string())?;
        if vs.stage != ShaderStage::Vertex || fs.stage != ShaderStage::Fragment {
            return Err("ERROR: program requires one vertex and one fragment shader".to_string());
        }

        for input in fs.declarations.iter().filter(|d| d.kind == DeclKind::Varying) {
            let written = vs
                .declarations
                .iter()
                .any(|d| d.kind == DeclKind::Varying && d.name == input.name && d.ty == input.ty);
            if !written {
                return Err(format!(
                    "ERROR: Varying `{}` not written by vertex shader",
                    input.name
                ));
            }
        }

        let attributes = vs
            .declarations
            .iter()
            .filter(|d| d.kind == DeclKind::Attribute)
            .map(Declaration::to_active)
            .collect();

        let mut uniforms: Vec<ActiveVariable> = Vec::new();
        for decl in vs
            .declarations
            .iter()
            .chain(fs.declarations.iter())
            .filter(|d| d.kind == DeclKind::Uniform)
        {
            let active = decl.to_active();
            match uniforms.iter().find(|u| u.name == active.name) {
                Some(existing) if existing.ty != active.ty => {
                    return Err(format!(
                        "ERROR: Uniform `{}` declared with different types",
                        decl.name
                    ));
                }
                Some(_) => {}
                None => uniforms.push(active),
            }
        }

        let handle = ProgramHandle(self.next());
        self.programs.insert(
            handle,
            ProgramRecord {
                attributes,
                uniforms,
                uniform_values: HashMap::new(),
            },
        );
        self.stats.programs_linked += 1;
        Ok(handle)
    }

    fn use_program(&mut self, program: Self::Program) {
        self.current_program = Some(program);
    }

    fn active_attributes(&self, program: Self::Program) -> Vec<ActiveVariable> {
        self.programs
            .get(&program)
            .map(|p| p.attributes.clone())
            .unwrap_or_default()
    }

    fn active_uniforms(&self, program: Self::Program) -> Vec<ActiveVariable> {
        self.programs
            .get(&program)
            .map(|p| p.uniforms.clone())
            .unwrap_or_default()
    }

    fn attribute_location(&self, program: Self::Program, name: &str) -> Option<u32> {
        let record = self.programs.get(&program)?;
        record
            .attributes
            .iter()
            .position(|a| a.name == name)
            .map(|i| i as u32)
    }

    fn uniform_location(
        &self,
        program: Self::Program,
        name: &str,
    ) -> Option<Self::UniformLocation> {
        let record = self.programs.get(&program)?;
        let index = record.uniforms.iter().position(|u| u.name == name)?;
        Some(UniformLocation { program, index })
    }

    fn set_uniform(&mut self, location: &Self::UniformLocation, data: UniformData) {
        // GL only writes uniforms of the program in use.
        if self.current_program != Some(location.program) {
            log::warn!("headless: uniform write to a program that is not in use; ignored");
            return;
        }
        if let Some(record) = self.programs.get_mut(&location.program) {
            record.uniform_values.insert(location.index, data);
        }
    }

    fn create_buffer(&mut self, target: BufferTarget, data: &[u8]) -> Result<Self::Buffer, String> {
        let handle = BufferHandle(self.next());
        self.buffers.insert(
            handle,
            BufferRecord {
                data: data.to_vec(),
            },
        );
        self.bind_buffer(target, Some(handle));
        self.stats.buffers_created += 1;
        Ok(handle)
    }

    fn bind_buffer(&mut self, target: BufferTarget, buffer: Option<Self::Buffer>) {
        match target {
            BufferTarget::Array => self.array_binding = buffer,
            BufferTarget::ElementArray => self.element_binding = buffer,
        }
    }

    fn vertex_attribute(&mut self, location: u32, components: usize, kind: ScalarKind) {
        match self.array_binding {
            Some(buffer) => {
                self.attribute_bindings
                    .insert(location, (buffer, components, kind));
            }
            None => log::warn!("headless: vertex attribute {location} set without an array buffer"),
        }
    }

    fn draw_elements(&mut self, primitive: Primitive, count: usize) {
        let indices = self
            .element_binding
            .and_then(|b| self.buffers.get(&b))
            .map(|b| bytemuck::pod_collect_to_vec::<u8, u16>(&b.data))
            .unwrap_or_default();

        self.draws.push(DrawRecord {
            program: self.current_program,
            primitive,
            count,
            indices,
            attributes: self.attribute_bindings.clone(),
            textures: self.texture_units.clone(),
            state: self.state.clone(),
        });
    }

    fn create_texture(&mut self, upload: &TextureUpload<'_>) -> Result<Self::Texture, String> {
        let expected = upload.width as usize * upload.height as usize * 4;
        if upload.pixels.len() != expected {
            return Err(format!(
                "GL_INVALID_OPERATION: expected {expected} bytes of RGBA data, got {}",
                upload.pixels.len()
            ));
        }
        let handle = TextureHandle(self.next());
        self.textures.insert(
            handle,
            TextureRecord {
                width: upload.width,
                height: upload.height,
                pixels: upload.pixels.to_vec(),
                mag_filter: upload.mag_filter,
                min_filter: upload.min_filter,
                wrap_s: upload.wrap_s,
                wrap_t: upload.wrap_t,
                mipmapped: upload.generate_mipmaps,
            },
        );
        self.stats.textures_created += 1;
        Ok(handle)
    }

    fn bind_texture(&mut self, unit: u32, texture: Self::Texture) {
        self.texture_units.insert(unit, texture);
    }

    fn drawing_buffer_size(&self) -> (u32, u32) {
        self.size
    }

    fn viewport(&mut self, x: i32, y: i32, width: i32, height: i32) {
        self.state.viewport = [x, y, width, height];
    }

    fn clear_color(&mut self, rgba: [f32; 4]) {
        self.state.clear_color = rgba;
    }

    fn clear_depth(&mut self, depth: f32) {
        self.state.clear_depth = depth;
    }

    fn clear_stencil(&mut self, stencil: i32) {
        self.state.clear_stencil = stencil;
    }

    fn clear(&mut self, _mask: ClearMask) {
        self.stats.clears += 1;
    }

    fn set_capability(&mut self, capability: Capability, enabled: bool) {
        if enabled {
            self.state.enabled.insert(capability);
        } else {
            self.state.enabled.remove(&capability);
        }
    }

    fn blend_color(&mut self, rgba: [f32; 4]) {
        self.state.blend_color = rgba;
    }

    fn blend_equation_separate(&mut self, color: BlendOperation, alpha: BlendOperation) {
        self.state.blend_equation = (color, alpha);
    }

    fn blend_func_separate(
        &mut self,
        src_color: BlendFactor,
        dst_color: BlendFactor,
        src_alpha: BlendFactor,
        dst_alpha: BlendFactor,
    ) {
        self.state.blend_func = [src_color, dst_color, src_alpha, dst_alpha];
    }

    fn depth_func(&mut self, func: CompareFunction) {
        self.state.depth_func = func;
    }

    fn depth_mask(&mut self, write: bool) {
        self.state.depth_mask = write;
    }

    fn depth_range(&mut self, near: f32, far: f32) {
        self.state.depth_range = (near.clamp(0.0, 1.0), far.clamp(0.0, 1.0));
    }

    fn stencil_func_separate(
        &mut self,
        face: Face,
        func: CompareFunction,
        reference: i32,
        mask: u32,
    ) {
        for s in self.state.stencil_faces(face) {
            s.func = func;
            s.reference = reference;
            s.mask = mask;
        }
    }

    fn stencil_op_separate(
        &mut self,
        face: Face,
        fail: StencilOperation,
        depth_fail: StencilOperation,
        pass: StencilOperation,
    ) {
        for s in self.state.stencil_faces(face) {
            s.fail = fail;
            s.depth_fail = depth_fail;
            s.pass = pass;
        }
    }

    fn stencil_mask_separate(&mut self, face: Face, mask: u32) {
        for s in self.state.stencil_faces(face) {
            s.write_mask = mask;
        }
    }

    fn scissor(&mut self, x: i32, y: i32, width: i32, height: i32) {
        self.state.scissor = [x, y, width, height];
    }

    fn color_mask(&mut self, r: bool, g: bool, b: bool, a: bool) {
        self.state.color_mask = [r, g, b, a];
    }

    fn cull_face(&mut self, face: Face) {
        self.state.cull_face = face;
    }

    fn polygon_offset(&mut self, factor: f32, units: f32) {
        self.state.polygon_offset = (factor, units);
    }

    fn sample_coverage(&mut self, value: f32, invert: bool) {
        self.state.sample_coverage = (value.clamp(0.0, 1.0), invert);
    }
}

// ── emulated reflection ───────────────────────────────────────────────────

#[derive(Debug, Copy, Clone, Eq, PartialEq)]
enum DeclKind {
    Attribute,
    Uniform,
    Varying,
}

#[derive(Debug, Clone, Eq, PartialEq)]
struct Declaration {
    kind: DeclKind,
    ty: GlType,
    name: String,
    array_len: Option<i32>,
}

impl Declaration {
    /// GL reports arrays as `name[0]` with their length as size.
    fn to_active(&self) -> ActiveVariable {
        match self.array_len {
            Some(len) => ActiveVariable {
                name: format!("{}[0]", self.name),
                ty: self.ty.clone(),
                size: len,
            },
            None => ActiveVariable {
                name: self.name.clone(),
                ty: self.ty.clone(),
                size: 1,
            },
        }
    }
}

const QUALIFIERS: [&str; 7] = ["lowp", "mediump", "highp", "flat", "smooth", "centroid", "const"];

fn strip_comments(source: &str) -> String {
    let mut out = String::with_capacity(source.len());
    let mut rest = source;
    while !rest.is_empty() {
        if let Some(after) = rest.strip_prefix("//") {
            let end = after.find('\n').unwrap_or(after.len());
            rest = &after[end..];
        } else if let Some(after) = rest.strip_prefix("/*") {
            let end = after.find("*/").map_or(after.len(), |i| i + 2);
            // Keep line numbers stable for `#error` reporting.
            out.extend(after[..end].chars().filter(|&c| c == '\n'));
            rest = &after[end..];
        } else {
            let mut chars = rest.chars();
            if let Some(c) = chars.next() {
                out.push(c);
            }
            rest = chars.as_str();
        }
    }
    out
}

fn parse_declarations(stage: ShaderStage, source: &str) -> Vec<Declaration> {
    let mut out = Vec::new();

    // Preprocessor lines never carry declarations.
    let body: String = source
        .lines()
        .filter(|l| !l.trim_start().starts_with('#'))
        .collect::<Vec<_>>()
        .join("\n");

    for statement in body.split([';', '{', '}']) {
        let mut tokens = statement.split_whitespace().peekable();

        // `layout(location = 0) in vec3 a;`
        if tokens.peek().is_some_and(|t| t.starts_with("layout")) {
            for t in tokens.by_ref() {
                if t.ends_with(')') {
                    break;
                }
            }
        }

        let Some(storage) = tokens.next() else { continue };
        let kind = match (storage, stage) {
            ("attribute", ShaderStage::Vertex) | ("in", ShaderStage::Vertex) => DeclKind::Attribute,
            ("uniform", _) => DeclKind::Uniform,
            ("varying", _) | ("out", ShaderStage::Vertex) | ("in", ShaderStage::Fragment) => {
                DeclKind::Varying
            }
            _ => continue,
        };

        let mut tokens = tokens.filter(|t| !QUALIFIERS.contains(t));
        let Some(ty) = tokens.next() else { continue };
        let ty = glsl_type(ty);
        let names: String = tokens.collect::<Vec<_>>().join("");

        for declarator in names.split(',').filter(|s| !s.is_empty()) {
            let (name, array_len) = match declarator.split_once('[') {
                Some((name, len)) => (name, len.trim_end_matches(']').parse::<i32>().ok()),
                None => (declarator, None),
            };
            out.push(Declaration {
                kind,
                ty: ty.clone(),
                name: name.to_string(),
                array_len,
            });
        }
    }

    out
}

fn glsl_type(name: &str) -> GlType {
    match name {
        "float" => GlType::Float,
        "vec2" => GlType::FloatVec2,
        "vec3" => GlType::FloatVec3,
        "vec4" => GlType::FloatVec4,
        "int" => GlType::Int,
        "ivec2" => GlType::IntVec2,
        "ivec3" => GlType::IntVec3,
        "ivec4" => GlType::IntVec4,
        "bool" => GlType::Bool,
        "mat4" => GlType::FloatMat4,
        "sampler2D" => GlType::Sampler2d,
        // Raw GL enums for the remaining common types.
        "mat2" => GlType::Other(0x8B5A),
        "mat3" => GlType::Other(0x8B5B),
        "samplerCube" => GlType::Other(0x8B60),
        "bvec2" => GlType::Other(0x8B57),
        "bvec3" => GlType::Other(0x8B58),
        "bvec4" => GlType::Other(0x8B59),
        _ => GlType::Other(0),
    }
}
