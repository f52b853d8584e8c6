use glow::HasContext;

use super::context::GraphicsContext;
use super::types::{
    ActiveVariable, BlendFactor, BlendOperation, BufferTarget, Capability, ClearMask,
    CompareFunction, Face, GlType, MagFilter, MinFilter, Primitive, ScalarKind, ShaderStage,
    StencilOperation, TextureUpload, UniformData, Wrap,
};

/// OpenGL / GLES implementation of [`GraphicsContext`] on top of `glow`.
///
/// The wrapped `glow::Context` must stay current on the thread that drives the
/// renderer for as long as this value lives. Every GL call below relies on that.
pub struct GlowContext {
    gl: glow::Context,
    size: (u32, u32),
    vertex_array: Option<glow::VertexArray>,
}

impl GlowContext {
    /// Wraps a loaded context.
    ///
    /// Core profiles and GLES 3 reject attribute pointers without a bound vertex
    /// array; one is created and left bound for the context's lifetime.
    ///
    /// # Safety
    /// `gl` must be current on the calling thread and stay current for the
    /// lifetime of the returned value.
    pub unsafe fn new(gl: glow::Context, size: (u32, u32)) -> Self {
        let version = gl.version();
        log::info!(
            "OpenGL {}.{}{} ({})",
            version.major,
            version.minor,
            if version.is_embedded { " ES" } else { "" },
            version.vendor_info
        );

        let vertex_array = if version.major >= 3 {
            match unsafe { gl.create_vertex_array() } {
                Ok(vao) => {
                    unsafe { gl.bind_vertex_array(Some(vao)) };
                    Some(vao)
                }
                Err(e) => {
                    log::warn!("failed to create vertex array object: {e}");
                    None
                }
            }
        } else {
            None
        };

        Self {
            gl,
            size,
            vertex_array,
        }
    }

    /// Updates the drawing-buffer size after the surface was resized.
    pub fn resize(&mut self, width: u32, height: u32) {
        self.size = (width, height);
    }

    pub fn gl(&self) -> &glow::Context {
        &self.gl
    }
}

impl Drop for GlowContext {
    fn drop(&mut self) {
        if let Some(vao) = self.vertex_array.take() {
            unsafe { self.gl.delete_vertex_array(vao) };
        }
    }
}

impl GraphicsContext for GlowContext {
    type Shader = glow::Shader;
    type Program = glow::Program;
    type Buffer = glow::Buffer;
    type Texture = glow::Texture;
    type UniformLocation = glow::UniformLocation;

    fn compile_shader(&mut self, stage: ShaderStage, source: &str) -> Result<Self::Shader, String> {
        let gl = &self.gl;
        unsafe {
            let shader = gl.create_shader(shader_stage(stage))?;
            gl.shader_source(shader, source);
            gl.compile_shader(shader);
            if !gl.get_shader_compile_status(shader) {
                let log = gl.get_shader_info_log(shader);
                gl.delete_shader(shader);
                return Err(log);
            }
            Ok(shader)
        }
    }

    fn link_program(
        &mut self,
        vertex: Self::Shader,
        fragment: Self::Shader,
    ) -> Result<Self::Program, String> {
        let gl = &self.gl;
        unsafe {
            let program = gl.create_program()?;
            gl.attach_shader(program, vertex);
            gl.attach_shader(program, fragment);
            gl.link_program(program);
            if !gl.get_program_link_status(program) {
                let log = gl.get_program_info_log(program);
                gl.detach_shader(program, vertex);
                gl.detach_shader(program, fragment);
                gl.delete_program(program);
                return Err(log);
            }
            Ok(program)
        }
    }

    fn use_program(&mut self, program: Self::Program) {
        unsafe { self.gl.use_program(Some(program)) };
    }

    fn active_attributes(&self, program: Self::Program) -> Vec<ActiveVariable> {
        let gl = &self.gl;
        unsafe {
            (0..gl.get_active_attributes(program))
                .filter_map(|i| gl.get_active_attribute(program, i))
                .map(|a| ActiveVariable {
                    name: a.name,
                    ty: gl_type(a.atype),
                    size: a.size,
                })
                .collect()
        }
    }

    fn active_uniforms(&self, program: Self::Program) -> Vec<ActiveVariable> {
        let gl = &self.gl;
        unsafe {
            (0..gl.get_active_uniforms(program))
                .filter_map(|i| gl.get_active_uniform(program, i))
                .map(|u| ActiveVariable {
                    name: u.name,
                    ty: gl_type(u.utype),
                    size: u.size,
                })
                .collect()
        }
    }

    fn attribute_location(&self, program: Self::Program, name: &str) -> Option<u32> {
        unsafe { self.gl.get_attrib_location(program, name) }
    }

    fn uniform_location(
        &self,
        program: Self::Program,
        name: &str,
    ) -> Option<Self::UniformLocation> {
        unsafe { self.gl.get_uniform_location(program, name) }
    }

    fn set_uniform(&mut self, location: &Self::UniformLocation, data: UniformData) {
        let gl = &self.gl;
        let loc = Some(location);
        unsafe {
            match data {
                UniformData::Int(v) => gl.uniform_1_i32(loc, v),
                UniformData::Float(v) => gl.uniform_1_f32(loc, v),
                UniformData::Vec2(v) => gl.uniform_2_f32_slice(loc, &v),
                UniformData::Vec3(v) => gl.uniform_3_f32_slice(loc, &v),
                UniformData::Vec4(v) => gl.uniform_4_f32_slice(loc, &v),
                UniformData::Mat4(m) => gl.uniform_matrix_4_f32_slice(loc, false, &m),
            }
        }
    }

    fn create_buffer(&mut self, target: BufferTarget, data: &[u8]) -> Result<Self::Buffer, String> {
        let gl = &self.gl;
        let target = buffer_target(target);
        unsafe {
            let buffer = gl.create_buffer()?;
            gl.bind_buffer(target, Some(buffer));
            gl.buffer_data_u8_slice(target, data, glow::STATIC_DRAW);
            Ok(buffer)
        }
    }

    fn bind_buffer(&mut self, target: BufferTarget, buffer: Option<Self::Buffer>) {
        unsafe { self.gl.bind_buffer(buffer_target(target), buffer) };
    }

    fn vertex_attribute(&mut self, location: u32, components: usize, kind: ScalarKind) {
        let gl = &self.gl;
        let size = components as i32;
        unsafe {
            gl.enable_vertex_attrib_array(location);
            match kind {
                ScalarKind::Float => {
                    gl.vertex_attrib_pointer_f32(location, size, glow::FLOAT, false, 0, 0)
                }
                ScalarKind::Int => gl.vertex_attrib_pointer_i32(location, size, glow::INT, 0, 0),
            }
        }
    }

    fn draw_elements(&mut self, primitive: Primitive, count: usize) {
        unsafe {
            self.gl.draw_elements(
                primitive_mode(primitive),
                count as i32,
                glow::UNSIGNED_SHORT,
                0,
            )
        };
    }

    fn create_texture(&mut self, upload: &TextureUpload<'_>) -> Result<Self::Texture, String> {
        let gl = &self.gl;
        // GL constant values are small enough that the casts to i32 are lossless.
        unsafe {
            let texture = gl.create_texture()?;
            gl.bind_texture(glow::TEXTURE_2D, Some(texture));
            gl.pixel_store_i32(glow::UNPACK_ALIGNMENT, 1);
            gl.tex_image_2d(
                glow::TEXTURE_2D,
                0,
                glow::RGBA as i32,
                upload.width as i32,
                upload.height as i32,
                0,
                glow::RGBA,
                glow::UNSIGNED_BYTE,
                glow::PixelUnpackData::Slice(Some(upload.pixels)),
            );
            gl.tex_parameter_i32(
                glow::TEXTURE_2D,
                glow::TEXTURE_MAG_FILTER,
                mag_filter(upload.mag_filter) as i32,
            );
            gl.tex_parameter_i32(
                glow::TEXTURE_2D,
                glow::TEXTURE_MIN_FILTER,
                min_filter(upload.min_filter) as i32,
            );
            gl.tex_parameter_i32(
                glow::TEXTURE_2D,
                glow::TEXTURE_WRAP_S,
                wrap(upload.wrap_s) as i32,
            );
            gl.tex_parameter_i32(
                glow::TEXTURE_2D,
                glow::TEXTURE_WRAP_T,
                wrap(upload.wrap_t) as i32,
            );
            if upload.generate_mipmaps {
                gl.generate_mipmap(glow::TEXTURE_2D);
            }
            gl.bind_texture(glow::TEXTURE_2D, None);
            Ok(texture)
        }
    }

    fn bind_texture(&mut self, unit: u32, texture: Self::Texture) {
        unsafe {
            self.gl.active_texture(glow::TEXTURE0 + unit);
            self.gl.bind_texture(glow::TEXTURE_2D, Some(texture));
        }
    }

    fn drawing_buffer_size(&self) -> (u32, u32) {
        self.size
    }

    fn viewport(&mut self, x: i32, y: i32, width: i32, height: i32) {
        unsafe { self.gl.viewport(x, y, width, height) };
    }

    fn clear_color(&mut self, rgba: [f32; 4]) {
        let [r, g, b, a] = rgba;
        unsafe { self.gl.clear_color(r, g, b, a) };
    }

    fn clear_depth(&mut self, depth: f32) {
        unsafe { self.gl.clear_depth_f32(depth) };
    }

    fn clear_stencil(&mut self, stencil: i32) {
        unsafe { self.gl.clear_stencil(stencil) };
    }

    fn clear(&mut self, mask: ClearMask) {
        let mut bits = 0;
        if mask.color {
            bits |= glow::COLOR_BUFFER_BIT;
        }
        if mask.depth {
            bits |= glow::DEPTH_BUFFER_BIT;
        }
        if mask.stencil {
            bits |= glow::STENCIL_BUFFER_BIT;
        }
        unsafe { self.gl.clear(bits) };
    }

    fn set_capability(&mut self, capability: Capability, enabled: bool) {
        let cap = capability_enum(capability);
        unsafe {
            if enabled {
                self.gl.enable(cap);
            } else {
                self.gl.disable(cap);
            }
        }
    }

    fn blend_color(&mut self, rgba: [f32; 4]) {
        let [r, g, b, a] = rgba;
        unsafe { self.gl.blend_color(r, g, b, a) };
    }

    fn blend_equation_separate(&mut self, color: BlendOperation, alpha: BlendOperation) {
        unsafe {
            self.gl
                .blend_equation_separate(blend_operation(color), blend_operation(alpha))
        };
    }

    fn blend_func_separate(
        &mut self,
        src_color: BlendFactor,
        dst_color: BlendFactor,
        src_alpha: BlendFactor,
        dst_alpha: BlendFactor,
    ) {
        unsafe {
            self.gl.blend_func_separate(
                blend_factor(src_color),
                blend_factor(dst_color),
                blend_factor(src_alpha),
                blend_factor(dst_alpha),
            )
        };
    }

    fn depth_func(&mut self, func: CompareFunction) {
        unsafe { self.gl.depth_func(compare_function(func)) };
    }

    fn depth_mask(&mut self, write: bool) {
        unsafe { self.gl.depth_mask(write) };
    }

    fn depth_range(&mut self, near: f32, far: f32) {
        unsafe { self.gl.depth_range_f32(near, far) };
    }

    fn stencil_func_separate(
        &mut self,
        face: Face,
        func: CompareFunction,
        reference: i32,
        mask: u32,
    ) {
        unsafe {
            self.gl
                .stencil_func_separate(face_enum(face), compare_function(func), reference, mask)
        };
    }

    fn stencil_op_separate(
        &mut self,
        face: Face,
        fail: StencilOperation,
        depth_fail: StencilOperation,
        pass: StencilOperation,
    ) {
        unsafe {
            self.gl.stencil_op_separate(
                face_enum(face),
                stencil_operation(fail),
                stencil_operation(depth_fail),
                stencil_operation(pass),
            )
        };
    }

    fn stencil_mask_separate(&mut self, face: Face, mask: u32) {
        unsafe { self.gl.stencil_mask_separate(face_enum(face), mask) };
    }

    fn scissor(&mut self, x: i32, y: i32, width: i32, height: i32) {
        unsafe { self.gl.scissor(x, y, width, height) };
    }

    fn color_mask(&mut self, r: bool, g: bool, b: bool, a: bool) {
        unsafe { self.gl.color_mask(r, g, b, a) };
    }

    fn cull_face(&mut self, face: Face) {
        unsafe { self.gl.cull_face(face_enum(face)) };
    }

    fn polygon_offset(&mut self, factor: f32, units: f32) {
        unsafe { self.gl.polygon_offset(factor, units) };
    }

    fn sample_coverage(&mut self, value: f32, invert: bool) {
        unsafe { self.gl.sample_coverage(value, invert) };
    }
}

// ── enum mapping ──────────────────────────────────────────────────────────

fn gl_type(raw: u32) -> GlType {
    match raw {
        glow::FLOAT => GlType::Float,
        glow::FLOAT_VEC2 => GlType::FloatVec2,
        glow::FLOAT_VEC3 => GlType::FloatVec3,
        glow::FLOAT_VEC4 => GlType::FloatVec4,
        glow::INT => GlType::Int,
        glow::INT_VEC2 => GlType::IntVec2,
        glow::INT_VEC3 => GlType::IntVec3,
        glow::INT_VEC4 => GlType::IntVec4,
        glow::BOOL => GlType::Bool,
        glow::FLOAT_MAT4 => GlType::FloatMat4,
        glow::SAMPLER_2D => GlType::Sampler2d,
        other => GlType::Other(other),
    }
}

fn shader_stage(stage: ShaderStage) -> u32 {
    match stage {
        ShaderStage::Vertex => glow::VERTEX_SHADER,
        ShaderStage::Fragment => glow::FRAGMENT_SHADER,
    }
}

fn buffer_target(target: BufferTarget) -> u32 {
    match target {
        BufferTarget::Array => glow::ARRAY_BUFFER,
        BufferTarget::ElementArray => glow::ELEMENT_ARRAY_BUFFER,
    }
}

fn primitive_mode(primitive: Primitive) -> u32 {
    match primitive {
        Primitive::Points => glow::POINTS,
        Primitive::Lines => glow::LINES,
        Primitive::LineStrip => glow::LINE_STRIP,
        Primitive::LineLoop => glow::LINE_LOOP,
        Primitive::Triangles => glow::TRIANGLES,
        Primitive::TriangleStrip => glow::TRIANGLE_STRIP,
        Primitive::TriangleFan => glow::TRIANGLE_FAN,
    }
}

fn capability_enum(capability: Capability) -> u32 {
    match capability {
        Capability::Blend => glow::BLEND,
        Capability::DepthTest => glow::DEPTH_TEST,
        Capability::StencilTest => glow::STENCIL_TEST,
        Capability::ScissorTest => glow::SCISSOR_TEST,
        Capability::CullFace => glow::CULL_FACE,
        Capability::PolygonOffsetFill => glow::POLYGON_OFFSET_FILL,
        Capability::SampleCoverage => glow::SAMPLE_COVERAGE,
        Capability::SampleAlphaToCoverage => glow::SAMPLE_ALPHA_TO_COVERAGE,
    }
}

fn blend_operation(op: BlendOperation) -> u32 {
    match op {
        BlendOperation::Add => glow::FUNC_ADD,
        BlendOperation::Subtract => glow::FUNC_SUBTRACT,
        BlendOperation::ReverseSubtract => glow::FUNC_REVERSE_SUBTRACT,
    }
}

fn blend_factor(factor: BlendFactor) -> u32 {
    match factor {
        BlendFactor::Zero => glow::ZERO,
        BlendFactor::One => glow::ONE,
        BlendFactor::SrcColor => glow::SRC_COLOR,
        BlendFactor::OneMinusSrcColor => glow::ONE_MINUS_SRC_COLOR,
        BlendFactor::DstColor => glow::DST_COLOR,
        BlendFactor::OneMinusDstColor => glow::ONE_MINUS_DST_COLOR,
        BlendFactor::SrcAlpha => glow::SRC_ALPHA,
        BlendFactor::OneMinusSrcAlpha => glow::ONE_MINUS_SRC_ALPHA,
        BlendFactor::DstAlpha => glow::DST_ALPHA,
        BlendFactor::OneMinusDstAlpha => glow::ONE_MINUS_DST_ALPHA,
        BlendFactor::ConstantColor => glow::CONSTANT_COLOR,
        BlendFactor::OneMinusConstantColor => glow::ONE_MINUS_CONSTANT_COLOR,
        BlendFactor::ConstantAlpha => glow::CONSTANT_ALPHA,
        BlendFactor::OneMinusConstantAlpha => glow::ONE_MINUS_CONSTANT_ALPHA,
        BlendFactor::SrcAlphaSaturate => glow::SRC_ALPHA_SATURATE,
    }
}

fn compare_function(func: CompareFunction) -> u32 {
    match func {
        CompareFunction::Never => glow::NEVER,
        CompareFunction::Always => glow::ALWAYS,
        CompareFunction::Less => glow::LESS,
        CompareFunction::LessOrEqual => glow::LEQUAL,
        CompareFunction::Equal => glow::EQUAL,
        CompareFunction::GreaterOrEqual => glow::GEQUAL,
        CompareFunction::Greater => glow::GREATER,
        CompareFunction::NotEqual => glow::NOTEQUAL,
    }
}

fn stencil_operation(op: StencilOperation) -> u32 {
    match op {
        StencilOperation::Keep => glow::KEEP,
        StencilOperation::Zero => glow::ZERO,
        StencilOperation::Replace => glow::REPLACE,
        StencilOperation::Increment => glow::INCR,
        StencilOperation::Decrement => glow::DECR,
        StencilOperation::Invert => glow::INVERT,
        StencilOperation::IncrementWrap => glow::INCR_WRAP,
        StencilOperation::DecrementWrap => glow::DECR_WRAP,
    }
}

fn face_enum(face: Face) -> u32 {
    match face {
        Face::Front => glow::FRONT,
        Face::Back => glow::BACK,
        Face::FrontAndBack => glow::FRONT_AND_BACK,
    }
}

fn mag_filter(filter: MagFilter) -> u32 {
    match filter {
        MagFilter::Linear => glow::LINEAR,
        MagFilter::Nearest => glow::NEAREST,
    }
}

fn min_filter(filter: MinFilter) -> u32 {
    match filter {
        MinFilter::Linear => glow::LINEAR,
        MinFilter::Nearest => glow::NEAREST,
        MinFilter::NearestMipmapNearest => glow::NEAREST_MIPMAP_NEAREST,
        MinFilter::LinearMipmapNearest => glow::LINEAR_MIPMAP_NEAREST,
        MinFilter::NearestMipmapLinear => glow::NEAREST_MIPMAP_LINEAR,
        MinFilter::LinearMipmapLinear => glow::LINEAR_MIPMAP_LINEAR,
    }
}

fn wrap(wrap: Wrap) -> u32 {
    match wrap {
        Wrap::Repeat => glow::REPEAT,
        Wrap::ClampToEdge => glow::CLAMP_TO_EDGE,
        Wrap::MirroredRepeat => glow::MIRRORED_REPEAT,
    }
}
