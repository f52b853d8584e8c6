use super::types::{
    ActiveVariable, BlendFactor, BlendOperation, BufferTarget, Capability, ClearMask,
    CompareFunction, Face, Primitive, ScalarKind, ShaderStage, StencilOperation, TextureUpload,
    UniformData,
};

/// Graphics-context contract consumed by the renderer.
///
/// This is the only surface through which the core touches the GPU. It is a
/// thin, safe subset of the GL/GLES state machine:
/// - object creation returns `Err(info log)` on failure
/// - state setters are infallible, matching GL semantics
/// - reflection reports only what the driver considers active
///
/// Implementations are driven from a single thread and assume exclusive access.
pub trait GraphicsContext {
    type Shader: Copy + std::fmt::Debug;
    type Program: Copy + std::fmt::Debug;
    type Buffer: Copy + std::fmt::Debug;
    type Texture: Copy + std::fmt::Debug;
    type UniformLocation: Clone + std::fmt::Debug;

    // ── programs ──────────────────────────────────────────────────────────

    /// Compiles one shader stage. On failure returns the compiler info log.
    fn compile_shader(&mut self, stage: ShaderStage, source: &str) -> Result<Self::Shader, String>;

    /// Links two compiled stages. On failure returns the linker info log.
    fn link_program(
        &mut self,
        vertex: Self::Shader,
        fragment: Self::Shader,
    ) -> Result<Self::Program, String>;

    fn use_program(&mut self, program: Self::Program);

    fn active_attributes(&self, program: Self::Program) -> Vec<ActiveVariable>;

    fn active_uniforms(&self, program: Self::Program) -> Vec<ActiveVariable>;

    fn attribute_location(&self, program: Self::Program, name: &str) -> Option<u32>;

    fn uniform_location(&self, program: Self::Program, name: &str)
    -> Option<Self::UniformLocation>;

    fn set_uniform(&mut self, location: &Self::UniformLocation, data: UniformData);

    // ── buffers ───────────────────────────────────────────────────────────

    /// Creates a static buffer on `target` filled with `data`.
    fn create_buffer(&mut self, target: BufferTarget, data: &[u8]) -> Result<Self::Buffer, String>;

    fn bind_buffer(&mut self, target: BufferTarget, buffer: Option<Self::Buffer>);

    /// Enables `location` and points it at the buffer bound to `BufferTarget::Array`.
    fn vertex_attribute(&mut self, location: u32, components: usize, kind: ScalarKind);

    /// Issues an indexed draw with 16-bit unsigned indices from offset 0.
    fn draw_elements(&mut self, primitive: Primitive, count: usize);

    // ── textures ──────────────────────────────────────────────────────────

    fn create_texture(&mut self, upload: &TextureUpload<'_>) -> Result<Self::Texture, String>;

    /// Makes `unit` active and binds `texture` to its 2D target.
    fn bind_texture(&mut self, unit: u32, texture: Self::Texture);

    // ── frame state ───────────────────────────────────────────────────────

    /// Current drawing-buffer size in physical pixels.
    fn drawing_buffer_size(&self) -> (u32, u32);

    fn viewport(&mut self, x: i32, y: i32, width: i32, height: i32);

    fn clear_color(&mut self, rgba: [f32; 4]);

    fn clear_depth(&mut self, depth: f32);

    fn clear_stencil(&mut self, stencil: i32);

    fn clear(&mut self, mask: ClearMask);

    // ── pipeline state ────────────────────────────────────────────────────

    fn set_capability(&mut self, capability: Capability, enabled: bool);

    fn blend_color(&mut self, rgba: [f32; 4]);

    fn blend_equation_separate(&mut self, color: BlendOperation, alpha: BlendOperation);

    fn blend_func_separate(
        &mut self,
        src_color: BlendFactor,
        dst_color: BlendFactor,
        src_alpha: BlendFactor,
        dst_alpha: BlendFactor,
    );

    fn depth_func(&mut self, func: CompareFunction);

    fn depth_mask(&mut self, write: bool);

    fn depth_range(&mut self, near: f32, far: f32);

    fn stencil_func_separate(
        &mut self,
        face: Face,
        func: CompareFunction,
        reference: i32,
        mask: u32,
    );

    fn stencil_op_separate(
        &mut self,
        face: Face,
        fail: StencilOperation,
        depth_fail: StencilOperation,
        pass: StencilOperation,
    );

    fn stencil_mask_separate(&mut self, face: Face, mask: u32);

    fn scissor(&mut self, x: i32, y: i32, width: i32, height: i32);

    fn color_mask(&mut self, r: bool, g: bool, b: bool, a: bool);

    fn cull_face(&mut self, face: Face);

    fn polygon_offset(&mut self, factor: f32, units: f32);

    fn sample_coverage(&mut self, value: f32, invert: bool);
}
