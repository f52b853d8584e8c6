use super::{Geometry, Setting, Shader, Uniforms};

/// One draw: a program (two shaders), the geometry it consumes, uniform values
/// and the render settings active only for this draw.
#[derive(Debug, Clone)]
pub struct Entity {
    pub vertex_shader: Shader,
    pub fragment_shader: Shader,
    pub geometry: Geometry,
    pub uniforms: Uniforms,
    /// Applied in order right before the draw call, reverted right after.
    pub settings: Vec<Setting>,
}

impl Entity {
    /// An entity with no extra settings.
    pub fn new(
        vertex_shader: Shader,
        fragment_shader: Shader,
        geometry: Geometry,
        uniforms: Uniforms,
    ) -> Self {
        Self::with_settings(Vec::new(), vertex_shader, fragment_shader, geometry, uniforms)
    }

    pub fn with_settings(
        settings: Vec<Setting>,
        vertex_shader: Shader,
        fragment_shader: Shader,
        geometry: Geometry,
        uniforms: Uniforms,
    ) -> Self {
        Self {
            vertex_shader,
            fragment_shader,
            geometry,
            uniforms,
            settings,
        }
    }

    /// Appends a setting.
    pub fn setting(mut self, setting: Setting) -> Self {
        self.settings.push(setting);
        self
    }
}
