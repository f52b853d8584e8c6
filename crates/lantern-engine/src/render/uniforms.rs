//! Per-program uniform dispatch.
//!
//! After linking, each active uniform gets a typed setter. Samplers are given
//! texture units in enumeration order, starting at 0.

use std::collections::HashMap;

use crate::cache::TextureStore;
use crate::gl::{GlType, GraphicsContext, UniformData};
use crate::scene::{UniformValue, Uniforms};

use super::RenderError;

#[derive(Debug, Clone, PartialEq)]
pub(crate) enum Setter<L> {
    Int(L),
    Float(L),
    /// Uploaded as an int, 0 or 1.
    Bool(L),
    Vec2(L),
    Vec3(L),
    Vec4(L),
    Mat4(L),
    Sampler { location: L, unit: u32 },
    /// Uniform of a type values cannot be given for.
    Ignored,
}

impl<L> Setter<L> {
    fn type_name(&self) -> &'static str {
        match self {
            Setter::Int(_) => "int",
            Setter::Float(_) => "float",
            Setter::Bool(_) => "bool",
            Setter::Vec2(_) => "vec2",
            Setter::Vec3(_) => "vec3",
            Setter::Vec4(_) => "vec4",
            Setter::Mat4(_) => "mat4",
            Setter::Sampler { .. } => "sampler2D",
            Setter::Ignored => "nothing",
        }
    }
}

/// Uniform name → setter for one linked program.
pub(crate) struct UniformTable<C: GraphicsContext> {
    setters: HashMap<String, Setter<C::UniformLocation>>,
}

impl<C: GraphicsContext> UniformTable<C> {
    pub(crate) fn build(ctx: &C, program: C::Program) -> Self {
        let mut setters = HashMap::new();
        let mut next_unit = 0u32;

        for active in ctx.active_uniforms(program) {
            let Some(location) = ctx.uniform_location(program, &active.name) else {
                log::debug!("uniform `{}` has no location; ignored", active.name);
                setters.insert(active.name, Setter::Ignored);
                continue;
            };
            let setter = match active.ty {
                GlType::Int => Setter::Int(location),
                GlType::Float => Setter::Float(location),
                GlType::Bool => Setter::Bool(location),
                GlType::FloatVec2 => Setter::Vec2(location),
                GlType::FloatVec3 => Setter::Vec3(location),
                GlType::FloatVec4 => Setter::Vec4(location),
                GlType::FloatMat4 => Setter::Mat4(location),
                GlType::Sampler2d => {
                    let unit = next_unit;
                    next_unit += 1;
                    Setter::Sampler { location, unit }
                }
                ref other => {
                    log::debug!(
                        "uniform `{}` has unsupported type {other:?}; ignored",
                        active.name
                    );
                    Setter::Ignored
                }
            };
            setters.insert(active.name, setter);
        }

        log::debug!("built uniform table with {} setters", setters.len());
        Self { setters }
    }

    pub(crate) fn setter(&self, name: &str) -> Option<&Setter<C::UniformLocation>> {
        self.setters.get(name)
    }

    /// Uploads every value whose name the program declares.
    ///
    /// Unknown names are skipped. Uniforms without a value keep whatever the
    /// program last held. The program must be in use.
    pub(crate) fn apply(
        &self,
        ctx: &mut C,
        textures: &mut TextureStore<C>,
        values: &Uniforms,
    ) -> Result<(), RenderError> {
        for (name, value) in values.iter() {
            if let Some(setter) = self.setters.get(name) {
                upload(ctx, textures, name, setter, value)?;
            }
        }
        Ok(())
    }
}

fn upload<C: GraphicsContext>(
    ctx: &mut C,
    textures: &mut TextureStore<C>,
    name: &str,
    setter: &Setter<C::UniformLocation>,
    value: &UniformValue,
) -> Result<(), RenderError> {
    let (location, data) = match (setter, value) {
        (Setter::Ignored, _) => return Ok(()),
        (Setter::Int(l) | Setter::Bool(l), UniformValue::Int(v)) => (l, UniformData::Int(*v)),
        (Setter::Int(l) | Setter::Bool(l), UniformValue::Bool(b)) => {
            (l, UniformData::Int(i32::from(*b)))
        }
        (Setter::Float(l), UniformValue::Float(v)) => (l, UniformData::Float(*v)),
        (Setter::Float(l), UniformValue::Int(v)) => (l, UniformData::Float(*v as f32)),
        (Setter::Vec2(l), UniformValue::Vec2(v)) => (l, UniformData::Vec2(*v)),
        (Setter::Vec3(l), UniformValue::Vec3(v)) => (l, UniformData::Vec3(*v)),
        (Setter::Vec4(l), UniformValue::Vec4(v)) => (l, UniformData::Vec4(*v)),
        (Setter::Mat4(l), UniformValue::Mat4(m)) => (l, UniformData::Mat4(*m)),
        (Setter::Sampler { location, unit }, UniformValue::Texture(texture)) => {
            let realized = textures.resolve(ctx, texture)?;
            ctx.bind_texture(*unit, realized);
            (location, UniformData::Int(*unit as i32))
        }
        (setter, value) => {
            return Err(RenderError::UniformMismatch {
                uniform: name.to_string(),
                expected: setter.type_name(),
                found: value.type_name(),
            });
        }
    };
    ctx.set_uniform(location, data);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::ResourceCache;
    use crate::gl::headless::ProgramHandle;
    use crate::gl::{HeadlessContext, Primitive, ShaderStage};
    use crate::render::program;
    use crate::texture::{Texture, TextureOptions};

    const VERT: &str = "uniform mat4 model; uniform vec3 tint; uniform mat3 normal_matrix;
        void main() {}";
    const FRAG: &str = "uniform sampler2D base; uniform bool lit; uniform float shine;
        uniform sampler2D detail; void main() {}";

    struct Fixture {
        ctx: HeadlessContext,
        cache: ResourceCache<HeadlessContext>,
        program: ProgramHandle,
        table: UniformTable<HeadlessContext>,
    }

    fn fixture() -> Fixture {
        let mut ctx = HeadlessContext::new(1, 1);
        let vs = program::compile(&mut ctx, ShaderStage::Vertex, VERT).unwrap();
        let fs = program::compile(&mut ctx, ShaderStage::Fragment, FRAG).unwrap();
        let program = program::link(&mut ctx, vs, fs).unwrap().program;
        ctx.use_program(program);
        let table = UniformTable::build(&ctx, program);
        Fixture {
            ctx,
            cache: ResourceCache::new(),
            program,
            table,
        }
    }

    fn apply(f: &mut Fixture, values: &Uniforms) -> Result<(), RenderError> {
        f.table.apply(&mut f.ctx, &mut f.cache.textures, values)
    }

    fn texture() -> Texture {
        Texture::from_rgba(1, 1, vec![255; 4], TextureOptions::default()).unwrap()
    }

    #[test]
    fn samplers_get_sequential_units_in_enumeration_order() {
        let f = fixture();
        assert!(matches!(f.table.setter("base"), Some(Setter::Sampler { unit: 0, .. })));
        assert!(matches!(f.table.setter("detail"), Some(Setter::Sampler { unit: 1, .. })));
    }

    #[test]
    fn unsupported_types_get_a_no_op_setter() {
        let mut f = fixture();
        assert_eq!(f.table.setter("normal_matrix"), Some(&Setter::Ignored));
        apply(&mut f, &Uniforms::new().with("normal_matrix", 1.0f32)).unwrap();
    }

    #[test]
    fn extra_names_are_ignored_and_omitted_names_keep_their_value() {
        let mut f = fixture();
        apply(&mut f, &Uniforms::new().with("tint", [1.0f32, 0.5, 0.0])).unwrap();
        apply(&mut f, &Uniforms::new().with("nonexistent", 3i32)).unwrap();
        assert_eq!(
            f.ctx.uniform_value(f.program, "tint"),
            Some(UniformData::Vec3([1.0, 0.5, 0.0]))
        );
    }

    #[test]
    fn bool_and_int_conversions() {
        let mut f = fixture();
        apply(&mut f, &Uniforms::new().with("lit", true).with("shine", 8i32)).unwrap();
        assert_eq!(f.ctx.uniform_value(f.program, "lit"), Some(UniformData::Int(1)));
        assert_eq!(f.ctx.uniform_value(f.program, "shine"), Some(UniformData::Float(8.0)));

        apply(&mut f, &Uniforms::new().with("lit", 0i32)).unwrap();
        assert_eq!(f.ctx.uniform_value(f.program, "lit"), Some(UniformData::Int(0)));
    }

    #[test]
    fn texture_for_vector_uniform_is_a_mismatch() {
        let mut f = fixture();
        let err = apply(&mut f, &Uniforms::new().with("tint", texture())).unwrap_err();
        assert_eq!(
            err,
            RenderError::UniformMismatch {
                uniform: "tint".to_string(),
                expected: "vec3",
                found: "texture",
            }
        );
    }

    #[test]
    fn sampler_binds_texture_and_writes_unit() {
        let mut f = fixture();
        let detail = texture();
        let values = Uniforms::new().with("detail", &detail);

        apply(&mut f, &values).unwrap();
        apply(&mut f, &values).unwrap();
        assert_eq!(f.ctx.uniform_value(f.program, "detail"), Some(UniformData::Int(1)));
        assert_eq!(f.ctx.stats().textures_created, 1);

        f.ctx.draw_elements(Primitive::Triangles, 0);
        let record = &f.ctx.draws()[0];
        assert_eq!(record.textures.len(), 1);
        assert!(record.textures.contains_key(&1));
    }
}
