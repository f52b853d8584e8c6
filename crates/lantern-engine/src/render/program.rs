//! Shader compilation and program linking.

use std::collections::hash_map::Entry;

use crate::cache::{AttributeSlot, Identity, LinkedProgram, ProgramKey, ProgramStore};
use crate::gl::{GraphicsContext, ShaderStage};
use crate::scene::Shader;

use super::RenderError;

pub(crate) fn compile<C: GraphicsContext>(
    ctx: &mut C,
    stage: ShaderStage,
    source: &str,
) -> Result<C::Shader, RenderError> {
    let shader = ctx
        .compile_shader(stage, source)
        .map_err(|log| RenderError::ShaderCompile { stage, log })?;
    log::debug!("compiled {stage} shader");
    Ok(shader)
}

/// Links `vertex` and `fragment` and enumerates the active attributes.
pub(crate) fn link<C: GraphicsContext>(
    ctx: &mut C,
    vertex: C::Shader,
    fragment: C::Shader,
) -> Result<LinkedProgram<C>, RenderError> {
    let program = ctx
        .link_program(vertex, fragment)
        .map_err(|log| RenderError::ProgramLink { log })?;

    let attributes: Vec<AttributeSlot> = ctx
        .active_attributes(program)
        .into_iter()
        .filter_map(|active| {
            // Built-ins (gl_VertexID, ...) are reported active but have no location.
            let location = ctx.attribute_location(program, &active.name)?;
            Some(AttributeSlot {
                name: active.name,
                location,
                ty: active.ty,
            })
        })
        .collect();

    log::debug!("linked program with {} attributes", attributes.len());
    Ok(LinkedProgram {
        program,
        attributes,
    })
}

impl<C: GraphicsContext> ProgramStore<C> {
    /// Returns the program for `(vertex, fragment)`, compiling each shader and
    /// linking the pair only the first time they are seen.
    pub(crate) fn resolve(
        &mut self,
        ctx: &mut C,
        vertex: &Shader,
        fragment: &Shader,
    ) -> Result<(ProgramKey, &LinkedProgram<C>), RenderError> {
        let (vertex_id, vs) = self.ensure_shader(ctx, ShaderStage::Vertex, vertex)?;
        let (fragment_id, fs) = self.ensure_shader(ctx, ShaderStage::Fragment, fragment)?;
        let key = ProgramKey {
            vertex: vertex_id,
            fragment: fragment_id,
        };

        let linked: &LinkedProgram<C> = match self.programs.entry(key) {
            Entry::Occupied(entry) => entry.into_mut(),
            Entry::Vacant(entry) => entry.insert(link(ctx, vs, fs)?),
        };
        Ok((key, linked))
    }

    fn ensure_shader(
        &mut self,
        ctx: &mut C,
        stage: ShaderStage,
        shader: &Shader,
    ) -> Result<(Identity, C::Shader), RenderError> {
        let id = self.ids.identify(shader.shared());
        if let Some(&compiled) = self.shaders.get(&id) {
            return Ok((id, compiled));
        }
        let compiled = compile(ctx, stage, shader.source())?;
        self.shaders.insert(id, compiled);
        Ok((id, compiled))
    }
}
