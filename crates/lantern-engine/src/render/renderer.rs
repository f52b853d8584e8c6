use crate::cache::ResourceCache;
use crate::device::ContextAttributes;
use crate::gl::{ClearMask, GraphicsContext};
use crate::scene::Entity;

use super::geometry;
use super::settings;
use super::uniforms::UniformTable;
use super::RenderError;

/// Lifecycle of a rendering session.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum SessionState {
    /// No context attached yet.
    Uninitialized,
    Ready,
    /// A frame is being recorded.
    Drawing,
    /// No usable context could be created; frames render nothing.
    Unavailable,
}

/// Result of one frame.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum FrameReport {
    Drawn {
        /// Entities that issued a draw call.
        entities: usize,
        /// Entities skipped for having no vertices.
        skipped: usize,
    },
    /// The session has no context; nothing was drawn.
    Unavailable,
}

/// Draws entity lists through a [`GraphicsContext`], caching every GPU object
/// it creates for the lifetime of the session.
///
/// Responsibilities:
/// - apply the context attributes when a context is attached
/// - clear and set the viewport each frame
/// - resolve programs, uniform tables, buffers and textures through the cache
/// - wrap each draw call in its entity's settings
pub struct Renderer<C: GraphicsContext> {
    attributes: ContextAttributes,
    state: SessionState,
    context: Option<C>,
    cache: ResourceCache<C>,
    unavailable_reason: Option<String>,
}

impl<C: GraphicsContext> Renderer<C> {
    pub fn new(attributes: ContextAttributes) -> Self {
        Self {
            attributes,
            state: SessionState::Uninitialized,
            context: None,
            cache: ResourceCache::new(),
            unavailable_reason: None,
        }
    }

    /// Creates a renderer and attaches `context` immediately.
    pub fn with_context(attributes: ContextAttributes, context: C) -> Self {
        let mut renderer = Self::new(attributes);
        renderer.attach(context);
        renderer
    }

    /// Attaches a graphics context, making the session ready to draw.
    ///
    /// Attaching a new context after one was already attached starts a new
    /// session: GPU objects of the old context mean nothing to the new one, so
    /// the cache is discarded. Unavailable sessions stay unavailable.
    pub fn attach(&mut self, mut context: C) {
        if self.state == SessionState::Unavailable {
            log::warn!("renderer is unavailable; ignoring attached context");
            return;
        }
        if self.context.is_some() {
            log::debug!("replacing graphics context; discarding resource cache");
            self.cache = ResourceCache::new();
        }

        context.clear_color(self.attributes.clear_color);
        if let Some(depth) = self.attributes.depth {
            context.clear_depth(depth);
        }
        if let Some(stencil) = self.attributes.stencil {
            context.clear_stencil(stencil);
        }

        self.context = Some(context);
        self.state = SessionState::Ready;
        log::debug!("renderer ready");
    }

    /// Marks the session as having no usable context. Terminal.
    pub fn mark_unavailable(&mut self, reason: impl Into<String>) {
        let reason = reason.into();
        log::warn!("renderer unavailable: {reason}");
        self.context = None;
        self.cache = ResourceCache::new();
        self.unavailable_reason = Some(reason);
        self.state = SessionState::Unavailable;
    }

    #[inline]
    pub fn state(&self) -> SessionState {
        self.state
    }

    pub fn unavailable_reason(&self) -> Option<&str> {
        self.unavailable_reason.as_deref()
    }

    #[inline]
    pub fn attributes(&self) -> &ContextAttributes {
        &self.attributes
    }

    #[inline]
    pub fn context(&self) -> Option<&C> {
        self.context.as_ref()
    }

    #[inline]
    pub fn context_mut(&mut self) -> Option<&mut C> {
        self.context.as_mut()
    }

    #[inline]
    pub fn cache(&self) -> &ResourceCache<C> {
        &self.cache
    }

    /// Draws one frame: clear, then every entity in order.
    ///
    /// An error aborts the rest of the frame. Everything that can fail for an
    /// entity happens before its settings are applied, so an aborted frame
    /// never leaves a setting behind.
    pub fn draw(&mut self, entities: &[Entity]) -> Result<FrameReport, RenderError> {
        match self.state {
            SessionState::Unavailable => return Ok(FrameReport::Unavailable),
            SessionState::Ready => {}
            SessionState::Uninitialized | SessionState::Drawing => {
                return Err(RenderError::NotReady);
            }
        }
        let Some(ctx) = self.context.as_mut() else {
            return Err(RenderError::NotReady);
        };

        self.state = SessionState::Drawing;
        let result = draw_frame(ctx, &mut self.cache, &self.attributes, entities);
        self.state = SessionState::Ready;

        if let Err(e) = &result {
            log::error!("frame aborted: {e}");
        }
        result
    }
}

fn draw_frame<C: GraphicsContext>(
    ctx: &mut C,
    cache: &mut ResourceCache<C>,
    attributes: &ContextAttributes,
    entities: &[Entity],
) -> Result<FrameReport, RenderError> {
    let (width, height) = ctx.drawing_buffer_size();
    ctx.viewport(0, 0, width as i32, height as i32);
    ctx.clear(ClearMask {
        color: true,
        depth: attributes.depth.is_some(),
        stencil: attributes.stencil.is_some(),
    });

    let mut drawn = 0;
    let mut skipped = 0;
    for entity in entities {
        if draw_entity(ctx, cache, entity)? {
            drawn += 1;
        } else {
            skipped += 1;
        }
    }

    Ok(FrameReport::Drawn {
        entities: drawn,
        skipped,
    })
}

/// Returns `false` if the entity was skipped.
fn draw_entity<C: GraphicsContext>(
    ctx: &mut C,
    cache: &mut ResourceCache<C>,
    entity: &Entity,
) -> Result<bool, RenderError> {
    if entity.geometry.is_empty() {
        return Ok(false);
    }

    let ResourceCache {
        programs,
        uniform_tables,
        geometry: geometry_store,
        textures,
    } = cache;

    let (key, linked) = programs.resolve(ctx, &entity.vertex_shader, &entity.fragment_shader)?;
    ctx.use_program(linked.program);

    let table = uniform_tables
        .entry(key)
        .or_insert_with(|| UniformTable::build(ctx, linked.program));
    table.apply(ctx, textures, &entity.uniforms)?;

    let buffers = geometry_store.resolve(ctx, &entity.geometry, linked)?;
    geometry::bind(ctx, buffers, linked);

    for setting in &entity.settings {
        settings::apply(ctx, setting);
    }
    ctx.draw_elements(entity.geometry.mode().primitive(), buffers.index_count);
    for setting in entity.settings.iter().rev() {
        settings::revert(ctx, setting);
    }

    Ok(true)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gl::{
        BlendFactor, Capability, CompareFunction, HeadlessContext, Primitive, ShaderStage,
        UniformData,
    };
    use crate::scene::{Geometry, Setting, Shader, Uniforms, Vertex};
    use crate::texture::{Texture, TextureOptions};

    const VERT: &str = "attribute vec3 position; uniform mat4 perspective;
        void main() { gl_Position = perspective * vec4(position, 1.0); }";
    const FRAG: &str = "precision mediump float; uniform vec3 color;
        void main() { gl_FragColor = vec4(color, 1.0); }";
    const TEXTURED_FRAG: &str = "precision mediump float; uniform sampler2D image;
        void main() { gl_FragColor = texture2D(image, vec2(0.5)); }";

    const IDENTITY: [f32; 16] = [
        1.0, 0.0, 0.0, 0.0, 0.0, 1.0, 0.0, 0.0, 0.0, 0.0, 1.0, 0.0, 0.0, 0.0, 0.0, 1.0,
    ];

    fn at(x: f32, y: f32, z: f32) -> Vertex {
        Vertex::new().with("position", [x, y, z])
    }

    fn triangle(z: f32) -> Geometry {
        Geometry::triangles([[at(0.0, 0.0, z), at(1.0, 0.0, z), at(0.0, 1.0, z)]])
    }

    fn uniforms() -> Uniforms {
        Uniforms::new()
            .with("perspective", IDENTITY)
            .with("color", [1.0f32, 0.0, 0.0])
    }

    struct Shaders {
        vertex: Shader,
        fragment: Shader,
    }

    fn shaders() -> Shaders {
        Shaders {
            vertex: Shader::new(VERT),
            fragment: Shader::new(FRAG),
        }
    }

    fn entity(shaders: &Shaders, geometry: &Geometry) -> Entity {
        Entity::new(
            shaders.vertex.clone(),
            shaders.fragment.clone(),
            geometry.clone(),
            uniforms(),
        )
    }

    fn renderer() -> Renderer<HeadlessContext> {
        Renderer::with_context(ContextAttributes::default(), HeadlessContext::new(64, 32))
    }

    fn ctx(renderer: &Renderer<HeadlessContext>) -> &HeadlessContext {
        renderer.context().unwrap()
    }

    #[test]
    fn draw_before_attach_is_not_ready() {
        let mut renderer = Renderer::<HeadlessContext>::new(ContextAttributes::default());
        assert_eq!(renderer.state(), SessionState::Uninitialized);
        assert_eq!(renderer.draw(&[]), Err(RenderError::NotReady));
    }

    #[test]
    fn attach_applies_clear_values() {
        let attributes = ContextAttributes {
            clear_color: [0.1, 0.2, 0.3, 1.0],
            depth: Some(0.5),
            stencil: Some(3),
            ..ContextAttributes::default()
        };
        let renderer = Renderer::with_context(attributes, HeadlessContext::new(8, 8));
        assert_eq!(renderer.state(), SessionState::Ready);
        let state = ctx(&renderer).state();
        assert_eq!(state.clear_color, [0.1, 0.2, 0.3, 1.0]);
        assert_eq!(state.clear_depth, 0.5);
        assert_eq!(state.clear_stencil, 3);
    }

    #[test]
    fn each_frame_sets_viewport_and_clears() {
        let mut renderer = renderer();
        renderer.draw(&[]).unwrap();
        renderer.context_mut().unwrap().resize(100, 40);
        let report = renderer.draw(&[]).unwrap();

        assert_eq!(
            report,
            FrameReport::Drawn {
                entities: 0,
                skipped: 0
            }
        );
        assert_eq!(ctx(&renderer).state().viewport, [0, 0, 100, 40]);
        assert_eq!(ctx(&renderer).stats().clears, 2);
    }

    #[test]
    fn same_geometry_reuses_one_buffer_set() {
        let mut renderer = renderer();
        let shaders = shaders();
        let geometry = triangle(0.0);

        renderer
            .draw(&[entity(&shaders, &geometry), entity(&shaders, &geometry)])
            .unwrap();
        renderer.draw(&[entity(&shaders, &geometry)]).unwrap();

        assert_eq!(renderer.cache().stats().buffer_sets, 1);
        // One index buffer, one `position` buffer.
        assert_eq!(ctx(&renderer).stats().buffers_created, 2);
        assert_eq!(ctx(&renderer).draws().len(), 3);
    }

    #[test]
    fn identical_geometries_built_separately_get_separate_buffers() {
        let mut renderer = renderer();
        let shaders = shaders();

        renderer
            .draw(&[entity(&shaders, &triangle(0.0)), entity(&shaders, &triangle(0.0))])
            .unwrap();

        assert_eq!(renderer.cache().stats().buffer_sets, 2);
        assert_eq!(ctx(&renderer).stats().buffers_created, 4);
    }

    #[test]
    fn shared_shader_handles_compile_and_link_once_across_frames() {
        let mut renderer = renderer();
        let shaders = shaders();
        for _ in 0..3 {
            renderer.draw(&[entity(&shaders, &triangle(0.0))]).unwrap();
        }

        let stats = ctx(&renderer).stats();
        assert_eq!(stats.shaders_compiled, 2);
        assert_eq!(stats.programs_linked, 1);
        let cache = renderer.cache().stats();
        assert_eq!((cache.shaders, cache.programs, cache.uniform_tables), (2, 1, 1));
    }

    #[test]
    fn empty_geometry_draws_nothing_and_caches_nothing() {
        let mut renderer = renderer();
        let report = renderer
            .draw(&[entity(&shaders(), &Geometry::triangles(Vec::new()))])
            .unwrap();

        assert_eq!(
            report,
            FrameReport::Drawn {
                entities: 0,
                skipped: 1
            }
        );
        assert!(ctx(&renderer).draws().is_empty());
        assert_eq!(renderer.cache().stats(), crate::cache::CacheStats::default());
        assert_eq!(ctx(&renderer).stats().shaders_compiled, 0);
    }

    #[test]
    fn uniforms_are_uploaded_before_the_draw() {
        let mut renderer = renderer();
        renderer.draw(&[entity(&shaders(), &triangle(0.0))]).unwrap();

        let record = &ctx(&renderer).draws()[0];
        let program = record.program.unwrap();
        assert_eq!(
            ctx(&renderer).uniform_value(program, "color"),
            Some(UniformData::Vec3([1.0, 0.0, 0.0]))
        );
        assert_eq!(record.primitive, Primitive::Triangles);
        assert_eq!(record.indices, [0, 1, 2]);
        assert_eq!(record.attributes.len(), 1);
    }

    #[test]
    fn settings_are_active_only_during_their_draw() {
        let mut renderer = renderer();
        let shaders = shaders();
        let blended = entity(&shaders, &triangle(0.0))
            .setting(Setting::blend_add(BlendFactor::SrcAlpha, BlendFactor::OneMinusSrcAlpha))
            .setting(Setting::color_mask(true, true, true, false));
        let plain = entity(&shaders, &triangle(0.5));

        renderer.draw(&[blended, plain]).unwrap();

        let draws = ctx(&renderer).draws();
        assert!(draws[0].state.is_enabled(Capability::Blend));
        assert_eq!(draws[0].state.color_mask, [true, true, true, false]);
        assert!(!draws[1].state.is_enabled(Capability::Blend));
        assert_eq!(draws[1].state.color_mask, [true; 4]);
        assert!(ctx(&renderer).state().enabled.is_empty());
    }

    #[test]
    fn entities_draw_in_order_each_with_depth_less() {
        let mut renderer = renderer();
        let shaders = shaders();
        let a = entity(&shaders, &triangle(0.0)).setting(Setting::depth_default());
        let b = Entity::new(
            shaders.vertex.clone(),
            shaders.fragment.clone(),
            Geometry::lines([[at(0.0, 0.0, 0.5), at(1.0, 1.0, 0.5)]]),
            uniforms(),
        )
        .setting(Setting::depth_default());

        let report = renderer.draw(&[a.clone(), b.clone()]).unwrap();
        assert_eq!(
            report,
            FrameReport::Drawn {
                entities: 2,
                skipped: 0
            }
        );

        let draws = ctx(&renderer).draws();
        assert_eq!(draws.len(), 2);
        assert_eq!((draws[0].primitive, draws[0].count), (Primitive::Triangles, 3));
        assert_eq!((draws[1].primitive, draws[1].count), (Primitive::Lines, 2));
        for record in draws {
            assert!(record.state.is_enabled(Capability::DepthTest));
            assert_eq!(record.state.depth_func, CompareFunction::Less);
        }

        let mut swapped = self::renderer();
        swapped.draw(&[b, a]).unwrap();
        let order: Vec<_> = ctx(&swapped).draws().iter().map(|d| d.primitive).collect();
        assert_eq!(order, [Primitive::Lines, Primitive::Triangles]);
    }

    #[test]
    fn compile_error_aborts_frame_without_leaking_settings() {
        let mut renderer = renderer();
        let good = entity(&shaders(), &triangle(0.0)).setting(Setting::depth_default());
        let broken = Entity::new(
            Shader::new(VERT),
            Shader::new("void main() {}\n#error unfinished"),
            triangle(0.0),
            uniforms(),
        )
        .setting(Setting::depth_default());
        let never_reached = entity(&shaders(), &triangle(0.0));

        let err = renderer.draw(&[good, broken, never_reached]).unwrap_err();
        assert!(matches!(
            err,
            RenderError::ShaderCompile {
                stage: ShaderStage::Fragment,
                ..
            }
        ));
        assert_eq!(ctx(&renderer).draws().len(), 1);
        assert!(ctx(&renderer).state().enabled.is_empty());
        assert_eq!(renderer.state(), SessionState::Ready);
    }

    #[test]
    fn binding_error_happens_before_settings_are_applied() {
        let mut renderer = renderer();
        let missing_position = Geometry::points([Vertex::new().with("normal", [0.0f32, 0.0, 1.0])]);
        let bad = entity(&shaders(), &missing_position).setting(Setting::scissor(0, 0, 4, 4));

        let err = renderer.draw(&[bad]).unwrap_err();
        assert!(matches!(err, RenderError::MissingAttribute { .. }));
        assert!(!ctx(&renderer).state().is_enabled(Capability::ScissorTest));
        assert!(ctx(&renderer).draws().is_empty());

        // The session is still usable.
        renderer.draw(&[entity(&shaders(), &triangle(0.0))]).unwrap();
    }

    #[test]
    fn out_of_range_index_aborts_before_any_draw() {
        let mut renderer = renderer();
        let dangling = Geometry::indexed_triangles(
            [at(0.0, 0.0, 0.0), at(1.0, 0.0, 0.0), at(0.0, 1.0, 0.0)],
            [[0, 1, 60_000]],
        );
        let bad = entity(&shaders(), &dangling).setting(Setting::depth_default());

        let err = renderer.draw(&[bad]).unwrap_err();
        assert_eq!(
            err,
            RenderError::IndexOutOfRange {
                index: 60_000,
                vertices: 3,
            }
        );
        assert!(ctx(&renderer).draws().is_empty());
        assert!(!ctx(&renderer).state().is_enabled(Capability::DepthTest));
        assert_eq!(renderer.state(), SessionState::Ready);
    }

    #[test]
    fn sampled_textures_upload_once_across_frames() {
        let mut renderer = renderer();
        let vertex = Shader::new(VERT);
        let fragment = Shader::new(TEXTURED_FRAG);
        let geometry = triangle(0.0);
        let image = Texture::from_rgba(2, 2, vec![128; 16], TextureOptions::default()).unwrap();
        let textured = Entity::new(
            vertex,
            fragment,
            geometry,
            Uniforms::new()
                .with("perspective", IDENTITY)
                .with("image", &image),
        );

        renderer.draw(std::slice::from_ref(&textured)).unwrap();
        renderer.draw(std::slice::from_ref(&textured)).unwrap();

        assert_eq!(ctx(&renderer).stats().textures_created, 1);
        assert_eq!(renderer.cache().stats().textures, 1);
        assert!(ctx(&renderer).draws()[1].textures.contains_key(&0));
    }

    #[test]
    fn unavailable_session_draws_nothing() {
        let mut renderer = Renderer::<HeadlessContext>::new(ContextAttributes::default());
        renderer.mark_unavailable("no display");
        assert_eq!(renderer.state(), SessionState::Unavailable);
        assert_eq!(renderer.unavailable_reason(), Some("no display"));

        let report = renderer.draw(&[entity(&shaders(), &triangle(0.0))]).unwrap();
        assert_eq!(report, FrameReport::Unavailable);

        renderer.attach(HeadlessContext::new(4, 4));
        assert_eq!(renderer.state(), SessionState::Unavailable);
        assert!(renderer.context().is_none());
    }

    #[test]
    fn reattaching_starts_a_fresh_cache() {
        let mut renderer = renderer();
        renderer.draw(&[entity(&shaders(), &triangle(0.0))]).unwrap();
        assert_eq!(renderer.cache().stats().programs, 1);

        renderer.attach(HeadlessContext::new(8, 8));
        assert_eq!(renderer.cache().stats(), crate::cache::CacheStats::default());
        renderer.draw(&[entity(&shaders(), &triangle(0.0))]).unwrap();
        assert_eq!(ctx(&renderer).stats().programs_linked, 1);
    }
}
