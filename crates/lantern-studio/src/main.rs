use anyhow::Result;
use winit::event::{ElementState, KeyEvent, WindowEvent};
use winit::keyboard::{KeyCode, PhysicalKey};

use lantern_engine::app::{App, AppControl, FrameInfo};
use lantern_engine::device::ContextAttributes;
use lantern_engine::gl::{BlendFactor, CompareFunction};
use lantern_engine::logging::{init_logging, LoggingConfig};
use lantern_engine::scene::{Entity, Geometry, Setting, Shader, Uniforms, Vertex};
use lantern_engine::texture::{load, PendingTexture, Texture, TextureOptions, TextureSource};
use lantern_engine::window::{Runtime, RuntimeConfig};

const COLORED_VERT: &str = r#"
attribute vec3 position;
attribute vec3 color;
uniform mat4 transform;
varying vec3 v_color;
void main() {
    gl_Position = transform * vec4(position, 1.0);
    v_color = color;
}
"#;

const COLORED_FRAG: &str = r#"
#ifdef GL_ES
precision mediump float;
#endif
varying vec3 v_color;
void main() {
    gl_FragColor = vec4(v_color, 1.0);
}
"#;

const TEXTURED_VERT: &str = r#"
attribute vec2 position;
attribute vec2 coord;
uniform vec2 offset;
varying vec2 v_coord;
void main() {
    gl_Position = vec4(position + offset, 0.0, 1.0);
    v_coord = coord;
}
"#;

const TEXTURED_FRAG: &str = r#"
#ifdef GL_ES
precision mediump float;
#endif
uniform sampler2D image;
uniform float opacity;
varying vec2 v_coord;
void main() {
    vec4 texel = texture2D(image, v_coord);
    gl_FragColor = vec4(texel.rgb, texel.a * opacity);
}
"#;

/// Rotating, depth-tested triangles with a translucent checkerboard quad on top.
struct Studio {
    colored: (Shader, Shader),
    textured: (Shader, Shader),
    triangles: Geometry,
    quad: Geometry,
    pending: PendingTexture,
    checkerboard: Option<Texture>,
}

impl Studio {
    fn new() -> Self {
        let triangles = Geometry::triangles([
            [
                colored([-0.6, -0.5, 0.2], [1.0, 0.3, 0.2]),
                colored([0.6, -0.5, 0.2], [1.0, 0.3, 0.2]),
                colored([0.0, 0.6, 0.2], [1.0, 0.3, 0.2]),
            ],
            [
                colored([-0.5, 0.5, -0.2], [0.2, 0.6, 1.0]),
                colored([0.5, 0.5, -0.2], [0.2, 0.6, 1.0]),
                colored([0.0, -0.6, -0.2], [0.2, 0.6, 1.0]),
            ],
        ]);

        let quad = Geometry::indexed_triangles(
            [
                textured([-0.3, -0.3], [0.0, 0.0]),
                textured([0.3, -0.3], [1.0, 0.0]),
                textured([0.3, 0.3], [1.0, 1.0]),
                textured([-0.3, 0.3], [0.0, 1.0]),
            ],
            [[0, 1, 2], [2, 3, 0]],
        );

        let (width, height, pixels) = checkerboard(64, 8);
        let pending = load(
            TextureSource::Rgba {
                width,
                height,
                pixels,
            },
            TextureOptions::default(),
        );

        Self {
            colored: (Shader::new(COLORED_VERT), Shader::new(COLORED_FRAG)),
            textured: (Shader::new(TEXTURED_VERT), Shader::new(TEXTURED_FRAG)),
            triangles,
            quad,
            pending,
            checkerboard: None,
        }
    }

    fn poll_texture(&mut self) {
        match self.pending.try_take() {
            Some(Ok(texture)) => self.checkerboard = Some(texture),
            Some(Err(e)) => log::error!("checkerboard: {e}"),
            None => {}
        }
    }
}

impl App for Studio {
    fn on_window_event(&mut self, event: &WindowEvent) -> AppControl {
        match event {
            WindowEvent::KeyboardInput {
                event:
                    KeyEvent {
                        physical_key: PhysicalKey::Code(KeyCode::Escape),
                        state: ElementState::Pressed,
                        ..
                    },
                ..
            } => AppControl::Exit,
            _ => AppControl::Continue,
        }
    }

    fn on_frame(&mut self, frame: &FrameInfo) -> Vec<Entity> {
        if frame.frame_index % 600 == 0 {
            log::debug!("frame {} at {:.1}s", frame.frame_index, frame.time);
        }
        self.poll_texture();

        let mut entities = vec![Entity::new(
            self.colored.0.clone(),
            self.colored.1.clone(),
            self.triangles.clone(),
            Uniforms::new().with("transform", rotation_y(frame.time, frame.aspect())),
        )
        .setting(Setting::depth(CompareFunction::Less))];

        if let Some(texture) = &self.checkerboard {
            let drift = 0.4 * (frame.time * 0.7).sin();
            entities.push(
                Entity::new(
                    self.textured.0.clone(),
                    self.textured.1.clone(),
                    self.quad.clone(),
                    Uniforms::new()
                        .with("image", texture)
                        .with("offset", [drift, 0.0])
                        .with("opacity", 0.8f32),
                )
                .setting(Setting::blend_add(
                    BlendFactor::SrcAlpha,
                    BlendFactor::OneMinusSrcAlpha,
                )),
            );
        }

        entities
    }
}

fn colored(position: [f32; 3], color: [f32; 3]) -> Vertex {
    Vertex::new().with("position", position).with("color", color)
}

fn textured(position: [f32; 2], coord: [f32; 2]) -> Vertex {
    Vertex::new().with("position", position).with("coord", coord)
}

/// Column-major rotation about Y, squashed horizontally by `aspect`.
#[rustfmt::skip]
fn rotation_y(angle: f32, aspect: f32) -> [f32; 16] {
    let (s, c) = angle.sin_cos();
    let sx = 1.0 / aspect.max(f32::EPSILON);
    [
        c * sx, 0.0, -s * 0.5, 0.0,
        0.0, 1.0, 0.0, 0.0,
        s * sx, 0.0, c * 0.5, 0.0,
        0.0, 0.0, 0.0, 1.0,
    ]
}

fn checkerboard(size: u32, cell: u32) -> (u32, u32, Vec<u8>) {
    let mut pixels = Vec::with_capacity((size * size * 4) as usize);
    for y in 0..size {
        for x in 0..size {
            let light = ((x / cell) + (y / cell)) % 2 == 0;
            let v = if light { 235 } else { 40 };
            pixels.extend_from_slice(&[v, v, v, 255]);
        }
    }
    (size, size, pixels)
}

fn main() -> Result<()> {
    init_logging(LoggingConfig::default());

    let config = RuntimeConfig {
        title: "Lantern Studio".to_string(),
        ..RuntimeConfig::default()
    };
    let attributes = ContextAttributes {
        clear_color: [0.08, 0.08, 0.1, 1.0],
        ..ContextAttributes::default()
    };

    Runtime::run(config, attributes, Studio::new())
}
