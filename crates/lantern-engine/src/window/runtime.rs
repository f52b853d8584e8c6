use std::time::Instant;

use anyhow::{Context, Result};
use winit::application::ApplicationHandler;
use winit::dpi::LogicalSize;
use winit::event::WindowEvent;
use winit::event_loop::{ActiveEventLoop, ControlFlow, EventLoop};
use winit::window::{Window, WindowId};

use crate::app::{App, AppControl, FrameInfo};
use crate::device::{ContextAttributes, GlSurface};
use crate::gl::GlowContext;
use crate::render::{FrameReport, Renderer};

/// Shown in the title bar when no GL context can be created.
const UNAVAILABLE_NOTICE: &str = "OpenGL is unavailable; nothing will be drawn";

/// Window/runtime configuration.
#[derive(Debug, Clone)]
pub struct RuntimeConfig {
    pub title: String,
    pub initial_size: LogicalSize<f64>,
    pub vsync: bool,
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            title: "lantern".to_string(),
            initial_size: LogicalSize::new(1280.0, 720.0),
            vsync: true,
        }
    }
}

/// Entry point for the runtime.
pub struct Runtime;

impl Runtime {
    /// Opens one window and drives `app` until the window closes, the app
    /// asks to exit, or a frame fails to draw.
    ///
    /// A draw failure ends the loop and is returned here.
    pub fn run<A>(config: RuntimeConfig, attributes: ContextAttributes, app: A) -> Result<()>
    where
        A: App + 'static,
    {
        let event_loop = EventLoop::new().context("failed to create winit EventLoop")?;
        let mut state = AppState::new(config, attributes, app);

        event_loop
            .run_app(&mut state)
            .context("winit event loop terminated with error")?;

        match state.failure {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }
}

// Field order is drop order: GL objects go before the context, the context
// before the window.
struct Session {
    renderer: Renderer<GlowContext>,
    surface: Option<GlSurface>,
    window: Window,
    clock: FrameClock,
}

impl Session {
    fn drawing_buffer_size(&self) -> (u32, u32) {
        let size = match &self.surface {
            Some(surface) => surface.size(),
            None => self.window.inner_size(),
        };
        (size.width, size.height)
    }
}

struct FrameClock {
    start: Option<Instant>,
    last: Option<Instant>,
    frame_index: u64,
}

impl FrameClock {
    fn new() -> Self {
        Self {
            start: None,
            last: None,
            frame_index: 0,
        }
    }

    fn tick(&mut self, size: (u32, u32)) -> FrameInfo {
        let now = Instant::now();
        let start = *self.start.get_or_insert(now);
        let delta = self
            .last
            .map(|last| now.saturating_duration_since(last).as_secs_f32())
            .unwrap_or(0.0);
        self.last = Some(now);

        let info = FrameInfo {
            time: now.saturating_duration_since(start).as_secs_f32(),
            delta,
            frame_index: self.frame_index,
            size,
        };
        self.frame_index += 1;
        info
    }
}

struct AppState<A: App> {
    config: RuntimeConfig,
    attributes: ContextAttributes,
    app: A,
    session: Option<Session>,
    failure: Option<anyhow::Error>,
}

impl<A: App> AppState<A> {
    fn new(config: RuntimeConfig, attributes: ContextAttributes, app: A) -> Self {
        Self {
            config,
            attributes,
            app,
            session: None,
            failure: None,
        }
    }

    fn create_session(&self, event_loop: &ActiveEventLoop) -> Result<Session> {
        let attrs = Window::default_attributes()
            .with_title(self.config.title.clone())
            .with_inner_size(self.config.initial_size)
            .with_transparent(self.attributes.alpha);

        let window = event_loop
            .create_window(attrs)
            .context("failed to create window")?;

        let mut renderer = Renderer::new(self.attributes);
        let surface = match GlSurface::new(&window, &self.attributes, self.config.vsync) {
            Ok((surface, context)) => {
                renderer.attach(context);
                Some(surface)
            }
            Err(e) => {
                log::error!("failed to create GL context: {e:#}");
                log::warn!("{UNAVAILABLE_NOTICE}");
                renderer.mark_unavailable(format!("{e:#}"));
                window.set_title(&format!("{} - {UNAVAILABLE_NOTICE}", self.config.title));
                None
            }
        };

        Ok(Session {
            renderer,
            surface,
            window,
            clock: FrameClock::new(),
        })
    }

    fn fail(&mut self, event_loop: &ActiveEventLoop, err: anyhow::Error) {
        log::error!("{err:#}");
        self.failure = Some(err);
        self.session = None;
        event_loop.exit();
    }

    fn redraw(&mut self, event_loop: &ActiveEventLoop) {
        let Some(session) = self.session.as_mut() else {
            return;
        };

        let frame = session.clock.tick(session.drawing_buffer_size());
        let entities = self.app.on_frame(&frame);

        match session.renderer.draw(&entities) {
            Ok(FrameReport::Drawn { .. }) => {
                if let Some(surface) = &session.surface {
                    session.window.pre_present_notify();
                    if let Err(e) = surface.present() {
                        log::warn!("{e:#}");
                    }
                }
            }
            Ok(FrameReport::Unavailable) => {}
            Err(e) => self.fail(event_loop, anyhow::Error::new(e).context("frame failed")),
        }
    }
}

impl<A: App> ApplicationHandler for AppState<A> {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.session.is_some() {
            return;
        }

        match self.create_session(event_loop) {
            Ok(session) => {
                session.window.request_redraw();
                self.session = Some(session);
            }
            Err(e) => self.fail(event_loop, e),
        }
    }

    fn about_to_wait(&mut self, event_loop: &ActiveEventLoop) {
        event_loop.set_control_flow(ControlFlow::Wait);

        // Continuous redraw; applications animate from `FrameInfo::time`.
        if let Some(session) = &self.session {
            if session.surface.is_some() {
                session.window.request_redraw();
            }
        }
    }

    fn window_event(&mut self, event_loop: &ActiveEventLoop, _id: WindowId, event: WindowEvent) {
        if self.app.on_window_event(&event) == AppControl::Exit {
            self.session = None;
            event_loop.exit();
            return;
        }

        match event {
            WindowEvent::CloseRequested => {
                self.session = None;
                event_loop.exit();
            }

            WindowEvent::Resized(new_size) => {
                if let Some(session) = self.session.as_mut() {
                    if let Some(surface) = session.surface.as_mut() {
                        surface.resize(new_size);
                    }
                    if let Some(context) = session.renderer.context_mut() {
                        context.resize(new_size.width, new_size.height);
                    }
                    session.window.request_redraw();
                }
            }

            WindowEvent::RedrawRequested => self.redraw(event_loop),

            _ => {}
        }
    }
}
