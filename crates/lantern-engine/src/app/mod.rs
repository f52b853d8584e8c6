//! Application contract driven by the window runtime.
//!
//! The runtime owns the window, the GL surface and the [`Renderer`];
//! applications only describe what to draw each frame.
//!
//! [`Renderer`]: crate::render::Renderer

use winit::event::WindowEvent;

use crate::scene::Entity;

/// Control directive returned by app callbacks.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum AppControl {
    Continue,
    Exit,
}

/// Per-frame information handed to [`App::on_frame`].
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct FrameInfo {
    /// Seconds since the first frame.
    pub time: f32,
    /// Seconds since the previous frame; zero on the first.
    pub delta: f32,
    pub frame_index: u64,
    /// Drawing-buffer size in physical pixels.
    pub size: (u32, u32),
}

impl FrameInfo {
    /// Width over height, or 1.0 for a degenerate buffer.
    pub fn aspect(&self) -> f32 {
        let (w, h) = self.size;
        if w == 0 || h == 0 {
            1.0
        } else {
            w as f32 / h as f32
        }
    }
}

/// Application contract implemented by higher layers.
pub trait App {
    /// Called for window events before the runtime handles them.
    fn on_window_event(&mut self, event: &WindowEvent) -> AppControl {
        let _ = event;
        AppControl::Continue
    }

    /// Returns the entities to draw this frame, in draw order.
    fn on_frame(&mut self, frame: &FrameInfo) -> Vec<Entity>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn aspect_handles_zero_height() {
        let mut frame = FrameInfo {
            time: 0.0,
            delta: 0.0,
            frame_index: 0,
            size: (200, 100),
        };
        assert_eq!(frame.aspect(), 2.0);
        frame.size = (200, 0);
        assert_eq!(frame.aspect(), 1.0);
    }
}
