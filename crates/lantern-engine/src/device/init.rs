/// Drawing-buffer attributes requested when the graphics context is created.
///
/// Keep this structure small: every flag must map to a surface-config or
/// per-frame decision the renderer actually makes.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct ContextAttributes {
    /// Request an alpha channel and a transparent (premultiplied) surface.
    pub alpha: bool,

    /// Request a multisampled surface.
    pub antialias: bool,

    /// Depth buffer and the value it is cleared to each frame. `None` requests
    /// no depth buffer and skips depth clears.
    pub depth: Option<f32>,

    /// Stencil buffer and the value it is cleared to each frame. `None`
    /// requests no stencil buffer and skips stencil clears.
    pub stencil: Option<i32>,

    /// Color the drawing buffer is cleared to each frame (RGBA, 0..1).
    pub clear_color: [f32; 4],
}

impl Default for ContextAttributes {
    fn default() -> Self {
        Self {
            alpha: true,
            antialias: true,
            depth: Some(1.0),
            stencil: None,
            clear_color: [0.0, 0.0, 0.0, 0.0],
        }
    }
}

impl ContextAttributes {
    /// Bits of depth buffer to request.
    pub fn depth_bits(&self) -> u8 {
        if self.depth.is_some() { 24 } else { 0 }
    }

    /// Bits of stencil buffer to request.
    pub fn stencil_bits(&self) -> u8 {
        if self.stencil.is_some() { 8 } else { 0 }
    }

    /// Bits of alpha channel to request.
    pub fn alpha_bits(&self) -> u8 {
        if self.alpha { 8 } else { 0 }
    }
}
