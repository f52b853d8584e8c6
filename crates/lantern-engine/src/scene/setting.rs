use crate::gl::{BlendFactor, BlendOperation, CompareFunction, Face, StencilOperation};

/// `result = operation(source * src, destination * dst)` for one channel group.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct BlendEquation {
    pub operation: BlendOperation,
    pub source: BlendFactor,
    pub destination: BlendFactor,
}

impl BlendEquation {
    #[inline]
    pub const fn new(
        operation: BlendOperation,
        source: BlendFactor,
        destination: BlendFactor,
    ) -> Self {
        Self {
            operation,
            source,
            destination,
        }
    }
}

/// Stencil test and update rules for one face.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct StencilFace {
    pub test: CompareFunction,
    /// Stencil test failed.
    pub fail: StencilOperation,
    /// Stencil test passed, depth test failed.
    pub depth_fail: StencilOperation,
    /// Both tests passed.
    pub pass: StencilOperation,
    pub write_mask: u32,
}

impl Default for StencilFace {
    fn default() -> Self {
        Self {
            test: CompareFunction::Always,
            fail: StencilOperation::Keep,
            depth_fail: StencilOperation::Keep,
            pass: StencilOperation::Keep,
            write_mask: u32::MAX,
        }
    }
}

/// Render state active for exactly one draw call.
///
/// Each setting is enabled right before its entity is drawn and reset to a
/// fixed default right after, so settings never leak into later draws.
#[derive(Debug, Copy, Clone, PartialEq)]
pub enum Setting {
    Blend {
        color: BlendEquation,
        alpha: BlendEquation,
        constant: [f32; 4],
    },
    DepthTest {
        func: CompareFunction,
        write: bool,
        near: f32,
        far: f32,
    },
    StencilTest {
        reference: i32,
        mask: u32,
        front: StencilFace,
        back: StencilFace,
    },
    Scissor {
        x: i32,
        y: i32,
        width: i32,
        height: i32,
    },
    ColorMask {
        red: bool,
        green: bool,
        blue: bool,
        alpha: bool,
    },
    CullFace(Face),
    PolygonOffset {
        factor: f32,
        units: f32,
    },
    SampleCoverage {
        value: f32,
        invert: bool,
    },
    SampleAlphaToCoverage,
}

impl Setting {
    /// Additive blending with the same factors for color and alpha.
    pub const fn blend_add(source: BlendFactor, destination: BlendFactor) -> Self {
        let eq = BlendEquation::new(BlendOperation::Add, source, destination);
        Setting::Blend {
            color: eq,
            alpha: eq,
            constant: [0.0; 4],
        }
    }

    pub const fn blend_subtract(source: BlendFactor, destination: BlendFactor) -> Self {
        let eq = BlendEquation::new(BlendOperation::Subtract, source, destination);
        Setting::Blend {
            color: eq,
            alpha: eq,
            constant: [0.0; 4],
        }
    }

    pub const fn blend_reverse_subtract(source: BlendFactor, destination: BlendFactor) -> Self {
        let eq = BlendEquation::new(BlendOperation::ReverseSubtract, source, destination);
        Setting::Blend {
            color: eq,
            alpha: eq,
            constant: [0.0; 4],
        }
    }

    /// Depth test with writes enabled over the full `[0, 1]` range.
    pub const fn depth(func: CompareFunction) -> Self {
        Setting::DepthTest {
            func,
            write: true,
            near: 0.0,
            far: 1.0,
        }
    }

    /// `depth(Less)`: the usual nearest-wins test.
    pub const fn depth_default() -> Self {
        Self::depth(CompareFunction::Less)
    }

    /// Stencil test with identical rules for both faces.
    pub const fn stencil(reference: i32, mask: u32, face: StencilFace) -> Self {
        Setting::StencilTest {
            reference,
            mask,
            front: face,
            back: face,
        }
    }

    pub const fn scissor(x: i32, y: i32, width: i32, height: i32) -> Self {
        Setting::Scissor {
            x,
            y,
            width,
            height,
        }
    }

    pub const fn color_mask(red: bool, green: bool, blue: bool, alpha: bool) -> Self {
        Setting::ColorMask {
            red,
            green,
            blue,
            alpha,
        }
    }

    pub const fn polygon_offset(factor: f32, units: f32) -> Self {
        Setting::PolygonOffset { factor, units }
    }

    pub const fn sample_coverage(value: f32, invert: bool) -> Self {
        Setting::SampleCoverage { value, invert }
    }
}
