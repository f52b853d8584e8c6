//! Per-draw render state.
//!
//! [`apply`] enables a setting's capability and writes its parameters;
//! [`revert`] restores the fixed default afterwards. The two are always
//! invoked as a pair around exactly one draw call.

use crate::gl::{Capability, Face, GraphicsContext};
use crate::scene::Setting;

/// Capability toggled by `setting`, if any.
pub fn capability(setting: &Setting) -> Option<Capability> {
    match setting {
        Setting::Blend { .. } => Some(Capability::Blend),
        Setting::DepthTest { .. } => Some(Capability::DepthTest),
        Setting::StencilTest { .. } => Some(Capability::StencilTest),
        Setting::Scissor { .. } => Some(Capability::ScissorTest),
        Setting::CullFace(_) => Some(Capability::CullFace),
        Setting::PolygonOffset { .. } => Some(Capability::PolygonOffsetFill),
        Setting::SampleCoverage { .. } => Some(Capability::SampleCoverage),
        Setting::SampleAlphaToCoverage => Some(Capability::SampleAlphaToCoverage),
        Setting::ColorMask { .. } => None,
    }
}

pub fn apply<C: GraphicsContext>(ctx: &mut C, setting: &Setting) {
    if let Some(cap) = capability(setting) {
        ctx.set_capability(cap, true);
    }

    match *setting {
        Setting::Blend {
            color,
            alpha,
            constant,
        } => {
            ctx.blend_color(constant);
            ctx.blend_equation_separate(color.operation, alpha.operation);
            ctx.blend_func_separate(
                color.source,
                color.destination,
                alpha.source,
                alpha.destination,
            );
        }
        Setting::DepthTest {
            func,
            write,
            near,
            far,
        } => {
            ctx.depth_func(func);
            ctx.depth_mask(write);
            ctx.depth_range(near, far);
        }
        Setting::StencilTest {
            reference,
            mask,
            front,
            back,
        } => {
            for (face, rules) in [(Face::Front, front), (Face::Back, back)] {
                ctx.stencil_func_separate(face, rules.test, reference, mask);
                ctx.stencil_op_separate(face, rules.fail, rules.depth_fail, rules.pass);
                ctx.stencil_mask_separate(face, rules.write_mask);
            }
        }
        Setting::Scissor {
            x,
            y,
            width,
            height,
        } => ctx.scissor(x, y, width, height),
        Setting::ColorMask {
            red,
            green,
            blue,
            alpha,
        } => ctx.color_mask(red, green, blue, alpha),
        Setting::CullFace(face) => ctx.cull_face(face),
        Setting::PolygonOffset { factor, units } => ctx.polygon_offset(factor, units),
        Setting::SampleCoverage { value, invert } => ctx.sample_coverage(value, invert),
        Setting::SampleAlphaToCoverage => {}
    }
}

/// Restores the default `setting` overrode. Parameters other than those
/// listed below are left as the setting wrote them: they have no effect while
/// the capability is disabled.
///
/// - color mask: all channels writable
/// - depth test: disabled, depth writes enabled
/// - stencil test: disabled, both write masks all ones
/// - everything else: capability disabled
pub fn revert<C: GraphicsContext>(ctx: &mut C, setting: &Setting) {
    if let Some(cap) = capability(setting) {
        ctx.set_capability(cap, false);
    }

    match setting {
        Setting::ColorMask { .. } => ctx.color_mask(true, true, true, true),
        Setting::DepthTest { .. } => ctx.depth_mask(true),
        Setting::StencilTest { .. } => ctx.stencil_mask_separate(Face::FrontAndBack, u32::MAX),
        _ => {}
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gl::headless::PipelineState;
    use crate::gl::{
        BlendFactor, BlendOperation, CompareFunction, HeadlessContext, StencilOperation,
    };
    use crate::scene::StencilFace;

    fn every_setting() -> Vec<Setting> {
        let inc = StencilFace {
            test: CompareFunction::Equal,
            fail: StencilOperation::Keep,
            depth_fail: StencilOperation::Zero,
            pass: StencilOperation::Increment,
            write_mask: 0x0F,
        };
        vec![
            Setting::blend_add(BlendFactor::SrcAlpha, BlendFactor::OneMinusSrcAlpha),
            Setting::DepthTest {
                func: CompareFunction::Greater,
                write: false,
                near: 0.25,
                far: 0.75,
            },
            Setting::StencilTest {
                reference: 1,
                mask: 0xFF,
                front: inc,
                back: StencilFace {
                    write_mask: 0xF0,
                    ..inc
                },
            },
            Setting::scissor(1, 2, 3, 4),
            Setting::color_mask(true, false, true, false),
            Setting::CullFace(Face::Front),
            Setting::polygon_offset(1.0, 2.0),
            Setting::sample_coverage(0.5, true),
            Setting::SampleAlphaToCoverage,
        ]
    }

    #[test]
    fn apply_enables_and_writes_parameters() {
        let mut ctx = HeadlessContext::new(1, 1);
        for setting in &every_setting() {
            apply(&mut ctx, setting);
        }
        let state = ctx.state();
        for cap in Capability::ALL {
            assert!(state.is_enabled(cap), "{cap:?} should be enabled");
        }
        assert_eq!(state.blend_equation, (BlendOperation::Add, BlendOperation::Add));
        assert_eq!(
            state.blend_func,
            [
                BlendFactor::SrcAlpha,
                BlendFactor::OneMinusSrcAlpha,
                BlendFactor::SrcAlpha,
                BlendFactor::OneMinusSrcAlpha
            ]
        );
        assert_eq!(state.depth_func, CompareFunction::Greater);
        assert!(!state.depth_mask);
        assert_eq!(state.depth_range, (0.25, 0.75));
        assert_eq!(state.stencil_front.pass, StencilOperation::Increment);
        assert_eq!(state.stencil_front.write_mask, 0x0F);
        assert_eq!(state.stencil_back.write_mask, 0xF0);
        assert_eq!(state.stencil_back.reference, 1);
        assert_eq!(state.scissor, [1, 2, 3, 4]);
        assert_eq!(state.color_mask, [true, false, true, false]);
        assert_eq!(state.cull_face, Face::Front);
        assert_eq!(state.polygon_offset, (1.0, 2.0));
        assert_eq!(state.sample_coverage, (0.5, true));
    }

    #[test]
    fn apply_then_revert_restores_defaults() {
        for setting in every_setting() {
            let mut ctx = HeadlessContext::new(1, 1);
            apply(&mut ctx, &setting);
            revert(&mut ctx, &setting);

            let state = ctx.state();
            assert!(state.enabled.is_empty(), "{setting:?} left a capability enabled");
            assert!(state.depth_mask);
            assert_eq!(state.color_mask, [true; 4]);
            assert_eq!(state.stencil_front.write_mask, u32::MAX);
            assert_eq!(state.stencil_back.write_mask, u32::MAX);
        }
    }

    #[test]
    fn revert_lands_on_fixed_default_whatever_was_set_before() {
        for setting in every_setting() {
            let mut ctx = HeadlessContext::new(1, 1);
            for cap in Capability::ALL {
                ctx.set_capability(cap, true);
            }
            ctx.color_mask(false, false, false, false);
            ctx.depth_mask(false);
            ctx.stencil_mask_separate(Face::FrontAndBack, 0);

            apply(&mut ctx, &setting);
            revert(&mut ctx, &setting);

            let state = ctx.state();
            if let Some(cap) = capability(&setting) {
                assert!(!state.is_enabled(cap), "{setting:?} left {cap:?} enabled");
            }
            match setting {
                Setting::ColorMask { .. } => assert_eq!(state.color_mask, [true; 4]),
                Setting::DepthTest { .. } => assert!(state.depth_mask),
                Setting::StencilTest { .. } => {
                    assert_eq!(state.stencil_front.write_mask, u32::MAX);
                    assert_eq!(state.stencil_back.write_mask, u32::MAX);
                }
                _ => {}
            }
        }
    }

    #[test]
    fn revert_without_apply_matches_fresh_state_for_toggles() {
        let mut ctx = HeadlessContext::new(1, 1);
        for setting in &every_setting() {
            revert(&mut ctx, setting);
        }
        assert_eq!(ctx.state(), &PipelineState::default());
    }
}
