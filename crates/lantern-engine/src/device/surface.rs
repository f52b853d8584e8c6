use std::ffi::CStr;
use std::num::NonZeroU32;

use anyhow::{Context, Result};
use glutin::config::{Config, ConfigTemplateBuilder, GlConfig as _};
use glutin::context::{
    ContextApi, ContextAttributesBuilder, NotCurrentGlContext as _, PossiblyCurrentContext,
};
use glutin::display::{Display, DisplayApiPreference, GlDisplay as _};
use glutin::surface::{
    GlSurface as _, Surface, SurfaceAttributesBuilder, SwapInterval, WindowSurface,
};
use raw_window_handle::{HasDisplayHandle, HasWindowHandle};
use winit::dpi::PhysicalSize;
use winit::window::Window;

use super::ContextAttributes;
use crate::gl::GlowContext;

/// OpenGL context and window surface created through glutin.
///
/// The context is made current on the creating thread and stays current for
/// the lifetime of this value. The window must outlive it.
pub struct GlSurface {
    surface: Surface<WindowSurface>,
    context: PossiblyCurrentContext,
    size: PhysicalSize<u32>,
}

impl GlSurface {
    /// Creates a context and surface for `window` and loads GL functions.
    pub fn new(
        window: &Window,
        attributes: &ContextAttributes,
        vsync: bool,
    ) -> Result<(Self, GlowContext)> {
        let size = window.inner_size();
        anyhow::ensure!(size.width > 0 && size.height > 0, "window has zero size");

        let raw_display = window
            .display_handle()
            .context("window has no display handle")?
            .as_raw();
        let raw_window = window
            .window_handle()
            .context("window has no window handle")?
            .as_raw();

        let display = unsafe { Display::new(raw_display, display_preference()) }
            .context("failed to open GL display")?;

        let template = ConfigTemplateBuilder::new()
            .with_alpha_size(attributes.alpha_bits())
            .with_depth_size(attributes.depth_bits())
            .with_stencil_size(attributes.stencil_bits())
            .with_transparency(attributes.alpha)
            .build();
        let configs = unsafe { display.find_configs(template) }
            .context("failed to enumerate GL configs")?;
        let config = choose_config(configs, attributes.antialias)
            .context("no GL config matches the requested context attributes")?;
        log::debug!(
            "GL config: {} samples, alpha {}, depth {}, stencil {}",
            config.num_samples(),
            config.alpha_size(),
            config.depth_size(),
            config.stencil_size()
        );

        let surface_attributes = SurfaceAttributesBuilder::<WindowSurface>::new().build(
            raw_window,
            non_zero(size.width),
            non_zero(size.height),
        );
        let surface = unsafe { display.create_window_surface(&config, &surface_attributes) }
            .context("failed to create GL window surface")?;

        // Desktop GL first, GLES as fallback.
        let desktop = ContextAttributesBuilder::new().build(Some(raw_window));
        let gles = ContextAttributesBuilder::new()
            .with_context_api(ContextApi::Gles(None))
            .build(Some(raw_window));
        let context = unsafe {
            display
                .create_context(&config, &desktop)
                .or_else(|_| display.create_context(&config, &gles))
        }
        .context("failed to create GL context")?
        .make_current(&surface)
        .context("failed to make GL context current")?;

        let interval = if vsync {
            SwapInterval::Wait(NonZeroU32::MIN)
        } else {
            SwapInterval::DontWait
        };
        if let Err(e) = surface.set_swap_interval(&context, interval) {
            log::warn!("failed to set swap interval (vsync {vsync}): {e}");
        }

        let gl = unsafe {
            glow::Context::from_loader_function_cstr(|s: &CStr| display.get_proc_address(s))
        };
        // SAFETY: the context was made current on this thread above and is
        // owned by the returned surface.
        let backend = unsafe { GlowContext::new(gl, (size.width, size.height)) };

        Ok((
            Self {
                surface,
                context,
                size,
            },
            backend,
        ))
    }

    /// Current drawable size (physical pixels).
    pub fn size(&self) -> PhysicalSize<u32> {
        self.size
    }

    /// Resizes the surface. Zero-sized requests are recorded but not applied.
    pub fn resize(&mut self, new_size: PhysicalSize<u32>) {
        self.size = new_size;
        if new_size.width == 0 || new_size.height == 0 {
            return;
        }
        self.surface.resize(
            &self.context,
            non_zero(new_size.width),
            non_zero(new_size.height),
        );
    }

    /// Presents the back buffer.
    pub fn present(&self) -> Result<()> {
        self.surface
            .swap_buffers(&self.context)
            .context("failed to swap buffers")
    }
}

#[cfg(target_os = "windows")]
fn display_preference() -> DisplayApiPreference {
    DisplayApiPreference::Wgl(None)
}

#[cfg(target_os = "macos")]
fn display_preference() -> DisplayApiPreference {
    DisplayApiPreference::Cgl
}

#[cfg(all(unix, not(target_os = "macos")))]
fn display_preference() -> DisplayApiPreference {
    DisplayApiPreference::Egl
}

fn non_zero(n: u32) -> NonZeroU32 {
    NonZeroU32::new(n).unwrap_or(NonZeroU32::MIN)
}

/// Most samples when antialiasing is requested, fewest otherwise.
fn choose_config(configs: impl Iterator<Item = Config>, antialias: bool) -> Option<Config> {
    pick_by_samples(configs, |c| c.num_samples(), antialias)
}

fn pick_by_samples<T>(
    items: impl Iterator<Item = T>,
    samples: impl Fn(&T) -> u8,
    most: bool,
) -> Option<T> {
    items.reduce(|best, candidate| {
        let better = if most {
            samples(&candidate) > samples(&best)
        } else {
            samples(&candidate) < samples(&best)
        };
        if better { candidate } else { best }
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn antialias_prefers_most_samples() {
        let picked = pick_by_samples([0u8, 4, 2].into_iter(), |s| *s, true);
        assert_eq!(picked, Some(4));
    }

    #[test]
    fn no_antialias_prefers_fewest_samples_and_keeps_first_on_ties() {
        let picked = pick_by_samples([(4u8, 'a'), (0, 'b'), (0, 'c')].into_iter(), |s| s.0, false);
        assert_eq!(picked, Some((0, 'b')));
    }

    #[test]
    fn non_zero_clamps_to_one() {
        assert_eq!(non_zero(0).get(), 1);
        assert_eq!(non_zero(640).get(), 640);
    }
}
