use std::sync::Arc;

use crate::gl::{MagFilter, MinFilter, Wrap};

use super::TextureError;

/// Sampling and upload options.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub struct TextureOptions {
    pub magnify: MagFilter,
    pub minify: MinFilter,
    pub horizontal_wrap: Wrap,
    pub vertical_wrap: Wrap,
    /// Upload rows bottom-up so that `v = 0` samples the last image row.
    pub flip_y: bool,
}

impl Default for TextureOptions {
    /// Mipmapped, repeating. Requires power-of-two dimensions.
    fn default() -> Self {
        Self {
            magnify: MagFilter::Linear,
            minify: MinFilter::NearestMipmapLinear,
            horizontal_wrap: Wrap::Repeat,
            vertical_wrap: Wrap::Repeat,
            flip_y: true,
        }
    }
}

impl TextureOptions {
    /// Options accepted for any image size.
    pub fn non_power_of_two() -> Self {
        Self {
            magnify: MagFilter::Linear,
            minify: MinFilter::Nearest,
            horizontal_wrap: Wrap::ClampToEdge,
            vertical_wrap: Wrap::ClampToEdge,
            flip_y: true,
        }
    }
}

#[inline]
fn is_power_of_two(n: u32) -> bool {
    n & n.wrapping_sub(1) == 0
}

/// Checks that `width` x `height` can be sampled with `options`.
///
/// Power-of-two sizes are always accepted. Other sizes need a non-mipmap
/// minify filter and clamp-to-edge wrapping on both axes.
pub fn validate_size(
    width: u32,
    height: u32,
    options: &TextureOptions,
) -> Result<(), TextureError> {
    if is_power_of_two(width) && is_power_of_two(height) {
        return Ok(());
    }
    let clamped = options.horizontal_wrap == Wrap::ClampToEdge
        && options.vertical_wrap == Wrap::ClampToEdge;
    if !options.minify.uses_mipmaps() && clamped {
        return Ok(());
    }
    Err(TextureError::Size { width, height })
}

pub(crate) struct TextureData {
    pub(crate) width: u32,
    pub(crate) height: u32,
    /// Tightly packed RGBA8, top row first.
    pub(crate) pixels: Vec<u8>,
    pub(crate) options: TextureOptions,
}

/// Decoded image ready for upload.
///
/// Cloning is cheap and preserves identity: the renderer uploads each handle
/// once per session.
#[derive(Clone)]
pub struct Texture(Arc<TextureData>);

impl Texture {
    /// Wraps raw RGBA8 pixels (top row first), validating length and size.
    pub fn from_rgba(
        width: u32,
        height: u32,
        pixels: Vec<u8>,
        options: TextureOptions,
    ) -> Result<Self, TextureError> {
        let expected = width as usize * height as usize * 4;
        if pixels.len() != expected {
            return Err(TextureError::Load(format!(
                "expected {expected} bytes of RGBA pixels for {width}x{height}, got {}",
                pixels.len()
            )));
        }
        validate_size(width, height, &options)?;
        Ok(Self(Arc::new(TextureData {
            width,
            height,
            pixels,
            options,
        })))
    }

    /// `(width, height)` in pixels.
    #[inline]
    pub fn size(&self) -> (u32, u32) {
        (self.0.width, self.0.height)
    }

    #[inline]
    pub fn options(&self) -> &TextureOptions {
        &self.0.options
    }

    #[inline]
    pub fn pixels(&self) -> &[u8] {
        &self.0.pixels
    }

    #[inline]
    pub fn same(&self, other: &Texture) -> bool {
        Arc::ptr_eq(&self.0, &other.0)
    }

    #[inline]
    pub(crate) fn shared(&self) -> &Arc<TextureData> {
        &self.0
    }
}

impl std::fmt::Debug for Texture {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Texture")
            .field("width", &self.0.width)
            .field("height", &self.0.height)
            .field("options", &self.0.options)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn power_of_two_sizes_accept_any_options() {
        assert!(validate_size(256, 64, &TextureOptions::default()).is_ok());
        assert!(validate_size(1, 1, &TextureOptions::default()).is_ok());
    }

    #[test]
    fn npot_with_clamp_and_plain_filter_is_accepted() {
        assert!(validate_size(100, 50, &TextureOptions::non_power_of_two()).is_ok());
    }

    #[test]
    fn npot_with_repeat_on_either_axis_is_rejected() {
        let mut options = TextureOptions::non_power_of_two();
        options.horizontal_wrap = Wrap::Repeat;
        assert_eq!(
            validate_size(100, 50, &options),
            Err(TextureError::Size {
                width: 100,
                height: 50
            })
        );

        let mut options = TextureOptions::non_power_of_two();
        options.vertical_wrap = Wrap::MirroredRepeat;
        assert!(validate_size(100, 50, &options).is_err());
    }

    #[test]
    fn npot_with_mipmap_filter_is_rejected() {
        let mut options = TextureOptions::non_power_of_two();
        options.minify = MinFilter::LinearMipmapLinear;
        assert!(validate_size(64, 48, &options).is_err());
    }

    #[test]
    fn from_rgba_checks_pixel_length() {
        let err = Texture::from_rgba(2, 2, vec![0; 15], TextureOptions::default()).unwrap_err();
        assert!(matches!(err, TextureError::Load(_)));

        let tex = Texture::from_rgba(2, 2, vec![0; 16], TextureOptions::default()).unwrap();
        assert_eq!(tex.size(), (2, 2));
        assert!(tex.same(&tex.clone()));
    }
}
