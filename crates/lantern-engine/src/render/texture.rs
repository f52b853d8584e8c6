//! Lazy texture upload.

use std::borrow::Cow;

use crate::cache::TextureStore;
use crate::gl::{GraphicsContext, TextureUpload};
use crate::texture::{Texture, TextureData};

use super::RenderError;

/// Rows in reverse order; `width` is in pixels.
fn flip_rows(pixels: &[u8], width: u32) -> Vec<u8> {
    let stride = width as usize * 4;
    if stride == 0 {
        return pixels.to_vec();
    }
    pixels.chunks_exact(stride).rev().flatten().copied().collect()
}

/// Uploads `texture` with its filters and wraps, generating mipmaps when the
/// minify filter samples them.
pub(crate) fn realize<C: GraphicsContext>(
    ctx: &mut C,
    texture: &TextureData,
) -> Result<C::Texture, RenderError> {
    let options = &texture.options;
    let pixels: Cow<'_, [u8]> = if options.flip_y {
        Cow::Owned(flip_rows(&texture.pixels, texture.width))
    } else {
        Cow::Borrowed(&texture.pixels)
    };

    let upload = TextureUpload {
        width: texture.width,
        height: texture.height,
        pixels: &pixels,
        mag_filter: options.magnify,
        min_filter: options.minify,
        wrap_s: options.horizontal_wrap,
        wrap_t: options.vertical_wrap,
        generate_mipmaps: options.minify.uses_mipmaps(),
    };
    let handle = ctx.create_texture(&upload).map_err(RenderError::Context)?;
    log::debug!("uploaded {}x{} texture", texture.width, texture.height);
    Ok(handle)
}

impl<C: GraphicsContext> TextureStore<C> {
    /// GPU texture for `texture`, uploading it the first time it is seen.
    pub(crate) fn resolve(
        &mut self,
        ctx: &mut C,
        texture: &Texture,
    ) -> Result<C::Texture, RenderError> {
        let id = self.ids.identify(texture.shared());
        if let Some(&realized) = self.realized.get(&id) {
            return Ok(realized);
        }
        let realized = realize(ctx, texture.shared())?;
        self.realized.insert(id, realized);
        Ok(realized)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::ResourceCache;
    use crate::gl::{HeadlessContext, MinFilter};
    use crate::texture::TextureOptions;

    /// 1x2 image: red row on top, blue row below.
    fn two_rows(options: TextureOptions) -> Texture {
        Texture::from_rgba(1, 2, vec![255, 0, 0, 255, 0, 0, 255, 255], options).unwrap()
    }

    #[test]
    fn flip_y_reverses_rows() {
        let mut ctx = HeadlessContext::new(1, 1);
        let handle = realize(&mut ctx, two_rows(TextureOptions::default()).shared()).unwrap();
        let record = ctx.texture(handle).unwrap();
        assert_eq!(record.pixels, [0, 0, 255, 255, 255, 0, 0, 255]);
        assert!(record.mipmapped);
    }

    #[test]
    fn rows_kept_without_flip_and_no_mipmaps_for_plain_filter() {
        let mut ctx = HeadlessContext::new(1, 1);
        let options = TextureOptions {
            flip_y: false,
            minify: MinFilter::Linear,
            ..TextureOptions::default()
        };
        let handle = realize(&mut ctx, two_rows(options).shared()).unwrap();
        let record = ctx.texture(handle).unwrap();
        assert_eq!(record.pixels, [255, 0, 0, 255, 0, 0, 255, 255]);
        assert!(!record.mipmapped);
    }

    #[test]
    fn textures_are_realized_once_per_handle() {
        let mut ctx = HeadlessContext::new(1, 1);
        let mut store = ResourceCache::<HeadlessContext>::new().textures;
        let texture = two_rows(TextureOptions::default());

        let a = store.resolve(&mut ctx, &texture).unwrap();
        let b = store.resolve(&mut ctx, &texture.clone()).unwrap();
        assert_eq!(a, b);
        assert_eq!(ctx.stats().textures_created, 1);

        store
            .resolve(&mut ctx, &two_rows(TextureOptions::default()))
            .unwrap();
        assert_eq!(ctx.stats().textures_created, 2);
    }
}
