use std::path::PathBuf;

use super::{Texture, TextureError, TextureOptions};

type LoadResult = Result<Texture, TextureError>;

/// Where a texture's pixels come from.
#[derive(Debug, Clone)]
pub enum TextureSource {
    /// Encoded image bytes (PNG, JPEG, BMP, GIF).
    Bytes(Vec<u8>),
    /// Encoded image file.
    Path(PathBuf),
    /// Raw RGBA8 pixels, top row first.
    Rgba {
        width: u32,
        height: u32,
        pixels: Vec<u8>,
    },
}

impl TextureSource {
    fn describe(&self) -> String {
        match self {
            TextureSource::Bytes(bytes) => format!("<{} encoded bytes>", bytes.len()),
            TextureSource::Path(path) => path.display().to_string(),
            TextureSource::Rgba { width, height, .. } => format!("<{width}x{height} rgba>"),
        }
    }

    fn read(self, options: TextureOptions) -> LoadResult {
        match self {
            TextureSource::Bytes(bytes) => decode(&bytes, options),
            TextureSource::Path(path) => {
                let bytes = std::fs::read(&path)
                    .map_err(|e| TextureError::Load(format!("{}: {e}", path.display())))?;
                decode(&bytes, options)
            }
            TextureSource::Rgba {
                width,
                height,
                pixels,
            } => Texture::from_rgba(width, height, pixels, options),
        }
    }
}

/// Decodes an encoded image into a validated texture on the calling thread.
pub fn decode(bytes: &[u8], options: TextureOptions) -> LoadResult {
    let image = image::load_from_memory(bytes).map_err(|e| TextureError::Load(e.to_string()))?;
    let rgba = image.to_rgba8();
    let (width, height) = rgba.dimensions();
    Texture::from_rgba(width, height, rgba.into_raw(), options)
}

/// Starts loading `source` on a worker thread.
///
/// The returned handle completes exactly once, with the texture or an error.
/// There is no cancellation; dropping the handle discards the result.
pub fn load(source: TextureSource, options: TextureOptions) -> PendingTexture {
    let (tx, rx) = flume::bounded(1);
    let label = source.describe();

    let spawned = std::thread::Builder::new()
        .name("lantern-texture".to_string())
        .spawn(move || {
            let result = source.read(options);
            match &result {
                Ok(texture) => {
                    let (w, h) = texture.size();
                    log::debug!("texture {label} loaded ({w}x{h})");
                }
                Err(e) => log::warn!("texture {label}: {e}"),
            }
            // The receiver may already be gone.
            let _ = tx.send(result);
        });

    match spawned {
        Ok(_) => PendingTexture { rx, done: false },
        Err(e) => PendingTexture::failed(TextureError::Load(format!(
            "failed to spawn texture loader: {e}"
        ))),
    }
}

/// A texture load in flight.
#[derive(Debug)]
pub struct PendingTexture {
    rx: flume::Receiver<LoadResult>,
    done: bool,
}

impl PendingTexture {
    fn failed(error: TextureError) -> Self {
        let (tx, rx) = flume::bounded(1);
        let _ = tx.send(Err(error));
        Self { rx, done: false }
    }

    /// Returns the outcome once it is available, without blocking.
    ///
    /// Yields `Some` exactly once; later calls return `None`.
    pub fn try_take(&mut self) -> Option<LoadResult> {
        if self.done {
            return None;
        }
        let result = match self.rx.try_recv() {
            Ok(result) => result,
            Err(flume::TryRecvError::Empty) => return None,
            Err(flume::TryRecvError::Disconnected) => Err(loader_gone()),
        };
        self.done = true;
        Some(result)
    }

    /// `true` once [`try_take`](Self::try_take) has yielded the outcome.
    #[inline]
    pub fn is_taken(&self) -> bool {
        self.done
    }

    /// Resolves with the outcome.
    pub async fn ready(self) -> LoadResult {
        if self.done {
            return Err(TextureError::Load("texture result already taken".to_string()));
        }
        self.rx.recv_async().await.unwrap_or_else(|_| Err(loader_gone()))
    }

    /// Blocks the calling thread until the outcome is available.
    pub fn wait(self) -> LoadResult {
        pollster::block_on(self.ready())
    }
}

fn loader_gone() -> TextureError {
    TextureError::Load("texture loader exited without a result".to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn png(width: u32, height: u32) -> Vec<u8> {
        let image = image::RgbaImage::from_pixel(width, height, image::Rgba([255, 0, 0, 255]));
        let mut out = std::io::Cursor::new(Vec::new());
        image.write_to(&mut out, image::ImageFormat::Png).unwrap();
        out.into_inner()
    }

    #[test]
    fn decode_npot_with_clamped_options() {
        let texture = decode(&png(100, 50), TextureOptions::non_power_of_two()).unwrap();
        assert_eq!(texture.size(), (100, 50));
        assert_eq!(&texture.pixels()[..4], &[255, 0, 0, 255]);
    }

    #[test]
    fn decode_npot_with_default_options_is_a_size_error() {
        let err = decode(&png(100, 50), TextureOptions::default()).unwrap_err();
        assert_eq!(
            err,
            TextureError::Size {
                width: 100,
                height: 50
            }
        );
    }

    #[test]
    fn load_completes_with_texture() {
        let texture = load(TextureSource::Bytes(png(4, 4)), TextureOptions::default())
            .wait()
            .unwrap();
        assert_eq!(texture.size(), (4, 4));
    }

    #[test]
    fn load_reports_undecodable_bytes() {
        let result = load(
            TextureSource::Bytes(b"definitely not an image".to_vec()),
            TextureOptions::default(),
        )
        .wait();
        assert!(matches!(result, Err(TextureError::Load(_))));
    }

    #[test]
    fn load_reports_missing_file() {
        let result = load(
            TextureSource::Path("/nonexistent/lantern/texture.png".into()),
            TextureOptions::default(),
        )
        .wait();
        match result {
            Err(TextureError::Load(message)) => assert!(message.contains("texture.png")),
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn try_take_yields_once() {
        let mut pending = load(
            TextureSource::Rgba {
                width: 2,
                height: 2,
                pixels: vec![7; 16],
            },
            TextureOptions::default(),
        );
        let result = loop {
            if let Some(result) = pending.try_take() {
                break result;
            }
            std::thread::yield_now();
        };
        assert_eq!(result.unwrap().size(), (2, 2));
        assert!(pending.is_taken());
        assert!(pending.try_take().is_none());
    }
}
