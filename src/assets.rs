//! Asynchronous asset loading.
//!
//! The font and the noise texture are loaded concurrently and joined before
//! anything that depends on them is built, so the material never sees a
//! missing texture.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::text::{FontFace, GlyphSource};

/// Errors that can occur while loading assets.
#[derive(Debug, thiserror::Error)]
pub enum AssetError {
    #[error("Failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("Invalid font {path}: {reason}")]
    Font { path: PathBuf, reason: String },
    #[error("Invalid image: {0}")]
    Image(#[from] image::ImageError),
}

/// Texture address mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum WrapMode {
    #[default]
    Repeat,
    ClampToEdge,
}

/// RGBA8 noise texture sampled by the wave material.
#[derive(Debug, Clone, PartialEq)]
pub struct NoiseTexture {
    pub width: u32,
    pub height: u32,
    pub pixels: Vec<u8>,
    pub wrap: WrapMode,
}

impl NoiseTexture {
    pub fn from_image(image: image::DynamicImage) -> Self {
        let rgba = image.to_rgba8();
        Self {
            width: rgba.width(),
            height: rgba.height(),
            pixels: rgba.into_raw(),
            wrap: WrapMode::Repeat,
        }
    }

    /// Procedural value-noise texture used when no noise image is available.
    pub fn placeholder(size: u32) -> Self {
        let size = size.max(1);
        let mut pixels = Vec::with_capacity((size * size * 4) as usize);
        for y in 0..size {
            for x in 0..size {
                let v = (hash2(x, y) * 255.0) as u8;
                pixels.extend_from_slice(&[v, v, v, 255]);
            }
        }
        Self {
            width: size,
            height: size,
            pixels,
            wrap: WrapMode::Repeat,
        }
    }

    /// Nearest-neighbour sample of the red channel, honoring the wrap mode.
    pub fn sample(&self, u: f32, v: f32) -> f32 {
        let (u, v) = match self.wrap {
            WrapMode::Repeat => (u.rem_euclid(1.0), v.rem_euclid(1.0)),
            WrapMode::ClampToEdge => (u.clamp(0.0, 1.0), v.clamp(0.0, 1.0)),
        };
        let x = ((u * self.width as f32) as u32).min(self.width - 1);
        let y = ((v * self.height as f32) as u32).min(self.height - 1);
        self.pixels[((y * self.width + x) * 4) as usize] as f32 / 255.0
    }
}

fn hash2(x: u32, y: u32) -> f32 {
    let mut h = x.wrapping_mul(0x8da6_b343) ^ y.wrapping_mul(0xd816_3841);
    h ^= h >> 13;
    h = h.wrapping_mul(0x9e37_79b9);
    h ^= h >> 16;
    (h & 0xffff) as f32 / 65535.0
}

/// Loaded assets, ready to build the text node and material.
pub struct Assets {
    pub font: Arc<dyn GlyphSource>,
    pub noise: NoiseTexture,
}

async fn read(path: &Path) -> Result<Vec<u8>, AssetError> {
    tokio::fs::read(path).await.map_err(|source| AssetError::Io {
        path: path.to_path_buf(),
        source,
    })
}

/// Load a TrueType/OpenType font file.
pub async fn load_font<P: AsRef<Path>>(path: P) -> Result<FontFace, AssetError> {
    let path = path.as_ref();
    let bytes = read(path).await?;
    let face = FontFace::from_bytes(&bytes).map_err(|reason| AssetError::Font {
        path: path.to_path_buf(),
        reason,
    })?;
    log::info!("Loaded font {} ({:?})", path.display(), face.name());
    Ok(face)
}

/// Load a noise texture; wrap mode is set to repeat.
pub async fn load_noise_texture<P: AsRef<Path>>(path: P) -> Result<NoiseTexture, AssetError> {
    let path = path.as_ref();
    let bytes = read(path).await?;
    let image = image::load_from_memory(&bytes)?;
    let texture = NoiseTexture::from_image(image);
    log::info!(
        "Loaded noise texture {} ({}x{})",
        path.display(),
        texture.width,
        texture.height
    );
    Ok(texture)
}

/// Load the font and the noise texture concurrently.
///
/// A missing font is an error. A missing or broken noise texture is replaced
/// by [`NoiseTexture::placeholder`].
pub async fn load_assets<P: AsRef<Path>, Q: AsRef<Path>>(
    font_path: P,
    noise_path: Q,
) -> Result<Assets, AssetError> {
    let (font, noise) = tokio::join!(load_font(font_path), load_noise_texture(noise_path));
    let font = font?;
    let noise = noise.unwrap_or_else(|e| {
        log::warn!("Noise texture unavailable, using placeholder: {}", e);
        NoiseTexture::placeholder(256)
    });
    Ok(Assets {
        font: Arc::new(font),
        noise,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_placeholder_is_deterministic() {
        let a = NoiseTexture::placeholder(32);
        let b = NoiseTexture::placeholder(32);
        assert_eq!(a, b);
        assert_eq!(a.pixels.len(), 32 * 32 * 4);
        // Not a flat color.
        assert!(a.pixels.chunks(4).any(|p| p[0] != a.pixels[0]));
    }

    #[test]
    fn test_sample_repeats() {
        let tex = NoiseTexture::placeholder(16);
        assert_eq!(tex.sample(0.25, 0.75), tex.sample(1.25, -0.25));
        assert_eq!(tex.sample(0.25, 0.75), tex.sample(3.25, 2.75));
    }

    #[test]
    fn test_sample_clamps() {
        let mut tex = NoiseTexture::placeholder(16);
        tex.wrap = WrapMode::ClampToEdge;
        assert_eq!(tex.sample(5.0, 0.0), tex.sample(0.999, 0.0));
    }

    #[tokio::test]
    async fn test_load_noise_texture_from_png() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("noise.png");
        let img = image::RgbaImage::from_fn(8, 4, |x, _| image::Rgba([(x * 30) as u8, 0, 0, 255]));
        img.save(&path).unwrap();

        let tex = load_noise_texture(&path).await.unwrap();
        assert_eq!((tex.width, tex.height), (8, 4));
        assert_eq!(tex.wrap, WrapMode::Repeat);
        assert_eq!(tex.pixels[4], 30);
    }

    #[tokio::test]
    async fn test_missing_font_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let result = load_assets(dir.path().join("nope.ttf"), dir.path().join("nope.png")).await;
        assert!(matches!(result, Err(AssetError::Io { .. })));
    }

    #[tokio::test]
    async fn test_invalid_font_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bad.ttf");
        std::fs::write(&path, b"definitely not a font").unwrap();
        let result = load_font(&path).await;
        assert!(matches!(result, Err(AssetError::Font { .. })));
    }
}
