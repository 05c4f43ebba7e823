//! Decoded image with an explicit alpha flag
//!
//! Pixels are always held as 8-bit RGBA. Opaque sources (RGB, grayscale,
//! JPEG) are promoted on ingestion with full opacity, and floating point
//! sources with alpha in `[0.0, 1.0]` are rescaled to `[0, 255]`. The
//! `has_alpha` flag remembers whether the source carried its own alpha.

use crate::error::AssetError;
use crate::Result;
use anyhow::Context;
use image::{DynamicImage, RgbImage, RgbaImage};
use std::fs;
use std::io::ErrorKind;
use std::path::Path;

#[derive(Debug, Clone, PartialEq)]
pub struct Image {
    pixels: RgbaImage,
    has_alpha: bool,
}

impl Image {
    /// Normalize any decoded image to RGBA
    pub fn from_dynamic(image: DynamicImage) -> Self {
        let has_alpha = image.color().has_alpha();
        Self {
            pixels: image.to_rgba8(),
            has_alpha,
        }
    }

    pub fn from_rgba(pixels: RgbaImage) -> Self {
        Self {
            pixels,
            has_alpha: true,
        }
    }

    pub fn from_rgb(pixels: RgbImage) -> Self {
        Self::from_dynamic(DynamicImage::ImageRgb8(pixels))
    }

    /// Decode an encoded image (PNG, JPEG, ...) held in memory
    pub fn decode(bytes: &[u8]) -> std::result::Result<Self, image::ImageError> {
        image::load_from_memory(bytes).map(Self::from_dynamic)
    }

    /// Read and decode an image file. Never substitutes a placeholder on failure.
    pub fn load<P: AsRef<Path>>(path: P) -> std::result::Result<Self, AssetError> {
        let path = path.as_ref();
        let bytes = fs::read(path).map_err(|source| match source.kind() {
            ErrorKind::NotFound => AssetError::NotFound(path.to_path_buf()),
            _ => AssetError::Io {
                path: path.to_path_buf(),
                source,
            },
        })?;

        Self::decode(&bytes).map_err(|source| AssetError::Decode {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Encode by file extension. JPEG output drops the alpha channel.
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let path = path.as_ref();
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create directory: {:?}", parent))?;
        }

        let is_jpeg = path
            .extension()
            .map(|ext| {
                let ext = ext.to_string_lossy().to_lowercase();
                ext == "jpg" || ext == "jpeg"
            })
            .unwrap_or(false);

        if is_jpeg {
            self.to_rgb()
                .save(path)
                .with_context(|| format!("Failed to save image: {:?}", path))
        } else {
            self.pixels
                .save(path)
                .with_context(|| format!("Failed to save image: {:?}", path))
        }
    }

    pub fn width(&self) -> u32 {
        self.pixels.width()
    }

    pub fn height(&self) -> u32 {
        self.pixels.height()
    }

    pub fn dimensions(&self) -> (u32, u32) {
        self.pixels.dimensions()
    }

    pub fn has_alpha(&self) -> bool {
        self.has_alpha
    }

    /// Zero width or zero height
    pub fn is_empty(&self) -> bool {
        self.width() == 0 || self.height() == 0
    }

    pub fn as_rgba(&self) -> &RgbaImage {
        &self.pixels
    }

    pub fn as_rgba_mut(&mut self) -> &mut RgbaImage {
        &mut self.pixels
    }

    /// Copy of the colour channels only
    pub fn to_rgb(&self) -> RgbImage {
        DynamicImage::ImageRgba8(self.pixels.clone()).to_rgb8()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{Rgb, Rgba, Rgba32FImage};

    #[test]
    fn test_rgb_promoted_to_opaque_rgba() {
        let rgb = RgbImage::from_pixel(3, 2, Rgb([10, 20, 30]));
        let img = Image::from_rgb(rgb);

        assert!(!img.has_alpha());
        assert_eq!(img.dimensions(), (3, 2));
        assert!(img.as_rgba().pixels().all(|p| *p == Rgba([10, 20, 30, 255])));
    }

    #[test]
    fn test_float_alpha_rescaled() {
        let src = Rgba32FImage::from_pixel(1, 1, Rgba([1.0, 0.0, 0.0, 0.5]));
        let img = Image::from_dynamic(DynamicImage::ImageRgba32F(src));

        assert!(img.has_alpha());
        let p = img.as_rgba().get_pixel(0, 0);
        assert_eq!(p[0], 255);
        assert!((127..=128).contains(&p[3]));
    }

    #[test]
    fn test_load_missing_is_not_found() {
        let err = Image::load("/no/such/card.png").unwrap_err();
        assert!(matches!(err, AssetError::NotFound(_)));
    }

    #[test]
    fn test_load_corrupt_is_decode_error() -> Result<()> {
        let dir = tempfile::tempdir()?;
        let path = dir.path().join("broken.png");
        fs::write(&path, b"not a png at all")?;

        let err = Image::load(&path).unwrap_err();
        assert!(matches!(err, AssetError::Decode { .. }));
        Ok(())
    }

    #[test]
    fn test_save_png_and_jpeg() -> Result<()> {
        let dir = tempfile::tempdir()?;
        let img = Image::from_rgba(RgbaImage::from_pixel(4, 4, Rgba([200, 10, 10, 128])));

        let png = dir.path().join("out.png");
        img.save(&png)?;
        let back = Image::load(&png)?;
        assert!(back.has_alpha());
        assert_eq!(back.as_rgba().get_pixel(1, 1), &Rgba([200, 10, 10, 128]));

        let jpg = dir.path().join("nested").join("out.JPG");
        img.save(&jpg)?;
        let back = Image::load(&jpg)?;
        assert!(!back.has_alpha());
        assert_eq!(back.dimensions(), (4, 4));
        Ok(())
    }
}
