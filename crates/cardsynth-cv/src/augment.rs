//! Photometric and geometric variants of card sprites
//!
//! Used to widen a small card collection before scenes are built. Variants
//! are written next to their source as `aug_<8 hex digits>.jpg`.

use crate::assets::{AssetStore, Image};
use crate::transform::Transformer;
use crate::Result;
use anyhow::Context;
use image::imageops;
use image::{Rgba, RgbaImage};
use imageproc::noise::gaussian_noise_mut;
use rand::RngCore;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// File name prefix of generated variants
pub const AUGMENTED_PREFIX: &str = "aug_";

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Augmentation {
    FlipHorizontal,
    FlipVertical,
    /// Uniform scale factor, linear interpolation
    Scale(f32),
    /// `saturate(|alpha * x + beta|)` per colour channel
    BrightnessContrast { alpha: f32, beta: f32 },
    /// Zero-mean Gaussian noise on colour channels
    GaussianNoise { stddev: f64 },
    Blur { sigma: f32 },
}

impl Augmentation {
    /// Flips, two scales, a brighter and a darker copy, noise and a 5x5 blur
    pub fn standard_set() -> Vec<Self> {
        vec![
            Augmentation::FlipHorizontal,
            Augmentation::FlipVertical,
            Augmentation::Scale(1.2),
            Augmentation::Scale(0.8),
            Augmentation::BrightnessContrast {
                alpha: 1.5,
                beta: 20.0,
            },
            Augmentation::BrightnessContrast {
                alpha: 0.7,
                beta: -20.0,
            },
            Augmentation::GaussianNoise { stddev: 15.0 },
            // sigma OpenCV derives for a 5x5 kernel
            Augmentation::Blur { sigma: 1.1 },
        ]
    }

    /// Produce the variant. `seed` only matters for noise.
    pub fn apply(&self, image: &Image, seed: u64) -> Image {
        let src = image.as_rgba();
        let out = match *self {
            Augmentation::FlipHorizontal => imageops::flip_horizontal(src),
            Augmentation::FlipVertical => imageops::flip_vertical(src),
            Augmentation::Scale(factor) => {
                let width = ((src.width() as f32 * factor).round() as u32).max(1);
                let height = ((src.height() as f32 * factor).round() as u32).max(1);
                Transformer::resize(src, width, height)
            }
            Augmentation::BrightnessContrast { alpha, beta } => scale_abs(src, alpha, beta),
            Augmentation::GaussianNoise { stddev } => add_noise(src, stddev, seed),
            Augmentation::Blur { sigma } => imageops::blur(src, sigma),
        };

        if image.has_alpha() {
            Image::from_rgba(out)
        } else {
            Image::from_rgb(image::DynamicImage::ImageRgba8(out).to_rgb8())
        }
    }
}

fn scale_abs(src: &RgbaImage, alpha: f32, beta: f32) -> RgbaImage {
    let mut out = src.clone();
    for pixel in out.pixels_mut() {
        for c in 0..3 {
            let v = (alpha * f32::from(pixel[c]) + beta).abs();
            pixel[c] = v.round().min(255.0) as u8;
        }
    }
    out
}

fn add_noise(src: &RgbaImage, stddev: f64, seed: u64) -> RgbaImage {
    let mut rgb = image::DynamicImage::ImageRgba8(src.clone()).to_rgb8();
    gaussian_noise_mut(&mut rgb, 0.0, stddev, seed);

    RgbaImage::from_fn(src.width(), src.height(), |x, y| {
        let [r, g, b] = rgb.get_pixel(x, y).0;
        Rgba([r, g, b, src.get_pixel(x, y)[3]])
    })
}

fn is_augmented(path: &Path) -> bool {
    path.file_name()
        .map(|name| name.to_string_lossy().starts_with(AUGMENTED_PREFIX))
        .unwrap_or(false)
}

/// Counts from one augmentation pass
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct AugmentSummary {
    pub sources: usize,
    pub written: usize,
    pub failed: usize,
}

/// Write every variant in `augmentations` for each original image under `root`.
///
/// Existing `aug_` files are not used as sources. Undecodable images are
/// counted and skipped.
pub fn augment_directory<P: AsRef<Path>>(
    root: P,
    augmentations: &[Augmentation],
    rng: &mut dyn RngCore,
) -> Result<AugmentSummary> {
    let store = AssetStore::new();
    let mut sources: Vec<PathBuf> = store
        .enumerate_images(root.as_ref())
        .filter(|path| !is_augmented(path))
        .collect();
    sources.sort();

    let mut summary = AugmentSummary::default();
    for path in sources {
        let image = match store.load_image(&path) {
            Ok(image) => image,
            Err(e) => {
                tracing::warn!("skipping {e}");
                summary.failed += 1;
                continue;
            }
        };
        summary.sources += 1;

        let dir = path.parent().unwrap_or_else(|| Path::new("."));
        for augmentation in augmentations {
            let variant = augmentation.apply(&image, rng.next_u64());
            let out_path = unused_name(dir, rng);
            variant
                .save(&out_path)
                .with_context(|| format!("Failed to write augmented image for {:?}", path))?;
            summary.written += 1;
        }
    }

    tracing::info!(
        sources = summary.sources,
        written = summary.written,
        "augmentation complete"
    );
    Ok(summary)
}

fn unused_name(dir: &Path, rng: &mut dyn RngCore) -> PathBuf {
    loop {
        let candidate = dir.join(format!("{}{:08x}.jpg", AUGMENTED_PREFIX, rng.next_u32()));
        if !candidate.exists() {
            return candidate;
        }
    }
}

/// Remove every `aug_` file under `root`, returning how many were deleted
pub fn clear_augmented<P: AsRef<Path>>(root: P) -> Result<usize> {
    let store = AssetStore::new();
    let targets: Vec<PathBuf> = store
        .enumerate_images(root.as_ref())
        .filter(|path| is_augmented(path))
        .collect();

    for path in &targets {
        fs::remove_file(path).with_context(|| format!("Failed to remove {:?}", path))?;
        tracing::debug!("removed {:?}", path);
    }
    Ok(targets.len())
}
