//! Resize and rotate a sprite into the smallest canvas that holds it unclipped
//!
//! The rotation follows the usual image convention: positive angles turn the
//! content counter-clockwise on screen (y axis pointing down), about the
//! sprite's integer center.

use crate::assets::Image;
use crate::error::SkipReason;
use image::imageops::{self, FilterType};
use image::{Rgba, RgbaImage};
use imageproc::geometric_transformations::{warp_into, Interpolation, Projection};
use serde::{Deserialize, Serialize};

/// How big the sprite should be before it is rotated
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TargetSize {
    /// Keep the sprite's own size (caller already scaled it)
    Native,
    Exact { width: u32, height: u32 },
}

/// Axis-aligned size of a `width` x `height` rectangle rotated by `angle_deg`,
/// truncated to whole pixels:
/// `(h*|sin| + w*|cos|, h*|cos| + w*|sin|)`.
pub fn rotation_bounds(width: u32, height: u32, angle_deg: f64) -> (u32, u32) {
    let theta = angle_deg.to_radians();
    let cos = theta.cos().abs();
    let sin = theta.sin().abs();
    let w = f64::from(width);
    let h = f64::from(height);

    let bound_w = (h * sin + w * cos) as u32;
    let bound_h = (h * cos + w * sin) as u32;
    (bound_w, bound_h)
}

/// Sprite after resize and rotation, ready for compositing
#[derive(Debug, Clone)]
pub struct Transformed {
    pub pixels: RgbaImage,
    pub bound_w: u32,
    pub bound_h: u32,
    /// Maps resized-sprite coordinates into `pixels`
    pub projection: Projection,
}

/// Resizes and rotates sprites. Uncovered output pixels get `border`.
#[derive(Debug, Clone, Copy)]
pub struct Transformer {
    border: Rgba<u8>,
}

impl Transformer {
    pub fn new() -> Self {
        Self {
            border: Rgba([0, 0, 0, 0]),
        }
    }

    /// Resize then rotate
    pub fn apply(
        &self,
        sprite: &Image,
        size: TargetSize,
        angle_deg: f64,
    ) -> Result<Transformed, SkipReason> {
        let (width, height) = sprite.dimensions();
        if sprite.is_empty() {
            return Err(SkipReason::InvalidSprite { width, height });
        }

        let resized = match size {
            TargetSize::Native => None,
            TargetSize::Exact { width, height } => {
                if width == 0 || height == 0 {
                    return Err(SkipReason::InvalidSprite { width, height });
                }
                Some(Self::resize(sprite.as_rgba(), width, height))
            }
        };

        let source = resized.as_ref().unwrap_or(sprite.as_rgba());
        self.rotate(source, angle_deg)
    }

    /// Scale to exactly `width` x `height`.
    ///
    /// The triangle filter widens its support with the shrink factor, so
    /// downscaling averages over the covered area while upscaling is plain
    /// linear interpolation.
    pub fn resize(sprite: &RgbaImage, width: u32, height: u32) -> RgbaImage {
        if sprite.dimensions() == (width, height) {
            return sprite.clone();
        }
        imageops::resize(sprite, width, height, FilterType::Triangle)
    }

    /// Rotate about the integer center into a canvas of `rotation_bounds` size
    pub fn rotate(&self, sprite: &RgbaImage, angle_deg: f64) -> Result<Transformed, SkipReason> {
        let (width, height) = sprite.dimensions();
        let (bound_w, bound_h) = rotation_bounds(width, height, angle_deg);
        if bound_w == 0 || bound_h == 0 {
            return Err(SkipReason::InvalidSprite { width, height });
        }

        let projection = rotation_projection(width, height, bound_w, bound_h, angle_deg);

        // whole turns are exact copies
        let pixels = if angle_deg.rem_euclid(360.0) == 0.0 {
            sprite.clone()
        } else {
            let mut out = RgbaImage::from_pixel(bound_w, bound_h, self.border);
            warp_into(sprite, &projection, Interpolation::Bilinear, self.border, &mut out);
            out
        };

        Ok(Transformed {
            pixels,
            bound_w,
            bound_h,
            projection,
        })
    }
}

/// Move the sprite's integer center to the origin, turn it, then center it
/// in the bound canvas. Screen y points down, so a counter-clockwise turn is
/// a negative `Projection::rotate`.
fn rotation_projection(
    width: u32,
    height: u32,
    bound_w: u32,
    bound_h: u32,
    angle_deg: f64,
) -> Projection {
    let cx = (width / 2) as f32;
    let cy = (height / 2) as f32;
    Projection::translate(bound_w as f32 / 2.0, bound_h as f32 / 2.0)
        * Projection::rotate(-(angle_deg.to_radians() as f32))
        * Projection::translate(-cx, -cy)
}

impl Default for Transformer {
    fn default() -> Self {
        Self::new()
    }
}
