//! Where each sprite goes, and how big it is drawn

pub mod free;
pub mod guided;

pub use free::{FreePlacement, Region};
pub use guided::LabelGuided;

use crate::error::SkipReason;
use crate::transform::TargetSize;
use cardsynth_core::PixelBox;
use rand::{Rng, RngCore};
use serde::{Deserialize, Serialize};

/// Discrete rotation angles `min, min + step, ..., <= max`, in degrees
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AngleSet {
    pub min: i32,
    pub max: i32,
    pub step: u32,
}

impl AngleSet {
    pub fn new(min: i32, max: i32, step: u32) -> Self {
        Self { min, max, step }
    }

    /// Always zero degrees
    pub fn upright() -> Self {
        Self::new(0, 0, 1)
    }

    /// Number of distinct angles (at least one: `min`)
    pub fn len(&self) -> usize {
        if self.step == 0 || self.max <= self.min {
            return 1;
        }
        ((i64::from(self.max) - i64::from(self.min)) / i64::from(self.step)) as usize + 1
    }

    pub fn is_empty(&self) -> bool {
        false
    }

    pub fn values(&self) -> impl Iterator<Item = i32> + '_ {
        (0..self.len()).map(move |k| self.min + (k as i64 * i64::from(self.step)) as i32)
    }

    /// Uniform pick among the angles
    pub fn sample(&self, rng: &mut dyn RngCore) -> f64 {
        let k = rng.gen_range(0..self.len()) as i64;
        f64::from(self.min) + (k * i64::from(self.step)) as f64
    }
}

/// Everything one placement attempt needs to know about its target
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PlacementRequest {
    /// Center the sprite in `target`, scaled to fit within `fit` (aspect kept)
    LabelGuided {
        target: PixelBox,
        fit: (f64, f64),
        angle: f64,
    },
    /// Drop a sprite of `size` anywhere inside `region`
    Free {
        region: Region,
        size: (u32, u32),
        angle: f64,
    },
}

impl PlacementRequest {
    pub fn angle(&self) -> f64 {
        match self {
            PlacementRequest::LabelGuided { angle, .. } | PlacementRequest::Free { angle, .. } => {
                *angle
            }
        }
    }

    /// Size the sprite should be resized to before rotation
    pub fn target_size(&self, sprite_w: u32, sprite_h: u32) -> Result<TargetSize, SkipReason> {
        if sprite_w == 0 || sprite_h == 0 {
            return Err(SkipReason::InvalidSprite {
                width: sprite_w,
                height: sprite_h,
            });
        }

        match *self {
            PlacementRequest::LabelGuided { fit, .. } => {
                let (avg_w, avg_h) = fit;
                let scale = (avg_w / f64::from(sprite_w)).min(avg_h / f64::from(sprite_h));
                let width = (f64::from(sprite_w) * scale) as u32;
                let height = (f64::from(sprite_h) * scale) as u32;
                if width == 0 || height == 0 {
                    return Err(SkipReason::InvalidSprite { width, height });
                }
                Ok(TargetSize::Exact { width, height })
            }
            PlacementRequest::Free { size, .. } => Ok(TargetSize::Exact {
                width: size.0,
                height: size.1,
            }),
        }
    }

    /// Top-left corner for a rotated sprite of `bound_w` x `bound_h`
    pub fn offset(
        &self,
        bound_w: u32,
        bound_h: u32,
        rng: &mut dyn RngCore,
    ) -> Result<(i64, i64), SkipReason> {
        match self {
            PlacementRequest::LabelGuided { target, .. } => {
                Ok(guided::centered_offset(target, bound_w, bound_h))
            }
            PlacementRequest::Free { region, .. } => region.random_offset(bound_w, bound_h, rng),
        }
    }
}
