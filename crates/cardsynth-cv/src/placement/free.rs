//! Free placement: uniform random position inside an allowed rectangle

use super::{AngleSet, PlacementRequest};
use crate::error::SkipReason;
use crate::traits::PlacementPolicy;
use rand::{Rng, RngCore};
use serde::{Deserialize, Serialize};

/// Allowed rectangle for sprite footprints, in canvas pixels
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Region {
    pub x_min: i64,
    pub y_min: i64,
    pub x_max: i64,
    pub y_max: i64,
}

impl Region {
    pub fn new(x_min: i64, y_min: i64, x_max: i64, y_max: i64) -> Self {
        Self {
            x_min,
            y_min,
            x_max,
            y_max,
        }
    }

    /// Whole canvas minus `margin` on every side
    pub fn with_margin(canvas_w: u32, canvas_h: u32, margin: u32) -> Self {
        let m = i64::from(margin);
        Self::new(m, m, i64::from(canvas_w) - m, i64::from(canvas_h) - m)
    }

    /// Draw an offset so that the footprint stays inside the region.
    ///
    /// Fails when the region is not strictly larger than the footprint.
    pub fn random_offset(
        &self,
        bound_w: u32,
        bound_h: u32,
        rng: &mut dyn RngCore,
    ) -> Result<(i64, i64), SkipReason> {
        let max_x = self.x_max - i64::from(bound_w);
        let max_y = self.y_max - i64::from(bound_h);
        if max_x <= self.x_min || max_y <= self.y_min {
            return Err(SkipReason::RegionTooSmall {
                available_w: self.x_max - self.x_min,
                available_h: self.y_max - self.y_min,
                bound_w,
                bound_h,
            });
        }

        Ok((
            rng.gen_range(self.x_min..=max_x),
            rng.gen_range(self.y_min..=max_y),
        ))
    }
}

/// Fixed-size sprites scattered at random inside a region
#[derive(Debug, Clone, PartialEq)]
pub struct FreePlacement {
    region: Region,
    size: (u32, u32),
    attempts: usize,
    angles: AngleSet,
}

impl FreePlacement {
    pub fn new(region: Region, size: (u32, u32), attempts: usize, angles: AngleSet) -> Self {
        Self {
            region,
            size,
            attempts,
            angles,
        }
    }
}

impl PlacementPolicy for FreePlacement {
    fn attempts(&self) -> usize {
        self.attempts
    }

    fn request(&self, _attempt: usize, rng: &mut dyn RngCore) -> PlacementRequest {
        PlacementRequest::Free {
            region: self.region,
            size: self.size,
            angle: self.angles.sample(rng),
        }
    }
}
