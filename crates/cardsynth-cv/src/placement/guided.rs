//! Label-guided placement: sprites are centered on boxes from existing labels
//!
//! All sprites of one scene are scaled to fit the average box size of the
//! labels chosen for that scene, so one unusually large or small label
//! affects every card drawn alongside it.

use super::{AngleSet, PlacementRequest};
use crate::assets::Image;
use crate::scene::config::CountRange;
use crate::traits::{Detection, Detector, PlacementPolicy};
use cardsynth_core::{NormalizedBox, PixelBox};
use rand::seq::index;
use rand::RngCore;

/// Offset that centers a `bound_w` x `bound_h` footprint on `target` (floor division)
pub fn centered_offset(target: &PixelBox, bound_w: u32, bound_h: u32) -> (i64, i64) {
    let box_w = i64::from(target.width());
    let box_h = i64::from(target.height());
    (
        i64::from(target.x1) + (box_w - i64::from(bound_w)).div_euclid(2),
        i64::from(target.y1) + (box_h - i64::from(bound_h)).div_euclid(2),
    )
}

#[derive(Debug, Clone, PartialEq)]
pub struct LabelGuided {
    targets: Vec<PixelBox>,
    average: (f64, f64),
    angles: AngleSet,
}

impl LabelGuided {
    /// One attempt per target box, in order
    pub fn new(targets: Vec<PixelBox>, angles: AngleSet) -> Self {
        let average = average_size(&targets);
        Self {
            targets,
            average,
            angles,
        }
    }

    /// Pick a random subset of `pool` (no repeats) sized by `count`
    pub fn sample(
        pool: &[PixelBox],
        count: CountRange,
        angles: AngleSet,
        rng: &mut dyn RngCore,
    ) -> Self {
        let amount = count.sample(rng).min(pool.len());
        let targets = index::sample(rng, pool.len(), amount)
            .into_iter()
            .map(|i| pool[i])
            .collect();
        Self::new(targets, angles)
    }

    /// Scale normalized labels to the canvas, then sample.
    ///
    /// Labels that come out empty or larger than the canvas are left out of
    /// the pool.
    pub fn from_labels(
        labels: &[NormalizedBox],
        canvas_w: u32,
        canvas_h: u32,
        count: CountRange,
        angles: AngleSet,
        rng: &mut dyn RngCore,
    ) -> Self {
        let pool: Vec<PixelBox> = labels
            .iter()
            .map(|label| label.to_pixel(canvas_w, canvas_h))
            .filter(|bbox| usable_target(bbox, canvas_w, canvas_h))
            .collect();
        if pool.len() < labels.len() {
            tracing::debug!(dropped = labels.len() - pool.len(), "unusable label targets");
        }
        Self::sample(&pool, count, angles, rng)
    }

    /// Reuse detector output as placement targets
    pub fn from_detections(detections: &[Detection], angles: AngleSet) -> Self {
        Self::new(
            detections.iter().map(Detection::to_pixel_box).collect(),
            angles,
        )
    }

    /// Run `detector` on a scene and target everything it finds
    pub fn from_detector(
        detector: &dyn Detector,
        image: &Image,
        angles: AngleSet,
    ) -> crate::Result<Self> {
        let detections = detector.detect(image)?;
        tracing::debug!(found = detections.len(), "detector targets");
        Ok(Self::from_detections(&detections, angles))
    }

    pub fn targets(&self) -> &[PixelBox] {
        &self.targets
    }

    /// Mean box width and height over the targets
    pub fn average_size(&self) -> (f64, f64) {
        self.average
    }
}

fn usable_target(bbox: &PixelBox, canvas_w: u32, canvas_h: u32) -> bool {
    bbox.is_valid()
        && i64::from(bbox.width()) <= i64::from(canvas_w)
        && i64::from(bbox.height()) <= i64::from(canvas_h)
}

fn average_size(boxes: &[PixelBox]) -> (f64, f64) {
    if boxes.is_empty() {
        return (0.0, 0.0);
    }

    let n = boxes.len() as f64;
    let total_w: i64 = boxes.iter().map(|b| i64::from(b.width())).sum();
    let total_h: i64 = boxes.iter().map(|b| i64::from(b.height())).sum();
    (total_w as f64 / n, total_h as f64 / n)
}

impl PlacementPolicy for LabelGuided {
    fn attempts(&self) -> usize {
        self.targets.len()
    }

    fn request(&self, attempt: usize, rng: &mut dyn RngCore) -> PlacementRequest {
        PlacementRequest::LabelGuided {
            target: self.targets[attempt % self.targets.len().max(1)],
            fit: self.average,
            angle: self.angles.sample(rng),
        }
    }
}
