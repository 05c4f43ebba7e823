//! Scene construction: the placement loop and what it produces

pub mod builder;
pub mod config;
pub mod dataset;

pub use builder::SceneBuilder;
pub use config::{
    CountRange, DatasetConfig, PlacementMode, RegionSpec, SceneConfig, VisualizationConfig,
};
pub use dataset::{generate_dataset, generate_scenes, DatasetSummary};

use crate::assets::Image;
use crate::error::SkipReason;
use crate::utils::ImageUtils;
use crate::Result;
use cardsynth_core::{LabelFile, LabeledBox, NormalizedBox};
use serde::Serialize;
use std::collections::BTreeMap;
use std::path::Path;
use std::time::Duration;

/// Result of one placement attempt
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AttemptOutcome {
    Placed(LabeledBox),
    Skipped(SkipReason),
}

/// Attempt counts for one scene
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct SceneStats {
    pub attempts: usize,
    pub placed: usize,
    /// Skipped attempts keyed by [`SkipReason::kind`]
    pub skipped: BTreeMap<String, usize>,
    pub processing_time_ms: u64,
}

impl SceneStats {
    fn from_outcomes(outcomes: &[AttemptOutcome], elapsed: Duration) -> Self {
        let mut stats = SceneStats {
            attempts: outcomes.len(),
            processing_time_ms: elapsed.as_millis() as u64,
            ..Default::default()
        };

        for outcome in outcomes {
            match outcome {
                AttemptOutcome::Placed(_) => stats.placed += 1,
                AttemptOutcome::Skipped(reason) => {
                    *stats.skipped.entry(reason.kind().to_string()).or_insert(0) += 1;
                }
            }
        }
        stats
    }

    pub fn skipped_total(&self) -> usize {
        self.skipped.values().sum()
    }
}

/// Serializable summary of a saved scene
#[derive(Debug, Clone, Serialize)]
pub struct SceneReport {
    pub name: String,
    pub width: u32,
    pub height: u32,
    pub boxes: Vec<LabeledBox>,
    pub stats: SceneStats,
}

/// Composited canvas plus the boxes of every placement that succeeded
#[derive(Debug, Clone)]
pub struct Scene {
    canvas: Image,
    outcomes: Vec<AttemptOutcome>,
    boxes: Vec<LabeledBox>,
    stats: SceneStats,
}

impl Scene {
    pub fn new(canvas: Image, outcomes: Vec<AttemptOutcome>, elapsed: Duration) -> Self {
        let boxes = outcomes
            .iter()
            .filter_map(|outcome| match outcome {
                AttemptOutcome::Placed(bbox) => Some(*bbox),
                AttemptOutcome::Skipped(_) => None,
            })
            .collect();
        let stats = SceneStats::from_outcomes(&outcomes, elapsed);

        Self {
            canvas,
            outcomes,
            boxes,
            stats,
        }
    }

    pub fn canvas(&self) -> &Image {
        &self.canvas
    }

    /// Realized boxes, in attempt order
    pub fn boxes(&self) -> &[LabeledBox] {
        &self.boxes
    }

    /// Every attempt, placed or skipped
    pub fn outcomes(&self) -> &[AttemptOutcome] {
        &self.outcomes
    }

    pub fn stats(&self) -> &SceneStats {
        &self.stats
    }

    /// Realized boxes normalized to the canvas size, clipped to `[0, 1]`
    pub fn labels(&self) -> Vec<NormalizedBox> {
        let (w, h) = self.canvas.dimensions();
        self.boxes
            .iter()
            .map(|b| b.to_normalized(w, h).clamped())
            .collect()
    }

    pub fn label_file(&self) -> LabelFile {
        LabelFile::new(self.labels())
    }

    /// Copy of the canvas with every realized box outlined
    pub fn annotated(&self, visualization: &VisualizationConfig) -> Image {
        let mut preview = self.canvas.clone();
        let boxes: Vec<_> = self.boxes.iter().map(|b| b.bbox).collect();
        ImageUtils::draw_boxes(
            preview.as_rgba_mut(),
            &boxes,
            image::Rgba(visualization.color),
            visualization.thickness,
        );
        preview
    }

    /// Write the image and its label file
    pub fn save<P: AsRef<Path>, Q: AsRef<Path>>(&self, image_path: P, label_path: Q) -> Result<()> {
        self.canvas.save(image_path)?;
        self.label_file().save(label_path)
    }

    pub fn report(&self, name: &str) -> SceneReport {
        let (width, height) = self.canvas.dimensions();
        SceneReport {
            name: name.to_string(),
            width,
            height,
            boxes: self.boxes.clone(),
            stats: self.stats.clone(),
        }
    }
}
