//! Scene and dataset configuration

use crate::placement::{AngleSet, Region};
use crate::Result;
use anyhow::Context;
use rand::{Rng, RngCore};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// How placement targets are chosen
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PlacementMode {
    /// Random positions inside the allowed region
    Free,
    /// Centered on boxes taken from existing labels
    LabelGuided,
}

/// Inclusive range of placement attempts per scene
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CountRange {
    pub min: usize,
    pub max: usize,
}

impl CountRange {
    pub fn new(min: usize, max: usize) -> Self {
        Self { min, max }
    }

    pub fn exactly(n: usize) -> Self {
        Self::new(n, n)
    }

    pub fn sample(&self, rng: &mut dyn RngCore) -> usize {
        if self.max <= self.min {
            return self.min;
        }
        rng.gen_range(self.min..=self.max)
    }
}

/// Allowed region for free placement, resolved once the canvas size is known
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RegionSpec {
    /// Keep this many pixels clear on every side
    Margin(u32),
    Explicit {
        x_min: i64,
        y_min: i64,
        x_max: i64,
        y_max: i64,
    },
}

impl RegionSpec {
    pub fn resolve(&self, canvas_w: u32, canvas_h: u32) -> Region {
        match *self {
            RegionSpec::Margin(margin) => Region::with_margin(canvas_w, canvas_h, margin),
            RegionSpec::Explicit {
                x_min,
                y_min,
                x_max,
                y_max,
            } => Region::new(x_min, y_min, x_max, y_max),
        }
    }
}

/// Preview rendering of realized boxes
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct VisualizationConfig {
    pub enabled: bool,
    pub color: [u8; 4],
    pub thickness: u32,
}

impl Default for VisualizationConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            color: [0, 255, 0, 255],
            thickness: 2,
        }
    }
}

/// Everything that shapes a single scene
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SceneConfig {
    pub mode: PlacementMode,
    /// Class written for every realized box
    pub class_id: u32,
    pub cards_per_scene: CountRange,
    pub angles: AngleSet,
    /// Display size in free mode, before rotation
    pub card_size: (u32, u32),
    pub region: RegionSpec,
    pub visualization: VisualizationConfig,
}

impl Default for SceneConfig {
    fn default() -> Self {
        Self::free()
    }
}

impl SceneConfig {
    /// Random scatter of 100x140 cards, tilted up to 30 degrees
    pub fn free() -> Self {
        Self {
            mode: PlacementMode::Free,
            class_id: 0,
            cards_per_scene: CountRange::new(0, 15),
            angles: AngleSet::new(-30, 30, 5),
            card_size: (100, 140),
            region: RegionSpec::Margin(100),
            visualization: VisualizationConfig::default(),
        }
    }

    /// Cards dropped onto 10 to 15 sampled label boxes, tilted up to 90 degrees
    pub fn label_guided() -> Self {
        Self {
            mode: PlacementMode::LabelGuided,
            cards_per_scene: CountRange::new(10, 15),
            angles: AngleSet::new(-90, 90, 15),
            ..Self::free()
        }
    }

    /// Load from JSON. Missing fields take the free-mode defaults.
    pub fn from_json_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let text = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config: {:?}", path))?;
        serde_json::from_str(&text).with_context(|| format!("Failed to parse config: {:?}", path))
    }
}

/// Batch generation of many scenes into a dataset directory
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DatasetConfig {
    pub scene: SceneConfig,
    /// Directory searched recursively for card sprites
    pub cards_dir: PathBuf,
    /// Blank table image
    pub background: PathBuf,
    /// Label tree for label-guided mode
    pub labels_dir: Option<PathBuf>,
    pub output_dir: PathBuf,
    pub scenes: usize,
    /// Scene `i` is built from seed `seed + i`
    pub seed: u64,
    /// Output image extension, `jpg` or `png`
    pub image_format: String,
    pub name_prefix: String,
}

impl Default for DatasetConfig {
    fn default() -> Self {
        Self {
            scene: SceneConfig::default(),
            cards_dir: "cards".into(),
            background: "table.png".into(),
            labels_dir: None,
            output_dir: "synthetic".into(),
            scenes: 1,
            seed: 0,
            image_format: "jpg".to_string(),
            name_prefix: "scene".to_string(),
        }
    }
}

impl DatasetConfig {
    pub fn from_json_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let text = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config: {:?}", path))?;
        serde_json::from_str(&text).with_context(|| format!("Failed to parse config: {:?}", path))
    }

    /// File stem for scene `index`
    pub fn scene_name(&self, index: usize) -> String {
        format!("{}_{:05}", self.name_prefix, index)
    }
}
