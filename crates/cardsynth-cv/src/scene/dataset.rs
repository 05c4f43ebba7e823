//! Batch generation of labeled scenes
//!
//! Output layout under `output_dir`:
//!
//! ```text
//! images/<name>.<ext>
//! labels/<name>.txt
//! previews/<name>.png   (only with visualization enabled)
//! report.json
//! ```

use super::config::{DatasetConfig, PlacementMode};
use super::{SceneBuilder, SceneReport};
use crate::assets::{load_label_pool, AssetStore, Image, SpritePool};
use crate::Result;
use anyhow::Context;
use cardsynth_core::NormalizedBox;
use rand::rngs::StdRng;
use rand::SeedableRng;
use serde::Serialize;
use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

/// What a dataset run produced
#[derive(Debug, Clone, Default, Serialize)]
pub struct DatasetSummary {
    pub scenes: usize,
    pub boxes: usize,
    pub skipped: BTreeMap<String, usize>,
    pub reports: Vec<SceneReport>,
}

impl DatasetSummary {
    fn from_reports(reports: Vec<SceneReport>) -> Self {
        let mut summary = DatasetSummary {
            scenes: reports.len(),
            ..Default::default()
        };

        for report in &reports {
            summary.boxes += report.boxes.len();
            for (kind, count) in &report.stats.skipped {
                *summary.skipped.entry(kind.clone()).or_insert(0) += count;
            }
        }

        summary.reports = reports;
        summary
    }

    /// Write the summary as pretty JSON
    pub fn export_json(&self, output_path: &Path) -> Result<()> {
        let json = serde_json::to_string_pretty(self)
            .context("Failed to serialize dataset summary")?;

        fs::write(output_path, json)
            .with_context(|| format!("Failed to write JSON to: {:?}", output_path))?;

        Ok(())
    }
}

/// Load sprites, background and labels named by `config`, then generate.
///
/// A missing or unreadable background is fatal; unreadable sprites and
/// label files are skipped.
pub fn generate_dataset(config: &DatasetConfig) -> Result<DatasetSummary> {
    let background = Image::load(&config.background)
        .with_context(|| format!("Failed to load background: {:?}", config.background))?;

    let store = AssetStore::new().add_root(&config.cards_dir);
    let sprites = SpritePool::from_store(&store);
    if !sprites.skipped().is_empty() {
        tracing::warn!(
            unreadable = sprites.skipped().len(),
            usable = sprites.len(),
            "some card images could not be decoded"
        );
    }

    let labels = match (&config.scene.mode, &config.labels_dir) {
        (PlacementMode::LabelGuided, Some(dir)) => load_label_pool(dir),
        (PlacementMode::LabelGuided, None) => {
            anyhow::bail!("label-guided mode needs a labels directory")
        }
        (PlacementMode::Free, _) => Vec::new(),
    };

    if config.scene.mode == PlacementMode::LabelGuided && labels.is_empty() {
        anyhow::bail!("no labels found for label-guided placement");
    }

    generate_scenes(config, &sprites, &background, &labels)
}

/// Build `config.scenes` scenes and write them to `config.output_dir`.
///
/// Scene `i` draws from its own generator seeded with `seed + i`, so the
/// output does not depend on the order scenes are built in.
pub fn generate_scenes(
    config: &DatasetConfig,
    sprites: &SpritePool,
    background: &Image,
    labels: &[NormalizedBox],
) -> Result<DatasetSummary> {
    let images_dir = config.output_dir.join("images");
    let labels_dir = config.output_dir.join("labels");
    for dir in [&images_dir, &labels_dir] {
        fs::create_dir_all(dir)
            .with_context(|| format!("Failed to create directory: {:?}", dir))?;
    }

    let builder = SceneBuilder::new(sprites).with_class_id(config.scene.class_id);

    let build_one = |index: usize| -> Result<SceneReport> {
        let name = config.scene_name(index);
        let mut rng = StdRng::seed_from_u64(config.seed.wrapping_add(index as u64));

        let scene = builder.build_from_config(background, &config.scene, labels, &mut rng)?;

        let image_path = images_dir.join(format!("{}.{}", name, config.image_format));
        let label_path = labels_dir.join(format!("{}.txt", name));
        scene.save(&image_path, &label_path)?;

        if config.scene.visualization.enabled {
            let preview_path = config.output_dir.join("previews").join(format!("{}.png", name));
            scene
                .annotated(&config.scene.visualization)
                .save(&preview_path)?;
        }

        Ok(scene.report(&name))
    };

    #[cfg(feature = "parallel")]
    let reports: Result<Vec<SceneReport>> = {
        use rayon::prelude::*;
        (0..config.scenes).into_par_iter().map(build_one).collect()
    };

    #[cfg(not(feature = "parallel"))]
    let reports: Result<Vec<SceneReport>> = (0..config.scenes).map(build_one).collect();

    let summary = DatasetSummary::from_reports(reports?);
    summary.export_json(&config.output_dir.join("report.json"))?;

    tracing::info!(
        scenes = summary.scenes,
        boxes = summary.boxes,
        output = ?config.output_dir,
        "dataset written"
    );
    Ok(summary)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scene::config::{CountRange, SceneConfig};
    use cardsynth_core::LabelFile;
    use image::{Rgb, RgbImage, Rgba, RgbaImage};

    fn write_assets(root: &Path) {
        let cards = root.join("cards").join("set_a");
        fs::create_dir_all(&cards).unwrap();
        RgbaImage::from_pixel(63, 88, Rgba([250, 200, 0, 255]))
            .save(cards.join("pikachu.png"))
            .unwrap();
        RgbImage::from_pixel(63, 88, Rgb([200, 30, 30]))
            .save(cards.join("charizard.jpg"))
            .unwrap();
        RgbImage::from_pixel(640, 480, Rgb([10, 90, 10]))
            .save(root.join("table.png"))
            .unwrap();
    }

    fn config(root: &Path) -> DatasetConfig {
        DatasetConfig {
            scene: SceneConfig {
                cards_per_scene: CountRange::new(3, 6),
                ..SceneConfig::free()
            },
            cards_dir: root.join("cards"),
            background: root.join("table.png"),
            labels_dir: None,
            output_dir: root.join("out"),
            scenes: 3,
            seed: 42,
            image_format: "png".to_string(),
            name_prefix: "scene".to_string(),
        }
    }

    #[test]
    fn test_generate_free_dataset() -> Result<()> {
        let dir = tempfile::tempdir()?;
        write_assets(dir.path());
        let cfg = config(dir.path());

        let summary = generate_dataset(&cfg)?;
        assert_eq!(summary.scenes, 3);

        for report in &summary.reports {
            let label_path = cfg.output_dir.join("labels").join(format!("{}.txt", report.name));
            let labels = LabelFile::load(label_path)?;
            assert_eq!(labels.len(), report.boxes.len());
            assert!(report.boxes.len() <= report.stats.attempts);
            assert!(cfg.output_dir.join("images").join(format!("{}.png", report.name)).exists());
        }
        assert!(cfg.output_dir.join("report.json").exists());
        Ok(())
    }

    #[test]
    fn test_generation_is_reproducible() -> Result<()> {
        let dir = tempfile::tempdir()?;
        write_assets(dir.path());
        let cfg = config(dir.path());

        let first = generate_dataset(&cfg)?;
        let again = generate_dataset(&cfg)?;
        let boxes = |s: &DatasetSummary| {
            s.reports.iter().map(|r| r.boxes.clone()).collect::<Vec<_>>()
        };
        assert_eq!(boxes(&first), boxes(&again));
        Ok(())
    }

    #[test]
    fn test_missing_background_is_fatal() {
        let dir = tempfile::tempdir().unwrap();
        write_assets(dir.path());
        let mut cfg = config(dir.path());
        cfg.background = dir.path().join("no_table.png");

        assert!(generate_dataset(&cfg).is_err());
    }

    #[test]
    fn test_label_guided_requires_labels() {
        let dir = tempfile::tempdir().unwrap();
        write_assets(dir.path());
        let mut cfg = config(dir.path());
        cfg.scene = SceneConfig::label_guided();

        assert!(generate_dataset(&cfg).is_err());

        let labels_dir = dir.path().join("predict").join("labels");
        fs::create_dir_all(&labels_dir).unwrap();
        fs::write(
            labels_dir.join("frame.txt"),
            "0 0.5 0.5 0.2 0.3\n0 0.25 0.25 0.2 0.3\n",
        )
        .unwrap();
        cfg.labels_dir = Some(dir.path().join("predict"));
        cfg.scene.visualization.enabled = true;

        let summary = generate_dataset(&cfg).unwrap();
        assert_eq!(summary.scenes, 3);
        assert!(cfg.output_dir.join("previews").join("scene_00000.png").exists());
    }
}
