//! Command line front end

use anyhow::Context;
use cardsynth_cv::augment::{augment_directory, clear_augmented, Augmentation};
use cardsynth_cv::scene::{generate_dataset, DatasetConfig, PlacementMode, SceneConfig};
use clap::{Parser, Subcommand, ValueEnum};
use rand::rngs::StdRng;
use rand::SeedableRng;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(
    name = "cardsynth",
    version,
    about = "Synthetic labeled card scenes for detector training"
)]
pub struct Cli {
    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Composite cards onto a table and write images plus labels.
    Generate(GenerateArgs),
    /// Write augmented copies of every card image, or remove them.
    Augment(AugmentArgs),
}

#[derive(Parser, Debug)]
struct GenerateArgs {
    /// Dataset config JSON. Flags below override its values.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Directory searched recursively for card sprites.
    #[arg(long)]
    cards: Option<PathBuf>,

    /// Blank table background image.
    #[arg(long)]
    table: Option<PathBuf>,

    /// Label tree used by label-guided placement.
    #[arg(long)]
    labels: Option<PathBuf>,

    /// Output directory (images/, labels/, report.json).
    #[arg(long)]
    out: Option<PathBuf>,

    /// Placement mode.
    #[arg(long, value_enum)]
    mode: Option<ModeChoice>,

    /// Number of scenes to generate.
    #[arg(long)]
    scenes: Option<usize>,

    /// Base seed; scene i uses seed + i.
    #[arg(long)]
    seed: Option<u64>,

    /// Output image extension (jpg or png).
    #[arg(long)]
    format: Option<String>,

    /// Class id written for every box.
    #[arg(long)]
    class_id: Option<u32>,

    /// Also write previews with the boxes drawn.
    #[arg(long)]
    annotate: bool,
}

#[derive(Parser, Debug)]
struct AugmentArgs {
    /// Root directory of card images.
    root: PathBuf,

    /// Remove previously generated variants instead.
    #[arg(long)]
    clear: bool,

    /// Seed for variant names and noise.
    #[arg(long, default_value_t = 0)]
    seed: u64,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
enum ModeChoice {
    Free,
    Guided,
}

pub fn run(cli: Cli) -> anyhow::Result<()> {
    match cli.cmd {
        Command::Generate(args) => cmd_generate(args),
        Command::Augment(args) => cmd_augment(args),
    }
}

/// Config file (or defaults) with command line overrides applied
fn dataset_config(args: &GenerateArgs) -> anyhow::Result<DatasetConfig> {
    let mut config = match &args.config {
        Some(path) => DatasetConfig::from_json_file(path)?,
        None => DatasetConfig::default(),
    };

    if let Some(mode) = args.mode {
        let wanted = match mode {
            ModeChoice::Free => PlacementMode::Free,
            ModeChoice::Guided => PlacementMode::LabelGuided,
        };
        if wanted != config.scene.mode {
            let class_id = config.scene.class_id;
            config.scene = match wanted {
                PlacementMode::Free => SceneConfig::free(),
                PlacementMode::LabelGuided => SceneConfig::label_guided(),
            };
            config.scene.class_id = class_id;
        }
    }

    if let Some(cards) = &args.cards {
        config.cards_dir = cards.clone();
    }
    if let Some(table) = &args.table {
        config.background = table.clone();
    }
    if let Some(labels) = &args.labels {
        config.labels_dir = Some(labels.clone());
    }
    if let Some(out) = &args.out {
        config.output_dir = out.clone();
    }
    if let Some(scenes) = args.scenes {
        config.scenes = scenes;
    }
    if let Some(seed) = args.seed {
        config.seed = seed;
    }
    if let Some(format) = &args.format {
        config.image_format = format.trim_start_matches('.').to_lowercase();
    }
    if let Some(class_id) = args.class_id {
        config.scene.class_id = class_id;
    }
    if args.annotate {
        config.scene.visualization.enabled = true;
    }

    Ok(config)
}

fn cmd_generate(args: GenerateArgs) -> anyhow::Result<()> {
    let config = dataset_config(&args)?;
    tracing::info!(
        scenes = config.scenes,
        mode = ?config.scene.mode,
        output = %config.output_dir.display(),
        "generating dataset"
    );
    let summary = generate_dataset(&config).context("dataset generation failed")?;

    println!("Generation completed:");
    println!("  - Scenes: {}", summary.scenes);
    println!("  - Boxes: {}", summary.boxes);
    for (reason, count) in &summary.skipped {
        println!("  - Skipped ({}): {}", reason, count);
    }
    println!("  - Output: {:?}", config.output_dir);
    Ok(())
}

fn cmd_augment(args: AugmentArgs) -> anyhow::Result<()> {
    if args.clear {
        let removed = clear_augmented(&args.root)?;
        println!("Removed {} augmented images from {:?}", removed, args.root);
        return Ok(());
    }

    let mut rng = StdRng::seed_from_u64(args.seed);
    let summary = augment_directory(&args.root, &Augmentation::standard_set(), &mut rng)?;
    println!(
        "Augmented {} images ({} written, {} unreadable)",
        summary.sources, summary.written, summary.failed
    );
    Ok(())
}
