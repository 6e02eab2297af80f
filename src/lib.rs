//! xrayprep: chest X-ray detection dataset preparation.
//!
//! Turns an annotation table plus 8-bit chest X-ray images into training
//! trees for detection frameworks. Every image is transformed into a
//! fixed-size 3-channel image (with its boxes remapped along), written once,
//! and annotated in PASCAL VOC XML or YOLO text.
//!
//! # Modules
//!
//! - [`geometry`]: box types and area / coordinate helpers
//! - [`records`]: annotation table rows and their normalization
//! - [`transform`]: pixel transforms coupled with a box-aware resize
//! - [`writer`]: VOC and YOLO dataset writers
//! - [`pipeline`]: the per-image loop driving a writer
//! - [`intensity`]: display conversion of decoded DICOM samples
//! - [`train_config`]: detector training configuration file
//! - [`error`]: error types

pub mod classes;
pub mod config;
pub mod error;
pub mod geometry;
pub mod intensity;
pub mod pipeline;
pub mod records;
pub mod report;
pub mod split;
pub mod train_config;
pub mod transform;
pub mod writer;

use std::path::{Path, PathBuf};

use clap::{Parser, Subcommand};

use config::{OutputFormat, PrepConfig, TransformKind};
use pipeline::{prepare_dataset, PrepareOptions};
use records::{read_records_csv, ImageRecord};
use report::PrepReport;
use train_config::TrainingConfig;
use transform::{EqualizeTransform, GrayscaleTransform, ImageTransform, MaskTransform};
use writer::{VocWriter, YoloWriter};

pub use error::PrepError;

/// The xrayprep CLI application.
#[derive(Parser)]
#[command(name = "xrayprep")]
#[command(version, author, about)]
#[command(propagate_version = true)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

/// Available subcommands.
#[derive(Subcommand)]
enum Commands {
    /// Transform images and write a VOC or YOLO training tree.
    Prepare(PrepareArgs),
    /// Write the detector training configuration as JSON.
    TrainConfig(TrainConfigArgs),
}

/// Arguments for the prepare subcommand.
#[derive(clap::Args)]
struct PrepareArgs {
    /// Annotation CSV (image_id, class_name, rad_id, x_min, y_min, x_max, y_max).
    #[arg(long)]
    annotations: PathBuf,

    /// Directory holding `<image_id>.<ext>` images.
    #[arg(long)]
    images: PathBuf,

    /// Output root.
    #[arg(long)]
    output: PathBuf,

    /// YAML config file; flags given on the command line take precedence.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Output annotation format.
    #[arg(long, value_enum)]
    format: Option<OutputFormat>,

    /// Pixel transform.
    #[arg(long, value_enum)]
    transform: Option<TransformKind>,

    /// Output side length in pixels.
    #[arg(long)]
    size: Option<u32>,

    /// Directory of masks named like the images (mask transform).
    #[arg(long)]
    mask_dir: Option<PathBuf>,

    /// CLAHE clip limit (equalize transform).
    #[arg(long)]
    clahe_clip_limit: Option<f32>,

    /// CLAHE tiles per axis (equalize transform).
    #[arg(long)]
    clahe_grid: Option<u32>,

    /// Image file extension, without the dot.
    #[arg(long)]
    image_ext: Option<String>,

    /// Delete the output root before writing.
    #[arg(long)]
    clear: bool,

    /// Fraction of images to list in val.txt.
    #[arg(long)]
    val_fraction: Option<f64>,

    /// Seed for the train/val split.
    #[arg(long)]
    seed: Option<u64>,

    /// Record failing images and continue instead of aborting.
    #[arg(long)]
    skip_failed: bool,
}

/// Arguments for the train-config subcommand.
#[derive(clap::Args)]
struct TrainConfigArgs {
    /// Output JSON file (stdout if omitted).
    #[arg(long)]
    output: Option<PathBuf>,

    /// Directory holding the base mmdetection configs.
    #[arg(long, default_value = train_config::DEFAULT_BASE_DIR)]
    base_dir: String,

    /// Number of training epochs.
    #[arg(long)]
    epochs: Option<u32>,

    /// Adam learning rate.
    #[arg(long)]
    lr: Option<f64>,
}

/// Run the xrayprep CLI.
///
/// This is the main entry point for the CLI, called from `main.rs`.
pub fn run() -> Result<(), PrepError> {
    let cli = Cli::parse();

    match cli.command {
        Some(Commands::Prepare(args)) => run_prepare(args),
        Some(Commands::TrainConfig(args)) => run_train_config(args),
        None => {
            println!("xrayprep {}", env!("CARGO_PKG_VERSION"));
            println!();
            println!("Chest X-ray detection dataset preparation.");
            println!();
            println!("Run 'xrayprep --help' for usage information.");
            Ok(())
        }
    }
}

/// Layers command-line flags over the config file (or defaults).
fn resolve_config(args: &PrepareArgs) -> Result<PrepConfig, PrepError> {
    let mut config = match &args.config {
        Some(path) => PrepConfig::load(path)?,
        None => PrepConfig::default(),
    };

    if let Some(format) = args.format {
        config.format = format;
    }
    if let Some(transform) = args.transform {
        config.transform = transform;
    }
    if let Some(size) = args.size {
        config.size = size;
    }
    if let Some(mask_dir) = &args.mask_dir {
        config.mask_dir = Some(mask_dir.clone());
    }
    if let Some(clip_limit) = args.clahe_clip_limit {
        config.clahe.clip_limit = clip_limit;
    }
    if let Some(grid) = args.clahe_grid {
        config.clahe.grid = (grid, grid);
    }
    if let Some(ext) = &args.image_ext {
        config.image_extension = ext.trim_start_matches('.').to_string();
    }
    if args.clear {
        config.clear = true;
    }
    if let Some(fraction) = args.val_fraction {
        config.val_fraction = fraction;
    }
    if let Some(seed) = args.seed {
        config.seed = Some(seed);
    }
    if args.skip_failed {
        config.skip_failed = true;
    }

    config.validate()?;
    Ok(config)
}

/// Execute the prepare subcommand.
fn run_prepare(args: PrepareArgs) -> Result<(), PrepError> {
    let config = resolve_config(&args)?;
    let records = read_records_csv(&args.annotations)?;
    log::info!(
        "read {} annotation row(s) from {}",
        records.len(),
        args.annotations.display()
    );

    let mut report = match config.transform {
        TransformKind::Grayscale => {
            prepare_with(&args, &config, records, GrayscaleTransform::new(config.size))?
        }
        TransformKind::Mask => {
            let mask_dir = config.mask_dir.as_deref().ok_or_else(|| {
                PrepError::InvalidConfig("the mask transform needs mask_dir".to_string())
            })?;
            let transform = MaskTransform::new(mask_dir, config.size)?;
            prepare_with(&args, &config, records, transform)?
        }
        TransformKind::Equalize => prepare_with(
            &args,
            &config,
            records,
            EqualizeTransform::new(config.size, config.clahe),
        )?,
    };

    report.format = format_name(config.format).to_string();
    report.transform = transform_name(config.transform).to_string();
    print!("{}", report);
    Ok(())
}

fn prepare_with<T: ImageTransform>(
    args: &PrepareArgs,
    config: &PrepConfig,
    records: Vec<ImageRecord>,
    transform: T,
) -> Result<PrepReport, PrepError> {
    let opts = PrepareOptions::from(config);
    let images_dir: &Path = &args.images;

    match config.format {
        OutputFormat::Voc => {
            let writer = VocWriter::new(&args.output, config.clear, transform)?;
            prepare_dataset(&writer, images_dir, records, &opts)
        }
        OutputFormat::Yolo => {
            let writer = YoloWriter::new(&args.output, config.clear, transform)?
                .with_manifest_extension(config.image_extension.clone());
            prepare_dataset(&writer, images_dir, records, &opts)
        }
    }
}

fn format_name(format: OutputFormat) -> &'static str {
    match format {
        OutputFormat::Voc => "voc",
        OutputFormat::Yolo => "yolo",
    }
}

fn transform_name(transform: TransformKind) -> &'static str {
    match transform {
        TransformKind::Grayscale => "grayscale",
        TransformKind::Mask => "mask",
        TransformKind::Equalize => "equalize",
    }
}

/// Execute the train-config subcommand.
fn run_train_config(args: TrainConfigArgs) -> Result<(), PrepError> {
    let mut config = TrainingConfig::default().with_base_dir(&args.base_dir);
    if let Some(epochs) = args.epochs {
        config.total_epochs = epochs;
    }
    if let Some(lr) = args.lr {
        config.optimizer.lr = lr;
    }
    config.validate()?;

    match &args.output {
        Some(path) => {
            config.write_json(path)?;
            log::info!("wrote training config to {}", path.display());
        }
        None => println!("{}", config.to_json_string()?),
    }
    Ok(())
}
