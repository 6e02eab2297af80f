//! The per-image preparation loop.
//!
//! For every image referenced by the annotation table: load
//! `<images_dir>/<image_id>.<ext>`, normalize its rows, and hand it to a
//! [`DatasetWriter`]. Once all images are done, the processed IDs are split
//! and written as manifests.

use std::path::Path;

use image::DynamicImage;

use crate::config::PrepConfig;
use crate::error::PrepError;
use crate::records::{convert, group_by_image, ImageRecord};
use crate::report::{PrepIssue, PrepReport};
use crate::split::{split_ids, TRAIN_SET, VAL_SET};
use crate::writer::{DatasetWriter, OutputShape};

/// Loop settings taken from a [`PrepConfig`].
#[derive(Clone, Debug, PartialEq)]
pub struct PrepareOptions {
    pub image_extension: String,
    pub val_fraction: f64,
    pub seed: Option<u64>,
    pub skip_failed: bool,
}

impl From<&PrepConfig> for PrepareOptions {
    fn from(config: &PrepConfig) -> Self {
        Self {
            image_extension: config.image_extension.clone(),
            val_fraction: config.val_fraction,
            seed: config.seed,
            skip_failed: config.skip_failed,
        }
    }
}

/// Runs every image through `writer` and writes the manifests.
///
/// A failing image aborts the run unless `skip_failed` is set, in which
/// case it is recorded in the report and left out of the manifests.
pub fn prepare_dataset<W: DatasetWriter>(
    writer: &W,
    images_dir: &Path,
    records: Vec<ImageRecord>,
    opts: &PrepareOptions,
) -> Result<PrepReport, PrepError> {
    let mut report = PrepReport {
        records: records.len(),
        ..Default::default()
    };

    let groups = group_by_image(records);
    report.images = groups.len();

    let mut processed_ids = Vec::with_capacity(groups.len());
    for (image_id, records) in &groups {
        let image_name = format!("{image_id}.{}", opts.image_extension);
        match prepare_one(writer, images_dir, &image_name, records) {
            Ok((shape, boxes)) => {
                log::debug!(
                    "{image_name}: {boxes} box(es), written as {}x{}x{}",
                    shape.height,
                    shape.width,
                    shape.channels
                );
                report.boxes += boxes;
                processed_ids.push(image_id.clone());
            }
            Err(err) if opts.skip_failed => {
                log::warn!("skipping {image_name}: {err}");
                report.add(PrepIssue::new(image_id.clone(), err.to_string()));
            }
            Err(err) => return Err(err),
        }
    }
    report.processed = processed_ids.len();

    let split = split_ids(&processed_ids, opts.val_fraction, opts.seed);
    writer.write_image_set(&split.train, TRAIN_SET)?;
    if opts.val_fraction > 0.0 {
        writer.write_image_set(&split.val, VAL_SET)?;
    }
    report.train = split.train.len();
    report.val = split.val.len();

    log::info!(
        "prepared {} of {} image(s) into {}",
        report.processed,
        report.images,
        writer.layout().root.display()
    );

    Ok(report)
}

fn prepare_one<W: DatasetWriter>(
    writer: &W,
    images_dir: &Path,
    image_name: &str,
    records: &[ImageRecord],
) -> Result<(OutputShape, usize), PrepError> {
    let image = load_image(&images_dir.join(image_name))?;
    let arrays = convert(records);
    let shape = writer.process_image(image_name, &image, &arrays.boxes, &arrays.labels)?;
    Ok((shape, arrays.len()))
}

/// Decodes an image file.
pub fn load_image(path: &Path) -> Result<DynamicImage, PrepError> {
    image::open(path).map_err(|source| PrepError::Image {
        path: path.to_path_buf(),
        source,
    })
}
