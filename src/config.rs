//! Pipeline configuration.
//!
//! A run is described by a [`PrepConfig`], read from YAML and/or assembled
//! from CLI flags. Every field has a default, so an empty file is valid:
//!
//! ```yaml
//! format: yolo
//! transform: equalize
//! size: 1024
//! clahe:
//!   clip_limit: 4.0
//!   grid: [8, 8]
//! val_fraction: 0.2
//! seed: 42
//! ```

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::PrepError;
use crate::transform::{ClaheParams, DEFAULT_SIZE};
use crate::writer::DEFAULT_MANIFEST_EXTENSION;

/// Annotation format of the output tree.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "snake_case")]
pub enum OutputFormat {
    /// PASCAL VOC XML under `Annotations/`.
    Voc,
    /// YOLO label text under `labels/`.
    Yolo,
}

/// Pixel transform applied before resizing.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "snake_case")]
pub enum TransformKind {
    /// Gray replicated into three channels.
    Grayscale,
    /// Gray, gray, precomputed mask.
    Mask,
    /// Gray, equalized, CLAHE.
    Equalize,
}

/// Full description of a preparation run.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct PrepConfig {
    pub format: OutputFormat,
    pub transform: TransformKind,
    /// Output side length; images are resized to `size x size`.
    pub size: u32,
    /// Required by the mask transform.
    pub mask_dir: Option<PathBuf>,
    pub clahe: ClaheParams,
    /// Extension of the input images, reused for written images and
    /// YOLO manifest entries.
    pub image_extension: String,
    /// Delete the output tree before writing.
    pub clear: bool,
    /// Fraction of images listed in `val.txt` instead of `train.txt`.
    pub val_fraction: f64,
    pub seed: Option<u64>,
    /// Record failing images in the report instead of aborting.
    pub skip_failed: bool,
}

impl Default for PrepConfig {
    fn default() -> Self {
        Self {
            format: OutputFormat::Voc,
            transform: TransformKind::Grayscale,
            size: DEFAULT_SIZE,
            mask_dir: None,
            clahe: ClaheParams::default(),
            image_extension: DEFAULT_MANIFEST_EXTENSION.to_string(),
            clear: false,
            val_fraction: 0.0,
            seed: None,
            skip_failed: false,
        }
    }
}

impl PrepConfig {
    /// Reads a YAML config file.
    ///
    /// The result is not validated: CLI flags may still fill in missing
    /// fields, so callers run [`PrepConfig::validate`] once everything is
    /// layered.
    pub fn load(path: &Path) -> Result<Self, PrepError> {
        let raw = fs::read_to_string(path).map_err(PrepError::Io)?;
        if raw.trim().is_empty() {
            return Ok(Self::default());
        }
        serde_yaml::from_str(&raw).map_err(|source| PrepError::ConfigParse {
            path: path.to_path_buf(),
            source,
        })
    }

    pub fn validate(&self) -> Result<(), PrepError> {
        if self.size == 0 {
            return Err(PrepError::InvalidConfig("size must be positive".to_string()));
        }
        if self.transform == TransformKind::Mask && self.mask_dir.is_none() {
            return Err(PrepError::InvalidConfig(
                "the mask transform needs mask_dir".to_string(),
            ));
        }
        if self.transform == TransformKind::Equalize {
            if self.clahe.clip_limit.is_nan() || self.clahe.clip_limit <= 0.0 {
                return Err(PrepError::InvalidConfig(format!(
                    "clahe clip_limit must be positive, got {}",
                    self.clahe.clip_limit
                )));
            }
            if self.clahe.grid.0 == 0 || self.clahe.grid.1 == 0 {
                return Err(PrepError::InvalidConfig(
                    "clahe grid must have at least one tile per axis".to_string(),
                ));
            }
        }
        if !(0.0..1.0).contains(&self.val_fraction) {
            return Err(PrepError::InvalidConfig(format!(
                "val_fraction must be in [0, 1), got {}",
                self.val_fraction
            )));
        }
        if self.image_extension.is_empty() || self.image_extension.contains(['.', '/']) {
            return Err(PrepError::InvalidConfig(format!(
                "image_extension must be a bare extension like 'png', got '{}'",
                self.image_extension
            )));
        }
        Ok(())
    }
}
