use std::collections::HashMap;
use std::path::{Path, PathBuf};

use image::imageops::FilterType;
use image::{DynamicImage, GrayImage, Luma};
use walkdir::WalkDir;

use super::{expect_luma8, stack_channels, BoxAwareResize, ImageTransform, Transformed};
use crate::error::PrepError;
use crate::geometry::{BBoxXYXY, Pixel};

const BLUE: usize = 2;

/// Fuses a precomputed mask into the third channel: `[img, img, mask]`.
///
/// Masks are matched by file name: the mask for `train/abc.png` is the file
/// named `abc.png` directly inside the mask directory. The directory is
/// scanned once, at construction.
#[derive(Clone, Debug)]
pub struct MaskTransform {
    masks: HashMap<String, PathBuf>,
    resize: BoxAwareResize,
}

impl MaskTransform {
    /// Indexes the files directly inside `mask_dir` (subdirectories are not scanned).
    pub fn new(mask_dir: &Path, size: u32) -> Result<Self, PrepError> {
        let mut masks = HashMap::new();
        for entry in WalkDir::new(mask_dir).min_depth(1).max_depth(1) {
            let entry = entry.map_err(|source| PrepError::MaskIndex {
                path: mask_dir.to_path_buf(),
                message: format!("failed while scanning mask directory: {source}"),
            })?;
            if !entry.file_type().is_file() {
                continue;
            }
            if let Some(name) = entry.file_name().to_str() {
                masks.insert(name.to_string(), entry.path().to_path_buf());
            }
        }

        log::info!("indexed {} mask(s) in {}", masks.len(), mask_dir.display());

        Ok(Self {
            masks,
            resize: BoxAwareResize::new(size),
        })
    }

    /// Number of indexed mask files.
    pub fn len(&self) -> usize {
        self.masks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.masks.is_empty()
    }

    fn mask_path(&self, image_name: &str) -> Result<&Path, PrepError> {
        Path::new(image_name)
            .file_name()
            .and_then(|name| name.to_str())
            .and_then(|name| self.masks.get(name))
            .map(PathBuf::as_path)
            .ok_or_else(|| PrepError::MaskNotFound {
                image: image_name.to_string(),
            })
    }

    /// Loads the mask, resizes it to `width x height` with Lanczos
    /// interpolation and keeps its blue channel, which is plane 0 when the
    /// file is read in BGR order.
    fn load_mask(&self, image_name: &str, width: u32, height: u32) -> Result<GrayImage, PrepError> {
        let path = self.mask_path(image_name)?;
        let mask = image::open(path)
            .map_err(|source| PrepError::Image {
                path: path.to_path_buf(),
                source,
            })?
            .resize_exact(width, height, FilterType::Lanczos3)
            .into_rgb8();

        Ok(GrayImage::from_fn(width, height, |x, y| {
            Luma([mask.get_pixel(x, y)[BLUE]])
        }))
    }
}

impl ImageTransform for MaskTransform {
    fn transform(
        &self,
        image_name: &str,
        image: &DynamicImage,
        boxes: &[BBoxXYXY<Pixel>],
        classes: &[String],
    ) -> Result<Transformed, PrepError> {
        let gray = expect_luma8(image_name, image)?;
        let (width, height) = gray.dimensions();
        let mask = self.load_mask(image_name, width, height)?;
        let fused = stack_channels(gray, gray, &mask);
        self.resize.apply(image_name, &fused, boxes, classes)
    }
}
