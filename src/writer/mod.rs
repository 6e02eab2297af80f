//! Dataset writers: run a transform per image and persist the result.
//!
//! A writer owns an output tree with three directories (annotations,
//! images, image sets). Images are written once and never refreshed;
//! annotation files are rewritten on every call.
//!
//! Transformed images hold their planes in stacking order (`[img, img,
//! mask]` and so on). Files are written the way OpenCV writes a 3-plane
//! array: plane 0 is stored as blue and plane 2 as red, so BGR readers such
//! as mmdetection and ScaledYOLO load the planes back in stacking order.
//!
//! The image write is a check-then-write on the file name, so concurrent
//! writers are only safe when they never share an image name.

mod voc;
mod yolo;

use std::fs;
use std::path::{Path, PathBuf};

use image::{DynamicImage, Rgb, RgbImage};

use crate::error::PrepError;
use crate::geometry::{BBoxXYXY, ImageShape, Pixel};

pub use voc::VocWriter;
pub use yolo::{YoloWriter, DEFAULT_MANIFEST_EXTENSION};

/// Directory names of an output tree, relative to its root.
#[derive(Clone, Copy, Debug)]
pub struct LayoutNames {
    pub annotations: &'static str,
    pub images: &'static str,
    pub image_sets: &'static str,
}

/// The directories a writer writes into.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct OutputLayout {
    pub root: PathBuf,
    pub annotations_dir: PathBuf,
    pub images_dir: PathBuf,
    pub image_sets_dir: PathBuf,
}

impl OutputLayout {
    /// Creates the three directories under `root`.
    ///
    /// With `clear`, the whole of `root` is deleted first (a missing root is
    /// fine). Existing directories are never an error.
    pub fn create(root: &Path, names: LayoutNames, clear: bool) -> Result<Self, PrepError> {
        if clear && root.exists() {
            log::info!("clearing output directory {}", root.display());
            fs::remove_dir_all(root).map_err(PrepError::Io)?;
        }

        let layout = Self {
            root: root.to_path_buf(),
            annotations_dir: root.join(names.annotations),
            images_dir: root.join(names.images),
            image_sets_dir: root.join(names.image_sets),
        };

        for dir in [
            &layout.annotations_dir,
            &layout.images_dir,
            &layout.image_sets_dir,
        ] {
            fs::create_dir_all(dir).map_err(PrepError::Io)?;
        }

        Ok(layout)
    }
}

/// Dimensions of a written image: `(height, width, channels)` order.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct OutputShape {
    pub height: u32,
    pub width: u32,
    pub channels: u8,
}

impl OutputShape {
    pub(crate) fn of(image: &RgbImage) -> Self {
        let (width, height) = image.dimensions();
        Self {
            height,
            width,
            channels: 3,
        }
    }

    pub fn image_shape(&self) -> ImageShape {
        ImageShape::new(self.width, self.height)
    }
}

/// A sink for transformed images and their annotations.
pub trait DatasetWriter {
    /// Creates (optionally after clearing) this writer's output tree.
    fn create_dirs(root: &Path, clear: bool) -> Result<OutputLayout, PrepError>
    where
        Self: Sized;

    fn layout(&self) -> &OutputLayout;

    /// Transforms one image, writes it if no file of that name exists yet,
    /// and (re)writes its annotation file.
    fn process_image(
        &self,
        image_name: &str,
        image: &DynamicImage,
        boxes: &[BBoxXYXY<Pixel>],
        classes: &[String],
    ) -> Result<OutputShape, PrepError>;

    /// Writes a manifest listing `ids` into the image-set directory.
    fn write_image_set(&self, ids: &[String], file_name: &str) -> Result<(), PrepError>;
}

/// Swaps a `.jpg`/`.png` extension for `extension`; any other name gets
/// `extension` appended.
pub fn annotation_file_name(image_name: &str, extension: &str) -> PathBuf {
    let path = Path::new(image_name);
    match path.extension().and_then(|ext| ext.to_str()) {
        Some("jpg") | Some("png") => path.with_extension(extension),
        _ => PathBuf::from(format!("{image_name}.{extension}")),
    }
}

/// Reorders stacked planes into BGR file order: plane 0 lands in the blue
/// channel, plane 2 in the red one.
pub fn to_file_order(image: &RgbImage) -> RgbImage {
    let (width, height) = image.dimensions();
    RgbImage::from_fn(width, height, |x, y| {
        let Rgb([first, second, third]) = *image.get_pixel(x, y);
        Rgb([third, second, first])
    })
}

/// Saves `image` at `path` in BGR plane order unless a file already exists
/// there.
///
/// Returns whether the file was written.
pub(crate) fn save_image_once(path: &Path, image: &RgbImage) -> Result<bool, PrepError> {
    if path.exists() {
        log::debug!("{} already exists, not re-encoding", path.display());
        return Ok(false);
    }

    ensure_parent(path)?;
    to_file_order(image).save(path).map_err(|source| PrepError::Image {
        path: path.to_path_buf(),
        source,
    })?;
    Ok(true)
}

pub(crate) fn ensure_parent(path: &Path) -> Result<(), PrepError> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).map_err(PrepError::Io)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    const NAMES: LayoutNames = LayoutNames {
        annotations: "ann",
        images: "img",
        image_sets: "sets",
    };

    #[test]
    fn annotation_file_name_swaps_image_extensions() {
        assert_eq!(annotation_file_name("a.png", "xml"), PathBuf::from("a.xml"));
        assert_eq!(annotation_file_name("a.jpg", "txt"), PathBuf::from("a.txt"));
        assert_eq!(
            annotation_file_name("a.dcm", "xml"),
            PathBuf::from("a.dcm.xml")
        );
        assert_eq!(annotation_file_name("a", "txt"), PathBuf::from("a.txt"));
    }

    #[test]
    fn file_order_puts_first_plane_in_blue() {
        let stacked = RgbImage::from_pixel(2, 1, Rgb([10, 20, 200]));
        let ordered = to_file_order(&stacked);
        assert!(ordered.pixels().all(|p| *p == Rgb([200, 20, 10])));
    }

    #[test]
    fn saved_image_is_decoded_in_bgr_order() {
        let temp = tempfile::tempdir().expect("create temp dir");
        let path = temp.path().join("nested/a.png");

        let stacked = RgbImage::from_pixel(3, 3, Rgb([1, 2, 3]));
        assert!(save_image_once(&path, &stacked).expect("first save"));
        assert!(!save_image_once(&path, &stacked).expect("second save"));

        let decoded = image::open(&path).expect("decode").to_rgb8();
        assert!(decoded.pixels().all(|p| *p == Rgb([3, 2, 1])));
    }

    #[test]
    fn create_is_idempotent() {
        let temp = tempfile::tempdir().expect("create temp dir");
        let root = temp.path().join("out");

        let first = OutputLayout::create(&root, NAMES, false).expect("first create");
        fs::write(first.images_dir.join("keep.png"), b"x").expect("write marker");
        let second = OutputLayout::create(&root, NAMES, false).expect("second create");

        assert_eq!(first, second);
        assert!(second.images_dir.join("keep.png").exists());
        assert!(second.annotations_dir.is_dir());
        assert!(second.image_sets_dir.is_dir());
    }

    #[test]
    fn clear_removes_previous_contents() {
        let temp = tempfile::tempdir().expect("create temp dir");
        let root = temp.path().join("out");

        let layout = OutputLayout::create(&root, NAMES, false).expect("create");
        fs::write(layout.images_dir.join("stale.png"), b"x").expect("write marker");
        fs::write(root.join("extra.txt"), b"x").expect("write marker");

        let layout = OutputLayout::create(&root, NAMES, true).expect("clear and create");
        assert!(!layout.images_dir.join("stale.png").exists());
        assert!(!root.join("extra.txt").exists());
        assert!(layout.images_dir.is_dir());
    }

    #[test]
    fn clear_on_missing_root_is_a_noop() {
        let temp = tempfile::tempdir().expect("create temp dir");
        let root = temp.path().join("never_created");
        OutputLayout::create(&root, NAMES, true).expect("create");
        assert!(root.join("img").is_dir());
    }
}
