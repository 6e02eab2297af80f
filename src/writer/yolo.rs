//! Scaled-YOLO writer.
//!
//! Output tree: `labels/` (one text file per image), `JPEGImages/` and
//! `yolo_image_sets/` (absolute image paths). Each label line is
//! `class_id cx cy w h` with the geometry normalized by the output image
//! size.

use std::fmt::Write as _;
use std::fs;
use std::path::Path;

use image::DynamicImage;

use super::{
    annotation_file_name, ensure_parent, save_image_once, DatasetWriter, LayoutNames,
    OutputLayout, OutputShape,
};
use crate::classes::{class_id, ClassId};
use crate::error::PrepError;
use crate::geometry::{abs2rel, BBoxXYXY, Pixel};
use crate::transform::ImageTransform;

const LABEL_EXTENSION: &str = "txt";

/// Extension assumed for every manifest entry unless overridden.
pub const DEFAULT_MANIFEST_EXTENSION: &str = "png";

const YOLO_LAYOUT: LayoutNames = LayoutNames {
    annotations: "labels",
    images: "JPEGImages",
    image_sets: "yolo_image_sets",
};

/// Writes transformed images plus YOLO label files.
#[derive(Debug)]
pub struct YoloWriter<T> {
    transform: T,
    layout: OutputLayout,
    manifest_extension: String,
}

impl<T: ImageTransform> YoloWriter<T> {
    pub fn new(root: &Path, clear: bool, transform: T) -> Result<Self, PrepError> {
        Ok(Self {
            transform,
            layout: Self::create_dirs(root, clear)?,
            manifest_extension: DEFAULT_MANIFEST_EXTENSION.to_string(),
        })
    }

    /// Sets the extension appended to IDs in manifests. It is not checked
    /// against the files actually written.
    pub fn with_manifest_extension(mut self, extension: impl Into<String>) -> Self {
        self.manifest_extension = extension.into();
        self
    }
}

impl<T: ImageTransform> DatasetWriter for YoloWriter<T> {
    fn create_dirs(root: &Path, clear: bool) -> Result<OutputLayout, PrepError> {
        OutputLayout::create(root, YOLO_LAYOUT, clear)
    }

    fn layout(&self) -> &OutputLayout {
        &self.layout
    }

    fn process_image(
        &self,
        image_name: &str,
        image: &DynamicImage,
        boxes: &[BBoxXYXY<Pixel>],
        classes: &[String],
    ) -> Result<OutputShape, PrepError> {
        let image_path = self.layout.images_dir.join(image_name);
        let label_path = self
            .layout
            .annotations_dir
            .join(annotation_file_name(image_name, LABEL_EXTENSION));

        let transformed = self
            .transform
            .transform(image_name, image, boxes, classes)?;
        let shape = OutputShape::of(&transformed.image);

        save_image_once(&image_path, &transformed.image)?;

        let labels = render_labels(&transformed.boxes, &transformed.classes, shape)?;
        ensure_parent(&label_path)?;
        fs::write(&label_path, labels).map_err(PrepError::Io)?;

        Ok(shape)
    }

    fn write_image_set(&self, ids: &[String], file_name: &str) -> Result<(), PrepError> {
        let images_dir = std::path::absolute(&self.layout.images_dir).map_err(PrepError::Io)?;
        let lines: Vec<String> = ids
            .iter()
            .map(|id| {
                images_dir
                    .join(format!("{id}.{}", self.manifest_extension))
                    .to_string_lossy()
                    .to_string()
            })
            .collect();

        let path = self.layout.image_sets_dir.join(file_name);
        fs::write(&path, lines.join("\n")).map_err(PrepError::Io)
    }
}

/// Renders one `class_id cx cy w h` line per box.
///
/// Every class is resolved before anything is rendered, so an unknown class
/// fails the whole image.
fn render_labels(
    boxes: &[BBoxXYXY<Pixel>],
    classes: &[String],
    shape: OutputShape,
) -> Result<String, PrepError> {
    let class_ids: Vec<ClassId> = classes
        .iter()
        .map(|name| class_id(name))
        .collect::<Result<_, _>>()?;

    let mut out = String::new();
    for (bbox, class_id) in boxes.iter().zip(class_ids) {
        let (cx, cy, w, h) = abs2rel(bbox, shape.image_shape()).to_cxcywh();
        writeln!(out, "{class_id} {cx:?} {cy:?} {w:?} {h:?}").expect("write to string");
    }
    Ok(out)
}
