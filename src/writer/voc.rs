//! PASCAL VOC 2012 writer.
//!
//! Output tree: `Annotations/` (one XML file per image), `JPEGImages/` and
//! `image_sets/` (plain ID lists).

use std::fmt::Write as _;
use std::fs;
use std::path::Path;

use image::DynamicImage;

use super::{
    annotation_file_name, ensure_parent, save_image_once, DatasetWriter, LayoutNames,
    OutputLayout, OutputShape,
};
use crate::error::PrepError;
use crate::geometry::{BBoxXYXY, Pixel};
use crate::transform::ImageTransform;

const VOC_XML_EXTENSION: &str = "xml";

const VOC_LAYOUT: LayoutNames = LayoutNames {
    annotations: "Annotations",
    images: "JPEGImages",
    image_sets: "image_sets",
};

/// Writes transformed images plus VOC XML annotations.
#[derive(Debug)]
pub struct VocWriter<T> {
    transform: T,
    layout: OutputLayout,
}

impl<T: ImageTransform> VocWriter<T> {
    pub fn new(root: &Path, clear: bool, transform: T) -> Result<Self, PrepError> {
        Ok(Self {
            transform,
            layout: Self::create_dirs(root, clear)?,
        })
    }
}

impl<T: ImageTransform> DatasetWriter for VocWriter<T> {
    fn create_dirs(root: &Path, clear: bool) -> Result<OutputLayout, PrepError> {
        OutputLayout::create(root, VOC_LAYOUT, clear)
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
        let xml_path = self
            .layout
            .annotations_dir
            .join(annotation_file_name(image_name, VOC_XML_EXTENSION));

        let transformed = self
            .transform
            .transform(image_name, image, boxes, classes)?;
        let shape = OutputShape::of(&transformed.image);

        save_image_once(&image_path, &transformed.image)?;

        let xml = render_voc_xml(
            &image_path,
            shape,
            &transformed.boxes,
            &transformed.classes,
        );
        ensure_parent(&xml_path)?;
        fs::write(&xml_path, xml).map_err(PrepError::Io)?;

        Ok(shape)
    }

    fn write_image_set(&self, ids: &[String], file_name: &str) -> Result<(), PrepError> {
        let path = self.layout.image_sets_dir.join(file_name);
        fs::write(&path, ids.join("\n")).map_err(PrepError::Io)
    }
}

/// True if the box lies beyond the image: `y_max` below the bottom edge or
/// `x_min` right of the right edge. Such boxes are left out of the XML.
fn out_of_bounds(bbox: &BBoxXYXY<Pixel>, shape: OutputShape) -> bool {
    bbox.y_max > shape.height as f64 || bbox.x_min > shape.width as f64
}

fn render_voc_xml(
    image_path: &Path,
    shape: OutputShape,
    boxes: &[BBoxXYXY<Pixel>],
    classes: &[String],
) -> String {
    let folder = image_path
        .parent()
        .and_then(|dir| dir.file_name())
        .map(|name| name.to_string_lossy().to_string())
        .unwrap_or_default();
    let filename = image_path
        .file_name()
        .map(|name| name.to_string_lossy().to_string())
        .unwrap_or_default();

    let mut xml = String::new();

    writeln!(xml, "<annotation>").expect("write to string");
    writeln!(xml, "    <folder>{}</folder>", xml_escape(&folder)).expect("write to string");
    writeln!(xml, "    <filename>{}</filename>", xml_escape(&filename)).expect("write to string");
    writeln!(
        xml,
        "    <path>{}</path>",
        xml_escape(&image_path.to_string_lossy())
    )
    .expect("write to string");
    writeln!(xml, "    <source>").expect("write to string");
    writeln!(xml, "        <database>Unknown</database>").expect("write to string");
    writeln!(xml, "    </source>").expect("write to string");
    writeln!(xml, "    <size>").expect("write to string");
    writeln!(xml, "        <width>{}</width>", shape.width).expect("write to string");
    writeln!(xml, "        <height>{}</height>", shape.height).expect("write to string");
    writeln!(xml, "        <depth>{}</depth>", shape.channels).expect("write to string");
    writeln!(xml, "    </size>").expect("write to string");
    writeln!(xml, "    <segmented>0</segmented>").expect("write to string");

    for (bbox, class_name) in boxes.iter().zip(classes) {
        if out_of_bounds(bbox, shape) {
            log::warn!(
                "skipping {class_name} box {bbox:?} outside {}x{} image {}",
                shape.width,
                shape.height,
                filename
            );
            continue;
        }

        writeln!(xml, "    <object>").expect("write to string");
        writeln!(xml, "        <name>{}</name>", xml_escape(class_name)).expect("write to string");
        writeln!(xml, "        <pose>Unspecified</pose>").expect("write to string");
        writeln!(xml, "        <truncated>0</truncated>").expect("write to string");
        writeln!(xml, "        <difficult>0</difficult>").expect("write to string");
        writeln!(xml, "        <bndbox>").expect("write to string");
        writeln!(xml, "            <xmin>{}</xmin>", bbox.x_min as i64).expect("write to string");
        writeln!(xml, "            <ymin>{}</ymin>", bbox.y_min as i64).expect("write to string");
        writeln!(xml, "            <xmax>{}</xmax>", bbox.x_max as i64).expect("write to string");
        writeln!(xml, "            <ymax>{}</ymax>", bbox.y_max as i64).expect("write to string");
        writeln!(xml, "        </bndbox>").expect("write to string");
        writeln!(xml, "    </object>").expect("write to string");
    }

    writeln!(xml, "</annotation>").expect("write to string");
    xml
}

fn xml_escape(raw: &str) -> String {
    raw.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&apos;")
}
