#![allow(dead_code)]

use std::fs;
use std::path::Path;

use image::{DynamicImage, GrayImage, Luma, RgbImage};
use xrayprep::error::PrepError;
use xrayprep::geometry::{BBoxXYXY, Pixel};
use xrayprep::transform::{ImageTransform, Transformed};

pub const CSV_HEADER: &str = "image_id,class_name,class_id,rad_id,x_min,y_min,x_max,y_max\n";

pub fn gray(width: u32, height: u32, value: u8) -> DynamicImage {
    DynamicImage::ImageLuma8(GrayImage::from_pixel(width, height, Luma([value])))
}

pub fn write_gray_png(path: &Path, width: u32, height: u32, value: u8) {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).expect("create parent dir");
    }
    GrayImage::from_pixel(width, height, Luma([value]))
        .save(path)
        .expect("write png");
}

pub fn write_rgb_png(path: &Path, width: u32, height: u32) {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).expect("create parent dir");
    }
    RgbImage::new(width, height).save(path).expect("write png");
}

pub fn strings(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}

/// Keeps pixels and boxes as they are, only widening gray to RGB.
pub struct Passthrough;

impl ImageTransform for Passthrough {
    fn transform(
        &self,
        _image_name: &str,
        image: &DynamicImage,
        boxes: &[BBoxXYXY<Pixel>],
        classes: &[String],
    ) -> Result<Transformed, PrepError> {
        Ok(Transformed {
            image: image.to_rgb8(),
            boxes: boxes.to_vec(),
            classes: classes.to_vec(),
        })
    }
}
