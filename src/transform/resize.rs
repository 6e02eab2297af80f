use image::imageops::{self, FilterType};
use image::RgbImage;

use super::Transformed;
use crate::error::PrepError;
use crate::geometry::{BBoxXYXY, Pixel};

/// Resizes to a fixed `size x size` square and remaps boxes proportionally.
///
/// After scaling, each box is clipped to the output bounds. A box survives
/// as long as any part of it is still visible (clipped area > 0); dropping
/// a box also drops its class.
#[derive(Clone, Copy, Debug)]
pub struct BoxAwareResize {
    size: u32,
    filter: FilterType,
}

impl BoxAwareResize {
    pub fn new(size: u32) -> Self {
        Self {
            size,
            filter: FilterType::Triangle,
        }
    }

    /// Overrides the interpolation kernel (bilinear by default).
    pub fn with_filter(mut self, filter: FilterType) -> Self {
        self.filter = filter;
        self
    }

    pub fn size(&self) -> u32 {
        self.size
    }

    pub fn apply(
        &self,
        image_name: &str,
        image: &RgbImage,
        boxes: &[BBoxXYXY<Pixel>],
        classes: &[String],
    ) -> Result<Transformed, PrepError> {
        let (width, height) = image.dimensions();
        if width == 0 || height == 0 {
            return Err(PrepError::EmptyImage {
                image: image_name.to_string(),
            });
        }
        if boxes.len() != classes.len() {
            return Err(PrepError::LengthMismatch {
                image: image_name.to_string(),
                boxes: boxes.len(),
                classes: classes.len(),
            });
        }

        let resized = if (width, height) == (self.size, self.size) {
            image.clone()
        } else {
            imageops::resize(image, self.size, self.size, self.filter)
        };

        let (boxes, classes) = self.remap_boxes(width, height, boxes, classes);

        Ok(Transformed {
            image: resized,
            boxes,
            classes,
        })
    }

    /// Scales boxes from a `width x height` source into the output square.
    pub fn remap_boxes(
        &self,
        width: u32,
        height: u32,
        boxes: &[BBoxXYXY<Pixel>],
        classes: &[String],
    ) -> (Vec<BBoxXYXY<Pixel>>, Vec<String>) {
        let target = self.size as f64;
        let sx = target / width as f64;
        let sy = target / height as f64;

        let mut kept_boxes = Vec::with_capacity(boxes.len());
        let mut kept_classes = Vec::with_capacity(classes.len());

        for (bbox, class) in boxes.iter().zip(classes) {
            let clipped = bbox.scale(sx, sy).clip(target, target);
            if clipped.width() > 0.0 && clipped.height() > 0.0 {
                kept_boxes.push(clipped);
                kept_classes.push(class.clone());
            } else {
                log::debug!("dropping {class} box {bbox:?}: nothing visible after resize");
            }
        }

        (kept_boxes, kept_classes)
    }
}
