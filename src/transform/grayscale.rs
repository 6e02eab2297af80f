use image::DynamicImage;

use super::{expect_luma8, stack_channels, BoxAwareResize, ImageTransform, Transformed};
use crate::error::PrepError;
use crate::geometry::{BBoxXYXY, Pixel};

/// Replicates a single-channel image into three identical channels.
#[derive(Clone, Copy, Debug)]
pub struct GrayscaleTransform {
    resize: BoxAwareResize,
}

impl GrayscaleTransform {
    pub fn new(size: u32) -> Self {
        Self {
            resize: BoxAwareResize::new(size),
        }
    }
}

impl Default for GrayscaleTransform {
    fn default() -> Self {
        Self::new(super::DEFAULT_SIZE)
    }
}

impl ImageTransform for GrayscaleTransform {
    fn transform(
        &self,
        image_name: &str,
        image: &DynamicImage,
        boxes: &[BBoxXYXY<Pixel>],
        classes: &[String],
    ) -> Result<Transformed, PrepError> {
        let gray = expect_luma8(image_name, image)?;
        let rgb = stack_channels(gray, gray, gray);
        self.resize.apply(image_name, &rgb, boxes, classes)
    }
}
