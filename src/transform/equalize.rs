use image::DynamicImage;

use super::enhance::{clahe, equalize_histogram, ClaheParams};
use super::{expect_luma8, stack_channels, BoxAwareResize, ImageTransform, Transformed};
use crate::error::PrepError;
use crate::geometry::{BBoxXYXY, Pixel};

/// Stacks the original image with its globally equalized and CLAHE versions.
#[derive(Clone, Copy, Debug)]
pub struct EqualizeTransform {
    clahe: ClaheParams,
    resize: BoxAwareResize,
}

impl EqualizeTransform {
    pub fn new(size: u32, clahe: ClaheParams) -> Self {
        Self {
            clahe,
            resize: BoxAwareResize::new(size),
        }
    }
}

impl Default for EqualizeTransform {
    fn default() -> Self {
        Self::new(super::DEFAULT_SIZE, ClaheParams::default())
    }
}

impl ImageTransform for EqualizeTransform {
    fn transform(
        &self,
        image_name: &str,
        image: &DynamicImage,
        boxes: &[BBoxXYXY<Pixel>],
        classes: &[String],
    ) -> Result<Transformed, PrepError> {
        let gray = expect_luma8(image_name, image)?;
        let equalized = equalize_histogram(gray);
        let adaptive = clahe(gray, self.clahe);
        let stacked = stack_channels(gray, &equalized, &adaptive);
        self.resize.apply(image_name, &stacked, boxes, classes)
    }
}
