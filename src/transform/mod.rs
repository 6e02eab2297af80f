//! Pixel transforms applied to every image before it is written.
//!
//! Each variant turns a raw 8-bit image into a 3-channel image, then hands
//! off to [`BoxAwareResize`], which scales the image to a fixed square size
//! and remaps the boxes with it.
//!
//! | Variant | Input | Channels before resize |
//! |---|---|---|
//! | [`GrayscaleTransform`] | 1 channel | `[img, img, img]` |
//! | [`MaskTransform`] | 1 channel | `[img, img, mask]` |
//! | [`EqualizeTransform`] | 1 channel | `[img, equalized, clahe]` |

pub mod enhance;
mod equalize;
mod grayscale;
mod mask;
mod resize;

use image::{DynamicImage, GrayImage, Luma, Rgb, RgbImage};

use crate::error::PrepError;
use crate::geometry::{BBoxXYXY, Pixel};

pub use enhance::ClaheParams;
pub use equalize::EqualizeTransform;
pub use grayscale::GrayscaleTransform;
pub use mask::MaskTransform;
pub use resize::BoxAwareResize;

/// Default output side length in pixels.
pub const DEFAULT_SIZE: u32 = 1024;

/// Result of a transform: the new image plus the boxes that survived it,
/// each still paired with its class at the same index.
#[derive(Clone, Debug)]
pub struct Transformed {
    pub image: RgbImage,
    pub boxes: Vec<BBoxXYXY<Pixel>>,
    pub classes: Vec<String>,
}

/// A pixel transform coupled with a box-aware resize.
pub trait ImageTransform {
    /// Transforms `image` and remaps `boxes`/`classes` to the output size.
    ///
    /// `image_name` identifies the image for lookups (mask files) and error
    /// messages; only its final path component is significant.
    fn transform(
        &self,
        image_name: &str,
        image: &DynamicImage,
        boxes: &[BBoxXYXY<Pixel>],
        classes: &[String],
    ) -> Result<Transformed, PrepError>;
}

/// Borrows the image as single-channel 8-bit, or reports its channel count
/// (or its sample depth, for single-channel images of another depth).
pub(crate) fn expect_luma8<'a>(
    image_name: &str,
    image: &'a DynamicImage,
) -> Result<&'a GrayImage, PrepError> {
    match image {
        DynamicImage::ImageLuma8(gray) => Ok(gray),
        other if other.color().channel_count() == 1 => Err(PrepError::BitDepth {
            image: image_name.to_string(),
            bits: other.color().bits_per_pixel(),
        }),
        other => Err(PrepError::ChannelMismatch {
            image: image_name.to_string(),
            expected: 1,
            found: other.color().channel_count(),
        }),
    }
}

/// Stacks three equally sized single-channel planes into one RGB image.
pub(crate) fn stack_channels(first: &GrayImage, second: &GrayImage, third: &GrayImage) -> RgbImage {
    debug_assert_eq!(first.dimensions(), second.dimensions());
    debug_assert_eq!(first.dimensions(), third.dimensions());

    let (width, height) = first.dimensions();
    RgbImage::from_fn(width, height, |x, y| {
        let Luma([a]) = *first.get_pixel(x, y);
        let Luma([b]) = *second.get_pixel(x, y);
        let Luma([c]) = *third.get_pixel(x, y);
        Rgb([a, b, c])
    })
}
