//! Display conversion of decoded DICOM pixel data.
//!
//! Decoding is left to the caller; this module takes the raw samples and
//! produces the 8-bit single-channel image the transforms expect:
//!
//! 1. optional VOI linear windowing,
//! 2. inversion of `MONOCHROME1` images (bright = low attenuation),
//! 3. min-max normalization to `[0, 255]`.
//!
//! This is a library entry point only: `xrayprep prepare` reads
//! already-converted 8-bit images and never calls it. Callers that decode
//! DICOM themselves use [`to_display_u8`] to produce those images.

use std::fmt;
use std::str::FromStr;

use image::{GrayImage, Luma};

use crate::error::PrepError;

/// DICOM Photometric Interpretation of a grayscale image.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Photometric {
    /// Minimum sample value is displayed as white.
    Monochrome1,
    /// Minimum sample value is displayed as black.
    Monochrome2,
}

impl FromStr for Photometric {
    type Err = PrepError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "MONOCHROME1" => Ok(Self::Monochrome1),
            "MONOCHROME2" => Ok(Self::Monochrome2),
            other => Err(PrepError::UnsupportedFormat(format!(
                "photometric interpretation '{other}' (supported: MONOCHROME1, MONOCHROME2)"
            ))),
        }
    }
}

impl fmt::Display for Photometric {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Monochrome1 => write!(f, "MONOCHROME1"),
            Self::Monochrome2 => write!(f, "MONOCHROME2"),
        }
    }
}

/// A linear VOI window (Window Center / Window Width).
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct VoiWindow {
    pub center: f64,
    pub width: f64,
}

impl VoiWindow {
    pub fn new(center: f64, width: f64) -> Self {
        Self { center, width }
    }

    /// Maps a sample into `[0, 1]` with the DICOM linear window function.
    /// Widths below 1 are treated as 1.
    pub fn apply(&self, value: f64) -> f64 {
        let width = self.width.max(1.0);
        let lower = self.center - 0.5 - (width - 1.0) / 2.0;
        let upper = self.center - 0.5 + (width - 1.0) / 2.0;

        if value <= lower {
            0.0
        } else if value > upper {
            1.0
        } else if width <= 1.0 {
            1.0
        } else {
            (value - (self.center - 0.5)) / (width - 1.0) + 0.5
        }
    }
}

/// Converts raw row-major samples into an 8-bit display image.
///
/// A constant image (after windowing) maps to all zeros.
pub fn to_display_u8(
    samples: &[f32],
    width: u32,
    height: u32,
    photometric: Photometric,
    window: Option<VoiWindow>,
) -> Result<GrayImage, PrepError> {
    let expected = width as usize * height as usize;
    if samples.len() != expected {
        return Err(PrepError::BufferSize {
            width,
            height,
            expected,
            found: samples.len(),
        });
    }

    let mut values: Vec<f64> = match window {
        Some(window) => samples.iter().map(|&v| window.apply(v as f64)).collect(),
        None => samples.iter().map(|&v| v as f64).collect(),
    };

    let max = values.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    if photometric == Photometric::Monochrome1 {
        for value in &mut values {
            *value = max - *value;
        }
    }

    let lo = values.iter().copied().fold(f64::INFINITY, f64::min);
    let hi = values.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    let range = hi - lo;

    let pixels: Vec<u8> = values
        .iter()
        .map(|&value| {
            if range > 0.0 {
                ((value - lo) / range * 255.0).round().clamp(0.0, 255.0) as u8
            } else {
                0
            }
        })
        .collect();

    let mut image = GrayImage::new(width, height);
    for (pixel, value) in image.pixels_mut().zip(pixels) {
        *pixel = Luma([value]);
    }
    Ok(image)
}
