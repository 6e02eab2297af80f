//! Axis-aligned boxes in `(x_min, y_min, x_max, y_max)` order.

use std::fmt;
use std::marker::PhantomData;

use super::space::{Normalized, Pixel};
use super::ImageShape;

/// An axis-aligned bounding box tagged with its coordinate space.
///
/// `x_min <= x_max` and `y_min <= y_max` are expected but never enforced:
/// boxes straight from the annotation table are carried as-is, and
/// [`BBoxXYXY::area`] goes negative for malformed ones.
#[derive(Clone, Copy, PartialEq)]
pub struct BBoxXYXY<TSpace> {
    pub x_min: f64,
    pub y_min: f64,
    pub x_max: f64,
    pub y_max: f64,
    _space: PhantomData<TSpace>,
}

impl<TSpace> BBoxXYXY<TSpace> {
    #[inline]
    pub fn from_xyxy(x_min: f64, y_min: f64, x_max: f64, y_max: f64) -> Self {
        Self {
            x_min,
            y_min,
            x_max,
            y_max,
            _space: PhantomData,
        }
    }

    /// Width of the box; negative if `x_max < x_min`.
    #[inline]
    pub fn width(&self) -> f64 {
        self.x_max - self.x_min
    }

    /// Height of the box; negative if `y_max < y_min`.
    #[inline]
    pub fn height(&self) -> f64 {
        self.y_max - self.y_min
    }

    /// `(x_max - x_min) * (y_max - y_min)`, without validation.
    #[inline]
    pub fn area(&self) -> f64 {
        self.width() * self.height()
    }

    #[inline]
    pub fn is_finite(&self) -> bool {
        self.x_min.is_finite()
            && self.y_min.is_finite()
            && self.x_max.is_finite()
            && self.y_max.is_finite()
    }

    /// Center-x, center-y, width, height.
    #[inline]
    pub fn to_cxcywh(&self) -> (f64, f64, f64, f64) {
        (
            (self.x_min + self.x_max) / 2.0,
            (self.y_min + self.y_max) / 2.0,
            self.width(),
            self.height(),
        )
    }

    /// Multiplies x coordinates by `sx` and y coordinates by `sy`.
    #[inline]
    pub fn scale(&self, sx: f64, sy: f64) -> Self {
        Self::from_xyxy(
            self.x_min * sx,
            self.y_min * sy,
            self.x_max * sx,
            self.y_max * sy,
        )
    }

    /// Clamps every coordinate into `[0, max_x] x [0, max_y]`.
    #[inline]
    pub fn clip(&self, max_x: f64, max_y: f64) -> Self {
        Self::from_xyxy(
            self.x_min.clamp(0.0, max_x),
            self.y_min.clamp(0.0, max_y),
            self.x_max.clamp(0.0, max_x),
            self.y_max.clamp(0.0, max_y),
        )
    }
}

impl BBoxXYXY<Pixel> {
    /// Divides x by the image width and y by the image height.
    pub fn to_normalized(&self, shape: ImageShape) -> BBoxXYXY<Normalized> {
        let (w, h) = shape.as_f64();
        BBoxXYXY::from_xyxy(
            self.x_min / w,
            self.y_min / h,
            self.x_max / w,
            self.y_max / h,
        )
    }
}

impl BBoxXYXY<Normalized> {
    /// Multiplies x by the image width and y by the image height.
    pub fn to_pixel(&self, shape: ImageShape) -> BBoxXYXY<Pixel> {
        let (w, h) = shape.as_f64();
        BBoxXYXY::from_xyxy(
            self.x_min * w,
            self.y_min * h,
            self.x_max * w,
            self.y_max * h,
        )
    }
}

impl<TSpace> fmt::Debug for BBoxXYXY<TSpace> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BBoxXYXY")
            .field("x_min", &self.x_min)
            .field("y_min", &self.y_min)
            .field("x_max", &self.x_max)
            .field("y_max", &self.y_max)
            .finish()
    }
}

impl<TSpace> Default for BBoxXYXY<TSpace> {
    fn default() -> Self {
        Self::from_xyxy(0.0, 0.0, 0.0, 0.0)
    }
}
