//! Box geometry helpers.
//!
//! All functions are total and allocation-free. Boxes are never validated
//! here; callers that care about ordering check it themselves.

mod bbox;
mod space;

pub use bbox::BBoxXYXY;
pub use space::{Normalized, Pixel};

/// Image dimensions in pixels.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct ImageShape {
    pub width: u32,
    pub height: u32,
}

impl ImageShape {
    #[inline]
    pub fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    #[inline]
    pub(crate) fn as_f64(self) -> (f64, f64) {
        (self.width as f64, self.height as f64)
    }
}

/// `(x_max - x_min) * (y_max - y_min)`; negative for malformed boxes.
#[inline]
pub fn area<TSpace>(bbox: &BBoxXYXY<TSpace>) -> f64 {
    bbox.area()
}

/// Area of the overlap of `a` and `b`, or `0.0` when they do not overlap.
#[inline]
pub fn intersection_area<TSpace>(a: &BBoxXYXY<TSpace>, b: &BBoxXYXY<TSpace>) -> f64 {
    let width = a.x_max.min(b.x_max) - a.x_min.max(b.x_min);
    let height = a.y_max.min(b.y_max) - a.y_min.max(b.y_min);
    width.max(0.0) * height.max(0.0)
}

/// Area of the smallest box enclosing both `a` and `b`.
#[inline]
pub fn union_area<TSpace>(a: &BBoxXYXY<TSpace>, b: &BBoxXYXY<TSpace>) -> f64 {
    let width = a.x_max.max(b.x_max) - a.x_min.min(b.x_min);
    let height = a.y_max.max(b.y_max) - a.y_min.min(b.y_min);
    width.max(0.0) * height.max(0.0)
}

/// Scales a normalized box back into pixel space.
#[inline]
pub fn rel2abs(bbox: &BBoxXYXY<Normalized>, shape: ImageShape) -> BBoxXYXY<Pixel> {
    bbox.to_pixel(shape)
}

/// Scales a pixel box into normalized space.
#[inline]
pub fn abs2rel(bbox: &BBoxXYXY<Pixel>, shape: ImageShape) -> BBoxXYXY<Normalized> {
    bbox.to_normalized(shape)
}
