//! Coordinate space markers for [`BBoxXYXY`](super::BBoxXYXY).
//!
//! Pixel boxes come out of the annotation table and the resize step;
//! normalized boxes only exist on the way into YOLO label files.

use std::fmt;

/// Absolute pixel coordinates, origin at the top-left corner.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub enum Pixel {}

/// Coordinates divided by image width (x) and height (y), nominally in `[0, 1]`.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub enum Normalized {}

impl fmt::Debug for Pixel {
    fn fmt(&self, _: &mut fmt::Formatter<'_>) -> fmt::Result {
        match *self {}
    }
}

impl fmt::Debug for Normalized {
    fn fmt(&self, _: &mut fmt::Formatter<'_>) -> fmt::Result {
        match *self {}
    }
}
