#![allow(dead_code)]

use proptest::prelude::*;
use proptest::test_runner::{Config as ProptestConfig, FileFailurePersistence};
use xrayprep::geometry::{BBoxXYXY, ImageShape, Normalized, Pixel};

pub const EPS: f64 = 1e-9;

pub fn proptest_config() -> ProptestConfig {
    let cases = std::env::var("PROPTEST_CASES")
        .ok()
        .and_then(|v| v.parse::<u32>().ok())
        .unwrap_or(64);

    let mut config = ProptestConfig::with_failure_persistence(FileFailurePersistence::WithSource(
        "proptest-regressions",
    ));
    config.cases = cases;
    config.max_shrink_iters = 1024;
    config
}

/// Any box, ordered or not.
pub fn arb_any_box() -> impl Strategy<Value = BBoxXYXY<Pixel>> {
    (
        -1000.0..1000.0f64,
        -1000.0..1000.0f64,
        -1000.0..1000.0f64,
        -1000.0..1000.0f64,
    )
        .prop_map(|(a, b, c, d)| BBoxXYXY::from_xyxy(a, b, c, d))
}

/// Boxes with `min <= max` on both axes.
pub fn arb_ordered_box() -> impl Strategy<Value = BBoxXYXY<Pixel>> {
    (
        -1000.0..1000.0f64,
        -1000.0..1000.0f64,
        0.0..500.0f64,
        0.0..500.0f64,
    )
        .prop_map(|(x, y, w, h)| BBoxXYXY::from_xyxy(x, y, x + w, y + h))
}

pub fn arb_normalized_box() -> impl Strategy<Value = BBoxXYXY<Normalized>> {
    (0.0..1.0f64, 0.0..1.0f64, 0.0..1.0f64, 0.0..1.0f64)
        .prop_map(|(a, b, c, d)| BBoxXYXY::from_xyxy(a, b, c, d))
}

pub fn arb_shape() -> impl Strategy<Value = ImageShape> {
    (1u32..5000, 1u32..5000).prop_map(|(w, h)| ImageShape::new(w, h))
}

pub fn close<T>(a: &BBoxXYXY<T>, b: &BBoxXYXY<T>, eps: f64) -> bool {
    (a.x_min - b.x_min).abs() <= eps
        && (a.y_min - b.y_min).abs() <= eps
        && (a.x_max - b.x_max).abs() <= eps
        && (a.y_max - b.y_max).abs() <= eps
}
