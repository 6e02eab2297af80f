//! Integration tests for the YOLO dataset writer.

use std::fs;

use xrayprep::geometry::BBoxXYXY;
use xrayprep::transform::GrayscaleTransform;
use xrayprep::writer::{DatasetWriter, YoloWriter};
use xrayprep::PrepError;

mod common;

#[test]
fn label_line_uses_class_id_and_relative_center_size() {
    let temp = tempfile::tempdir().expect("create temp dir");
    let writer = YoloWriter::new(temp.path(), false, common::Passthrough).expect("create writer");

    writer
        .process_image(
            "scan.png",
            &common::gray(100, 100, 0),
            &[BBoxXYXY::from_xyxy(0.0, 0.0, 50.0, 100.0)],
            &common::strings(&["Pleural effusion"]),
        )
        .expect("process image");

    let labels = fs::read_to_string(temp.path().join("labels/scan.txt")).expect("read labels");
    assert_eq!(labels, "10 0.25 0.5 0.5 1.0\n");
    assert!(temp.path().join("JPEGImages/scan.png").is_file());
    assert!(temp.path().join("yolo_image_sets").is_dir());
}

#[test]
fn boxes_are_normalized_by_the_resized_image() {
    let temp = tempfile::tempdir().expect("create temp dir");
    let writer = YoloWriter::new(temp.path(), false, GrayscaleTransform::new(64)).expect("create writer");

    writer
        .process_image(
            "big.jpg",
            &common::gray(256, 128, 30),
            &[
                BBoxXYXY::from_xyxy(0.0, 0.0, 128.0, 64.0),
                BBoxXYXY::from_xyxy(128.0, 64.0, 256.0, 128.0),
            ],
            &common::strings(&["Aortic enlargement", "Pneumothorax"]),
        )
        .expect("process image");

    let labels = fs::read_to_string(temp.path().join("labels/big.txt")).expect("read labels");
    let lines: Vec<&str> = labels.lines().collect();
    assert_eq!(lines, vec!["0 0.25 0.25 0.5 0.5", "12 0.75 0.75 0.5 0.5"]);

    let written = image::open(temp.path().join("JPEGImages/big.jpg")).expect("decode image");
    assert_eq!((written.width(), written.height()), (64, 64));
}

#[test]
fn unknown_class_fails_the_image() {
    let temp = tempfile::tempdir().expect("create temp dir");
    let writer = YoloWriter::new(temp.path(), false, common::Passthrough).expect("create writer");

    let err = writer
        .process_image(
            "x.png",
            &common::gray(10, 10, 0),
            &[BBoxXYXY::from_xyxy(0.0, 0.0, 5.0, 5.0)],
            &common::strings(&["nodule"]),
        )
        .unwrap_err();

    assert!(matches!(err, PrepError::UnknownClass(name) if name == "nodule"));
    assert!(!temp.path().join("labels/x.txt").exists());
}

#[test]
fn label_file_is_rewritten_on_every_call() {
    let temp = tempfile::tempdir().expect("create temp dir");
    let writer = YoloWriter::new(temp.path(), false, common::Passthrough).expect("create writer");
    let image = common::gray(10, 10, 0);

    writer
        .process_image(
            "r.png",
            &image,
            &[BBoxXYXY::from_xyxy(0.0, 0.0, 5.0, 5.0)],
            &common::strings(&["ILD"]),
        )
        .expect("first pass");
    writer
        .process_image("r.png", &image, &[], &[])
        .expect("second pass");

    let labels = fs::read_to_string(temp.path().join("labels/r.txt")).expect("read labels");
    assert_eq!(labels, "");
}

#[test]
fn image_set_lists_absolute_image_paths() {
    let temp = tempfile::tempdir().expect("create temp dir");
    let writer = YoloWriter::new(temp.path(), false, common::Passthrough).expect("create writer");

    writer
        .write_image_set(&common::strings(&["a", "b"]), "train.txt")
        .expect("write image set");

    let manifest =
        fs::read_to_string(temp.path().join("yolo_image_sets/train.txt")).expect("read set");
    let lines: Vec<&str> = manifest.split('\n').collect();
    assert_eq!(lines.len(), 2);

    let images_dir = std::path::absolute(temp.path().join("JPEGImages")).expect("absolute dir");
    assert_eq!(lines[0], images_dir.join("a.png").to_string_lossy());
    assert_eq!(lines[1], images_dir.join("b.png").to_string_lossy());
    assert!(lines.iter().all(|line| std::path::Path::new(line).is_absolute()));
}

#[test]
fn manifest_extension_is_configurable() {
    let temp = tempfile::tempdir().expect("create temp dir");
    let writer = YoloWriter::new(temp.path(), false, common::Passthrough)
        .expect("create writer")
        .with_manifest_extension("jpg");

    writer
        .write_image_set(&common::strings(&["a"]), "val.txt")
        .expect("write image set");

    let manifest =
        fs::read_to_string(temp.path().join("yolo_image_sets/val.txt")).expect("read set");
    assert!(manifest.ends_with("a.jpg"));
}

#[test]
fn clear_drops_previous_run() {
    let temp = tempfile::tempdir().expect("create temp dir");
    let root = temp.path().join("yolo");

    let writer = YoloWriter::new(&root, false, common::Passthrough).expect("create writer");
    writer
        .process_image("old.png", &common::gray(4, 4, 0), &[], &[])
        .expect("process image");
    assert!(root.join("JPEGImages/old.png").exists());

    let _writer = YoloWriter::new(&root, true, common::Passthrough).expect("recreate writer");
    assert!(!root.join("JPEGImages/old.png").exists());
    assert!(!root.join("labels/old.txt").exists());
    assert!(root.join("labels").is_dir());
}
