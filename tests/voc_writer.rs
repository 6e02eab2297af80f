//! Integration tests for the VOC dataset writer.

use std::fs;
use std::path::Path;

use xrayprep::geometry::BBoxXYXY;
use xrayprep::transform::{GrayscaleTransform, MaskTransform};
use xrayprep::writer::{DatasetWriter, OutputShape, VocWriter};

mod common;

#[derive(Debug, PartialEq)]
struct XmlObject {
    name: String,
    bndbox: [i64; 4],
}

fn element<'a, 'input>(node: roxmltree::Node<'a, 'input>, tag: &str) -> roxmltree::Node<'a, 'input> {
    node.children()
        .find(|c| c.is_element() && c.tag_name().name() == tag)
        .unwrap_or_else(|| panic!("missing <{tag}>"))
}

fn text(node: roxmltree::Node<'_, '_>, tag: &str) -> String {
    element(node, tag)
        .text()
        .unwrap_or_else(|| panic!("empty <{tag}>"))
        .trim()
        .to_string()
}

fn read_objects(path: &Path) -> (u32, u32, u32, Vec<XmlObject>) {
    let xml = fs::read_to_string(path).expect("read xml");
    let doc = roxmltree::Document::parse(&xml).expect("parse xml");
    let root = doc.root_element();
    assert_eq!(root.tag_name().name(), "annotation");

    let size = element(root, "size");
    let width = text(size, "width").parse().expect("width");
    let height = text(size, "height").parse().expect("height");
    let depth = text(size, "depth").parse().expect("depth");

    let objects = root
        .children()
        .filter(|n| n.is_element() && n.tag_name().name() == "object")
        .map(|object| {
            let bndbox = element(object, "bndbox");
            let coord = |tag: &str| text(bndbox, tag).parse::<i64>().expect("integer coordinate");
            XmlObject {
                name: text(object, "name"),
                bndbox: [coord("xmin"), coord("ymin"), coord("xmax"), coord("ymax")],
            }
        })
        .collect();

    (width, height, depth, objects)
}

#[test]
fn writes_tree_image_and_xml() {
    let temp = tempfile::tempdir().expect("create temp dir");
    let root = temp.path().join("voc");
    let writer = VocWriter::new(&root, false, GrayscaleTransform::new(50)).expect("create writer");

    let shape = writer
        .process_image(
            "scan.png",
            &common::gray(100, 100, 90),
            &[BBoxXYXY::from_xyxy(10.0, 10.0, 50.0, 50.0)],
            &common::strings(&["Nodule/Mass"]),
        )
        .expect("process image");

    assert_eq!(
        shape,
        OutputShape {
            height: 50,
            width: 50,
            channels: 3
        }
    );
    assert!(root.join("Annotations").is_dir());
    assert!(root.join("image_sets").is_dir());

    let written = image::open(root.join("JPEGImages/scan.png")).expect("decode written image");
    assert_eq!(written.width(), 50);
    assert_eq!(written.color().channel_count(), 3);

    let (width, height, depth, objects) = read_objects(&root.join("Annotations/scan.xml"));
    assert_eq!((width, height, depth), (50, 50, 3));
    assert_eq!(
        objects,
        vec![XmlObject {
            name: "Nodule/Mass".to_string(),
            bndbox: [5, 5, 25, 25],
        }]
    );
}

#[test]
fn out_of_bounds_box_is_skipped_without_affecting_others() {
    let temp = tempfile::tempdir().expect("create temp dir");
    let writer = VocWriter::new(temp.path(), false, common::Passthrough).expect("create writer");

    writer
        .process_image(
            "a.png",
            &common::gray(100, 100, 0),
            &[
                BBoxXYXY::from_xyxy(10.0, 10.0, 20.0, 20.0),
                BBoxXYXY::from_xyxy(10.0, 50.0, 20.0, 150.0),
                BBoxXYXY::from_xyxy(120.0, 10.0, 130.0, 20.0),
                BBoxXYXY::from_xyxy(30.0, 30.0, 40.0, 40.0),
            ],
            &common::strings(&["ILD", "too tall", "too far right", "Atelectasis"]),
        )
        .expect("process image");

    let (_, _, _, objects) = read_objects(&temp.path().join("Annotations/a.xml"));
    let names: Vec<&str> = objects.iter().map(|o| o.name.as_str()).collect();
    assert_eq!(names, vec!["ILD", "Atelectasis"]);
    assert_eq!(objects[1].bndbox, [30, 30, 40, 40]);
}

#[test]
fn image_is_written_once_but_annotation_every_time() {
    let temp = tempfile::tempdir().expect("create temp dir");
    let writer = VocWriter::new(temp.path(), false, GrayscaleTransform::new(20)).expect("create writer");

    writer
        .process_image(
            "same.png",
            &common::gray(40, 40, 10),
            &[BBoxXYXY::from_xyxy(0.0, 0.0, 20.0, 20.0)],
            &common::strings(&["ILD"]),
        )
        .expect("first pass");
    writer
        .process_image(
            "same.png",
            &common::gray(40, 40, 200),
            &[BBoxXYXY::from_xyxy(20.0, 20.0, 40.0, 40.0)],
            &common::strings(&["Cardiomegaly"]),
        )
        .expect("second pass");

    let image = image::open(temp.path().join("JPEGImages/same.png"))
        .expect("decode image")
        .to_rgb8();
    assert!(image.pixels().all(|p| p.0 == [10, 10, 10]));

    let (_, _, _, objects) = read_objects(&temp.path().join("Annotations/same.xml"));
    assert_eq!(
        objects,
        vec![XmlObject {
            name: "Cardiomegaly".to_string(),
            bndbox: [10, 10, 20, 20],
        }]
    );
}

#[test]
fn image_without_boxes_gets_an_empty_annotation() {
    let temp = tempfile::tempdir().expect("create temp dir");
    let writer = VocWriter::new(temp.path(), false, GrayscaleTransform::new(8)).expect("create writer");

    writer
        .process_image("empty.png", &common::gray(16, 16, 0), &[], &[])
        .expect("process image");

    let (_, _, _, objects) = read_objects(&temp.path().join("Annotations/empty.xml"));
    assert!(objects.is_empty());
}

#[test]
fn image_set_lists_ids_verbatim() {
    let temp = tempfile::tempdir().expect("create temp dir");
    let writer = VocWriter::new(temp.path(), false, GrayscaleTransform::new(8)).expect("create writer");

    writer
        .write_image_set(&common::strings(&["b", "a", "c"]), "train.txt")
        .expect("write image set");

    let manifest = fs::read_to_string(temp.path().join("image_sets/train.txt")).expect("read set");
    assert_eq!(manifest, "b\na\nc");
}

#[test]
fn color_input_is_rejected_by_grayscale_transform() {
    let temp = tempfile::tempdir().expect("create temp dir");
    let writer = VocWriter::new(temp.path(), false, GrayscaleTransform::new(8)).expect("create writer");

    let rgb = image::DynamicImage::ImageRgb8(image::RgbImage::new(4, 4));
    let err = writer
        .process_image("rgb.png", &rgb, &[], &[])
        .unwrap_err();

    assert!(matches!(err, xrayprep::PrepError::ChannelMismatch { .. }));
    assert!(!temp.path().join("JPEGImages/rgb.png").exists());
    assert!(!temp.path().join("Annotations/rgb.xml").exists());
}

#[test]
fn mask_plane_is_stored_in_the_red_channel() {
    let temp = tempfile::tempdir().expect("create temp dir");
    let masks = temp.path().join("masks");
    common::write_gray_png(&masks.join("scan.png"), 16, 16, 200);

    let transform = MaskTransform::new(&masks, 16).expect("index masks");
    let writer = VocWriter::new(&temp.path().join("voc"), false, transform).expect("create writer");
    writer
        .process_image("scan.png", &common::gray(16, 16, 10), &[], &[])
        .expect("process image");

    let written = image::open(temp.path().join("voc/JPEGImages/scan.png"))
        .expect("decode image")
        .to_rgb8();
    assert!(written.pixels().all(|p| p.0 == [200, 10, 10]));
}
