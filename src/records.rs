//! Annotation table rows and their normalization into parallel arrays.
//!
//! The table has one row per (image, radiologist, box). Rows labelled
//! [`NO_FINDING`] mark images without any abnormality and carry empty
//! coordinates.
//!
//! # CSV columns
//!
//! - `image_id`: image file stem
//! - `class_name`: finding name, or `No finding`
//! - `rad_id`: annotator (optional, informational only)
//! - `x_min`, `y_min`, `x_max`, `y_max`: pixel coordinates (empty for `No finding`)
//!
//! Other columns (such as `class_id`) are ignored.

use std::collections::HashMap;
use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;

use serde::Deserialize;

use crate::classes::NO_FINDING;
use crate::error::PrepError;
use crate::geometry::{BBoxXYXY, Pixel};

/// One annotation row.
#[derive(Clone, Debug, PartialEq)]
pub struct ImageRecord {
    pub image_id: String,
    pub class_name: String,
    pub rad_id: Option<String>,
    pub bbox: BBoxXYXY<Pixel>,
}

impl ImageRecord {
    pub fn new(
        image_id: impl Into<String>,
        class_name: impl Into<String>,
        bbox: BBoxXYXY<Pixel>,
    ) -> Self {
        Self {
            image_id: image_id.into(),
            class_name: class_name.into(),
            rad_id: None,
            bbox,
        }
    }

    /// True for the "no object on this image" placeholder row.
    #[inline]
    pub fn is_no_finding(&self) -> bool {
        self.class_name == NO_FINDING
    }
}

/// Boxes, scores and labels of one image, index-aligned.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ParallelAnnotations {
    pub boxes: Vec<BBoxXYXY<Pixel>>,
    /// Always `1.0`: these are ground truth, not predictions.
    pub scores: Vec<f64>,
    pub labels: Vec<String>,
}

impl ParallelAnnotations {
    pub fn len(&self) -> usize {
        self.boxes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.boxes.is_empty()
    }
}

/// Drops `No finding` rows and splits the rest into parallel arrays,
/// keeping input order. Overlapping boxes from different annotators are
/// kept as they are.
pub fn convert(records: &[ImageRecord]) -> ParallelAnnotations {
    let mut out = ParallelAnnotations::default();
    for record in records.iter().filter(|record| !record.is_no_finding()) {
        out.boxes.push(record.bbox);
        out.scores.push(1.0);
        out.labels.push(record.class_name.clone());
    }
    out
}

/// Groups records by `image_id`, in order of first appearance.
pub fn group_by_image(records: Vec<ImageRecord>) -> Vec<(String, Vec<ImageRecord>)> {
    let mut groups: Vec<(String, Vec<ImageRecord>)> = Vec::new();
    let mut index_by_id: HashMap<String, usize> = HashMap::new();

    for record in records {
        match index_by_id.get(&record.image_id) {
            Some(&idx) => groups[idx].1.push(record),
            None => {
                index_by_id.insert(record.image_id.clone(), groups.len());
                groups.push((record.image_id.clone(), vec![record]));
            }
        }
    }

    groups
}

#[derive(Debug, Deserialize)]
struct RecordRow {
    image_id: String,
    class_name: String,
    #[serde(default)]
    rad_id: Option<String>,
    x_min: Option<f64>,
    y_min: Option<f64>,
    x_max: Option<f64>,
    y_max: Option<f64>,
}

/// Reads the annotation table from a CSV file.
pub fn read_records_csv(path: &Path) -> Result<Vec<ImageRecord>, PrepError> {
    let file = File::open(path).map_err(PrepError::Io)?;
    read_records(BufReader::new(file), path)
}

/// Reads the annotation table from an in-memory CSV string.
pub fn records_from_csv_str(csv: &str) -> Result<Vec<ImageRecord>, PrepError> {
    read_records(csv.as_bytes(), Path::new("<memory>"))
}

fn read_records<R: Read>(reader: R, path: &Path) -> Result<Vec<ImageRecord>, PrepError> {
    let mut csv_reader = csv::Reader::from_reader(reader);
    let mut records = Vec::new();

    for result in csv_reader.deserialize() {
        let row: RecordRow = result.map_err(|source| PrepError::CsvParse {
            path: path.to_path_buf(),
            source,
        })?;
        records.push(row_to_record(row, path)?);
    }

    Ok(records)
}

fn row_to_record(row: RecordRow, path: &Path) -> Result<ImageRecord, PrepError> {
    let bbox = match (row.x_min, row.y_min, row.x_max, row.y_max) {
        (Some(x_min), Some(y_min), Some(x_max), Some(y_max)) => {
            BBoxXYXY::from_xyxy(x_min, y_min, x_max, y_max)
        }
        _ if row.class_name == NO_FINDING => BBoxXYXY::default(),
        _ => {
            return Err(PrepError::MissingCoordinates {
                path: path.to_path_buf(),
                image_id: row.image_id,
                class_name: row.class_name,
            })
        }
    };

    Ok(ImageRecord {
        image_id: row.image_id,
        class_name: row.class_name,
        rad_id: row.rad_id.filter(|rad| !rad.trim().is_empty()),
        bbox,
    })
}
