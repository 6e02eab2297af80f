use std::path::PathBuf;
use thiserror::Error;

/// The main error type for xrayprep operations.
#[derive(Debug, Error)]
pub enum PrepError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse annotation CSV {path}: {source}")]
    CsvParse {
        path: PathBuf,
        #[source]
        source: csv::Error,
    },

    #[error("Annotation row for image '{image_id}' ({class_name}) in {path} has no box coordinates")]
    MissingCoordinates {
        path: PathBuf,
        image_id: String,
        class_name: String,
    },

    #[error("Image '{image}' has {found} channel(s); expected {expected}")]
    ChannelMismatch {
        image: String,
        expected: u8,
        found: u8,
    },

    #[error("Image '{image}' has {bits}-bit samples; expected 8-bit")]
    BitDepth { image: String, bits: u16 },

    #[error("Image '{image}' has no pixels")]
    EmptyImage { image: String },

    #[error("Image '{image}' has {boxes} box(es) but {classes} class label(s)")]
    LengthMismatch {
        image: String,
        boxes: usize,
        classes: usize,
    },

    #[error("Invalid mask directory {path}: {message}")]
    MaskIndex { path: PathBuf, message: String },

    #[error("Pixel buffer holds {found} sample(s); {width}x{height} needs {expected}")]
    BufferSize {
        width: u32,
        height: u32,
        expected: usize,
        found: usize,
    },

    #[error("No mask found for image '{image}'")]
    MaskNotFound { image: String },

    #[error("Unknown class name: '{0}'")]
    UnknownClass(String),

    #[error("Image error for {path}: {source}")]
    Image {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },

    #[error("Failed to parse config {path}: {source}")]
    ConfigParse {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Unsupported format: {0}")]
    UnsupportedFormat(String),
}
