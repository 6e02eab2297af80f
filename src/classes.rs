//! Fixed class table of the chest X-ray abnormality dataset.
//!
//! YOLO label files carry integer class IDs; VOC files carry names and never
//! consult this table.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::PrepError;

/// Class name used by the annotation table for "no object on this image".
pub const NO_FINDING: &str = "No finding";

/// Class names indexed by their ID.
pub const CLASS_NAMES: [&str; 15] = [
    "Aortic enlargement",
    "Atelectasis",
    "Calcification",
    "Cardiomegaly",
    "Consolidation",
    "ILD",
    "Infiltration",
    "Lung Opacity",
    "Nodule/Mass",
    "Other lesion",
    "Pleural effusion",
    "Pleural thickening",
    "Pneumothorax",
    "Pulmonary fibrosis",
    NO_FINDING,
];

/// Integer ID of a detection class.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ClassId(pub u32);

impl ClassId {
    #[inline]
    pub fn new(id: u32) -> Self {
        Self(id)
    }

    #[inline]
    pub fn as_u32(&self) -> u32 {
        self.0
    }
}

impl fmt::Debug for ClassId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ClassId({})", self.0)
    }
}

impl fmt::Display for ClassId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Looks up the ID of `name`. Names are matched exactly.
pub fn class_id(name: &str) -> Result<ClassId, PrepError> {
    CLASS_NAMES
        .iter()
        .position(|known| *known == name)
        .map(|idx| ClassId::new(idx as u32))
        .ok_or_else(|| PrepError::UnknownClass(name.to_string()))
}

/// Looks up the name of `id`, if the table has one.
pub fn class_name(id: ClassId) -> Option<&'static str> {
    CLASS_NAMES.get(id.as_u32() as usize).copied()
}
