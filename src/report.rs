//! Summary of a preparation run.

use serde::Serialize;
use std::fmt;

/// Counts and per-image failures of one run.
#[derive(Clone, Debug, Default, Serialize)]
pub struct PrepReport {
    /// Output format name.
    pub format: String,
    /// Transform name.
    pub transform: String,
    /// Annotation rows read.
    pub records: usize,
    /// Distinct images referenced by the rows.
    pub images: usize,
    /// Images transformed and written successfully.
    pub processed: usize,
    /// Boxes handed to the writer (after dropping `No finding` rows).
    pub boxes: usize,
    /// Images listed in the training manifest.
    pub train: usize,
    /// Images listed in the validation manifest.
    pub val: usize,
    /// Images skipped because they failed.
    pub issues: Vec<PrepIssue>,
}

impl PrepReport {
    pub fn new(format: impl Into<String>, transform: impl Into<String>) -> Self {
        Self {
            format: format.into(),
            transform: transform.into(),
            ..Default::default()
        }
    }

    pub fn add(&mut self, issue: PrepIssue) {
        self.issues.push(issue);
    }

    pub fn failed(&self) -> usize {
        self.issues.len()
    }
}

impl fmt::Display for PrepReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "Prepared {} dataset with {} transform",
            self.format, self.transform
        )?;
        writeln!(
            f,
            "  {} records, {} images, {} boxes",
            self.records, self.images, self.boxes
        )?;
        writeln!(
            f,
            "  processed {} image(s): {} train, {} val",
            self.processed, self.train, self.val
        )?;

        if !self.issues.is_empty() {
            writeln!(f)?;
            writeln!(f, "Skipped ({}):", self.issues.len())?;
            for issue in &self.issues {
                writeln!(f, "  - {}", issue)?;
            }
        }

        Ok(())
    }
}

/// An image that could not be prepared.
#[derive(Clone, Debug, Serialize)]
pub struct PrepIssue {
    pub image_id: String,
    pub message: String,
}

impl PrepIssue {
    pub fn new(image_id: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            image_id: image_id.into(),
            message: message.into(),
        }
    }
}

impl fmt::Display for PrepIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.image_id, self.message)
    }
}
