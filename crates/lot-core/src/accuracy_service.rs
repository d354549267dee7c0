//! Scores the classification adapter against a labelled image set.

use lot_domain::{GroundTruthEntry, VehicleCategory};

use crate::{classification::ClassificationAdapter, CoreError};

/// One ground-truth row the classifier got wrong.
#[derive(Debug, Clone, PartialEq)]
pub struct Mismatch {
    pub image: String,
    pub expected: VehicleCategory,
    pub predicted: VehicleCategory,
    /// Set when the image could not be read at all.
    pub error: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct AccuracyReport {
    pub total: usize,
    pub correct: usize,
    pub mismatches: Vec<Mismatch>,
}

impl AccuracyReport {
    /// Percentage of correct predictions, or `None` for an empty label file.
    pub fn accuracy_percent(&self) -> Option<f64> {
        if self.total == 0 {
            None
        } else {
            Some(self.correct as f64 / self.total as f64 * 100.0)
        }
    }

    pub fn unreadable(&self) -> usize {
        self.mismatches
            .iter()
            .filter(|mismatch| mismatch.error.is_some())
            .count()
    }
}

pub struct AccuracyService;

impl AccuracyService {
    /// Classifies every labelled image and compares the result with its label.
    /// `load_image` resolves a ground-truth image reference to raw bytes.
    pub fn evaluate<F>(
        entries: &[GroundTruthEntry],
        adapter: &ClassificationAdapter,
        mut load_image: F,
    ) -> AccuracyReport
    where
        F: FnMut(&str) -> Result<Vec<u8>, CoreError>,
    {
        let mut report = AccuracyReport {
            total: entries.len(),
            ..AccuracyReport::default()
        };

        for entry in entries {
            let (predicted, error) = match load_image(&entry.image) {
                Ok(bytes) => (adapter.classify(&bytes), None),
                Err(err) => {
                    tracing::warn!(image = %entry.image, error = %err, "ground truth image unreadable");
                    (VehicleCategory::Unknown, Some(err.to_string()))
                }
            };

            if error.is_none() && predicted == entry.label {
                report.correct += 1;
            } else {
                report.mismatches.push(Mismatch {
                    image: entry.image.clone(),
                    expected: entry.label.clone(),
                    predicted,
                    error,
                });
            }
        }
        report
    }
}
