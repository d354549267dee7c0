//! Labelled images used to score the classifier.

use serde::{Deserialize, Serialize};

use crate::category::VehicleCategory;

/// An image path paired with the category a correct classifier should report.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GroundTruthEntry {
    /// Image location, relative to the data directory unless absolute.
    pub image: String,
    pub label: VehicleCategory,
}

impl GroundTruthEntry {
    pub fn new(image: impl Into<String>, label: impl Into<VehicleCategory>) -> Self {
        Self {
            image: image.into(),
            label: label.into(),
        }
    }
}
