//! Vehicle categories used for billing and classification.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Coarse vehicle type attached to every parking session.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum VehicleCategory {
    Car,
    Bike,
    Truck,
    #[default]
    Unknown,
    /// Any other category named by the rate table or the operator.
    Other(String),
}

impl VehicleCategory {
    /// Parses a free-form category name. Matching of the built-in names is
    /// case-insensitive; blank input maps to [`VehicleCategory::Unknown`].
    pub fn parse(value: &str) -> Self {
        let trimmed = value.trim();
        match trimmed.to_ascii_lowercase().as_str() {
            "car" => VehicleCategory::Car,
            "bike" | "motorcycle" | "motorbike" => VehicleCategory::Bike,
            "truck" => VehicleCategory::Truck,
            "" | "unknown" => VehicleCategory::Unknown,
            _ => VehicleCategory::Other(trimmed.to_string()),
        }
    }

    pub fn name(&self) -> &str {
        match self {
            VehicleCategory::Car => "Car",
            VehicleCategory::Bike => "Bike",
            VehicleCategory::Truck => "Truck",
            VehicleCategory::Unknown => "Unknown",
            VehicleCategory::Other(name) => name,
        }
    }

    /// Case-folded lookup key, so `SUV` and `suv` address the same rate.
    pub fn key(&self) -> String {
        self.name().to_ascii_lowercase()
    }

    pub fn is_unknown(&self) -> bool {
        matches!(self, VehicleCategory::Unknown)
    }
}

impl fmt::Display for VehicleCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl From<String> for VehicleCategory {
    fn from(value: String) -> Self {
        VehicleCategory::parse(&value)
    }
}

impl From<&str> for VehicleCategory {
    fn from(value: &str) -> Self {
        VehicleCategory::parse(value)
    }
}

impl From<VehicleCategory> for String {
    fn from(value: VehicleCategory) -> Self {
        value.name().to_string()
    }
}
