//! Hourly rate reference data.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::category::VehicleCategory;

/// One row of the rate table: the hourly price for a vehicle category.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RateEntry {
    pub category: VehicleCategory,
    pub rate_per_hour: Decimal,
}

impl RateEntry {
    pub fn new(category: impl Into<VehicleCategory>, rate_per_hour: Decimal) -> Self {
        Self {
            category: category.into(),
            rate_per_hour,
        }
    }
}
