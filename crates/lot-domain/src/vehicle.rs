//! Domain model for one parking session.

use chrono::Duration;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::category::VehicleCategory;
use crate::common::*;

/// A single parking transaction, from entry to (eventually) exit.
///
/// Records are append-only: the only mutation after creation is stamping
/// the exit time and the billed rent, which happens exactly once.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VehicleRecord {
    pub token: String,
    pub license_number: String,
    pub category: VehicleCategory,
    pub entry_time: Timestamp,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub exit_time: Option<Timestamp>,
    pub slot: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rent: Option<Decimal>,
}

impl VehicleRecord {
    /// Creates an open record (no exit time, no rent).
    pub fn new(
        token: impl Into<String>,
        license_number: impl Into<String>,
        category: VehicleCategory,
        entry_time: Timestamp,
        slot: impl Into<String>,
    ) -> Self {
        Self {
            token: token.into(),
            license_number: license_number.into(),
            category,
            entry_time,
            exit_time: None,
            slot: slot.into(),
            rent: None,
        }
    }

    /// `true` while the vehicle is still parked.
    pub fn is_open(&self) -> bool {
        self.exit_time.is_none()
    }

    pub fn matches_token(&self, token: &str) -> bool {
        self.token.trim() == token.trim()
    }

    /// Stamps the exit time and rent. Callers are responsible for checking
    /// that `exit_time` is not before the entry time.
    pub fn close(&mut self, exit_time: Timestamp, rent: Decimal) {
        self.exit_time = Some(exit_time);
        self.rent = Some(rent);
    }

    /// Time parked so far, available once the record is closed.
    pub fn duration(&self) -> Option<Duration> {
        self.exit_time.map(|exit| exit - self.entry_time)
    }
}

impl Displayable for VehicleRecord {
    fn display_label(&self) -> String {
        let state = if self.is_open() { "open" } else { "closed" };
        format!(
            "token:{} {} ({}) [{}]",
            self.token, self.license_number, self.category, state
        )
    }
}
