//! Static parking layout rows.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::common::Displayable;

/// One parking bay as listed in the layout table.
///
/// Layout rows are sourced independently of the vehicle ledger; opening or
/// closing a session does not change a slot's status.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LayoutSlot {
    pub slot_id: String,
    pub status: SlotStatus,
}

impl LayoutSlot {
    pub fn new(slot_id: impl Into<String>, status: SlotStatus) -> Self {
        Self {
            slot_id: slot_id.into(),
            status,
        }
    }
}

impl Displayable for LayoutSlot {
    fn display_label(&self) -> String {
        format!("slot:{} [{}]", self.slot_id, self.status)
    }
}

/// Occupancy state of a layout slot.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum SlotStatus {
    Occupied,
    Vacant,
    /// Any status string the layout file uses that is neither of the above.
    Other(String),
}

impl SlotStatus {
    pub fn parse(value: &str) -> Self {
        let trimmed = value.trim();
        match trimmed.to_ascii_lowercase().as_str() {
            "occupied" => SlotStatus::Occupied,
            "vacant" => SlotStatus::Vacant,
            _ => SlotStatus::Other(trimmed.to_string()),
        }
    }

    pub fn label(&self) -> &str {
        match self {
            SlotStatus::Occupied => "Occupied",
            SlotStatus::Vacant => "Vacant",
            SlotStatus::Other(label) => label,
        }
    }
}

impl fmt::Display for SlotStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl From<String> for SlotStatus {
    fn from(value: String) -> Self {
        SlotStatus::parse(&value)
    }
}

impl From<SlotStatus> for String {
    fn from(value: SlotStatus) -> Self {
        value.label().to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_parsing_is_case_insensitive() {
        assert_eq!(SlotStatus::parse("occupied"), SlotStatus::Occupied);
        assert_eq!(SlotStatus::parse("VACANT "), SlotStatus::Vacant);
        assert_eq!(
            SlotStatus::parse("Reserved"),
            SlotStatus::Other("Reserved".into())
        );
    }

    #[test]
    fn display_label_includes_status() {
        let slot = LayoutSlot::new("A1", SlotStatus::Vacant);
        assert_eq!(slot.display_label(), "slot:A1 [Vacant]");
    }
}
