//! Interactive entry form.
//!
//! Arguments given on the command line pre-fill the form; each remaining
//! field is prompted with a validated default so the attendant can accept
//! it with Enter.

use dialoguer::Input;
use uuid::Uuid;

use lot_core::{NewEntry, RateTable, VehicleLedger};
use lot_domain::{format_timestamp, parse_timestamp, Timestamp, VehicleCategory, TIMESTAMP_HINT};

use crate::cli::core::{CommandError, ShellContext};
use crate::cli::io;

/// Values already known before the form opens.
#[derive(Debug, Clone, Default)]
pub struct EntryDraft {
    pub token: Option<String>,
    pub license_number: Option<String>,
    pub slot: Option<String>,
    pub category: Option<VehicleCategory>,
    pub entry_time: Option<Timestamp>,
}

impl EntryDraft {
    pub fn from_args(args: &[&str]) -> Result<Self, CommandError> {
        let text = |idx: usize| {
            args.get(idx)
                .map(|value| value.trim())
                .filter(|value| !value.is_empty())
                .map(str::to_string)
        };
        let entry_time = match text(4) {
            Some(raw) => Some(parse_timestamp(&raw).map_err(lot_core::CoreError::from)?),
            None => None,
        };
        Ok(Self {
            token: text(0),
            license_number: text(1),
            slot: text(2),
            category: text(3).map(|value| VehicleCategory::parse(&value)),
            entry_time,
        })
    }

    pub fn is_complete(&self) -> bool {
        self.token.is_some() && self.license_number.is_some() && self.slot.is_some()
    }

    /// Fills the optional fields from the shell defaults.
    pub fn finish(
        self,
        suggestion: Option<&VehicleCategory>,
        now: Timestamp,
    ) -> Result<NewEntry, CommandError> {
        let missing = |name: &str| CommandError::InvalidArguments(format!("{name} is required"));
        Ok(NewEntry {
            token: self.token.ok_or_else(|| missing("token"))?,
            license_number: self.license_number.ok_or_else(|| missing("license number"))?,
            slot: self.slot.ok_or_else(|| missing("slot"))?,
            category: self
                .category
                .or_else(|| suggestion.cloned())
                .unwrap_or_default(),
            entry_time: self.entry_time.unwrap_or(now),
        })
    }
}

pub fn validate_token(ledger: &VehicleLedger, token: &str) -> Result<(), String> {
    let token = token.trim();
    if token.is_empty() {
        return Err("Token must not be empty.".into());
    }
    if ledger.find_open_by_token(token).is_some() {
        return Err(format!("Token `{token}` already has an open session."));
    }
    Ok(())
}

pub fn validate_required(label: &str, value: &str) -> Result<(), String> {
    if value.trim().is_empty() {
        Err(format!("{label} must not be empty."))
    } else {
        Ok(())
    }
}

pub fn validate_time(value: &str) -> Result<(), String> {
    parse_timestamp(value)
        .map(|_| ())
        .map_err(|_| format!("Use the {TIMESTAMP_HINT} format."))
}

/// Category choices: the detection suggestion first, then every rated
/// category, then `Unknown`.
pub fn category_choices(
    rates: &RateTable,
    suggestion: Option<&VehicleCategory>,
) -> Vec<VehicleCategory> {
    let mut choices: Vec<VehicleCategory> = Vec::new();
    let candidates = suggestion
        .into_iter()
        .cloned()
        .chain(rates.categories())
        .chain(std::iter::once(VehicleCategory::Unknown));
    for candidate in candidates {
        if !choices.contains(&candidate) {
            choices.push(candidate);
        }
    }
    choices
}

/// Prompts for every field the draft does not already carry.
pub fn prompt_entry(context: &ShellContext, draft: EntryDraft) -> Result<NewEntry, CommandError> {
    let theme = context.theme();
    let ledger = &context.data.ledger;

    let token = match draft.token {
        Some(token) => token,
        None => {
            let short = Uuid::new_v4().simple().to_string();
            Input::<String>::with_theme(theme)
                .with_prompt("Token")
                .default(short[..8].to_uppercase())
                .validate_with(|value: &String| validate_token(ledger, value))
                .interact_text()?
        }
    };

    let license_number = match draft.license_number {
        Some(value) => value,
        None => Input::<String>::with_theme(theme)
            .with_prompt("License number")
            .validate_with(|value: &String| validate_required("License number", value))
            .interact_text()?,
    };

    let slot = match draft.slot {
        Some(value) => value,
        None => Input::<String>::with_theme(theme)
            .with_prompt("Slot")
            .validate_with(|value: &String| validate_required("Slot", value))
            .interact_text()?,
    };

    let category = match draft.category {
        Some(category) => category,
        None => {
            let choices = category_choices(&context.data.rates, context.suggested_category.as_ref());
            let labels: Vec<String> = choices.iter().map(|choice| choice.to_string()).collect();
            let index = io::prompt_select(theme, "Vehicle type", &labels, 0)?;
            choices.get(index).cloned().unwrap_or_default()
        }
    };

    let entry_time = match draft.entry_time {
        Some(time) => time,
        None => {
            let raw = Input::<String>::with_theme(theme)
                .with_prompt(format!("Entry time ({TIMESTAMP_HINT})"))
                .default(format_timestamp(&context.now()))
                .validate_with(|value: &String| validate_time(value))
                .interact_text()?;
            parse_timestamp(&raw).map_err(lot_core::CoreError::from)?
        }
    };

    Ok(NewEntry {
        token,
        license_number,
        category,
        entry_time,
        slot,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use lot_core::MemoryVehicleStore;
    use lot_domain::{RateEntry, VehicleRecord};
    use rust_decimal_macros::dec;

    fn at(hour: u32) -> Timestamp {
        NaiveDate::from_ymd_opt(2024, 1, 1)
            .and_then(|date| date.and_hms_opt(hour, 0, 0))
            .expect("valid time")
    }

    #[test]
    fn draft_takes_positional_arguments() {
        let draft = EntryDraft::from_args(&["T-1", "KA01", "A1", "bike", "01-01-2024 10:00"])
            .expect("draft");
        assert!(draft.is_complete());
        let entry = draft.finish(None, at(12)).expect("entry");
        assert_eq!(entry.category, VehicleCategory::Bike);
        assert_eq!(entry.entry_time, at(10));
    }

    #[test]
    fn missing_optional_fields_use_suggestion_and_clock() {
        let draft = EntryDraft::from_args(&["T-1", "KA01", "A1"]).expect("draft");
        let entry = draft
            .finish(Some(&VehicleCategory::Truck), at(9))
            .expect("entry");
        assert_eq!(entry.category, VehicleCategory::Truck);
        assert_eq!(entry.entry_time, at(9));

        let entry = EntryDraft::from_args(&["T-2", "KA02", "A2"])
            .and_then(|draft| draft.finish(None, at(9)))
            .expect("entry");
        assert_eq!(entry.category, VehicleCategory::Unknown);
    }

    #[test]
    fn incomplete_draft_reports_the_missing_field() {
        let draft = EntryDraft::from_args(&["T-1"]).expect("draft");
        assert!(!draft.is_complete());
        let err = draft.finish(None, at(9)).expect_err("license missing");
        assert!(err.to_string().contains("license number"));
    }

    #[test]
    fn malformed_time_argument_is_rejected() {
        assert!(EntryDraft::from_args(&["T-1", "KA01", "A1", "Car", "10:00"]).is_err());
    }

    #[test]
    fn token_validation_rejects_open_duplicates() {
        let record = VehicleRecord::new("T-1", "KA01", VehicleCategory::Car, at(8), "A1");
        let store = MemoryVehicleStore::with_records(vec![record]);
        let ledger = VehicleLedger::load(Box::new(store)).expect("ledger");

        assert!(validate_token(&ledger, " T-1 ").is_err());
        assert!(validate_token(&ledger, "").is_err());
        assert!(validate_token(&ledger, "T-2").is_ok());
    }

    #[test]
    fn time_validation_names_the_format() {
        assert!(validate_time("01-01-2024 10:00").is_ok());
        let message = validate_time("2024/01/01").expect_err("bad format");
        assert!(message.contains(TIMESTAMP_HINT));
    }

    #[test]
    fn suggestion_leads_the_category_choices() {
        let rates = RateTable::new(vec![
            RateEntry::new("Car", dec!(20)),
            RateEntry::new("Bike", dec!(10)),
        ])
        .expect("rates");
        let choices = category_choices(&rates, Some(&VehicleCategory::Bike));
        assert_eq!(choices[0], VehicleCategory::Bike);
        assert_eq!(choices.len(), 3);
        assert_eq!(choices.last(), Some(&VehicleCategory::Unknown));
    }
}
