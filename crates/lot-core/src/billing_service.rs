//! Rate table and the rent calculation.

use std::collections::BTreeMap;

use lot_domain::{format_timestamp, parse_timestamp, RateEntry, Timestamp, VehicleCategory};
use rust_decimal::{Decimal, RoundingStrategy};

use crate::CoreError;

const SECONDS_PER_HOUR: i64 = 3600;
const AMOUNT_SCALE: u32 = 2;

/// Immutable mapping from vehicle category to hourly rate.
#[derive(Debug, Clone, Default)]
pub struct RateTable {
    rates: BTreeMap<String, RateEntry>,
}

impl RateTable {
    /// Builds a table, rejecting negative rates and duplicate categories.
    pub fn new(entries: Vec<RateEntry>) -> Result<Self, CoreError> {
        let mut rates = BTreeMap::new();
        for entry in entries {
            if entry.rate_per_hour < Decimal::ZERO {
                return Err(CoreError::Validation(format!(
                    "rate for `{}` must not be negative",
                    entry.category
                )));
            }
            let key = entry.category.key();
            if rates.contains_key(&key) {
                return Err(CoreError::Validation(format!(
                    "duplicate rate for category `{}`",
                    entry.category
                )));
            }
            rates.insert(key, entry);
        }
        Ok(Self { rates })
    }

    pub fn rate_for(&self, category: &VehicleCategory) -> Option<Decimal> {
        self.rates
            .get(&category.key())
            .map(|entry| entry.rate_per_hour)
    }

    pub fn contains(&self, category: &VehicleCategory) -> bool {
        self.rates.contains_key(&category.key())
    }

    /// Entries sorted by category name.
    pub fn entries(&self) -> impl Iterator<Item = &RateEntry> + '_ {
        self.rates.values()
    }

    pub fn categories(&self) -> Vec<VehicleCategory> {
        self.rates
            .values()
            .map(|entry| entry.category.clone())
            .collect()
    }

    pub fn len(&self) -> usize {
        self.rates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rates.is_empty()
    }
}

/// Pure rent calculation.
pub struct BillingEngine;

impl BillingEngine {
    /// Rent for a stay: fractional hours times the hourly rate, rounded
    /// half-up to two decimal places.
    pub fn compute_rent(
        category: &VehicleCategory,
        entry_time: Timestamp,
        exit_time: Timestamp,
        rates: &RateTable,
    ) -> Result<Decimal, CoreError> {
        let rate = rates
            .rate_for(category)
            .ok_or_else(|| CoreError::UnknownCategory(category.to_string()))?;
        if exit_time < entry_time {
            return Err(CoreError::InvalidInterval {
                entry: format_timestamp(&entry_time),
                exit: format_timestamp(&exit_time),
            });
        }

        let seconds = Decimal::from((exit_time - entry_time).num_seconds());
        let amount = seconds * rate / Decimal::from(SECONDS_PER_HOUR);
        Ok(amount.round_dp_with_strategy(AMOUNT_SCALE, RoundingStrategy::MidpointAwayFromZero))
    }

    /// Same as [`BillingEngine::compute_rent`] for timestamps still in wire
    /// format. Timestamps are parsed before anything else is checked.
    pub fn compute_rent_from_str(
        category: &VehicleCategory,
        entry_time: &str,
        exit_time: &str,
        rates: &RateTable,
    ) -> Result<Decimal, CoreError> {
        let entry = parse_timestamp(entry_time)?;
        let exit = parse_timestamp(exit_time)?;
        Self::compute_rent(category, entry, exit, rates)
    }

    /// Fractional hours between two stamps, for receipts.
    pub fn hours_between(entry_time: Timestamp, exit_time: Timestamp) -> Decimal {
        Decimal::from((exit_time - entry_time).num_seconds()) / Decimal::from(SECONDS_PER_HOUR)
    }
}
