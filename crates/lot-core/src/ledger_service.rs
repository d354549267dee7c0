//! The vehicle ledger: an append-only log of parking sessions with in-place
//! exit stamping.

use std::collections::HashSet;

use lot_domain::{format_timestamp, is_minute_precision, Timestamp, VehicleRecord};
use rust_decimal::Decimal;

use crate::{storage::VehicleStore, CoreError};

/// Owns the in-memory vehicle records and writes every mutation through to
/// its [`VehicleStore`].
pub struct VehicleLedger {
    records: Vec<VehicleRecord>,
    store: Box<dyn VehicleStore>,
}

impl VehicleLedger {
    /// Loads the full ledger from `store`.
    pub fn load(store: Box<dyn VehicleStore>) -> Result<Self, CoreError> {
        let records = store.load_vehicles()?;
        for warning in ledger_warnings(&records) {
            tracing::warn!("{warning}");
        }
        tracing::debug!(records = records.len(), "vehicle ledger loaded");
        Ok(Self { records, store })
    }

    pub fn records(&self) -> &[VehicleRecord] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Records whose vehicle is still parked.
    pub fn open_sessions(&self) -> impl Iterator<Item = &VehicleRecord> + '_ {
        self.records.iter().filter(|record| record.is_open())
    }

    /// Every record that ever carried `token`, oldest first.
    pub fn history(&self, token: &str) -> Vec<&VehicleRecord> {
        self.records
            .iter()
            .filter(|record| record.matches_token(token))
            .collect()
    }

    /// Returns the open record for `token`, if any.
    pub fn find_open_by_token(&self, token: &str) -> Option<&VehicleRecord> {
        self.open_index(token).map(|idx| &self.records[idx])
    }

    /// Appends a new open record and persists the ledger.
    pub fn append(&mut self, mut record: VehicleRecord) -> Result<(), CoreError> {
        let token = record.token.trim().to_string();
        if token.is_empty() {
            return Err(CoreError::Validation("token must not be empty".into()));
        }
        if record.exit_time.is_some() {
            return Err(CoreError::Validation(format!(
                "new entry `{token}` must not carry an exit time"
            )));
        }
        ensure_minute_precision("entry", &record.entry_time)?;
        if self.open_index(&token).is_some() {
            return Err(CoreError::Validation(format!(
                "token `{token}` already has an open session"
            )));
        }
        record.token = token;

        self.records.push(record);
        if let Err(err) = self.persist() {
            self.records.pop();
            return Err(err);
        }
        tracing::debug!(records = self.records.len(), "vehicle entry appended");
        Ok(())
    }

    /// Stamps the exit time and rent on the open record for `token` and
    /// persists the ledger.
    pub fn close_session(
        &mut self,
        token: &str,
        exit_time: Timestamp,
        rent: Decimal,
    ) -> Result<&VehicleRecord, CoreError> {
        let idx = self
            .open_index(token)
            .ok_or_else(|| CoreError::NotFound(token.trim().to_string()))?;

        ensure_minute_precision("exit", &exit_time)?;
        let entry_time = self.records[idx].entry_time;
        if exit_time < entry_time {
            return Err(CoreError::InvalidInterval {
                entry: format_timestamp(&entry_time),
                exit: format_timestamp(&exit_time),
            });
        }

        let previous = self.records[idx].clone();
        self.records[idx].close(exit_time, rent);
        if let Err(err) = self.persist() {
            self.records[idx] = previous;
            return Err(err);
        }
        tracing::debug!(token = token.trim(), "vehicle session closed");
        Ok(&self.records[idx])
    }

    fn open_index(&self, token: &str) -> Option<usize> {
        self.records
            .iter()
            .position(|record| record.is_open() && record.matches_token(token))
    }

    fn persist(&self) -> Result<(), CoreError> {
        self.store.save_vehicles(&self.records)
    }
}

/// Stamps are stored at minute resolution; anything finer would not read
/// back as the value that was billed.
fn ensure_minute_precision(label: &str, timestamp: &Timestamp) -> Result<(), CoreError> {
    if is_minute_precision(timestamp) {
        Ok(())
    } else {
        Err(CoreError::Validation(format!(
            "{label} time {} must not carry seconds",
            timestamp.format("%d-%m-%Y %H:%M:%S")
        )))
    }
}

/// Detects stored data that breaks the ledger invariants, such as a token
/// with more than one open session or an exit stamped before its entry.
pub fn ledger_warnings(records: &[VehicleRecord]) -> Vec<String> {
    let mut open_tokens = HashSet::new();
    let mut warnings = Vec::new();

    for record in records {
        let token = record.token.trim();
        if token.is_empty() {
            warnings.push(format!(
                "record for {} in slot {} has an empty token",
                record.license_number, record.slot
            ));
        }
        if record.is_open() && !open_tokens.insert(token.to_string()) {
            warnings.push(format!("token `{token}` has more than one open session"));
        }
        if let Some(exit) = record.exit_time {
            if exit < record.entry_time {
                warnings.push(format!("token `{token}` exits before it entered"));
            }
        }
    }
    warnings
}
