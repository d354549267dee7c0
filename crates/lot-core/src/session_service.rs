//! Check-in and check-out orchestration over the ledger and billing engine.

use lot_domain::{Timestamp, VehicleCategory, VehicleRecord};
use rust_decimal::Decimal;

use crate::{
    billing_service::{BillingEngine, RateTable},
    ledger_service::VehicleLedger,
    CoreError,
};

/// Fields captured by the entry form.
#[derive(Debug, Clone)]
pub struct NewEntry {
    pub token: String,
    pub license_number: String,
    pub category: VehicleCategory,
    pub entry_time: Timestamp,
    pub slot: String,
}

/// Result of a successful check-out.
#[derive(Debug, Clone)]
pub struct ExitReceipt {
    pub record: VehicleRecord,
    pub hours: Decimal,
    pub rent: Decimal,
}

pub struct SessionService;

impl SessionService {
    /// Opens a parking session.
    pub fn check_in(ledger: &mut VehicleLedger, entry: NewEntry) -> Result<(), CoreError> {
        let record = VehicleRecord::new(
            entry.token,
            entry.license_number,
            entry.category,
            entry.entry_time,
            entry.slot,
        );
        let token = record.token.clone();
        ledger.append(record)?;
        tracing::info!(token = token.trim(), "vehicle checked in");
        Ok(())
    }

    /// Bills the open session for `token` and stamps its exit. Nothing is
    /// written unless billing succeeds.
    pub fn check_out(
        ledger: &mut VehicleLedger,
        rates: &RateTable,
        token: &str,
        exit_time: Timestamp,
    ) -> Result<ExitReceipt, CoreError> {
        let open = ledger
            .find_open_by_token(token)
            .ok_or_else(|| CoreError::NotFound(token.trim().to_string()))?;
        let entry_time = open.entry_time;
        let rent = BillingEngine::compute_rent(&open.category, entry_time, exit_time, rates)?;

        let record = ledger.close_session(token, exit_time, rent)?.clone();
        tracing::info!(token = token.trim(), %rent, "vehicle checked out");
        Ok(ExitReceipt {
            hours: BillingEngine::hours_between(entry_time, exit_time),
            rent,
            record,
        })
    }
}
