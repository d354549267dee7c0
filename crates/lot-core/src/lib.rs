//! lot-core
//!
//! Business rules for the parking lot: the vehicle ledger, billing, session
//! orchestration, reporting and classifier scoring.
//! Depends on lot-domain. No CLI, no terminal I/O, no concrete storage.

pub mod accuracy_service;
pub mod billing_service;
pub mod classification;
pub mod error;
pub mod ledger_service;
pub mod session_service;
pub mod storage;
pub mod summary_service;
pub mod time;

pub use accuracy_service::*;
pub use billing_service::*;
pub use classification::{
    category_from_label, category_from_predictions, ClassificationAdapter, Prediction,
    VehicleClassifier, DEFAULT_TOP_K,
};
pub use error::CoreError;
pub use ledger_service::*;
pub use session_service::*;
pub use storage::{MemoryVehicleStore, ReferenceStore, VehicleStore};
pub use summary_service::*;
pub use time::{Clock, FixedClock};

#[cfg(test)]
mod tests;
