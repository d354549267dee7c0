use std::sync::{
    atomic::{AtomicBool, Ordering},
    Arc, Mutex,
};

use lot_domain::{GroundTruthEntry, LayoutSlot, RateEntry, VehicleRecord};

use crate::CoreError;

/// Persistence backend for the vehicle ledger.
///
/// Saves replace the whole table; there is no partial update.
pub trait VehicleStore: Send + Sync {
    fn load_vehicles(&self) -> Result<Vec<VehicleRecord>, CoreError>;
    fn save_vehicles(&self, records: &[VehicleRecord]) -> Result<(), CoreError>;
}

/// Read-only reference tables that live next to the ledger.
pub trait ReferenceStore: Send + Sync {
    fn load_rates(&self) -> Result<Vec<RateEntry>, CoreError>;
    fn load_layout(&self) -> Result<Vec<LayoutSlot>, CoreError>;
    fn load_ground_truth(&self) -> Result<Vec<GroundTruthEntry>, CoreError>;
}

/// In-memory [`VehicleStore`] whose snapshot can be shared and inspected.
#[derive(Debug, Clone, Default)]
pub struct MemoryVehicleStore {
    rows: Arc<Mutex<Vec<VehicleRecord>>>,
    fail_saves: Arc<AtomicBool>,
}

impl MemoryVehicleStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_records(records: Vec<VehicleRecord>) -> Self {
        Self {
            rows: Arc::new(Mutex::new(records)),
            fail_saves: Arc::new(AtomicBool::new(false)),
        }
    }

    /// Returns the last persisted snapshot.
    pub fn snapshot(&self) -> Vec<VehicleRecord> {
        self.rows
            .lock()
            .map(|rows| rows.clone())
            .unwrap_or_default()
    }

    /// Makes subsequent saves fail, to exercise rollback paths.
    pub fn set_fail_saves(&self, fail: bool) {
        self.fail_saves.store(fail, Ordering::SeqCst);
    }
}

impl VehicleStore for MemoryVehicleStore {
    fn load_vehicles(&self) -> Result<Vec<VehicleRecord>, CoreError> {
        self.rows
            .lock()
            .map(|rows| rows.clone())
            .map_err(|_| CoreError::Storage("memory store lock poisoned".into()))
    }

    fn save_vehicles(&self, records: &[VehicleRecord]) -> Result<(), CoreError> {
        if self.fail_saves.load(Ordering::SeqCst) {
            return Err(CoreError::Storage("memory store rejected write".into()));
        }
        let mut rows = self
            .rows
            .lock()
            .map_err(|_| CoreError::Storage("memory store lock poisoned".into()))?;
        *rows = records.to_vec();
        Ok(())
    }
}
