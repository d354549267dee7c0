//! Derived occupancy figures. Nothing here is cached; callers recompute on
//! every request.

use lot_domain::{LayoutSlot, SlotStatus};
use rust_decimal::Decimal;

use crate::ledger_service::VehicleLedger;

/// Aggregate counts shown on the analytics view.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OccupancySummary {
    pub total_vehicles: usize,
    pub open_sessions: usize,
    pub occupied_slots: usize,
    pub vacant_slots: usize,
    pub collected_revenue: Decimal,
}

pub struct ReportingService;

impl ReportingService {
    pub fn summarize(ledger: &VehicleLedger, layout: &[LayoutSlot]) -> OccupancySummary {
        OccupancySummary {
            total_vehicles: ledger.len(),
            open_sessions: ledger.open_sessions().count(),
            occupied_slots: Self::count_status(layout, &SlotStatus::Occupied),
            vacant_slots: Self::count_status(layout, &SlotStatus::Vacant),
            collected_revenue: Self::collected_revenue(ledger),
        }
    }

    pub fn count_status(layout: &[LayoutSlot], status: &SlotStatus) -> usize {
        layout.iter().filter(|slot| &slot.status == status).count()
    }

    /// Number of slots per status, most frequent first; ties keep the order
    /// in which the status first appears in the layout.
    pub fn status_counts(layout: &[LayoutSlot]) -> Vec<(SlotStatus, usize)> {
        let mut counts: Vec<(SlotStatus, usize)> = Vec::new();
        for slot in layout {
            match counts.iter_mut().find(|(status, _)| status == &slot.status) {
                Some((_, count)) => *count += 1,
                None => counts.push((slot.status.clone(), 1)),
            }
        }
        counts.sort_by(|a, b| b.1.cmp(&a.1));
        counts
    }

    /// Sum of the rent billed on closed sessions.
    pub fn collected_revenue(ledger: &VehicleLedger) -> Decimal {
        ledger
            .records()
            .iter()
            .filter_map(|record| record.rent)
            .sum()
    }
}
