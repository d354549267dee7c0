//! lot-domain
//!
//! Pure domain models (VehicleRecord, VehicleCategory, RateEntry, LayoutSlot, etc.).
//! No I/O, no CLI, no storage. Only data types and core enums.

pub mod category;
pub mod common;
pub mod ground_truth;
pub mod layout;
pub mod rate;
pub mod vehicle;

pub use category::*;
pub use common::*;
pub use ground_truth::*;
pub use layout::*;
pub use rate::*;
pub use vehicle::*;
