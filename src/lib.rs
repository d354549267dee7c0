#![doc(test(attr(deny(warnings))))]

//! Parking Core ties the lot-* crates together into a command shell for
//! recording vehicle entries and exits, billing stays, and inspecting the
//! lot layout.

pub mod classifier;
pub mod cli;
pub mod errors;
pub mod utils;

use std::sync::Once;

static INIT_TRACING: Once = Once::new();

/// Initializes global tracing and emits a startup info log.
pub fn init() {
    INIT_TRACING.call_once(|| {
        utils::init_tracing();
        tracing::info!("Parking Core tracing initialized.");
    });
}
