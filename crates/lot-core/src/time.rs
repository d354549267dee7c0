use chrono::NaiveDateTime;

/// Clock abstracts access to the current wall-clock time so services remain deterministic in tests.
pub trait Clock: Send + Sync {
    /// Returns the current local time, used as the default entry and exit stamp.
    fn now(&self) -> NaiveDateTime;
}

/// A clock frozen at a single instant.
#[derive(Debug, Clone, Copy)]
pub struct FixedClock(pub NaiveDateTime);

impl Clock for FixedClock {
    fn now(&self) -> NaiveDateTime {
        self.0
    }
}
