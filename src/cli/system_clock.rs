use chrono::{Local, NaiveDateTime, Timelike};

use lot_core::Clock;

/// Local wall clock truncated to the minute, the resolution stamps are
/// stored at.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> NaiveDateTime {
        let now = Local::now().naive_local();
        now.with_second(0)
            .and_then(|value| value.with_nanosecond(0))
            .unwrap_or(now)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn now_has_minute_resolution() {
        let now = SystemClock.now();
        assert_eq!(now.second(), 0);
        assert_eq!(now.nanosecond(), 0);
    }
}
