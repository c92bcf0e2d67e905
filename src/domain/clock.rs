//! Time source used by scheduling and scoring logic

use chrono::{DateTime, Utc};

#[cfg(test)]
use mockall::automock;

/// Source of the current time
#[cfg_attr(test, automock)]
pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Utc>;
}

/// Wall-clock time
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_mock_clock_returns_fixed_time() {
        let fixed = Utc.with_ymd_and_hms(2025, 3, 1, 12, 0, 0).unwrap();
        let mut clock = MockClock::new();
        clock.expect_now().return_const(fixed);

        assert_eq!(clock.now(), fixed);
    }
}
