use chrono::{DateTime, NaiveDate};

pub trait ClockPort: Send + Sync {
    fn now_ms(&self) -> i64;

    /// Current UTC calendar date.
    fn today(&self) -> NaiveDate {
        DateTime::from_timestamp_millis(self.now_ms())
            .map(|dt| dt.date_naive())
            .unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct FixedClock(i64);

    impl ClockPort for FixedClock {
        fn now_ms(&self) -> i64 {
            self.0
        }
    }

    #[test]
    fn test_today_is_derived_from_now_ms() {
        // 2025-06-15T12:00:00Z
        let clock = FixedClock(1_749_988_800_000);
        assert_eq!(clock.today(), NaiveDate::from_ymd_opt(2025, 6, 15).unwrap());
    }
}
