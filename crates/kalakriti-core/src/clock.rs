//! Clock abstraction for determinism.

use chrono::{DateTime, Datelike, Utc};

/// Abstraction over system time for deterministic behavior.
pub trait Clock: Send + Sync {
    /// Returns the current time.
    fn now(&self) -> DateTime<Utc>;

    /// Returns the current calendar `(year, month)`, month in `1..=12`.
    fn year_month(&self) -> (i32, u32) {
        let now = self.now();
        (now.year(), now.month())
    }
}

/// Production clock that delegates to the system clock.
#[derive(Debug, Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}
