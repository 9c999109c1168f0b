//! Settable clock.

use std::sync::Mutex;

use chrono::{DateTime, Duration, Local, TimeZone, Utc};
use mockable::Clock;

/// Clock that only moves when told to.
#[derive(Debug)]
pub struct FixtureClock(Mutex<DateTime<Utc>>);

impl FixtureClock {
    /// Start at `now`.
    #[must_use]
    pub const fn new(now: DateTime<Utc>) -> Self {
        Self(Mutex::new(now))
    }

    /// Start at 2025-06-01T08:00:00Z.
    #[must_use]
    pub fn fixed() -> Self {
        let start = Utc
            .with_ymd_and_hms(2025, 6, 1, 8, 0, 0)
            .single()
            .unwrap_or_else(|| panic!("fixture timestamp is unambiguous"));
        Self::new(start)
    }

    /// Move the clock forward.
    pub fn advance(&self, delta: Duration) {
        *self.lock() += delta;
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, DateTime<Utc>> {
        match self.0.lock() {
            Ok(guard) => guard,
            Err(_) => panic!("fixture clock mutex poisoned"),
        }
    }
}

impl Clock for FixtureClock {
    fn local(&self) -> DateTime<Local> {
        self.utc().with_timezone(&Local)
    }

    fn utc(&self) -> DateTime<Utc> {
        *self.lock()
    }
}
