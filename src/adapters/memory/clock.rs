//! Fixed clock for deterministic timestamps.

use chrono::{DateTime, Utc};

use crate::ports::clock::Clock;

/// Clock that always returns the same instant.
pub struct FixedClock(pub DateTime<Utc>);

impl FixedClock {
    /// Creates a fixed clock from an RFC 3339 timestamp.
    ///
    /// # Panics
    ///
    /// Panics if `timestamp` is not valid RFC 3339; intended for test and
    /// fixture construction.
    #[must_use]
    pub fn at(timestamp: &str) -> Self {
        Self(
            DateTime::parse_from_rfc3339(timestamp)
                .expect("valid RFC 3339 timestamp")
                .with_timezone(&Utc),
        )
    }
}

impl Clock for FixedClock {
    fn now(&self) -> DateTime<Utc> {
        self.0
    }
}
