//! Wall-clock timestamps carried by readings and envelopes.

use std::time::Duration;

use chrono::{DateTime, Utc};

/// UTC timestamp used for readings, envelopes and connection metadata.
pub type Timestamp = DateTime<Utc>;

/// Return the current UTC time.
#[must_use]
pub fn now() -> Timestamp {
    Utc::now()
}

/// Time elapsed between `earlier` and `later`, clamped at zero when the
/// wall clock went backwards.
#[must_use]
pub fn elapsed_between(earlier: Timestamp, later: Timestamp) -> Duration {
    (later - earlier).to_std().unwrap_or(Duration::ZERO)
}
