//! Access policy evaluation for short-URL records.
//!
//! [`evaluate`] is a pure function: it takes an owned copy of a stored record
//! and the current time, and returns either the mutated record to persist or
//! the reason the access was refused. All store I/O belongs to the caller.
//!
//! # Rules
//!
//! 1. **Total cap**: when `max_access` is set and `current_access_count > max_access`,
//!    the access is refused and the record should be evicted. The comparison is
//!    strict and runs before the increment, so a cap of `n` admits `n + 1` accesses.
//! 2. **Hourly cap**: when `max_per_hour` is set, the window rolls over lazily once an
//!    hour has passed since `last_hourly_reset_at`. If the window is already full the
//!    access is refused; the record is left untouched and is not re-written.
//! 3. Otherwise both counters advance and `last_accessed_at` becomes `now`.

use chrono::{DateTime, Duration, Utc};
use std::fmt;

use crate::domain::entities::{Limit, UrlRecord};

/// Why an access was refused.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Rejection {
    MaxAccessReached,
    MaxPerHourReached,
}

impl Rejection {
    /// Whether the record must be deleted from the store.
    pub fn evicts_record(self) -> bool {
        matches!(self, Self::MaxAccessReached)
    }

    pub fn message(self) -> &'static str {
        match self {
            Self::MaxAccessReached => "Max access reached",
            Self::MaxPerHourReached => "Max access per hour reached",
        }
    }

    /// Short label for logs and metrics.
    pub fn as_label(self) -> &'static str {
        match self {
            Self::MaxAccessReached => "max_access",
            Self::MaxPerHourReached => "max_per_hour",
        }
    }
}

impl fmt::Display for Rejection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.message())
    }
}

/// Result of evaluating one access attempt.
#[derive(Debug, Clone, PartialEq)]
pub enum Decision {
    /// Access granted; the record carries the updated counters to persist.
    Allowed(UrlRecord),
    Rejected(Rejection),
}

/// Length of the hourly access window.
pub fn hourly_window() -> Duration {
    Duration::hours(1)
}

/// Decides whether `record` may be accessed at `now`.
pub fn evaluate(mut record: UrlRecord, now: DateTime<Utc>) -> Decision {
    if let Limit::AtMost(max) = record.max_access
        && record.current_access_count > max
    {
        return Decision::Rejected(Rejection::MaxAccessReached);
    }

    if let Limit::AtMost(max_per_hour) = record.max_per_hour {
        if now.signed_duration_since(record.last_hourly_reset_at) >= hourly_window() {
            record.hourly_access_count = 0;
            record.last_hourly_reset_at = now;
        }

        if record.hourly_access_count >= max_per_hour {
            return Decision::Rejected(Rejection::MaxPerHourReached);
        }
        record.hourly_access_count += 1;
    }

    record.current_access_count += 1;
    record.last_accessed_at = now;

    Decision::Allowed(record)
}
