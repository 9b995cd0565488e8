//! Expiration policy.
//!
//! Maps the fixed set of selectors offered by the paste form to
//! durations. "never" is encoded as a 100-year duration rather than a
//! distinct no-expiration state, so every deadline comparison takes
//! the same path.

use chrono::{DateTime, Duration, Utc};

/// Resolve a selector to its duration.
///
/// Unrecognized selectors silently fall back to the "never" duration.
pub fn expiration_duration(selector: &str) -> Duration {
    match selector {
        "10m" => Duration::minutes(10),
        "1h" => Duration::hours(1),
        "1d" => Duration::days(1),
        "1w" => Duration::weeks(1),
        // "never" and anything unrecognized: effectively permanent.
        _ => Duration::days(100 * 365),
    }
}

/// Absolute deadline for a snippet created now with the given selector.
pub fn resolve_expiration(selector: &str) -> DateTime<Utc> {
    Utc::now() + expiration_duration(selector)
}
