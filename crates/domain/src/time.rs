//! Time and timestamp helpers, including the daily rollover rule.

use chrono::{DateTime, Days, TimeDelta, TimeZone, Utc};

/// UTC timestamp used for scheduling instants and event times.
pub type Timestamp = DateTime<Utc>;

/// Return the current UTC time.
#[must_use]
pub fn now() -> Timestamp {
    Utc::now()
}

/// Compute the next instant at or after `now` whose *local* wall clock in
/// `now`'s timezone reads exactly `hour:minute:00`.
///
/// If that time of day has already passed (or is exactly `now`), the
/// occurrence is tomorrow's — a **calendar-day** add, not a fixed 86400-second
/// add, so a DST transition shifts the elapsed real time but never the local
/// trigger point.
///
/// Returns `None` when `hour`/`minute` are out of range.
#[must_use]
pub fn next_occurrence<Tz: TimeZone>(
    hour: u32,
    minute: u32,
    now: &DateTime<Tz>,
) -> Option<DateTime<Tz>> {
    let mut candidate = now.date_naive().and_hms_opt(hour, minute, 0)?;
    if candidate <= now.naive_local() {
        candidate = candidate.checked_add_days(Days::new(1))?;
    }

    let tz = now.timezone();
    // A DST spring-forward gap can make the local time nonexistent; step
    // forward until it resolves (at most two steps for real-world zones).
    for _ in 0..4 {
        if let Some(resolved) = tz.from_local_datetime(&candidate).earliest() {
            return Some(resolved);
        }
        candidate += TimeDelta::minutes(30);
    }
    None
}
