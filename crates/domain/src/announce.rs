//! Announcement composition — greeting bands plus the spoken message.

use crate::weather::{WeatherReport, condition_phrase};

/// Time-of-day greeting for a local hour.
///
/// Bands over the 24-hour clock: 5–10 morning, 11–13 noon, 14–18 afternoon,
/// 19–23 evening, anything else late night.
#[must_use]
pub fn greeting(hour: u32) -> &'static str {
    match hour {
        5..=10 => "Good morning",
        11..=13 => "Good noon",
        14..=18 => "Good afternoon",
        19..=23 => "Good evening",
        _ => "It's late at night",
    }
}

/// Compose the announcement that the speech loop repeats.
#[must_use]
pub fn compose(city_name: &str, report: &WeatherReport, local_hour: u32) -> String {
    format!(
        "{}. In {} today, {} with a temperature of {:.1} degrees. Have a pleasant day.",
        greeting(local_hour),
        city_name,
        condition_phrase(report.condition_code),
        report.temperature,
    )
}
