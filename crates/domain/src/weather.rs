//! Weather report values and the condition-code → phrase mapping.

use serde::{Deserialize, Serialize};

/// Current conditions as returned by the weather provider.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct WeatherReport {
    /// Air temperature in degrees Celsius.
    pub temperature: f64,
    /// Wind speed in km/h.
    pub wind_speed: f64,
    /// WMO weather interpretation code.
    pub condition_code: i32,
}

/// Map a condition code to a short human-readable phrase.
///
/// The mapping is total: unknown codes fall back to a generic fine-weather
/// phrase rather than failing.
#[must_use]
pub fn condition_phrase(code: i32) -> &'static str {
    match code {
        0 => "clear skies",
        1..=3 => "cloudy",
        45 | 48 => "foggy",
        51 | 53 | 55 => "drizzle",
        61 | 63 | 65 => "light rain",
        71 | 73 | 75 => "light snow",
        95 => "thunderstorms",
        _ => "fine weather",
    }
}
