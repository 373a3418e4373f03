//! City — a named coordinate a trigger is bound to.

use serde::{Deserialize, Serialize};

use crate::error::{ValidationError, WeatherbellError};

/// An immutable (name, latitude, longitude) value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct City {
    pub name: String,
    pub lat: f64,
    pub lon: f64,
}

impl City {
    /// Create a city after checking domain invariants.
    ///
    /// # Errors
    ///
    /// Returns [`WeatherbellError::Validation`] when the name is empty or the
    /// coordinates are outside `[-90, 90]` / `[-180, 180]`.
    pub fn new(name: impl Into<String>, lat: f64, lon: f64) -> Result<Self, WeatherbellError> {
        let city = Self {
            name: name.into(),
            lat,
            lon,
        };
        city.validate()?;
        Ok(city)
    }

    /// Check domain invariants.
    ///
    /// # Errors
    ///
    /// Returns [`WeatherbellError::Validation`] when invariants fail.
    pub fn validate(&self) -> Result<(), WeatherbellError> {
        if self.name.is_empty() {
            return Err(ValidationError::EmptyName.into());
        }
        if !(-90.0..=90.0).contains(&self.lat) || !(-180.0..=180.0).contains(&self.lon) {
            return Err(ValidationError::CoordinatesOutOfRange {
                lat: self.lat,
                lon: self.lon,
            }
            .into());
        }
        Ok(())
    }

    /// The city a broadcast falls back to when its payload carries none.
    #[must_use]
    pub fn fallback() -> Self {
        Self {
            name: "Beijing".to_string(),
            lat: 39.9042,
            lon: 116.4074,
        }
    }

    /// Built-in cities offered when creating a trigger.
    #[must_use]
    pub fn presets() -> Vec<Self> {
        [
            ("Beijing", 39.9042, 116.4074),
            ("Shanghai", 31.2304, 121.4737),
            ("Guangzhou", 23.1291, 113.2644),
            ("Shenzhen", 22.5431, 114.0579),
            ("Hangzhou", 30.2741, 120.1551),
            ("Chengdu", 30.5728, 104.0668),
            ("Nanjing", 32.0603, 118.7969),
            ("Wuhan", 30.5928, 114.3055),
        ]
        .into_iter()
        .map(|(name, lat, lon)| Self {
            name: name.to_string(),
            lat,
            lon,
        })
        .collect()
    }
}

impl std::fmt::Display for City {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.name)
    }
}
