//! Trigger — a persisted (time-of-day, city) pair the user wants announced daily.

use serde::{Deserialize, Serialize};

use crate::city::City;
use crate::error::{ValidationError, WeatherbellError};
use crate::id::TriggerId;

/// A daily recurring announcement request.
///
/// Identity (`id`) is stable for the trigger's lifetime; the time and city
/// are never mutated — the UI deletes and re-adds instead.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Trigger {
    pub id: TriggerId,
    pub hour: u32,
    pub minute: u32,
    pub city: City,
}

impl Trigger {
    /// Create a builder for constructing a [`Trigger`].
    #[must_use]
    pub fn builder() -> TriggerBuilder {
        TriggerBuilder::default()
    }

    /// Check domain invariants.
    ///
    /// # Errors
    ///
    /// Returns [`WeatherbellError::Validation`] when:
    /// - `hour` is not in `0..=23` ([`ValidationError::HourOutOfRange`])
    /// - `minute` is not in `0..=59` ([`ValidationError::MinuteOutOfRange`])
    /// - the city fails its own validation
    pub fn validate(&self) -> Result<(), WeatherbellError> {
        if self.hour > 23 {
            return Err(ValidationError::HourOutOfRange(self.hour).into());
        }
        if self.minute > 59 {
            return Err(ValidationError::MinuteOutOfRange(self.minute).into());
        }
        self.city.validate()
    }

    /// Whether this trigger fires at the given wall-clock time of day.
    ///
    /// Used as the structural fallback when re-resolving a trigger from a
    /// firing payload whose id has gone stale.
    #[must_use]
    pub fn matches_time(&self, hour: u32, minute: u32) -> bool {
        self.hour == hour && self.minute == minute
    }
}

impl std::fmt::Display for Trigger {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:02}:{:02} {}", self.hour, self.minute, self.city)
    }
}

/// Step-by-step builder for [`Trigger`].
#[derive(Debug, Default)]
pub struct TriggerBuilder {
    id: Option<TriggerId>,
    hour: Option<u32>,
    minute: Option<u32>,
    city: Option<City>,
}

impl TriggerBuilder {
    #[must_use]
    pub fn id(mut self, id: TriggerId) -> Self {
        self.id = Some(id);
        self
    }

    #[must_use]
    pub fn hour(mut self, hour: u32) -> Self {
        self.hour = Some(hour);
        self
    }

    #[must_use]
    pub fn minute(mut self, minute: u32) -> Self {
        self.minute = Some(minute);
        self
    }

    #[must_use]
    pub fn city(mut self, city: City) -> Self {
        self.city = Some(city);
        self
    }

    /// Consume the builder, validate, and return a [`Trigger`].
    ///
    /// # Errors
    ///
    /// Returns [`WeatherbellError::Validation`] if any field is out of range.
    pub fn build(self) -> Result<Trigger, WeatherbellError> {
        let trigger = Trigger {
            id: self.id.unwrap_or_default(),
            hour: self.hour.unwrap_or(8),
            minute: self.minute.unwrap_or(0),
            city: self.city.unwrap_or_else(City::fallback),
        };
        trigger.validate()?;
        Ok(trigger)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn valid_trigger() -> Trigger {
        Trigger::builder()
            .hour(8)
            .minute(30)
            .city(City::fallback())
            .build()
            .unwrap()
    }

    #[test]
    fn should_build_valid_trigger_when_fields_in_range() {
        let trigger = valid_trigger();
        assert_eq!(trigger.hour, 8);
        assert_eq!(trigger.minute, 30);
        assert_eq!(trigger.city.name, "Beijing");
    }

    #[test]
    fn should_default_to_eight_oclock_fallback_city() {
        let trigger = Trigger::builder().build().unwrap();
        assert_eq!(trigger.hour, 8);
        assert_eq!(trigger.minute, 0);
        assert_eq!(trigger.city, City::fallback());
    }

    #[test]
    fn should_return_validation_error_when_hour_out_of_range() {
        let result = Trigger::builder().hour(24).build();
        assert!(matches!(
            result,
            Err(WeatherbellError::Validation(
                ValidationError::HourOutOfRange(24)
            ))
        ));
    }

    #[test]
    fn should_return_validation_error_when_minute_out_of_range() {
        let result = Trigger::builder().minute(60).build();
        assert!(matches!(
            result,
            Err(WeatherbellError::Validation(
                ValidationError::MinuteOutOfRange(60)
            ))
        ));
    }

    #[test]
    fn should_set_custom_id_via_builder() {
        let id = TriggerId::new();
        let trigger = Trigger::builder().id(id).build().unwrap();
        assert_eq!(trigger.id, id);
    }

    #[test]
    fn should_match_time_only_on_exact_hour_and_minute() {
        let trigger = valid_trigger();
        assert!(trigger.matches_time(8, 30));
        assert!(!trigger.matches_time(8, 31));
        assert!(!trigger.matches_time(9, 30));
    }

    #[test]
    fn should_display_as_padded_time_and_city() {
        let trigger = Trigger::builder()
            .hour(7)
            .minute(5)
            .city(City::fallback())
            .build()
            .unwrap();
        assert_eq!(trigger.to_string(), "07:05 Beijing");
    }

    #[test]
    fn should_roundtrip_through_serde_json() {
        let trigger = valid_trigger();
        let json = serde_json::to_string(&trigger).unwrap();
        let parsed: Trigger = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, trigger);
    }
}
