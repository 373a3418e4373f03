//! Alarm scheduler — next-occurrence computation and timer registration.

use chrono::{Local, Utc};

use weatherbell_domain::error::WeatherbellError;
use weatherbell_domain::time::next_occurrence;
use weatherbell_domain::trigger::Trigger;

use crate::ports::{FiringPayload, TimerCapability, TimerHost};

/// Registers, cancels, and recovers host timers for triggers.
pub struct AlarmScheduler<T> {
    host: T,
}

impl<T: TimerHost> AlarmScheduler<T> {
    /// Create a scheduler backed by the given timer host.
    pub fn new(host: T) -> Self {
        Self { host }
    }

    /// Register (or replace) the timer for `trigger`'s next occurrence.
    ///
    /// The instant is today's `hour:minute` in local wall-clock time, or
    /// tomorrow's when that has already passed. When the host only grants
    /// best-effort delivery the registration still proceeds — degraded
    /// precision, never a silent no-op.
    ///
    /// # Errors
    ///
    /// Returns [`WeatherbellError::Validation`] for an out-of-range trigger,
    /// or a timer error from the host.
    #[tracing::instrument(skip(self, trigger), fields(trigger = %trigger))]
    pub async fn schedule(&self, trigger: &Trigger) -> Result<(), WeatherbellError> {
        trigger.validate()?;
        let at_local = next_occurrence(trigger.hour, trigger.minute, &Local::now())
            .ok_or_else(|| WeatherbellError::Timer("next occurrence unrepresentable".into()))?;

        if self.host.capability() == TimerCapability::BestEffortOnly {
            tracing::warn!("exact timers unavailable, scheduling best-effort");
        }

        let at = at_local.with_timezone(&Utc);
        tracing::info!(%at, "registering timer");
        self.host
            .register(trigger.id, at, FiringPayload::from_trigger(trigger))
            .await
    }

    /// Remove the timer for `trigger`. No-op if none is registered.
    ///
    /// # Errors
    ///
    /// Returns a timer error from the host.
    #[tracing::instrument(skip(self, trigger), fields(trigger = %trigger))]
    pub async fn cancel(&self, trigger: &Trigger) -> Result<(), WeatherbellError> {
        self.host.cancel(trigger.id).await
    }

    /// Re-register timers for every persisted trigger.
    ///
    /// Called once at process start (the boot signal). Registration uses
    /// update semantics, so calling this again — e.g. on a redundant boot
    /// signal — leaves the same timer set. Individual failures are logged
    /// and do not block the remaining triggers.
    #[tracing::instrument(skip(self, triggers), fields(count = triggers.len()))]
    pub async fn recover_all(&self, triggers: &[Trigger]) {
        for trigger in triggers {
            if let Err(err) = self.schedule(trigger).await {
                tracing::error!(trigger = %trigger, error = %err, "failed to recover timer");
            }
        }
    }
}
