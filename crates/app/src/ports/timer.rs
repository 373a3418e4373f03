//! Timer host port — the OS-level single-shot timer facility.

use std::future::Future;

use serde::{Deserialize, Serialize};

use weatherbell_domain::city::City;
use weatherbell_domain::error::WeatherbellError;
use weatherbell_domain::id::TriggerId;
use weatherbell_domain::time::Timestamp;
use weatherbell_domain::trigger::Trigger;

/// Delivery precision the host grants.
///
/// The scheduling algorithm is identical either way; only the registration's
/// guarantees differ. A host that denies exact wake-capable delivery still
/// fires, just less precisely.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimerCapability {
    /// Exact, wake-capable delivery at the requested instant.
    ExactCapable,
    /// Inexact delivery; the host may coarsen the wake.
    BestEffortOnly,
}

/// Denormalized trigger fields carried with a registration and delivered
/// back at fire time.
///
/// The firing handler must not assume the trigger still exists in the store —
/// these fields allow a defensive two-stage re-resolution.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FiringPayload {
    pub trigger_id: TriggerId,
    pub hour: u32,
    pub minute: u32,
    pub city: City,
}

impl FiringPayload {
    /// Snapshot the fields of a trigger for delivery at fire time.
    #[must_use]
    pub fn from_trigger(trigger: &Trigger) -> Self {
        Self {
            trigger_id: trigger.id,
            hour: trigger.hour,
            minute: trigger.minute,
            city: trigger.city.clone(),
        }
    }
}

/// Registers and cancels single-shot timers keyed by trigger identity.
///
/// Invariant: **at most one live timer per trigger id**. Registering again
/// under the same id supersedes the prior timer (update semantics, never a
/// duplicate). Firing events are delivered on the host's own channel,
/// independent of the registering caller's lifetime.
pub trait TimerHost {
    /// The delivery precision this host provides.
    fn capability(&self) -> TimerCapability;

    /// Register (or replace) the timer for `id`, firing `payload` at `at`.
    fn register(
        &self,
        id: TriggerId,
        at: Timestamp,
        payload: FiringPayload,
    ) -> impl Future<Output = Result<(), WeatherbellError>> + Send;

    /// Remove the timer for `id`. No-op if absent.
    fn cancel(&self, id: TriggerId) -> impl Future<Output = Result<(), WeatherbellError>> + Send;
}

impl<T: TimerHost + Send + Sync> TimerHost for std::sync::Arc<T> {
    fn capability(&self) -> TimerCapability {
        (**self).capability()
    }

    fn register(
        &self,
        id: TriggerId,
        at: Timestamp,
        payload: FiringPayload,
    ) -> impl Future<Output = Result<(), WeatherbellError>> + Send {
        (**self).register(id, at, payload)
    }

    fn cancel(&self, id: TriggerId) -> impl Future<Output = Result<(), WeatherbellError>> + Send {
        (**self).cancel(id)
    }
}
