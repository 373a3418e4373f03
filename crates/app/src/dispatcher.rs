//! Trigger dispatcher — the handler invoked when a host timer fires.
//!
//! On each firing it acknowledges the user, enqueues the broadcast work item,
//! and — unconditionally, even when the enqueue fails — reschedules the
//! trigger for the next day, so a single missed broadcast never cascades into
//! a permanently dead trigger.

use weatherbell_domain::id::TriggerId;
use weatherbell_domain::trigger::Trigger;

use crate::ports::{
    BroadcastRequest, EnqueueError, FiringPayload, Notifier, Priority, TimerHost, TriggerStore,
    WorkQueue,
};
use crate::scheduler::AlarmScheduler;

/// Work-item key for a trigger's broadcast.
///
/// Keys are per trigger, so simultaneously-firing triggers run independently
/// while a re-fire of the same trigger supersedes its own pending broadcast.
#[must_use]
pub fn broadcast_key(trigger_id: TriggerId) -> String {
    format!("broadcast-{trigger_id}")
}

/// Reacts to fired timers: enqueue the broadcast, then reschedule.
pub struct TriggerDispatcher<S, T, Q, N> {
    store: S,
    scheduler: AlarmScheduler<T>,
    queue: Q,
    notifier: N,
}

impl<S, T, Q, N> TriggerDispatcher<S, T, Q, N>
where
    S: TriggerStore,
    T: TimerHost,
    Q: WorkQueue,
    N: Notifier,
{
    /// Create a dispatcher over the given collaborators.
    pub fn new(store: S, scheduler: AlarmScheduler<T>, queue: Q, notifier: N) -> Self {
        Self {
            store,
            scheduler,
            queue,
            notifier,
        }
    }

    /// Handle one firing event.
    ///
    /// All failures are local to this firing: enqueue errors fall back from
    /// expedited to ordinary priority and are otherwise only logged; the
    /// reschedule step always runs.
    #[tracing::instrument(skip(self, payload), fields(trigger_id = %payload.trigger_id, city = %payload.city.name))]
    pub async fn handle_firing(&self, payload: FiringPayload) {
        self.notifier.announce_fired(&payload.city.name).await;

        self.enqueue_broadcast(&payload).await;
        self.reschedule(&payload).await;
    }

    /// Enqueue the broadcast work item, expedited where quota allows.
    async fn enqueue_broadcast(&self, payload: &FiringPayload) {
        let key = broadcast_key(payload.trigger_id);
        let request = BroadcastRequest {
            city: Some(payload.city.clone()),
        };

        match self
            .queue
            .enqueue(&key, request.clone(), Priority::Expedited)
            .await
        {
            Ok(()) => {}
            Err(EnqueueError::QuotaExhausted) => {
                tracing::debug!(key, "expedited quota exhausted, enqueuing ordinary");
                if let Err(err) = self.queue.enqueue(&key, request, Priority::Ordinary).await {
                    tracing::error!(key, error = %err, "failed to enqueue broadcast");
                }
            }
            Err(err) => {
                tracing::error!(key, error = %err, "failed to enqueue broadcast");
            }
        }
    }

    /// Re-resolve the trigger from the store and register its next occurrence.
    ///
    /// The firing payload may be stale relative to the store, so the lookup
    /// is two-stage: exact id match first, then a structural (hour, minute)
    /// match. A trigger deleted meanwhile simply ends the daily chain.
    async fn reschedule(&self, payload: &FiringPayload) {
        let triggers = self.store.load().await;
        let found = Self::resolve(&triggers, payload);

        match found {
            Some(trigger) => {
                if let Err(err) = self.scheduler.schedule(trigger).await {
                    tracing::error!(trigger = %trigger, error = %err, "failed to reschedule");
                }
            }
            None => {
                tracing::debug!(trigger_id = %payload.trigger_id, "trigger no longer stored, not rescheduling");
            }
        }
    }

    fn resolve<'a>(triggers: &'a [Trigger], payload: &FiringPayload) -> Option<&'a Trigger> {
        triggers
            .iter()
            .find(|t| t.id == payload.trigger_id)
            .or_else(|| {
                triggers
                    .iter()
                    .find(|t| t.matches_time(payload.hour, payload.minute))
            })
    }
}
