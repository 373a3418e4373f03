//! Trigger lifecycle service — add, remove, list, recover.
//!
//! Mutations run under a single writer lock so the persisted set and the
//! registered timer set never diverge under concurrent calls. Removing a
//! trigger cancels its future firings only; an already-enqueued broadcast is
//! left to finish.

use tokio::sync::Mutex;

use weatherbell_domain::error::{NotFoundError, WeatherbellError};
use weatherbell_domain::id::TriggerId;
use weatherbell_domain::trigger::Trigger;

use crate::ports::{TimerHost, TriggerStore};
use crate::scheduler::AlarmScheduler;

/// Manages the persisted trigger set and its host timers.
pub struct TriggerService<S, T> {
    store: S,
    scheduler: AlarmScheduler<T>,
    writer: Mutex<()>,
}

impl<S, T> TriggerService<S, T>
where
    S: TriggerStore,
    T: TimerHost,
{
    /// Create a service over the given store and scheduler.
    pub fn new(store: S, scheduler: AlarmScheduler<T>) -> Self {
        Self {
            store,
            scheduler,
            writer: Mutex::new(()),
        }
    }

    /// Persist `trigger` and register its first timer.
    ///
    /// The trigger is saved before the timer is registered; a registration
    /// failure leaves the trigger stored, to be picked up by the next
    /// recovery pass.
    ///
    /// # Errors
    ///
    /// Returns [`WeatherbellError::Validation`] for an out-of-range trigger,
    /// or a storage/timer error from the collaborators.
    #[tracing::instrument(skip(self, trigger), fields(trigger = %trigger))]
    pub async fn add(&self, trigger: Trigger) -> Result<Trigger, WeatherbellError> {
        trigger.validate()?;
        let _writer = self.writer.lock().await;

        let mut triggers = self.store.load().await;
        triggers.push(trigger.clone());
        self.store.save_all(&triggers).await?;

        self.scheduler.schedule(&trigger).await?;
        tracing::info!("trigger added");
        Ok(trigger)
    }

    /// Remove the trigger with `id`, cancelling its timer.
    ///
    /// The remainder is persisted before the timer is cancelled; a failed
    /// save leaves both the trigger and its timer in place.
    ///
    /// # Errors
    ///
    /// Returns [`WeatherbellError::NotFound`] when no trigger has that id,
    /// or a storage/timer error from the collaborators.
    #[tracing::instrument(skip(self))]
    pub async fn remove(&self, id: TriggerId) -> Result<(), WeatherbellError> {
        let _writer = self.writer.lock().await;

        let mut triggers = self.store.load().await;
        let Some(index) = triggers.iter().position(|t| t.id == id) else {
            return Err(NotFoundError {
                entity: "Trigger",
                id: id.to_string(),
            }
            .into());
        };
        let removed = triggers.remove(index);

        self.store.save_all(&triggers).await?;
        self.scheduler.cancel(&removed).await?;
        tracing::info!(trigger = %removed, "trigger removed");
        Ok(())
    }

    /// All persisted triggers.
    pub async fn list(&self) -> Vec<Trigger> {
        self.store.load().await
    }

    /// Re-register timers for every persisted trigger.
    ///
    /// Called once when the process (re)starts.
    pub async fn recover(&self) {
        let triggers = self.store.load().await;
        tracing::info!(count = triggers.len(), "recovering triggers");
        self.scheduler.recover_all(&triggers).await;
    }
}
