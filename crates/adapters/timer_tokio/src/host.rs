//! Tokio task implementation of [`TimerHost`].

use std::collections::HashMap;
use std::sync::Mutex;

use chrono::{Timelike, Utc};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

use weatherbell_app::ports::{FiringPayload, TimerCapability, TimerHost};
use weatherbell_domain::error::WeatherbellError;
use weatherbell_domain::id::TriggerId;
use weatherbell_domain::time::Timestamp;

/// Timer host backed by one sleeping tokio task per registration.
///
/// Firings are delivered through the channel handed out at construction;
/// the consumer owns the receiving half, so firings outlive the caller that
/// registered them.
pub struct TokioTimerHost {
    capability: TimerCapability,
    firings: mpsc::Sender<FiringPayload>,
    tasks: Mutex<HashMap<TriggerId, JoinHandle<()>>>,
}

impl TokioTimerHost {
    /// Create a host and the receiving half of its firing channel.
    #[must_use]
    pub fn new(capability: TimerCapability) -> (Self, mpsc::Receiver<FiringPayload>) {
        let (tx, rx) = mpsc::channel(16);
        let host = Self {
            capability,
            firings: tx,
            tasks: Mutex::new(HashMap::new()),
        };
        (host, rx)
    }

    /// Number of registrations whose task is still pending.
    #[must_use]
    pub fn pending(&self) -> usize {
        self.tasks
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
            .values()
            .filter(|handle| !handle.is_finished())
            .count()
    }

    fn insert(&self, id: TriggerId, handle: JoinHandle<()>) {
        let mut tasks = self
            .tasks
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner);
        if let Some(previous) = tasks.insert(id, handle) {
            previous.abort();
        }
    }

    /// When only best-effort delivery is granted, coarsen the instant to the
    /// next whole minute. Firing late by under a minute is acceptable;
    /// firing early is not.
    fn effective_instant(&self, at: Timestamp) -> Timestamp {
        if self.capability == TimerCapability::ExactCapable {
            return at;
        }
        if at.second() == 0 && at.nanosecond() == 0 {
            return at;
        }
        let truncated = at
            .with_second(0)
            .and_then(|t| t.with_nanosecond(0))
            .unwrap_or(at);
        truncated + chrono::Duration::minutes(1)
    }
}

impl TimerHost for TokioTimerHost {
    fn capability(&self) -> TimerCapability {
        self.capability
    }

    async fn register(
        &self,
        id: TriggerId,
        at: Timestamp,
        payload: FiringPayload,
    ) -> Result<(), WeatherbellError> {
        let at = self.effective_instant(at);
        let delay = (at - Utc::now()).to_std().unwrap_or_default();
        let firings = self.firings.clone();

        let handle = tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            if firings.send(payload).await.is_err() {
                tracing::warn!(trigger_id = %id, "firing channel closed, dropping firing");
            }
        });
        self.insert(id, handle);
        Ok(())
    }

    async fn cancel(&self, id: TriggerId) -> Result<(), WeatherbellError> {
        let handle = self
            .tasks
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
            .remove(&id);
        if let Some(handle) = handle {
            handle.abort();
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;
    use tokio::time::timeout;
    use weatherbell_domain::city::City;
    use weatherbell_domain::trigger::Trigger;

    fn payload() -> FiringPayload {
        let trigger = Trigger::builder()
            .hour(8)
            .minute(0)
            .city(City::fallback())
            .build()
            .unwrap();
        FiringPayload::from_trigger(&trigger)
    }

    fn soon() -> Timestamp {
        Utc::now() + chrono::Duration::milliseconds(20)
    }

    #[tokio::test]
    async fn should_deliver_firing_when_due() {
        let (host, mut rx) = TokioTimerHost::new(TimerCapability::ExactCapable);
        let payload = payload();

        host.register(payload.trigger_id, soon(), payload.clone())
            .await
            .unwrap();

        let fired = timeout(Duration::from_secs(2), rx.recv())
            .await
            .unwrap()
            .unwrap();
        assert_eq!(fired, payload);
    }

    #[tokio::test]
    async fn should_fire_immediately_when_instant_already_past() {
        let (host, mut rx) = TokioTimerHost::new(TimerCapability::ExactCapable);
        let payload = payload();

        host.register(
            payload.trigger_id,
            Utc::now() - chrono::Duration::seconds(5),
            payload.clone(),
        )
        .await
        .unwrap();

        let fired = timeout(Duration::from_secs(2), rx.recv())
            .await
            .unwrap()
            .unwrap();
        assert_eq!(fired.trigger_id, payload.trigger_id);
    }

    #[tokio::test]
    async fn should_supersede_previous_registration_for_same_id() {
        let (host, mut rx) = TokioTimerHost::new(TimerCapability::ExactCapable);
        let payload = payload();

        host.register(
            payload.trigger_id,
            Utc::now() + chrono::Duration::milliseconds(50),
            payload.clone(),
        )
        .await
        .unwrap();
        host.register(payload.trigger_id, soon(), payload.clone())
            .await
            .unwrap();

        timeout(Duration::from_secs(2), rx.recv())
            .await
            .unwrap()
            .unwrap();
        // The replaced task was aborted; no second firing arrives.
        let second = timeout(Duration::from_millis(200), rx.recv()).await;
        assert!(second.is_err(), "expected single firing, got {second:?}");
    }

    #[tokio::test]
    async fn should_not_fire_after_cancel() {
        let (host, mut rx) = TokioTimerHost::new(TimerCapability::ExactCapable);
        let payload = payload();

        host.register(
            payload.trigger_id,
            Utc::now() + chrono::Duration::milliseconds(50),
            payload.clone(),
        )
        .await
        .unwrap();
        host.cancel(payload.trigger_id).await.unwrap();

        let fired = timeout(Duration::from_millis(200), rx.recv()).await;
        assert!(fired.is_err(), "expected no firing, got {fired:?}");
        assert_eq!(host.pending(), 0);
    }

    #[tokio::test]
    async fn should_treat_cancel_of_unknown_id_as_noop() {
        let (host, _rx) = TokioTimerHost::new(TimerCapability::ExactCapable);
        host.cancel(TriggerId::new()).await.unwrap();
    }

    #[test]
    fn should_coarsen_to_next_whole_minute_when_best_effort() {
        let (host, _rx) = TokioTimerHost::new(TimerCapability::BestEffortOnly);
        let at = chrono::DateTime::parse_from_rfc3339("2026-03-01T08:00:30Z")
            .unwrap()
            .to_utc();

        let effective = host.effective_instant(at);
        assert_eq!(
            effective,
            chrono::DateTime::parse_from_rfc3339("2026-03-01T08:01:00Z")
                .unwrap()
                .to_utc()
        );
    }

    #[test]
    fn should_keep_whole_minute_instants_unchanged_when_best_effort() {
        let (host, _rx) = TokioTimerHost::new(TimerCapability::BestEffortOnly);
        let at = chrono::DateTime::parse_from_rfc3339("2026-03-01T08:01:00Z")
            .unwrap()
            .to_utc();
        assert_eq!(host.effective_instant(at), at);
    }

    #[test]
    fn should_never_coarsen_when_exact_capable() {
        let (host, _rx) = TokioTimerHost::new(TimerCapability::ExactCapable);
        let at = chrono::DateTime::parse_from_rfc3339("2026-03-01T08:00:30Z")
            .unwrap()
            .to_utc();
        assert_eq!(host.effective_instant(at), at);
    }
}
