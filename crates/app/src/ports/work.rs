//! Work queue port — idempotent, keyed background execution requests.

use std::future::Future;

use serde::{Deserialize, Serialize};

use weatherbell_domain::city::City;

/// Payload of one broadcast work item.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BroadcastRequest {
    /// City to announce; `None` falls back to [`City::fallback`].
    pub city: Option<City>,
}

impl BroadcastRequest {
    /// The city this broadcast is for, applying the fixed fallback.
    #[must_use]
    pub fn city_or_fallback(&self) -> City {
        self.city.clone().unwrap_or_else(City::fallback)
    }
}

/// Requested execution priority.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Priority {
    /// Run ahead of ordinary work, subject to the host's expedite quota.
    Expedited,
    /// Normal background scheduling.
    Ordinary,
}

/// What one work execution reports back to the runner.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WorkOutcome {
    /// The execution completed; do not retry.
    Success,
    /// Transient failure; the runner owns backoff and retry policy.
    Retry,
}

/// Enqueue failures.
#[derive(Debug, PartialEq, Eq, thiserror::Error)]
pub enum EnqueueError {
    /// The expedite quota is exhausted; retry with [`Priority::Ordinary`].
    #[error("expedited quota exhausted")]
    QuotaExhausted,
    /// The runner is shutting down and accepts no new work.
    #[error("work queue closed")]
    Closed,
}

/// Runs keyed background work with last-write-wins semantics.
///
/// Invariant: enqueuing under a key that already has a pending or running
/// item **replaces** it — two instances of the same logical broadcast never
/// run concurrently.
pub trait WorkQueue {
    /// Enqueue (or replace) the work item under `key`.
    fn enqueue(
        &self,
        key: &str,
        request: BroadcastRequest,
        priority: Priority,
    ) -> impl Future<Output = Result<(), EnqueueError>> + Send;

    /// Cancel any pending or running work under `key`. No-op if absent.
    fn cancel_all(&self, key: &str) -> impl Future<Output = ()> + Send;
}

impl<T: WorkQueue + Send + Sync> WorkQueue for std::sync::Arc<T> {
    fn enqueue(
        &self,
        key: &str,
        request: BroadcastRequest,
        priority: Priority,
    ) -> impl Future<Output = Result<(), EnqueueError>> + Send {
        (**self).enqueue(key, request, priority)
    }

    fn cancel_all(&self, key: &str) -> impl Future<Output = ()> + Send {
        (**self).cancel_all(key)
    }
}
