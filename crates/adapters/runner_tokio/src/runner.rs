//! Tokio task implementation of [`WorkQueue`].

use std::collections::HashMap;
use std::future::Future;
use std::panic::AssertUnwindSafe;
use std::pin::Pin;
use std::sync::atomic::{AtomicBool, AtomicU32, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use futures::FutureExt;
use tokio::task::JoinHandle;

use weatherbell_app::ports::{BroadcastRequest, EnqueueError, Priority, WorkOutcome, WorkQueue};
use weatherbell_app::speech_loop::{StopHandle, StopSignal, stop_pair};

type JobFuture = Pin<Box<dyn Future<Output = WorkOutcome> + Send>>;
type Job = dyn Fn(BroadcastRequest, StopSignal) -> JobFuture + Send + Sync;

/// Retry and quota policy for the runner.
#[derive(Debug, Clone, Copy)]
pub struct RunnerConfig {
    /// Total attempts per work item, first run included.
    pub max_attempts: u32,
    /// Fixed delay between a retryable outcome and the next attempt.
    pub backoff: Duration,
    /// Expedited slots available at any one time.
    pub max_expedited: u32,
}

impl Default for RunnerConfig {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            backoff: Duration::from_secs(30),
            max_expedited: 2,
        }
    }
}

struct JobEntry {
    stop: StopHandle,
    handle: JoinHandle<()>,
}

/// Keyed background work runner with last-write-wins replacement.
///
/// Each enqueued item runs as its own tokio task, retried with a fixed
/// backoff while the job reports a retryable outcome. An attempt that panics
/// counts as retryable. Expedited items hold one of a bounded number of
/// slots for their whole run. At most one body executes per key: a re-enqueue
/// waits for the superseded task to wind down before spawning its
/// replacement.
pub struct TokioWorkRunner {
    job: Arc<Job>,
    config: RunnerConfig,
    jobs: Mutex<HashMap<String, JobEntry>>,
    expedited_in_use: Arc<AtomicU32>,
    closed: AtomicBool,
}

impl TokioWorkRunner {
    /// Create a runner executing `job` for every work item.
    pub fn new<F, Fut>(config: RunnerConfig, job: F) -> Self
    where
        F: Fn(BroadcastRequest, StopSignal) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = WorkOutcome> + Send + 'static,
    {
        Self {
            job: Arc::new(move |request, stop| Box::pin(job(request, stop)) as JobFuture),
            config,
            jobs: Mutex::new(HashMap::new()),
            expedited_in_use: Arc::new(AtomicU32::new(0)),
            closed: AtomicBool::new(false),
        }
    }

    /// Raise the stop flag for the item under `key`, letting it finish its
    /// current step and exit. No-op for unknown or finished keys.
    pub fn stop(&self, key: &str) {
        let jobs = self.lock_jobs();
        if let Some(entry) = jobs.get(key) {
            tracing::info!(key, "stopping work item");
            entry.stop.stop();
        }
    }

    /// Raise the stop flag for every tracked item.
    pub fn stop_all(&self) {
        let jobs = self.lock_jobs();
        for (key, entry) in jobs.iter() {
            tracing::info!(key, "stopping work item");
            entry.stop.stop();
        }
    }

    /// Stop accepting work and signal every running item to stop.
    pub fn close(&self) {
        self.closed.store(true, Ordering::SeqCst);
        self.stop_all();
    }

    /// Number of items whose task has not finished yet.
    #[must_use]
    pub fn running(&self) -> usize {
        self.lock_jobs()
            .values()
            .filter(|entry| !entry.handle.is_finished())
            .count()
    }

    fn lock_jobs(&self) -> std::sync::MutexGuard<'_, HashMap<String, JobEntry>> {
        self.jobs
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
    }

    fn spawn_item(&self, key: &str, request: BroadcastRequest, expedited: bool) -> JobEntry {
        let (stop_handle, stop_signal) = stop_pair();
        let job = Arc::clone(&self.job);
        let config = self.config;
        let slot = expedited.then(|| ExpeditedSlot::taken(&self.expedited_in_use));
        let key_owned = key.to_string();

        let handle = tokio::spawn(async move {
            let _slot = slot;
            run_with_retries(&key_owned, &job, request, stop_signal, config).await;
        });

        JobEntry {
            stop: stop_handle,
            handle,
        }
    }
}

/// Drives one work item through its attempts.
async fn run_with_retries(
    key: &str,
    job: &Arc<Job>,
    request: BroadcastRequest,
    stop: StopSignal,
    config: RunnerConfig,
) {
    for attempt in 1..=config.max_attempts {
        // The attempt runs inline so aborting this task drops the body too;
        // a panic is caught and treated like any other retryable failure.
        let run = AssertUnwindSafe((job)(request.clone(), stop.clone())).catch_unwind();
        let outcome = match run.await {
            Ok(outcome) => outcome,
            Err(_panic) => {
                tracing::error!(key, attempt, "work attempt panicked");
                WorkOutcome::Retry
            }
        };

        match outcome {
            WorkOutcome::Success => {
                tracing::debug!(key, attempt, "work item completed");
                return;
            }
            WorkOutcome::Retry if attempt < config.max_attempts && !stop.is_stopped() => {
                tracing::warn!(key, attempt, "work attempt failed, backing off");
                tokio::time::sleep(config.backoff).await;
            }
            WorkOutcome::Retry => {
                tracing::error!(key, attempt, "work item exhausted its attempts");
                return;
            }
        }
    }
}

/// Expedited slot reservation; released on drop.
struct ExpeditedSlot {
    in_use: Arc<AtomicU32>,
}

impl ExpeditedSlot {
    fn taken(in_use: &Arc<AtomicU32>) -> Self {
        Self {
            in_use: Arc::clone(in_use),
        }
    }
}

impl Drop for ExpeditedSlot {
    fn drop(&mut self) {
        self.in_use.fetch_sub(1, Ordering::SeqCst);
    }
}

impl WorkQueue for TokioWorkRunner {
    async fn enqueue(
        &self,
        key: &str,
        request: BroadcastRequest,
        priority: Priority,
    ) -> Result<(), EnqueueError> {
        if self.closed.load(Ordering::SeqCst) {
            return Err(EnqueueError::Closed);
        }

        let expedited = priority == Priority::Expedited;
        if expedited {
            let claimed = self
                .expedited_in_use
                .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |used| {
                    (used < self.config.max_expedited).then_some(used + 1)
                });
            if claimed.is_err() {
                return Err(EnqueueError::QuotaExhausted);
            }
        }

        let previous = self.lock_jobs().remove(key);
        if let Some(previous) = previous {
            tracing::debug!(key, "replacing previous work item");
            previous.stop.stop();
            previous.handle.abort();
            // Wait for the old body to be dropped so the key never has two
            // executions alive at once.
            let _ = previous.handle.await;
        }
        let entry = self.spawn_item(key, request, expedited);
        if let Some(raced) = self.lock_jobs().insert(key.to_string(), entry) {
            // A concurrent enqueue slotted in while the old task drained.
            raced.stop.stop();
            raced.handle.abort();
        }
        Ok(())
    }

    async fn cancel_all(&self, key: &str) {
        let entry = self.lock_jobs().remove(key);
        if let Some(entry) = entry {
            tracing::info!(key, "cancelling work item");
            entry.stop.stop();
            entry.handle.abort();
            let _ = entry.handle.await;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::AtomicU32 as TestCounter;
    use tokio::time::timeout;

    fn config() -> RunnerConfig {
        RunnerConfig {
            max_attempts: 3,
            backoff: Duration::from_millis(5),
            max_expedited: 1,
        }
    }

    async fn wait_until_idle(runner: &TokioWorkRunner) {
        timeout(Duration::from_secs(2), async {
            while runner.running() > 0 {
                tokio::time::sleep(Duration::from_millis(5)).await;
            }
        })
        .await
        .unwrap();
    }

    #[tokio::test]
    async fn should_run_enqueued_item_once_on_success() {
        let calls = Arc::new(TestCounter::new(0));
        let seen = Arc::clone(&calls);
        let runner = TokioWorkRunner::new(config(), move |_request, _stop| {
            let seen = Arc::clone(&seen);
            async move {
                seen.fetch_add(1, Ordering::SeqCst);
                WorkOutcome::Success
            }
        });

        runner
            .enqueue("broadcast-a", BroadcastRequest::default(), Priority::Ordinary)
            .await
            .unwrap();
        wait_until_idle(&runner).await;

        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn should_retry_with_backoff_until_success() {
        let calls = Arc::new(TestCounter::new(0));
        let seen = Arc::clone(&calls);
        let runner = TokioWorkRunner::new(config(), move |_request, _stop| {
            let seen = Arc::clone(&seen);
            async move {
                if seen.fetch_add(1, Ordering::SeqCst) < 1 {
                    WorkOutcome::Retry
                } else {
                    WorkOutcome::Success
                }
            }
        });

        runner
            .enqueue("broadcast-a", BroadcastRequest::default(), Priority::Ordinary)
            .await
            .unwrap();
        wait_until_idle(&runner).await;

        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn should_give_up_after_max_attempts() {
        let calls = Arc::new(TestCounter::new(0));
        let seen = Arc::clone(&calls);
        let runner = TokioWorkRunner::new(config(), move |_request, _stop| {
            let seen = Arc::clone(&seen);
            async move {
                seen.fetch_add(1, Ordering::SeqCst);
                WorkOutcome::Retry
            }
        });

        runner
            .enqueue("broadcast-a", BroadcastRequest::default(), Priority::Ordinary)
            .await
            .unwrap();
        wait_until_idle(&runner).await;

        assert_eq!(calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn should_treat_panicked_attempt_as_retryable() {
        let calls = Arc::new(TestCounter::new(0));
        let seen = Arc::clone(&calls);
        let runner = TokioWorkRunner::new(config(), move |_request, _stop| {
            let seen = Arc::clone(&seen);
            async move {
                if seen.fetch_add(1, Ordering::SeqCst) == 0 {
                    panic!("boom");
                }
                WorkOutcome::Success
            }
        });

        runner
            .enqueue("broadcast-a", BroadcastRequest::default(), Priority::Ordinary)
            .await
            .unwrap();
        wait_until_idle(&runner).await;

        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn should_reject_expedited_beyond_quota_and_accept_ordinary() {
        let runner = TokioWorkRunner::new(config(), |_request, stop: StopSignal| async move {
            while !stop.is_stopped() {
                tokio::time::sleep(Duration::from_millis(5)).await;
            }
            WorkOutcome::Success
        });

        runner
            .enqueue("broadcast-a", BroadcastRequest::default(), Priority::Expedited)
            .await
            .unwrap();
        let rejected = runner
            .enqueue("broadcast-b", BroadcastRequest::default(), Priority::Expedited)
            .await;
        assert_eq!(rejected, Err(EnqueueError::QuotaExhausted));

        runner
            .enqueue("broadcast-b", BroadcastRequest::default(), Priority::Ordinary)
            .await
            .unwrap();

        runner.stop_all();
        wait_until_idle(&runner).await;
    }

    #[tokio::test]
    async fn should_release_expedited_slot_when_item_finishes() {
        let runner =
            TokioWorkRunner::new(config(), |_request, _stop| async { WorkOutcome::Success });

        runner
            .enqueue("broadcast-a", BroadcastRequest::default(), Priority::Expedited)
            .await
            .unwrap();
        wait_until_idle(&runner).await;

        runner
            .enqueue("broadcast-b", BroadcastRequest::default(), Priority::Expedited)
            .await
            .unwrap();
        wait_until_idle(&runner).await;
    }

    #[tokio::test]
    async fn should_replace_running_item_under_same_key() {
        let calls = Arc::new(TestCounter::new(0));
        let seen = Arc::clone(&calls);
        let runner = TokioWorkRunner::new(config(), move |_request, stop: StopSignal| {
            let seen = Arc::clone(&seen);
            async move {
                seen.fetch_add(1, Ordering::SeqCst);
                while !stop.is_stopped() {
                    tokio::time::sleep(Duration::from_millis(5)).await;
                }
                WorkOutcome::Success
            }
        });

        runner
            .enqueue("broadcast-a", BroadcastRequest::default(), Priority::Ordinary)
            .await
            .unwrap();
        runner
            .enqueue("broadcast-a", BroadcastRequest::default(), Priority::Ordinary)
            .await
            .unwrap();

        // Only the replacement is tracked.
        assert_eq!(runner.running(), 1);
        runner.stop("broadcast-a");
        wait_until_idle(&runner).await;
    }

    #[tokio::test]
    async fn should_never_overlap_executions_of_the_same_key() {
        struct ActiveGuard {
            active: Arc<TestCounter>,
        }

        impl ActiveGuard {
            fn enter(active: &Arc<TestCounter>, peak: &TestCounter) -> Self {
                let now = active.fetch_add(1, Ordering::SeqCst) + 1;
                peak.fetch_max(now, Ordering::SeqCst);
                Self {
                    active: Arc::clone(active),
                }
            }
        }

        impl Drop for ActiveGuard {
            fn drop(&mut self) {
                self.active.fetch_sub(1, Ordering::SeqCst);
            }
        }

        let active = Arc::new(TestCounter::new(0));
        let peak = Arc::new(TestCounter::new(0));
        let entries = Arc::new(TestCounter::new(0));

        let runner = {
            let active = Arc::clone(&active);
            let peak = Arc::clone(&peak);
            let entries = Arc::clone(&entries);
            TokioWorkRunner::new(config(), move |_request, stop: StopSignal| {
                let active = Arc::clone(&active);
                let peak = Arc::clone(&peak);
                let entries = Arc::clone(&entries);
                async move {
                    entries.fetch_add(1, Ordering::SeqCst);
                    let _running = ActiveGuard::enter(&active, &peak);
                    while !stop.is_stopped() {
                        tokio::time::sleep(Duration::from_millis(5)).await;
                    }
                    WorkOutcome::Success
                }
            })
        };

        runner
            .enqueue("broadcast-a", BroadcastRequest::default(), Priority::Ordinary)
            .await
            .unwrap();
        // Let the first body reach its loop before replacing it.
        tokio::time::sleep(Duration::from_millis(20)).await;
        runner
            .enqueue("broadcast-a", BroadcastRequest::default(), Priority::Ordinary)
            .await
            .unwrap();

        runner.stop("broadcast-a");
        wait_until_idle(&runner).await;

        assert_eq!(entries.load(Ordering::SeqCst), 2);
        assert_eq!(peak.load(Ordering::SeqCst), 1, "bodies overlapped");
        assert_eq!(active.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn should_stop_running_item_gracefully() {
        let runner = TokioWorkRunner::new(config(), |_request, stop: StopSignal| async move {
            while !stop.is_stopped() {
                tokio::time::sleep(Duration::from_millis(5)).await;
            }
            WorkOutcome::Success
        });

        runner
            .enqueue("broadcast-a", BroadcastRequest::default(), Priority::Ordinary)
            .await
            .unwrap();
        assert_eq!(runner.running(), 1);

        runner.stop("broadcast-a");
        wait_until_idle(&runner).await;
    }

    #[tokio::test]
    async fn should_refuse_work_after_close() {
        let runner =
            TokioWorkRunner::new(config(), |_request, _stop| async { WorkOutcome::Success });
        runner.close();

        let result = runner
            .enqueue("broadcast-a", BroadcastRequest::default(), Priority::Ordinary)
            .await;
        assert_eq!(result, Err(EnqueueError::Closed));
    }

    #[tokio::test]
    async fn should_cancel_item_under_key() {
        let calls = Arc::new(TestCounter::new(0));
        let seen = Arc::clone(&calls);
        let runner = TokioWorkRunner::new(config(), move |_request, stop: StopSignal| {
            let seen = Arc::clone(&seen);
            async move {
                while !stop.is_stopped() {
                    tokio::time::sleep(Duration::from_millis(5)).await;
                }
                seen.fetch_add(1, Ordering::SeqCst);
                WorkOutcome::Success
            }
        });

        runner
            .enqueue("broadcast-a", BroadcastRequest::default(), Priority::Ordinary)
            .await
            .unwrap();
        runner.cancel_all("broadcast-a").await;

        assert_eq!(runner.running(), 0);
    }
}
