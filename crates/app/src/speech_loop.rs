//! Speech loop — repeats one announcement until stopped or failed.
//!
//! State machine: `Idle → Speaking → {Idle (repeat), Stopped, Failed}`. The
//! stop flag is observed at loop boundaries only, never mid-utterance, so
//! cancellation latency is bounded by one utterance plus the gap.

use std::time::Duration;

use tokio::sync::watch;

use weatherbell_domain::error::SpeechError;

use crate::ports::{SpeechEngine, SpeechOutcome};

/// Create a connected stop handle/signal pair.
#[must_use]
pub fn stop_pair() -> (StopHandle, StopSignal) {
    let (tx, rx) = watch::channel(false);
    (StopHandle { tx }, StopSignal { rx })
}

/// Raising half of the external stop control.
#[derive(Debug)]
pub struct StopHandle {
    tx: watch::Sender<bool>,
}

impl StopHandle {
    /// Raise the stop flag. Idempotent.
    pub fn stop(&self) {
        let _ = self.tx.send(true);
    }
}

/// Observing half of the external stop control. Cheap to clone.
#[derive(Debug, Clone)]
pub struct StopSignal {
    rx: watch::Receiver<bool>,
}

impl StopSignal {
    /// Whether the stop flag has been raised.
    #[must_use]
    pub fn is_stopped(&self) -> bool {
        *self.rx.borrow()
    }
}

/// How the loop ended.
#[derive(Debug, PartialEq, Eq)]
pub enum LoopEnd {
    /// The external stop flag was observed at a loop boundary.
    Stopped,
    /// The speech engine reported a failure; the loop terminated.
    Failed(SpeechError),
}

/// What one loop run did.
#[derive(Debug, PartialEq, Eq)]
pub struct LoopReport {
    /// Utterances that played to completion.
    pub utterances: u32,
    /// Terminal state.
    pub end: LoopEnd,
}

/// Drives repeated announcements through a [`SpeechEngine`].
pub struct SpeechLoopController<E> {
    engine: E,
    gap: Duration,
}

impl<E: SpeechEngine> SpeechLoopController<E> {
    /// Create a controller with the given inter-repeat gap.
    pub fn new(engine: E, gap: Duration) -> Self {
        Self { engine, gap }
    }

    /// Repeat `text` until the stop flag is raised or the engine fails.
    ///
    /// A stop raised before the first iteration produces zero utterances;
    /// a stop raised after utterance N completes means N+1 never starts.
    pub async fn run(&self, text: &str, stop: &StopSignal) -> LoopReport {
        let mut utterances = 0;
        loop {
            if stop.is_stopped() {
                tracing::debug!(utterances, "speech loop stopped");
                return LoopReport {
                    utterances,
                    end: LoopEnd::Stopped,
                };
            }

            match self.engine.speak(text).await {
                Ok(SpeechOutcome::Done) => {
                    utterances += 1;
                }
                Ok(SpeechOutcome::Failed) => {
                    tracing::warn!(utterances, "utterance failed, ending loop");
                    return LoopReport {
                        utterances,
                        end: LoopEnd::Failed(SpeechError::Utterance),
                    };
                }
                Err(err) => {
                    tracing::warn!(utterances, error = %err, "speech engine failed, ending loop");
                    return LoopReport {
                        utterances,
                        end: LoopEnd::Failed(err),
                    };
                }
            }

            tokio::time::sleep(self.gap).await;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::future::Future;
    use std::sync::Mutex;
    use std::sync::atomic::{AtomicU32, Ordering};

    /// Engine scripted with per-utterance results; `Ok(Done)` when exhausted.
    struct ScriptedEngine {
        script: Mutex<Vec<Result<SpeechOutcome, SpeechError>>>,
        spoken: AtomicU32,
    }

    impl ScriptedEngine {
        fn with(script: Vec<Result<SpeechOutcome, SpeechError>>) -> Self {
            Self {
                script: Mutex::new(script),
                spoken: AtomicU32::new(0),
            }
        }

        fn spoken(&self) -> u32 {
            self.spoken.load(Ordering::SeqCst)
        }
    }

    impl SpeechEngine for ScriptedEngine {
        fn speak(
            &self,
            _text: &str,
        ) -> impl Future<Output = Result<SpeechOutcome, SpeechError>> + Send {
            self.spoken.fetch_add(1, Ordering::SeqCst);
            let mut script = self.script.lock().unwrap();
            let next = if script.is_empty() {
                Ok(SpeechOutcome::Done)
            } else {
                script.remove(0)
            };
            async move { next }
        }

        fn stop(&self) -> impl Future<Output = ()> + Send {
            async {}
        }

        fn shutdown(&self) -> impl Future<Output = ()> + Send {
            async {}
        }
    }

    fn controller(engine: ScriptedEngine) -> SpeechLoopController<ScriptedEngine> {
        SpeechLoopController::new(engine, Duration::from_millis(1))
    }

    #[tokio::test]
    async fn should_perform_zero_utterances_when_stopped_before_start() {
        let ctl = controller(ScriptedEngine::with(vec![]));
        let (handle, signal) = stop_pair();
        handle.stop();

        let report = ctl.run("hello", &signal).await;
        assert_eq!(report.utterances, 0);
        assert_eq!(report.end, LoopEnd::Stopped);
        assert_eq!(ctl.engine.spoken(), 0);
    }

    #[tokio::test]
    async fn should_not_start_next_utterance_after_stop() {
        let engine = ScriptedEngine::with(vec![]);
        let ctl = SpeechLoopController::new(engine, Duration::from_millis(200));
        let (handle, signal) = stop_pair();

        // Utterances resolve instantly, so the stop lands inside the first
        // gap: utterance 1 completes, utterance 2 must never start.
        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(20)).await;
            handle.stop();
        });

        let report = ctl.run("hello", &signal).await;
        assert_eq!(report.end, LoopEnd::Stopped);
        assert_eq!(report.utterances, 1);
        assert_eq!(ctl.engine.spoken(), 1);
    }

    #[tokio::test]
    async fn should_end_loop_when_utterance_fails() {
        let ctl = controller(ScriptedEngine::with(vec![
            Ok(SpeechOutcome::Done),
            Ok(SpeechOutcome::Failed),
        ]));
        let (_handle, signal) = stop_pair();

        let report = ctl.run("hello", &signal).await;
        assert_eq!(report.utterances, 1);
        assert_eq!(report.end, LoopEnd::Failed(SpeechError::Utterance));
    }

    #[tokio::test]
    async fn should_end_loop_when_engine_fails_to_initialise() {
        let ctl = controller(ScriptedEngine::with(vec![Err(SpeechError::Init(
            "no engine".to_string(),
        ))]));
        let (_handle, signal) = stop_pair();

        let report = ctl.run("hello", &signal).await;
        assert_eq!(report.utterances, 0);
        assert!(matches!(report.end, LoopEnd::Failed(SpeechError::Init(_))));
    }

    #[tokio::test]
    async fn should_repeat_until_stopped() {
        let ctl = controller(ScriptedEngine::with(vec![]));
        let (handle, signal) = stop_pair();

        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(30)).await;
            handle.stop();
        });

        let report = ctl.run("hello", &signal).await;
        assert_eq!(report.end, LoopEnd::Stopped);
        assert!(report.utterances > 1, "expected repeats, got {report:?}");
    }
}
