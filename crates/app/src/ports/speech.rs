//! Speech engine port and the single-resolution utterance outcome channel.

use std::future::Future;
use std::sync::Mutex;

use tokio::sync::oneshot;

use weatherbell_domain::error::SpeechError;

/// Outcome of one utterance.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SpeechOutcome {
    /// The utterance played to completion.
    Done,
    /// The engine reported an utterance error.
    Failed,
}

/// Speaks fixed text, one utterance at a time.
pub trait SpeechEngine {
    /// Speak `text`, resolving when the utterance completes or fails.
    ///
    /// # Errors
    ///
    /// Returns [`SpeechError::Init`] when the engine itself cannot start;
    /// a started-but-failed utterance resolves to [`SpeechOutcome::Failed`]
    /// instead.
    fn speak(&self, text: &str) -> impl Future<Output = Result<SpeechOutcome, SpeechError>> + Send;

    /// Interrupt the current utterance, if any.
    fn stop(&self) -> impl Future<Output = ()> + Send;

    /// Release engine resources. Called once per session on the way out.
    fn shutdown(&self) -> impl Future<Output = ()> + Send;
}

impl<T: SpeechEngine + Sync> SpeechEngine for &T {
    fn speak(&self, text: &str) -> impl Future<Output = Result<SpeechOutcome, SpeechError>> + Send {
        (**self).speak(text)
    }

    fn stop(&self) -> impl Future<Output = ()> + Send {
        (**self).stop()
    }

    fn shutdown(&self) -> impl Future<Output = ()> + Send {
        (**self).shutdown()
    }
}

impl<T: SpeechEngine + Send + Sync> SpeechEngine for std::sync::Arc<T> {
    fn speak(&self, text: &str) -> impl Future<Output = Result<SpeechOutcome, SpeechError>> + Send {
        (**self).speak(text)
    }

    fn stop(&self) -> impl Future<Output = ()> + Send {
        (**self).stop()
    }

    fn shutdown(&self) -> impl Future<Output = ()> + Send {
        (**self).shutdown()
    }
}

/// Create a single-resolution outcome pair for one utterance.
///
/// Engines that receive completion and error callbacks on a different
/// execution context resolve through the [`OutcomeResolver`]; the loop driver
/// awaits the [`OutcomeWaiter`]. Exactly one resolution counts — later calls
/// are ignored, guarding against a callback firing twice.
#[must_use]
pub fn outcome_channel() -> (OutcomeResolver, OutcomeWaiter) {
    let (tx, rx) = oneshot::channel();
    (OutcomeResolver(Mutex::new(Some(tx))), OutcomeWaiter(rx))
}

/// Resolving half of an utterance outcome. First resolution wins.
#[derive(Debug)]
pub struct OutcomeResolver(Mutex<Option<oneshot::Sender<SpeechOutcome>>>);

impl OutcomeResolver {
    /// Resolve the utterance. Returns `true` if this call was the one that
    /// counted.
    pub fn resolve(&self, outcome: SpeechOutcome) -> bool {
        let sender = self.0.lock().ok().and_then(|mut slot| slot.take());
        match sender {
            Some(tx) => tx.send(outcome).is_ok(),
            None => false,
        }
    }
}

/// Awaiting half of an utterance outcome.
#[derive(Debug)]
pub struct OutcomeWaiter(oneshot::Receiver<SpeechOutcome>);

impl OutcomeWaiter {
    /// Suspend until the utterance resolves.
    ///
    /// A resolver dropped without resolving counts as a failed utterance.
    pub async fn wait(self) -> SpeechOutcome {
        self.0.await.unwrap_or(SpeechOutcome::Failed)
    }
}
