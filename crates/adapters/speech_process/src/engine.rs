//! Child-process implementation of [`SpeechEngine`].

use tokio::process::Command;
use tokio::sync::Notify;

use weatherbell_app::ports::{SpeechEngine, SpeechOutcome};
use weatherbell_domain::error::SpeechError;

pub const DEFAULT_COMMAND: &str = "espeak-ng";

/// Configuration for the process-backed speech engine.
#[derive(Debug, Clone)]
pub struct Config {
    /// TTS binary to invoke per utterance.
    pub command: String,
    /// Arguments placed before the spoken text.
    pub args: Vec<String>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            command: DEFAULT_COMMAND.to_string(),
            args: Vec::new(),
        }
    }
}

impl Config {
    /// Build the engine.
    #[must_use]
    pub fn build(self) -> ProcessSpeechEngine {
        ProcessSpeechEngine {
            config: self,
            interrupt: Notify::new(),
        }
    }
}

/// Speech engine spawning one TTS process per utterance.
///
/// The text is appended as the final argument. [`SpeechEngine::stop`] kills
/// the process of the in-flight utterance, which then resolves as a failed
/// utterance rather than a completed one.
pub struct ProcessSpeechEngine {
    config: Config,
    interrupt: Notify,
}

impl SpeechEngine for ProcessSpeechEngine {
    async fn speak(&self, text: &str) -> Result<SpeechOutcome, SpeechError> {
        let mut child = Command::new(&self.config.command)
            .args(&self.config.args)
            .arg(text)
            .spawn()
            .map_err(|err| {
                SpeechError::Init(format!("failed to spawn {}: {err}", self.config.command))
            })?;

        let waited = tokio::select! {
            status = child.wait() => Some(status),
            () = self.interrupt.notified() => None,
        };

        match waited {
            Some(status) => {
                let status = status.map_err(|err| {
                    SpeechError::Init(format!("failed to wait for utterance: {err}"))
                })?;
                if status.success() {
                    Ok(SpeechOutcome::Done)
                } else {
                    tracing::warn!(%status, "utterance process failed");
                    Ok(SpeechOutcome::Failed)
                }
            }
            None => {
                tracing::debug!("utterance interrupted");
                let _ = child.kill().await;
                Ok(SpeechOutcome::Failed)
            }
        }
    }

    async fn stop(&self) {
        // Wakes only an in-flight utterance; a stop with nothing playing
        // must not poison the next one.
        self.interrupt.notify_waiters();
    }

    async fn shutdown(&self) {
        self.interrupt.notify_waiters();
    }
}
