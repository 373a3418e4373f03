//! Broadcast worker — executes one enqueued broadcast end to end.
//!
//! The worker is the body of a work item: acknowledge, hold a wake
//! reservation, fetch the weather, then run the speech loop until stopped.
//! Only a fetch failure is worth retrying; once the worker reaches the
//! speech stage the item completes regardless of how the loop ends.

use std::time::Duration;

use chrono::{Local, Timelike};

use weatherbell_domain::announce::compose;
use weatherbell_domain::id::SessionId;

use crate::ports::{BroadcastRequest, Notifier, SpeechEngine, WakeSource, WeatherProvider, WorkOutcome};
use crate::speech_loop::{LoopEnd, SpeechLoopController, StopSignal};

/// Runs one broadcast: fetch, compose, announce on repeat.
pub struct BroadcastWorker<W, E, N, K> {
    weather: W,
    engine: E,
    notifier: N,
    wake: K,
    gap: Duration,
    wake_ceiling: Duration,
}

impl<W, E, N, K> BroadcastWorker<W, E, N, K>
where
    W: WeatherProvider,
    E: SpeechEngine + Sync,
    N: Notifier,
    K: WakeSource,
{
    /// Create a worker with the given repeat gap and wake ceiling.
    pub fn new(weather: W, engine: E, notifier: N, wake: K, gap: Duration, wake_ceiling: Duration) -> Self {
        Self {
            weather,
            engine,
            notifier,
            wake,
            gap,
            wake_ceiling,
        }
    }

    /// Execute the broadcast described by `request`.
    ///
    /// The wake reservation is held across fetch and speech and released on
    /// every exit path. The outcome drives the queue's retry decision: only
    /// a fetch failure is retryable. A speech failure of any kind ends the
    /// item as completed; re-running it would not announce anything new.
    #[tracing::instrument(skip(self, request, stop), fields(city = %request.city_or_fallback().name))]
    pub async fn run(&self, request: BroadcastRequest, stop: StopSignal) -> WorkOutcome {
        let city = request.city_or_fallback();
        self.notifier.announce_broadcasting(&city.name).await;
        let _wake = self.wake.acquire(self.wake_ceiling).await;

        let report = match self.weather.fetch(city.lat, city.lon).await {
            Ok(report) => report,
            Err(err) => {
                tracing::warn!(error = %err, "weather fetch failed, will retry");
                self.notifier.clear().await;
                return WorkOutcome::Retry;
            }
        };

        let session = SessionId::new();
        let text = compose(&city.name, &report, Local::now().hour());
        tracing::info!(%session, text, "starting announcement loop");

        let loop_report = SpeechLoopController::new(&self.engine, self.gap)
            .run(&text, &stop)
            .await;
        self.engine.stop().await;
        self.engine.shutdown().await;
        self.notifier.clear().await;
        tracing::info!(%session, utterances = loop_report.utterances, "announcement loop ended");

        if let LoopEnd::Failed(err) = &loop_report.end {
            tracing::warn!(error = %err, utterances = loop_report.utterances, "speech ended with failure");
        }
        WorkOutcome::Success
    }
}
