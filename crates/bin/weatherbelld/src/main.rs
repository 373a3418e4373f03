//! # weatherbelld — weatherbell daemon
//!
//! Composition root that wires all adapters together and runs the engine.
//!
//! ## Responsibilities
//! - Parse configuration (config file, env vars)
//! - Construct the trigger store, timer host, work runner, weather provider
//!   and speech engine (adapters)
//! - Construct the engine services, injecting adapters via port traits
//! - Recover timers from the persisted trigger set at startup
//! - Dispatch timer firings until shut down
//! - Handle graceful shutdown (Ctrl-C stops all broadcasts, then exits)
//!
//! ## Dependency rule
//! This is the **only** crate that depends on all other crates.
//! It is the wiring layer — no domain logic belongs here.

mod config;

use std::sync::Arc;
use std::time::Duration;

use tracing_subscriber::EnvFilter;

use weatherbell_adapter_runner_tokio::{RunnerConfig, TokioWorkRunner};
use weatherbell_adapter_speech_process::Config as SpeechEngineConfig;
use weatherbell_adapter_storage_json::JsonTriggerStore;
use weatherbell_adapter_timer_tokio::TokioTimerHost;
use weatherbell_adapter_weather_openmeteo::Config as WeatherProviderConfig;
use weatherbell_app::dispatcher::TriggerDispatcher;
use weatherbell_app::notify::TracingNotifier;
use weatherbell_app::ports::{SpeechEngine, TimerCapability};
use weatherbell_app::scheduler::AlarmScheduler;
use weatherbell_app::trigger_service::TriggerService;
use weatherbell_app::wake::InProcessWakeSource;
use weatherbell_app::worker::BroadcastWorker;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = config::Config::load()?;
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(&config.logging.filter))
        .init();

    // Adapters
    let store = Arc::new(JsonTriggerStore::new(&config.storage.path));
    let capability = if config.timers.exact {
        TimerCapability::ExactCapable
    } else {
        TimerCapability::BestEffortOnly
    };
    let (timer_host, mut firings) = TokioTimerHost::new(capability);
    let timer_host = Arc::new(timer_host);
    let provider = WeatherProviderConfig {
        base_url: config.weather.base_url.clone(),
        timeout: config.weather_timeout(),
    }
    .build()?;
    let engine = Arc::new(
        SpeechEngineConfig {
            command: config.speech.command.clone(),
            args: config.speech.args.clone(),
        }
        .build(),
    );

    // Services
    let worker = Arc::new(BroadcastWorker::new(
        provider,
        Arc::clone(&engine),
        TracingNotifier,
        InProcessWakeSource::new(),
        config.speech_gap(),
        config.wake_ceiling(),
    ));
    let runner = Arc::new(TokioWorkRunner::new(
        RunnerConfig {
            max_attempts: config.broadcast.max_attempts,
            backoff: config.retry_backoff(),
            max_expedited: config.broadcast.max_expedited,
        },
        {
            let worker = Arc::clone(&worker);
            move |request, stop| {
                let worker = Arc::clone(&worker);
                async move { worker.run(request, stop).await }
            }
        },
    ));
    let service = TriggerService::new(
        Arc::clone(&store),
        AlarmScheduler::new(Arc::clone(&timer_host)),
    );
    let dispatcher = TriggerDispatcher::new(
        Arc::clone(&store),
        AlarmScheduler::new(Arc::clone(&timer_host)),
        Arc::clone(&runner),
        TracingNotifier,
    );

    // Boot signal: re-register a timer for everything persisted.
    service.recover().await;
    tracing::info!(
        triggers = service.list().await.len(),
        store = %config.storage.path,
        "weatherbelld running"
    );

    let shutdown = tokio::signal::ctrl_c();
    tokio::pin!(shutdown);
    loop {
        tokio::select! {
            firing = firings.recv() => match firing {
                Some(payload) => dispatcher.handle_firing(payload).await,
                None => break,
            },
            _ = &mut shutdown => {
                tracing::info!("stop signal received, stopping broadcasts");
                runner.close();
                break;
            }
        }
    }

    drain(&runner).await;
    engine.shutdown().await;
    tracing::info!("weatherbelld stopped");
    Ok(())
}

/// Give stopped broadcasts a bounded window to finish their current step.
async fn drain(runner: &TokioWorkRunner) {
    let drained = tokio::time::timeout(Duration::from_secs(10), async {
        while runner.running() > 0 {
            tokio::time::sleep(Duration::from_millis(50)).await;
        }
    })
    .await;
    if drained.is_err() {
        tracing::warn!("broadcasts still running at shutdown deadline");
    }
}
