//! Configuration loading — TOML file with environment variable overrides.
//!
//! Looks for `weatherbell.toml` in the working directory. Every field has a
//! sensible default so the file is optional. Environment variables take
//! precedence over file values.

use std::time::Duration;

use serde::Deserialize;

/// Top-level configuration.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Trigger store settings.
    pub storage: StorageConfig,
    /// Timer host settings.
    pub timers: TimersConfig,
    /// Speech engine settings.
    pub speech: SpeechConfig,
    /// Weather provider settings.
    pub weather: WeatherConfig,
    /// Broadcast execution settings.
    pub broadcast: BroadcastConfig,
    /// Logging settings.
    pub logging: LoggingConfig,
}

/// Trigger store configuration.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    /// Path of the JSON trigger document.
    pub path: String,
}

/// Timer host configuration.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct TimersConfig {
    /// Request exact delivery; `false` coarsens wakes to whole minutes.
    pub exact: bool,
}

/// Speech engine configuration.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct SpeechConfig {
    /// TTS binary invoked per utterance.
    pub command: String,
    /// Arguments placed before the spoken text.
    pub args: Vec<String>,
    /// Pause between repeats of the announcement.
    pub gap_seconds: u64,
}

/// Weather provider configuration.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct WeatherConfig {
    /// Service root, without the `/v1/forecast` path.
    pub base_url: String,
    /// Per-request timeout.
    pub timeout_seconds: u64,
}

/// Broadcast execution configuration.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct BroadcastConfig {
    /// Upper bound on how long one broadcast may hold a wake reservation.
    pub wake_ceiling_minutes: u64,
    /// Expedited work slots available at any one time.
    pub max_expedited: u32,
    /// Total attempts per work item, first run included.
    pub max_attempts: u32,
    /// Delay between a retryable outcome and the next attempt.
    pub backoff_seconds: u64,
}

/// Logging configuration.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Filter directive (`RUST_LOG` syntax).
    pub filter: String,
}

impl Config {
    /// Load configuration from `weatherbell.toml` (if present) then apply
    /// environment-variable overrides.
    ///
    /// # Errors
    ///
    /// Returns an error if the TOML file exists but is malformed, or if a
    /// value fails semantic validation.
    pub fn load() -> Result<Self, ConfigError> {
        let mut config = Self::from_file("weatherbell.toml")?;
        config.apply_env_overrides();
        config.validate()?;
        Ok(config)
    }

    fn from_file(path: &str) -> Result<Self, ConfigError> {
        match std::fs::read_to_string(path) {
            Ok(content) => toml::from_str(&content).map_err(ConfigError::Parse),
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(Self::default()),
            Err(err) => Err(ConfigError::Io(err)),
        }
    }

    fn apply_env_overrides(&mut self) {
        if let Ok(val) = std::env::var("WEATHERBELL_STORE") {
            self.storage.path = val;
        }
        if let Ok(val) = std::env::var("WEATHERBELL_SPEECH_COMMAND") {
            self.speech.command = val;
        }
        if let Ok(val) = std::env::var("WEATHERBELL_WEATHER_URL") {
            self.weather.base_url = val;
        }
        if let Ok(val) = std::env::var("WEATHERBELL_LOG") {
            self.logging.filter = val;
        }
        if let Ok(val) = std::env::var("RUST_LOG") {
            self.logging.filter = val;
        }
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.storage.path.is_empty() {
            return Err(ConfigError::Validation(
                "storage path must not be empty".to_string(),
            ));
        }
        if self.speech.command.is_empty() {
            return Err(ConfigError::Validation(
                "speech command must not be empty".to_string(),
            ));
        }
        if self.broadcast.max_attempts == 0 {
            return Err(ConfigError::Validation(
                "max_attempts must be at least 1".to_string(),
            ));
        }
        if self.broadcast.wake_ceiling_minutes == 0 {
            return Err(ConfigError::Validation(
                "wake_ceiling_minutes must be at least 1".to_string(),
            ));
        }
        Ok(())
    }

    /// Pause between repeats of the announcement.
    #[must_use]
    pub fn speech_gap(&self) -> Duration {
        Duration::from_secs(self.speech.gap_seconds)
    }

    /// Per-request weather timeout.
    #[must_use]
    pub fn weather_timeout(&self) -> Duration {
        Duration::from_secs(self.weather.timeout_seconds)
    }

    /// Upper bound on one broadcast's wake reservation.
    #[must_use]
    pub fn wake_ceiling(&self) -> Duration {
        Duration::from_secs(self.broadcast.wake_ceiling_minutes * 60)
    }

    /// Delay between work attempts.
    #[must_use]
    pub fn retry_backoff(&self) -> Duration {
        Duration::from_secs(self.broadcast.backoff_seconds)
    }
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            path: "weatherbell.json".to_string(),
        }
    }
}

impl Default for TimersConfig {
    fn default() -> Self {
        Self { exact: true }
    }
}

impl Default for SpeechConfig {
    fn default() -> Self {
        Self {
            command: "espeak-ng".to_string(),
            args: Vec::new(),
            gap_seconds: 3,
        }
    }
}

impl Default for WeatherConfig {
    fn default() -> Self {
        Self {
            base_url: "https://api.open-meteo.com".to_string(),
            timeout_seconds: 10,
        }
    }
}

impl Default for BroadcastConfig {
    fn default() -> Self {
        Self {
            wake_ceiling_minutes: 10,
            max_expedited: 2,
            max_attempts: 3,
            backoff_seconds: 30,
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            filter: "weatherbelld=info,weatherbell=info".to_string(),
        }
    }
}

/// Configuration errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// TOML parse failure.
    #[error("failed to parse config file")]
    Parse(#[from] toml::de::Error),
    /// File I/O failure.
    #[error("failed to read config file")]
    Io(#[from] std::io::Error),
    /// Semantic validation failure.
    #[error("invalid configuration: {0}")]
    Validation(String),
}
