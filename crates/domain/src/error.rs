//! Common error types used across the workspace.
//!
//! Each layer defines its own typed errors and converts into
//! [`WeatherbellError`] via `#[from]` or a boxed source. Adapter crates wrap
//! their library errors (IO, JSON, HTTP) into the `Storage`/`Provider`
//! variants so the engine never depends on adapter internals.

/// Top-level error for the weatherbell workspace.
#[derive(Debug, thiserror::Error)]
pub enum WeatherbellError {
    /// A domain invariant was violated.
    #[error("validation error")]
    Validation(#[from] ValidationError),

    /// A referenced object does not exist.
    #[error("not found")]
    NotFound(#[from] NotFoundError),

    /// The persistence layer failed (read or write).
    #[error("storage error")]
    Storage(#[source] Box<dyn std::error::Error + Send + Sync>),

    /// An external provider (weather service) failed.
    #[error("provider error")]
    Provider(#[source] Box<dyn std::error::Error + Send + Sync>),

    /// The timer facility rejected a registration or cancellation.
    #[error("timer error: {0}")]
    Timer(String),

    /// The speech engine failed.
    #[error("speech error")]
    Speech(#[from] SpeechError),
}

/// Domain invariant violations.
///
/// `PartialEq` only: the coordinate variant carries `f64` fields.
#[derive(Debug, PartialEq, thiserror::Error)]
pub enum ValidationError {
    /// A name field was empty.
    #[error("name must not be empty")]
    EmptyName,

    /// Hour outside `0..=23`.
    #[error("hour must be in 0..=23, got {0}")]
    HourOutOfRange(u32),

    /// Minute outside `0..=59`.
    #[error("minute must be in 0..=59, got {0}")]
    MinuteOutOfRange(u32),

    /// Latitude/longitude outside the valid range.
    #[error("coordinates out of range: lat {lat}, lon {lon}")]
    CoordinatesOutOfRange { lat: f64, lon: f64 },
}

/// A lookup that came back empty.
#[derive(Debug, thiserror::Error)]
#[error("{entity} not found: {id}")]
pub struct NotFoundError {
    /// Kind of object that was looked up (e.g. `"Trigger"`).
    pub entity: &'static str,
    /// The identifier that missed.
    pub id: String,
}

/// Failures reported by a speech engine.
#[derive(Debug, PartialEq, Eq, thiserror::Error)]
pub enum SpeechError {
    /// The engine could not be initialised (e.g. binary missing).
    #[error("speech engine failed to initialise: {0}")]
    Init(String),

    /// An individual utterance failed after the engine started.
    #[error("utterance failed")]
    Utterance,
}
