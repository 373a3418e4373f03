//! # weatherbell-adapter-speech-process
//!
//! Child-process TTS adapter.
//!
//! ## Responsibilities
//! - Implement the [`SpeechEngine`](weatherbell_app::ports::SpeechEngine)
//!   port by spawning one TTS process per utterance
//! - Map spawn failures to engine initialisation errors and non-zero exits
//!   to failed utterances
//! - Kill the in-flight process when stopped
//!
//! ## Dependency rule
//! Depends on `weatherbell-app` (for the port trait) and `weatherbell-domain`
//! (for domain types). The `app` and `domain` crates must never reference
//! this adapter.

pub mod engine;

pub use engine::{Config, ProcessSpeechEngine};
