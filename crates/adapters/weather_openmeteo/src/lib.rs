//! # weatherbell-adapter-weather-openmeteo
//!
//! Open-Meteo HTTP adapter.
//!
//! ## Responsibilities
//! - Implement the [`WeatherProvider`](weatherbell_app::ports::WeatherProvider)
//!   port against the Open-Meteo forecast API
//! - Map the service's wire format to the domain's weather report
//! - Map HTTP errors into the engine's provider error
//!
//! ## Dependency rule
//! Depends on `weatherbell-app` (for the port trait) and `weatherbell-domain`
//! (for domain types). The `app` and `domain` crates must never reference
//! this adapter.

pub mod error;
pub mod provider;

pub use provider::{Config, OpenMeteoProvider};
