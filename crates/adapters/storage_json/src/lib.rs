//! # weatherbell-adapter-storage-json
//!
//! JSON file persistence adapter.
//!
//! ## Responsibilities
//! - Implement the [`TriggerStore`](weatherbell_app::ports::TriggerStore) port
//! - Keep the on-disk document readable and atomic to replace
//! - Map file and JSON errors into the engine's storage error
//!
//! ## Dependency rule
//! Depends on `weatherbell-app` (for the port trait) and `weatherbell-domain`
//! (for domain types). The `app` and `domain` crates must never reference
//! this adapter.

pub mod error;
pub mod store;

pub use store::JsonTriggerStore;
