//! # weatherbell-adapter-runner-tokio
//!
//! Tokio background work runner.
//!
//! ## Responsibilities
//! - Implement the [`WorkQueue`](weatherbell_app::ports::WorkQueue) port with
//!   one task per work item
//! - Enforce last-write-wins replacement per key
//! - Retry retryable outcomes (panics included) with a fixed backoff
//! - Bound the number of concurrently expedited items
//!
//! ## Dependency rule
//! Depends on `weatherbell-app` (for the port trait) and `weatherbell-domain`
//! (for domain types). The `app` and `domain` crates must never reference
//! this adapter.

pub mod runner;

pub use runner::{RunnerConfig, TokioWorkRunner};
