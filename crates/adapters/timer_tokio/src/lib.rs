//! # weatherbell-adapter-timer-tokio
//!
//! Tokio timer adapter.
//!
//! ## Responsibilities
//! - Implement the [`TimerHost`](weatherbell_app::ports::TimerHost) port with
//!   one sleeping task per registration
//! - Deliver firings on an owned channel, decoupled from registering callers
//! - Coarsen instants to whole minutes when only best-effort delivery is
//!   granted
//!
//! ## Dependency rule
//! Depends on `weatherbell-app` (for the port trait) and `weatherbell-domain`
//! (for domain types). The `app` and `domain` crates must never reference
//! this adapter.

pub mod host;

pub use host::TokioTimerHost;
