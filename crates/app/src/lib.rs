//! # weatherbell-app
//!
//! The recurring-trigger and background-broadcast engine.
//!
//! ## Responsibilities
//! - Define **ports** (traits) for the persistent store, the timer facility,
//!   the background work queue, the weather provider, the speech engine,
//!   user-visible notifications, and the CPU-wake guarantee
//! - **`AlarmScheduler`** — next-occurrence computation and timer registration
//! - **`TriggerDispatcher`** — firing handler: enqueue the broadcast, then
//!   reschedule the trigger for the next day
//! - **`BroadcastWorker`** — the background execution body: fetch, compose,
//!   speak on repeat until stopped
//! - **`SpeechLoopController`** — the cooperative announcement loop
//! - **`TriggerService`** — serialized add/remove/list over the store
//!
//! ## Dependency rule
//! Depends only on `weatherbell-domain`. Adapters implement the ports defined
//! here; the binary crate wires everything together.

pub mod ports;

pub mod dispatcher;
pub mod notify;
pub mod scheduler;
pub mod speech_loop;
pub mod trigger_service;
pub mod wake;
pub mod worker;
