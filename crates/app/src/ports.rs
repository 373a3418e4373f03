//! Port definitions — traits that adapters implement.
//!
//! Ports are the boundaries between the application core and the outside world.
//! They are defined here (in `app`) so that both the engine and the adapter
//! layer can depend on them without creating circular dependencies.

pub mod notify;
pub mod speech;
pub mod store;
pub mod timer;
pub mod wake;
pub mod weather;
pub mod work;

pub use notify::Notifier;
pub use speech::{SpeechEngine, SpeechOutcome, outcome_channel};
pub use store::TriggerStore;
pub use timer::{FiringPayload, TimerCapability, TimerHost};
pub use wake::WakeSource;
pub use weather::WeatherProvider;
pub use work::{BroadcastRequest, EnqueueError, Priority, WorkOutcome, WorkQueue};
