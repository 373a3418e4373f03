//! In-process wake source backed by a reservation counter.
//!
//! A daemon has no host power manager to bargain with, so the in-process
//! source only accounts for held reservations; the RAII guard still gives
//! the worker the release-on-every-exit-path discipline the engine requires.

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use crate::ports::WakeSource;

/// In-process [`WakeSource`] counting held reservations.
#[derive(Debug, Default, Clone)]
pub struct InProcessWakeSource {
    held: Arc<AtomicUsize>,
}

impl InProcessWakeSource {
    /// Create a source with no reservations held.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of currently held reservations.
    #[must_use]
    pub fn held_count(&self) -> usize {
        self.held.load(Ordering::SeqCst)
    }
}

impl WakeSource for InProcessWakeSource {
    type Guard = WakeGuard;

    async fn acquire(&self, ceiling: Duration) -> WakeGuard {
        self.held.fetch_add(1, Ordering::SeqCst);
        tracing::debug!(ceiling_secs = ceiling.as_secs(), "wake reservation acquired");
        WakeGuard {
            held: Arc::clone(&self.held),
        }
    }
}

/// Reservation handle; releases on drop.
#[derive(Debug)]
pub struct WakeGuard {
    held: Arc<AtomicUsize>,
}

impl Drop for WakeGuard {
    fn drop(&mut self) {
        self.held.fetch_sub(1, Ordering::SeqCst);
        tracing::debug!("wake reservation released");
    }
}
