//! Wake source port — the CPU-wake guarantee held while a worker executes.

use std::future::Future;
use std::time::Duration;

/// Grants a bounded CPU-wake reservation.
///
/// The guard is released on drop, which covers every exit path of the holder
/// (success, retriable failure, cancellation).
pub trait WakeSource {
    /// RAII handle representing one held reservation.
    type Guard: Send;

    /// Acquire a reservation bounded by `ceiling`.
    fn acquire(&self, ceiling: Duration) -> impl Future<Output = Self::Guard> + Send;
}

impl<T: WakeSource + Send + Sync> WakeSource for std::sync::Arc<T> {
    type Guard = T::Guard;

    fn acquire(&self, ceiling: Duration) -> impl Future<Output = Self::Guard> + Send {
        (**self).acquire(ceiling)
    }
}
