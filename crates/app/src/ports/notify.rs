//! Notifier port — user-visible acknowledgments of engine activity.

use std::future::Future;

/// Surfaces engine activity to the user.
///
/// `announce_broadcasting` doubles as the foreground-visible, cancel-offering
/// execution state the worker must establish before any lengthy work.
pub trait Notifier {
    /// A timer fired; broadcast preparation is starting.
    ///
    /// Shown immediately, independent of whether the fetch later succeeds.
    fn announce_fired(&self, city_name: &str) -> impl Future<Output = ()> + Send;

    /// A broadcast is running and can be stopped by the user.
    fn announce_broadcasting(&self, city_name: &str) -> impl Future<Output = ()> + Send;

    /// The broadcast ended; withdraw the visible state.
    fn clear(&self) -> impl Future<Output = ()> + Send;
}

impl<T: Notifier + Send + Sync> Notifier for std::sync::Arc<T> {
    fn announce_fired(&self, city_name: &str) -> impl Future<Output = ()> + Send {
        (**self).announce_fired(city_name)
    }

    fn announce_broadcasting(&self, city_name: &str) -> impl Future<Output = ()> + Send {
        (**self).announce_broadcasting(city_name)
    }

    fn clear(&self) -> impl Future<Output = ()> + Send {
        (**self).clear()
    }
}
