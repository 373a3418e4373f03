//! Tracing-backed notifier — the daemon's stand-in for host notifications.

use crate::ports::Notifier;

/// [`Notifier`] that surfaces engine activity through the log stream.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingNotifier;

impl Notifier for TracingNotifier {
    async fn announce_fired(&self, city_name: &str) {
        tracing::info!(city = city_name, "trigger fired, preparing broadcast");
    }

    async fn announce_broadcasting(&self, city_name: &str) {
        tracing::info!(city = city_name, "broadcast running (Ctrl-C to stop)");
    }

    async fn clear(&self) {
        tracing::info!("broadcast finished");
    }
}
