//! Trigger store port — durable persistence of the trigger set.

use std::future::Future;

use weatherbell_domain::error::WeatherbellError;
use weatherbell_domain::trigger::Trigger;

/// Persists the trigger collection as a single complete snapshot.
///
/// The snapshot invariant: readers never observe a partially written list.
/// A failed save must leave the previous snapshot intact.
pub trait TriggerStore {
    /// Load the persisted trigger set.
    ///
    /// Absent or corrupt data yields an empty set — loading never fails the
    /// caller.
    fn load(&self) -> impl Future<Output = Vec<Trigger>> + Send;

    /// Overwrite the persisted snapshot with `triggers`.
    fn save_all(
        &self,
        triggers: &[Trigger],
    ) -> impl Future<Output = Result<(), WeatherbellError>> + Send;
}

impl<T: TriggerStore + Send + Sync> TriggerStore for std::sync::Arc<T> {
    fn load(&self) -> impl Future<Output = Vec<Trigger>> + Send {
        (**self).load()
    }

    fn save_all(
        &self,
        triggers: &[Trigger],
    ) -> impl Future<Output = Result<(), WeatherbellError>> + Send {
        (**self).save_all(triggers)
    }
}
