//! JSON file implementation of [`TriggerStore`].

use std::path::{Path, PathBuf};

use weatherbell_app::ports::TriggerStore;
use weatherbell_domain::error::WeatherbellError;
use weatherbell_domain::trigger::Trigger;

use crate::error::StorageError;

/// Trigger store persisting the whole set as one JSON document.
///
/// Writes go through a sibling temp file followed by a rename, so a crash
/// mid-write leaves the previous document intact rather than a truncated one.
pub struct JsonTriggerStore {
    path: PathBuf,
}

impl JsonTriggerStore {
    /// Create a store backed by the file at `path`.
    ///
    /// The file does not need to exist yet; a missing file reads as an
    /// empty trigger set.
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    fn temp_path(&self) -> PathBuf {
        let mut name = self.path.as_os_str().to_os_string();
        name.push(".tmp");
        PathBuf::from(name)
    }

    async fn read(path: &Path) -> Result<Vec<Trigger>, StorageError> {
        let bytes = tokio::fs::read(path).await?;
        Ok(serde_json::from_slice(&bytes)?)
    }

    async fn write(&self, triggers: &[Trigger]) -> Result<(), StorageError> {
        if let Some(parent) = self.path.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }
        let json = serde_json::to_vec_pretty(triggers)?;
        let temp = self.temp_path();
        tokio::fs::write(&temp, &json).await?;
        tokio::fs::rename(&temp, &self.path).await?;
        Ok(())
    }
}

impl TriggerStore for JsonTriggerStore {
    /// Load the persisted set. A missing or unreadable document degrades to
    /// an empty set so the engine can still schedule newly added triggers.
    async fn load(&self) -> Vec<Trigger> {
        match Self::read(&self.path).await {
            Ok(triggers) => triggers,
            Err(StorageError::Io(err)) if err.kind() == std::io::ErrorKind::NotFound => {
                tracing::debug!(path = %self.path.display(), "store file absent, starting empty");
                Vec::new()
            }
            Err(err) => {
                tracing::warn!(path = %self.path.display(), error = %err, "store unreadable, starting empty");
                Vec::new()
            }
        }
    }

    async fn save_all(&self, triggers: &[Trigger]) -> Result<(), WeatherbellError> {
        self.write(triggers).await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use weatherbell_domain::city::City;

    fn store_in(dir: &tempfile::TempDir) -> JsonTriggerStore {
        JsonTriggerStore::new(dir.path().join("triggers.json"))
    }

    fn trigger(hour: u32, minute: u32) -> Trigger {
        Trigger::builder()
            .hour(hour)
            .minute(minute)
            .city(City::fallback())
            .build()
            .unwrap()
    }

    #[tokio::test]
    async fn should_load_empty_set_when_file_absent() {
        let dir = tempfile::tempdir().unwrap();
        let store = store_in(&dir);
        assert!(store.load().await.is_empty());
    }

    #[tokio::test]
    async fn should_persist_and_reload_triggers() {
        let dir = tempfile::tempdir().unwrap();
        let store = store_in(&dir);
        let triggers = vec![trigger(8, 0), trigger(20, 30)];

        store.save_all(&triggers).await.unwrap();
        assert_eq!(store.load().await, triggers);
    }

    #[tokio::test]
    async fn should_survive_reopening_the_store() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("triggers.json");
        let triggers = vec![trigger(6, 15)];

        JsonTriggerStore::new(&path)
            .save_all(&triggers)
            .await
            .unwrap();
        assert_eq!(JsonTriggerStore::new(&path).load().await, triggers);
    }

    #[tokio::test]
    async fn should_load_empty_set_when_document_corrupt() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("triggers.json");
        tokio::fs::write(&path, b"{not json").await.unwrap();

        assert!(JsonTriggerStore::new(&path).load().await.is_empty());
    }

    #[tokio::test]
    async fn should_create_missing_parent_directories() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("state").join("triggers.json");
        let store = JsonTriggerStore::new(&path);

        store.save_all(&[trigger(8, 0)]).await.unwrap();
        assert_eq!(store.load().await.len(), 1);
    }

    #[tokio::test]
    async fn should_leave_no_temp_file_after_save() {
        let dir = tempfile::tempdir().unwrap();
        let store = store_in(&dir);
        store.save_all(&[trigger(8, 0)]).await.unwrap();

        let names: Vec<_> = std::fs::read_dir(dir.path())
            .unwrap()
            .map(|e| e.unwrap().file_name())
            .collect();
        assert_eq!(names, vec![std::ffi::OsString::from("triggers.json")]);
    }

    #[tokio::test]
    async fn should_replace_previous_document_on_save() {
        let dir = tempfile::tempdir().unwrap();
        let store = store_in(&dir);

        store.save_all(&[trigger(8, 0), trigger(9, 0)]).await.unwrap();
        store.save_all(&[trigger(20, 30)]).await.unwrap();

        let loaded = store.load().await;
        assert_eq!(loaded.len(), 1);
        assert_eq!((loaded[0].hour, loaded[0].minute), (20, 30));
    }
}
