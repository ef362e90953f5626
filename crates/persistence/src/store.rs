//! `SnapshotStore`: the persistence boundary the event store saves to
//! and loads from at startup. Concrete filesystem implementation uses a
//! write-temp-then-rename sequence so a save is atomic from a reader's
//! perspective.

use std::fs;
use std::path::{Path, PathBuf};

use tracing::warn;

use crate::error::{PersistenceError, PersistenceResult};
use crate::snapshot::SnapshotDocument;

/// Abstracts over where a snapshot lives. The filesystem implementation
/// below is the only one this crate ships; the trait exists so the
/// store crate never depends on a concrete storage backend.
pub trait SnapshotStore: Send + Sync {
    fn load(&self) -> PersistenceResult<Option<SnapshotDocument>>;
    fn save(&self, document: &SnapshotDocument) -> PersistenceResult<()>;
}

/// A `SnapshotStore` backed by a single JSON file on disk.
pub struct FileSnapshotStore {
    path: PathBuf,
}

impl FileSnapshotStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    fn temp_path(&self) -> PathBuf {
        let mut temp = self.path.clone();
        let file_name = temp
            .file_name()
            .map(|n| format!("{}.tmp", n.to_string_lossy()))
            .unwrap_or_else(|| "snapshot.json.tmp".to_string());
        temp.set_file_name(file_name);
        temp
    }
}

impl SnapshotStore for FileSnapshotStore {
    fn load(&self) -> PersistenceResult<Option<SnapshotDocument>> {
        if !self.path.exists() {
            return Ok(None);
        }

        let raw = fs::read_to_string(&self.path).map_err(|source| PersistenceError::Read {
            path: display_path(&self.path),
            source,
        })?;

        let document: SnapshotDocument =
            serde_json::from_str(&raw).map_err(PersistenceError::Deserialize)?;

        if document.is_newer_than_current() {
            warn!(
                schema_version = document.schema_version,
                current = crate::snapshot::CURRENT_SCHEMA_VERSION,
                "snapshot schema is newer than this build understands; loading best-effort"
            );
        } else if document.is_older_than_current() {
            warn!(
                schema_version = document.schema_version,
                current = crate::snapshot::CURRENT_SCHEMA_VERSION,
                "snapshot schema is older than current; will rewrite at current version on next save"
            );
        }

        Ok(Some(document))
    }

    fn save(&self, document: &SnapshotDocument) -> PersistenceResult<()> {
        let temp_path = self.temp_path();

        let json = serde_json::to_string(document).map_err(PersistenceError::Serialize)?;

        fs::write(&temp_path, json).map_err(|source| PersistenceError::Write {
            path: display_path(&temp_path),
            source,
        })?;

        fs::rename(&temp_path, &self.path).map_err(|source| PersistenceError::Write {
            path: display_path(&self.path),
            source,
        })?;

        Ok(())
    }
}

fn display_path(path: &Path) -> String {
    path.display().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use actiontrace_core::TargetId;
    use actiontrace_events::Event;

    fn sample_document() -> SnapshotDocument {
        let events = vec![
            Event::candidate("Test", TargetId::instance(1), &serde_json::json!({}), 0).with_sequence(1),
        ];
        SnapshotDocument::new(1, events, vec![])
    }

    #[test]
    fn round_trips_through_a_temp_file() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileSnapshotStore::new(dir.path().join("snapshot.json"));

        assert!(store.load().unwrap().is_none());

        store.save(&sample_document()).unwrap();
        let loaded = store.load().unwrap().expect("snapshot should exist");

        assert_eq!(loaded.sequence_counter, 1);
        assert_eq!(loaded.events.len(), 1);
        assert!(!dir.path().join("snapshot.json.tmp").exists());
    }

    #[test]
    fn save_overwrites_previous_snapshot_atomically() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileSnapshotStore::new(dir.path().join("snapshot.json"));

        store.save(&sample_document()).unwrap();
        let mut second = sample_document();
        second.sequence_counter = 2;
        store.save(&second).unwrap();

        let loaded = store.load().unwrap().unwrap();
        assert_eq!(loaded.sequence_counter, 2);
    }

    #[test]
    fn forward_compatible_load_of_newer_schema_warns_but_succeeds() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("snapshot.json");
        let mut document = sample_document();
        document.schema_version = crate::snapshot::CURRENT_SCHEMA_VERSION + 1;
        fs::write(&path, serde_json::to_string(&document).unwrap()).unwrap();

        let store = FileSnapshotStore::new(path);
        let loaded = store.load().unwrap().unwrap();
        assert!(loaded.is_newer_than_current());
    }
}
