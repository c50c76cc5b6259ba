//! Session stores
//!
//! A store keeps one working key per key id between host invocations.
//! Stores are synchronous; `save` returns once the session is durable.

use std::collections::HashMap;
use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::value::{to_raw_value, RawValue};
use tempfile::NamedTempFile;

use crate::key::Key;
use crate::observability::{log_event_with_fields, Event};

use super::checksum::{compute_checksum, verify_checksum};
use super::errors::{SessionError, SessionResult};

/// Persistence of working keys, addressed by key id
pub trait SessionStore: Send + Sync {
    /// The stored key, or `None` if nothing is stored under `key_id`
    fn load(&self, key_id: &str) -> SessionResult<Option<Key>>;

    /// Stores `key` under `key_id`, replacing any previous session
    fn save(&self, key_id: &str, key: &Key) -> SessionResult<()>;

    /// Deletes the session; returns whether one existed
    fn remove(&self, key_id: &str) -> SessionResult<bool>;
}

/// On-disk form of one session. The key is kept as the exact text that was
/// checksummed.
#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct StoredSession {
    key_id: String,
    saved_at: DateTime<Utc>,
    checksum: u32,
    key: Box<RawValue>,
}

/// One `<key id>.json` envelope per session in a directory
#[derive(Debug, Clone)]
pub struct FileSessionStore {
    dir: PathBuf,
}

impl FileSessionStore {
    /// Opens (creating if needed) a store rooted at `dir`
    pub fn open(dir: impl AsRef<Path>) -> SessionResult<Self> {
        let dir = dir.as_ref().to_path_buf();
        fs::create_dir_all(&dir)?;
        Ok(Self { dir })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn path_for(&self, key_id: &str) -> SessionResult<PathBuf> {
        validate_session_id(key_id)?;
        Ok(self.dir.join(format!("{}.json", key_id)))
    }
}

impl SessionStore for FileSessionStore {
    fn load(&self, key_id: &str) -> SessionResult<Option<Key>> {
        let path = self.path_for(key_id)?;
        let bytes = match fs::read(&path) {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(e.into()),
        };

        let stored: StoredSession = serde_json::from_slice(&bytes)?;
        if stored.key_id != key_id || !verify_checksum(stored.key.get().as_bytes(), stored.checksum) {
            log_event_with_fields(Event::SessionCorrupted, &[("key_id", key_id)]);
            return Err(SessionError::Corrupted {
                key_id: key_id.to_string(),
            });
        }

        let key: Key = serde_json::from_str(stored.key.get())?;
        log_event_with_fields(
            Event::SessionRestored,
            &[("key_id", key_id), ("saved_at", &stored.saved_at.to_rfc3339())],
        );
        Ok(Some(key))
    }

    fn save(&self, key_id: &str, key: &Key) -> SessionResult<()> {
        let path = self.path_for(key_id)?;
        let raw = to_raw_value(key)?;
        let stored = StoredSession {
            key_id: key_id.to_string(),
            saved_at: Utc::now(),
            checksum: compute_checksum(raw.get().as_bytes()),
            key: raw,
        };

        let mut temp_file = NamedTempFile::new_in(&self.dir)?;
        serde_json::to_writer(&mut temp_file, &stored)?;
        temp_file.flush()?;
        temp_file.as_file().sync_all()?;
        temp_file.persist(&path).map_err(|e| e.error)?;

        log_event_with_fields(Event::SessionSaved, &[("key_id", key_id)]);
        Ok(())
    }

    fn remove(&self, key_id: &str) -> SessionResult<bool> {
        let path = self.path_for(key_id)?;
        match fs::remove_file(&path) {
            Ok(()) => {
                log_event_with_fields(Event::SessionRemoved, &[("key_id", key_id)]);
                Ok(true)
            }
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(false),
            Err(e) => Err(e.into()),
        }
    }
}

/// In-memory session store for tests and embedding hosts
#[derive(Debug, Default)]
pub struct MemorySessionStore {
    sessions: Mutex<HashMap<String, Key>>,
}

impl MemorySessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, HashMap<String, Key>> {
        self.sessions.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl SessionStore for MemorySessionStore {
    fn load(&self, key_id: &str) -> SessionResult<Option<Key>> {
        Ok(self.lock().get(key_id).cloned())
    }

    fn save(&self, key_id: &str, key: &Key) -> SessionResult<()> {
        self.lock().insert(key_id.to_string(), key.clone());
        Ok(())
    }

    fn remove(&self, key_id: &str) -> SessionResult<bool> {
        Ok(self.lock().remove(key_id).is_some())
    }
}

/// Session ids become file names; only plain names are accepted
pub fn validate_session_id(key_id: &str) -> SessionResult<()> {
    let valid = !key_id.is_empty()
        && !key_id.starts_with('.')
        && key_id
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.' | ':'));
    if valid {
        Ok(())
    } else {
        Err(SessionError::InvalidSessionId(key_id.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::key::Taxon;
    use tempfile::tempdir;

    fn sample_key() -> Key {
        let mut key = Key::new(vec![Taxon::new("t1", "Apis mellifera")], vec![], vec![]);
        key.id = Some("k1".into());
        key.taxa_count = 1;
        key.relevant_taxa_count = 1;
        key
    }

    #[test]
    fn test_memory_store_round_trip() {
        let store = MemorySessionStore::new();
        assert!(store.load("k1").unwrap().is_none());
        store.save("k1", &sample_key()).unwrap();
        assert_eq!(store.len(), 1);
        assert_eq!(store.load("k1").unwrap(), Some(sample_key()));
        assert!(store.remove("k1").unwrap());
        assert!(!store.remove("k1").unwrap());
        assert!(store.is_empty());
    }

    #[test]
    fn test_file_store_round_trip() {
        let dir = tempdir().unwrap();
        let store = FileSessionStore::open(dir.path().join("sessions")).unwrap();
        store.save("k1", &sample_key()).unwrap();
        assert_eq!(store.load("k1").unwrap(), Some(sample_key()));
        assert!(store.remove("k1").unwrap());
        assert!(store.load("k1").unwrap().is_none());
    }

    #[test]
    fn test_file_store_detects_tampering() {
        let dir = tempdir().unwrap();
        let store = FileSessionStore::open(dir.path()).unwrap();
        store.save("k1", &sample_key()).unwrap();

        let path = dir.path().join("k1.json");
        let text = fs::read_to_string(&path).unwrap();
        fs::write(&path, text.replace("Apis mellifera", "Apis cerana")).unwrap();

        assert!(matches!(
            store.load("k1"),
            Err(SessionError::Corrupted { key_id }) if key_id == "k1"
        ));
    }

    #[test]
    fn test_rejects_path_like_ids() {
        let dir = tempdir().unwrap();
        let store = FileSessionStore::open(dir.path()).unwrap();
        for id in ["", "../escape", "a/b", ".hidden"] {
            assert!(matches!(
                store.save(id, &sample_key()),
                Err(SessionError::InvalidSessionId(_))
            ));
        }
        assert!(validate_session_id("3f2a-key_v2:1").is_ok());
    }
}
