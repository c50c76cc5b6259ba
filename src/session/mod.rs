//! # Sessions
//!
//! Keeps a working key between host invocations. The engine never touches a
//! store itself; hosts load, transition and save.

mod checksum;
mod errors;
mod store;

pub use checksum::{compute_checksum, verify_checksum};
pub use errors::{SessionError, SessionResult};
pub use store::{validate_session_id, FileSessionStore, MemorySessionStore, SessionStore};

use serde_json::Value;
use uuid::Uuid;

use crate::engine::EngineOptions;
use crate::key::Key;
use crate::loader::load_key_in_mode;

/// Restores the stored session for `raw`'s key id, or loads `raw` afresh.
///
/// A fresh load happens when nothing is stored or `force_refresh` is set, and
/// is saved before returning. A raw key without an id gets a generated one,
/// so every session has an id to be addressed by.
pub fn open_session(
    store: &dyn SessionStore,
    raw: &Value,
    default_mode: u8,
    options: &EngineOptions,
    force_refresh: bool,
) -> SessionResult<Key> {
    let key_id = raw
        .get("id")
        .and_then(Value::as_str)
        .map(str::to_string)
        .unwrap_or_else(|| Uuid::new_v4().to_string());
    validate_session_id(&key_id)?;

    if !force_refresh {
        if let Some(key) = store.load(&key_id)? {
            return Ok(key);
        }
    }

    let mut key = load_key_in_mode(raw, default_mode, options)?;
    key.id = Some(key_id.clone());
    store.save(&key_id, &key)?;
    Ok(key)
}

/// The id a working key is stored under
pub fn session_id(key: &Key) -> Option<&str> {
    key.id.as_deref()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::key::Answer;
    use crate::engine::give_answers;
    use serde_json::json;

    fn raw() -> Value {
        json!({
            "id": "bees",
            "taxa": [{ "id": "t1", "scientificName": "A" }, { "id": "t2", "scientificName": "B" }],
            "characters": [{ "id": "c1", "states": [{ "id": "a1" }, { "id": "a2" }] }],
            "statements": [
                { "taxonId": "t1", "characterId": "c1", "value": "a1" },
                { "taxonId": "t2", "characterId": "c1", "value": "a2" }
            ]
        })
    }

    #[test]
    fn test_open_restores_saved_progress() {
        let store = MemorySessionStore::new();
        let options = EngineOptions::default();
        let key = open_session(&store, &raw(), 1, &options, false).unwrap();
        assert_eq!(key.relevant_taxa_count, 2);

        let answered = give_answers(&key, &[Answer::yes("a1")], false, &options).unwrap();
        store.save("bees", &answered).unwrap();

        let restored = open_session(&store, &raw(), 1, &options, false).unwrap();
        assert_eq!(restored.relevant_taxa_count, 1);

        let refreshed = open_session(&store, &raw(), 1, &options, true).unwrap();
        assert_eq!(refreshed.relevant_taxa_count, 2);
        assert_eq!(store.load("bees").unwrap(), Some(refreshed));
    }

    #[test]
    fn test_open_generates_missing_id() {
        let store = MemorySessionStore::new();
        let mut raw = raw();
        raw.as_object_mut().unwrap().remove("id");
        let key = open_session(&store, &raw, 1, &EngineOptions::default(), false).unwrap();
        let id = session_id(&key).unwrap().to_string();
        assert!(Uuid::parse_str(&id).is_ok());
        assert!(store.load(&id).unwrap().is_some());
    }

    #[test]
    fn test_open_propagates_load_failure() {
        let store = MemorySessionStore::new();
        let err = open_session(&store, &json!({ "id": "x" }), 1, &EngineOptions::default(), false)
            .unwrap_err();
        assert_eq!(err.code(), "TAXAKEY_MALFORMED_KEY");
        assert!(store.is_empty());
    }
}
