//! # Key loader
//!
//! Turns a raw key (as served or cached) into a working [`Key`]:
//!
//! 1. `taxa`, `characters` and `statements` must be present
//! 2. `alternatives` is accepted in place of `states`
//! 3. lookup tables are inlined where referenced by id
//! 4. taxa start relevant and conflict-free
//! 5. statements are checked against the tree
//! 6. closed-world statements are synthesized
//! 7. an empty answer set establishes the baseline, and `taxaCount` is
//!    fixed to the relevant count at that point

mod references;
mod synthesis;

use serde_json::Value;

use crate::engine::{give_answers, is_relevant_only, EngineOptions};
use crate::key::{Key, KeyError, KeyResult, Taxon};
use crate::observability::{log_event_with_fields, Event};

const REQUIRED_FIELDS: [&str; 3] = ["statements", "characters", "taxa"];

/// Loads a raw key, reading relevant-only from its `mode` (or `default_mode`)
pub fn load_key_in_mode(raw: &Value, default_mode: u8, options: &EngineOptions) -> KeyResult<Key> {
    load_key(raw, is_relevant_only(key_mode(raw, default_mode)), options)
}

/// The key's own `mode`, when it carries one
pub fn key_mode(raw: &Value, default_mode: u8) -> u8 {
    raw.get("mode")
        .and_then(Value::as_u64)
        .and_then(|m| u8::try_from(m).ok())
        .unwrap_or(default_mode)
}

/// Loads a raw key into a working key with its baseline computed
pub fn load_key(raw: &Value, relevant_only: bool, options: &EngineOptions) -> KeyResult<Key> {
    let key_id = raw.get("id").and_then(Value::as_str).unwrap_or("<anonymous>");
    log_event_with_fields(Event::KeyLoadBegin, &[("key_id", key_id)]);

    match build(raw, relevant_only, options) {
        Ok((key, dropped)) => {
            log_event_with_fields(
                Event::KeyLoaded,
                &[
                    ("key_id", key_id),
                    ("taxa", &key.taxa_count.to_string()),
                    ("characters", &key.characters.len().to_string()),
                    ("statements", &key.statements.len().to_string()),
                    ("dropped", &dropped.to_string()),
                ],
            );
            Ok(key)
        }
        Err(err) => {
            log_event_with_fields(
                Event::KeyRejected,
                &[("key_id", key_id), ("code", err.code()), ("reason", &err.to_string())],
            );
            Err(err)
        }
    }
}

/// Builds the working key, also returning how many dangling statements were
/// dropped
fn build(raw: &Value, relevant_only: bool, options: &EngineOptions) -> KeyResult<(Key, usize)> {
    let object = raw
        .as_object()
        .ok_or_else(|| KeyError::InvalidKey("key must be a JSON object".to_string()))?;
    for field in REQUIRED_FIELDS {
        if object.get(field).map_or(true, Value::is_null) {
            return Err(KeyError::MalformedKey { field });
        }
    }

    let mut canonical = raw.clone();
    canonicalize_states(&mut canonical);
    let mut key: Key =
        serde_json::from_value(canonical).map_err(|e| KeyError::InvalidKey(e.to_string()))?;

    references::dereference(&mut key);
    init_taxa(&mut key.taxa);
    references::check_numerical_ranges(&key.characters)?;
    let dropped = references::validate_references(&mut key, options.strict_references)?;

    let added = synthesis::synthesize_statements(&key)?;
    log_event_with_fields(
        Event::StatementsSynthesized,
        &[("count", &added.len().to_string())],
    );
    key.statements.extend(added);

    let mut key = give_answers(&key, &[], relevant_only, options)?;
    key.taxa_count = key.relevant_taxa_count;
    Ok((key, dropped))
}

/// Moves a character's `alternatives` under `states` when `states` is absent
fn canonicalize_states(raw: &mut Value) {
    let characters = match raw.get_mut("characters").and_then(Value::as_array_mut) {
        Some(characters) => characters,
        None => return,
    };
    for character in characters.iter_mut().filter_map(Value::as_object_mut) {
        if let Some(alternatives) = character.remove("alternatives") {
            if character.get("states").map_or(true, Value::is_null) {
                character.insert("states".to_string(), alternatives);
            }
        }
    }
}

fn init_taxa(taxa: &mut [Taxon]) {
    for taxon in taxa.iter_mut() {
        taxon.conflicts.clear();
        taxon.is_relevant = true;
        taxon.is_irrelevant = false;
        if let Some(children) = taxon.children.as_mut() {
            init_taxa(children);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn raw_key() -> Value {
        json!({
            "id": "k1",
            "taxa": [
                { "id": "t1", "scientificName": "A", "conflicts": ["stale"] },
                { "id": "t2", "scientificName": "B" }
            ],
            "characters": [
                { "id": "c1", "alternatives": [{ "id": "a1" }, { "id": "a2" }] }
            ],
            "statements": [
                { "taxonId": "t1", "characterId": "c1", "value": "a1" },
                { "taxonId": "t2", "characterId": "c1", "value": "a2", "frequency": 1 }
            ]
        })
    }

    #[test]
    fn test_missing_collection_is_malformed() {
        for field in REQUIRED_FIELDS {
            let mut raw = raw_key();
            raw.as_object_mut().unwrap().remove(field);
            let err = load_key(&raw, false, &EngineOptions::default()).unwrap_err();
            assert_eq!(err, KeyError::MalformedKey { field });
        }

        let mut raw = raw_key();
        raw["taxa"] = Value::Null;
        assert!(matches!(
            load_key(&raw, false, &EngineOptions::default()),
            Err(KeyError::MalformedKey { field: "taxa" })
        ));
    }

    #[test]
    fn test_alternatives_become_states() {
        let key = load_key(&raw_key(), false, &EngineOptions::default()).unwrap();
        assert_eq!(key.characters[0].states.len(), 2);
        let back = serde_json::to_value(&key).unwrap();
        assert!(back["characters"][0].get("alternatives").is_none());
        assert!(back["characters"][0]["states"].is_array());
    }

    #[test]
    fn test_baseline_counts() {
        let key = load_key(&raw_key(), false, &EngineOptions::default()).unwrap();
        assert!(key.taxa.iter().all(|t| t.conflicts.is_empty()));
        assert_eq!(key.taxa_count, 2);
        assert_eq!(key.relevant_taxa_count, 2);
        assert_eq!(key.statements.len(), 4);
        assert!(key.statements.iter().all(|s| s.frequency == 0.0 || s.frequency == 1.0));
    }

    #[test]
    fn test_lenient_build_counts_dropped_statements() {
        let mut raw = raw_key();
        raw["statements"]
            .as_array_mut()
            .unwrap()
            .push(json!({ "taxonId": "t9", "characterId": "c1", "value": "a1" }));
        let options = EngineOptions { strict_references: false, ..EngineOptions::default() };

        let (key, dropped) = build(&raw, false, &options).unwrap();
        assert_eq!(dropped, 1);
        assert!(key.statements.iter().all(|s| s.taxon_id != "t9"));

        let (_, dropped) = build(&raw_key(), false, &options).unwrap();
        assert_eq!(dropped, 0);
    }

    #[test]
    fn test_undecodable_key_is_invalid() {
        let mut raw = raw_key();
        raw["characters"][0]["logicalPremise"] = json!({ "XOR": ["a1"] });
        assert!(matches!(
            load_key(&raw, false, &EngineOptions::default()),
            Err(KeyError::InvalidKey(_))
        ));
        assert!(matches!(
            load_key(&json!([1, 2]), false, &EngineOptions::default()),
            Err(KeyError::InvalidKey(_))
        ));
    }

    #[test]
    fn test_mode_read_from_key() {
        let mut raw = raw_key();
        assert_eq!(key_mode(&raw, 1), 1);
        raw["mode"] = json!(2);
        assert_eq!(key_mode(&raw, 1), 2);
        assert!(load_key_in_mode(&raw, 1, &EngineOptions::default()).is_ok());
    }
}
