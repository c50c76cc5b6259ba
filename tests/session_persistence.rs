//! Session Persistence Tests
//!
//! A working key must survive a save/restore cycle unchanged:
//! - Progress restored from disk matches the in-memory key
//! - Fields the engine does not model are carried through
//! - Tampered session files are refused, not silently reloaded

use std::fs;

use serde_json::{json, Value};
use taxakey::engine::{EngineOptions, IdentificationEngine};
use taxakey::key::{Answer, KeyError};
use taxakey::session::{open_session, FileSessionStore, SessionError, SessionStore};
use tempfile::TempDir;

// =============================================================================
// Helper Functions
// =============================================================================

fn setup_store() -> (TempDir, FileSessionStore) {
    let tmp = TempDir::new().unwrap();
    let store = FileSessionStore::open(tmp.path().join("sessions")).unwrap();
    (tmp, store)
}

fn raw_key() -> Value {
    json!({
        "id": "spiders",
        "title": { "en": "Spiders of the garden" },
        "revision": 7,
        "taxa": [
            { "id": "t1", "scientificName": "Araneus diadematus", "occurrences": 1200 },
            { "id": "t2", "scientificName": "Pisaura mirabilis" }
        ],
        "characters": [
            { "id": "web", "alternatives": [{ "id": "orb" }, { "id": "none" }] }
        ],
        "statements": [
            { "taxonId": "t1", "characterId": "web", "value": "orb" },
            { "taxonId": "t2", "characterId": "web", "value": "none" },
            { "taxonId": "t2", "characterId": "legs", "value": "long" }
        ]
    })
}

/// Ten taxa with fractional frequencies and ranges that print with many
/// significant digits
fn fractional_key() -> Value {
    let taxa: Vec<Value> = (0..10)
        .map(|i| json!({ "id": format!("t{}", i), "scientificName": format!("Species {}", i) }))
        .collect();
    let mut statements = Vec::new();
    for i in 0..10 {
        let taxon = format!("t{}", i);
        let frequency = ((i * 37 + 11) % 97) as f64 / 97.0;
        statements.push(json!({ "taxonId": taxon, "characterId": "shape", "value": "round", "frequency": frequency }));
        statements.push(json!({ "taxonId": taxon, "characterId": "shape", "value": "flat", "frequency": 1.0 - frequency / 3.0 }));
        let low = i as f64 / 3.0;
        statements.push(json!({ "taxonId": taxon, "characterId": "length", "value": [low, low + 0.1 + 1.0 / 7.0], "frequency": 0.3 }));
    }
    json!({
        "id": "fractions",
        "taxa": taxa,
        "characters": [
            { "id": "shape", "alternatives": [{ "id": "round" }, { "id": "flat" }] },
            { "id": "length", "type": "numerical", "alternatives": [{ "id": "len", "min": 0, "max": 10.1 }] },
            { "id": "texture", "type": "exclusive", "alternatives": [{ "id": "smooth" }] }
        ],
        "statements": statements
    })
}

// =============================================================================
// Round Trip Tests
// =============================================================================

#[test]
fn test_progress_survives_reopen() {
    let (tmp, store) = setup_store();
    let options = EngineOptions { strict_references: false, ..EngineOptions::default() };

    let key = open_session(&store, &raw_key(), 1, &options, false).unwrap();
    let engine = IdentificationEngine::for_key(&key, options, 1);
    let answered = engine.give_answers(&key, &[Answer::yes("orb")]).unwrap();
    store.save("spiders", &answered).unwrap();

    // a fresh store over the same directory sees the saved progress
    let reopened = FileSessionStore::open(tmp.path().join("sessions")).unwrap();
    let restored = open_session(&reopened, &raw_key(), 1, &options, false).unwrap();
    assert_eq!(restored, answered);
    assert_eq!(restored.relevant_taxa_count, 1);

    let refreshed = open_session(&reopened, &raw_key(), 1, &options, true).unwrap();
    assert_eq!(refreshed.relevant_taxa_count, 2);
}

#[test]
fn test_fractional_values_survive_reopen() {
    let (tmp, store) = setup_store();
    let options = EngineOptions::default();

    let key = open_session(&store, &fractional_key(), 1, &options, false).unwrap();
    let engine = IdentificationEngine::for_key(&key, options, 1);
    let answered = engine
        .give_answers(&key, &[Answer::range("len", 0.35, 1.15), Answer::no("flat")])
        .unwrap();
    store.save("fractions", &answered).unwrap();

    let reopened = FileSessionStore::open(tmp.path().join("sessions")).unwrap();
    let restored = reopened.load("fractions").unwrap().expect("stored session");
    assert_eq!(restored, answered);
    assert!(restored.statements.iter().any(|s| s.frequency > 0.0 && s.frequency < 1.0));

    // labels the engine treats as categorical are written back as given
    let stored: Value =
        serde_json::from_str(&fs::read_to_string(store.dir().join("fractions.json")).unwrap())
            .unwrap();
    assert_eq!(stored["key"]["characters"][2]["type"], "exclusive");
}

#[test]
fn test_unmodelled_fields_are_kept() {
    let (_tmp, store) = setup_store();
    let options = EngineOptions { strict_references: false, ..EngineOptions::default() };
    open_session(&store, &raw_key(), 1, &options, false).unwrap();

    let stored: Value =
        serde_json::from_str(&fs::read_to_string(store.dir().join("spiders.json")).unwrap())
            .unwrap();
    assert_eq!(stored["keyId"], "spiders");
    assert_eq!(stored["key"]["revision"], 7);
    assert_eq!(stored["key"]["taxa"][0]["occurrences"], 1200);
    assert_eq!(stored["key"]["title"]["en"], "Spiders of the garden");
}

// =============================================================================
// Reference Policy Tests
// =============================================================================

#[test]
fn test_strict_session_refuses_dangling_statement() {
    let (_tmp, store) = setup_store();
    let err = open_session(&store, &raw_key(), 1, &EngineOptions::default(), false).unwrap_err();
    assert!(matches!(err, SessionError::Key(KeyError::DanglingStatement { .. })));
    assert!(store.load("spiders").unwrap().is_none());
}

#[test]
fn test_lenient_session_drops_dangling_statement() {
    let (_tmp, store) = setup_store();
    let options = EngineOptions { strict_references: false, ..EngineOptions::default() };
    let key = open_session(&store, &raw_key(), 1, &options, false).unwrap();
    assert!(key.statements.iter().all(|s| s.character_id != "legs"));
}

// =============================================================================
// Corruption Tests
// =============================================================================

#[test]
fn test_tampered_session_is_refused() {
    let (_tmp, store) = setup_store();
    let options = EngineOptions { strict_references: false, ..EngineOptions::default() };
    open_session(&store, &raw_key(), 1, &options, false).unwrap();

    let path = store.dir().join("spiders.json");
    let mut stored: Value = serde_json::from_str(&fs::read_to_string(&path).unwrap()).unwrap();
    stored["key"]["relevantTaxaCount"] = json!(0);
    fs::write(&path, serde_json::to_string(&stored).unwrap()).unwrap();

    let err = store.load("spiders").unwrap_err();
    assert_eq!(err.code(), "TAXAKEY_SESSION_CORRUPTED");

    // a forced reload replaces the damaged file
    let key = open_session(&store, &raw_key(), 1, &options, true).unwrap();
    assert_eq!(store.load("spiders").unwrap(), Some(key));
}

