//! CLI command implementations
//!
//! Each command operates on one stored session and prints one JSON
//! response. The session is saved after every transition.

use std::path::Path;

use serde_json::{json, Value};

use crate::config::Config;
use crate::engine::IdentificationEngine;
use crate::key::{Answer, AnswerValue, Key, NumericRange};
use crate::observability::init_logging;
use crate::progress::{character_state, CharacterState};
use crate::session::{open_session, FileSessionStore, SessionStore};

use super::args::{Cli, Command};
use super::errors::{CliError, CliResult};
use super::io::{read_key_file, write_error, write_response};

/// Main CLI entry point
///
/// Parses arguments, loads the configuration, installs the log subscriber
/// and dispatches to the appropriate command. Failures are also reported
/// as a JSON error response on stdout.
pub fn run() -> CliResult<()> {
    let cli = Cli::parse_args();
    let result = Config::load(&cli.config).and_then(|config| {
        init_logging(&config.log_level);
        config.log_loaded();
        write_response(run_command(&config, cli.command)?)
    });
    if let Err(e) = &result {
        write_error(e.code_str(), e.message())?;
    }
    result
}

/// Run one command against the configured session directory and return the
/// response body
pub fn run_command(config: &Config, cmd: Command) -> CliResult<Value> {
    let store = FileSessionStore::open(config.session_path())?;
    let data = match cmd {
        Command::Load { key, force } => load(config, &store, &key, force)?,
        Command::Answer {
            session,
            alternatives,
            values,
        } => answer(config, &store, &session, &alternatives, &values)?,
        Command::Dismiss { session, taxon } => dismiss(config, &store, &session, &taxon)?,
        Command::Filter {
            session,
            ids,
            names,
            keep_common,
        } => filter(config, &store, &session, &ids, &names, keep_common)?,
        Command::State { session } => state(&store, &session)?,
        Command::Reset { session } => reset(&store, &session)?,
    };
    Ok(data)
}

/// Open (or restore) the session for a raw key file
pub fn load(config: &Config, store: &dyn SessionStore, path: &Path, force: bool) -> CliResult<Value> {
    let raw = read_key_file(path)?;
    let key = open_session(
        store,
        &raw,
        config.default_key_mode,
        &config.engine_options(),
        force,
    )?;
    Ok(summarize(&character_state(&key)))
}

/// Apply `--alternative`/`--value` pairs in order
pub fn answer(
    config: &Config,
    store: &dyn SessionStore,
    session: &str,
    alternatives: &[String],
    values: &[String],
) -> CliResult<Value> {
    if alternatives.len() != values.len() {
        return Err(CliError::invalid_argument(format!(
            "{} alternatives but {} values; give one --value per --alternative",
            alternatives.len(),
            values.len()
        )));
    }
    let answers = alternatives
        .iter()
        .zip(values)
        .map(|(id, value)| Ok(Answer::new(id.as_str(), parse_answer_value(value)?)))
        .collect::<CliResult<Vec<_>>>()?;

    transition(config, store, session, |engine, key| engine.give_answers(key, &answers))
}

pub fn dismiss(config: &Config, store: &dyn SessionStore, session: &str, taxon: &str) -> CliResult<Value> {
    transition(config, store, session, |engine, key| {
        engine.toggle_taxon_dismissed(key, taxon)
    })
}

pub fn filter(
    config: &Config,
    store: &dyn SessionStore,
    session: &str,
    ids: &[String],
    names: &[String],
    keep_common: bool,
) -> CliResult<Value> {
    match (ids.is_empty(), names.is_empty()) {
        (false, true) => transition(config, store, session, |engine, key| {
            engine.filter_taxa_by_ids(key, ids)
        }),
        (true, false) => transition(config, store, session, |engine, key| {
            engine.filter_taxa_by_names(key, names, keep_common)
        }),
        _ => Err(CliError::invalid_argument(
            "filter needs exactly one of --ids or --names",
        )),
    }
}

pub fn state(store: &dyn SessionStore, session: &str) -> CliResult<Value> {
    let key = stored(store, session)?;
    Ok(summarize(&character_state(&key)))
}

pub fn reset(store: &dyn SessionStore, session: &str) -> CliResult<Value> {
    let removed = store.remove(session)?;
    Ok(json!({ "session": session, "removed": removed }))
}

fn stored(store: &dyn SessionStore, session: &str) -> CliResult<Key> {
    store
        .load(session)?
        .ok_or_else(|| CliError::session_not_found(session))
}

/// Load, apply one engine transition, save, and summarize
fn transition<F>(config: &Config, store: &dyn SessionStore, session: &str, apply: F) -> CliResult<Value>
where
    F: FnOnce(&IdentificationEngine, &Key) -> crate::key::KeyResult<Key>,
{
    let key = stored(store, session)?;
    let engine = IdentificationEngine::for_key(&key, config.engine_options(), config.default_key_mode);
    let next = apply(&engine, &key)?;
    store.save(session, &next)?;
    Ok(summarize(&character_state(&next)))
}

/// Parses `true`, `false`, `none` (retract) or `min,max`
pub fn parse_answer_value(raw: &str) -> CliResult<Option<AnswerValue>> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "true" | "yes" => Ok(Some(AnswerValue::Bool(true))),
        "false" | "no" => Ok(Some(AnswerValue::Bool(false))),
        "none" | "" => Ok(None),
        other => {
            let bounds: Vec<&str> = other.split(',').map(str::trim).collect();
            let parsed = match bounds.as_slice() {
                [min, max] => min.parse::<f64>().ok().zip(max.parse::<f64>().ok()),
                _ => None,
            };
            match parsed {
                Some((min, max)) if min <= max => {
                    Ok(Some(AnswerValue::Range(NumericRange::new(min, max))))
                }
                _ => Err(CliError::invalid_argument(format!(
                    "Invalid value '{}'. Use true, false, none or min,max.",
                    raw
                ))),
            }
        }
    }
}

/// Compact view of a session for the response body
fn summarize(state: &CharacterState) -> Value {
    let key = &state.key;
    let ids = |characters: &[crate::key::Character]| {
        characters.iter().map(|c| c.id.clone()).collect::<Vec<_>>()
    };
    let results = key.results.as_ref().map(|taxa| {
        taxa.iter()
            .map(|t| json!({ "id": t.id, "scientificName": t.scientific_name }))
            .collect::<Vec<_>>()
    });

    json!({
        "session": key.id,
        "progress": state.progress,
        "taxaCount": key.taxa_count,
        "relevantTaxaCount": key.relevant_taxa_count,
        "selected": ids(&state.selected),
        "remaining": ids(&state.remaining),
        "results": results,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::MemorySessionStore;
    use std::fs;
    use tempfile::tempdir;

    fn write_key(dir: &Path) -> std::path::PathBuf {
        let path = dir.join("bees.json");
        let raw = json!({
            "id": "bees",
            "taxa": [
                { "id": "t1", "scientificName": "Apis mellifera" },
                { "id": "t2", "scientificName": "Bombus terrestris" }
            ],
            "characters": [{ "id": "c1", "states": [{ "id": "a1" }, { "id": "a2" }] }],
            "statements": [
                { "taxonId": "t1", "characterId": "c1", "value": "a1" },
                { "taxonId": "t2", "characterId": "c1", "value": "a2" }
            ]
        });
        fs::write(&path, raw.to_string()).unwrap();
        path
    }

    #[test]
    fn test_parse_answer_value() {
        assert_eq!(parse_answer_value("true").unwrap(), Some(AnswerValue::Bool(true)));
        assert_eq!(parse_answer_value("False").unwrap(), Some(AnswerValue::Bool(false)));
        assert_eq!(parse_answer_value("none").unwrap(), None);
        assert_eq!(
            parse_answer_value("6, 8").unwrap(),
            Some(AnswerValue::Range(NumericRange::new(6.0, 8.0)))
        );
        assert!(parse_answer_value("8,6").is_err());
        assert!(parse_answer_value("maybe").is_err());
    }

    #[test]
    fn test_load_answer_state_reset() {
        let dir = tempdir().unwrap();
        let config = Config::default();
        let store = MemorySessionStore::new();

        let loaded = load(&config, &store, &write_key(dir.path()), false).unwrap();
        assert_eq!(loaded["session"], "bees");
        assert_eq!(loaded["relevantTaxaCount"], 2);
        assert_eq!(loaded["remaining"], json!(["c1"]));

        let answered = answer(&config, &store, "bees", &["a1".into()], &["true".into()]).unwrap();
        assert_eq!(answered["relevantTaxaCount"], 1);
        assert_eq!(answered["progress"], 100.0);
        assert_eq!(answered["results"][0]["scientificName"], "Apis mellifera");

        assert_eq!(state(&store, "bees").unwrap()["relevantTaxaCount"], 1);
        assert_eq!(reset(&store, "bees").unwrap()["removed"], true);
        assert_eq!(
            state(&store, "bees").unwrap_err().code_str(),
            "TAXAKEY_CLI_SESSION_NOT_FOUND"
        );
    }

    #[test]
    fn test_run_command_uses_configured_session_dir() {
        let dir = tempdir().unwrap();
        let config = Config {
            session_dir: dir.path().join("sessions").to_string_lossy().into_owned(),
            ..Config::default()
        };

        let loaded = run_command(
            &config,
            Command::Load { key: write_key(dir.path()), force: false },
        )
        .unwrap();
        assert_eq!(loaded["relevantTaxaCount"], 2);
        assert!(dir.path().join("sessions").join("bees.json").exists());

        let removed = run_command(&config, Command::Reset { session: "bees".into() }).unwrap();
        assert_eq!(removed["removed"], true);
    }

    #[test]
    fn test_mismatched_pairs_rejected() {
        let store = MemorySessionStore::new();
        let err = answer(&Config::default(), &store, "bees", &["a1".into()], &[]).unwrap_err();
        assert_eq!(err.code_str(), "TAXAKEY_CLI_INVALID_ARGUMENT");
    }

    #[test]
    fn test_failed_transition_keeps_stored_session() {
        let dir = tempdir().unwrap();
        let config = Config::default();
        let store = MemorySessionStore::new();
        load(&config, &store, &write_key(dir.path()), false).unwrap();

        let err = dismiss(&config, &store, "bees", "nope").unwrap_err();
        assert_eq!(err.code_str(), "TAXAKEY_UNKNOWN_TAXON");
        assert_eq!(state(&store, "bees").unwrap()["relevantTaxaCount"], 2);

        let filtered = filter(&config, &store, "bees", &[], &["Bombus terrestris".into()], false)
            .unwrap();
        assert_eq!(filtered["relevantTaxaCount"], 1);
    }
}
