//! Progress and selection reporting for hosts

use serde::Serialize;

use crate::key::{Character, Key};

/// What a host needs to render the current step of an identification
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CharacterState {
    pub key: Key,
    /// Characters the user has answered
    pub selected: Vec<Character>,
    /// Characters still worth asking
    pub remaining: Vec<Character>,
    /// 0 to 100
    pub progress: f64,
}

pub fn character_state(key: &Key) -> CharacterState {
    let selected = key
        .characters
        .iter()
        .filter(|c| is_selected(c))
        .cloned()
        .collect();
    let remaining = key
        .characters
        .iter()
        .filter(|c| !is_selected(c) && c.relevant != Some(false))
        .cloned()
        .collect();

    CharacterState {
        key: key.clone(),
        selected,
        remaining,
        progress: progress(key),
    }
}

fn is_selected(character: &Character) -> bool {
    character.is_answered || character.has_answered_alternative()
}

/// Share of the starting taxa eliminated so far, as a percentage.
///
/// Exactly one relevant taxon left is 100; none left, or an empty key, is 0.
pub fn progress(key: &Key) -> f64 {
    if key.relevant_taxa_count == 1 {
        return 100.0;
    }
    if key.relevant_taxa_count == 0 || key.taxa_count == 0 {
        return 0.0;
    }
    let remaining = key.relevant_taxa_count as f64 / key.taxa_count as f64 * 100.0;
    // only a single survivor reports 100
    (100.0 - remaining).clamp(0.0, 99.999)
}
