//! Closed-world statement synthesis
//!
//! A taxon with evidence for a character but none for one of its
//! alternatives is taken to never show that alternative.

use std::collections::HashSet;

use crate::key::{Key, KeyError, KeyResult, Statement, StatementValue};

/// Frequency-0 statements for every (character, alternative, taxon) gap.
///
/// Numerical characters never match an alternative by id, so every taxon
/// with a statement on one gets a `[min, max]` statement of frequency 0.
pub(crate) fn synthesize_statements(key: &Key) -> KeyResult<Vec<Statement>> {
    let mut added = Vec::new();

    for character in &key.characters {
        let mut seen = HashSet::new();
        let taxa_with_character: Vec<&str> = key
            .statements
            .iter()
            .filter(|s| s.character_id == character.id)
            .map(|s| s.taxon_id.as_str())
            .filter(|id| seen.insert(*id))
            .collect();
        if taxa_with_character.is_empty() {
            continue;
        }

        for alternative in &character.states {
            let taxa_with_alternative: HashSet<&str> = key
                .statements
                .iter()
                .filter(|s| s.value.is_alternative(&alternative.id))
                .map(|s| s.taxon_id.as_str())
                .collect();

            let value = if character.is_numerical() {
                let range = alternative.range().ok_or_else(|| {
                    KeyError::InvalidKey(format!(
                        "numerical alternative '{}' needs min and max",
                        alternative.id
                    ))
                })?;
                StatementValue::Range(range)
            } else {
                StatementValue::Alternative(alternative.id.clone())
            };

            for taxon_id in taxa_with_character
                .iter()
                .filter(|id| !taxa_with_alternative.contains(*id))
            {
                let mut statement =
                    Statement::new(*taxon_id, character.id.as_str(), value.clone(), 0.0);
                statement.id = Some(format!("statement:{}_{}_0", alternative.id, taxon_id));
                added.push(statement);
            }
        }
    }
    Ok(added)
}
