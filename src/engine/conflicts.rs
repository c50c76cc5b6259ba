//! Per-taxon conflict bookkeeping
//!
//! A conflict records that an alternative's current answer contradicts the
//! evidence for a taxon. Conflicts are keyed by alternative id, and a taxon
//! is excluded exactly while its conflict set is non-empty.

use crate::key::{Alternative, Character, NumericRange, Statement, StatementValue, Taxon};

use super::relevance::for_each_taxon_mut;

/// True if the statement's recorded range overlaps the selected interval
pub fn is_in_interval(value: &NumericRange, interval: &NumericRange) -> bool {
    value.overlaps(interval)
}

/// Adds or removes the conflict for `alternative` on every taxon.
///
/// `relevant_statements` are the statements matching the alternative (for a
/// numerical character, those whose range overlaps the selected interval).
pub fn set_taxa_conflicts(
    taxa: &mut [Taxon],
    alternative: &Alternative,
    numerical: bool,
    relevant_statements: &[&Statement],
) {
    for_each_taxon_mut(taxa, &mut |taxon: &mut Taxon| {
        if numerical {
            set_numerical_conflict(taxon, alternative, relevant_statements);
        } else {
            set_categorical_conflict(taxon, alternative, relevant_statements);
        }
    });
}

fn set_numerical_conflict(taxon: &mut Taxon, alternative: &Alternative, statements: &[&Statement]) {
    // only a selected interval excludes anything
    let selected = alternative.answer_is.and_then(|a| a.as_range());
    if selected.is_none() {
        taxon.remove_conflict(&alternative.id);
        return;
    }

    let supported = statements
        .iter()
        .any(|s| s.taxon_id == taxon.id && s.frequency > 0.0);
    if supported {
        taxon.remove_conflict(&alternative.id);
    } else {
        taxon.add_conflict(&alternative.id);
    }
}

fn set_categorical_conflict(taxon: &mut Taxon, alternative: &Alternative, statements: &[&Statement]) {
    let answer = match alternative.answer_is {
        Some(answer) if alternative.is_answered => answer,
        _ => {
            taxon.remove_conflict(&alternative.id);
            return;
        }
    };

    let contradicting = if answer.is_truthy() { 0.0 } else { 1.0 };
    let contradicted = statements
        .iter()
        .any(|s| s.taxon_id == taxon.id && s.frequency == contradicting);
    if contradicted {
        taxon.add_conflict(&alternative.id);
    } else {
        taxon.remove_conflict(&alternative.id);
    }
}

/// Clears a conflict against `alternative_id` once every alternative of
/// `character` is decided and the taxon has more positive statements on
/// alternatives answered false than there are answered alternatives; such a
/// taxon can legitimately show several states at once.
pub fn remove_multistate_conflicts(
    taxa: &mut [Taxon],
    alternative_id: &str,
    character: &Character,
    statements: &[Statement],
) {
    let answered = character.states.iter().filter(|a| !a.is_unknown()).count();
    if answered != character.states.len() {
        return;
    }

    for_each_taxon_mut(taxa, &mut |taxon: &mut Taxon| {
        if !taxon.has_conflict(alternative_id) {
            return;
        }
        let remaining = statements
            .iter()
            .filter(|s| {
                s.taxon_id == taxon.id && s.character_id == character.id && s.frequency > 0.0
            })
            .filter(|s| match &s.value {
                StatementValue::Alternative(id) => character
                    .alternative(id)
                    .map_or(false, |a| a.answer_is.map_or(false, |v| !v.is_truthy())),
                StatementValue::Range(_) => false,
            })
            .count();
        if remaining > answered {
            taxon.remove_conflict(alternative_id);
        }
    });
}
