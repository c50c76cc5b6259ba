//! Answers and inference
//!
//! `give_answers` is the transition that mutates session state. It applies
//! explicit answers, derives the answers those force, and recomputes the
//! relevance of every character and the count of surviving taxa.
//!
//! Inferred values are not tagged apart from explicit ones. Retracting an
//! answer therefore re-derives every alternative the user has not answered,
//! instead of tracking which inferences depended on it.

use crate::key::{
    Answer, AnswerValue, Key, KeyError, KeyResult, Statement, StatementValue,
};
use crate::observability::{log_event_with_fields, Event};

use super::conflicts::{is_in_interval, remove_multistate_conflicts, set_taxa_conflicts};
use super::relevance::{
    get_relevant_taxa_count, get_result_taxa, is_relevant_for_all_taxa, relevant_taxon_ids,
    set_taxon_relevances,
};
use super::EngineOptions;

/// Applies `answers` in order, then infers and recomputes progress.
///
/// Fails without touching `key` if any answer names an unknown alternative.
pub fn give_answers(
    key: &Key,
    answers: &[Answer],
    relevant_only: bool,
    options: &EngineOptions,
) -> KeyResult<Key> {
    if let Some(unknown) = answers.iter().find(|a| key.locate_alternative(&a.id).is_none()) {
        return Err(KeyError::UnknownAlternative(unknown.id.clone()));
    }

    let mut next = key.clone();
    for given in answers {
        answer(&mut next, &given.id, given.value, options)?;
    }
    infer_alternatives(&mut next, relevant_only, options)?;
    finish_transition(&mut next);

    log_event_with_fields(
        Event::AnswersApplied,
        &[
            ("answers", &answers.len().to_string()),
            ("relevant_taxa", &next.relevant_taxa_count.to_string()),
        ],
    );
    Ok(next)
}

/// Marks an alternative as explicitly (un)answered and sets its value
pub(crate) fn answer(
    key: &mut Key,
    alternative_id: &str,
    value: Option<AnswerValue>,
    options: &EngineOptions,
) -> KeyResult<()> {
    let (ci, ai) = locate(key, alternative_id)?;
    key.characters[ci].states[ai].is_answered = value.is_some();

    set_fact(key, alternative_id, value, options)?;

    if value.is_none() {
        remove_inferences(key, options)?;
    }
    Ok(())
}

/// Sets an alternative's value, updates its character's answered flag and
/// the conflicts the value implies, then re-runs relevance over the tree
pub(crate) fn set_fact(
    key: &mut Key,
    alternative_id: &str,
    value: Option<AnswerValue>,
    options: &EngineOptions,
) -> KeyResult<()> {
    let (ci, ai) = locate(key, alternative_id)?;

    let character = &mut key.characters[ci];
    character.states[ai].answer_is = value;
    let truthy = value.map_or(false, |v| v.is_truthy());
    if truthy && character.has_answered_alternative() {
        character.is_answered = true;
    } else if !character.states.iter().any(|a| a.is_true()) {
        character.is_answered = false;
    }

    let character = &key.characters[ci];
    let alternative = &character.states[ai];
    let numerical = character.is_numerical();
    let selected = value.and_then(|v| v.as_range());

    let relevant_statements: Vec<&Statement> = key
        .statements
        .iter()
        .filter(|s| {
            if numerical {
                s.character_id == character.id
                    && match (&s.value, &selected) {
                        (_, None) => true,
                        (StatementValue::Range(range), Some(interval)) => {
                            is_in_interval(range, interval)
                        }
                        (StatementValue::Alternative(_), Some(_)) => false,
                    }
            } else {
                s.value.is_alternative(alternative_id)
            }
        })
        .collect();

    set_taxa_conflicts(&mut key.taxa, alternative, numerical, &relevant_statements);

    if options.allow_multistate {
        remove_multistate_conflicts(&mut key.taxa, alternative_id, character, &key.statements);
    }

    set_taxon_relevances(&mut key.taxa, false);
    Ok(())
}

/// Resets every alternative the user has not answered to unknown
pub(crate) fn remove_inferences(key: &mut Key, options: &EngineOptions) -> KeyResult<()> {
    let inferred: Vec<String> = key
        .characters
        .iter()
        .flat_map(|c| c.states.iter())
        .filter(|a| !a.is_answered)
        .map(|a| a.id.clone())
        .collect();

    for alternative_id in inferred {
        set_fact(key, &alternative_id, None, options)?;
    }
    Ok(())
}

/// Derives forced answers and marks which characters are still worth asking.
///
/// - An unknown alternative is false if a sibling is true, or if no
///   statement on a relevant taxon supports it.
/// - An unknown alternative of an unanswered character is true if it is the
///   last unknown sibling, or if every relevant statement says "always".
/// - A character with nothing answered is irrelevant once every alternative
///   is decided, or (with `relevant_only`) when some live taxon has no
///   statement for it. Otherwise its logical premise decides.
pub fn infer_alternatives(
    key: &mut Key,
    relevant_only: bool,
    options: &EngineOptions,
) -> KeyResult<()> {
    let relevant: Vec<usize> = {
        let live = relevant_taxon_ids(&key.taxa);
        key.statements
            .iter()
            .enumerate()
            .filter(|(_, s)| live.contains(s.taxon_id.as_str()))
            .map(|(i, _)| i)
            .collect()
    };

    for ci in 0..key.characters.len() {
        let negatives = negative_inferences(key, ci, &relevant);
        for alternative_id in negatives {
            set_fact(key, &alternative_id, Some(AnswerValue::Bool(false)), options)?;
        }
    }

    let unanswered: Vec<usize> = (0..key.characters.len())
        .filter(|&ci| !key.characters[ci].is_answered)
        .collect();
    for ci in unanswered {
        let positives = positive_inferences(key, ci, &relevant);
        for alternative_id in positives {
            set_fact(key, &alternative_id, Some(AnswerValue::Bool(true)), options)?;
        }
    }

    let relevance: Vec<bool> = key
        .characters
        .iter()
        .map(|character| {
            let undecided = character.states.iter().any(|a| a.is_unknown());
            let nothing_answered = !character.has_answered_alternative();
            let uninformative = relevant_only && {
                let statements: Vec<&Statement> = statements_of(key, &relevant)
                    .filter(|s| s.character_id == character.id)
                    .collect();
                !is_relevant_for_all_taxa(Some(&key.taxa), &statements)
            };

            if nothing_answered && (!undecided || uninformative) {
                false
            } else {
                character
                    .logical_premise
                    .as_ref()
                    .map_or(true, |premise| premise.evaluate(&key.characters))
            }
        })
        .collect();

    for (character, is_relevant) in key.characters.iter_mut().zip(relevance) {
        character.relevant = Some(is_relevant);
    }

    log_event_with_fields(
        Event::InferenceComplete,
        &[("relevant_statements", &relevant.len().to_string())],
    );
    Ok(())
}

fn negative_inferences(key: &Key, ci: usize, relevant: &[usize]) -> Vec<String> {
    let character = &key.characters[ci];
    let sibling_true = character.states.iter().any(|a| a.is_true());

    character
        .states
        .iter()
        .filter(|a| a.is_unknown())
        .filter(|a| {
            sibling_true
                || !statements_of(key, relevant).any(|s| {
                    s.frequency != 0.0
                        && if character.is_numerical() {
                            s.character_id == character.id
                        } else {
                            s.value.is_alternative(&a.id)
                        }
                })
        })
        .map(|a| a.id.clone())
        .collect()
}

fn positive_inferences(key: &Key, ci: usize, relevant: &[usize]) -> Vec<String> {
    let character = &key.characters[ci];
    let remaining = character.states.iter().filter(|a| a.is_unknown()).count();

    character
        .states
        .iter()
        .filter(|a| a.is_unknown())
        .filter(|a| {
            if character.is_numerical() {
                !statements_of(key, relevant)
                    .any(|s| s.character_id == character.id && s.frequency != 1.0)
            } else {
                remaining == 1
                    || !statements_of(key, relevant)
                        .any(|s| s.value.is_alternative(&a.id) && s.frequency != 1.0)
            }
        })
        .map(|a| a.id.clone())
        .collect()
}

fn statements_of<'a>(key: &'a Key, indices: &'a [usize]) -> impl Iterator<Item = &'a Statement> + 'a {
    indices.iter().map(move |&i| &key.statements[i])
}

/// Caches the relevant count and sets `results` once the identification
/// has narrowed to one taxon or nothing is left to ask
pub(crate) fn finish_transition(key: &mut Key) {
    key.relevant_taxa_count = get_relevant_taxa_count(&key.taxa);

    let open_question = key
        .characters
        .iter()
        .any(|c| !c.is_answered && c.relevant != Some(false));

    if key.relevant_taxa_count == 1 || !open_question {
        let results = get_result_taxa(&key.taxa);
        log_event_with_fields(Event::ResultsReached, &[("results", &results.len().to_string())]);
        key.results = Some(results);
    } else {
        key.results = None;
    }
}

/// Strips every inference and derives them again from the current tree
pub(crate) fn reinfer(key: &mut Key, relevant_only: bool, options: &EngineOptions) -> KeyResult<()> {
    remove_inferences(key, options)?;
    infer_alternatives(key, relevant_only, options)?;
    finish_transition(key);
    Ok(())
}

fn locate(key: &Key, alternative_id: &str) -> KeyResult<(usize, usize)> {
    key.locate_alternative(alternative_id)
        .ok_or_else(|| KeyError::UnknownAlternative(alternative_id.to_string()))
}
