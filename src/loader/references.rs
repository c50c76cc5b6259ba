//! Dereferencing of lookup tables and statement reference checks

use std::collections::HashSet;

use crate::key::{
    Character, Key, KeyError, KeyResult, Linked, MediaElement, Organization, Person, Statement,
    StatementValue, Taxon,
};
use crate::observability::{log_event_with_fields, Event};

trait Identified {
    fn id(&self) -> &str;
}

impl Identified for Person {
    fn id(&self) -> &str {
        &self.id
    }
}

impl Identified for Organization {
    fn id(&self) -> &str {
        &self.id
    }
}

impl Identified for MediaElement {
    fn id(&self) -> &str {
        &self.id
    }
}

/// Replaces id links with the objects they name. Ids missing from the table
/// stay links.
fn resolve<T: Identified + Clone>(links: &mut [Linked<T>], table: &[T]) {
    for link in links.iter_mut() {
        if let Linked::Id(id) = link {
            if let Some(found) = table.iter().find(|item| item.id() == id.as_str()) {
                *link = Linked::Inline(found.clone());
            }
        }
    }
}

fn resolve_people(element: &mut MediaElement, persons: &[Person], organizations: &[Organization]) {
    resolve(&mut element.creators, persons);
    resolve(&mut element.contributors, persons);
    resolve(&mut element.publishers, organizations);
}

fn resolve_media(
    media: &mut [Linked<MediaElement>],
    elements: &[MediaElement],
    persons: &[Person],
    organizations: &[Organization],
) {
    resolve(media, elements);
    for link in media.iter_mut() {
        if let Linked::Inline(element) = link {
            resolve_people(element, persons, organizations);
        }
    }
}

/// Inlines `mediaElements`, `persons` and `organizations` wherever the key
/// refers to them by id
pub(crate) fn dereference(key: &mut Key) {
    let persons = std::mem::take(&mut key.persons);
    let organizations = std::mem::take(&mut key.organizations);

    for element in key.media_elements.iter_mut() {
        resolve_people(element, &persons, &organizations);
    }
    let elements = std::mem::take(&mut key.media_elements);

    resolve(&mut key.creators, &persons);
    resolve(&mut key.contributors, &persons);
    resolve(&mut key.publishers, &organizations);
    resolve_media(&mut key.media, &elements, &persons, &organizations);

    for character in key.characters.iter_mut() {
        resolve_media(&mut character.media, &elements, &persons, &organizations);
        for alternative in character.states.iter_mut() {
            resolve_media(&mut alternative.media, &elements, &persons, &organizations);
        }
    }
    dereference_taxa(&mut key.taxa, &elements, &persons, &organizations);

    key.persons = persons;
    key.organizations = organizations;
    key.media_elements = elements;
}

fn dereference_taxa(
    taxa: &mut [Taxon],
    elements: &[MediaElement],
    persons: &[Person],
    organizations: &[Organization],
) {
    for taxon in taxa.iter_mut() {
        resolve_media(&mut taxon.media, elements, persons, organizations);
        if let Some(children) = taxon.children.as_mut() {
            dereference_taxa(children, elements, persons, organizations);
        }
    }
}

/// Numerical alternatives need a full range to synthesize statements from
pub(crate) fn check_numerical_ranges(characters: &[Character]) -> KeyResult<()> {
    for character in characters.iter().filter(|c| c.is_numerical()) {
        if let Some(alternative) = character.states.iter().find(|a| a.range().is_none()) {
            return Err(KeyError::InvalidKey(format!(
                "numerical alternative '{}' of character '{}' needs min and max",
                alternative.id, character.id
            )));
        }
    }
    Ok(())
}

/// Checks every statement against the key's taxa and characters.
///
/// With `strict`, the first dangling statement fails the load. Otherwise
/// dangling statements are dropped and the number dropped is returned.
pub(crate) fn validate_references(key: &mut Key, strict: bool) -> KeyResult<usize> {
    let mut taxon_ids = HashSet::new();
    collect_taxon_ids(&key.taxa, &mut taxon_ids);

    let mut keep = Vec::with_capacity(key.statements.len());
    for statement in key.statements.iter() {
        let problem = if !taxon_ids.contains(statement.taxon_id.as_str()) {
            Some(format!("unknown taxon '{}'", statement.taxon_id))
        } else {
            match key.character(&statement.character_id) {
                None => Some(format!("unknown character '{}'", statement.character_id)),
                Some(character) => match &statement.value {
                    StatementValue::Alternative(id) if character.alternative(id).is_none() => {
                        Some(format!(
                            "alternative '{}' is not a state of '{}'",
                            id, character.id
                        ))
                    }
                    StatementValue::Range(_) if !character.is_numerical() => Some(format!(
                        "range given for categorical character '{}'",
                        character.id
                    )),
                    _ => None,
                },
            }
        };

        match problem {
            None => keep.push(true),
            Some(reason) => {
                let label = statement_label(statement);
                if strict {
                    return Err(KeyError::DanglingStatement {
                        statement: label,
                        reason,
                    });
                }
                log_event_with_fields(
                    Event::DanglingStatementDropped,
                    &[("statement", &label), ("reason", &reason)],
                );
                keep.push(false);
            }
        }
    }

    let dropped = keep.iter().filter(|k| !**k).count();
    let mut flags = keep.into_iter();
    key.statements.retain(|_| flags.next().unwrap_or(true));
    Ok(dropped)
}

fn statement_label(statement: &Statement) -> String {
    statement
        .id
        .clone()
        .unwrap_or_else(|| format!("{}/{}", statement.taxon_id, statement.character_id))
}

fn collect_taxon_ids<'a>(taxa: &'a [Taxon], ids: &mut HashSet<&'a str>) {
    for taxon in taxa {
        ids.insert(taxon.id.as_str());
        if let Some(children) = taxon.children.as_deref() {
            collect_taxon_ids(children, ids);
        }
    }
}
