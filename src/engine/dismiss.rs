//! User dismissal and allow-list filtering of taxa
//!
//! Each operation flips `dismissed` flags on a copy of the key, then rebuilds
//! relevance and every inference from scratch, since a dismissed taxon can
//! invalidate inferences that depended on it being live.

use std::collections::HashSet;

use crate::key::{Key, KeyError, KeyResult, Taxon};
use crate::observability::{log_event_with_fields, Event};

use super::inference::reinfer;
use super::relevance::{find_taxon_mut, set_taxon_relevances};
use super::EngineOptions;

/// Flips `dismissed` on the taxon with `taxon_id`, wherever it sits in the tree
pub fn toggle_taxon_dismissed(
    key: &Key,
    taxon_id: &str,
    relevant_only: bool,
    options: &EngineOptions,
) -> KeyResult<Key> {
    let mut next = key.clone();
    let taxon = find_taxon_mut(&mut next.taxa, taxon_id)
        .ok_or_else(|| KeyError::UnknownTaxon(taxon_id.to_string()))?;
    taxon.dismissed = !taxon.dismissed;
    let dismissed = taxon.dismissed;

    set_taxon_relevances(&mut next.taxa, false);
    reinfer(&mut next, relevant_only, options)?;

    log_event_with_fields(
        Event::TaxonDismissToggled,
        &[
            ("taxon_id", taxon_id),
            ("dismissed", if dismissed { "true" } else { "false" }),
            ("relevant_taxa", &next.relevant_taxa_count.to_string()),
        ],
    );
    Ok(next)
}

/// Dismisses taxa from an external taxonomy that are not on `ids`.
///
/// A taxon carrying an `externalReference` survives if its external id, or
/// any `ScientificNameId` in its higher classification, is listed. An
/// unlisted grouping whose children carry references is descended into
/// rather than dismissed outright. Taxa without a reference are untouched.
pub fn filter_taxa_by_ids(
    key: &Key,
    ids: &[String],
    relevant_only: bool,
    options: &EngineOptions,
) -> KeyResult<Key> {
    let allowed: HashSet<&str> = ids.iter().map(String::as_str).collect();
    let mut next = key.clone();
    let dismissed = dismiss_unlisted_references(&mut next.taxa, &allowed);

    finish_filter(next, dismissed, relevant_only, options)
}

fn dismiss_unlisted_references(taxa: &mut [Taxon], allowed: &HashSet<&str>) -> usize {
    let mut dismissed = 0;
    for taxon in taxa.iter_mut() {
        let reference = match &taxon.external_reference {
            Some(reference) => reference.external_id_string(),
            None => continue,
        };
        let listed = allowed.contains(reference.as_str())
            || taxon
                .higher_classification
                .iter()
                .any(|h| allowed.contains(h.scientific_name_id.as_str()));
        if listed {
            continue;
        }

        match taxon.children.as_mut() {
            Some(children) if children.iter().any(|c| c.external_reference.is_some()) => {
                dismissed += dismiss_unlisted_references(children, allowed);
            }
            _ => {
                if !taxon.dismissed {
                    taxon.dismissed = true;
                    dismissed += 1;
                }
            }
        }
    }
    dismissed
}

/// Dismisses taxa whose scientific name is not in `names`.
///
/// Without `keep_common`, every endpoint (result or leaf) not listed is
/// dismissed. With it, only top-level taxa that contain no listed endpoint
/// anywhere below them are dismissed, keeping the shared ancestors intact.
pub fn filter_taxa_by_names(
    key: &Key,
    names: &[String],
    keep_common: bool,
    relevant_only: bool,
    options: &EngineOptions,
) -> KeyResult<Key> {
    let keep: HashSet<&str> = names.iter().map(String::as_str).collect();
    let mut next = key.clone();

    let dismissed = if keep_common {
        let mut count = 0;
        for taxon in next.taxa.iter_mut() {
            if !contains_taxon(taxon, &keep) && !taxon.dismissed {
                taxon.dismissed = true;
                count += 1;
            }
        }
        count
    } else {
        dismiss_all_except(&mut next.taxa, &keep)
    };

    finish_filter(next, dismissed, relevant_only, options)
}

fn dismiss_all_except(taxa: &mut [Taxon], keep: &HashSet<&str>) -> usize {
    let mut dismissed = 0;
    for taxon in taxa.iter_mut() {
        if taxon.is_endpoint() {
            if !keep.contains(taxon.scientific_name.as_str()) && !taxon.dismissed {
                taxon.dismissed = true;
                dismissed += 1;
            }
        } else if let Some(children) = taxon.children.as_mut() {
            dismissed += dismiss_all_except(children, keep);
        }
    }
    dismissed
}

fn contains_taxon(taxon: &Taxon, names: &HashSet<&str>) -> bool {
    match taxon.children.as_deref() {
        Some(children) if !taxon.is_result => children.iter().any(|c| contains_taxon(c, names)),
        _ => names.contains(taxon.scientific_name.as_str()),
    }
}

fn finish_filter(
    mut key: Key,
    dismissed: usize,
    relevant_only: bool,
    options: &EngineOptions,
) -> KeyResult<Key> {
    set_taxon_relevances(&mut key.taxa, false);
    reinfer(&mut key, relevant_only, options)?;

    log_event_with_fields(
        Event::TaxaFiltered,
        &[
            ("dismissed", &dismissed.to_string()),
            ("relevant_taxa", &key.relevant_taxa_count.to_string()),
        ],
    );
    Ok(key)
}

/// Whether any taxon in the tree has `scientific_name`
pub fn is_part_of_key(taxa: &[Taxon], scientific_name: &str) -> bool {
    taxa.iter().any(|taxon| {
        taxon.scientific_name == scientific_name
            || taxon
                .children
                .as_deref()
                .map_or(false, |children| is_part_of_key(children, scientific_name))
    })
}
