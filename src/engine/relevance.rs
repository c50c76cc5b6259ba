//! Relevance propagation over the taxon tree
//!
//! A single post-order pass per call. An excluded ancestor forces its
//! descendants' baseline irrelevance; a grouping stays relevant only while
//! some child is relevant.

use std::collections::HashSet;

use crate::key::{Statement, Taxon};

/// Recomputes `is_relevant`/`is_irrelevant` for a forest
pub fn set_taxon_relevances(taxa: &mut [Taxon], already_irrelevant: bool) {
    for taxon in taxa.iter_mut() {
        set_branch_relevances(taxon, already_irrelevant);
    }
}

fn set_branch_relevances(taxon: &mut Taxon, already_irrelevant: bool) {
    taxon.is_relevant = !already_irrelevant && !taxon.is_excluded();
    taxon.is_irrelevant = !taxon.is_relevant;

    if let Some(children) = taxon.children.as_mut() {
        set_taxon_relevances(children, taxon.is_irrelevant);

        let any_relevant = children.iter().any(|child| child.is_relevant);
        taxon.is_relevant = taxon.is_relevant && any_relevant;

        // A result needs all of its morphs excluded; a grouping is marked
        // irrelevant as soon as any child is. The two can leave a mixed
        // grouping neither relevant nor irrelevant.
        taxon.is_irrelevant = taxon.is_irrelevant
            || if taxon.is_result {
                !any_relevant
            } else {
                children.iter().any(|child| child.is_irrelevant)
            };
    }
}

/// Number of relevant endpoints (results, or leaves of groupings)
pub fn get_relevant_taxa_count(taxa: &[Taxon]) -> usize {
    taxa.iter()
        .map(|taxon| {
            if !taxon.is_relevant {
                0
            } else if taxon.is_endpoint() {
                1
            } else {
                taxon.children.as_deref().map_or(0, get_relevant_taxa_count)
            }
        })
        .sum()
}

/// The relevant endpoints, pruning non-relevant subtrees
pub fn get_result_taxa(taxa: &[Taxon]) -> Vec<Taxon> {
    let mut results = Vec::new();
    collect_results(taxa, &mut results);
    results
}

fn collect_results(taxa: &[Taxon], results: &mut Vec<Taxon>) {
    for taxon in taxa.iter().filter(|t| t.is_relevant) {
        match taxon.children.as_deref() {
            Some(children) if !taxon.is_result => collect_results(children, results),
            _ => results.push(taxon.clone()),
        }
    }
}

/// Ids of every relevant node in the tree
pub fn relevant_taxon_ids(taxa: &[Taxon]) -> HashSet<&str> {
    let mut ids = HashSet::new();
    let mut stack: Vec<&Taxon> = taxa.iter().collect();
    while let Some(taxon) = stack.pop() {
        if taxon.is_relevant {
            ids.insert(taxon.id.as_str());
        }
        if let Some(children) = taxon.children.as_deref() {
            stack.extend(children.iter());
        }
    }
    ids
}

/// Whether every live branch of `taxa` is covered by some statement in
/// `statements`, either on the taxon itself or on all of its live children
pub fn is_relevant_for_all_taxa(taxa: Option<&[Taxon]>, statements: &[&Statement]) -> bool {
    let taxa = match taxa {
        Some(taxa) if !taxa.is_empty() => taxa,
        _ => return false,
    };

    for taxon in taxa.iter().filter(|t| !t.is_excluded()) {
        if !taxon.is_relevant || statements.iter().any(|s| s.taxon_id == taxon.id) {
            continue;
        }
        if !is_relevant_for_all_taxa(taxon.children.as_deref(), statements) {
            return false;
        }
    }
    true
}

/// Depth-first lookup by id
pub fn find_taxon<'a>(taxa: &'a [Taxon], taxon_id: &str) -> Option<&'a Taxon> {
    for taxon in taxa {
        if taxon.id == taxon_id {
            return Some(taxon);
        }
        if let Some(found) = taxon.children.as_deref().and_then(|c| find_taxon(c, taxon_id)) {
            return Some(found);
        }
    }
    None
}

pub(crate) fn find_taxon_mut<'a>(taxa: &'a mut [Taxon], taxon_id: &str) -> Option<&'a mut Taxon> {
    for taxon in taxa.iter_mut() {
        if taxon.id == taxon_id {
            return Some(taxon);
        }
        if let Some(found) = taxon
            .children
            .as_deref_mut()
            .and_then(|c| find_taxon_mut(c, taxon_id))
        {
            return Some(found);
        }
    }
    None
}

/// Calls `f` on every node, parents before children
pub(crate) fn for_each_taxon_mut(taxa: &mut [Taxon], f: &mut impl FnMut(&mut Taxon)) {
    for taxon in taxa.iter_mut() {
        f(taxon);
        if let Some(children) = taxon.children.as_deref_mut() {
            for_each_taxon_mut(children, f);
        }
    }
}
