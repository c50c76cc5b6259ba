//! # Identification engine
//!
//! Pure state transitions over a loaded [`Key`]:
//!
//! - `give_answers` applies answers and derives forced ones
//! - `toggle_taxon_dismissed` / `filter_taxa_by_*` exclude taxa by hand
//!
//! Every transition takes the key by reference and returns a new one, so a
//! failed call leaves the caller's copy untouched. Callers must serialize
//! transitions on the same session; the engine holds no state of its own.

mod conflicts;
mod dismiss;
mod inference;
mod relevance;

pub use conflicts::{is_in_interval, remove_multistate_conflicts, set_taxa_conflicts};
pub use dismiss::{filter_taxa_by_ids, filter_taxa_by_names, is_part_of_key, toggle_taxon_dismissed};
pub use inference::{give_answers, infer_alternatives};
pub use relevance::{
    find_taxon, get_relevant_taxa_count, get_result_taxa, is_relevant_for_all_taxa,
    set_taxon_relevances,
};

use crate::key::{Answer, Key, KeyResult};

/// Behaviour switches shared by every transition
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EngineOptions {
    /// Clear conflicts a taxon only owes to several states being true at once
    pub allow_multistate: bool,
    /// Fail loading on statements that reference missing ids
    pub strict_references: bool,
}

impl Default for EngineOptions {
    fn default() -> Self {
        Self {
            allow_multistate: false,
            strict_references: true,
        }
    }
}

/// Bundles options and the relevant-only mode so hosts drive one object
#[derive(Debug, Clone, Copy, Default)]
pub struct IdentificationEngine {
    options: EngineOptions,
    relevant_only: bool,
}

impl IdentificationEngine {
    pub fn new(options: EngineOptions, relevant_only: bool) -> Self {
        Self {
            options,
            relevant_only,
        }
    }

    /// Engine for a loaded key, taking relevant-only from its mode
    pub fn for_key(key: &Key, options: EngineOptions, default_mode: u8) -> Self {
        Self::new(options, is_relevant_only(key.mode.unwrap_or(default_mode)))
    }

    pub fn options(&self) -> &EngineOptions {
        &self.options
    }

    pub fn relevant_only(&self) -> bool {
        self.relevant_only
    }

    pub fn give_answers(&self, key: &Key, answers: &[Answer]) -> KeyResult<Key> {
        give_answers(key, answers, self.relevant_only, &self.options)
    }

    pub fn toggle_taxon_dismissed(&self, key: &Key, taxon_id: &str) -> KeyResult<Key> {
        toggle_taxon_dismissed(key, taxon_id, self.relevant_only, &self.options)
    }

    pub fn filter_taxa_by_ids(&self, key: &Key, ids: &[String]) -> KeyResult<Key> {
        filter_taxa_by_ids(key, ids, self.relevant_only, &self.options)
    }

    pub fn filter_taxa_by_names(
        &self,
        key: &Key,
        names: &[String],
        keep_common: bool,
    ) -> KeyResult<Key> {
        filter_taxa_by_names(key, names, keep_common, self.relevant_only, &self.options)
    }
}

/// Key mode 2 asks only characters that tell every live taxon apart
pub fn is_relevant_only(mode: u8) -> bool {
    mode == 2
}
