//! Observable events for taxakey
//!
//! Every lifecycle step of a session is logged under one of these names.
//! Events are explicit and typed.

use std::fmt;

use super::logger::Severity;

/// Observable events during loading, transitions and persistence
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Event {
    // Loading
    /// Raw key handed to the loader
    KeyLoadBegin,
    /// Key normalized and baseline computed
    KeyLoaded,
    /// Raw key refused
    KeyRejected,
    /// Closed-world statements added
    StatementsSynthesized,
    /// Statement with a dangling reference skipped (lenient mode)
    DanglingStatementDropped,

    // Transitions
    /// Answer batch applied
    AnswersApplied,
    /// Inference pass finished
    InferenceComplete,
    /// A taxon was dismissed or restored
    TaxonDismissToggled,
    /// Allow-list filter applied
    TaxaFiltered,
    /// Identification narrowed to its results
    ResultsReached,

    // Sessions
    /// Working key restored from the store
    SessionRestored,
    /// Working key written to the store
    SessionSaved,
    /// Stored session failed its checksum
    SessionCorrupted,
    /// Stored session deleted
    SessionRemoved,

    // Configuration
    /// Configuration loaded
    ConfigLoaded,
}

impl Event {
    /// Returns the string representation of the event
    pub fn as_str(&self) -> &'static str {
        match self {
            Event::KeyLoadBegin => "KEY_LOAD_BEGIN",
            Event::KeyLoaded => "KEY_LOADED",
            Event::KeyRejected => "KEY_REJECTED",
            Event::StatementsSynthesized => "STATEMENTS_SYNTHESIZED",
            Event::DanglingStatementDropped => "DANGLING_STATEMENT_DROPPED",

            Event::AnswersApplied => "ANSWERS_APPLIED",
            Event::InferenceComplete => "INFERENCE_COMPLETE",
            Event::TaxonDismissToggled => "TAXON_DISMISS_TOGGLED",
            Event::TaxaFiltered => "TAXA_FILTERED",
            Event::ResultsReached => "RESULTS_REACHED",

            Event::SessionRestored => "SESSION_RESTORED",
            Event::SessionSaved => "SESSION_SAVED",
            Event::SessionCorrupted => "SESSION_CORRUPTED",
            Event::SessionRemoved => "SESSION_REMOVED",

            Event::ConfigLoaded => "CONFIG_LOADED",
        }
    }

    /// Severity the event is logged at
    pub fn severity(&self) -> Severity {
        match self {
            Event::KeyRejected | Event::SessionCorrupted | Event::DanglingStatementDropped => {
                Severity::Warn
            }
            Event::KeyLoadBegin
            | Event::KeyLoaded
            | Event::ResultsReached
            | Event::SessionRestored
            | Event::SessionSaved
            | Event::SessionRemoved
            | Event::ConfigLoaded => Severity::Info,
            Event::StatementsSynthesized
            | Event::AnswersApplied
            | Event::InferenceComplete
            | Event::TaxonDismissToggled
            | Event::TaxaFiltered => Severity::Debug,
        }
    }
}

impl fmt::Display for Event {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
