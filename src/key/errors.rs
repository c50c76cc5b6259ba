//! Key error types
//!
//! Error codes:
//! - TAXAKEY_MALFORMED_KEY (raw key lacks a required collection)
//! - TAXAKEY_INVALID_KEY (raw key present but undecodable)
//! - TAXAKEY_UNKNOWN_TAXON / TAXAKEY_UNKNOWN_ALTERNATIVE
//! - TAXAKEY_DANGLING_STATEMENT (statement references something absent)

use thiserror::Error;

/// Result type for key operations
pub type KeyResult<T> = Result<T, KeyError>;

/// Errors raised while loading a key or applying a transition to it
#[derive(Debug, Clone, PartialEq, Error)]
pub enum KeyError {
    #[error("Malformed key: missing '{field}'")]
    MalformedKey { field: &'static str },

    #[error("Invalid key: {0}")]
    InvalidKey(String),

    #[error("Unknown taxon: {0}")]
    UnknownTaxon(String),

    #[error("Unknown alternative: {0}")]
    UnknownAlternative(String),

    #[error("Dangling statement '{statement}': {reason}")]
    DanglingStatement { statement: String, reason: String },
}

impl KeyError {
    /// Returns the stable error code
    pub fn code(&self) -> &'static str {
        match self {
            KeyError::MalformedKey { .. } => "TAXAKEY_MALFORMED_KEY",
            KeyError::InvalidKey(_) => "TAXAKEY_INVALID_KEY",
            KeyError::UnknownTaxon(_) => "TAXAKEY_UNKNOWN_TAXON",
            KeyError::UnknownAlternative(_) => "TAXAKEY_UNKNOWN_ALTERNATIVE",
            KeyError::DanglingStatement { .. } => "TAXAKEY_DANGLING_STATEMENT",
        }
    }
}
