//! # Session Errors

use std::io;

use thiserror::Error;

use crate::key::KeyError;

/// Result type for session operations
pub type SessionResult<T> = Result<T, SessionError>;

/// Session store errors
#[derive(Debug, Error)]
pub enum SessionError {
    #[error("Session I/O failed: {0}")]
    Io(#[from] io::Error),

    #[error("Session serialization failed: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Stored session '{key_id}' failed its checksum")]
    Corrupted { key_id: String },

    #[error("Invalid session id: '{0}'")]
    InvalidSessionId(String),

    #[error(transparent)]
    Key(#[from] KeyError),
}

impl SessionError {
    /// Returns the stable error code
    pub fn code(&self) -> &'static str {
        match self {
            SessionError::Io(_) => "TAXAKEY_SESSION_IO",
            SessionError::Serialization(_) => "TAXAKEY_SESSION_SERIALIZATION",
            SessionError::Corrupted { .. } => "TAXAKEY_SESSION_CORRUPTED",
            SessionError::InvalidSessionId(_) => "TAXAKEY_INVALID_SESSION_ID",
            SessionError::Key(err) => err.code(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_codes() {
        assert_eq!(
            SessionError::Corrupted { key_id: "k".into() }.code(),
            "TAXAKEY_SESSION_CORRUPTED"
        );
        assert_eq!(
            SessionError::from(KeyError::UnknownTaxon("t".into())).code(),
            "TAXAKEY_UNKNOWN_TAXON"
        );
        let io = io::Error::new(io::ErrorKind::NotFound, "gone");
        assert_eq!(SessionError::from(io).code(), "TAXAKEY_SESSION_IO");
    }
}
