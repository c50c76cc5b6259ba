//! CLI-specific error types
//!
//! Key and session failures keep their own codes so hosts see the same
//! code whether they call the library or the binary.

use std::fmt;
use std::io;

use crate::key::KeyError;
use crate::session::SessionError;

/// CLI error codes
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CliErrorCode {
    /// Configuration file error
    ConfigError,
    /// I/O error (files, stdout)
    IoError,
    /// Bad command-line argument
    InvalidArgument,
    /// No stored session under the given id
    SessionNotFound,
    /// Failure raised by the engine or a session store, with its own code
    Engine(&'static str),
}

impl CliErrorCode {
    /// Get the error code string
    pub fn code(&self) -> &'static str {
        match self {
            Self::ConfigError => "TAXAKEY_CLI_CONFIG_ERROR",
            Self::IoError => "TAXAKEY_CLI_IO_ERROR",
            Self::InvalidArgument => "TAXAKEY_CLI_INVALID_ARGUMENT",
            Self::SessionNotFound => "TAXAKEY_CLI_SESSION_NOT_FOUND",
            Self::Engine(code) => code,
        }
    }
}

/// CLI error
#[derive(Debug)]
pub struct CliError {
    code: CliErrorCode,
    message: String,
}

impl CliError {
    /// Create a new CLI error
    pub fn new(code: CliErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
        }
    }

    /// Config error
    pub fn config_error(msg: impl Into<String>) -> Self {
        Self::new(CliErrorCode::ConfigError, msg)
    }

    /// I/O error
    pub fn io_error(msg: impl Into<String>) -> Self {
        Self::new(CliErrorCode::IoError, msg)
    }

    pub fn invalid_argument(msg: impl Into<String>) -> Self {
        Self::new(CliErrorCode::InvalidArgument, msg)
    }

    pub fn session_not_found(key_id: &str) -> Self {
        Self::new(
            CliErrorCode::SessionNotFound,
            format!("No session '{}'. Run 'taxakey load' first.", key_id),
        )
    }

    /// Get the error code
    pub fn code(&self) -> &CliErrorCode {
        &self.code
    }

    /// Get the error code string
    pub fn code_str(&self) -> &'static str {
        self.code.code()
    }

    /// Get the error message
    pub fn message(&self) -> &str {
        &self.message
    }
}

impl fmt::Display for CliError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.code.code(), self.message)
    }
}

impl std::error::Error for CliError {}

impl From<io::Error> for CliError {
    fn from(e: io::Error) -> Self {
        Self::io_error(e.to_string())
    }
}

impl From<serde_json::Error> for CliError {
    fn from(e: serde_json::Error) -> Self {
        Self::io_error(format!("JSON error: {}", e))
    }
}

impl From<KeyError> for CliError {
    fn from(e: KeyError) -> Self {
        Self::new(CliErrorCode::Engine(e.code()), e.to_string())
    }
}

impl From<SessionError> for CliError {
    fn from(e: SessionError) -> Self {
        Self::new(CliErrorCode::Engine(e.code()), e.to_string())
    }
}

/// CLI result type
pub type CliResult<T> = Result<T, CliError>;
