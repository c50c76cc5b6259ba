//! Structured event logger
//!
//! - One log line = one event
//! - Fields rendered in deterministic (alphabetical) order
//! - Emitted through `tracing`; the host decides where it goes

use std::fmt;

use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::EnvFilter;

/// Log severity levels
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Severity {
    /// Per-transition detail
    Debug = 0,
    /// Session lifecycle
    Info = 1,
    /// Recoverable issues and refused input
    Warn = 2,
}

impl Severity {
    /// Returns the string representation
    pub fn as_str(&self) -> &'static str {
        match self {
            Severity::Debug => "DEBUG",
            Severity::Info => "INFO",
            Severity::Warn => "WARN",
        }
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Emits named events with string fields
pub struct Logger;

impl Logger {
    /// Log an event with the given severity and fields
    pub fn log(severity: Severity, event: &str, fields: &[(&str, &str)]) {
        let rendered = render_fields(fields);
        match severity {
            Severity::Debug => tracing::debug!(event, "{}", rendered),
            Severity::Info => tracing::info!(event, "{}", rendered),
            Severity::Warn => tracing::warn!(event, "{}", rendered),
        }
    }
}

/// `key=value` pairs sorted by key, values quoted when they contain spaces
pub(crate) fn render_fields(fields: &[(&str, &str)]) -> String {
    let mut sorted: Vec<_> = fields.iter().collect();
    sorted.sort_by_key(|(k, _)| *k);

    sorted
        .into_iter()
        .map(|(key, value)| {
            if value.is_empty() || value.contains(char::is_whitespace) {
                format!("{}={:?}", key, value)
            } else {
                format!("{}={}", key, value)
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

/// Installs the process-wide subscriber, writing to stderr.
///
/// `RUST_LOG` wins over `default_level`. Returns false if a subscriber was
/// already installed.
pub fn init_logging(default_level: &str) -> bool {
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .try_init()
        .is_ok()
}
