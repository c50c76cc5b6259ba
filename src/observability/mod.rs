//! Observability subsystem for taxakey
//!
//! Lifecycle events of loading, transitions and persistence are logged as
//! typed `Event`s with string fields, through `tracing`.
//!
//! # Principles
//!
//! 1. Observability is read-only
//! 2. No side effects on the engine
//! 3. The library never installs a subscriber; the binary does
//!
//! # Usage
//!
//! ```ignore
//! use taxakey::observability::{log_event_with_fields, Event};
//!
//! log_event_with_fields(Event::KeyLoaded, &[("taxa", "42")]);
//! ```

mod events;
mod logger;

pub use events::Event;
pub use logger::{init_logging, Logger, Severity};

/// Log a lifecycle event with fields
pub fn log_event_with_fields(event: Event, fields: &[(&str, &str)]) {
    Logger::log(event.severity(), event.as_str(), fields);
}
