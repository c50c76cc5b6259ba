//! taxakey - a deterministic identification-key inference engine
//!
//! Loads a key (taxa, characters, statements), then narrows the candidate
//! taxa as answers arrive, inferring whatever answers the remaining
//! evidence forces.

pub mod cli;
pub mod config;
pub mod engine;
pub mod key;
pub mod loader;
pub mod observability;
pub mod progress;
pub mod session;

pub use engine::{EngineOptions, IdentificationEngine};
pub use key::{Answer, AnswerValue, Key, KeyError, KeyResult};
pub use loader::load_key;
pub use progress::{character_state, progress, CharacterState};
