//! Key data model
//!
//! A key is one identification session's dataset: a forest of taxa, the
//! characters asked about them, and the statements linking the two. All
//! derived state (conflicts, relevance, answers, counts) lives on the same
//! value, so a key can be persisted and restored as plain JSON.

mod errors;
pub mod premise;
mod types;

pub use errors::{KeyError, KeyResult};
pub use premise::Premise;
pub use types::{
    Alternative, Answer, AnswerValue, Character, CharacterType, Extra, ExternalReference,
    HigherClassification, Key, Linked, MediaElement, Multilingual, NumericRange, Organization,
    Person, Statement, StatementValue, Taxon,
};
