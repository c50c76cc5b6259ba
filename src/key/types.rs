//! Key data model
//!
//! Field names serialize in the camelCase shape stored keys already use, so a
//! working key round-trips through the session store unchanged.

use std::collections::BTreeMap;

use serde::de::Error as _;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::{Map, Value};

use super::premise::Premise;

/// Fields this crate does not interpret, carried through untouched
pub type Extra = Map<String, Value>;

/// A text in one or more languages, keyed by language code
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Multilingual {
    Plain(String),
    ByLanguage(BTreeMap<String, String>),
}

/// A reference that is either still an id into one of the key's lookup
/// tables, or the dereferenced object itself
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Linked<T> {
    Inline(T),
    Id(String),
}

impl<T> Linked<T> {
    /// Returns the inline object, if dereferenced
    pub fn resolved(&self) -> Option<&T> {
        match self {
            Linked::Inline(item) => Some(item),
            Linked::Id(_) => None,
        }
    }
}

/// A person credited on a key or media element
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Person {
    pub id: String,
    #[serde(flatten)]
    pub extra: Extra,
}

/// An organization credited as publisher
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Organization {
    pub id: String,
    #[serde(flatten)]
    pub extra: Extra,
}

/// An image or other media file attached to a key element
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MediaElement {
    pub id: String,
    #[serde(default, deserialize_with = "one_or_many", skip_serializing_if = "Vec::is_empty")]
    pub creators: Vec<Linked<Person>>,
    #[serde(default, deserialize_with = "one_or_many", skip_serializing_if = "Vec::is_empty")]
    pub contributors: Vec<Linked<Person>>,
    #[serde(default, deserialize_with = "one_or_many", skip_serializing_if = "Vec::is_empty")]
    pub publishers: Vec<Linked<Organization>>,
    #[serde(flatten)]
    pub extra: Extra,
}

/// Inclusive numeric interval, serialized as `[min, max]`
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NumericRange {
    pub min: f64,
    pub max: f64,
}

impl NumericRange {
    pub fn new(min: f64, max: f64) -> Self {
        Self { min, max }
    }

    /// Inclusive containment of a single value
    pub fn contains(&self, value: f64) -> bool {
        value >= self.min && value <= self.max
    }

    /// True if either endpoint of one range falls within the other
    pub fn overlaps(&self, other: &NumericRange) -> bool {
        self.contains(other.min)
            || self.contains(other.max)
            || other.contains(self.min)
            || other.contains(self.max)
    }
}

impl Serialize for NumericRange {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        (self.min, self.max).serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for NumericRange {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let bounds = Vec::<Value>::deserialize(deserializer)?;
        if bounds.len() != 2 {
            return Err(D::Error::custom(format!(
                "expected [min, max], got {} values",
                bounds.len()
            )));
        }
        let min = parse_number(&bounds[0])
            .ok_or_else(|| D::Error::custom(format!("invalid range bound: {}", bounds[0])))?;
        let max = parse_number(&bounds[1])
            .ok_or_else(|| D::Error::custom(format!("invalid range bound: {}", bounds[1])))?;
        Ok(NumericRange { min, max })
    }
}

/// Stored keys carry numbers either as JSON numbers or numeric strings
fn parse_number(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

/// The value of an alternative: confirmed/excluded, or a selected interval
/// for numerical characters
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum AnswerValue {
    Bool(bool),
    Range(NumericRange),
}

impl AnswerValue {
    /// Whether the answer counts as "true" (an interval always does)
    pub fn is_truthy(&self) -> bool {
        match self {
            AnswerValue::Bool(value) => *value,
            AnswerValue::Range(_) => true,
        }
    }

    pub fn as_range(&self) -> Option<NumericRange> {
        match self {
            AnswerValue::Range(range) => Some(*range),
            AnswerValue::Bool(_) => None,
        }
    }
}

/// One answer handed to the engine; `value: None` retracts
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Answer {
    pub id: String,
    #[serde(default)]
    pub value: Option<AnswerValue>,
}

impl Answer {
    pub fn new(id: impl Into<String>, value: Option<AnswerValue>) -> Self {
        Self { id: id.into(), value }
    }

    pub fn yes(id: impl Into<String>) -> Self {
        Self::new(id, Some(AnswerValue::Bool(true)))
    }

    pub fn no(id: impl Into<String>) -> Self {
        Self::new(id, Some(AnswerValue::Bool(false)))
    }

    pub fn range(id: impl Into<String>, min: f64, max: f64) -> Self {
        Self::new(id, Some(AnswerValue::Range(NumericRange::new(min, max))))
    }

    pub fn retract(id: impl Into<String>) -> Self {
        Self::new(id, None)
    }
}

/// Identifier of a taxon in an external taxonomy service
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExternalReference {
    pub external_id: Value,
    #[serde(flatten)]
    pub extra: Extra,
}

impl ExternalReference {
    /// The external id in string form, whether stored as number or string
    pub fn external_id_string(&self) -> String {
        match &self.external_id {
            Value::String(s) => s.clone(),
            other => other.to_string(),
        }
    }
}

/// One ancestor in a taxon's higher classification
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HigherClassification {
    #[serde(rename = "ScientificNameId")]
    pub scientific_name_id: String,
    #[serde(flatten)]
    pub extra: Extra,
}

/// A node in the candidate tree
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Taxon {
    pub id: String,
    #[serde(default)]
    pub scientific_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub vernacular_name: Option<Multilingual>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub children: Option<Vec<Taxon>>,
    #[serde(default)]
    pub is_result: bool,
    #[serde(default)]
    pub dismissed: bool,
    #[serde(default)]
    pub conflicts: Vec<String>,
    #[serde(default)]
    pub is_relevant: bool,
    #[serde(default)]
    pub is_irrelevant: bool,
    #[serde(default, deserialize_with = "one_or_many", skip_serializing_if = "Vec::is_empty")]
    pub media: Vec<Linked<MediaElement>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub external_reference: Option<ExternalReference>,
    #[serde(
        rename = "HigherClassification",
        default,
        skip_serializing_if = "Vec::is_empty"
    )]
    pub higher_classification: Vec<HigherClassification>,
    #[serde(flatten)]
    pub extra: Extra,
}

impl Taxon {
    /// A bare taxon, mostly for building trees in code
    pub fn new(id: impl Into<String>, scientific_name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            scientific_name: scientific_name.into(),
            vernacular_name: None,
            children: None,
            is_result: false,
            dismissed: false,
            conflicts: Vec::new(),
            is_relevant: true,
            is_irrelevant: false,
            media: Vec::new(),
            external_reference: None,
            higher_classification: Vec::new(),
            extra: Extra::new(),
        }
    }

    pub fn with_children(mut self, children: Vec<Taxon>) -> Self {
        self.children = Some(children);
        self
    }

    pub fn as_result(mut self) -> Self {
        self.is_result = true;
        self
    }

    /// Counted as a single candidate rather than descended into
    pub fn is_endpoint(&self) -> bool {
        self.is_result || self.children.is_none()
    }

    /// Dismissed by the user or contradicted by some answer
    pub fn is_excluded(&self) -> bool {
        self.dismissed || !self.conflicts.is_empty()
    }

    pub fn has_conflict(&self, alternative_id: &str) -> bool {
        self.conflicts.iter().any(|c| c == alternative_id)
    }

    /// Adds a conflict; conflicts are a set
    pub fn add_conflict(&mut self, alternative_id: &str) {
        if !self.has_conflict(alternative_id) {
            self.conflicts.push(alternative_id.to_string());
        }
    }

    pub fn remove_conflict(&mut self, alternative_id: &str) {
        self.conflicts.retain(|c| c != alternative_id);
    }
}

/// Categorical characters have discrete alternatives; numerical ones a
/// single alternative carrying a range
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum CharacterType {
    /// No `type` given
    #[default]
    Categorical,
    Numerical,
    /// Any other label (exclusive, multistate, ...), kept as given and
    /// treated as categorical
    Other(String),
}

impl CharacterType {
    pub fn as_str(&self) -> &str {
        match self {
            CharacterType::Categorical => "categorical",
            CharacterType::Numerical => "numerical",
            CharacterType::Other(label) => label,
        }
    }

    fn is_unlabelled(&self) -> bool {
        *self == CharacterType::Categorical
    }
}

impl Serialize for CharacterType {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for CharacterType {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        Ok(match Option::<String>::deserialize(deserializer)? {
            None => CharacterType::Categorical,
            Some(label) if label == "numerical" => CharacterType::Numerical,
            Some(label) => CharacterType::Other(label),
        })
    }
}

/// One answerable value of a character
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Alternative {
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<Multilingual>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<Multilingual>,
    #[serde(default, deserialize_with = "lenient_number", skip_serializing_if = "Option::is_none")]
    pub min: Option<f64>,
    #[serde(default, deserialize_with = "lenient_number", skip_serializing_if = "Option::is_none")]
    pub max: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub unit: Option<Multilingual>,
    /// Confirmed, excluded or unknown (`None`); set by answers and inference alike
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub answer_is: Option<AnswerValue>,
    /// The user's pending choice, kept for the host; the engine never reads it
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub selected: Option<AnswerValue>,
    /// Set only by explicit answers, never by inference
    #[serde(default)]
    pub is_answered: bool,
    #[serde(default, deserialize_with = "one_or_many", skip_serializing_if = "Vec::is_empty")]
    pub media: Vec<Linked<MediaElement>>,
    #[serde(flatten)]
    pub extra: Extra,
}

impl Alternative {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            title: None,
            description: None,
            min: None,
            max: None,
            unit: None,
            answer_is: None,
            selected: None,
            is_answered: false,
            media: Vec::new(),
            extra: Extra::new(),
        }
    }

    pub fn numerical(id: impl Into<String>, min: f64, max: f64, unit: &str) -> Self {
        let mut alternative = Self::new(id);
        alternative.min = Some(min);
        alternative.max = Some(max);
        alternative.unit = Some(Multilingual::Plain(unit.to_string()));
        alternative
    }

    /// The full range of a numerical alternative
    pub fn range(&self) -> Option<NumericRange> {
        Some(NumericRange::new(self.min?, self.max?))
    }

    pub fn is_true(&self) -> bool {
        self.answer_is.map_or(false, |a| a.is_truthy())
    }

    pub fn is_unknown(&self) -> bool {
        self.answer_is.is_none()
    }
}

/// An observable trait presented to the user as a question
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Character {
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<Multilingual>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<Multilingual>,
    #[serde(rename = "type", default, skip_serializing_if = "CharacterType::is_unlabelled")]
    pub kind: CharacterType,
    #[serde(default, deserialize_with = "one_or_many")]
    pub states: Vec<Alternative>,
    #[serde(default)]
    pub is_answered: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub relevant: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub logical_premise: Option<Premise>,
    #[serde(default, deserialize_with = "one_or_many", skip_serializing_if = "Vec::is_empty")]
    pub media: Vec<Linked<MediaElement>>,
    #[serde(flatten)]
    pub extra: Extra,
}

impl Character {
    pub fn new(id: impl Into<String>, kind: CharacterType, states: Vec<Alternative>) -> Self {
        Self {
            id: id.into(),
            title: None,
            description: None,
            kind,
            states,
            is_answered: false,
            relevant: None,
            logical_premise: None,
            media: Vec::new(),
            extra: Extra::new(),
        }
    }

    pub fn is_numerical(&self) -> bool {
        self.kind == CharacterType::Numerical
    }

    pub fn alternative(&self, alternative_id: &str) -> Option<&Alternative> {
        self.states.iter().find(|a| a.id == alternative_id)
    }

    /// Any alternative explicitly answered by the user
    pub fn has_answered_alternative(&self) -> bool {
        self.states.iter().any(|a| a.is_answered)
    }
}

/// What a statement asserts: an alternative, or a range for numerical characters
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum StatementValue {
    Alternative(String),
    Range(NumericRange),
}

impl StatementValue {
    pub fn is_alternative(&self, alternative_id: &str) -> bool {
        matches!(self, StatementValue::Alternative(id) if id == alternative_id)
    }
}

/// Evidence linking a taxon to a character alternative
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Statement {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    pub taxon_id: String,
    pub character_id: String,
    pub value: StatementValue,
    /// 0 = never, 1 = always; absent means always
    #[serde(default = "always", deserialize_with = "frequency_or_always")]
    pub frequency: f64,
    #[serde(flatten)]
    pub extra: Extra,
}

impl Statement {
    pub fn new(
        taxon_id: impl Into<String>,
        character_id: impl Into<String>,
        value: StatementValue,
        frequency: f64,
    ) -> Self {
        Self {
            id: None,
            taxon_id: taxon_id.into(),
            character_id: character_id.into(),
            value,
            frequency,
            extra: Extra::new(),
        }
    }
}

/// The root aggregate of one identification session
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Key {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<Multilingual>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mode: Option<u8>,
    pub taxa: Vec<Taxon>,
    pub characters: Vec<Character>,
    pub statements: Vec<Statement>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub media_elements: Vec<MediaElement>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub persons: Vec<Person>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub organizations: Vec<Organization>,
    #[serde(default, deserialize_with = "one_or_many", skip_serializing_if = "Vec::is_empty")]
    pub creators: Vec<Linked<Person>>,
    #[serde(default, deserialize_with = "one_or_many", skip_serializing_if = "Vec::is_empty")]
    pub contributors: Vec<Linked<Person>>,
    #[serde(default, deserialize_with = "one_or_many", skip_serializing_if = "Vec::is_empty")]
    pub publishers: Vec<Linked<Organization>>,
    #[serde(default, deserialize_with = "one_or_many", skip_serializing_if = "Vec::is_empty")]
    pub media: Vec<Linked<MediaElement>>,
    #[serde(default)]
    pub taxa_count: usize,
    #[serde(default)]
    pub relevant_taxa_count: usize,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub results: Option<Vec<Taxon>>,
    #[serde(flatten)]
    pub extra: Extra,
}

impl Key {
    /// Assembles a key from its three collections without loading it
    pub fn new(taxa: Vec<Taxon>, characters: Vec<Character>, statements: Vec<Statement>) -> Self {
        Self {
            id: None,
            title: None,
            mode: None,
            taxa,
            characters,
            statements,
            media_elements: Vec::new(),
            persons: Vec::new(),
            organizations: Vec::new(),
            creators: Vec::new(),
            contributors: Vec::new(),
            publishers: Vec::new(),
            media: Vec::new(),
            taxa_count: 0,
            relevant_taxa_count: 0,
            results: None,
            extra: Extra::new(),
        }
    }

    /// Position (character, alternative) of an alternative id
    pub fn locate_alternative(&self, alternative_id: &str) -> Option<(usize, usize)> {
        self.characters.iter().enumerate().find_map(|(ci, character)| {
            character
                .states
                .iter()
                .position(|a| a.id == alternative_id)
                .map(|ai| (ci, ai))
        })
    }

    pub fn alternative(&self, alternative_id: &str) -> Option<&Alternative> {
        self.locate_alternative(alternative_id)
            .map(|(ci, ai)| &self.characters[ci].states[ai])
    }

    pub fn character(&self, character_id: &str) -> Option<&Character> {
        self.characters.iter().find(|c| c.id == character_id)
    }
}

fn always() -> f64 {
    1.0
}

fn frequency_or_always<'de, D: Deserializer<'de>>(deserializer: D) -> Result<f64, D::Error> {
    Ok(Option::<f64>::deserialize(deserializer)?.unwrap_or(1.0))
}

fn lenient_number<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<f64>, D::Error> {
    match Option::<Value>::deserialize(deserializer)? {
        None | Some(Value::Null) => Ok(None),
        Some(value) => parse_number(&value)
            .map(Some)
            .ok_or_else(|| D::Error::custom(format!("expected a number, got {}", value))),
    }
}

/// Accepts a single item, an array of items, or null
pub(crate) fn one_or_many<'de, D, T>(deserializer: D) -> Result<Vec<T>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum OneOrMany<T> {
        Many(Vec<T>),
        One(T),
    }

    Ok(match Option::<OneOrMany<T>>::deserialize(deserializer)? {
        None => Vec::new(),
        Some(OneOrMany::Many(items)) => items,
        Some(OneOrMany::One(item)) => vec![item],
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_range_overlap_is_symmetric() {
        let a = NumericRange::new(2.0, 5.0);
        let b = NumericRange::new(4.0, 10.0);
        assert!(a.overlaps(&b));
        assert!(b.overlaps(&a));

        let inner = NumericRange::new(5.0, 6.0);
        let outer = NumericRange::new(0.0, 10.0);
        assert!(inner.overlaps(&outer));
        assert!(outer.overlaps(&inner));

        assert!(!NumericRange::new(2.0, 3.0).overlaps(&NumericRange::new(4.0, 5.0)));
    }

    #[test]
    fn test_range_accepts_numeric_strings() {
        let range: NumericRange = serde_json::from_value(json!(["1.5", 3])).unwrap();
        assert_eq!(range, NumericRange::new(1.5, 3.0));
        assert_eq!(serde_json::to_value(range).unwrap(), json!([1.5, 3.0]));

        assert!(serde_json::from_value::<NumericRange>(json!([1])).is_err());
        assert!(serde_json::from_value::<NumericRange>(json!(["x", 1])).is_err());
    }

    #[test]
    fn test_answer_value_shapes() {
        let yes: AnswerValue = serde_json::from_value(json!(true)).unwrap();
        assert_eq!(yes, AnswerValue::Bool(true));
        let range: AnswerValue = serde_json::from_value(json!([6, 8])).unwrap();
        assert_eq!(range.as_range(), Some(NumericRange::new(6.0, 8.0)));
        assert!(range.is_truthy());
        assert!(!AnswerValue::Bool(false).is_truthy());
    }

    #[test]
    fn test_answer_without_value_is_retraction() {
        let answer: Answer = serde_json::from_value(json!({ "id": "a1" })).unwrap();
        assert_eq!(answer, Answer::retract("a1"));
    }

    #[test]
    fn test_statement_frequency_defaults_to_always() {
        let statement: Statement = serde_json::from_value(json!({
            "taxonId": "t1", "characterId": "c1", "value": "a1"
        }))
        .unwrap();
        assert_eq!(statement.frequency, 1.0);
        assert!(statement.value.is_alternative("a1"));

        let statement: Statement = serde_json::from_value(json!({
            "taxonId": "t1", "characterId": "c1", "value": "a1", "frequency": null
        }))
        .unwrap();
        assert_eq!(statement.frequency, 1.0);
    }

    #[test]
    fn test_character_type_label_is_kept() {
        let character: Character = serde_json::from_value(json!({
            "id": "c1", "type": "exclusive", "states": { "id": "a1" }
        }))
        .unwrap();
        assert_eq!(character.kind, CharacterType::Other("exclusive".into()));
        assert!(!character.is_numerical());
        assert_eq!(character.states.len(), 1);
        assert_eq!(serde_json::to_value(&character).unwrap()["type"], "exclusive");

        let character: Character = serde_json::from_value(json!({ "id": "c3" })).unwrap();
        assert_eq!(character.kind, CharacterType::Categorical);
        assert!(serde_json::to_value(&character).unwrap().get("type").is_none());

        let character: Character = serde_json::from_value(json!({
            "id": "c2", "type": "numerical", "states": [{ "id": "n1", "min": "0", "max": 10, "unit": "mm" }]
        }))
        .unwrap();
        assert!(character.is_numerical());
        assert_eq!(character.states[0].range(), Some(NumericRange::new(0.0, 10.0)));
    }

    #[test]
    fn test_taxon_round_trip_keeps_unknown_fields() {
        let raw = json!({
            "id": "t1",
            "scientificName": "Apis mellifera",
            "vernacularName": { "en": "honey bee", "nb": "honningbie" },
            "HigherClassification": [{ "ScientificNameId": "42" }],
            "externalReference": { "externalId": 1234 },
            "rank": "species"
        });
        let taxon: Taxon = serde_json::from_value(raw).unwrap();
        match taxon.vernacular_name.as_ref() {
            Some(Multilingual::ByLanguage(names)) => {
                assert_eq!(names.get("nb").map(String::as_str), Some("honningbie"))
            }
            other => panic!("expected names by language, got {:?}", other),
        }
        assert_eq!(taxon.external_reference.as_ref().unwrap().external_id_string(), "1234");
        assert_eq!(taxon.extra.get("rank"), Some(&json!("species")));

        let back = serde_json::to_value(&taxon).unwrap();
        assert_eq!(back["rank"], json!("species"));
        assert_eq!(back["HigherClassification"][0]["ScientificNameId"], json!("42"));
    }

    #[test]
    fn test_conflicts_behave_as_set() {
        let mut taxon = Taxon::new("t1", "A");
        taxon.add_conflict("a1");
        taxon.add_conflict("a1");
        assert_eq!(taxon.conflicts, vec!["a1".to_string()]);
        assert!(taxon.is_excluded());
        taxon.remove_conflict("a1");
        assert!(!taxon.is_excluded());
    }

    #[test]
    fn test_linked_accepts_id_or_object() {
        let linked: Vec<Linked<Person>> =
            serde_json::from_value(json!(["p1", { "id": "p2", "name": "Ada" }])).unwrap();
        assert_eq!(linked[0], Linked::Id("p1".into()));
        assert_eq!(linked[1].resolved().map(|p| p.id.as_str()), Some("p2"));
    }
}
