//! Logical premises gating whether a character is worth asking
//!
//! Stored form (JSON):
//! - `"alt-id"` is true when that alternative is answered true
//! - `{"NOT": p}`, `{"AND": [p, ...]}`, `{"OR": [p, ...]}`
//! - `{"<": ["alt-id", n]}`, `{">": ["alt-id", n]}`
//! - a one-element array `[p]` is the same as `p`
//!
//! AND/OR evaluate left to right and short-circuit.

use std::convert::TryFrom;

use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value};

use super::types::{AnswerValue, Character};

/// A boolean expression over other characters' answers
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "Value", into = "Value")]
pub enum Premise {
    Fact(String),
    Not(Box<Premise>),
    And(Vec<Premise>),
    Or(Vec<Premise>),
    LessThan(String, f64),
    GreaterThan(String, f64),
}

impl Premise {
    /// Evaluates against the current answers of `characters`
    pub fn evaluate(&self, characters: &[Character]) -> bool {
        match self {
            Premise::Fact(id) => answer_of(id, characters).map_or(false, |a| a.is_truthy()),
            Premise::Not(inner) => !inner.evaluate(characters),
            Premise::And(operands) => operands.iter().all(|p| p.evaluate(characters)),
            Premise::Or(operands) => operands.iter().any(|p| p.evaluate(characters)),
            Premise::LessThan(id, bound) => {
                compare(answer_of(id, characters), |answer| match answer {
                    AnswerValue::Range(range) => range.max < *bound,
                    AnswerValue::Bool(b) => bool_as_number(b) < *bound,
                })
            }
            Premise::GreaterThan(id, bound) => {
                compare(answer_of(id, characters), |answer| match answer {
                    AnswerValue::Range(range) => range.min > *bound,
                    AnswerValue::Bool(b) => bool_as_number(b) > *bound,
                })
            }
        }
    }
}

fn answer_of(alternative_id: &str, characters: &[Character]) -> Option<AnswerValue> {
    characters
        .iter()
        .find_map(|c| c.alternative(alternative_id))
        .and_then(|a| a.answer_is)
}

fn compare(answer: Option<AnswerValue>, test: impl Fn(AnswerValue) -> bool) -> bool {
    answer.map_or(false, test)
}

fn bool_as_number(value: bool) -> f64 {
    if value {
        1.0
    } else {
        0.0
    }
}

impl TryFrom<Value> for Premise {
    type Error = String;

    fn try_from(value: Value) -> Result<Self, Self::Error> {
        match value {
            Value::String(id) => Ok(Premise::Fact(id)),
            Value::Array(mut items) if items.len() == 1 => Premise::try_from(items.remove(0)),
            Value::Object(map) => parse_operator(map),
            other => Err(format!("unsupported premise: {}", other)),
        }
    }
}

fn parse_operator(map: Map<String, Value>) -> Result<Premise, String> {
    if map.len() != 1 {
        return Err(format!("premise must have exactly one operator, got {}", map.len()));
    }
    let (operator, operand) = map
        .into_iter()
        .next()
        .ok_or_else(|| "empty premise".to_string())?;

    match operator.as_str() {
        "NOT" => Ok(Premise::Not(Box::new(Premise::try_from(operand)?))),
        "AND" => Ok(Premise::And(parse_operands(operand)?)),
        "OR" => Ok(Premise::Or(parse_operands(operand)?)),
        "<" => {
            let (id, bound) = parse_comparison(operand)?;
            Ok(Premise::LessThan(id, bound))
        }
        ">" => {
            let (id, bound) = parse_comparison(operand)?;
            Ok(Premise::GreaterThan(id, bound))
        }
        other => Err(format!("unknown premise operator '{}'", other)),
    }
}

fn parse_operands(operand: Value) -> Result<Vec<Premise>, String> {
    match operand {
        Value::Array(items) => items.into_iter().map(Premise::try_from).collect(),
        single => Ok(vec![Premise::try_from(single)?]),
    }
}

fn parse_comparison(operand: Value) -> Result<(String, f64), String> {
    match operand {
        Value::Array(items) if items.len() == 2 => {
            let id = items[0]
                .as_str()
                .ok_or_else(|| format!("comparison needs an alternative id, got {}", items[0]))?;
            let bound = match &items[1] {
                Value::Number(n) => n.as_f64(),
                Value::String(s) => s.trim().parse().ok(),
                _ => None,
            }
            .ok_or_else(|| format!("comparison needs a number, got {}", items[1]))?;
            Ok((id.to_string(), bound))
        }
        other => Err(format!("comparison must be [id, number], got {}", other)),
    }
}

impl From<Premise> for Value {
    fn from(premise: Premise) -> Self {
        match premise {
            Premise::Fact(id) => Value::String(id),
            Premise::Not(inner) => json!({ "NOT": Value::from(*inner) }),
            Premise::And(operands) => {
                json!({ "AND": operands.into_iter().map(Value::from).collect::<Vec<_>>() })
            }
            Premise::Or(operands) => {
                json!({ "OR": operands.into_iter().map(Value::from).collect::<Vec<_>>() })
            }
            Premise::LessThan(id, bound) => json!({ "<": [id, bound] }),
            Premise::GreaterThan(id, bound) => json!({ ">": [id, bound] }),
        }
    }
}
