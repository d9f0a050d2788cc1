//! Structural equality and presence.

use super::{describe, verdict};
use crate::error::{AssayError, Result};
use crate::value::Value;
use std::str::FromStr;

/// Kind of literal a step compares against.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LiteralKind {
    String,
    Number,
    Boolean,
    Json,
}

impl FromStr for LiteralKind {
    type Err = AssayError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "string" => Ok(LiteralKind::String),
            "number" => Ok(LiteralKind::Number),
            "boolean" | "bool" => Ok(LiteralKind::Boolean),
            "json" => Ok(LiteralKind::Json),
            other => Err(AssayError::InvalidStepArgument {
                name: "kind".to_string(),
                reason: format!("unknown literal kind '{other}'"),
            }),
        }
    }
}

/// Parse a step literal into a typed value.
pub fn parse_literal(kind: LiteralKind, raw: &str) -> Result<Value> {
    let invalid = |reason: String| AssayError::InvalidStepArgument {
        name: "expected".to_string(),
        reason,
    };
    match kind {
        LiteralKind::String => Ok(Value::from(raw)),
        LiteralKind::Number => raw
            .trim()
            .parse::<f64>()
            .map(Value::Number)
            .map_err(|e| invalid(format!("'{raw}' is not a number: {e}"))),
        LiteralKind::Boolean => match raw.trim() {
            "true" => Ok(Value::Bool(true)),
            "false" => Ok(Value::Bool(false)),
            other => Err(invalid(format!("'{other}' is not a boolean"))),
        },
        LiteralKind::Json => serde_json::from_str::<serde_json::Value>(raw)
            .map(Value::from)
            .map_err(|e| invalid(format!("invalid JSON literal: {e}"))),
    }
}

/// Deep equality between an extracted value and a literal.
pub fn equals(subject: &str, actual: &Value, expected: &Value, assert_true: bool) -> Result<()> {
    verdict(
        actual == expected,
        assert_true,
        subject,
        "be equal to",
        describe(actual),
        describe(expected),
    )
}

/// Whether the path resolved to anything at all.
pub fn exists(subject: &str, actual: &Value, assert_true: bool) -> Result<()> {
    verdict(
        !actual.is_absent(),
        assert_true,
        subject,
        "exist",
        describe(actual),
        String::new(),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_parse_literals() {
        assert_eq!(
            parse_literal(LiteralKind::String, "21").unwrap(),
            Value::from("21")
        );
        assert_eq!(
            parse_literal(LiteralKind::Number, "21").unwrap(),
            Value::Number(21.0)
        );
        assert_eq!(
            parse_literal(LiteralKind::Boolean, "false").unwrap(),
            Value::Bool(false)
        );
        assert!(parse_literal(LiteralKind::Boolean, "yes").is_err());
        assert!(parse_literal(LiteralKind::Number, "abc").is_err());
        assert_eq!(
            parse_literal(LiteralKind::Json, r#"{"a":[1,2]}"#).unwrap(),
            Value::from(json!({"a": [1.0, 2.0]}))
        );
    }

    #[test]
    fn test_equals_is_typed() {
        let age = Value::Number(21.0);
        assert!(equals("age", &age, &Value::Number(21.0), true).is_ok());
        assert!(equals("age", &age, &Value::from("21"), false).is_ok());

        let err = equals("age", &age, &Value::from("21"), true).unwrap_err();
        assert_eq!(err.to_string(), "age: expected 21 to be equal to \"21\"");
    }

    #[test]
    fn test_equals_deep() {
        let actual = Value::from(json!({"tags": ["a", "b"], "n": 1}));
        let expected = parse_literal(LiteralKind::Json, r#"{"n": 1.0, "tags": ["a", "b"]}"#).unwrap();
        assert!(equals("$", &actual, &expected, true).is_ok());
    }

    #[test]
    fn test_exists() {
        assert!(exists("id", &Value::Null, true).is_ok());
        assert!(exists("id", &Value::Absent, false).is_ok());
        assert!(exists("id", &Value::Absent, true).unwrap_err().is_mismatch());
    }
}
