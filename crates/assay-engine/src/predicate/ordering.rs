//! Numeric ordering with coercion of the actual value.

use super::{describe, verdict};
use crate::error::{AssayError, Result};
use crate::value::Value;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Comparison {
    LessThan,
    LessOrEqual,
    GreaterThan,
    GreaterOrEqual,
}

impl Comparison {
    pub fn operator(&self) -> &'static str {
        match self {
            Comparison::LessThan => "be less than",
            Comparison::LessOrEqual => "be less than or equal to",
            Comparison::GreaterThan => "be greater than",
            Comparison::GreaterOrEqual => "be greater than or equal to",
        }
    }

    pub fn holds(&self, actual: f64, threshold: f64) -> bool {
        match self {
            Comparison::LessThan => actual < threshold,
            Comparison::LessOrEqual => actual <= threshold,
            Comparison::GreaterThan => actual > threshold,
            Comparison::GreaterOrEqual => actual >= threshold,
        }
    }
}

impl FromStr for Comparison {
    type Err = AssayError;

    /// Accepts the step phrasing (`greater than or equal to`) or the symbol (`>=`).
    fn from_str(s: &str) -> Result<Self> {
        match s.trim() {
            "<" | "less than" => Ok(Comparison::LessThan),
            "<=" | "less than or equal to" => Ok(Comparison::LessOrEqual),
            ">" | "greater than" => Ok(Comparison::GreaterThan),
            ">=" | "greater than or equal to" => Ok(Comparison::GreaterOrEqual),
            other => Err(AssayError::InvalidStepArgument {
                name: "comparison".to_string(),
                reason: format!("unknown comparison '{other}'"),
            }),
        }
    }
}

/// Coerce a number or numeric string into `f64`.
///
/// Absent and non-scalar values are a `TypeMismatch`; a string that does not
/// parse is a `CoercionError`. Neither is a predicate mismatch.
pub fn to_number(subject: &str, value: &Value) -> Result<f64> {
    match value {
        Value::Number(n) => Ok(*n),
        Value::String(s) => s.trim().parse::<f64>().map_err(|_| AssayError::CoercionError {
            path: subject.to_string(),
            actual: describe(value),
        }),
        other => Err(AssayError::TypeMismatch {
            path: subject.to_string(),
            expected: "a number",
            actual: describe(other),
        }),
    }
}

pub fn compare(
    subject: &str,
    actual: &Value,
    comparison: Comparison,
    threshold: f64,
    assert_true: bool,
) -> Result<()> {
    let number = to_number(subject, actual)?;
    verdict(
        comparison.holds(number, threshold),
        assert_true,
        subject,
        comparison.operator(),
        describe(actual),
        threshold.to_string(),
    )
}
