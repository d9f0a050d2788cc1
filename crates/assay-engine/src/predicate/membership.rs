//! Set membership against a literal array.
//!
//! Membership compares kinds strictly: `"50"` is not a member of `[50]`.

use super::{describe, verdict};
use crate::error::{AssayError, Result};
use crate::value::Value;

/// Parse a JSON array literal of strings and/or numbers.
pub fn parse_candidates(raw: &str) -> Result<Vec<Value>> {
    let invalid = |reason: String| AssayError::InvalidStepArgument {
        name: "candidates".to_string(),
        reason,
    };
    let json: serde_json::Value =
        serde_json::from_str(raw).map_err(|e| invalid(format!("invalid array literal: {e}")))?;
    let serde_json::Value::Array(items) = json else {
        return Err(invalid(format!("expected an array literal, got {raw}")));
    };
    if let Some(bad) = items.iter().find(|v| !(v.is_string() || v.is_number())) {
        return Err(invalid(format!("only strings and numbers are allowed, got {bad}")));
    }
    Ok(items.iter().map(Value::from).collect())
}

pub fn one_of(subject: &str, actual: &Value, candidates: &[Value], assert_true: bool) -> Result<()> {
    if !actual.is_scalar() {
        return Err(AssayError::TypeMismatch {
            path: subject.to_string(),
            expected: "a scalar",
            actual: describe(actual),
        });
    }
    verdict(
        candidates.contains(actual),
        assert_true,
        subject,
        "be one of",
        describe(actual),
        Value::Array(candidates.to_vec()).to_string(),
    )
}
