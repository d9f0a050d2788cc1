//! Response assertion predicates.
//!
//! Every predicate computes whether `actual` matches `expected` and compares
//! that with the `assert_true` flag of the step: affirmative steps pass
//! `true`, negated steps pass `false`. A disagreement is a
//! `PredicateMismatch`. A value of the wrong kind is a `TypeMismatch`
//! raised before any comparison happens.
//!
//! # Module Structure
//!
//! - `equality` - deep equality against typed literals, presence
//! - `ordering` - numeric comparisons with string coercion
//! - `string_ops` - contains / starts with / ends with
//! - `pattern` - regex match
//! - `temporal` - date, time and date-time shapes
//! - `membership` - "one of" a literal set
//! - `schema` - JSON Schema conformance with a per-scenario cache

mod equality;
mod membership;
mod ordering;
mod pattern;
mod schema;
mod string_ops;
mod temporal;

pub use equality::{equals, exists, parse_literal, LiteralKind};
pub use membership::{one_of, parse_candidates};
pub use ordering::{compare, to_number, Comparison};
pub use pattern::matches_pattern;
pub use schema::{conforms_to_schema, SchemaCache};
pub use string_ops::{string_op, StringOp, StringOptions};
pub use temporal::{temporal, TemporalShape};

use crate::error::{AssayError, Result};
use crate::value::Value;

/// Check a computed match against the step's affirm/negate expectation.
pub(crate) fn verdict(
    matched: bool,
    assert_true: bool,
    subject: &str,
    operator: &'static str,
    actual: String,
    expected: String,
) -> Result<()> {
    if matched == assert_true {
        return Ok(());
    }
    Err(AssayError::PredicateMismatch {
        subject: subject.to_string(),
        operator,
        actual,
        expected,
        negated: !assert_true,
    })
}

/// Render a value for failure messages.
pub(crate) fn describe(value: &Value) -> String {
    match value {
        Value::Absent => "<absent>".to_string(),
        Value::String(s) => format!("{s:?}"),
        other => other.to_string(),
    }
}

/// Require a string value.
pub(crate) fn require_str<'a>(subject: &str, value: &'a Value) -> Result<&'a str> {
    value.as_str().ok_or_else(|| AssayError::TypeMismatch {
        path: subject.to_string(),
        expected: "a string",
        actual: describe(value),
    })
}
