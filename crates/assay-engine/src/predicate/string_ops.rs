//! Substring predicates: contains, starts with, ends with.

use super::{describe, require_str, verdict};
use crate::error::{AssayError, Result};
use crate::expression;
use crate::registry::ComponentRegistry;
use crate::value::Value;
use std::borrow::Cow;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StringOp {
    Contains,
    StartsWith,
    EndsWith,
}

impl StringOp {
    pub fn operator(&self) -> &'static str {
        match self {
            StringOp::Contains => "contain",
            StringOp::StartsWith => "start with",
            StringOp::EndsWith => "end with",
        }
    }

    pub fn apply(&self, actual: &str, expected: &str) -> bool {
        match self {
            StringOp::Contains => actual.contains(expected),
            StringOp::StartsWith => actual.starts_with(expected),
            StringOp::EndsWith => actual.ends_with(expected),
        }
    }
}

impl FromStr for StringOp {
    type Err = AssayError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim() {
            "contain" | "contains" => Ok(StringOp::Contains),
            "start with" | "starts with" => Ok(StringOp::StartsWith),
            "end with" | "ends with" => Ok(StringOp::EndsWith),
            other => Err(AssayError::InvalidStepArgument {
                name: "operator".to_string(),
                reason: format!("unknown string operator '{other}'"),
            }),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StringOptions {
    /// Upper-case both operands before comparing.
    pub ignore_case: bool,
    /// Resolve expressions in the expected value first.
    pub resolve_expected: bool,
}

pub fn string_op(
    subject: &str,
    actual: &Value,
    op: StringOp,
    expected: &str,
    options: StringOptions,
    registry: &ComponentRegistry,
    assert_true: bool,
) -> Result<()> {
    let actual_str = require_str(subject, actual)?;
    let expected: Cow<'_, str> = if options.resolve_expected {
        Cow::Owned(expression::resolve(expected, registry)?)
    } else {
        Cow::Borrowed(expected)
    };

    let matched = if options.ignore_case {
        op.apply(&actual_str.to_uppercase(), &expected.to_uppercase())
    } else {
        op.apply(actual_str, &expected)
    };

    verdict(
        matched,
        assert_true,
        subject,
        op.operator(),
        describe(actual),
        describe(&Value::from(expected.as_ref())),
    )
}
