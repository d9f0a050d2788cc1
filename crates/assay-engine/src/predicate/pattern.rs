//! Regex match predicate.

use super::{describe, require_str, verdict};
use crate::error::{AssayError, Result};
use crate::value::Value;
use regex::Regex;

/// Match the actual string against `pattern`.
///
/// A pattern that does not compile is reported as `InvalidPattern`, never as
/// a non-match.
pub fn matches_pattern(subject: &str, actual: &Value, pattern: &str, assert_true: bool) -> Result<()> {
    let actual_str = require_str(subject, actual)?;
    let regex = Regex::new(pattern).map_err(|e| AssayError::InvalidPattern {
        pattern: pattern.to_string(),
        reason: e.to_string(),
    })?;

    verdict(
        regex.is_match(actual_str),
        assert_true,
        subject,
        "match",
        describe(actual),
        format!("/{pattern}/"),
    )
}
