//! ISO-8601-like date and time shapes.

use super::{describe, require_str, verdict};
use crate::error::{AssayError, Result};
use crate::value::Value;
use regex::Regex;
use std::str::FromStr;
use std::sync::OnceLock;

const DATE: &str = r"\d{4}-(?:0[1-9]|1[0-2])-(?:0[1-9]|[12]\d|3[01])";
const TIME: &str = r"(?:[01]\d|2[0-3]):[0-5]\d:[0-5]\d(?:\.\d+)?";
const OFFSET: &str = r"(?:Z|[+-](?:[01]\d|2[0-3]):?[0-5]\d)";

static DATE_REGEX: OnceLock<Regex> = OnceLock::new();
static TIME_REGEX: OnceLock<Regex> = OnceLock::new();
static DATE_TIME_REGEX: OnceLock<Regex> = OnceLock::new();

fn compile(pattern: String) -> Regex {
    Regex::new(&pattern).expect("temporal pattern is a valid regex")
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TemporalShape {
    /// `2024-02-29`
    Date,
    /// `13:45:00`, `13:45:00.123Z`, `13:45:00+02:00`
    Time,
    /// `2024-02-29T13:45:00Z`
    DateTime,
}

impl TemporalShape {
    fn regex(&self) -> &'static Regex {
        match self {
            TemporalShape::Date => DATE_REGEX.get_or_init(|| compile(format!("^{DATE}$"))),
            TemporalShape::Time => TIME_REGEX.get_or_init(|| compile(format!("^{TIME}{OFFSET}?$"))),
            TemporalShape::DateTime => {
                DATE_TIME_REGEX.get_or_init(|| compile(format!("^{DATE}T{TIME}{OFFSET}?$")))
            }
        }
    }

    fn label(&self) -> &'static str {
        match self {
            TemporalShape::Date => "a date",
            TemporalShape::Time => "a time",
            TemporalShape::DateTime => "a date-time",
        }
    }
}

impl FromStr for TemporalShape {
    type Err = AssayError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "date" => Ok(TemporalShape::Date),
            "time" => Ok(TemporalShape::Time),
            "datetime" | "date-time" | "date time" => Ok(TemporalShape::DateTime),
            other => Err(AssayError::InvalidStepArgument {
                name: "shape".to_string(),
                reason: format!("unknown temporal shape '{other}'"),
            }),
        }
    }
}

pub fn temporal(subject: &str, actual: &Value, shape: TemporalShape, assert_true: bool) -> Result<()> {
    let actual_str = require_str(subject, actual)?;
    verdict(
        shape.regex().is_match(actual_str),
        assert_true,
        subject,
        "be",
        describe(actual),
        shape.label().to_string(),
    )
}
