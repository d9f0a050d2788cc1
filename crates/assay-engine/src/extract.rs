//! JSON body value extraction.
//!
//! Each response owns one [`JsonExtractor`]. The body is parsed at most once,
//! each path query is compiled at most once (keyed by the raw path text), and
//! each result is cached per path. Nothing here is shared between responses.
//!
//! # Path syntax
//!
//! A leading `$` and/or `.` is dropped, then the rest is read as an
//! RFC 9535 JSONPath query:
//!
//! - `id`, `.id`, `$.id` - object member
//! - `items[0].name` - array index
//! - `items.0.name` - dotted array index (expressions cannot contain brackets)
//! - `items[*].name` - every match, returned as an array

use crate::error::{AssayError, Result};
use crate::value::Value;
use regex::Regex;
use serde_json_path::JsonPath;
use std::cell::RefCell;
use std::collections::HashMap;
use std::fmt;
use std::sync::OnceLock;

static MEMBER_NAME_REGEX: OnceLock<Regex> = OnceLock::new();

fn member_name_regex() -> &'static Regex {
    MEMBER_NAME_REGEX.get_or_init(|| {
        Regex::new(r"^[A-Za-z_][A-Za-z0-9_]*$").expect("member name pattern is a valid regex")
    })
}

#[derive(Default)]
pub struct JsonExtractor {
    document: RefCell<Option<serde_json::Value>>,
    queries: RefCell<HashMap<String, JsonPath>>,
    results: RefCell<HashMap<String, Value>>,
}

impl fmt::Debug for JsonExtractor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("JsonExtractor")
            .field("parsed", &self.document.borrow().is_some())
            .field("queries", &self.queries.borrow().len())
            .field("results", &self.results.borrow().len())
            .finish()
    }
}

impl JsonExtractor {
    pub fn new() -> Self {
        Self::default()
    }

    /// Extract the value at `path` from `body`.
    ///
    /// Zero matches yield `Absent`, one match yields the value itself, more
    /// than one yields an array of the matches in document order.
    pub fn extract(&self, body: &[u8], path: &str) -> Result<Value> {
        if let Some(cached) = self.results.borrow().get(path) {
            return Ok(cached.clone());
        }

        self.ensure_parsed(body, path)?;
        self.ensure_compiled(path)?;

        let value = {
            let document = self.document.borrow();
            let queries = self.queries.borrow();
            let (Some(document), Some(query)) = (document.as_ref(), queries.get(path)) else {
                return Err(extraction_error(path, "query state unavailable"));
            };
            let mut nodes = query.query(document).all();
            match nodes.len() {
                0 => Value::Absent,
                1 => Value::from(nodes.remove(0)),
                _ => Value::Array(nodes.into_iter().map(Value::from).collect()),
            }
        };

        self.results
            .borrow_mut()
            .insert(path.to_string(), value.clone());
        Ok(value)
    }

    /// Run `f` against the parsed body document.
    pub fn with_document<R>(
        &self,
        body: &[u8],
        f: impl FnOnce(&serde_json::Value) -> R,
    ) -> Result<R> {
        self.ensure_parsed(body, "$")?;
        let document = self.document.borrow();
        document
            .as_ref()
            .map(f)
            .ok_or_else(|| extraction_error("$", "document unavailable"))
    }

    fn ensure_parsed(&self, body: &[u8], path: &str) -> Result<()> {
        if self.document.borrow().is_some() {
            return Ok(());
        }
        let document: serde_json::Value = serde_json::from_slice(body)
            .map_err(|e| extraction_error(path, &format!("invalid JSON body: {e}")))?;
        *self.document.borrow_mut() = Some(document);
        Ok(())
    }

    fn ensure_compiled(&self, path: &str) -> Result<()> {
        if self.queries.borrow().contains_key(path) {
            return Ok(());
        }
        let query = normalize_path(path);
        let compiled = JsonPath::parse(&query)
            .map_err(|e| extraction_error(path, &format!("invalid path query '{query}': {e}")))?;
        self.queries.borrow_mut().insert(path.to_string(), compiled);
        Ok(())
    }
}

fn extraction_error(path: &str, reason: &str) -> AssayError {
    AssayError::PathExtractionError {
        path: path.to_string(),
        reason: reason.to_string(),
    }
}

/// Turn a body path into a JSONPath query rooted at `$`.
pub fn normalize_path(path: &str) -> String {
    let path = path.trim();
    let path = path.strip_prefix('$').unwrap_or(path);
    let path = path.strip_prefix('.').unwrap_or(path);

    if path.is_empty() {
        return "$".to_string();
    }

    // Bracketed or quoted queries are used as written.
    if path.contains(['[', '\'', '"']) {
        return if path.starts_with('[') {
            format!("${path}")
        } else {
            format!("$.{path}")
        };
    }

    let mut query = String::from("$");
    for segment in path.split('.') {
        if segment == "*" || member_name_regex().is_match(segment) {
            query.push('.');
            query.push_str(segment);
        } else if !segment.is_empty() && segment.bytes().all(|b| b.is_ascii_digit()) {
            query.push_str(&format!("[{segment}]"));
        } else {
            query.push_str(&format!("['{}']", segment.replace('\\', "\\\\").replace('\'', "\\'")));
        }
    }
    query
}

#[cfg(test)]
mod tests {
    use super::*;

    const BODY: &[u8] = br#"{
        "id": "abc",
        "age": 21,
        "score": 9.5,
        "active": true,
        "nickname": null,
        "content-type": "json",
        "items": [{"name": "first"}, {"name": "second"}],
        "tags": ["a"]
    }"#;

    #[test]
    fn test_normalize_path() {
        assert_eq!(normalize_path("id"), "$.id");
        assert_eq!(normalize_path(".id"), "$.id");
        assert_eq!(normalize_path("$.id"), "$.id");
        assert_eq!(normalize_path("$"), "$");
        assert_eq!(normalize_path("items[0].name"), "$.items[0].name");
        assert_eq!(normalize_path("[0]"), "$[0]");
        assert_eq!(normalize_path("items.1.name"), "$.items[1].name");
        assert_eq!(normalize_path("items.*.name"), "$.items.*.name");
        assert_eq!(normalize_path("content-type"), "$['content-type']");
    }

    #[test]
    fn test_extract_scalars() {
        let extractor = JsonExtractor::new();
        assert_eq!(extractor.extract(BODY, "id").unwrap(), Value::from("abc"));
        assert_eq!(extractor.extract(BODY, "age").unwrap(), Value::Number(21.0));
        assert_eq!(extractor.extract(BODY, ".score").unwrap(), Value::Number(9.5));
        assert_eq!(extractor.extract(BODY, "$.active").unwrap(), Value::Bool(true));
        assert_eq!(extractor.extract(BODY, "nickname").unwrap(), Value::Null);
        assert_eq!(
            extractor.extract(BODY, "content-type").unwrap(),
            Value::from("json")
        );
    }

    #[test]
    fn test_extract_match_cardinality() {
        let extractor = JsonExtractor::new();
        assert_eq!(extractor.extract(BODY, "missing").unwrap(), Value::Absent);
        assert_eq!(
            extractor.extract(BODY, "items[1].name").unwrap(),
            Value::from("second")
        );
        assert_eq!(
            extractor.extract(BODY, "items[*].name").unwrap(),
            Value::Array(vec![Value::from("first"), Value::from("second")])
        );
        // A single-element array is still a single match on the array itself
        assert_eq!(
            extractor.extract(BODY, "tags").unwrap(),
            Value::Array(vec![Value::from("a")])
        );
    }

    #[test]
    fn test_extract_is_memoized() {
        let extractor = JsonExtractor::new();
        let first = extractor.extract(BODY, "items.0.name").unwrap();
        let second = extractor.extract(BODY, "items.0.name").unwrap();
        assert_eq!(first, second);
        assert_eq!(first, Value::from("first"));
        assert_eq!(extractor.queries.borrow().len(), 1);
        assert_eq!(extractor.results.borrow().len(), 1);
    }

    #[test]
    fn test_invalid_json_body() {
        let extractor = JsonExtractor::new();
        let err = extractor.extract(b"not json", "id").unwrap_err();
        assert!(matches!(err, AssayError::PathExtractionError { .. }));
    }

    #[test]
    fn test_invalid_query() {
        let extractor = JsonExtractor::new();
        let err = extractor.extract(BODY, "items[?").unwrap_err();
        assert!(matches!(err, AssayError::PathExtractionError { .. }));
    }

    #[test]
    fn test_with_document() {
        let extractor = JsonExtractor::new();
        let keys = extractor
            .with_document(BODY, |doc| doc.as_object().map(|o| o.len()))
            .unwrap();
        assert_eq!(keys, Some(8));
    }
}
