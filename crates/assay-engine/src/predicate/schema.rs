//! JSON Schema conformance of a response body.
//!
//! Schemas are fetched from `file://`, `http://` or `https://` sources and
//! compiled once per URI. The [`SchemaCache`] belongs to a single scenario
//! and is dropped with it.

use super::verdict;
use crate::error::{AssayError, Result};
use crate::files::FileSource;
use crate::http::{HttpClient, Method, OutgoingRequest, Response};
use jsonschema::Validator;
use std::collections::HashMap;
use std::fmt;
use std::path::Path;
use std::sync::Arc;
use tracing::debug;

/// Compiled validators keyed by source URI.
pub struct SchemaCache {
    files: Arc<dyn FileSource>,
    client: Arc<dyn HttpClient>,
    validators: HashMap<String, Validator>,
}

impl fmt::Debug for SchemaCache {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SchemaCache")
            .field("schemas", &self.validators.keys().collect::<Vec<_>>())
            .finish_non_exhaustive()
    }
}

impl SchemaCache {
    pub fn new(files: Arc<dyn FileSource>, client: Arc<dyn HttpClient>) -> Self {
        Self {
            files,
            client,
            validators: HashMap::new(),
        }
    }

    pub fn len(&self) -> usize {
        self.validators.len()
    }

    pub fn is_empty(&self) -> bool {
        self.validators.is_empty()
    }

    /// The compiled validator for `uri`, loading it on first use.
    pub fn validator(&mut self, uri: &str) -> Result<&Validator> {
        if self.validators.contains_key(uri) {
            debug!(uri, "Schema cache hit");
        } else {
            let document = self.load(uri)?;
            let validator = jsonschema::options()
                .build(&document)
                .map_err(|e| schema_load(uri, format!("invalid schema: {e}")))?;
            debug!(uri, "Compiled schema");
            self.validators.insert(uri.to_string(), validator);
        }
        self.validators
            .get(uri)
            .ok_or_else(|| schema_load(uri, "schema missing from cache".to_string()))
    }

    fn load(&self, uri: &str) -> Result<serde_json::Value> {
        let bytes = if let Some(path) = uri.strip_prefix("file://") {
            self.files
                .read(Path::new(path))
                .map_err(|e| schema_load(uri, e.to_string()))?
        } else if uri.starts_with("http://") || uri.starts_with("https://") {
            let request = OutgoingRequest {
                method: Method::Get,
                url: uri.to_string(),
                headers: vec![("accept".to_string(), "application/json".to_string())],
                body: None,
            };
            let response = self.client.send(&request)?;
            if !(200..300).contains(&response.status) {
                return Err(schema_load(uri, format!("HTTP status {}", response.status)));
            }
            response.body.to_vec()
        } else {
            return Err(AssayError::UnsupportedSchemaSource(uri.to_string()));
        };

        serde_json::from_slice(&bytes).map_err(|e| schema_load(uri, format!("invalid JSON: {e}")))
    }
}

fn schema_load(uri: &str, reason: String) -> AssayError {
    AssayError::SchemaLoad {
        uri: uri.to_string(),
        reason,
    }
}

/// Validate the response body against the schema at `uri`.
///
/// An affirmative check that fails reports every violation at once. A negated
/// check that finds a conforming body is an ordinary predicate mismatch.
pub fn conforms_to_schema(
    cache: &mut SchemaCache,
    response: &Response,
    uri: &str,
    assert_true: bool,
) -> Result<()> {
    let document = response.json_document()?;
    let validator = cache.validator(uri)?;
    let violations: Vec<String> = validator
        .iter_errors(&document)
        .map(|e| e.to_string())
        .collect();

    if assert_true && !violations.is_empty() {
        return Err(AssayError::SchemaValidationError {
            uri: uri.to_string(),
            violations,
        });
    }
    verdict(
        violations.is_empty(),
        assert_true,
        "response body",
        "conform to schema",
        "document".to_string(),
        uri.to_string(),
    )
}
