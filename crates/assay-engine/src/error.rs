//! Error types shared by the registry, resolver, exchange model and predicates.
//!
//! Every failure is local and synchronous: it is returned to the step that
//! triggered it and surfaced verbatim as the step failure reason.

/// Result alias used throughout the engine.
pub type Result<T, E = AssayError> = std::result::Result<T, E>;

/// Content types accepted for body-path and schema assertions.
pub const JSON_CONTENT_TYPES: [&str; 2] = ["application/json", "application/problem+json"];

#[derive(Debug, thiserror::Error)]
pub enum AssayError {
    #[error("Unresolvable expression '{token}': {reason}")]
    UnresolvableExpression { token: String, reason: String },

    #[error("Component {kind} with alias '{alias}' is not defined")]
    ComponentNotDefined { kind: String, alias: String },

    #[error("Component {kind} with alias '{alias}' is already defined")]
    DuplicateAliasDefinition { kind: String, alias: String },

    #[error("Cannot set {field}: request has already been submitted")]
    ImmutableRequestMutation { field: &'static str },

    #[error("Request has not been submitted yet, no response available")]
    RequestNotSubmitted,

    #[error("Value at '{path}' is not {expected}: {actual}")]
    TypeMismatch {
        path: String,
        expected: &'static str,
        actual: String,
    },

    #[error("Cannot coerce value at '{path}' to a number: {actual}")]
    CoercionError { path: String, actual: String },

    #[error("Failed to extract '{path}': {reason}")]
    PathExtractionError { path: String, reason: String },

    #[error(
        "Unexpected content-type '{}', expected one of: {}",
        content_type_label(.actual),
        JSON_CONTENT_TYPES.join(", ")
    )]
    ContentTypeMismatch { actual: Option<String> },

    #[error("Response body does not conform to schema {uri}:\n{}", join_lines(.violations))]
    SchemaValidationError { uri: String, violations: Vec<String> },

    #[error("Failed to load schema {uri}: {reason}")]
    SchemaLoad { uri: String, reason: String },

    #[error("Unsupported schema source '{0}', expected file://, http:// or https://")]
    UnsupportedSchemaSource(String),

    #[error("{subject}: expected {actual} {} {operator} {expected}", expectation(.negated))]
    PredicateMismatch {
        subject: String,
        operator: &'static str,
        actual: String,
        expected: String,
        negated: bool,
    },

    #[error("Invalid pattern '{pattern}': {reason}")]
    InvalidPattern { pattern: String, reason: String },

    #[error("{component} has no value at path '{path}'")]
    UnknownPath { component: &'static str, path: String },

    #[error("Expected a {expected} component, found {actual}")]
    WrongComponentKind {
        expected: &'static str,
        actual: &'static str,
    },

    #[error("HTTP request failed: {0}")]
    Transport(String),

    #[error("Undefined step: {0}")]
    UndefinedStep(String),

    #[error("Step is missing its {0}")]
    MissingStepArgument(String),

    #[error("Step argument '{name}' is invalid: {reason}")]
    InvalidStepArgument { name: String, reason: String },
}

fn content_type_label(actual: &Option<String>) -> &str {
    actual.as_deref().unwrap_or("<none>")
}

fn join_lines(lines: &[String]) -> String {
    lines.join("\n")
}

fn expectation(negated: &bool) -> &'static str {
    if *negated {
        "not to"
    } else {
        "to"
    }
}

impl AssayError {
    /// Whether this error is an assertion verdict rather than an evaluation problem.
    pub fn is_mismatch(&self) -> bool {
        matches!(
            self,
            AssayError::PredicateMismatch { .. } | AssayError::SchemaValidationError { .. }
        )
    }
}
