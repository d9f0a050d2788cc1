//! Template expression resolution against the component registry.
//!
//! # Syntax
//!
//! - `{{Type.alias.path}}` - value at `path` of the component registered as
//!   `Type` under `alias`
//! - `{{Type.current.path}}` - same, against the unaliased current slot
//! - Whitespace inside the braces is ignored: `{{ HttpRequest.login.response.status }}`
//!
//! # Example
//!
//! ```text
//! Authorization: Bearer {{HttpRequest.login.response.body.token}}
//! ```
//!
//! Every distinct key is resolved once per call, then each token is replaced
//! by the textual form of its value. The first failing key aborts the call.

use crate::component::{PathValue, HTTP_RESPONSE};
use crate::error::{AssayError, Result};
use crate::registry::{ComponentRegistry, CURRENT};
use crate::value::Value;
use regex::{Captures, Regex};
use std::collections::HashMap;
use std::sync::OnceLock;
use tracing::debug;

static EXPRESSION_REGEX: OnceLock<Regex> = OnceLock::new();

fn expression_regex() -> &'static Regex {
    EXPRESSION_REGEX.get_or_init(|| {
        Regex::new(r"\{\{\s*((?:[a-zA-Z0-9_]+\.)*[a-zA-Z0-9_]+)\s*\}\}")
            .expect("expression pattern is a valid regex")
    })
}

/// A parsed `Type.Id.Path` key.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Expression<'a> {
    pub kind: &'a str,
    pub id: &'a str,
    pub path: &'a str,
}

impl<'a> Expression<'a> {
    /// Parse a raw key (the token text without braces).
    pub fn parse(key: &'a str) -> Result<Self> {
        let mut parts = key.trim().splitn(3, '.');
        match (parts.next(), parts.next(), parts.next()) {
            (Some(kind), Some(id), Some(path))
                if !kind.is_empty() && !id.is_empty() && !path.is_empty() =>
            {
                Ok(Self { kind, id, path })
            }
            _ => Err(AssayError::UnresolvableExpression {
                token: format!("{{{{{key}}}}}"),
                reason: "expected at least three segments: Type.Id.Path".to_string(),
            }),
        }
    }

    /// Registry alias addressed by this expression.
    pub fn alias(&self) -> &'a str {
        if self.id == CURRENT {
            ""
        } else {
            self.id
        }
    }

    /// Look up the component and read the value at the residual path.
    pub fn evaluate(&self, registry: &ComponentRegistry) -> Result<Value> {
        let component = registry.get(self.kind, self.alias()).ok_or_else(|| {
            AssayError::ComponentNotDefined {
                kind: self.kind.to_string(),
                alias: self.id.to_string(),
            }
        })?;
        let value = match self.kind {
            HTTP_RESPONSE => component.as_response()?.path_value(self.path)?,
            _ => component.path_value(self.path)?,
        };
        debug!(kind = self.kind, id = self.id, path = self.path, "Resolved expression");
        Ok(value)
    }
}

/// Substitute every expression token in `src` with its resolved text.
///
/// A string without tokens is returned unchanged. No partial substitution is
/// ever returned: any failing token fails the whole call.
pub fn resolve(src: &str, registry: &ComponentRegistry) -> Result<String> {
    let regex = expression_regex();
    let mut resolved: HashMap<&str, String> = HashMap::new();

    for caps in regex.captures_iter(src) {
        let Some(key) = caps.get(1).map(|m| m.as_str()) else {
            continue;
        };
        if resolved.contains_key(key) {
            continue;
        }
        let value = Expression::parse(key)?.evaluate(registry)?;
        resolved.insert(key, value.to_string());
    }

    if resolved.is_empty() {
        return Ok(src.to_string());
    }

    Ok(regex
        .replace_all(src, |caps: &Captures| {
            resolved.get(&caps[1]).cloned().unwrap_or_default()
        })
        .into_owned())
}

/// Typed resolution.
///
/// When `src` is a single expression token (surrounding whitespace allowed)
/// the component's value is returned as is, keeping numbers and booleans
/// typed. Anything else resolves to the substituted string.
pub fn resolve_value(src: &str, registry: &ComponentRegistry) -> Result<Value> {
    let trimmed = src.trim();
    if let Some(caps) = expression_regex().captures(trimmed) {
        if caps.get(0).is_some_and(|m| m.len() == trimmed.len()) {
            return Expression::parse(&caps[1])?.evaluate(registry);
        }
    }
    resolve(src, registry).map(Value::String)
}
