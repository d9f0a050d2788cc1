//! Credential entities supplied by test authors.

use super::PathValue;
use crate::error::{AssayError, Result};
use crate::value::Value;
use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use std::collections::BTreeMap;

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Entity {
    pub username: String,
    pub password: String,
    /// Extra named attributes (e.g. `clientId`).
    pub attributes: BTreeMap<String, String>,
}

impl Entity {
    pub fn new(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            password: password.into(),
            attributes: BTreeMap::new(),
        }
    }

    pub fn with_attribute(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.attributes.insert(name.into(), value.into());
        self
    }

    /// `Authorization` header value for HTTP basic authentication.
    pub fn basic_auth(&self) -> String {
        let token = STANDARD.encode(format!("{}:{}", self.username, self.password));
        format!("Basic {token}")
    }
}

impl PathValue for Entity {
    fn path_value(&self, path: &str) -> Result<Value> {
        match path {
            "username" => Ok(Value::from(self.username.as_str())),
            "password" => Ok(Value::from(self.password.as_str())),
            other => self
                .attributes
                .get(other)
                .map(|v| Value::from(v.as_str()))
                .ok_or_else(|| AssayError::UnknownPath {
                    component: super::ENTITY,
                    path: other.to_string(),
                }),
        }
    }
}
