//! Captured HTTP response.

use super::client::RawResponse;
use crate::component::{split_path, PathValue, HTTP_RESPONSE};
use crate::error::{AssayError, Result, JSON_CONTENT_TYPES};
use crate::extract::JsonExtractor;
use crate::value::Value;
use bytes::Bytes;
use std::borrow::Cow;
use std::collections::BTreeMap;

#[derive(Debug)]
pub struct Response {
    status: u16,
    /// Lowercased header names; repeated headers joined with `,`.
    headers: BTreeMap<String, String>,
    body: Bytes,
    extractor: JsonExtractor,
}

impl Response {
    pub fn new<K, V>(status: u16, headers: impl IntoIterator<Item = (K, V)>, body: impl Into<Bytes>) -> Self
    where
        K: AsRef<str>,
        V: Into<String>,
    {
        let mut joined: BTreeMap<String, String> = BTreeMap::new();
        for (name, value) in headers {
            let value = value.into();
            joined
                .entry(name.as_ref().to_ascii_lowercase())
                .and_modify(|existing| {
                    existing.push(',');
                    existing.push_str(&value);
                })
                .or_insert(value);
        }

        Self {
            status,
            headers: joined,
            body: body.into(),
            extractor: JsonExtractor::new(),
        }
    }

    pub fn from_raw(raw: RawResponse) -> Self {
        Self::new(raw.status, raw.headers, raw.body)
    }

    pub fn status(&self) -> u16 {
        self.status
    }

    pub fn headers(&self) -> &BTreeMap<String, String> {
        &self.headers
    }

    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(&name.to_ascii_lowercase()).map(String::as_str)
    }

    pub fn body(&self) -> &[u8] {
        &self.body
    }

    pub fn text(&self) -> Cow<'_, str> {
        String::from_utf8_lossy(&self.body)
    }

    pub fn content_type(&self) -> Option<&str> {
        self.header("content-type").map(str::trim)
    }

    /// Fail unless the content type is exactly JSON or problem+json.
    ///
    /// Media type parameters are not stripped: `application/json; charset=utf-8`
    /// is rejected like any other value.
    pub fn require_json(&self) -> Result<()> {
        match self.content_type() {
            Some(ct) if JSON_CONTENT_TYPES.contains(&ct) => Ok(()),
            other => Err(AssayError::ContentTypeMismatch {
                actual: other.map(str::to_string),
            }),
        }
    }

    /// Value at a body path, after the content-type precondition.
    pub fn json_value(&self, path: &str) -> Result<Value> {
        self.require_json()?;
        self.extractor.extract(&self.body, path)
    }

    /// The whole parsed body, after the content-type precondition.
    pub fn json_document(&self) -> Result<serde_json::Value> {
        self.require_json()?;
        self.extractor.with_document(&self.body, serde_json::Value::clone)
    }
}

impl PathValue for Response {
    fn path_value(&self, path: &str) -> Result<Value> {
        match split_path(path) {
            ("status" | "statusCode", None) => Ok(Value::Number(f64::from(self.status))),
            ("headers", Some(name)) => Ok(self.header(name).map(Value::from).unwrap_or_default()),
            ("body", None) => Ok(Value::from(self.text().into_owned())),
            ("body", Some(rest)) => self.json_value(rest),
            _ => Err(AssayError::UnknownPath {
                component: HTTP_RESPONSE,
                path: path.to_string(),
            }),
        }
    }
}
