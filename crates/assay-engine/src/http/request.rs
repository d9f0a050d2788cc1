//! HTTP request state machine.
//!
//! `Created` (no headers) -> `Configured` (any setter, any number of times)
//! -> `Submitted` (response attached). Once submitted, every setter fails
//! and the request and its response stay exactly as they were.

use super::client::{HttpClient, OutgoingRequest};
use super::method::Method;
use super::response::Response;
use crate::component::{split_path, PathValue, HTTP_REQUEST};
use crate::error::{AssayError, Result};
use crate::value::Value;
use bytes::Bytes;
use std::collections::BTreeMap;
use tracing::{info, warn};

/// Encoding used to send form attributes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormEncoding {
    UrlEncoded,
    Multipart,
}

impl FormEncoding {
    pub fn content_type(&self) -> &'static str {
        match self {
            FormEncoding::UrlEncoded => "application/x-www-form-urlencoded",
            FormEncoding::Multipart => "multipart/form-data",
        }
    }
}

/// Request payload: a raw body and a form are mutually exclusive.
#[derive(Debug, Clone, Default, PartialEq)]
pub enum Payload {
    #[default]
    Empty,
    Raw(Bytes),
    Form {
        encoding: FormEncoding,
        fields: BTreeMap<String, String>,
    },
}

#[derive(Debug, Default)]
pub struct Request {
    method: Method,
    server_url: String,
    path: String,
    /// Header names are stored lowercased; the last write wins.
    headers: BTreeMap<String, String>,
    payload: Payload,
    response: Option<Response>,
}

impl Request {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn method(&self) -> Method {
        self.method
    }

    pub fn server_url(&self) -> &str {
        &self.server_url
    }

    pub fn path(&self) -> &str {
        &self.path
    }

    pub fn headers(&self) -> &BTreeMap<String, String> {
        &self.headers
    }

    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(&name.to_ascii_lowercase()).map(String::as_str)
    }

    pub fn payload(&self) -> &Payload {
        &self.payload
    }

    pub fn is_submitted(&self) -> bool {
        self.response.is_some()
    }

    pub fn response(&self) -> Result<&Response> {
        self.response.as_ref().ok_or(AssayError::RequestNotSubmitted)
    }

    pub fn set_method(&mut self, method: &str) -> Result<()> {
        self.ensure_mutable("method")?;
        self.method = method.parse()?;
        Ok(())
    }

    pub fn set_server_url(&mut self, url: impl Into<String>) -> Result<()> {
        self.ensure_mutable("url")?;
        self.server_url = url.into();
        Ok(())
    }

    pub fn set_path(&mut self, path: impl Into<String>) -> Result<()> {
        self.ensure_mutable("path")?;
        self.path = path.into();
        Ok(())
    }

    pub fn set_header(&mut self, name: &str, value: impl Into<String>) -> Result<()> {
        self.ensure_mutable("header")?;
        self.headers.insert(name.to_ascii_lowercase(), value.into());
        Ok(())
    }

    /// Set a raw body, discarding any form attributes.
    pub fn set_body(&mut self, body: impl Into<Bytes>) -> Result<()> {
        self.ensure_mutable("body")?;
        self.payload = Payload::Raw(body.into());
        Ok(())
    }

    /// Add a form attribute, discarding any raw body.
    ///
    /// Switching encoding keeps the attributes collected so far.
    pub fn set_form_field(
        &mut self,
        encoding: FormEncoding,
        name: impl Into<String>,
        value: impl Into<String>,
    ) -> Result<()> {
        self.ensure_mutable("form")?;
        let mut fields = match std::mem::take(&mut self.payload) {
            Payload::Form { fields, .. } => fields,
            Payload::Empty | Payload::Raw(_) => BTreeMap::new(),
        };
        fields.insert(name.into(), value.into());
        self.payload = Payload::Form { encoding, fields };
        Ok(())
    }

    /// `server_url + path`, concatenated as written.
    pub fn full_url(&self) -> String {
        format!("{}{}", self.server_url, self.path)
    }

    /// Send the request and attach the response. Happens at most once.
    ///
    /// Transport failures are propagated as is and leave the request
    /// unsubmitted.
    pub fn submit(&mut self, client: &dyn HttpClient) -> Result<&Response> {
        self.ensure_mutable("response")?;

        let outgoing = self.to_outgoing();
        info!(method = %outgoing.method, url = %outgoing.url, "Submitting request");

        let raw = client.send(&outgoing).inspect_err(|e| {
            warn!(method = %outgoing.method, url = %outgoing.url, "Request failed: {}", e);
        })?;

        let response = Response::from_raw(raw);
        info!(url = %outgoing.url, status = response.status(), "Received response");
        Ok(&*self.response.insert(response))
    }

    /// Assemble the wire-level request.
    pub fn to_outgoing(&self) -> OutgoingRequest {
        let mut headers = self.headers.clone();
        let body = match &self.payload {
            Payload::Empty => None,
            Payload::Raw(bytes) => Some(bytes.clone()),
            Payload::Form {
                encoding: FormEncoding::UrlEncoded,
                fields,
            } => {
                headers
                    .entry("content-type".to_string())
                    .or_insert_with(|| FormEncoding::UrlEncoded.content_type().to_string());
                Some(Bytes::from(encode_urlencoded(fields)))
            }
            Payload::Form {
                encoding: FormEncoding::Multipart,
                fields,
            } => {
                let boundary = format!("assay-{}", uuid::Uuid::new_v4().simple());
                headers.insert(
                    "content-type".to_string(),
                    format!(
                        "{}; boundary={boundary}",
                        FormEncoding::Multipart.content_type()
                    ),
                );
                Some(Bytes::from(encode_multipart(fields, &boundary)))
            }
        };

        OutgoingRequest {
            method: self.method,
            url: self.full_url(),
            headers: headers.into_iter().collect(),
            body,
        }
    }

    fn ensure_mutable(&self, field: &'static str) -> Result<()> {
        if self.is_submitted() {
            return Err(AssayError::ImmutableRequestMutation { field });
        }
        Ok(())
    }
}

fn encode_urlencoded(fields: &BTreeMap<String, String>) -> String {
    fields
        .iter()
        .map(|(k, v)| format!("{}={}", urlencoding::encode(k), urlencoding::encode(v)))
        .collect::<Vec<_>>()
        .join("&")
}

fn encode_multipart(fields: &BTreeMap<String, String>, boundary: &str) -> String {
    let mut body = String::new();
    for (name, value) in fields {
        body.push_str(&format!(
            "--{boundary}\r\nContent-Disposition: form-data; name=\"{name}\"\r\n\r\n{value}\r\n"
        ));
    }
    body.push_str(&format!("--{boundary}--\r\n"));
    body
}

impl PathValue for Request {
    fn path_value(&self, path: &str) -> Result<Value> {
        match split_path(path) {
            ("method", None) => Ok(Value::from(self.method.as_str())),
            ("url", None) => Ok(Value::from(self.server_url.as_str())),
            ("path", None) => Ok(Value::from(self.path.as_str())),
            ("headers", Some(name)) => Ok(self
                .header(name)
                .map(Value::from)
                .unwrap_or_default()),
            ("body", None) => Ok(match &self.payload {
                Payload::Raw(bytes) => Value::from(String::from_utf8_lossy(bytes).into_owned()),
                _ => Value::Absent,
            }),
            ("form", Some(field)) => Ok(match &self.payload {
                Payload::Form { fields, .. } => {
                    fields.get(field).map(|v| Value::from(v.as_str())).unwrap_or_default()
                }
                _ => Value::Absent,
            }),
            ("response", Some(rest)) => self.response()?.path_value(rest),
            _ => Err(AssayError::UnknownPath {
                component: HTTP_REQUEST,
                path: path.to_string(),
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::http::RawResponse;

    struct FixedClient {
        status: u16,
        body: &'static str,
    }

    impl HttpClient for FixedClient {
        fn send(&self, _request: &OutgoingRequest) -> Result<RawResponse> {
            Ok(RawResponse {
                status: self.status,
                headers: vec![("Content-Type".to_string(), "application/json".to_string())],
                body: Bytes::from_static(self.body.as_bytes()),
            })
        }
    }

    struct FailingClient;

    impl HttpClient for FailingClient {
        fn send(&self, _request: &OutgoingRequest) -> Result<RawResponse> {
            Err(AssayError::Transport("connection refused".to_string()))
        }
    }

    fn create_test_request() -> Request {
        let mut request = Request::new();
        request.set_server_url("http://api.test").unwrap();
        request.set_path("/users").unwrap();
        request.set_method("post").unwrap();
        request.set_header("Accept", "application/json").unwrap();
        request.set_body(r#"{"name":"alice"}"#).unwrap();
        request
    }

    #[test]
    fn test_full_url_is_plain_concatenation() {
        let mut request = Request::new();
        request.set_server_url("http://api.test").unwrap();
        assert_eq!(request.full_url(), "http://api.test");
        request.set_path("/v1").unwrap();
        assert_eq!(request.full_url(), "http://api.test/v1");
        request.set_server_url("http://api.test/").unwrap();
        assert_eq!(request.full_url(), "http://api.test//v1");
        request.set_path("?page=2").unwrap();
        assert_eq!(request.full_url(), "http://api.test/?page=2");
    }

    #[test]
    fn test_headers_last_write_wins() {
        let mut request = Request::new();
        request.set_header("X-Trace", "1").unwrap();
        request.set_header("x-trace", "2").unwrap();
        assert_eq!(request.headers().len(), 1);
        assert_eq!(request.header("X-TRACE"), Some("2"));
    }

    #[test]
    fn test_body_and_form_are_exclusive() {
        let mut request = Request::new();
        request.set_body("raw").unwrap();
        request
            .set_form_field(FormEncoding::UrlEncoded, "a", "1")
            .unwrap();
        assert_eq!(request.path_value("body").unwrap(), Value::Absent);
        assert_eq!(request.path_value("form.a").unwrap(), Value::from("1"));

        request.set_body("raw again").unwrap();
        assert_eq!(request.path_value("form.a").unwrap(), Value::Absent);
        assert_eq!(request.payload(), &Payload::Raw(Bytes::from_static(b"raw again")));
    }

    #[test]
    fn test_urlencoded_form_outgoing() {
        let mut request = Request::new();
        request
            .set_form_field(FormEncoding::UrlEncoded, "name", "Jane Doe")
            .unwrap();
        request
            .set_form_field(FormEncoding::UrlEncoded, "city", "a&b")
            .unwrap();

        let outgoing = request.to_outgoing();
        assert_eq!(
            outgoing.body.as_deref(),
            Some(b"city=a%26b&name=Jane%20Doe".as_slice())
        );
        assert!(outgoing.headers.contains(&(
            "content-type".to_string(),
            "application/x-www-form-urlencoded".to_string()
        )));
    }

    #[test]
    fn test_multipart_form_outgoing() {
        let mut request = Request::new();
        request
            .set_form_field(FormEncoding::Multipart, "file", "content")
            .unwrap();

        let outgoing = request.to_outgoing();
        let (_, content_type) = outgoing
            .headers
            .iter()
            .find(|(k, _)| k == "content-type")
            .unwrap();
        let boundary = content_type.split("boundary=").nth(1).unwrap();
        let body = String::from_utf8(outgoing.body.unwrap().to_vec()).unwrap();
        assert!(body.starts_with(&format!("--{boundary}\r\n")));
        assert!(body.contains("name=\"file\"\r\n\r\ncontent\r\n"));
        assert!(body.ends_with(&format!("--{boundary}--\r\n")));
    }

    #[test]
    fn test_submit_attaches_response() {
        let mut request = create_test_request();
        let response = request
            .submit(&FixedClient {
                status: 201,
                body: r#"{"id":"abc"}"#,
            })
            .unwrap();
        assert_eq!(response.status(), 201);

        assert!(request.is_submitted());
        assert_eq!(
            request.path_value("response.status").unwrap(),
            Value::Number(201.0)
        );
        assert_eq!(
            request.path_value("response.body.id").unwrap(),
            Value::from("abc")
        );
    }

    #[test]
    fn test_submitted_request_is_immutable() {
        let mut request = create_test_request();
        request
            .submit(&FixedClient {
                status: 200,
                body: "{}",
            })
            .unwrap();

        assert!(matches!(
            request.set_header("Accept", "text/plain"),
            Err(AssayError::ImmutableRequestMutation { field: "header" })
        ));
        assert!(matches!(
            request.set_body("other"),
            Err(AssayError::ImmutableRequestMutation { field: "body" })
        ));
        assert!(matches!(
            request.set_method("GET"),
            Err(AssayError::ImmutableRequestMutation { field: "method" })
        ));
        assert!(matches!(
            request.submit(&FixedClient {
                status: 500,
                body: "{}",
            }),
            Err(AssayError::ImmutableRequestMutation { .. })
        ));

        // Previously set fields and the response are untouched
        assert_eq!(request.method(), Method::Post);
        assert_eq!(request.header("accept"), Some("application/json"));
        assert_eq!(
            request.path_value("body").unwrap(),
            Value::from(r#"{"name":"alice"}"#)
        );
        assert_eq!(request.response().unwrap().status(), 200);
    }

    #[test]
    fn test_transport_failure_leaves_request_unsubmitted() {
        let mut request = create_test_request();
        let err = request.submit(&FailingClient).unwrap_err();
        assert!(matches!(err, AssayError::Transport(_)));
        assert!(!request.is_submitted());
        assert!(request.set_path("/retry").is_ok());
    }

    #[test]
    fn test_request_paths() {
        let request = create_test_request();
        assert_eq!(request.path_value("method").unwrap(), Value::from("POST"));
        assert_eq!(request.path_value("url").unwrap(), Value::from("http://api.test"));
        assert_eq!(request.path_value("path").unwrap(), Value::from("/users"));
        assert_eq!(
            request.path_value("headers.Accept").unwrap(),
            Value::from("application/json")
        );
        assert_eq!(request.path_value("headers.missing").unwrap(), Value::Absent);
        assert!(matches!(
            request.path_value("response.status"),
            Err(AssayError::RequestNotSubmitted)
        ));
        assert!(matches!(
            request.path_value("nothing"),
            Err(AssayError::UnknownPath { .. })
        ));
    }
}
