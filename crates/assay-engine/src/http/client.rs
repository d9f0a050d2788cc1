//! HTTP transport capability.
//!
//! The engine never opens connections itself: every exchange goes through an
//! [`HttpClient`]. The trait is synchronous since steps run one after the
//! other and each blocks until its call completes. Timeouts belong to the
//! client implementation.

use super::method::Method;
use crate::error::{AssayError, Result};
use bytes::Bytes;
use reqwest::blocking::Client;
use std::time::Duration;
use tracing::debug;

/// Wire-level request handed to the client.
#[derive(Debug, Clone, PartialEq)]
pub struct OutgoingRequest {
    pub method: Method,
    pub url: String,
    pub headers: Vec<(String, String)>,
    pub body: Option<Bytes>,
}

/// Wire-level response returned by the client.
///
/// A header appearing several times is listed once per value.
#[derive(Debug, Clone, PartialEq)]
pub struct RawResponse {
    pub status: u16,
    pub headers: Vec<(String, String)>,
    pub body: Bytes,
}

/// Backend-agnostic HTTP transport.
pub trait HttpClient: Send + Sync {
    fn send(&self, request: &OutgoingRequest) -> Result<RawResponse>;
}

/// Blocking reqwest-backed client.
#[derive(Debug, Clone)]
pub struct ReqwestClient {
    client: Client,
}

impl ReqwestClient {
    pub fn new(timeout: Duration) -> Result<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| AssayError::Transport(format!("failed to build HTTP client: {e}")))?;
        Ok(Self { client })
    }
}

impl HttpClient for ReqwestClient {
    fn send(&self, request: &OutgoingRequest) -> Result<RawResponse> {
        let mut builder = self
            .client
            .request(request.method.into(), request.url.as_str());
        for (name, value) in &request.headers {
            builder = builder.header(name.as_str(), value.as_str());
        }
        if let Some(body) = &request.body {
            builder = builder.body(body.to_vec());
        }

        let response = builder
            .send()
            .map_err(|e| AssayError::Transport(e.to_string()))?;

        let status = response.status().as_u16();
        let headers = response
            .headers()
            .iter()
            .map(|(name, value)| {
                (
                    name.as_str().to_string(),
                    String::from_utf8_lossy(value.as_bytes()).into_owned(),
                )
            })
            .collect();
        let body = response
            .bytes()
            .map_err(|e| AssayError::Transport(format!("failed to read response body: {e}")))?;

        debug!(status, bytes = body.len(), "Response received");
        Ok(RawResponse {
            status,
            headers,
            body,
        })
    }
}
