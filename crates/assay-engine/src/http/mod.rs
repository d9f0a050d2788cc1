//! HTTP exchange model.
//!
//! A [`Request`] is mutable until it is submitted; submission attaches a
//! [`Response`] and every later mutation fails with
//! `ImmutableRequestMutation`. Transport is delegated to an injected
//! [`HttpClient`].
//!
//! ## Module Structure
//!
//! - `method`: HTTP verbs
//! - `request`: request builder and state machine
//! - `response`: captured response with body path access
//! - `client`: transport capability and its reqwest implementation

mod client;
mod method;
mod request;
mod response;

pub use client::{HttpClient, OutgoingRequest, RawResponse, ReqwestClient};
pub use method::Method;
pub use request::{FormEncoding, Payload, Request};
pub use response::Response;
