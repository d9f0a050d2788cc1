//! Path-addressable components stored in the scenario registry.
//!
//! # Module Structure
//!
//! - `entity` - User supplied credentials
//! - `properties` - Flattened configuration properties
//!
//! Requests live in [`crate::http`] and join the same enum. A submitted
//! request is also reachable as `HttpResponse` under its own alias, through
//! the same registry entry.

mod entity;
mod properties;

pub use entity::Entity;
pub use properties::Properties;

use crate::error::{AssayError, Result};
use crate::http::{Request, Response};
use crate::value::Value;

/// Logical type name of HTTP request components.
pub const HTTP_REQUEST: &str = "HttpRequest";
/// Logical type name under which submitted requests expose their response.
pub const HTTP_RESPONSE: &str = "HttpResponse";
/// Logical type name of credential entities.
pub const ENTITY: &str = "Entity";
/// Logical type name of the configuration properties provider.
pub const PROPERTIES: &str = "Properties";

/// Resolve the value at a dotted path.
///
/// Implementations may delegate the remainder of a path to a nested
/// component they own, e.g. a request hands `response.*` to its response.
pub trait PathValue {
    fn path_value(&self, path: &str) -> Result<Value>;
}

/// Split `head.rest` into its first segment and the remainder, if any.
pub(crate) fn split_path(path: &str) -> (&str, Option<&str>) {
    match path.split_once('.') {
        Some((head, rest)) => (head, Some(rest)),
        None => (path, None),
    }
}

#[derive(Debug)]
pub enum Component {
    Request(Box<Request>),
    Entity(Entity),
    Properties(Properties),
}

impl Component {
    /// Logical type name of the variant.
    pub fn kind(&self) -> &'static str {
        match self {
            Component::Request(_) => HTTP_REQUEST,
            Component::Entity(_) => ENTITY,
            Component::Properties(_) => PROPERTIES,
        }
    }

    pub fn as_request(&self) -> Result<&Request> {
        match self {
            Component::Request(request) => Ok(request),
            other => Err(other.wrong_kind(HTTP_REQUEST)),
        }
    }

    pub fn as_request_mut(&mut self) -> Result<&mut Request> {
        match self {
            Component::Request(request) => Ok(request),
            other => Err(other.wrong_kind(HTTP_REQUEST)),
        }
    }

    pub fn as_response(&self) -> Result<&Response> {
        match self {
            Component::Request(request) => request.response(),
            other => Err(other.wrong_kind(HTTP_RESPONSE)),
        }
    }

    pub fn as_entity(&self) -> Result<&Entity> {
        match self {
            Component::Entity(entity) => Ok(entity),
            other => Err(other.wrong_kind(ENTITY)),
        }
    }

    fn wrong_kind(&self, expected: &'static str) -> AssayError {
        AssayError::WrongComponentKind {
            expected,
            actual: self.kind(),
        }
    }
}

impl PathValue for Component {
    fn path_value(&self, path: &str) -> Result<Value> {
        match self {
            Component::Request(request) => request.path_value(path),
            Component::Entity(entity) => entity.path_value(path),
            Component::Properties(properties) => properties.path_value(path),
        }
    }
}

impl From<Request> for Component {
    fn from(request: Request) -> Self {
        Component::Request(Box::new(request))
    }
}

impl From<Entity> for Component {
    fn from(entity: Entity) -> Self {
        Component::Entity(entity)
    }
}

impl From<Properties> for Component {
    fn from(properties: Properties) -> Self {
        Component::Properties(properties)
    }
}
