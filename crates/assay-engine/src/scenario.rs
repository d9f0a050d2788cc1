//! Per-scenario state.
//!
//! A [`ScenarioContext`] is created fresh for every scenario and dropped when
//! it ends, taking the registry, every response cache and the schema cache
//! with it. Only the HTTP client and the configuration are shared.

use crate::component::{Entity, ENTITY, HTTP_REQUEST, HTTP_RESPONSE, PROPERTIES};
use crate::config::EngineConfig;
use crate::error::Result;
use crate::expression;
use crate::files::{FileSource, LocalFiles};
use crate::http::{HttpClient, Request, Response};
use crate::predicate::SchemaCache;
use crate::registry::ComponentRegistry;
use crate::value::Value;
use std::fmt;
use std::sync::Arc;

pub struct ScenarioContext {
    registry: ComponentRegistry,
    schemas: SchemaCache,
    client: Arc<dyn HttpClient>,
    config: Arc<EngineConfig>,
}

impl fmt::Debug for ScenarioContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ScenarioContext")
            .field("registry", &self.registry)
            .field("schemas", &self.schemas)
            .finish_non_exhaustive()
    }
}

impl ScenarioContext {
    /// New scenario reading `file://` schemas from the configured working directory.
    pub fn new(config: Arc<EngineConfig>, client: Arc<dyn HttpClient>) -> Result<Self> {
        let files = Arc::new(LocalFiles::new(config.working_dir.clone()));
        Self::with_files(config, client, files)
    }

    pub fn with_files(
        config: Arc<EngineConfig>,
        client: Arc<dyn HttpClient>,
        files: Arc<dyn FileSource>,
    ) -> Result<Self> {
        let mut registry = ComponentRegistry::new();
        registry.register(PROPERTIES, config.properties().into(), "")?;

        Ok(Self {
            registry,
            schemas: SchemaCache::new(files, Arc::clone(&client)),
            client,
            config,
        })
    }

    pub fn registry(&self) -> &ComponentRegistry {
        &self.registry
    }

    pub fn registry_mut(&mut self) -> &mut ComponentRegistry {
        &mut self.registry
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Substitute expressions in a step argument.
    pub fn resolve(&self, src: &str) -> Result<String> {
        expression::resolve(src, &self.registry)
    }

    pub fn resolve_value(&self, src: &str) -> Result<Value> {
        expression::resolve_value(src, &self.registry)
    }

    /// Register a new request seeded with the configured base URL and headers.
    pub fn new_request(&mut self, alias: &str) -> Result<()> {
        let mut request = Request::new();
        if let Some(base_url) = &self.config.base_url {
            request.set_server_url(base_url.as_str())?;
        }
        for (name, value) in &self.config.default_headers {
            request.set_header(name, value.as_str())?;
        }
        self.registry.register(HTTP_REQUEST, request.into(), alias)
    }

    pub fn new_entity(&mut self, alias: &str, entity: Entity) -> Result<()> {
        self.registry.register(ENTITY, entity.into(), alias)
    }

    pub fn request(&self, alias: &str) -> Result<&Request> {
        self.registry.request(alias)
    }

    pub fn request_mut(&mut self, alias: &str) -> Result<&mut Request> {
        self.registry.request_mut(alias)
    }

    /// Submit a request and expose its response as `HttpResponse` under the
    /// same alias.
    pub fn submit(&mut self, alias: &str) -> Result<&Response> {
        let client = Arc::clone(&self.client);
        self.registry.request_mut(alias)?.submit(client.as_ref())?;
        self.registry.link(HTTP_RESPONSE, HTTP_REQUEST, alias)?;
        self.response(alias)
    }

    /// Response of the current or an aliased request.
    pub fn response(&self, alias: &str) -> Result<&Response> {
        self.registry.request(alias)?.response()
    }

    /// Response and schema cache together, for schema assertions.
    pub fn response_with_schemas(&mut self, alias: &str) -> Result<(&Response, &mut SchemaCache)> {
        let response = self.registry.request(alias)?.response()?;
        Ok((response, &mut self.schemas))
    }
}
