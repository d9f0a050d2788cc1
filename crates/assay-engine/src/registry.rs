//! Per-scenario component registry.
//!
//! Components are stored once in an arena; the unaliased "current" slot and
//! the alias map of each type hold indices into it. A component registered
//! under an alias is therefore the same instance as the current slot, and a
//! mutation through either name is visible through both.
//!
//! There is no unregister operation: components live as long as the scenario.

use crate::component::{Component, Entity, HTTP_REQUEST};
use crate::error::{AssayError, Result};
use crate::http::Request;
use std::collections::HashMap;
use tracing::{debug, warn};

/// Id conventionally used in expressions to address the unaliased slot.
pub const CURRENT: &str = "current";

#[derive(Debug, Default)]
struct Slot {
    current: Option<usize>,
    aliases: HashMap<String, usize>,
}

#[derive(Debug, Default)]
pub struct ComponentRegistry {
    components: Vec<Component>,
    slots: HashMap<String, Slot>,
}

impl ComponentRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a component under `kind`, optionally aliased.
    ///
    /// A non-empty alias may be registered at most once per type; a repeat
    /// fails with `DuplicateAliasDefinition` and leaves the registry untouched.
    /// The current slot of `kind` is always overwritten on success.
    pub fn register(&mut self, kind: &str, component: Component, alias: &str) -> Result<()> {
        if !alias.is_empty()
            && self
                .slots
                .get(kind)
                .is_some_and(|slot| slot.aliases.contains_key(alias))
        {
            warn!(kind, alias, "Duplicate alias definition rejected");
            return Err(AssayError::DuplicateAliasDefinition {
                kind: kind.to_string(),
                alias: alias.to_string(),
            });
        }

        let index = self.components.len();
        self.components.push(component);
        self.occupy(kind, alias, index);

        debug!(kind, alias, "Registered component");
        Ok(())
    }

    /// Expose the component stored as `source` under `alias` as `kind` too.
    ///
    /// Both names address the same entry. Linking an alias again replaces
    /// the previous link.
    pub fn link(&mut self, kind: &str, source: &str, alias: &str) -> Result<()> {
        let index = self
            .index_of(source, alias)
            .ok_or_else(|| not_defined(source, alias))?;
        self.occupy(kind, alias, index);

        debug!(kind, source, alias, "Linked component");
        Ok(())
    }

    fn occupy(&mut self, kind: &str, alias: &str, index: usize) {
        let slot = self.slots.entry(kind.to_string()).or_default();
        if !alias.is_empty() {
            slot.aliases.insert(alias.to_string(), index);
        }
        slot.current = Some(index);
    }

    /// Look up a component. An empty alias returns the current slot; an alias
    /// never falls back to the current slot.
    pub fn get(&self, kind: &str, alias: &str) -> Option<&Component> {
        self.index_of(kind, alias).map(|i| &self.components[i])
    }

    pub fn get_mut(&mut self, kind: &str, alias: &str) -> Option<&mut Component> {
        self.index_of(kind, alias).map(|i| &mut self.components[i])
    }

    /// Like [`get`](Self::get), failing with `ComponentNotDefined` when absent.
    pub fn require(&self, kind: &str, alias: &str) -> Result<&Component> {
        self.get(kind, alias).ok_or_else(|| not_defined(kind, alias))
    }

    pub fn require_mut(&mut self, kind: &str, alias: &str) -> Result<&mut Component> {
        self.get_mut(kind, alias).ok_or_else(|| not_defined(kind, alias))
    }

    /// Typed accessor for an HTTP request.
    pub fn request(&self, alias: &str) -> Result<&Request> {
        self.require(HTTP_REQUEST, alias)?.as_request()
    }

    pub fn request_mut(&mut self, alias: &str) -> Result<&mut Request> {
        self.require_mut(HTTP_REQUEST, alias)?.as_request_mut()
    }

    /// Typed accessor for a credential entity.
    pub fn entity(&self, alias: &str) -> Result<&Entity> {
        self.require(crate::component::ENTITY, alias)?.as_entity()
    }

    fn index_of(&self, kind: &str, alias: &str) -> Option<usize> {
        let slot = self.slots.get(kind)?;
        if alias.is_empty() {
            slot.current
        } else {
            slot.aliases.get(alias).copied()
        }
    }
}

fn not_defined(kind: &str, alias: &str) -> AssayError {
    AssayError::ComponentNotDefined {
        kind: kind.to_string(),
        alias: alias.to_string(),
    }
}
