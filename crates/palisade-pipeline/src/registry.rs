//! Metadata registry.
//!
//! The registry follows a build-then-freeze lifecycle. Descriptors are
//! registered through a [`RegistryBuilder`] during startup; [`build`] turns it
//! into a [`MetadataRegistry`] that has no mutating methods, so concurrent
//! lookups need no locking.
//!
//! [`build`]: RegistryBuilder::build

use std::collections::HashMap;
use std::sync::Arc;

use palisade_core::{PipelineError, PipelineResult};

use crate::descriptor::HandlerDescriptor;

/// Collects handler descriptors before traffic starts.
#[derive(Debug, Default)]
pub struct RegistryBuilder {
    handlers: HashMap<String, Arc<HandlerDescriptor>>,
}

impl RegistryBuilder {
    /// Registers a descriptor under its handler id.
    ///
    /// # Errors
    ///
    /// Returns `PipelineError::Config` if the id is empty or already
    /// registered.
    pub fn register(mut self, descriptor: HandlerDescriptor) -> PipelineResult<Self> {
        let id = descriptor.id().to_string();

        if id.is_empty() {
            return Err(PipelineError::config("handler id must not be empty"));
        }

        if self.handlers.contains_key(&id) {
            return Err(PipelineError::config(format!(
                "handler '{id}' is already registered"
            )));
        }

        tracing::debug!(handler_id = %id, "registered handler");
        self.handlers.insert(id, Arc::new(descriptor));
        Ok(self)
    }

    /// Freezes the registry.
    #[must_use]
    pub fn build(self) -> MetadataRegistry {
        MetadataRegistry {
            handlers: self.handlers,
        }
    }
}

/// Read-only lookup from handler id to descriptor.
#[derive(Debug, Default)]
pub struct MetadataRegistry {
    handlers: HashMap<String, Arc<HandlerDescriptor>>,
}

impl MetadataRegistry {
    /// Starts a new registry.
    #[must_use]
    pub fn builder() -> RegistryBuilder {
        RegistryBuilder::default()
    }

    /// Looks up a handler.
    ///
    /// # Errors
    ///
    /// Returns `PipelineError::NotFound` if no handler is registered under
    /// `handler_id`.
    pub fn resolve(&self, handler_id: &str) -> PipelineResult<Arc<HandlerDescriptor>> {
        self.handlers.get(handler_id).cloned().ok_or_else(|| {
            PipelineError::not_found(format!("No handler registered for '{handler_id}'"))
        })
    }

    /// Returns `true` if `handler_id` is registered.
    #[must_use]
    pub fn contains(&self, handler_id: &str) -> bool {
        self.handlers.contains_key(handler_id)
    }

    /// Number of registered handlers.
    #[must_use]
    pub fn len(&self) -> usize {
        self.handlers.len()
    }

    /// Returns `true` if nothing is registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.handlers.is_empty()
    }

    /// Registered handler ids, sorted.
    #[must_use]
    pub fn handler_ids(&self) -> Vec<&str> {
        let mut ids: Vec<&str> = self.handlers.keys().map(String::as_str).collect();
        ids.sort_unstable();
        ids
    }
}
