//! # Model Catalog
//!
//! Maps target type names to the [`Model`]s that instantiate them. Hosts register their
//! own models; unregistered names fall back to a [`MemoryModel`] on the catalog's shared
//! [`MemoryStore`] unless the catalog is strict.

use crate::error::{FactoryError, FactoryResult};
use crate::persistence::{MemoryModel, MemoryStore, Model};
use parking_lot::RwLock;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{info, warn};

pub struct ModelCatalog {
    models: RwLock<HashMap<String, Arc<dyn Model>>>,
    store: Arc<MemoryStore>,
    strict: bool,
}

impl ModelCatalog {
    pub fn new(strict: bool) -> Self {
        Self {
            models: RwLock::new(HashMap::new()),
            store: Arc::new(MemoryStore::new()),
            strict,
        }
    }

    /// Register a model under its own name, replacing any previous one
    pub fn register(&self, model: Arc<dyn Model>) {
        let name = model.name().to_string();
        self.models.write().insert(name.clone(), model);
        info!(model = %name, "Registered model");
    }

    pub fn resolve(&self, name: &str) -> FactoryResult<Arc<dyn Model>> {
        if let Some(model) = self.models.read().get(name) {
            return Ok(model.clone());
        }

        if self.strict {
            return Err(FactoryError::UnknownModel {
                name: name.to_string(),
            });
        }

        let mut models = self.models.write();
        let model = models
            .entry(name.to_string())
            .or_insert_with(|| {
                warn!(model = name, "No model registered, falling back to in-memory model");
                let fallback: Arc<dyn Model> = Arc::new(MemoryModel::new(name, self.store.clone()));
                fallback
            })
            .clone();
        Ok(model)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.models.read().contains_key(name)
    }

    /// Store shared by every fallback model
    pub fn store(&self) -> &Arc<MemoryStore> {
        &self.store
    }

    pub fn is_strict(&self) -> bool {
        self.strict
    }

    /// Forget registered models and every saved in-memory row
    pub fn clear(&self) {
        self.models.write().clear();
        self.store.clear();
    }
}
