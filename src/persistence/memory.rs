//! # Memory Persistence
//!
//! A self-contained implementation of the record contract. Saved rows live in a
//! [`MemoryStore`] shared by every [`MemoryModel`] of one engine, so tests can observe
//! exactly what the create strategy persisted.

use super::record::{ConnectionInfo, Model, Record};
use crate::attributes::{AttributeMap, AttributeValue};
use crate::error::{FactoryError, FactoryResult};
use dashmap::DashMap;
use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;
use tracing::debug;

const ADAPTER: &str = "memory";

/// Saved rows keyed by model name, then id
#[derive(Debug, Default)]
pub struct MemoryStore {
    tables: DashMap<String, BTreeMap<i64, AttributeMap>>,
    next_ids: DashMap<String, i64>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or update a row; returns the row id. Explicit ids move the model's id
    /// counter past them so generated ids never collide.
    pub fn save(&self, model: &str, id: Option<i64>, attributes: AttributeMap) -> i64 {
        let id = {
            let mut next_id = self.next_ids.entry(model.to_string()).or_insert(0);
            match id {
                Some(id) => {
                    *next_id = (*next_id).max(id);
                    id
                }
                None => {
                    *next_id += 1;
                    *next_id
                }
            }
        };

        self.tables
            .entry(model.to_string())
            .or_default()
            .insert(id, attributes);

        debug!(model = model, id = id, "Saved record to memory store");
        id
    }

    pub fn find(&self, model: &str, id: i64) -> Option<AttributeMap> {
        self.tables
            .get(model)
            .and_then(|table| table.get(&id).cloned())
    }

    pub fn remove(&self, model: &str, id: i64) -> bool {
        self.tables
            .get_mut(model)
            .map(|mut table| table.remove(&id).is_some())
            .unwrap_or(false)
    }

    /// Number of saved rows for a model
    pub fn count(&self, model: &str) -> usize {
        self.tables.get(model).map(|table| table.len()).unwrap_or(0)
    }

    pub fn clear(&self) {
        self.tables.clear();
        self.next_ids.clear();
    }
}

/// Target type backed by a [`MemoryStore`]
pub struct MemoryModel {
    name: String,
    store: Arc<MemoryStore>,
}

impl MemoryModel {
    pub fn new(name: impl Into<String>, store: Arc<MemoryStore>) -> Self {
        Self {
            name: name.into(),
            store,
        }
    }
}

impl Model for MemoryModel {
    fn name(&self) -> &str {
        &self.name
    }

    fn instantiate(&self) -> FactoryResult<Box<dyn Record>> {
        Ok(Box::new(MemoryRecord::new(&self.name, self.store.clone())))
    }
}

pub struct MemoryRecord {
    model: String,
    id: Option<i64>,
    persisted: bool,
    destroyed: bool,
    attributes: AttributeMap,
    store: Arc<MemoryStore>,
}

impl MemoryRecord {
    pub fn new(model: &str, store: Arc<MemoryStore>) -> Self {
        Self {
            model: model.to_string(),
            id: None,
            persisted: false,
            destroyed: false,
            attributes: AttributeMap::new(),
            store,
        }
    }

    fn persistence_error(&self, reason: String) -> FactoryError {
        FactoryError::Persistence {
            model: self.model.clone(),
            reason,
        }
    }

    fn ensure_not_destroyed(&self, operation: &str) -> FactoryResult<()> {
        if self.destroyed {
            return Err(self.persistence_error(format!("cannot {operation} a destroyed record")));
        }
        Ok(())
    }

    fn persisted_id(&self, operation: &str) -> FactoryResult<i64> {
        self.ensure_not_destroyed(operation)?;
        match (self.persisted, self.id) {
            (true, Some(id)) => Ok(id),
            _ => Err(self.persistence_error(format!(
                "cannot {operation} a record that was never saved"
            ))),
        }
    }

    pub fn is_destroyed(&self) -> bool {
        self.destroyed
    }
}

impl Record for MemoryRecord {
    fn model_name(&self) -> &str {
        &self.model
    }

    fn id(&self) -> Option<i64> {
        self.id
    }

    fn get(&self, attribute: &str) -> Option<AttributeValue> {
        if attribute == "id" {
            return Some(self.id.into());
        }
        self.attributes.get(attribute).cloned()
    }

    fn set(&mut self, attribute: &str, value: AttributeValue) -> FactoryResult<()> {
        if attribute == "id" {
            let id = match value.as_i64() {
                Some(id) => Some(id),
                None if value.is_null() => None,
                None => {
                    return Err(self.persistence_error(format!(
                        "id must be an integer, got {value:?}"
                    )))
                }
            };
            self.id = id;
            return Ok(());
        }
        self.attributes.insert(attribute.to_string(), value);
        Ok(())
    }

    fn attributes(&self) -> AttributeMap {
        let mut attributes = AttributeMap::with_capacity(self.attributes.len() + 1);
        attributes.insert("id".to_string(), self.id.into());
        attributes.extend(self.attributes.clone());
        attributes
    }

    fn is_new_record(&self) -> bool {
        !self.persisted && !self.destroyed
    }

    fn save(&mut self) -> FactoryResult<()> {
        self.ensure_not_destroyed("save")?;
        let id = self
            .store
            .save(&self.model, self.id, self.attributes.clone());
        self.id = Some(id);
        self.persisted = true;
        Ok(())
    }

    fn reload(&mut self) -> FactoryResult<()> {
        let id = self.persisted_id("reload")?;
        let row = self
            .store
            .find(&self.model, id)
            .ok_or_else(|| self.persistence_error(format!("record {id} no longer exists")))?;
        self.attributes = row;
        Ok(())
    }

    fn destroy(&mut self) -> FactoryResult<()> {
        let id = self.persisted_id("destroy")?;
        self.store.remove(&self.model, id);
        self.persisted = false;
        self.destroyed = true;
        Ok(())
    }

    fn connection(&self) -> FactoryResult<ConnectionInfo> {
        Ok(ConnectionInfo {
            adapter: ADAPTER.to_string(),
        })
    }

    fn increment(&mut self, attribute: &str, by: i64) -> FactoryResult<()> {
        let current = match self.attributes.get(attribute) {
            None => 0,
            Some(value) if value.is_null() => 0,
            Some(value) => value.as_i64().ok_or_else(|| {
                self.persistence_error(format!("attribute {attribute} is not numeric"))
            })?,
        };
        self.attributes
            .insert(attribute.to_string(), (current + by).into());
        self.save()
    }
}

impl fmt::Debug for MemoryRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MemoryRecord")
            .field("model", &self.model)
            .field("id", &self.id)
            .field("persisted", &self.persisted)
            .field("destroyed", &self.destroyed)
            .field("attributes", &self.attributes)
            .finish()
    }
}
