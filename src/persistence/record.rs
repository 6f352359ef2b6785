//! # Record Contract
//!
//! The persistence collaborator the engine drives. The engine never persists anything
//! itself: it instantiates records through a [`Model`], assigns attributes with
//! [`Record::set`] and calls [`Record::save`] for the create strategy.

use crate::attributes::{to_json_map, AttributeMap, AttributeValue};
use crate::error::FactoryResult;
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;
use std::sync::Arc;

/// Description of the store a record talks to
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConnectionInfo {
    pub adapter: String,
}

/// A live target object
pub trait Record: fmt::Debug + Send + Sync {
    /// Name of the target type this record belongs to
    fn model_name(&self) -> &str;

    fn id(&self) -> Option<i64>;

    fn get(&self, attribute: &str) -> Option<AttributeValue>;

    fn set(&mut self, attribute: &str, value: AttributeValue) -> FactoryResult<()>;

    /// Snapshot of every attribute, in assignment order
    fn attributes(&self) -> AttributeMap;

    fn is_new_record(&self) -> bool;

    fn save(&mut self) -> FactoryResult<()>;

    fn reload(&mut self) -> FactoryResult<()>;

    fn destroy(&mut self) -> FactoryResult<()>;

    fn connection(&self) -> FactoryResult<ConnectionInfo>;

    /// Add `by` to a numeric attribute and persist the change immediately
    fn increment(&mut self, attribute: &str, by: i64) -> FactoryResult<()>;
}

/// A target type: knows its name and how to produce blank records
pub trait Model: Send + Sync {
    fn name(&self) -> &str;

    fn instantiate(&self) -> FactoryResult<Box<dyn Record>>;
}

/// Shared handle to a produced record.
///
/// Cloning the handle shares the record; associated objects are held this way by the
/// records that reference them.
#[derive(Clone)]
pub struct Instance {
    inner: Arc<RwLock<Box<dyn Record>>>,
}

impl Instance {
    pub fn new(record: Box<dyn Record>) -> Self {
        Self {
            inner: Arc::new(RwLock::new(record)),
        }
    }

    pub fn model_name(&self) -> String {
        self.inner.read().model_name().to_string()
    }

    pub fn id(&self) -> Option<i64> {
        self.inner.read().id()
    }

    pub fn get(&self, attribute: &str) -> Option<AttributeValue> {
        self.inner.read().get(attribute)
    }

    /// String attribute, or `None` when missing or not a string
    pub fn get_str(&self, attribute: &str) -> Option<String> {
        self.get(attribute)
            .and_then(|value| value.as_str().map(str::to_string))
    }

    /// Associated record held in an attribute
    pub fn get_record(&self, attribute: &str) -> Option<Instance> {
        match self.get(attribute) {
            Some(AttributeValue::Record(instance)) => Some(instance),
            _ => None,
        }
    }

    pub fn set(&self, attribute: &str, value: impl Into<AttributeValue>) -> FactoryResult<()> {
        self.inner.write().set(attribute, value.into())
    }

    pub fn attributes(&self) -> AttributeMap {
        self.inner.read().attributes()
    }

    pub fn is_new_record(&self) -> bool {
        self.inner.read().is_new_record()
    }

    pub fn save(&self) -> FactoryResult<()> {
        self.inner.write().save()
    }

    pub fn reload(&self) -> FactoryResult<()> {
        self.inner.write().reload()
    }

    pub fn destroy(&self) -> FactoryResult<()> {
        self.inner.write().destroy()
    }

    pub fn connection(&self) -> FactoryResult<ConnectionInfo> {
        self.inner.read().connection()
    }

    pub fn increment(&self, attribute: &str, by: i64) -> FactoryResult<()> {
        self.inner.write().increment(attribute, by)
    }

    /// Run a closure against the underlying record
    pub fn with_record<R>(&self, f: impl FnOnce(&mut dyn Record) -> R) -> R {
        let mut record = self.inner.write();
        f(&mut **record)
    }

    pub fn to_json(&self) -> Value {
        Value::Object(to_json_map(&self.attributes()))
    }

    pub fn ptr_eq(&self, other: &Instance) -> bool {
        Arc::ptr_eq(&self.inner, &other.inner)
    }
}

impl fmt::Debug for Instance {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.inner.try_read() {
            Some(record) => write!(f, "Instance({record:?})"),
            None => write!(f, "Instance(<locked>)"),
        }
    }
}
