//! # Stubbed Records
//!
//! Lightweight stand-ins produced by the stub strategy. A stub carries its attributes
//! and a process-unique id, claims to be persisted, and refuses every operation that
//! would need a database.

use super::record::{ConnectionInfo, Record};
use crate::attributes::{AttributeMap, AttributeValue};
use crate::error::{FactoryError, FactoryResult};
use std::sync::atomic::{AtomicI64, Ordering};

/// Stub ids start above this offset and never repeat within the process
const STUB_ID_OFFSET: i64 = 1000;

static NEXT_STUB_ID: AtomicI64 = AtomicI64::new(STUB_ID_OFFSET);

fn next_stub_id() -> i64 {
    NEXT_STUB_ID.fetch_add(1, Ordering::SeqCst) + 1
}

#[derive(Debug)]
pub struct StubRecord {
    model: String,
    id: i64,
    attributes: AttributeMap,
}

impl StubRecord {
    pub fn new(model: impl Into<String>) -> Self {
        Self {
            model: model.into(),
            id: next_stub_id(),
            attributes: AttributeMap::new(),
        }
    }

    fn refuse<T>(&self, operation: &str) -> FactoryResult<T> {
        Err(FactoryError::stubbed(&self.model, operation))
    }
}

impl Record for StubRecord {
    fn model_name(&self) -> &str {
        &self.model
    }

    fn id(&self) -> Option<i64> {
        Some(self.id)
    }

    fn get(&self, attribute: &str) -> Option<AttributeValue> {
        if attribute == "id" {
            return Some(self.id.into());
        }
        self.attributes.get(attribute).cloned()
    }

    fn set(&mut self, attribute: &str, value: AttributeValue) -> FactoryResult<()> {
        // The id is fixed at construction; it is what keeps stubs distinguishable.
        if attribute != "id" {
            self.attributes.insert(attribute.to_string(), value);
        }
        Ok(())
    }

    fn attributes(&self) -> AttributeMap {
        let mut attributes = AttributeMap::with_capacity(self.attributes.len() + 1);
        attributes.insert("id".to_string(), self.id.into());
        attributes.extend(self.attributes.clone());
        attributes
    }

    fn is_new_record(&self) -> bool {
        false
    }

    fn save(&mut self) -> FactoryResult<()> {
        self.refuse("save")
    }

    fn reload(&mut self) -> FactoryResult<()> {
        self.refuse("reload")
    }

    fn destroy(&mut self) -> FactoryResult<()> {
        self.refuse("destroy")
    }

    fn connection(&self) -> FactoryResult<ConnectionInfo> {
        self.refuse("connection")
    }

    fn increment(&mut self, _attribute: &str, _by: i64) -> FactoryResult<()> {
        self.refuse("increment")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stub_ids_are_distinct_and_positive() {
        let first = StubRecord::new("User");
        let second = StubRecord::new("Post");
        assert!(first.id().unwrap() > STUB_ID_OFFSET);
        assert!(second.id().unwrap() > first.id().unwrap());
    }

    #[test]
    fn test_stub_refuses_persistence() {
        let mut stub = StubRecord::new("User");
        assert!(!stub.is_new_record());
        assert!(matches!(
            stub.save(),
            Err(FactoryError::StubbedObject { .. })
        ));
        assert!(stub.reload().is_err());
        assert!(stub.destroy().is_err());
        assert!(stub.connection().is_err());
        assert!(stub.increment("logins", 1).is_err());
    }

    #[test]
    fn test_stub_id_cannot_be_reassigned() {
        let mut stub = StubRecord::new("User");
        let id = stub.id();
        stub.set("id", 5.into()).unwrap();
        assert_eq!(stub.id(), id);
    }
}
