//! # Factory Definitions
//!
//! The registration surface: a builder describing one factory as declared, before any
//! inheritance is applied.
//!
//! ```rust
//! use fixture_factory::factory::FactoryDefinition;
//!
//! let user = FactoryDefinition::new("user")
//!     .attribute("first_name", "Jimi")
//!     .attribute("last_name", "Hendrix")
//!     .attribute("admin", false)
//!     .dynamic("email", |ev| {
//!         let first = ev.get_str("first_name")?;
//!         let last = ev.get_str("last_name")?;
//!         Ok(format!("{first}.{last}@example.com").to_lowercase())
//!     });
//!
//! assert_eq!(user.attributes().len(), 4);
//! ```

use super::callbacks::{Callback, CallbackKind};
use crate::attributes::{
    AssociationDef, AttributeDefinition, AttributeKind, AttributeValue, DynamicBlock, Evaluator,
};
use crate::error::{FactoryError, FactoryResult};
use crate::persistence::Instance;
use crate::sequence::Sequence;
use crate::strategy::Strategy;
use serde_json::Value;
use std::collections::HashSet;
use std::sync::Arc;

fn dynamic_block<F>(f: F) -> DynamicBlock
where
    F: Fn(&mut Evaluator<'_>) -> FactoryResult<AttributeValue> + Send + Sync + 'static,
{
    Arc::new(f)
}

#[derive(Debug, Clone)]
pub struct FactoryDefinition {
    name: String,
    class: Option<String>,
    parent: Option<String>,
    default_strategy: Option<Strategy>,
    attributes: Vec<AttributeDefinition>,
    callbacks: Vec<Callback>,
}

impl FactoryDefinition {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            class: None,
            parent: None,
            default_strategy: None,
            attributes: Vec::new(),
            callbacks: Vec::new(),
        }
    }

    /// Target type to instantiate, instead of the one derived from the name
    pub fn class(mut self, class: impl Into<String>) -> Self {
        self.class = Some(class.into());
        self
    }

    pub fn parent(mut self, parent: impl Into<String>) -> Self {
        self.parent = Some(parent.into());
        self
    }

    pub fn default_strategy(mut self, strategy: Strategy) -> Self {
        self.default_strategy = Some(strategy);
        self
    }

    pub fn attribute(mut self, name: impl Into<String>, value: impl Into<AttributeValue>) -> Self {
        self.attributes.push(AttributeDefinition::new(
            name,
            AttributeKind::Static(value.into()),
        ));
        self
    }

    pub fn dynamic<F, V>(mut self, name: impl Into<String>, f: F) -> Self
    where
        F: Fn(&mut Evaluator<'_>) -> FactoryResult<V> + Send + Sync + 'static,
        V: Into<AttributeValue>,
    {
        let block = dynamic_block(move |ev| f(ev).map(Into::into));
        self.attributes
            .push(AttributeDefinition::new(name, AttributeKind::Dynamic(block)));
        self
    }

    pub fn association(mut self, name: impl Into<String>, association: AssociationDef) -> Self {
        self.attributes.push(AttributeDefinition::new(
            name,
            AttributeKind::Association(association),
        ));
        self
    }

    /// Inline sequence owned by this attribute
    pub fn sequence<F, V>(mut self, name: impl Into<String>, formatter: F) -> Self
    where
        F: Fn(u64) -> V + Send + Sync + 'static,
        V: Into<Value>,
    {
        let name = name.into();
        let sequence = Sequence::new(format!("{}.{}", self.name, name), formatter);
        self.attributes.push(AttributeDefinition::new(
            name,
            AttributeKind::Sequence(Arc::new(sequence)),
        ));
        self
    }

    pub fn callback<F>(mut self, kind: CallbackKind, block: F) -> Self
    where
        F: Fn(&Instance) -> FactoryResult<()> + Send + Sync + 'static,
    {
        self.callbacks.push(Callback::new(kind, block));
        self
    }

    pub fn after_build<F>(self, block: F) -> Self
    where
        F: Fn(&Instance) -> FactoryResult<()> + Send + Sync + 'static,
    {
        self.callback(CallbackKind::AfterBuild, block)
    }

    pub fn after_create<F>(self, block: F) -> Self
    where
        F: Fn(&Instance) -> FactoryResult<()> + Send + Sync + 'static,
    {
        self.callback(CallbackKind::AfterCreate, block)
    }

    pub fn after_stub<F>(self, block: F) -> Self
    where
        F: Fn(&Instance) -> FactoryResult<()> + Send + Sync + 'static,
    {
        self.callback(CallbackKind::AfterStub, block)
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn class_name(&self) -> Option<&str> {
        self.class.as_deref()
    }

    pub fn parent_name(&self) -> Option<&str> {
        self.parent.as_deref()
    }

    pub fn declared_strategy(&self) -> Option<Strategy> {
        self.default_strategy
    }

    pub fn attributes(&self) -> &[AttributeDefinition] {
        &self.attributes
    }

    pub fn callbacks(&self) -> &[Callback] {
        &self.callbacks
    }

    /// Counters owned by this definition's inline sequence attributes
    pub fn inline_sequences(&self) -> impl Iterator<Item = &Arc<Sequence>> {
        self.attributes
            .iter()
            .filter_map(|attribute| match attribute.kind() {
                AttributeKind::Sequence(sequence) => Some(sequence),
                _ => None,
            })
    }

    /// Check the definition in isolation. Parent lookups happen at resolution time.
    pub fn validate(&self) -> FactoryResult<()> {
        if self.parent.as_deref() == Some(self.name.as_str()) {
            return Err(FactoryError::CircularInheritance {
                factory: self.name.clone(),
                chain: vec![self.name.clone(), self.name.clone()],
            });
        }

        let mut seen = HashSet::new();
        for attribute in &self.attributes {
            let name = attribute.name();
            let reason = if name.is_empty() {
                Some("attribute names cannot be empty")
            } else if name.ends_with('=') {
                Some("attribute names cannot end with '='")
            } else if !seen.insert(name) {
                Some("attribute already defined")
            } else {
                None
            };

            if let Some(reason) = reason {
                return Err(FactoryError::InvalidAttributeDefinition {
                    factory: self.name.clone(),
                    attribute: name.to_string(),
                    reason: reason.to_string(),
                });
            }
        }
        Ok(())
    }
}
