//! # Attribute Definitions
//!
//! One declared attribute of a factory: a static value, a lazy block, an association to
//! another factory, or an inline sequence.

use super::evaluator::Evaluator;
use super::value::{AttributeMap, AttributeValue};
use crate::error::FactoryResult;
use crate::sequence::Sequence;
use crate::strategy::Strategy;
use std::fmt;
use std::sync::Arc;

/// Lazy attribute block. Receives the in-progress build so it can read sibling attributes.
pub type DynamicBlock =
    Arc<dyn Fn(&mut Evaluator<'_>) -> FactoryResult<AttributeValue> + Send + Sync>;

/// Reference from an attribute to another factory
#[derive(Debug, Clone, Default)]
pub struct AssociationDef {
    factory: Option<String>,
    strategy: Option<Strategy>,
    overrides: AttributeMap,
}

impl AssociationDef {
    /// Association to the factory named like the attribute
    pub fn new() -> Self {
        Self::default()
    }

    /// Association to an explicitly named factory
    pub fn factory(name: impl Into<String>) -> Self {
        Self {
            factory: Some(name.into()),
            ..Self::default()
        }
    }

    /// Run the associated factory with this strategy instead of the default
    pub fn using(mut self, strategy: Strategy) -> Self {
        self.strategy = Some(strategy);
        self
    }

    /// Overrides passed to the associated factory
    pub fn with_overrides(mut self, overrides: AttributeMap) -> Self {
        self.overrides = overrides;
        self
    }

    pub fn factory_name<'a>(&'a self, attribute: &'a str) -> &'a str {
        self.factory.as_deref().unwrap_or(attribute)
    }

    pub fn strategy(&self) -> Option<Strategy> {
        self.strategy
    }

    pub fn overrides(&self) -> &AttributeMap {
        &self.overrides
    }
}

#[derive(Clone)]
pub enum AttributeKind {
    Static(AttributeValue),
    Dynamic(DynamicBlock),
    Association(AssociationDef),
    Sequence(Arc<Sequence>),
}

impl fmt::Debug for AttributeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AttributeKind::Static(value) => f.debug_tuple("Static").field(value).finish(),
            AttributeKind::Dynamic(_) => f.write_str("Dynamic(<block>)"),
            AttributeKind::Association(association) => {
                f.debug_tuple("Association").field(association).finish()
            }
            AttributeKind::Sequence(sequence) => {
                f.debug_tuple("Sequence").field(&sequence.name()).finish()
            }
        }
    }
}

#[derive(Debug, Clone)]
pub struct AttributeDefinition {
    name: String,
    kind: AttributeKind,
}

impl AttributeDefinition {
    pub fn new(name: impl Into<String>, kind: AttributeKind) -> Self {
        Self {
            name: name.into(),
            kind,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn kind(&self) -> &AttributeKind {
        &self.kind
    }

    pub fn is_association(&self) -> bool {
        matches!(self.kind, AttributeKind::Association(_))
    }
}
