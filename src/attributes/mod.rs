//! # Attributes
//!
//! Attribute values, declared attribute definitions, alias rules and the evaluator that
//! resolves a factory's attributes for one build.

pub mod aliases;
pub mod definition;
pub mod evaluator;
pub mod value;

pub use aliases::{AliasRule, AliasRules};
pub use definition::{AssociationDef, AttributeDefinition, AttributeKind, DynamicBlock};
pub use evaluator::Evaluator;
pub use value::{from_json_object, to_json_map, AttributeMap, AttributeValue, Overrides};
