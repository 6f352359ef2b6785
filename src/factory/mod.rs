//! # Factories
//!
//! Declared factory definitions, their flattened effective form after inheritance, and
//! the lifecycle callbacks attached to them.

pub mod callbacks;
pub mod definition;
pub mod effective;

pub use callbacks::{Callback, CallbackDispatcher, CallbackFn, CallbackKind};
pub use definition::FactoryDefinition;
pub use effective::{class_name_for, EffectiveFactory};
