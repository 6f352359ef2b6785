//! # Effective Factories
//!
//! A factory with its inheritance chain flattened. Attributes keep the parent's order; a
//! child attribute with the same name replaces the parent's in place and child-only
//! attributes follow. Callbacks concatenate, parent first.

use super::callbacks::{Callback, CallbackKind};
use super::definition::FactoryDefinition;
use crate::attributes::AttributeDefinition;
use crate::strategy::Strategy;
use indexmap::IndexMap;

#[derive(Debug, Clone)]
pub struct EffectiveFactory {
    name: String,
    class_name: String,
    default_strategy: Option<Strategy>,
    attributes: IndexMap<String, AttributeDefinition>,
    callbacks: Vec<Callback>,
    lineage: Vec<String>,
}

impl EffectiveFactory {
    /// Flatten a definition that has no parent
    pub fn root(definition: &FactoryDefinition) -> Self {
        Self {
            name: definition.name().to_string(),
            class_name: definition
                .class_name()
                .map(str::to_string)
                .unwrap_or_else(|| class_name_for(definition.name())),
            default_strategy: definition.declared_strategy(),
            attributes: Self::index(definition.attributes()),
            callbacks: definition.callbacks().to_vec(),
            lineage: vec![definition.name().to_string()],
        }
    }

    /// Flatten a definition on top of its parent's effective factory
    pub fn inherit(parent: &EffectiveFactory, definition: &FactoryDefinition) -> Self {
        let mut attributes = parent.attributes.clone();
        for attribute in definition.attributes() {
            // IndexMap keeps the original slot when a key is replaced.
            attributes.insert(attribute.name().to_string(), attribute.clone());
        }

        let mut callbacks = parent.callbacks.clone();
        callbacks.extend(definition.callbacks().iter().cloned());

        let mut lineage = parent.lineage.clone();
        lineage.push(definition.name().to_string());

        Self {
            name: definition.name().to_string(),
            class_name: definition
                .class_name()
                .map(str::to_string)
                .unwrap_or_else(|| parent.class_name.clone()),
            default_strategy: definition
                .declared_strategy()
                .or(parent.default_strategy),
            attributes,
            callbacks,
            lineage,
        }
    }

    fn index(attributes: &[AttributeDefinition]) -> IndexMap<String, AttributeDefinition> {
        attributes
            .iter()
            .map(|attribute| (attribute.name().to_string(), attribute.clone()))
            .collect()
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn class_name(&self) -> &str {
        &self.class_name
    }

    pub fn default_strategy(&self) -> Option<Strategy> {
        self.default_strategy
    }

    pub fn attribute(&self, name: &str) -> Option<&AttributeDefinition> {
        self.attributes.get(name)
    }

    pub fn attributes(&self) -> impl ExactSizeIterator<Item = &AttributeDefinition> {
        self.attributes.values()
    }

    pub fn attribute_names(&self) -> Vec<&str> {
        self.attributes.keys().map(String::as_str).collect()
    }

    pub fn callbacks_for(&self, kind: CallbackKind) -> impl Iterator<Item = &Callback> {
        self.callbacks
            .iter()
            .filter(move |callback| callback.kind() == kind)
    }

    /// Factory names from the root ancestor down to this factory
    pub fn lineage(&self) -> &[String] {
        &self.lineage
    }
}

/// Type name derived from a factory name: `admin_user` becomes `AdminUser`
pub fn class_name_for(factory: &str) -> String {
    factory
        .split(|c: char| c == '_' || c == '-' || c == ' ')
        .filter(|part| !part.is_empty())
        .map(|part| {
            let mut chars = part.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars).collect::<String>(),
                None => String::new(),
            }
        })
        .collect()
}
