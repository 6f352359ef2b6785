//! # Factory Registry
//!
//! Name to definition lookup with inheritance resolution.
//!
//! ## Overview
//!
//! Definitions are registered as declared. Resolving a name walks its parent chain,
//! flattens it into an [`EffectiveFactory`] and caches the result until the registry
//! changes. Parents may be registered after their children; a missing parent only fails
//! when the child is resolved.
//!
//! ## Usage
//!
//! ```rust
//! use fixture_factory::factory::FactoryDefinition;
//! use fixture_factory::registry::FactoryRegistry;
//!
//! let registry = FactoryRegistry::new();
//! registry
//!     .register(FactoryDefinition::new("user").attribute("first_name", "Jimi"))
//!     .unwrap();
//! registry
//!     .register(
//!         FactoryDefinition::new("guest")
//!             .parent("user")
//!             .attribute("username", "GuestUser"),
//!     )
//!     .unwrap();
//!
//! let guest = registry.resolve("guest").unwrap();
//! assert_eq!(guest.attribute_names(), vec!["first_name", "username"]);
//! assert_eq!(guest.class_name(), "User");
//! ```

use crate::error::{FactoryError, FactoryResult};
use crate::factory::{EffectiveFactory, FactoryDefinition};
use indexmap::IndexMap;
use parking_lot::RwLock;
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tracing::{debug, info};

#[derive(Default)]
pub struct FactoryRegistry {
    /// Registered definitions, in registration order
    definitions: RwLock<IndexMap<String, Arc<FactoryDefinition>>>,
    /// Flattened definitions, dropped whenever the registry changes
    effective: RwLock<HashMap<String, Arc<EffectiveFactory>>>,
    /// Bumped on every change; a flattening started under an older generation is not cached
    generation: AtomicU64,
}

impl FactoryRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&self, definition: FactoryDefinition) -> FactoryResult<()> {
        definition.validate()?;

        let name = definition.name().to_string();
        {
            let mut definitions = self.definitions.write();
            if definitions.contains_key(&name) {
                return Err(FactoryError::DuplicateFactory { name });
            }
            definitions.insert(name.clone(), Arc::new(definition));
        }
        self.invalidate();

        info!(factory = %name, "Registered factory");
        Ok(())
    }

    /// Declared definition, without inheritance applied
    pub fn definition(&self, name: &str) -> FactoryResult<Arc<FactoryDefinition>> {
        self.definitions
            .read()
            .get(name)
            .cloned()
            .ok_or_else(|| FactoryError::UnknownFactory {
                name: name.to_string(),
            })
    }

    /// Effective definition with the whole parent chain applied
    pub fn resolve(&self, name: &str) -> FactoryResult<Arc<EffectiveFactory>> {
        if let Some(effective) = self.effective.read().get(name) {
            return Ok(effective.clone());
        }

        let generation = self.generation.load(Ordering::SeqCst);
        let effective = Arc::new(self.flatten(name)?);
        {
            let mut cache = self.effective.write();
            if self.generation.load(Ordering::SeqCst) == generation {
                cache.insert(name.to_string(), effective.clone());
            }
        }

        debug!(
            factory = name,
            lineage = ?effective.lineage(),
            "Resolved effective factory"
        );
        Ok(effective)
    }

    fn flatten(&self, name: &str) -> FactoryResult<EffectiveFactory> {
        // Collect the chain from the requested factory up to its root.
        let mut chain: Vec<Arc<FactoryDefinition>> = Vec::new();
        let mut current = Some(name.to_string());

        while let Some(next) = current {
            if chain.iter().any(|definition| definition.name() == next) {
                let mut names: Vec<String> =
                    chain.iter().map(|definition| definition.name().to_string()).collect();
                names.push(next);
                return Err(FactoryError::CircularInheritance {
                    factory: name.to_string(),
                    chain: names,
                });
            }

            let definition = self.definition(&next)?;
            current = definition.parent_name().map(str::to_string);
            chain.push(definition);
        }

        let mut ancestors = chain.into_iter().rev();
        let root = ancestors.next().ok_or_else(|| FactoryError::UnknownFactory {
            name: name.to_string(),
        })?;

        Ok(ancestors.fold(EffectiveFactory::root(&root), |parent, definition| {
            EffectiveFactory::inherit(&parent, &definition)
        }))
    }

    pub fn contains(&self, name: &str) -> bool {
        self.definitions.read().contains_key(name)
    }

    /// Registered factory names, in registration order
    pub fn names(&self) -> Vec<String> {
        self.definitions.read().keys().cloned().collect()
    }

    pub fn len(&self) -> usize {
        self.definitions.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.definitions.read().is_empty()
    }

    pub fn clear(&self) {
        self.definitions.write().clear();
        self.invalidate();
        info!("Factory registry cleared");
    }

    /// Rewind the inline sequence counters of every registered definition
    pub fn rewind_sequences(&self) {
        for definition in self.definitions.read().values() {
            for sequence in definition.inline_sequences() {
                sequence.rewind();
            }
        }
    }

    /// Current change generation
    pub fn generation(&self) -> u64 {
        self.generation.load(Ordering::SeqCst)
    }

    fn invalidate(&self) {
        // The bump precedes the cache clear so an in-flight resolve either sees the new
        // generation or has its entry removed by the clear.
        self.generation.fetch_add(1, Ordering::SeqCst);
        self.effective.write().clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_duplicate_factory_rejected() {
        let registry = FactoryRegistry::new();
        registry.register(FactoryDefinition::new("user")).unwrap();

        let result = registry.register(FactoryDefinition::new("user"));
        assert_eq!(
            result.unwrap_err(),
            FactoryError::DuplicateFactory {
                name: "user".to_string()
            }
        );
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn test_unknown_factory_and_unknown_parent() {
        let registry = FactoryRegistry::new();
        assert!(matches!(
            registry.resolve("missing"),
            Err(FactoryError::UnknownFactory { .. })
        ));

        registry
            .register(FactoryDefinition::new("orphan").parent("nobody"))
            .unwrap();
        assert_eq!(
            registry.resolve("orphan").unwrap_err(),
            FactoryError::UnknownFactory {
                name: "nobody".to_string()
            }
        );
    }

    #[test]
    fn test_inheritance_cycle_detected() {
        let registry = FactoryRegistry::new();
        registry
            .register(FactoryDefinition::new("a").parent("b"))
            .unwrap();
        registry
            .register(FactoryDefinition::new("b").parent("a"))
            .unwrap();

        match registry.resolve("a") {
            Err(FactoryError::CircularInheritance { chain, .. }) => {
                assert_eq!(chain, vec!["a", "b", "a"]);
            }
            other => panic!("expected circular inheritance, got {other:?}"),
        }
    }

    #[test]
    fn test_parent_registered_after_child() {
        let registry = FactoryRegistry::new();
        registry
            .register(FactoryDefinition::new("admin").parent("user"))
            .unwrap();
        registry
            .register(FactoryDefinition::new("user").class("Account"))
            .unwrap();

        let admin = registry.resolve("admin").unwrap();
        assert_eq!(admin.class_name(), "Account");
    }

    #[test]
    fn test_cache_invalidated_on_register() {
        let registry = FactoryRegistry::new();
        registry
            .register(FactoryDefinition::new("child").parent("user"))
            .unwrap();
        assert!(registry.resolve("child").is_err());

        registry.register(FactoryDefinition::new("user")).unwrap();
        assert!(registry.resolve("child").is_ok());

        registry.clear();
        assert!(registry.is_empty());
        assert!(registry.resolve("child").is_err());
    }

    #[test]
    fn test_generation_bumps_on_change() {
        let registry = FactoryRegistry::new();
        let start = registry.generation();

        registry.register(FactoryDefinition::new("user")).unwrap();
        assert_eq!(registry.generation(), start + 1);
        registry.resolve("user").unwrap();
        assert_eq!(registry.generation(), start + 1);

        registry.clear();
        assert_eq!(registry.generation(), start + 2);
    }

    #[test]
    fn test_concurrent_clear_never_leaves_stale_cache() {
        use std::thread;

        let registry = Arc::new(FactoryRegistry::new());
        for _ in 0..200 {
            registry
                .register(FactoryDefinition::new("user").attribute("name", "Jimi"))
                .unwrap();
            registry
                .register(FactoryDefinition::new("admin").parent("user"))
                .unwrap();

            let resolver = {
                let registry = registry.clone();
                thread::spawn(move || {
                    let _ = registry.resolve("admin");
                })
            };
            registry.clear();
            resolver.join().unwrap();

            assert!(matches!(
                registry.resolve("admin"),
                Err(FactoryError::UnknownFactory { .. })
            ));
        }
    }

    #[test]
    fn test_rewind_inline_sequences() {
        let registry = FactoryRegistry::new();
        registry
            .register(FactoryDefinition::new("user").sequence("login", |n| format!("user{n}")))
            .unwrap();

        let sequence = registry
            .definition("user")
            .unwrap()
            .inline_sequences()
            .next()
            .cloned()
            .unwrap();
        sequence.next();
        sequence.next();

        registry.rewind_sequences();
        assert_eq!(sequence.peek(), 1);
    }
}
