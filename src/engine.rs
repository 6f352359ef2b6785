//! # Factory Engine
//!
//! The entry point: owns the factory, sequence and model registries plus the alias rules,
//! and runs factories with one of the four strategies.
//!
//! ## Lifecycle
//!
//! An engine starts empty and lives as long as its owner. Tests that want isolation
//! either build their own engine or call [`FactoryEngine::reset`]. A process-wide engine
//! is available through [`FactoryEngine::global`]; it is created on first use from
//! [`FactoryConfig::from_env`] and never dropped.
//!
//! ## Usage
//!
//! ```rust
//! use fixture_factory::prelude::*;
//!
//! let engine = FactoryEngine::new();
//! engine
//!     .define(
//!         FactoryDefinition::new("user")
//!             .attribute("first_name", "Jimi")
//!             .attribute("last_name", "Hendrix")
//!             .dynamic("email", |ev| {
//!                 let first = ev.get_str("first_name")?;
//!                 let last = ev.get_str("last_name")?;
//!                 Ok(format!("{first}.{last}@example.com").to_lowercase())
//!             }),
//!     )
//!     .unwrap();
//!
//! let attributes = engine
//!     .attributes_for("user", attrs! { "first_name" => "Bill" })
//!     .unwrap();
//! assert_eq!(attributes["email"], "bill.hendrix@example.com");
//!
//! let user = engine.create("user", attrs! {}).unwrap();
//! assert!(!user.is_new_record());
//! ```

use crate::attributes::{AliasRules, Overrides};
use crate::config::FactoryConfig;
use crate::error::{FactoryError, FactoryResult};
use crate::factory::{EffectiveFactory, FactoryDefinition};
use crate::logging::{log_error, log_factory_operation};
use crate::persistence::{Instance, MemoryStore, Model};
use crate::registry::{FactoryRegistry, ModelCatalog};
use crate::sequence::SequenceRegistry;
use crate::strategy::{runner, Product, Strategy};
use serde_json::{Map, Value};
use std::sync::{Arc, OnceLock};
use tracing::{debug, info, warn};

static GLOBAL_ENGINE: OnceLock<FactoryEngine> = OnceLock::new();

pub struct FactoryEngine {
    config: FactoryConfig,
    factories: FactoryRegistry,
    sequences: SequenceRegistry,
    models: ModelCatalog,
    aliases: AliasRules,
}

impl FactoryEngine {
    pub fn new() -> Self {
        Self::with_config(FactoryConfig::default())
    }

    pub fn with_config(config: FactoryConfig) -> Self {
        Self {
            models: ModelCatalog::new(config.strict_models),
            factories: FactoryRegistry::new(),
            sequences: SequenceRegistry::new(),
            aliases: AliasRules::new(),
            config,
        }
    }

    /// Process-wide engine
    pub fn global() -> &'static FactoryEngine {
        GLOBAL_ENGINE.get_or_init(|| {
            let config = FactoryConfig::from_env().unwrap_or_else(|e| {
                warn!(error = %e, "Ignoring invalid factory configuration from environment");
                FactoryConfig::default()
            });
            Self::with_config(config)
        })
    }

    pub fn config(&self) -> &FactoryConfig {
        &self.config
    }

    pub fn factories(&self) -> &FactoryRegistry {
        &self.factories
    }

    pub fn sequences(&self) -> &SequenceRegistry {
        &self.sequences
    }

    pub fn models(&self) -> &ModelCatalog {
        &self.models
    }

    pub fn aliases(&self) -> &AliasRules {
        &self.aliases
    }

    /// Store behind every model the catalog falls back to
    pub fn store(&self) -> &Arc<MemoryStore> {
        self.models.store()
    }

    pub fn define(&self, definition: FactoryDefinition) -> FactoryResult<()> {
        self.factories.register(definition)
    }

    pub fn define_sequence<F, V>(&self, name: &str, formatter: F) -> FactoryResult<()>
    where
        F: Fn(u64) -> V + Send + Sync + 'static,
        V: Into<Value>,
    {
        self.sequences.define(name, formatter).map(|_| ())
    }

    pub fn next_sequence(&self, name: &str) -> FactoryResult<Value> {
        self.sequences.next(name)
    }

    pub fn register_model(&self, model: Arc<dyn Model>) {
        self.models.register(model);
    }

    /// Run a factory with an explicit strategy, or its default when `None`
    pub fn run(
        &self,
        name: &str,
        strategy: Option<Strategy>,
        overrides: Overrides,
    ) -> FactoryResult<Product> {
        self.run_at_depth(name, strategy, overrides, 0)
    }

    pub fn attributes_for(&self, name: &str, overrides: Overrides) -> FactoryResult<Map<String, Value>> {
        let factory = self.prepare(name, 0)?;
        let result = runner::attributes_for(self, &factory, overrides, 0);
        self.record(&factory, Strategy::AttributesFor, 0, result)
    }

    pub fn build(&self, name: &str, overrides: Overrides) -> FactoryResult<Instance> {
        let factory = self.prepare(name, 0)?;
        let result = runner::build(self, &factory, overrides, 0);
        self.record(&factory, Strategy::Build, 0, result)
    }

    pub fn create(&self, name: &str, overrides: Overrides) -> FactoryResult<Instance> {
        let factory = self.prepare(name, 0)?;
        let result = runner::create(self, &factory, overrides, 0);
        self.record(&factory, Strategy::Create, 0, result)
    }

    pub fn stub(&self, name: &str, overrides: Overrides) -> FactoryResult<Instance> {
        let factory = self.prepare(name, 0)?;
        let result = runner::stub(self, &factory, overrides, 0);
        self.record(&factory, Strategy::Stub, 0, result)
    }

    pub fn build_list(&self, name: &str, count: usize, overrides: Overrides) -> FactoryResult<Vec<Instance>> {
        (0..count)
            .map(|_| self.build(name, overrides.clone()))
            .collect()
    }

    pub fn create_list(&self, name: &str, count: usize, overrides: Overrides) -> FactoryResult<Vec<Instance>> {
        (0..count)
            .map(|_| self.create(name, overrides.clone()))
            .collect()
    }

    pub fn stub_list(&self, name: &str, count: usize, overrides: Overrides) -> FactoryResult<Vec<Instance>> {
        (0..count)
            .map(|_| self.stub(name, overrides.clone()))
            .collect()
    }

    /// Rewind every sequence counter to its first value: named sequences and the inline
    /// sequences of registered factories. Definitions are kept.
    pub fn rewind_sequences(&self) {
        self.sequences.rewind();
        self.factories.rewind_sequences();
    }

    /// Forget every factory, sequence, model and saved in-memory row. Alias rules go
    /// back to the defaults.
    pub fn reset(&self) {
        self.factories.clear();
        self.sequences.clear();
        self.models.clear();
        self.aliases.reset();
        info!("Factory engine reset");
    }

    pub(crate) fn run_at_depth(
        &self,
        name: &str,
        strategy: Option<Strategy>,
        overrides: Overrides,
        depth: usize,
    ) -> FactoryResult<Product> {
        let factory = self.prepare(name, depth)?;
        let strategy = self.select_strategy(&factory, strategy);

        match strategy {
            Strategy::AttributesFor => {
                let result = runner::attributes_for(self, &factory, overrides, depth);
                self.record(&factory, strategy, depth, result).map(Product::Attributes)
            }
            Strategy::Build => {
                let result = runner::build(self, &factory, overrides, depth);
                self.record(&factory, strategy, depth, result).map(Product::Instance)
            }
            Strategy::Create => {
                let result = runner::create(self, &factory, overrides, depth);
                self.record(&factory, strategy, depth, result).map(Product::Instance)
            }
            Strategy::Stub => {
                let result = runner::stub(self, &factory, overrides, depth);
                self.record(&factory, strategy, depth, result).map(Product::Instance)
            }
        }
    }

    fn prepare(&self, name: &str, depth: usize) -> FactoryResult<Arc<EffectiveFactory>> {
        if depth > self.config.max_association_depth {
            return Err(FactoryError::AssociationDepthExceeded {
                factory: name.to_string(),
                depth,
            });
        }
        self.factories.resolve(name)
    }

    fn select_strategy(&self, factory: &EffectiveFactory, requested: Option<Strategy>) -> Strategy {
        requested
            .or(factory.default_strategy())
            .unwrap_or(self.config.default_strategy)
    }

    /// Log the outcome of one run. Failures are reported as errors only by the outermost
    /// run; nested association runs pass them up.
    fn record<T>(
        &self,
        factory: &EffectiveFactory,
        strategy: Strategy,
        depth: usize,
        result: FactoryResult<T>,
    ) -> FactoryResult<T> {
        match &result {
            Ok(_) => log_factory_operation(factory.name(), strategy, "completed", None),
            Err(e) => {
                let error = e.to_string();
                log_factory_operation(factory.name(), strategy, "failed", Some(&error));
                if depth == 0 {
                    log_error("engine", &strategy.to_string(), &error, Some(factory.name()));
                } else {
                    debug!(
                        factory = factory.name(),
                        depth = depth,
                        error = %error,
                        "Nested factory run failed"
                    );
                }
            }
        }
        result
    }
}

impl Default for FactoryEngine {
    fn default() -> Self {
        Self::new()
    }
}
