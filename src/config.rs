use crate::constants::{env, DEFAULT_MAX_ASSOCIATION_DEPTH};
use crate::error::{FactoryError, FactoryResult};
use crate::strategy::Strategy;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FactoryConfig {
    /// Strategy used when neither the caller nor the factory picks one
    pub default_strategy: Strategy,
    /// Fail on target types with no registered model instead of using the memory store
    pub strict_models: bool,
    /// Deepest chain of nested associations one build may produce
    pub max_association_depth: usize,
}

impl Default for FactoryConfig {
    fn default() -> Self {
        Self {
            default_strategy: Strategy::Create,
            strict_models: false,
            max_association_depth: DEFAULT_MAX_ASSOCIATION_DEPTH,
        }
    }
}

impl FactoryConfig {
    pub fn from_env() -> FactoryResult<Self> {
        let mut config = Self::default();

        if let Ok(strategy) = std::env::var(env::DEFAULT_STRATEGY) {
            config.default_strategy = strategy.parse().map_err(|e| {
                FactoryError::Configuration(format!("Invalid default_strategy: {e}"))
            })?;
        }

        if let Ok(strict) = std::env::var(env::STRICT_MODELS) {
            config.strict_models = strict.parse().map_err(|e| {
                FactoryError::Configuration(format!("Invalid strict_models: {e}"))
            })?;
        }

        if let Ok(depth) = std::env::var(env::MAX_ASSOCIATION_DEPTH) {
            config.max_association_depth = depth.parse().map_err(|e| {
                FactoryError::Configuration(format!("Invalid max_association_depth: {e}"))
            })?;
        }

        Ok(config)
    }

    /// Parse a JSON document; missing fields keep their defaults
    pub fn from_json(json: &str) -> FactoryResult<Self> {
        Ok(serde_json::from_str(json)?)
    }
}
