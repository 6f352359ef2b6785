//! Shared constants.

/// Default bound on nested association depth
pub const DEFAULT_MAX_ASSOCIATION_DEPTH: usize = 16;

/// Environment variables read by [`crate::config::FactoryConfig::from_env`] and the
/// logging setup
pub mod env {
    pub const DEFAULT_STRATEGY: &str = "FIXTURE_DEFAULT_STRATEGY";
    pub const STRICT_MODELS: &str = "FIXTURE_STRICT_MODELS";
    pub const MAX_ASSOCIATION_DEPTH: &str = "FIXTURE_MAX_ASSOCIATION_DEPTH";
    pub const ENVIRONMENT: &str = "FIXTURE_ENV";
    pub const LOG_FORMAT: &str = "FIXTURE_LOG_FORMAT";
}
