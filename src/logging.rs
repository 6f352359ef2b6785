//! # Structured Logging Module
//!
//! Environment-aware structured logging for factory runs. Console output by default,
//! JSON lines when `FIXTURE_LOG_FORMAT=json`.

use crate::constants::env;
use crate::strategy::Strategy;
use chrono::Utc;
use std::sync::OnceLock;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Layer};

static LOGGER_INITIALIZED: OnceLock<()> = OnceLock::new();

/// Initialize structured logging with environment-specific configuration.
///
/// Safe to call more than once; only the first call installs a subscriber, and an already
/// installed global subscriber is left alone.
pub fn init_structured_logging() {
    LOGGER_INITIALIZED.get_or_init(|| {
        let environment = get_environment();
        let log_level = get_log_level(&environment);
        let json = use_json_format();

        let console = (!json).then(|| {
            fmt::layer()
                .with_target(true)
                .with_thread_ids(true)
                .with_level(true)
                .with_filter(EnvFilter::new(log_level))
        });
        let structured = json.then(|| {
            fmt::layer()
                .with_target(true)
                .with_thread_ids(true)
                .with_level(true)
                .with_ansi(false)
                .json()
                .with_filter(EnvFilter::new(log_level))
        });

        if tracing_subscriber::registry()
            .with(console)
            .with(structured)
            .try_init()
            .is_err()
        {
            tracing::debug!("Global tracing subscriber already initialized - continuing with existing subscriber");
        }

        tracing::info!(
            environment = %environment,
            json = json,
            "Structured logging initialized"
        );
    });
}

fn get_environment() -> String {
    std::env::var(env::ENVIRONMENT).unwrap_or_else(|_| "test".to_string())
}

fn get_log_level(environment: &str) -> &'static str {
    match environment {
        "production" => "info",
        "ci" => "warn",
        _ => "debug",
    }
}

fn use_json_format() -> bool {
    std::env::var(env::LOG_FORMAT)
        .map(|format| format.eq_ignore_ascii_case("json"))
        .unwrap_or(false)
}

/// Log structured data for one factory run
pub fn log_factory_operation(factory: &str, strategy: Strategy, status: &str, details: Option<&str>) {
    tracing::debug!(
        factory = %factory,
        strategy = %strategy,
        status = %status,
        details = details,
        timestamp = %Utc::now().to_rfc3339(),
        "FACTORY_OPERATION"
    );
}

/// Log a failure with its context
pub fn log_error(component: &str, operation: &str, error: &str, context: Option<&str>) {
    tracing::error!(
        component = %component,
        operation = %operation,
        error = %error,
        context = context,
        timestamp = %Utc::now().to_rfc3339(),
        "ERROR"
    );
}
