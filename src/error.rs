//! # Factory Errors
//!
//! Every failure the engine can raise. All of them are immediate and synchronous:
//! nothing is retried and no partially assigned object is handed back to the caller.

use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum FactoryError {
    #[error("Factory already registered: {name}")]
    DuplicateFactory { name: String },

    #[error("Sequence already registered: {name}")]
    DuplicateSequence { name: String },

    #[error("No such factory: {name}")]
    UnknownFactory { name: String },

    #[error("No such sequence: {name}")]
    UnknownSequence { name: String },

    #[error("Circular attribute dependency in factory {factory}: {}", .chain.join(" -> "))]
    CircularAttribute { factory: String, chain: Vec<String> },

    #[error("Circular inheritance for factory {factory}: {}", .chain.join(" -> "))]
    CircularInheritance { factory: String, chain: Vec<String> },

    #[error(
        "Attribute {attribute} of factory {factory} resolved to a raw sequence; \
         draw a value with next() or declare an inline sequence instead"
    )]
    SequenceAbuse { factory: String, attribute: String },

    #[error("Stubbed {model} records are not allowed to access the database ({operation})")]
    StubbedObject { model: String, operation: String },

    #[error("Invalid attribute {attribute} in factory {factory}: {reason}")]
    InvalidAttributeDefinition {
        factory: String,
        attribute: String,
        reason: String,
    },

    #[error("Factory {factory} has no attribute {attribute}")]
    UnknownAttribute { factory: String, attribute: String },

    #[error("No such model: {name}")]
    UnknownModel { name: String },

    #[error("Association depth {depth} exceeded while building {factory}")]
    AssociationDepthExceeded { factory: String, depth: usize },

    #[error("Persistence error for {model}: {reason}")]
    Persistence { model: String, reason: String },

    #[error("Invalid strategy: {0}")]
    InvalidStrategy(String),

    #[error("Configuration error: {0}")]
    Configuration(String),
}

impl From<serde_json::Error> for FactoryError {
    fn from(error: serde_json::Error) -> Self {
        FactoryError::Configuration(format!("JSON serialization error: {error}"))
    }
}

impl FactoryError {
    /// Shorthand for the error every stub raises on persistence-implying calls
    pub fn stubbed(model: &str, operation: &str) -> Self {
        FactoryError::StubbedObject {
            model: model.to_string(),
            operation: operation.to_string(),
        }
    }
}

pub type FactoryResult<T> = anyhow::Result<T, FactoryError>;
