#![allow(clippy::doc_markdown)] // Allow technical terms in docs
#![allow(clippy::missing_errors_doc)] // Allow public functions without # Errors sections
#![allow(clippy::must_use_candidate)] // Allow methods without must_use when context is clear

//! # Fixture Factory
//!
//! Declarative object factories for test fixtures.
//!
//! ## Overview
//!
//! A factory is a named recipe for one kind of record: static defaults, values computed
//! from sibling attributes, numbered sequences and associations to other factories.
//! Factories inherit from each other and run with one of four strategies:
//!
//! - **attributes_for** - a plain map of attribute values, associations left out
//! - **build** - an unsaved instance whose associations are created
//! - **create** - a saved instance, after-build and after-create callbacks run
//! - **stub** - a fake persisted instance that refuses every persistence operation
//!
//! ## Module Organization
//!
//! - [`engine`] - The [`FactoryEngine`] entry point
//! - [`factory`] - Factory definitions, inheritance and callbacks
//! - [`attributes`] - Attribute values, definitions, aliases and the build-time evaluator
//! - [`sequence`] - Named counters with formatters
//! - [`strategy`] - Strategies and their pipelines
//! - [`persistence`] - The record abstraction, the in-memory store and stubs
//! - [`registry`] - Factory and model registries
//! - [`config`] - Engine configuration
//! - [`error`] - Structured error handling
//! - [`logging`] - Structured logging setup
//!
//! ## Quick Start
//!
//! ```rust
//! use fixture_factory::prelude::*;
//!
//! let engine = FactoryEngine::new();
//! engine
//!     .define_sequence("email", |n| format!("somebody{n}@example.com"))
//!     .unwrap();
//! engine
//!     .define(
//!         FactoryDefinition::new("user")
//!             .attribute("first_name", "Jimi")
//!             .dynamic("email", |ev| ev.next("email")),
//!     )
//!     .unwrap();
//! engine
//!     .define(
//!         FactoryDefinition::new("post")
//!             .attribute("title", "Test Post")
//!             .association("author", AssociationDef::factory("user")),
//!     )
//!     .unwrap();
//!
//! let post = engine.build("post", attrs! {}).unwrap();
//! assert!(post.is_new_record());
//!
//! let author = post.get_record("author").unwrap();
//! assert!(!author.is_new_record());
//! assert_eq!(author.get_str("email").unwrap(), "somebody1@example.com");
//! ```
//!
//! ## Testing
//!
//! ```bash
//! cargo test --lib    # Unit tests
//! cargo test          # All tests
//! ```

pub mod attributes;
pub mod config;
pub mod constants;
pub mod engine;
pub mod error;
pub mod factory;
pub mod logging;
pub mod persistence;
pub mod registry;
pub mod sequence;
pub mod strategy;

pub use attributes::{AssociationDef, AttributeMap, AttributeValue, Evaluator, Overrides};
pub use config::FactoryConfig;
pub use engine::FactoryEngine;
pub use error::{FactoryError, FactoryResult};
pub use factory::{CallbackKind, FactoryDefinition};
pub use persistence::{Instance, MemoryModel, MemoryStore, Model, Record, StubRecord};
pub use strategy::{Product, Strategy};

/// Everything a test file usually needs
pub mod prelude {
    pub use crate::attributes::{AssociationDef, AttributeMap, AttributeValue, Evaluator, Overrides};
    pub use crate::attrs;
    pub use crate::config::FactoryConfig;
    pub use crate::engine::FactoryEngine;
    pub use crate::error::{FactoryError, FactoryResult};
    pub use crate::factory::{CallbackKind, FactoryDefinition};
    pub use crate::persistence::{Instance, Model, Record};
    pub use crate::strategy::{Product, Strategy};
}
