//! # Registry Infrastructure
//!
//! Lookup tables the engine resolves names against.
//!
//! ## Available Registries
//!
//! - **FactoryRegistry**: factory definitions and inheritance resolution
//! - **ModelCatalog**: target type names to the models that instantiate them
//!
//! Named sequences live in [`crate::sequence::SequenceRegistry`].
//!
//! ## Architecture
//!
//! ```text
//! Registry Infrastructure
//! ├── FactoryRegistry   (definitions → effective factories)
//! └── ModelCatalog      (type names → models, in-memory fallback)
//! ```

pub mod factory_registry;
pub mod model_catalog;

pub use factory_registry::FactoryRegistry;
pub use model_catalog::ModelCatalog;
