//! # Persistence Collaborators
//!
//! The record contract the engine drives, the in-memory implementation of it, and the
//! stand-in records produced by the stub strategy.
//!
//! ```text
//! Persistence
//! ├── Record / Model   (contract implemented by the host)
//! ├── Instance         (shared handle to a produced record)
//! ├── MemoryModel      (in-process reference implementation)
//! └── StubRecord       (persistence-refusing stand-in)
//! ```

pub mod memory;
pub mod record;
pub mod stub;

pub use memory::{MemoryModel, MemoryRecord, MemoryStore};
pub use record::{ConnectionInfo, Instance, Model, Record};
pub use stub::StubRecord;
