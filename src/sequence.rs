//! # Sequences
//!
//! Named monotonic counters that produce formatted unique values.
//!
//! ## Overview
//!
//! A [`Sequence`] starts at 1 and hands out each counter value exactly once, passing it
//! through its formatter. The [`SequenceRegistry`] holds the named sequences of one
//! engine; inline sequences owned by a single attribute use the same type without being
//! registered.
//!
//! Counters are guarded by a mutex so uniqueness holds even when a multi-threaded host
//! draws from the same sequence concurrently.
//!
//! ## Usage
//!
//! ```rust
//! use fixture_factory::sequence::SequenceRegistry;
//!
//! let registry = SequenceRegistry::new();
//! registry
//!     .define("email", |n| format!("somebody{n}@example.com"))
//!     .unwrap();
//!
//! assert_eq!(registry.next("email").unwrap(), "somebody1@example.com");
//! assert_eq!(registry.next("email").unwrap(), "somebody2@example.com");
//! ```

use crate::error::{FactoryError, FactoryResult};
use parking_lot::{Mutex, RwLock};
use serde_json::Value;
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;
use tracing::{debug, info};

/// Counter to value formatter
pub type Formatter = Arc<dyn Fn(u64) -> Value + Send + Sync>;

const FIRST_VALUE: u64 = 1;

pub struct Sequence {
    name: String,
    counter: Mutex<u64>,
    formatter: Formatter,
}

impl Sequence {
    pub fn new<F, V>(name: impl Into<String>, formatter: F) -> Self
    where
        F: Fn(u64) -> V + Send + Sync + 'static,
        V: Into<Value>,
    {
        Self {
            name: name.into(),
            counter: Mutex::new(FIRST_VALUE),
            formatter: Arc::new(move |n| formatter(n).into()),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Draw the next value, advancing the counter
    pub fn next(&self) -> Value {
        let n = {
            let mut counter = self.counter.lock();
            let n = *counter;
            *counter += 1;
            n
        };
        (self.formatter)(n)
    }

    /// Counter value the next call to [`Sequence::next`] will use
    pub fn peek(&self) -> u64 {
        *self.counter.lock()
    }

    pub fn rewind(&self) {
        *self.counter.lock() = FIRST_VALUE;
    }
}

impl fmt::Debug for Sequence {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Sequence")
            .field("name", &self.name)
            .field("counter", &self.peek())
            .finish()
    }
}

/// Registry of named sequences
#[derive(Default)]
pub struct SequenceRegistry {
    sequences: RwLock<HashMap<String, Arc<Sequence>>>,
}

impl SequenceRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a sequence. Names are unique per registry.
    pub fn define<F, V>(&self, name: &str, formatter: F) -> FactoryResult<Arc<Sequence>>
    where
        F: Fn(u64) -> V + Send + Sync + 'static,
        V: Into<Value>,
    {
        let mut sequences = self.sequences.write();
        if sequences.contains_key(name) {
            return Err(FactoryError::DuplicateSequence {
                name: name.to_string(),
            });
        }

        let sequence = Arc::new(Sequence::new(name, formatter));
        sequences.insert(name.to_string(), sequence.clone());

        info!(sequence = name, "Registered sequence");
        Ok(sequence)
    }

    /// Raw handle to a registered sequence
    pub fn get(&self, name: &str) -> FactoryResult<Arc<Sequence>> {
        self.sequences
            .read()
            .get(name)
            .cloned()
            .ok_or_else(|| FactoryError::UnknownSequence {
                name: name.to_string(),
            })
    }

    /// Draw the next value of a registered sequence
    pub fn next(&self, name: &str) -> FactoryResult<Value> {
        // The read lock is released before the formatter runs.
        let sequence = self.get(name)?;
        let value = sequence.next();
        debug!(sequence = name, value = %value, "Generated sequence value");
        Ok(value)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.sequences.read().contains_key(name)
    }

    pub fn names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.sequences.read().keys().cloned().collect();
        names.sort();
        names
    }

    pub fn len(&self) -> usize {
        self.sequences.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.sequences.read().is_empty()
    }

    /// Reset every counter to its first value, keeping the definitions
    pub fn rewind(&self) {
        for sequence in self.sequences.read().values() {
            sequence.rewind();
        }
        info!("Sequence counters rewound");
    }

    /// Forget every sequence
    pub fn clear(&self) {
        self.sequences.write().clear();
        info!("Sequence registry cleared");
    }
}
