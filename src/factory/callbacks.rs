//! # Lifecycle Callbacks
//!
//! Named hooks run against a produced object for their side effects. Callbacks compose
//! across inheritance: a child's hooks run after its parent's hooks of the same kind.

use super::effective::EffectiveFactory;
use crate::error::{FactoryError, FactoryResult};
use crate::persistence::Instance;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;
use tracing::debug;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CallbackKind {
    AfterBuild,
    AfterCreate,
    AfterStub,
}

impl fmt::Display for CallbackKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::AfterBuild => write!(f, "after_build"),
            Self::AfterCreate => write!(f, "after_create"),
            Self::AfterStub => write!(f, "after_stub"),
        }
    }
}

impl std::str::FromStr for CallbackKind {
    type Err = FactoryError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "after_build" => Ok(Self::AfterBuild),
            "after_create" => Ok(Self::AfterCreate),
            "after_stub" => Ok(Self::AfterStub),
            _ => Err(FactoryError::Configuration(format!(
                "Invalid callback name: {s}"
            ))),
        }
    }
}

pub type CallbackFn = Arc<dyn Fn(&Instance) -> FactoryResult<()> + Send + Sync>;

#[derive(Clone)]
pub struct Callback {
    kind: CallbackKind,
    block: CallbackFn,
}

impl Callback {
    pub fn new<F>(kind: CallbackKind, block: F) -> Self
    where
        F: Fn(&Instance) -> FactoryResult<()> + Send + Sync + 'static,
    {
        Self {
            kind,
            block: Arc::new(block),
        }
    }

    pub fn kind(&self) -> CallbackKind {
        self.kind
    }

    pub fn call(&self, instance: &Instance) -> FactoryResult<()> {
        (self.block)(instance)
    }
}

impl fmt::Debug for Callback {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Callback")
            .field("kind", &self.kind)
            .field("block", &"<fn>")
            .finish()
    }
}

/// Runs the effective callbacks of one kind against an instance
pub struct CallbackDispatcher;

impl CallbackDispatcher {
    pub fn run(
        factory: &EffectiveFactory,
        kind: CallbackKind,
        instance: &Instance,
    ) -> FactoryResult<()> {
        let mut invoked = 0usize;
        for callback in factory.callbacks_for(kind) {
            callback.call(instance)?;
            invoked += 1;
        }

        if invoked > 0 {
            debug!(
                factory = factory.name(),
                callback = %kind,
                invoked = invoked,
                "Ran callbacks"
            );
        }
        Ok(())
    }
}
