//! # Attribute Evaluator
//!
//! The build context for one strategy run. It owns the caller's overrides and the memo of
//! attributes resolved so far, and it is the handle dynamic blocks receive: reading a
//! sibling through [`Evaluator::get`] resolves it on first access and returns the memoized
//! value afterwards.
//!
//! ## Resolution rules
//!
//! - An override is used verbatim and suppresses every declared attribute that is an
//!   alias of its key (`author_id` suppresses `author`).
//! - Static values are cloned, inline sequences draw their next value, dynamic blocks run
//!   at most once per build, associations run the referenced factory.
//! - `attributes_for` never evaluates associations.
//! - A block that reads an attribute still being resolved fails with
//!   [`FactoryError::CircularAttribute`].
//! - A raw sequence handle is never accepted as a value
//!   ([`FactoryError::SequenceAbuse`]).

use super::definition::{AssociationDef, AttributeKind};
use super::value::{AttributeMap, AttributeValue, Overrides};
use crate::engine::FactoryEngine;
use crate::error::{FactoryError, FactoryResult};
use crate::factory::EffectiveFactory;
use crate::sequence::Sequence;
use crate::strategy::Strategy;
use serde_json::Value;
use std::collections::HashSet;
use std::sync::Arc;
use tracing::debug;

pub struct Evaluator<'a> {
    engine: &'a FactoryEngine,
    factory: Arc<EffectiveFactory>,
    strategy: Strategy,
    overrides: Overrides,
    suppressed: HashSet<String>,
    resolved: AttributeMap,
    in_progress: Vec<String>,
    depth: usize,
}

impl<'a> Evaluator<'a> {
    pub(crate) fn new(
        engine: &'a FactoryEngine,
        factory: Arc<EffectiveFactory>,
        strategy: Strategy,
        overrides: Overrides,
        depth: usize,
    ) -> Self {
        let suppressed = overrides
            .keys()
            .flat_map(|key| engine.aliases().aliases_for(key))
            .filter(|alias| !overrides.contains_key(alias))
            .collect();

        Self {
            engine,
            factory,
            strategy,
            overrides,
            suppressed,
            resolved: AttributeMap::new(),
            in_progress: Vec::new(),
            depth,
        }
    }

    pub fn factory_name(&self) -> &str {
        self.factory.name()
    }

    pub fn strategy(&self) -> Strategy {
        self.strategy
    }

    /// Value of another attribute of this build, resolving it if needed
    pub fn get(&mut self, name: &str) -> FactoryResult<AttributeValue> {
        if let Some(value) = self.overrides.get(name) {
            return Ok(value.clone());
        }
        if let Some(value) = self.resolved.get(name) {
            return Ok(value.clone());
        }
        if self.suppressed.contains(name) {
            return Ok(AttributeValue::null());
        }

        let definition = self
            .factory
            .attribute(name)
            .cloned()
            .ok_or_else(|| FactoryError::UnknownAttribute {
                factory: self.factory.name().to_string(),
                attribute: name.to_string(),
            })?;

        if definition.is_association() && !self.strategy.produces_instance() {
            return Ok(AttributeValue::null());
        }

        if let Some(position) = self.in_progress.iter().position(|entry| entry == name) {
            let mut chain = self.in_progress[position..].to_vec();
            chain.push(name.to_string());
            return Err(FactoryError::CircularAttribute {
                factory: self.factory.name().to_string(),
                chain,
            });
        }

        self.in_progress.push(name.to_string());
        let result = self.evaluate(name, definition.kind());
        self.in_progress.pop();

        let value = self.reject_sequence(name, result?)?;
        self.resolved.insert(name.to_string(), value.clone());
        Ok(value)
    }

    /// Text form of another attribute, for interpolation
    pub fn get_str(&mut self, name: &str) -> FactoryResult<String> {
        Ok(self.get(name)?.to_text())
    }

    /// Next value of a registered sequence
    pub fn next(&self, sequence: &str) -> FactoryResult<Value> {
        self.engine.sequences().next(sequence)
    }

    /// Raw handle to a registered sequence. Returning it as an attribute value is an error.
    pub fn sequence(&self, name: &str) -> FactoryResult<Arc<Sequence>> {
        self.engine.sequences().get(name)
    }

    /// Run another factory the way an association of this build would
    pub fn association(
        &mut self,
        factory: &str,
        overrides: Overrides,
    ) -> FactoryResult<AttributeValue> {
        self.run_association(factory, None, overrides)
    }

    /// Resolve every attribute in declared order, then append undeclared overrides
    pub(crate) fn resolve_all(mut self) -> FactoryResult<AttributeMap> {
        let factory = self.factory.clone();
        let mut attributes = AttributeMap::with_capacity(factory.attributes().len());

        for definition in factory.attributes() {
            let name = definition.name();
            if self.suppressed.contains(name) {
                debug!(factory = factory.name(), attribute = name, "Attribute suppressed by alias override");
                continue;
            }
            if definition.is_association()
                && !self.strategy.produces_instance()
                && !self.overrides.contains_key(name)
            {
                continue;
            }
            let value = self.get(name)?;
            attributes.insert(name.to_string(), value);
        }

        for (name, value) in &self.overrides {
            if !attributes.contains_key(name) {
                attributes.insert(name.clone(), value.clone());
            }
        }

        for (name, value) in &attributes {
            self.reject_sequence(name, value.clone())?;
        }

        Ok(attributes)
    }

    fn evaluate(&mut self, name: &str, kind: &AttributeKind) -> FactoryResult<AttributeValue> {
        match kind {
            AttributeKind::Static(value) => Ok(value.clone()),
            AttributeKind::Sequence(sequence) => Ok(sequence.next().into()),
            AttributeKind::Dynamic(block) => {
                let block = block.clone();
                block(self)
            }
            AttributeKind::Association(association) => self.evaluate_association(name, association),
        }
    }

    fn evaluate_association(
        &mut self,
        name: &str,
        association: &AssociationDef,
    ) -> FactoryResult<AttributeValue> {
        self.run_association(
            association.factory_name(name),
            association.strategy(),
            association.overrides().clone(),
        )
    }

    fn run_association(
        &mut self,
        factory: &str,
        declared: Option<Strategy>,
        overrides: Overrides,
    ) -> FactoryResult<AttributeValue> {
        let Some(strategy) = self.strategy.for_association(declared) else {
            return Ok(AttributeValue::null());
        };

        debug!(
            factory = self.factory.name(),
            association = factory,
            strategy = %strategy,
            "Resolving association"
        );

        let product = self
            .engine
            .run_at_depth(factory, Some(strategy), overrides, self.depth + 1)?;
        Ok(product.into())
    }

    fn reject_sequence(&self, name: &str, value: AttributeValue) -> FactoryResult<AttributeValue> {
        if value.is_sequence() {
            return Err(FactoryError::SequenceAbuse {
                factory: self.factory.name().to_string(),
                attribute: name.to_string(),
            });
        }
        Ok(value)
    }
}
