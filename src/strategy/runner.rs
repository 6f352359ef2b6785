//! # Strategy Pipelines
//!
//! One function per strategy. Each resolves the complete attribute map first and only
//! then touches a live object, so a failed resolution never leaves a partially assigned
//! instance behind.

use super::Strategy;
use crate::attributes::{to_json_map, AttributeMap, Evaluator, Overrides};
use crate::engine::FactoryEngine;
use crate::error::FactoryResult;
use crate::factory::{CallbackDispatcher, CallbackKind, EffectiveFactory};
use crate::persistence::{Instance, Record, StubRecord};
use serde_json::{Map, Value};
use std::sync::Arc;

fn resolve(
    engine: &FactoryEngine,
    factory: &Arc<EffectiveFactory>,
    strategy: Strategy,
    overrides: Overrides,
    depth: usize,
) -> FactoryResult<AttributeMap> {
    Evaluator::new(engine, factory.clone(), strategy, overrides, depth).resolve_all()
}

fn assign(mut record: Box<dyn Record>, attributes: AttributeMap) -> FactoryResult<Instance> {
    for (name, value) in attributes {
        record.set(&name, value)?;
    }
    Ok(Instance::new(record))
}

fn instantiate(
    engine: &FactoryEngine,
    factory: &EffectiveFactory,
    attributes: AttributeMap,
) -> FactoryResult<Instance> {
    let model = engine.models().resolve(factory.class_name())?;
    assign(model.instantiate()?, attributes)
}

pub(crate) fn attributes_for(
    engine: &FactoryEngine,
    factory: &Arc<EffectiveFactory>,
    overrides: Overrides,
    depth: usize,
) -> FactoryResult<Map<String, Value>> {
    let attributes = resolve(engine, factory, Strategy::AttributesFor, overrides, depth)?;
    Ok(to_json_map(&attributes))
}

pub(crate) fn build(
    engine: &FactoryEngine,
    factory: &Arc<EffectiveFactory>,
    overrides: Overrides,
    depth: usize,
) -> FactoryResult<Instance> {
    let attributes = resolve(engine, factory, Strategy::Build, overrides, depth)?;
    let instance = instantiate(engine, factory, attributes)?;
    CallbackDispatcher::run(factory, CallbackKind::AfterBuild, &instance)?;
    Ok(instance)
}

pub(crate) fn create(
    engine: &FactoryEngine,
    factory: &Arc<EffectiveFactory>,
    overrides: Overrides,
    depth: usize,
) -> FactoryResult<Instance> {
    let attributes = resolve(engine, factory, Strategy::Create, overrides, depth)?;
    let instance = instantiate(engine, factory, attributes)?;
    CallbackDispatcher::run(factory, CallbackKind::AfterBuild, &instance)?;
    instance.save()?;
    CallbackDispatcher::run(factory, CallbackKind::AfterCreate, &instance)?;
    Ok(instance)
}

pub(crate) fn stub(
    engine: &FactoryEngine,
    factory: &Arc<EffectiveFactory>,
    overrides: Overrides,
    depth: usize,
) -> FactoryResult<Instance> {
    let attributes = resolve(engine, factory, Strategy::Stub, overrides, depth)?;
    let instance = assign(Box::new(StubRecord::new(factory.class_name())), attributes)?;
    CallbackDispatcher::run(factory, CallbackKind::AfterStub, &instance)?;
    Ok(instance)
}
