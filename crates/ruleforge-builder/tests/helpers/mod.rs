#![allow(dead_code)]

use ruleforge_builder::{BuildError, CompiledAsset, Registry, build_asset, register_builtins};
use ruleforge_core::Event;
use serde_json::Value;

/// A registry with the full builtin helper set installed.
pub fn registry() -> Registry {
    let mut registry = Registry::new();
    register_builtins(&mut registry);
    registry
}

pub fn compile(definition: Value) -> CompiledAsset {
    build_asset(&definition, &registry()).unwrap()
}

pub fn compile_err(definition: Value) -> BuildError {
    build_asset(&definition, &registry()).unwrap_err()
}

/// Evaluates a compiled asset against one event body; returns the outcome
/// and the (possibly transformed) event.
pub fn eval_asset(asset: &CompiledAsset, event_body: Value) -> (bool, Event) {
    let mut event = Event::from_value(event_body);
    let outcome = asset.expression.evaluate(&mut event);
    (outcome, event)
}
