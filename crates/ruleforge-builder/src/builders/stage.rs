//! Stage builders: the `check`, `map`, and `normalize` sections of an
//! asset definition.
//!
//! Each builder validates the shape of its JSON body, compiles every
//! `field: value` pair through the operation builder, and folds the result
//! into one expression. Definition order is preserved throughout, so later
//! map operations observe the writes of earlier ones.

use ruleforge_core::Expression;
use serde_json::{Map, Value};

use crate::builders::operation::{OperationMode, build_operation};
use crate::error::{BuildError, Result};
use crate::registry::Registry;

/// Compiles a `check` stage: a single object or an array of objects, every
/// pair a filter operation, folded into a short-circuit conjunction.
pub fn build_check_stage(asset: &str, body: &Value, registry: &Registry) -> Result<Expression> {
    let operations = match body {
        Value::Object(entries) => compile_pairs(entries, OperationMode::Filter, registry)?,
        Value::Array(items) => {
            let mut operations = Vec::new();
            for item in items {
                let Some(entries) = item.as_object() else {
                    return Err(invalid(asset, "check", "array entries must be objects"));
                };
                operations.extend(compile_pairs(entries, OperationMode::Filter, registry)?);
            }
            operations
        }
        _ => {
            return Err(invalid(
                asset,
                "check",
                "body must be an object or an array of objects",
            ));
        }
    };
    if operations.is_empty() {
        return Err(invalid(asset, "check", "contains no operations"));
    }
    Ok(Expression::and("stage.check", operations))
}

/// Compiles a `map` stage: a single object whose pairs are map operations,
/// applied in definition order.
pub fn build_map_stage(asset: &str, body: &Value, registry: &Registry) -> Result<Expression> {
    let Some(entries) = body.as_object() else {
        return Err(invalid(asset, "map", "body must be an object"));
    };
    let operations = compile_pairs(entries, OperationMode::Map, registry)?;
    if operations.is_empty() {
        return Err(invalid(asset, "map", "contains no operations"));
    }
    Ok(Expression::and("stage.map", operations))
}

/// Compiles a `normalize` stage: an array of blocks, each an object with
/// optional `check` and `map` sections.
///
/// A block folds to a conjunction with its check ahead of its map, whatever
/// order the block wrote them in, so a failing block-check skips that
/// block's maps; the stage folds the blocks into a sequence, so every
/// block gets its chance and the stage itself always succeeds.
pub fn build_normalize_stage(asset: &str, body: &Value, registry: &Registry) -> Result<Expression> {
    let Some(items) = body.as_array() else {
        return Err(invalid(asset, "normalize", "body must be an array of blocks"));
    };
    let mut blocks = Vec::with_capacity(items.len());
    for (position, item) in items.iter().enumerate() {
        let Some(sections) = item.as_object() else {
            return Err(invalid(
                asset,
                "normalize",
                &format!("block {position} must be an object"),
            ));
        };
        for section in sections.keys() {
            if !matches!(section.as_str(), "check" | "map") {
                return Err(invalid(
                    asset,
                    "normalize",
                    &format!("block {position} has unknown section '{section}'"),
                ));
            }
        }
        // The check gates the map regardless of authoring order.
        let mut parts = Vec::new();
        if let Some(section_body) = sections.get("check") {
            parts.push(build_check_stage(asset, section_body, registry)?);
        }
        if let Some(section_body) = sections.get("map") {
            parts.push(build_map_stage(asset, section_body, registry)?);
        }
        if parts.is_empty() {
            return Err(invalid(asset, "normalize", &format!("block {position} is empty")));
        }
        blocks.push(Expression::and(format!("normalize.block[{position}]"), parts));
    }
    if blocks.is_empty() {
        return Err(invalid(asset, "normalize", "contains no blocks"));
    }
    Ok(Expression::seq("stage.normalize", blocks))
}

fn compile_pairs(
    entries: &Map<String, Value>,
    mode: OperationMode,
    registry: &Registry,
) -> Result<Vec<Expression>> {
    let mut operations = Vec::with_capacity(entries.len());
    for (field, value) in entries {
        operations.push(build_operation(field, value, mode, registry)?);
    }
    Ok(operations)
}

fn invalid(asset: &str, stage: &str, reason: &str) -> BuildError {
    BuildError::InvalidStage {
        asset: asset.to_owned(),
        stage: stage.to_owned(),
        reason: reason.to_owned(),
    }
}
