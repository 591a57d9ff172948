//! Whole-asset compilation.
//!
//! An asset definition is one JSON object: a `name` whose leading segment
//! declares the kind, optional `metadata`/`parents` bookkeeping, and one or
//! more stage sections. Compilation is all-or-nothing; the first error
//! aborts the asset and nothing partial escapes.

use std::fmt;

use ruleforge_core::Expression;
use serde_json::Value;

use crate::builders::stage::{build_check_stage, build_map_stage, build_normalize_stage};
use crate::error::{BuildError, Result};
use crate::registry::Registry;

/// Asset family, derived from the leading `/`-segment of the asset name.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AssetKind {
    Decoder,
    Rule,
    Output,
}

impl AssetKind {
    fn from_name(name: &str) -> Result<Self> {
        let prefix = name.split('/').next().unwrap_or_default();
        match prefix {
            "decoder" => Ok(Self::Decoder),
            "rule" => Ok(Self::Rule),
            "output" => Ok(Self::Output),
            other => Err(BuildError::UnknownAssetKind {
                name: name.to_owned(),
                prefix: other.to_owned(),
            }),
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Decoder => "decoder",
            Self::Rule => "rule",
            Self::Output => "output",
        }
    }
}

impl fmt::Display for AssetKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A fully-built asset, ready to evaluate against events.
#[derive(Debug, Clone)]
pub struct CompiledAsset {
    pub name: String,
    pub kind: AssetKind,
    pub expression: Expression,
}

/// Compiles one asset definition.
///
/// Stage sections compile in definition order and fold into a
/// short-circuit conjunction under the asset's name, so a failing `check`
/// stage gates every stage after it. `metadata` and `parents` are accepted
/// and ignored; graph ordering is the scheduler's concern, not the
/// builder's. Anything else is an unknown stage.
pub fn build_asset(definition: &Value, registry: &Registry) -> Result<CompiledAsset> {
    let Some(sections) = definition.as_object() else {
        return Err(BuildError::NotAnObject);
    };
    let Some(name) = sections.get("name").and_then(Value::as_str) else {
        return Err(BuildError::MissingName);
    };
    let kind = AssetKind::from_name(name)?;

    let mut stages = Vec::new();
    for (section, body) in sections {
        match section.as_str() {
            "name" | "metadata" | "parents" => {}
            "check" => stages.push(build_check_stage(name, body, registry)?),
            "map" => stages.push(build_map_stage(name, body, registry)?),
            "normalize" => stages.push(build_normalize_stage(name, body, registry)?),
            other => {
                return Err(BuildError::UnknownStage {
                    asset: name.to_owned(),
                    stage: other.to_owned(),
                });
            }
        }
    }
    if stages.is_empty() {
        return Err(BuildError::EmptyAsset {
            name: name.to_owned(),
        });
    }

    tracing::debug!("compiled asset '{}' with {} stage(s)", name, stages.len());
    Ok(CompiledAsset {
        name: name.to_owned(),
        kind,
        expression: Expression::and(name, stages),
    })
}
