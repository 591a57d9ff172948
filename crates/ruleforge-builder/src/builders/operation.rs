//! Compiles one `field: value` definition pair into a leaf term.
//!
//! The value's *raw string form* decides the dispatch, before any path
//! normalization: a leading `$` marks a reference to another field, a
//! leading `+` a helper call, anything else (including every non-string
//! JSON value) a literal. The target field is always normalized to its
//! canonical form first.

use std::fmt;

use ruleforge_core::{Event, Expression, Term, format_path};
use serde_json::Value;

use crate::error::{BuildError, Result};
use crate::registry::{HelperCall, Registry};

/// How a stage interprets its operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OperationMode {
    /// Operations assert on the event and leave it untouched.
    Filter,
    /// Operations write into the event.
    Map,
}

impl fmt::Display for OperationMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            OperationMode::Filter => "filter",
            OperationMode::Map => "map",
        })
    }
}

/// Parsed form of a definition value. Decided on the raw string; the
/// remainder after the marker has not been normalized yet.
enum ValueForm<'a> {
    Literal,
    Reference(&'a str),
    Helper(&'a str),
}

fn classify(value: &Value) -> ValueForm<'_> {
    let Some(text) = value.as_str() else {
        return ValueForm::Literal;
    };
    if let Some(rest) = text.strip_prefix('$') {
        ValueForm::Reference(rest)
    } else if let Some(rest) = text.strip_prefix('+') {
        ValueForm::Helper(rest)
    } else {
        ValueForm::Literal
    }
}

/// Compiles one operation.
///
/// `field` may be in any path form; references are normalized the same
/// way. Helper arguments are forwarded verbatim: the text after `+` is
/// split on every `/`, the first piece names the helper, the rest are its
/// arguments. There is no escape for `/` inside an argument; helpers that
/// need one take it as an extra argument by their own convention.
pub fn build_operation(
    field: &str,
    value: &Value,
    mode: OperationMode,
    registry: &Registry,
) -> Result<Expression> {
    let field = format_path(field);
    match classify(value) {
        ValueForm::Literal => Ok(build_literal(&field, value.clone(), mode)),
        ValueForm::Reference(raw) => Ok(build_reference(&field, &format_path(raw), mode)),
        ValueForm::Helper(raw) => build_helper(&field, raw, mode, registry),
    }
}

// =============================================================================
// Literal and reference terms
// =============================================================================

fn build_literal(field: &str, value: Value, mode: OperationMode) -> Expression {
    let path = field.to_owned();
    match mode {
        OperationMode::Filter => {
            let name = format!("condition.value[{field}=={value}]");
            Expression::term(name, move |event: &mut Event| {
                event.equals_value(&path, &value)
            })
        }
        OperationMode::Map => {
            let name = format!("map.value[{field}={value}]");
            Expression::term(name, move |event: &mut Event| {
                event.set(&path, value.clone());
                true
            })
        }
    }
}

fn build_reference(field: &str, reference: &str, mode: OperationMode) -> Expression {
    let path = field.to_owned();
    let other = reference.to_owned();
    match mode {
        OperationMode::Filter => {
            let name = format!("condition.reference[{field}=={reference}]");
            Expression::term(name, move |event: &mut Event| {
                event.equals_field(&path, &other)
            })
        }
        OperationMode::Map => {
            let name = format!("map.reference[{field}={reference}]");
            let failure = format!("{name} -> Failure: [{reference}] not found");
            Term::new(name, move |event: &mut Event| match event.get(&other).cloned() {
                Some(value) => {
                    event.set(&path, value);
                    true
                }
                None => false,
            })
            .with_failure_trace(failure)
            .into()
        }
    }
}

// =============================================================================
// Helper dispatch
// =============================================================================

fn build_helper(
    field: &str,
    raw: &str,
    mode: OperationMode,
    registry: &Registry,
) -> Result<Expression> {
    let mut pieces = raw.split('/');
    let name = pieces.next().unwrap_or_default();
    if name.is_empty() {
        return Err(BuildError::EmptyHelperName {
            field: field.to_owned(),
            value: format!("+{raw}"),
        });
    }
    let args: Vec<String> = pieces.map(str::to_owned).collect();

    let Some(builder) = registry.resolve(name) else {
        return Err(BuildError::UnknownHelper {
            name: name.to_owned(),
            field: field.to_owned(),
        });
    };
    builder.build(&HelperCall {
        name,
        field,
        args: &args,
        mode,
    })
}
