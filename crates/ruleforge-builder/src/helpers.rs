//! Built-in helper builders.
//!
//! Every helper validates its argument list at build time and follows the
//! silent-false evaluation contract: a missing field or a value of the
//! wrong type makes the term report `false` (writing nothing), never an
//! error. Expensive argument parsing (regexes, networks, integers) happens
//! once, at build time.

use std::net::IpAddr;

use ipnet::IpNet;
use regex::Regex;
use ruleforge_core::{Event, Expression, format_path};
use serde_json::Value;

use crate::builders::operation::OperationMode;
use crate::error::{BuildError, Result};
use crate::registry::{HelperCall, Registry};

/// Installs the standard helper set.
pub fn register_builtins(registry: &mut Registry) {
    registry.register("exists", build_exists);
    registry.register("not_exists", build_not_exists);
    registry.register("int_equal", build_int_equal);
    registry.register("int_greater", build_int_greater);
    registry.register("int_less", build_int_less);
    registry.register("regex_match", build_regex_match);
    registry.register("ip_cidr", build_ip_cidr);
    registry.register("concat", build_concat);
}

// =============================================================================
// Shared plumbing
// =============================================================================

fn term_name(call: &HelperCall<'_>) -> String {
    if call.args.is_empty() {
        format!("helper.{}[{}]", call.name, call.field)
    } else {
        format!("helper.{}[{}]({})", call.name, call.field, call.args.join(", "))
    }
}

fn bad_args(call: &HelperCall<'_>, reason: &str) -> BuildError {
    BuildError::BadHelperArgs {
        helper: call.name.to_owned(),
        field: call.field.to_owned(),
        reason: reason.to_owned(),
    }
}

fn expect_no_args(call: &HelperCall<'_>) -> Result<()> {
    if call.args.is_empty() {
        Ok(())
    } else {
        Err(bad_args(call, "takes no arguments"))
    }
}

fn expect_one_arg<'c>(call: &'c HelperCall<'_>) -> Result<&'c str> {
    match call.args {
        [only] => Ok(only.as_str()),
        _ => Err(bad_args(
            call,
            &format!("expected 1 argument, got {}", call.args.len()),
        )),
    }
}

// =============================================================================
// Existence
// =============================================================================

fn build_exists(call: &HelperCall<'_>) -> Result<Expression> {
    expect_no_args(call)?;
    let path = call.field.to_owned();
    Ok(Expression::term(term_name(call), move |event: &mut Event| {
        event.exists(&path)
    }))
}

fn build_not_exists(call: &HelperCall<'_>) -> Result<Expression> {
    expect_no_args(call)?;
    let path = call.field.to_owned();
    Ok(Expression::term(term_name(call), move |event: &mut Event| {
        !event.exists(&path)
    }))
}

// =============================================================================
// Integer comparisons
// =============================================================================

fn parse_int_arg(call: &HelperCall<'_>) -> Result<i64> {
    let raw = expect_one_arg(call)?;
    raw.parse()
        .map_err(|_| bad_args(call, &format!("argument '{raw}' is not an integer")))
}

/// Integer comparisons match `i64` fields only; floats and numeric strings
/// do not match.
fn int_comparison(call: &HelperCall<'_>, compare: fn(i64, i64) -> bool) -> Result<Expression> {
    let expected = parse_int_arg(call)?;
    let path = call.field.to_owned();
    Ok(Expression::term(term_name(call), move |event: &mut Event| {
        event
            .get(&path)
            .and_then(Value::as_i64)
            .is_some_and(|actual| compare(actual, expected))
    }))
}

fn build_int_equal(call: &HelperCall<'_>) -> Result<Expression> {
    int_comparison(call, |actual, expected| actual == expected)
}

fn build_int_greater(call: &HelperCall<'_>) -> Result<Expression> {
    int_comparison(call, |actual, expected| actual > expected)
}

fn build_int_less(call: &HelperCall<'_>) -> Result<Expression> {
    int_comparison(call, |actual, expected| actual < expected)
}

// =============================================================================
// Pattern and network matching
// =============================================================================

fn build_regex_match(call: &HelperCall<'_>) -> Result<Expression> {
    let pattern = expect_one_arg(call)?;
    let regex = Regex::new(pattern).map_err(|source| BuildError::BadPattern {
        helper: call.name.to_owned(),
        field: call.field.to_owned(),
        source,
    })?;
    let path = call.field.to_owned();
    Ok(Expression::term(term_name(call), move |event: &mut Event| {
        event
            .get(&path)
            .and_then(Value::as_str)
            .is_some_and(|text| regex.is_match(text))
    }))
}

/// The network and prefix length arrive as two arguments (`+ip_cidr/10.0.0.0/8`)
/// because helper arguments split on `/`.
fn build_ip_cidr(call: &HelperCall<'_>) -> Result<Expression> {
    let (network, prefix) = match call.args {
        [network, prefix] => (network, prefix),
        _ => {
            return Err(bad_args(
                call,
                &format!(
                    "expected network and prefix length, got {} argument(s)",
                    call.args.len()
                ),
            ));
        }
    };
    let joined = format!("{network}/{prefix}");
    let net: IpNet = joined.parse().map_err(|source| BuildError::BadNetwork {
        helper: call.name.to_owned(),
        field: call.field.to_owned(),
        network: joined.clone(),
        source,
    })?;
    let path = call.field.to_owned();
    Ok(Expression::term(term_name(call), move |event: &mut Event| {
        event
            .get(&path)
            .and_then(Value::as_str)
            .and_then(|text| text.parse::<IpAddr>().ok())
            .is_some_and(|address| net.contains(&address))
    }))
}

// =============================================================================
// Concatenation
// =============================================================================

enum ConcatPiece {
    Literal(String),
    Reference(String),
}

fn append_scalar(out: &mut String, value: &Value) -> bool {
    match value {
        Value::String(text) => out.push_str(text),
        Value::Number(number) => out.push_str(&number.to_string()),
        Value::Bool(flag) => out.push_str(if *flag { "true" } else { "false" }),
        _ => return false,
    }
    true
}

/// Map-only: joins literal pieces and `$`-referenced field values into the
/// target field. Every referenced field must exist and hold a string,
/// number, or bool; otherwise the term fails without writing.
fn build_concat(call: &HelperCall<'_>) -> Result<Expression> {
    if call.mode == OperationMode::Filter {
        return Err(BuildError::UnsupportedMode {
            helper: call.name.to_owned(),
            field: call.field.to_owned(),
            mode: call.mode,
        });
    }
    if call.args.is_empty() {
        return Err(bad_args(call, "expected at least one piece"));
    }
    let pieces: Vec<ConcatPiece> = call
        .args
        .iter()
        .map(|arg| match arg.strip_prefix('$') {
            Some(reference) => ConcatPiece::Reference(format_path(reference)),
            None => ConcatPiece::Literal(arg.clone()),
        })
        .collect();
    let path = call.field.to_owned();
    Ok(Expression::term(term_name(call), move |event: &mut Event| {
        let mut joined = String::new();
        for piece in &pieces {
            let appended = match piece {
                ConcatPiece::Literal(text) => {
                    joined.push_str(text);
                    true
                }
                ConcatPiece::Reference(reference) => match event.get(reference) {
                    Some(value) => append_scalar(&mut joined, value),
                    None => false,
                },
            };
            if !appended {
                return false;
            }
        }
        event.set(&path, Value::String(joined));
        true
    }))
}
