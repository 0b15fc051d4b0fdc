//! Shape helpers for walking the loosely-typed description tree

use serde_yaml::Value;
use std::fmt::Display;

use crate::violation::{EntityPath, Violation, ViolationKind};

/// Human readable name of the YAML type held by `value`
pub fn type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(n) if n.is_f64() => "float",
        Value::Number(_) => "int",
        Value::String(_) => "string",
        Value::Sequence(_) => "list",
        Value::Mapping(_) => "mapping",
        Value::Tagged(_) => "tagged value",
    }
}

/// Render a mapping key for diagnostics and entity paths
pub fn key_name(key: &Value) -> String {
    match key {
        Value::String(s) => s.clone(),
        Value::Number(n) => n.to_string(),
        Value::Bool(b) => b.to_string(),
        Value::Null => "~".to_string(),
        other => format!("<{}>", type_name(other)),
    }
}

/// Integer value, without any coercion
pub fn as_int(value: &Value) -> Option<i64> {
    match value {
        Value::Number(n) => n.as_i64(),
        _ => None,
    }
}

/// Integer stored at `path`, without coercion. Integers that do not fit an
/// `i64` are out of range rather than of the wrong type.
pub fn read_int(path: &EntityPath, value: &Value, expected: &str) -> Result<i64, Violation> {
    match value {
        Value::Number(n) if n.is_f64() => Err(Violation::wrong_type(path, expected, value)),
        Value::Number(n) => n.as_i64().ok_or_else(|| {
            Violation::new(
                path,
                ViolationKind::OutOfRange,
                format!("integer {} is too large", n),
            )
        }),
        _ => Err(Violation::wrong_type(path, expected, value)),
    }
}

/// Integer coercion used for VLAN ids: integers, decimal strings and
/// finite floats (truncated toward zero)
pub fn coerce_int(value: &Value) -> Option<i64> {
    match value {
        Value::Number(n) => n.as_i64().or_else(|| {
            n.as_f64()
                .filter(|f| f.is_finite() && f.abs() < i64::MAX as f64)
                .map(|f| f.trunc() as i64)
        }),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

/// Parse a string literal stored at `path`, turning both a non-string value
/// and a parse failure into a violation
pub fn parse_literal<T, E, F>(path: &EntityPath, value: &Value, parse: F) -> Result<T, Violation>
where
    E: Display,
    F: FnOnce(&str) -> Result<T, E>,
{
    let literal = value
        .as_str()
        .ok_or_else(|| Violation::wrong_type(path, "a string", value))?;

    parse(literal).map_err(|e| Violation::new(path, ViolationKind::InvalidValue, e.to_string()))
}
