//! Typed access to request `value` maps.

use serde_json::Value;
use sinric_protocol::JsonMap;

use crate::error::ValidationError;

fn field<'a>(value: &'a JsonMap, key: &str) -> Result<&'a Value, ValidationError> {
    value.get(key).ok_or_else(|| ValidationError::missing(key))
}

/// An integer field; floats are rounded.
pub fn int(value: &JsonMap, key: &str) -> Result<i64, ValidationError> {
    let raw = field(value, key)?;
    raw.as_i64()
        .or_else(|| raw.as_f64().map(|f| f.round() as i64))
        .ok_or_else(|| ValidationError::invalid_value(key, raw, "expected a number"))
}

pub fn number(value: &JsonMap, key: &str) -> Result<f64, ValidationError> {
    let raw = field(value, key)?;
    raw.as_f64()
        .ok_or_else(|| ValidationError::invalid_value(key, raw, "expected a number"))
}

pub fn text<'a>(value: &'a JsonMap, key: &str) -> Result<&'a str, ValidationError> {
    let raw = field(value, key)?;
    raw.as_str()
        .ok_or_else(|| ValidationError::invalid_value(key, raw, "expected a string"))
}

pub fn flag(value: &JsonMap, key: &str) -> Result<bool, ValidationError> {
    let raw = field(value, key)?;
    raw.as_bool()
        .ok_or_else(|| ValidationError::invalid_value(key, raw, "expected a boolean"))
}

pub fn object<'a>(value: &'a JsonMap, key: &str) -> Result<&'a JsonMap, ValidationError> {
    let raw = field(value, key)?;
    raw.as_object()
        .ok_or_else(|| ValidationError::invalid_value(key, raw, "expected an object"))
}

pub fn array<'a>(value: &'a JsonMap, key: &str) -> Result<&'a Vec<Value>, ValidationError> {
    let raw = field(value, key)?;
    raw.as_array()
        .ok_or_else(|| ValidationError::invalid_value(key, raw, "expected an array"))
}

/// Clamp to the 0..=100 percentage range.
pub fn clamp_percent(value: i64) -> u8 {
    value.clamp(0, 100) as u8
}

/// Build a value map from key/value pairs, keeping their order.
pub fn map<const N: usize>(entries: [(&str, Value); N]) -> JsonMap {
    entries
        .into_iter()
        .map(|(key, value)| (key.to_string(), value))
        .collect()
}
