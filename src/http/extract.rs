//! Dot-path lookups in JSON response bodies

use crate::error::{Error, Result};
use serde_json::Value;

/// Look up a dot path such as `data.items` or `results[0].rows`.
///
/// An empty path (or `$`) names the whole body.
pub fn lookup<'a>(value: &'a Value, path: &str) -> Option<&'a Value> {
    let path = path.strip_prefix('$').unwrap_or(path);
    let path = path.strip_prefix('.').unwrap_or(path);
    if path.is_empty() {
        return Some(value);
    }

    let mut current = value;
    for part in path.split('.') {
        if let Some(bracket_pos) = part.find('[') {
            let name = &part[..bracket_pos];
            let index = part[bracket_pos + 1..].strip_suffix(']')?.parse::<usize>().ok()?;
            if !name.is_empty() {
                current = current.get(name)?;
            }
            current = current.get(index)?;
        } else {
            current = current.get(part)?;
        }
    }
    Some(current)
}

/// Take the records array at `path`
pub fn records(body: &Value, path: &str) -> Result<Vec<Value>> {
    let found = lookup(body, path).ok_or_else(|| Error::extraction(path, "path not found"))?;
    match found {
        Value::Array(items) => Ok(items.clone()),
        Value::Null => Ok(Vec::new()),
        other => Err(Error::extraction(
            path,
            format!("expected an array, found {}", kind(other)),
        )),
    }
}

/// Read the total element count at `path`, if present.
///
/// Accepts numbers and numeric strings; a missing or null value means the
/// source gave no total.
pub fn total(body: &Value, path: &str) -> Result<Option<u64>> {
    match lookup(body, path) {
        None | Some(Value::Null) => Ok(None),
        Some(Value::Number(n)) => n
            .as_u64()
            .map(Some)
            .ok_or_else(|| Error::extraction(path, format!("'{n}' is not a count"))),
        Some(Value::String(s)) => s
            .trim()
            .parse::<u64>()
            .map(Some)
            .map_err(|e| Error::extraction(path, e.to_string())),
        Some(other) => Err(Error::extraction(
            path,
            format!("expected a number, found {}", kind(other)),
        )),
    }
}

/// Render a record's key for use as a query parameter
pub fn key(record: &Value, field: &str) -> Result<String> {
    match lookup(record, field) {
        Some(Value::String(s)) => Ok(s.clone()),
        Some(Value::Number(n)) => Ok(n.to_string()),
        Some(Value::Bool(b)) => Ok(b.to_string()),
        Some(Value::Null) | None => Err(Error::extraction(field, "record has no key")),
        Some(other) => Err(Error::extraction(
            field,
            format!("key must be a scalar, found {}", kind(other)),
        )),
    }
}

fn kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}
