use chrono::{DateTime, Utc};
use serde_json::{Map, Value};

use crate::error::{CircleCiError, Result};

pub type JsonObject = Map<String, Value>;

/// Pipeline timestamps carry fractional seconds, e.g. `2021-05-21T13:44:31.668+0000`.
/// A missing fraction and a `+00:00` style offset are accepted as well.
pub const PIPELINE_TIMESTAMP_FORMAT: &str = "%Y-%m-%dT%H:%M:%S%.f%z";

/// Workflow timestamps have second precision, e.g. `2021-05-21T14:39:08+0000`.
pub const WORKFLOW_TIMESTAMP_FORMAT: &str = "%Y-%m-%dT%H:%M:%S%z";

pub fn as_object<'a>(value: &'a Value, what: &str) -> Result<&'a JsonObject> {
    value.as_object().ok_or_else(|| {
        CircleCiError::MalformedResponse(format!(
            "expected {what} to be a JSON object, got {}",
            kind_of(value)
        ))
    })
}

/// Normalizes a listing response into its item sequence.
///
/// CircleCI returns either a bare array or an object wrapping the array
/// under `items` (the paginated v2 shape). Anything else is rejected.
pub fn items_of<'a>(value: &'a Value, what: &str) -> Result<&'a [Value]> {
    match value {
        Value::Array(items) => Ok(items),
        Value::Object(obj) => match obj.get("items") {
            Some(Value::Array(items)) => Ok(items),
            Some(other) => Err(CircleCiError::MalformedResponse(format!(
                "expected `items` of {what} to be a list, got {}",
                kind_of(other)
            ))),
            None => Err(CircleCiError::MalformedResponse(format!(
                "expected {what} to be a list or an object with `items`"
            ))),
        },
        other => Err(CircleCiError::MalformedResponse(format!(
            "expected {what} to be a list or an object with `items`, got {}",
            kind_of(other)
        ))),
    }
}

/// Looks up `key`, treating JSON `null` the same as an absent key.
fn lookup<'a>(obj: &'a JsonObject, key: &str) -> Option<&'a Value> {
    obj.get(key).filter(|value| !value.is_null())
}

pub fn required_str(obj: &JsonObject, key: &str) -> Result<String> {
    optional_str(obj, key)?.ok_or_else(|| CircleCiError::MissingField(key.to_string()))
}

pub fn optional_str(obj: &JsonObject, key: &str) -> Result<Option<String>> {
    match lookup(obj, key) {
        None => Ok(None),
        Some(Value::String(s)) => Ok(Some(s.clone())),
        Some(other) => Err(wrong_type(key, "a string", other)),
    }
}

pub fn required_u64(obj: &JsonObject, key: &str) -> Result<u64> {
    let value = lookup(obj, key).ok_or_else(|| CircleCiError::MissingField(key.to_string()))?;
    value
        .as_u64()
        .ok_or_else(|| wrong_type(key, "a non-negative integer", value))
}

pub fn optional_object<'a>(obj: &'a JsonObject, key: &str) -> Result<Option<&'a JsonObject>> {
    match lookup(obj, key) {
        None => Ok(None),
        Some(Value::Object(inner)) => Ok(Some(inner)),
        Some(other) => Err(wrong_type(key, "an object", other)),
    }
}

/// Returns the list under `key`, or an empty slice when the key is absent.
pub fn list_or_empty<'a>(obj: &'a JsonObject, key: &str) -> Result<&'a [Value]> {
    match lookup(obj, key) {
        None => Ok(&[]),
        Some(Value::Array(items)) => Ok(items),
        Some(other) => Err(wrong_type(key, "a list", other)),
    }
}

pub fn required_timestamp(
    obj: &JsonObject,
    key: &str,
    format: &'static str,
) -> Result<DateTime<Utc>> {
    optional_timestamp(obj, key, format)?.ok_or_else(|| CircleCiError::MissingField(key.to_string()))
}

pub fn optional_timestamp(
    obj: &JsonObject,
    key: &str,
    format: &'static str,
) -> Result<Option<DateTime<Utc>>> {
    parse_timestamp(optional_str(obj, key)?.as_deref(), format)
}

/// Parses a CircleCI timestamp. An absent string is an absent timestamp,
/// not an error. A trailing `Z` is accepted as `+0000`.
pub fn parse_timestamp(value: Option<&str>, format: &'static str) -> Result<Option<DateTime<Utc>>> {
    let Some(value) = value else {
        return Ok(None);
    };

    let normalized = match value.strip_suffix('Z') {
        Some(head) => format!("{head}+0000"),
        None => value.to_string(),
    };

    DateTime::parse_from_str(&normalized, format)
        .map(|dt| Some(dt.with_timezone(&Utc)))
        .map_err(|source| CircleCiError::TimestampParse {
            value: value.to_string(),
            format,
            source,
        })
}

fn wrong_type(key: &str, expected: &str, got: &Value) -> CircleCiError {
    CircleCiError::MalformedResponse(format!(
        "expected field `{key}` to be {expected}, got {}",
        kind_of(got)
    ))
}

fn kind_of(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "a list",
        Value::Object(_) => "an object",
    }
}
