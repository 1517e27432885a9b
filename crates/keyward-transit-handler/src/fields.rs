//! Typed extraction of request fields.
//!
//! Request bodies arrive as loosely-typed JSON. Each field is converted once,
//! here, into a typed optional value; the updater never sees raw JSON.

use keyward_transit::TransitError;
use keyward_transit::UpdateKeyConfigRequest;
use serde_json::Map;
use serde_json::Value;

/// Field name of the minimum decryption version.
pub const FIELD_MIN_DECRYPTION_VERSION: &str = "min_decryption_version";

/// Field name of the deletion flag.
pub const FIELD_DELETION_ALLOWED: &str = "deletion_allowed";

const UPDATE_KEY_CONFIG_FIELDS: &[&str] = &[FIELD_MIN_DECRYPTION_VERSION, FIELD_DELETION_ALLOWED];

fn invalid_field(field: &str, reason: impl Into<String>) -> TransitError {
    TransitError::InvalidField {
        field: field.to_string(),
        reason: reason.into(),
    }
}

/// Read an optional integer field.
///
/// Accepts JSON integers and decimal strings; `null` counts as absent.
pub fn optional_int(body: &Map<String, Value>, field: &str) -> Result<Option<i64>, TransitError> {
    match body.get(field) {
        None | Some(Value::Null) => Ok(None),
        Some(Value::Number(n)) => n.as_i64().map(Some).ok_or_else(|| invalid_field(field, format!("{n} is not an integer"))),
        Some(Value::String(s)) => s
            .trim()
            .parse::<i64>()
            .map(Some)
            .map_err(|_| invalid_field(field, format!("'{s}' is not an integer"))),
        Some(other) => Err(invalid_field(field, format!("expected integer, got {}", type_name(other)))),
    }
}

/// Read an optional boolean field.
///
/// Accepts JSON booleans and the strings `"true"` / `"false"`; `null` counts as absent.
pub fn optional_bool(body: &Map<String, Value>, field: &str) -> Result<Option<bool>, TransitError> {
    match body.get(field) {
        None | Some(Value::Null) => Ok(None),
        Some(Value::Bool(b)) => Ok(Some(*b)),
        Some(Value::String(s)) => match s.trim() {
            "true" => Ok(Some(true)),
            "false" => Ok(Some(false)),
            _ => Err(invalid_field(field, format!("'{s}' is not a boolean"))),
        },
        Some(other) => Err(invalid_field(field, format!("expected boolean, got {}", type_name(other)))),
    }
}

fn type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

/// Build an update request from a key name and a JSON body.
///
/// A `null` body is treated as an empty object. Unknown fields are rejected.
pub fn update_key_config_from_json(name: &str, body: &Value) -> Result<UpdateKeyConfigRequest, TransitError> {
    let empty = Map::new();
    let body = match body {
        Value::Null => &empty,
        Value::Object(map) => map,
        other => return Err(invalid_field("body", format!("expected object, got {}", type_name(other)))),
    };

    if let Some(unknown) = body.keys().find(|k| !UPDATE_KEY_CONFIG_FIELDS.contains(&k.as_str())) {
        return Err(invalid_field(unknown, "unknown field"));
    }

    Ok(UpdateKeyConfigRequest {
        name: name.to_string(),
        min_decryption_version: optional_int(body, FIELD_MIN_DECRYPTION_VERSION)?,
        deletion_allowed: optional_bool(body, FIELD_DELETION_ALLOWED)?,
    })
}
