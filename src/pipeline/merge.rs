//! Merge the regex-extracted links into the model's answer.
//!
//! The artifact is built from the model's raw JSON text, not by
//! re-serialising the typed [`crate::schema::Resume`], so field order and
//! any schema fields the typed record does not model survive untouched.
//! The `links` value is then replaced in place; if the model omitted the
//! field it is appended. Display and download both use this one object.

use crate::error::ResumeParserError;
use serde_json::{Map, Value};

/// Parse `raw_json` and set its `links` field to `links`.
pub fn apply_links(raw_json: &str, links: &[String]) -> Result<Map<String, Value>, ResumeParserError> {
    let value: Value = serde_json::from_str(raw_json)
        .map_err(|e| ResumeParserError::SchemaViolation { detail: e.to_string() })?;

    let mut object = match value {
        Value::Object(map) => map,
        other => {
            return Err(ResumeParserError::SchemaViolation {
                detail: format!("expected a JSON object, got {}", json_type(&other)),
            })
        }
    };

    let links = Value::Array(links.iter().cloned().map(Value::String).collect());
    // IndexMap-backed (preserve_order): replacing an existing key keeps its position.
    object.insert("links".to_string(), links);
    Ok(object)
}

fn json_type(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}
