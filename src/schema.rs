//! The structured record the model is asked to fill, and its JSON Schema.
//!
//! [`Resume`] is the typed view of an answer to the built-in schema. It is
//! filled best-effort after the `links` overwrite; answers to a custom
//! schema are kept as JSON only. [`ResumeSchema`] is
//! what is sent to the remote service; the built-in schema describes exactly
//! the [`Resume`] fields in strict structured-output form (every property
//! required, optional values typed as `[T, "null"]`, no extra properties).

use crate::error::ResumeParserError;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{json, Value};
use std::path::Path;

/// A parsed resume.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Resume {
    pub full_name: String,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub phone: Option<String>,
    /// Overwritten by the pipeline with the links found in the raw text.
    #[serde(default, deserialize_with = "null_as_default")]
    pub links: Vec<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub experience: Vec<Experience>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub education: Vec<Education>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub skills: Vec<String>,
}

/// One position in the work history.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Experience {
    #[serde(default)]
    pub company: Option<String>,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub start_date: Option<String>,
    #[serde(default)]
    pub end_date: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
}

/// One education entry.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Education {
    #[serde(default)]
    pub institution: Option<String>,
    #[serde(default)]
    pub degree: Option<String>,
    #[serde(default)]
    pub field_of_study: Option<String>,
    #[serde(default)]
    pub start_date: Option<String>,
    #[serde(default)]
    pub end_date: Option<String>,
}

/// Deserialize `null` as `T::default()`.
///
/// Non-strict endpoints answer `null` for empty lists.
pub(crate) fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

/// Properties every schema must declare for the pipeline to work.
const REQUIRED_PROPERTIES: &[&str] = &["full_name", "links"];

/// A named JSON Schema for the structured completion.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResumeSchema {
    /// Schema name reported to the API (`[a-zA-Z0-9_-]`, max 64 chars).
    pub name: String,
    pub schema: Value,
}

impl Default for ResumeSchema {
    fn default() -> Self {
        Self::builtin()
    }
}

impl ResumeSchema {
    /// The schema describing [`Resume`].
    pub fn builtin() -> Self {
        let nullable_string = json!({ "type": ["string", "null"] });
        let experience = json!({
            "type": "object",
            "properties": {
                "company": nullable_string,
                "title": nullable_string,
                "start_date": nullable_string,
                "end_date": nullable_string,
                "description": nullable_string,
            },
            "required": ["company", "title", "start_date", "end_date", "description"],
            "additionalProperties": false,
        });
        let education = json!({
            "type": "object",
            "properties": {
                "institution": nullable_string,
                "degree": nullable_string,
                "field_of_study": nullable_string,
                "start_date": nullable_string,
                "end_date": nullable_string,
            },
            "required": ["institution", "degree", "field_of_study", "start_date", "end_date"],
            "additionalProperties": false,
        });

        Self {
            name: "resume".to_string(),
            schema: json!({
                "type": "object",
                "properties": {
                    "full_name": { "type": "string" },
                    "email": nullable_string,
                    "phone": nullable_string,
                    "links": { "type": "array", "items": { "type": "string" } },
                    "experience": { "type": "array", "items": experience },
                    "education": { "type": "array", "items": education },
                    "skills": { "type": "array", "items": { "type": "string" } },
                },
                "required": ["full_name", "email", "phone", "links", "experience", "education", "skills"],
                "additionalProperties": false,
            }),
        }
    }

    /// Wrap a caller-supplied schema, checking it declares the fields the
    /// pipeline depends on.
    pub fn from_value(name: impl Into<String>, schema: Value) -> Result<Self, ResumeParserError> {
        let name = name.into();
        if name.is_empty()
            || name.len() > 64
            || !name
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-')
        {
            return Err(ResumeParserError::InvalidSchema(format!(
                "schema name '{name}' must be 1–64 characters of [a-zA-Z0-9_-]"
            )));
        }

        let properties = schema
            .get("properties")
            .and_then(Value::as_object)
            .ok_or_else(|| {
                ResumeParserError::InvalidSchema("top level must be an object schema with 'properties'".into())
            })?;

        for required in REQUIRED_PROPERTIES {
            if !properties.contains_key(*required) {
                return Err(ResumeParserError::InvalidSchema(format!(
                    "missing required property '{required}'"
                )));
            }
        }

        Ok(Self { name, schema })
    }

    /// Load a schema from a JSON file; the file stem becomes the schema name.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ResumeParserError> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|e| {
            ResumeParserError::InvalidSchema(format!("cannot read '{}': {e}", path.display()))
        })?;
        let value: Value = serde_json::from_str(&content).map_err(|e| {
            ResumeParserError::InvalidSchema(format!("'{}' is not valid JSON: {e}", path.display()))
        })?;
        let name = path
            .file_stem()
            .and_then(|s| s.to_str())
            .map(|s| {
                s.chars()
                    .map(|c| if c.is_ascii_alphanumeric() || c == '-' { c } else { '_' })
                    .take(64)
                    .collect::<String>()
            })
            .filter(|s| !s.is_empty())
            .unwrap_or_else(|| "resume".to_string());
        Self::from_value(name, value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builtin_schema_is_strict() {
        let schema = ResumeSchema::builtin();
        let props = schema.schema["properties"].as_object().unwrap();
        let required: Vec<&str> = schema.schema["required"]
            .as_array()
            .unwrap()
            .iter()
            .map(|v| v.as_str().unwrap())
            .collect();
        assert_eq!(props.len(), required.len());
        for key in props.keys() {
            assert!(required.contains(&key.as_str()), "{key} not required");
        }
        assert_eq!(schema.schema["additionalProperties"], json!(false));
    }

    #[test]
    fn builtin_schema_passes_own_validation() {
        let builtin = ResumeSchema::builtin();
        let again = ResumeSchema::from_value(builtin.name.clone(), builtin.schema.clone()).unwrap();
        assert_eq!(again, builtin);
    }

    #[test]
    fn missing_links_property_rejected() {
        let err = ResumeSchema::from_value(
            "cv",
            json!({ "type": "object", "properties": { "full_name": { "type": "string" } } }),
        )
        .unwrap_err();
        assert!(err.to_string().contains("links"));
    }

    #[test]
    fn bad_name_rejected() {
        let schema = ResumeSchema::builtin().schema;
        assert!(ResumeSchema::from_value("has space", schema.clone()).is_err());
        assert!(ResumeSchema::from_value("", schema).is_err());
    }

    #[test]
    fn from_file_uses_sanitised_stem() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("my schema.json");
        std::fs::write(&path, ResumeSchema::builtin().schema.to_string()).unwrap();
        let schema = ResumeSchema::from_file(&path).unwrap();
        assert_eq!(schema.name, "my_schema");
    }

    #[test]
    fn resume_tolerates_missing_optional_fields() {
        let resume: Resume =
            serde_json::from_str(r#"{"full_name": "Jane Doe", "email": "jane@x.com", "links": []}"#)
                .unwrap();
        assert_eq!(resume.full_name, "Jane Doe");
        assert_eq!(resume.email.as_deref(), Some("jane@x.com"));
        assert!(resume.phone.is_none());
        assert!(resume.experience.is_empty());
    }

    #[test]
    fn resume_reads_null_lists_as_empty() {
        let resume: Resume = serde_json::from_str(
            r#"{"full_name": "Jane Doe", "links": null, "skills": null, "experience": null}"#,
        )
        .unwrap();
        assert!(resume.links.is_empty());
        assert!(resume.skills.is_empty());
        assert!(resume.experience.is_empty());
    }

    #[test]
    fn resume_requires_full_name() {
        assert!(serde_json::from_str::<Resume>(r#"{"email": null}"#).is_err());
    }
}
