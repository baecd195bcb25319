//! JSON schema sent to the remote provider, and the trust boundary that
//! turns whatever comes back into a typed `ParsedResume`.

use serde_json::{json, Value};
use uuid::Uuid;

use super::ParseClock;
use crate::errors::AppError;
use crate::models::resume::ParsedResume;
use crate::normalize::clamp_years_exp;

fn string_list() -> Value {
    json!({ "type": "array", "items": { "type": "string" } })
}

fn nullable_string() -> Value {
    json!({ "type": ["string", "null"] })
}

fn object_list() -> Value {
    json!({ "type": "array", "items": { "type": "object" } })
}

/// JSON Schema for `ParsedResume`, embedded in the remote provider prompt.
pub fn resume_json_schema() -> Value {
    json!({
        "title": "ParsedResume",
        "type": "object",
        "required": ["resume_id"],
        "properties": {
            "resume_id": { "type": "string" },
            "candidate": {
                "type": "object",
                "properties": {
                    "full_name": nullable_string(),
                    "emails": string_list(),
                    "phones": string_list(),
                    "location_current": {
                        "type": "object",
                        "properties": {
                            "city": nullable_string(),
                            "region": nullable_string(),
                            "country": nullable_string()
                        }
                    },
                    "citizenship": string_list(),
                    "work_authorization": {
                        "type": "object",
                        "properties": {
                            "us": nullable_string(),
                            "uk": nullable_string(),
                            "eu": nullable_string(),
                            "other": nullable_string()
                        }
                    },
                    "linkedin": nullable_string(),
                    "github": nullable_string(),
                    "languages_spoken": string_list()
                }
            },
            "target_fit": {
                "type": "object",
                "properties": {
                    "geographic_markets": string_list(),
                    "investment_approaches": string_list(),
                    "asset_classes": string_list(),
                    "sectors": string_list(),
                    "roles": string_list()
                }
            },
            "summary": {
                "type": "object",
                "properties": {
                    "years_experience": { "type": ["number", "null"] },
                    "current_title": nullable_string(),
                    "current_employer": nullable_string(),
                    "education_level": nullable_string(),
                    "highlights": string_list()
                }
            },
            "education": object_list(),
            "experience": object_list(),
            "skills": {
                "type": "object",
                "properties": {
                    "programming": string_list(),
                    "data": string_list(),
                    "ml": string_list(),
                    "finance": string_list(),
                    "tools": string_list(),
                    "other": string_list()
                }
            },
            "certifications": object_list(),
            "metadata": { "type": "object" },
            "evidence": { "type": "object" }
        }
    })
}

/// Validates raw provider output once, at the boundary.
///
/// The caller's `resume_id` always replaces whatever the provider returned,
/// and `summary.years_experience` is coerced into 0–60 (or null) before
/// typing, so `"7"` or `75` are repaired rather than rejected.
/// After typing, list invariants are enforced and `metadata.parsed_at` is
/// stamped if the provider left it empty.
pub fn validate_provider_output(
    raw: Value,
    resume_id: Uuid,
    clock: &ParseClock,
) -> Result<ParsedResume, AppError> {
    let Value::Object(mut object) = raw else {
        return Err(AppError::SchemaValidation(format!(
            "expected a JSON object, got {}",
            json_kind(&raw)
        )));
    };
    object.insert("resume_id".to_string(), json!(resume_id));
    if let Some(Value::Object(summary)) = object.get_mut("summary") {
        if let Some(years) = summary.get_mut("years_experience") {
            *years = json!(clamp_years_exp(years));
        }
    }

    let mut parsed: ParsedResume = serde_json::from_value(Value::Object(object))
        .map_err(|e| AppError::SchemaValidation(e.to_string()))?;

    parsed.enforce_list_invariants();
    if parsed
        .metadata
        .parsed_at
        .as_deref()
        .map_or(true, |s| s.trim().is_empty())
    {
        parsed.metadata.parsed_at = Some(clock.timestamp());
    }
    Ok(parsed)
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}
