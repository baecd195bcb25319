//! Canonical `ParsedResume` record: the wire contract shared with the remote
//! provider and the JSON stored in `candidates.parsed_json`.
//!
//! Every section defaults when missing, and JSON `null` in a list position
//! is read as an empty list. The loosely specified sections (education,
//! experience, certifications, metadata, evidence) coerce scalar mismatches
//! instead of rejecting them, and keep unknown keys.

use std::collections::BTreeMap;

use serde::de::{DeserializeOwned, Error as _};
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};
use uuid::Uuid;

use crate::normalize::dedup_preserve_order;

fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

fn scalar_text(value: Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

/// Arrays keep their scalar items; a bare non-blank scalar is a one-item list.
fn coerce_list(value: Value) -> Vec<String> {
    match value {
        Value::Array(items) => items.into_iter().filter_map(scalar_text).collect(),
        other => scalar_text(other)
            .filter(|s| !s.trim().is_empty())
            .into_iter()
            .collect(),
    }
}

fn lenient_string<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(scalar_text(Value::deserialize(deserializer)?))
}

fn lenient_list<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(coerce_list(Value::deserialize(deserializer)?))
}

/// Numbers and numeric strings; anything else (`"high"`, `null`) is absent.
fn lenient_f64<'de, D>(deserializer: D) -> Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Value::deserialize(deserializer)? {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    })
}

/// A non-object where an object is expected reads as the default.
fn lenient_section<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + DeserializeOwned,
{
    match Value::deserialize(deserializer)? {
        value @ Value::Object(_) => serde_json::from_value(value).map_err(D::Error::custom),
        _ => Ok(T::default()),
    }
}

fn snippet_map<'de, D>(deserializer: D) -> Result<BTreeMap<String, Vec<String>>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Value::deserialize(deserializer)? {
        Value::Object(map) => map.into_iter().map(|(k, v)| (k, coerce_list(v))).collect(),
        _ => BTreeMap::new(),
    })
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Location {
    #[serde(default)]
    pub city: Option<String>,
    #[serde(default)]
    pub region: Option<String>,
    #[serde(default)]
    pub country: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct WorkAuthorization {
    #[serde(default)]
    pub us: Option<String>,
    #[serde(default)]
    pub uk: Option<String>,
    #[serde(default)]
    pub eu: Option<String>,
    #[serde(default)]
    pub other: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Candidate {
    #[serde(default)]
    pub full_name: Option<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub emails: Vec<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub phones: Vec<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub location_current: Location,
    #[serde(default, deserialize_with = "null_as_default")]
    pub citizenship: Vec<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub work_authorization: WorkAuthorization,
    #[serde(default)]
    pub linkedin: Option<String>,
    #[serde(default)]
    pub github: Option<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub languages_spoken: Vec<String>,
}

/// Where and how the candidate fits: markets, approaches, coverage.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TargetFit {
    /// Subset of US / Europe / APAC.
    #[serde(default, deserialize_with = "null_as_default")]
    pub geographic_markets: Vec<String>,
    /// Subset of Fundamental / Systematic.
    #[serde(default, deserialize_with = "null_as_default")]
    pub investment_approaches: Vec<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub asset_classes: Vec<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub sectors: Vec<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub roles: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Summary {
    /// 0.0 – 60.0 when known.
    #[serde(default)]
    pub years_experience: Option<f64>,
    #[serde(default)]
    pub current_title: Option<String>,
    #[serde(default)]
    pub current_employer: Option<String>,
    #[serde(default)]
    pub education_level: Option<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub highlights: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Skills {
    #[serde(default, deserialize_with = "null_as_default")]
    pub programming: Vec<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub data: Vec<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub ml: Vec<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub finance: Vec<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub tools: Vec<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub other: Vec<String>,
}

impl Skills {
    /// The category lists in their fixed order, `other` last.
    pub fn categories(&self) -> [&[String]; 6] {
        [
            &self.programming,
            &self.data,
            &self.ml,
            &self.finance,
            &self.tools,
            &self.other,
        ]
    }

    fn categories_mut(&mut self) -> [&mut Vec<String>; 6] {
        [
            &mut self.programming,
            &mut self.data,
            &mut self.ml,
            &mut self.finance,
            &mut self.tools,
            &mut self.other,
        ]
    }
}

/// Loosely structured: unknown keys are kept in `extra` and round-trip as-is.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EducationEntry {
    #[serde(
        default,
        deserialize_with = "lenient_string",
        skip_serializing_if = "Option::is_none"
    )]
    pub institution: Option<String>,
    #[serde(
        default,
        deserialize_with = "lenient_string",
        skip_serializing_if = "Option::is_none"
    )]
    pub degree: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ExperienceEntry {
    #[serde(
        default,
        deserialize_with = "lenient_string",
        skip_serializing_if = "Option::is_none"
    )]
    pub employer: Option<String>,
    #[serde(
        default,
        deserialize_with = "lenient_string",
        skip_serializing_if = "Option::is_none"
    )]
    pub title: Option<String>,
    #[serde(default, deserialize_with = "lenient_list")]
    pub bullets: Vec<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CertificationEntry {
    #[serde(
        default,
        deserialize_with = "lenient_string",
        skip_serializing_if = "Option::is_none"
    )]
    pub name: Option<String>,
    #[serde(
        default,
        deserialize_with = "lenient_string",
        skip_serializing_if = "Option::is_none"
    )]
    pub issuer: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Quality {
    #[serde(default, deserialize_with = "lenient_f64")]
    pub confidence: Option<f64>,
    #[serde(default, deserialize_with = "lenient_list")]
    pub notes: Vec<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Metadata {
    /// RFC 3339 UTC timestamp.
    #[serde(default, deserialize_with = "lenient_string")]
    pub parsed_at: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub parser_version: Option<String>,
    #[serde(default, deserialize_with = "lenient_section")]
    pub quality: Quality,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Field path (`"candidate.emails"`) → literal snippets from the source text.
/// Other evidence keys a provider returns are kept in `extra`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Evidence {
    #[serde(default, deserialize_with = "snippet_map")]
    pub field_to_snippets: BTreeMap<String, Vec<String>>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParsedResume {
    pub resume_id: Uuid,
    #[serde(default, deserialize_with = "null_as_default")]
    pub candidate: Candidate,
    #[serde(default, deserialize_with = "null_as_default")]
    pub target_fit: TargetFit,
    #[serde(default, deserialize_with = "null_as_default")]
    pub summary: Summary,
    #[serde(default, deserialize_with = "null_as_default")]
    pub education: Vec<EducationEntry>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub experience: Vec<ExperienceEntry>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub skills: Skills,
    #[serde(default, deserialize_with = "null_as_default")]
    pub certifications: Vec<CertificationEntry>,
    #[serde(default, deserialize_with = "lenient_section")]
    pub metadata: Metadata,
    #[serde(default, deserialize_with = "lenient_section")]
    pub evidence: Evidence,
}

impl ParsedResume {
    /// An empty record carrying only its id.
    pub fn empty(resume_id: Uuid) -> Self {
        Self {
            resume_id,
            candidate: Candidate::default(),
            target_fit: TargetFit::default(),
            summary: Summary::default(),
            education: Vec::new(),
            experience: Vec::new(),
            skills: Skills::default(),
            certifications: Vec::new(),
            metadata: Metadata::default(),
            evidence: Evidence::default(),
        }
    }

    /// De-duplicates every string list in place, keeping first-seen order.
    pub fn enforce_list_invariants(&mut self) {
        let c = &mut self.candidate;
        let t = &mut self.target_fit;
        let mut lists: Vec<&mut Vec<String>> = vec![
            &mut c.emails,
            &mut c.phones,
            &mut c.citizenship,
            &mut c.languages_spoken,
            &mut t.geographic_markets,
            &mut t.investment_approaches,
            &mut t.asset_classes,
            &mut t.sectors,
            &mut t.roles,
            &mut self.summary.highlights,
            &mut self.metadata.quality.notes,
        ];
        lists.extend(self.skills.categories_mut());
        lists.extend(self.experience.iter_mut().map(|e| &mut e.bullets));
        lists.extend(self.evidence.field_to_snippets.values_mut());

        for list in lists {
            *list = dedup_preserve_order(std::mem::take(list));
        }
    }
}
