use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use sqlx::FromRow;
use uuid::Uuid;

/// Flattened, taxonomy-constrained projection of a `ParsedResume`.
/// List-valued columns hold JSON-encoded arrays.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct CandidateRecord {
    pub resume_id: Uuid,
    pub full_name: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub geo_market: Option<String>,
    pub country: Option<String>,
    pub approach: Option<String>,
    pub years_experience: Option<f64>,
    pub degree_level: Option<String>,
    pub sectors_json: String,
    pub asset_classes_json: String,
    pub roles_json: String,
    pub skills_programming_json: String,
    pub skills_data_json: String,
    pub skills_ml_json: String,
    pub skills_finance_json: String,
    pub skills_tools_json: String,
    pub search_blob: String,
    pub parsed_json: Value,
    pub source_filename: String,
    pub raw_document_key: Option<String>,
}

/// Columns read back for search results and aggregate reporting.
#[derive(Debug, Clone, FromRow)]
pub struct CandidateRow {
    pub resume_id: Uuid,
    pub full_name: Option<String>,
    pub email: Option<String>,
    pub geo_market: Option<String>,
    pub country: Option<String>,
    pub approach: Option<String>,
    pub years_experience: Option<f64>,
    pub degree_level: Option<String>,
    pub sectors_json: String,
    pub roles_json: String,
    pub skills_programming_json: String,
    pub source_filename: String,
    pub updated_at: DateTime<Utc>,
}

/// One search hit as returned by `GET /api/v1/candidates`.
#[derive(Debug, Clone, Serialize)]
pub struct CandidateSummary {
    pub resume_id: Uuid,
    pub name: Option<String>,
    pub email: Option<String>,
    pub geo_market: Option<String>,
    pub country: Option<String>,
    pub approach: Option<String>,
    pub years_experience: Option<f64>,
    pub degree_level: Option<String>,
    pub sectors: Vec<String>,
    pub roles: Vec<String>,
    pub top_programming: Vec<String>,
    pub source_filename: String,
    pub updated_at: DateTime<Utc>,
}

const TOP_PROGRAMMING: usize = 3;

/// Decodes a `*_json` column; malformed content reads as an empty list.
pub fn decode_list(raw: &str) -> Vec<String> {
    serde_json::from_str(raw).unwrap_or_default()
}

impl From<CandidateRow> for CandidateSummary {
    fn from(row: CandidateRow) -> Self {
        let mut top_programming = decode_list(&row.skills_programming_json);
        top_programming.truncate(TOP_PROGRAMMING);

        Self {
            resume_id: row.resume_id,
            name: row.full_name,
            email: row.email,
            geo_market: row.geo_market,
            country: row.country,
            approach: row.approach,
            years_experience: row.years_experience,
            degree_level: row.degree_level,
            sectors: decode_list(&row.sectors_json),
            roles: decode_list(&row.roles_json),
            top_programming,
            source_filename: row.source_filename,
            updated_at: row.updated_at,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row() -> CandidateRow {
        CandidateRow {
            resume_id: Uuid::nil(),
            full_name: Some("Jane Doe".into()),
            email: None,
            geo_market: Some("US".into()),
            country: None,
            approach: Some("Systematic".into()),
            years_experience: Some(4.5),
            degree_level: None,
            sectors_json: r#"["Technology","Energy"]"#.into(),
            roles_json: "[]".into(),
            skills_programming_json: r#"["Python","C++","Java","R"]"#.into(),
            source_filename: "jane.pdf".into(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn test_summary_keeps_top_three_programming_skills() {
        let summary = CandidateSummary::from(row());
        assert_eq!(summary.top_programming, vec!["Python", "C++", "Java"]);
        assert_eq!(summary.sectors, vec!["Technology", "Energy"]);
        assert_eq!(summary.name.as_deref(), Some("Jane Doe"));
    }

    #[test]
    fn test_malformed_json_column_is_empty() {
        let mut r = row();
        r.sectors_json = "not json".into();
        assert!(CandidateSummary::from(r).sectors.is_empty());
    }
}
