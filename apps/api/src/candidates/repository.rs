use serde::Deserialize;
use serde_json::Value;
use sqlx::{PgPool, Postgres, QueryBuilder};
use tracing::{debug, info};
use uuid::Uuid;

use crate::errors::AppError;
use crate::models::candidate::{CandidateRecord, CandidateRow};

pub const DEFAULT_LIMIT: i64 = 500;

const ROW_COLUMNS: &str = "resume_id, full_name, email, geo_market, country, approach, \
     years_experience, degree_level, sectors_json, roles_json, skills_programming_json, \
     source_filename, updated_at";

/// Insert or fully replace the row for `record.resume_id`.
pub async fn upsert_candidate(pool: &PgPool, record: &CandidateRecord) -> Result<(), AppError> {
    sqlx::query(
        r#"
        INSERT INTO candidates
            (resume_id, full_name, email, phone, geo_market, country, approach,
             years_experience, degree_level, sectors_json, asset_classes_json, roles_json,
             skills_programming_json, skills_data_json, skills_ml_json, skills_finance_json,
             skills_tools_json, search_blob, parsed_json, source_filename, raw_document_key)
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15, $16,
                $17, $18, $19, $20, $21)
        ON CONFLICT (resume_id) DO UPDATE SET
            full_name = EXCLUDED.full_name,
            email = EXCLUDED.email,
            phone = EXCLUDED.phone,
            geo_market = EXCLUDED.geo_market,
            country = EXCLUDED.country,
            approach = EXCLUDED.approach,
            years_experience = EXCLUDED.years_experience,
            degree_level = EXCLUDED.degree_level,
            sectors_json = EXCLUDED.sectors_json,
            asset_classes_json = EXCLUDED.asset_classes_json,
            roles_json = EXCLUDED.roles_json,
            skills_programming_json = EXCLUDED.skills_programming_json,
            skills_data_json = EXCLUDED.skills_data_json,
            skills_ml_json = EXCLUDED.skills_ml_json,
            skills_finance_json = EXCLUDED.skills_finance_json,
            skills_tools_json = EXCLUDED.skills_tools_json,
            search_blob = EXCLUDED.search_blob,
            parsed_json = EXCLUDED.parsed_json,
            source_filename = EXCLUDED.source_filename,
            raw_document_key = EXCLUDED.raw_document_key,
            updated_at = NOW()
        "#,
    )
    .bind(record.resume_id)
    .bind(&record.full_name)
    .bind(&record.email)
    .bind(&record.phone)
    .bind(&record.geo_market)
    .bind(&record.country)
    .bind(&record.approach)
    .bind(record.years_experience)
    .bind(&record.degree_level)
    .bind(&record.sectors_json)
    .bind(&record.asset_classes_json)
    .bind(&record.roles_json)
    .bind(&record.skills_programming_json)
    .bind(&record.skills_data_json)
    .bind(&record.skills_ml_json)
    .bind(&record.skills_finance_json)
    .bind(&record.skills_tools_json)
    .bind(&record.search_blob)
    .bind(&record.parsed_json)
    .bind(&record.source_filename)
    .bind(&record.raw_document_key)
    .execute(pool)
    .await?;

    info!("Upserted candidate {}", record.resume_id);
    Ok(())
}

// ────────────────────────────────────────────────────────────────────────────
// Search
// ────────────────────────────────────────────────────────────────────────────

/// Faceted search filters. Empty lists and `None` bounds mean "no filter".
#[derive(Debug, Clone, PartialEq)]
pub struct CandidateQuery {
    pub geo_markets: Vec<String>,
    pub countries: Vec<String>,
    pub approaches: Vec<String>,
    pub degree_levels: Vec<String>,
    pub sectors_any: Vec<String>,
    pub roles_any: Vec<String>,
    pub min_exp: Option<f64>,
    pub max_exp: Option<f64>,
    /// Keep rows with NULL experience when a range is set.
    pub include_unknown_exp: bool,
    pub keyword: Option<String>,
    pub limit: i64,
}

impl Default for CandidateQuery {
    fn default() -> Self {
        Self {
            geo_markets: Vec::new(),
            countries: Vec::new(),
            approaches: Vec::new(),
            degree_levels: Vec::new(),
            sectors_any: Vec::new(),
            roles_any: Vec::new(),
            min_exp: None,
            max_exp: None,
            include_unknown_exp: true,
            keyword: None,
            limit: DEFAULT_LIMIT,
        }
    }
}

/// Query-string form of `CandidateQuery`; list filters are comma-separated.
#[derive(Debug, Default, Deserialize)]
pub struct CandidateQueryParams {
    pub geo_markets: Option<String>,
    pub countries: Option<String>,
    pub approaches: Option<String>,
    pub degree_levels: Option<String>,
    pub sectors_any: Option<String>,
    pub roles_any: Option<String>,
    pub min_exp: Option<f64>,
    pub max_exp: Option<f64>,
    pub include_unknown_exp: Option<bool>,
    pub keyword: Option<String>,
    pub limit: Option<i64>,
}

fn split_csv(raw: Option<String>) -> Vec<String> {
    raw.map(|s| {
        s.split(',')
            .map(str::trim)
            .filter(|v| !v.is_empty())
            .map(str::to_string)
            .collect()
    })
    .unwrap_or_default()
}

impl TryFrom<CandidateQueryParams> for CandidateQuery {
    type Error = AppError;

    fn try_from(params: CandidateQueryParams) -> Result<Self, Self::Error> {
        let limit = params.limit.unwrap_or(DEFAULT_LIMIT);
        if limit <= 0 {
            return Err(AppError::Validation("limit must be positive".into()));
        }
        for bound in [params.min_exp, params.max_exp].into_iter().flatten() {
            if !bound.is_finite() {
                return Err(AppError::Validation(
                    "experience bounds must be finite numbers".into(),
                ));
            }
        }
        if let (Some(min), Some(max)) = (params.min_exp, params.max_exp) {
            if min > max {
                return Err(AppError::Validation(format!(
                    "min_exp ({min}) is greater than max_exp ({max})"
                )));
            }
        }

        Ok(Self {
            geo_markets: split_csv(params.geo_markets),
            countries: split_csv(params.countries),
            approaches: split_csv(params.approaches),
            degree_levels: split_csv(params.degree_levels),
            sectors_any: split_csv(params.sectors_any),
            roles_any: split_csv(params.roles_any),
            min_exp: params.min_exp,
            max_exp: params.max_exp,
            include_unknown_exp: params.include_unknown_exp.unwrap_or(true),
            keyword: params.keyword,
            limit,
        })
    }
}

/// Escapes LIKE metacharacters so values match literally.
fn like_escape(value: &str) -> String {
    value
        .replace('\\', "\\\\")
        .replace('%', "\\%")
        .replace('_', "\\_")
}

fn push_member_of<'a>(qb: &mut QueryBuilder<'a, Postgres>, column: &str, values: &[String]) {
    if values.is_empty() {
        return;
    }
    qb.push(" AND ")
        .push(column)
        .push(" = ANY(")
        .push_bind(values.to_vec())
        .push(")");
}

/// Any-of match against a JSON-array text column: `"value"` must appear quoted.
fn push_json_any<'a>(qb: &mut QueryBuilder<'a, Postgres>, column: &str, values: &[String]) {
    if values.is_empty() {
        return;
    }
    qb.push(" AND (");
    for (i, value) in values.iter().enumerate() {
        if i > 0 {
            qb.push(" OR ");
        }
        qb.push(column)
            .push(" LIKE ")
            .push_bind(format!("%\"{}\"%", like_escape(value)));
    }
    qb.push(")");
}

fn push_experience<'a>(qb: &mut QueryBuilder<'a, Postgres>, query: &CandidateQuery) {
    if query.min_exp.is_none() && query.max_exp.is_none() {
        return;
    }
    qb.push(" AND (");
    if query.include_unknown_exp {
        qb.push("years_experience IS NULL OR ");
    }
    qb.push("(years_experience IS NOT NULL");
    if let Some(min) = query.min_exp {
        qb.push(" AND years_experience >= ").push_bind(min);
    }
    if let Some(max) = query.max_exp {
        qb.push(" AND years_experience <= ").push_bind(max);
    }
    qb.push("))");
}

/// Builds the parameterized search statement.
pub fn build_search_query(query: &CandidateQuery) -> QueryBuilder<'static, Postgres> {
    let mut qb = QueryBuilder::new(format!("SELECT {ROW_COLUMNS} FROM candidates WHERE TRUE"));

    push_member_of(&mut qb, "geo_market", &query.geo_markets);
    push_member_of(&mut qb, "country", &query.countries);
    push_member_of(&mut qb, "approach", &query.approaches);
    push_member_of(&mut qb, "degree_level", &query.degree_levels);
    push_json_any(&mut qb, "sectors_json", &query.sectors_any);
    push_json_any(&mut qb, "roles_json", &query.roles_any);
    push_experience(&mut qb, query);

    let keyword = query
        .keyword
        .as_deref()
        .map(|k| k.trim().to_lowercase())
        .filter(|k| !k.is_empty());
    if let Some(keyword) = keyword {
        qb.push(" AND search_blob LIKE ")
            .push_bind(format!("%{}%", like_escape(&keyword)));
    }

    qb.push(" ORDER BY years_experience DESC NULLS LAST, resume_id LIMIT ")
        .push_bind(query.limit);
    qb
}

pub async fn query_candidates(
    pool: &PgPool,
    query: &CandidateQuery,
) -> Result<Vec<CandidateRow>, AppError> {
    let mut qb = build_search_query(query);
    debug!("Candidate search: {}", qb.sql());
    Ok(qb.build_query_as::<CandidateRow>().fetch_all(pool).await?)
}

/// Every stored row, for aggregate reporting.
pub async fn fetch_all_rows(pool: &PgPool) -> Result<Vec<CandidateRow>, AppError> {
    Ok(sqlx::query_as::<_, CandidateRow>(&format!(
        "SELECT {ROW_COLUMNS} FROM candidates ORDER BY resume_id"
    ))
    .fetch_all(pool)
    .await?)
}

// ────────────────────────────────────────────────────────────────────────────
// Canonical JSON
// ────────────────────────────────────────────────────────────────────────────

pub async fn get_candidate_json(pool: &PgPool, resume_id: Uuid) -> Result<Value, AppError> {
    let parsed: Option<Value> =
        sqlx::query_scalar("SELECT parsed_json FROM candidates WHERE resume_id = $1")
            .bind(resume_id)
            .fetch_optional(pool)
            .await?;

    parsed.ok_or_else(|| AppError::NotFound(format!("Candidate {resume_id} not found")))
}

/// Every stored ParsedResume, oldest first.
pub async fn export_all(pool: &PgPool) -> Result<Vec<Value>, AppError> {
    Ok(sqlx::query_scalar(
        "SELECT parsed_json FROM candidates ORDER BY created_at ASC, resume_id ASC",
    )
    .fetch_all(pool)
    .await?)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_query_has_no_filters() {
        let qb = build_search_query(&CandidateQuery::default());
        let sql = qb.sql();
        assert!(sql.starts_with("SELECT resume_id, full_name"));
        assert!(sql.contains("FROM candidates WHERE TRUE ORDER BY"));
        assert!(sql.ends_with("ORDER BY years_experience DESC NULLS LAST, resume_id LIMIT $1"));
    }

    #[test]
    fn test_set_membership_and_any_of_filters() {
        let query = CandidateQuery {
            geo_markets: vec!["US".into(), "APAC".into()],
            sectors_any: vec!["Technology".into(), "Energy".into()],
            ..CandidateQuery::default()
        };
        let qb = build_search_query(&query);
        let sql = qb.sql();
        assert!(sql.contains(" AND geo_market = ANY($1)"));
        assert!(sql.contains(" AND (sectors_json LIKE $2 OR sectors_json LIKE $3)"));
        assert!(!sql.contains("country = ANY"));
    }

    #[test]
    fn test_experience_range_keeps_unknown_by_default() {
        let query = CandidateQuery {
            min_exp: Some(2.0),
            max_exp: Some(5.0),
            ..CandidateQuery::default()
        };
        let qb = build_search_query(&query);
        assert!(qb.sql().contains(
            " AND (years_experience IS NULL OR (years_experience IS NOT NULL \
             AND years_experience >= $1 AND years_experience <= $2))"
        ));
    }

    #[test]
    fn test_experience_range_excludes_unknown_when_asked() {
        let query = CandidateQuery {
            min_exp: Some(3.0),
            include_unknown_exp: false,
            ..CandidateQuery::default()
        };
        let qb = build_search_query(&query);
        let sql = qb.sql();
        assert!(sql.contains(" AND ((years_experience IS NOT NULL AND years_experience >= $1))"));
        assert!(!sql.contains("IS NULL OR"));
    }

    #[test]
    fn test_blank_keyword_is_ignored() {
        let query = CandidateQuery {
            keyword: Some("   ".into()),
            ..CandidateQuery::default()
        };
        assert!(!build_search_query(&query).sql().contains("search_blob"));

        let query = CandidateQuery {
            keyword: Some("  Python ".into()),
            ..CandidateQuery::default()
        };
        assert!(build_search_query(&query)
            .sql()
            .contains(" AND search_blob LIKE $1"));
    }

    #[test]
    fn test_like_escape() {
        assert_eq!(like_escape("50%_a\\b"), "50\\%\\_a\\\\b");
        assert_eq!(like_escape("Technology"), "Technology");
    }

    #[test]
    fn test_params_split_comma_lists() {
        let params = CandidateQueryParams {
            geo_markets: Some("US, Europe,,".into()),
            roles_any: Some("Junior Analyst".into()),
            ..CandidateQueryParams::default()
        };
        let query = CandidateQuery::try_from(params).unwrap();
        assert_eq!(query.geo_markets, vec!["US", "Europe"]);
        assert_eq!(query.roles_any, vec!["Junior Analyst"]);
        assert!(query.countries.is_empty());
        assert!(query.include_unknown_exp);
        assert_eq!(query.limit, DEFAULT_LIMIT);
    }

    #[test]
    fn test_params_reject_inverted_range_and_bad_limit() {
        let params = CandidateQueryParams {
            min_exp: Some(10.0),
            max_exp: Some(2.0),
            ..CandidateQueryParams::default()
        };
        assert!(matches!(
            CandidateQuery::try_from(params),
            Err(AppError::Validation(_))
        ));

        let params = CandidateQueryParams {
            limit: Some(0),
            ..CandidateQueryParams::default()
        };
        assert!(matches!(
            CandidateQuery::try_from(params),
            Err(AppError::Validation(_))
        ));
    }
}
