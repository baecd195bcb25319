use axum::{
    extract::{Multipart, Path, Query, State},
    http::header,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::info;
use uuid::Uuid;

use crate::candidates::ingest::{ingest_batch, IngestItemStatus, RawDocument};
use crate::candidates::insights::{compute_insights, InsightsReport};
use crate::candidates::repository::{
    export_all, fetch_all_rows, get_candidate_json, query_candidates, CandidateQuery,
    CandidateQueryParams,
};
use crate::errors::AppError;
use crate::extract::needs_ocr;
use crate::models::candidate::CandidateSummary;
use crate::models::resume::ParsedResume;
use crate::state::AppState;
use crate::taxonomy::Taxonomy;

#[derive(Deserialize)]
pub struct PreviewRequest {
    pub text: String,
}

#[derive(Serialize)]
pub struct PreviewResponse {
    pub provider: &'static str,
    pub needs_ocr: bool,
    pub parsed: ParsedResume,
}

#[derive(Serialize)]
pub struct UploadResponse {
    pub items: Vec<IngestItemStatus>,
}

#[derive(Serialize)]
pub struct SearchResponse {
    pub count: usize,
    pub candidates: Vec<CandidateSummary>,
}

/// GET /api/v1/taxonomy
pub async fn handle_taxonomy(State(state): State<AppState>) -> Json<Taxonomy> {
    Json(state.taxonomy.as_ref().clone())
}

/// POST /api/v1/candidates/preview
/// Runs the configured provider over pasted text. Nothing is persisted.
pub async fn handle_preview(
    State(state): State<AppState>,
    Json(req): Json<PreviewRequest>,
) -> Result<Json<PreviewResponse>, AppError> {
    if req.text.trim().is_empty() {
        return Err(AppError::Validation("text must not be empty".into()));
    }
    let parsed = state.provider.infer(Uuid::new_v4(), &req.text).await?;
    Ok(Json(PreviewResponse {
        provider: state.provider.name(),
        needs_ocr: needs_ocr(&req.text),
        parsed,
    }))
}

/// POST /api/v1/candidates/upload
/// Multipart; every part carrying a filename is ingested.
pub async fn handle_upload(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> Result<Json<UploadResponse>, AppError> {
    let mut docs = Vec::new();
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::Validation(format!("invalid multipart body: {e}")))?
    {
        let Some(filename) = field.file_name().map(str::to_string) else {
            continue;
        };
        let bytes = field
            .bytes()
            .await
            .map_err(|e| AppError::Validation(format!("failed to read {filename}: {e}")))?;
        docs.push(RawDocument::from_upload(filename, bytes));
    }

    if docs.is_empty() {
        return Err(AppError::Validation("no files in upload".into()));
    }

    info!("Upload received: {} file(s)", docs.len());
    let items = ingest_batch(&state, &docs).await;
    Ok(Json(UploadResponse { items }))
}

/// GET /api/v1/candidates
pub async fn handle_search(
    State(state): State<AppState>,
    Query(params): Query<CandidateQueryParams>,
) -> Result<Json<SearchResponse>, AppError> {
    let query = CandidateQuery::try_from(params)?;
    let candidates: Vec<CandidateSummary> = query_candidates(&state.db, &query)
        .await?
        .into_iter()
        .map(CandidateSummary::from)
        .collect();
    Ok(Json(SearchResponse {
        count: candidates.len(),
        candidates,
    }))
}

/// GET /api/v1/candidates/export
/// JSON Lines, one ParsedResume per line.
pub async fn handle_export(State(state): State<AppState>) -> Result<Response, AppError> {
    let parsed = export_all(&state.db).await?;
    let body = to_json_lines(&parsed)?;
    info!("Exported {} candidate(s)", parsed.len());
    Ok(([(header::CONTENT_TYPE, "application/x-ndjson")], body).into_response())
}

fn to_json_lines(values: &[Value]) -> Result<String, AppError> {
    let mut body = String::new();
    for value in values {
        body.push_str(&serde_json::to_string(value).map_err(|e| AppError::Internal(e.into()))?);
        body.push('\n');
    }
    Ok(body)
}

/// GET /api/v1/candidates/:id
pub async fn handle_get_candidate(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<Value>, AppError> {
    Ok(Json(get_candidate_json(&state.db, id).await?))
}

/// GET /api/v1/insights
pub async fn handle_insights(
    State(state): State<AppState>,
) -> Result<Json<InsightsReport>, AppError> {
    let rows = fetch_all_rows(&state.db).await?;
    Ok(Json(compute_insights(&rows)))
}
