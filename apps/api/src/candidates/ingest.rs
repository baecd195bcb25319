use bytes::Bytes;
use serde::Serialize;
use tracing::{error, info, warn};
use uuid::Uuid;

use crate::candidates::repository::upsert_candidate;
use crate::candidates::storage::store_raw_document;
use crate::errors::AppError;
use crate::extract::{extract_text, needs_ocr, DocumentFormat};
use crate::inference::ResumeProvider;
use crate::models::resume::ParsedResume;
use crate::records::build_candidate_record;
use crate::state::AppState;

/// One uploaded file as received.
#[derive(Debug, Clone)]
pub struct RawDocument {
    pub filename: String,
    /// As given by the client; matched case-insensitively, dot optional.
    pub extension: String,
    pub bytes: Bytes,
}

impl RawDocument {
    /// Takes the extension from the filename's last `.` segment.
    pub fn from_upload(filename: impl Into<String>, bytes: Bytes) -> Self {
        let filename = filename.into();
        let extension = filename
            .rsplit_once('.')
            .map(|(_, ext)| format!(".{ext}"))
            .unwrap_or_default();
        Self {
            filename,
            extension,
            bytes,
        }
    }
}

#[derive(Debug, Clone)]
pub struct ParseOutcome {
    pub parsed: ParsedResume,
    pub resume_text: String,
    pub needs_ocr: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum IngestStatus {
    Parsed,
    Failed,
}

#[derive(Debug, Clone, Serialize)]
pub struct IngestItemStatus {
    pub source_filename: String,
    pub resume_id: Option<Uuid>,
    pub status: IngestStatus,
    pub needs_ocr: bool,
    pub error: Option<String>,
}

/// Extract → needs-OCR check → fresh id → provider → validation.
pub async fn parse_document(
    provider: &dyn ResumeProvider,
    doc: &RawDocument,
) -> Result<ParseOutcome, AppError> {
    // Reject unknown formats before paying for a blocking task
    DocumentFormat::from_extension(&doc.extension)?;

    let bytes = doc.bytes.clone();
    let extension = doc.extension.clone();
    let resume_text = tokio::task::spawn_blocking(move || extract_text(&bytes, &extension))
        .await
        .map_err(|e| AppError::Internal(anyhow::anyhow!("extraction task failed: {e}")))??;

    if resume_text.trim().is_empty() {
        return Err(AppError::EmptyDocument);
    }

    let needs_ocr = needs_ocr(&resume_text);
    if needs_ocr {
        warn!(
            "{}: only {} characters extracted, document may need OCR",
            doc.filename,
            resume_text.trim().chars().count()
        );
    }

    let resume_id = Uuid::new_v4();
    let parsed = provider.infer(resume_id, &resume_text).await?;

    info!(
        "Parsed {} -> {} (provider={}, chars={})",
        doc.filename,
        resume_id,
        provider.name(),
        resume_text.chars().count()
    );

    Ok(ParseOutcome {
        parsed,
        resume_text,
        needs_ocr,
    })
}

/// Parse → retain raw bytes → assemble record → upsert.
pub async fn ingest_document(
    state: &AppState,
    doc: &RawDocument,
) -> Result<ParseOutcome, AppError> {
    let outcome = parse_document(state.provider.as_ref(), doc).await?;
    let format = DocumentFormat::from_extension(&doc.extension)?;

    let key = store_raw_document(
        &state.s3,
        &state.config.s3_bucket,
        outcome.parsed.resume_id,
        format,
        doc.bytes.clone(),
    )
    .await?;

    let record = build_candidate_record(
        &outcome.parsed,
        &outcome.resume_text,
        &doc.filename,
        Some(key),
        &state.taxonomy,
    )?;
    upsert_candidate(&state.db, &record).await?;

    Ok(outcome)
}

/// Processes documents one at a time; a failing item never stops the batch.
pub async fn ingest_batch(state: &AppState, docs: &[RawDocument]) -> Vec<IngestItemStatus> {
    let mut statuses = Vec::with_capacity(docs.len());

    for doc in docs {
        let status = match ingest_document(state, doc).await {
            Ok(outcome) => IngestItemStatus {
                source_filename: doc.filename.clone(),
                resume_id: Some(outcome.parsed.resume_id),
                status: IngestStatus::Parsed,
                needs_ocr: outcome.needs_ocr,
                error: None,
            },
            Err(e) => {
                error!("Failed to ingest {}: {e}", doc.filename);
                failed_item(&doc.filename, &e)
            }
        };
        statuses.push(status);
    }

    let parsed = statuses
        .iter()
        .filter(|s| s.status == IngestStatus::Parsed)
        .count();
    info!("Batch complete: {parsed}/{} parsed", statuses.len());
    statuses
}

fn failed_item(filename: &str, err: &AppError) -> IngestItemStatus {
    IngestItemStatus {
        source_filename: filename.to_string(),
        resume_id: None,
        status: IngestStatus::Failed,
        needs_ocr: false,
        error: Some(format!("{}: {err}", err.code())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::inference::HeuristicProvider;

    #[test]
    fn test_extension_from_filename() {
        let doc = RawDocument::from_upload("Jane.Doe.PDF", Bytes::new());
        assert_eq!(doc.extension, ".PDF");
        assert_eq!(RawDocument::from_upload("README", Bytes::new()).extension, "");
    }

    #[test]
    fn test_status_serializes_lowercase() {
        let item = failed_item("a.txt", &AppError::UnsupportedFormat(".txt".into()));
        let value = serde_json::to_value(&item).unwrap();
        assert_eq!(value["status"], "failed");
        assert_eq!(value["resume_id"], serde_json::Value::Null);
        assert_eq!(
            value["error"],
            "UNSUPPORTED_FORMAT: Unsupported file type: .txt"
        );
        assert_eq!(
            serde_json::to_value(IngestStatus::Parsed).unwrap(),
            "parsed"
        );
    }

    #[tokio::test]
    async fn test_unsupported_extension_is_rejected() {
        let doc = RawDocument::from_upload("notes.txt", Bytes::from_static(b"Jane Doe"));
        let err = parse_document(&HeuristicProvider::new(), &doc)
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::UnsupportedFormat(ext) if ext == ".txt"));
    }

    #[tokio::test]
    async fn test_corrupt_docx_is_extraction_error() {
        let doc = RawDocument::from_upload("cv.docx", Bytes::from_static(b"not a zip"));
        let err = parse_document(&HeuristicProvider::new(), &doc)
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Extraction(_)));
    }
}
