use aws_sdk_s3::primitives::ByteStream;
use bytes::Bytes;
use tracing::info;
use uuid::Uuid;

use crate::errors::AppError;
use crate::extract::DocumentFormat;

/// `resumes/{resume_id}{ext}`, extension lowercased with its dot.
pub fn raw_document_key(resume_id: Uuid, format: DocumentFormat) -> String {
    format!("resumes/{}{}", resume_id, format.extension())
}

fn content_type(format: DocumentFormat) -> &'static str {
    match format {
        DocumentFormat::Pdf => "application/pdf",
        DocumentFormat::Docx => {
            "application/vnd.openxmlformats-officedocument.wordprocessingml.document"
        }
    }
}

/// Retains the original upload bytes for audit. Returns the object key.
pub async fn store_raw_document(
    s3: &aws_sdk_s3::Client,
    bucket: &str,
    resume_id: Uuid,
    format: DocumentFormat,
    bytes: Bytes,
) -> Result<String, AppError> {
    let key = raw_document_key(resume_id, format);
    s3.put_object()
        .bucket(bucket)
        .key(&key)
        .body(ByteStream::from(bytes))
        .content_type(content_type(format))
        .send()
        .await
        .map_err(|e| AppError::Storage(format!("S3 upload failed for {key}: {e}")))?;

    info!("Stored raw document at s3://{}/{}", bucket, key);
    Ok(key)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_raw_document_key() {
        let id = Uuid::nil();
        assert_eq!(
            raw_document_key(id, DocumentFormat::Pdf),
            "resumes/00000000-0000-0000-0000-000000000000.pdf"
        );
        assert!(raw_document_key(id, DocumentFormat::Docx).ends_with(".docx"));
    }
}
