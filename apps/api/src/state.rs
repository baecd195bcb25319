use std::sync::Arc;

use aws_sdk_s3::Client as S3Client;
use sqlx::PgPool;

use crate::config::Config;
use crate::inference::ResumeProvider;
use crate::taxonomy::Taxonomy;

/// Shared application state injected into all route handlers via Axum extractors.
#[derive(Clone)]
pub struct AppState {
    pub db: PgPool,
    pub s3: S3Client,
    pub config: Config,
    /// Chosen once at startup from `config.provider`.
    pub provider: Arc<dyn ResumeProvider>,
    pub taxonomy: Arc<Taxonomy>,
}
