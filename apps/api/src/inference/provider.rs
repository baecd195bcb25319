//! Resume Provider: pluggable, trait-based text-understanding backend.
//!
//! Default: `HeuristicProvider` (pure-Rust, deterministic, no network).
//! Alternate: `RemoteProvider` (OpenAI-compatible chat completions).
//!
//! `AppState` holds an `Arc<dyn ResumeProvider>`, chosen once from `Config`.

use std::sync::Arc;

use async_trait::async_trait;
use serde_json::Value;
use tracing::info;
use uuid::Uuid;

use super::heuristic::infer_resume;
use super::prompts::{build_extract_prompt, RESUME_EXTRACT_SYSTEM};
use super::schema::{resume_json_schema, validate_provider_output};
use super::ParseClock;
use crate::config::ProviderConfig;
use crate::errors::AppError;
use crate::llm_client::{LlmClient, LlmError};
use crate::models::resume::ParsedResume;

// ────────────────────────────────────────────────────────────────────────────
// Trait definition
// ────────────────────────────────────────────────────────────────────────────

/// Implement `infer_raw` to add a backend; `infer` runs every backend's
/// output through the same validation boundary.
#[async_trait]
pub trait ResumeProvider: Send + Sync {
    /// Short tag for logs and the preview endpoint.
    fn name(&self) -> &'static str;

    /// Unvalidated output. Need not carry the right `resume_id`.
    async fn infer_raw(&self, resume_id: Uuid, text: &str) -> Result<Value, AppError>;

    fn clock(&self) -> ParseClock {
        ParseClock::system()
    }

    async fn infer(&self, resume_id: Uuid, text: &str) -> Result<ParsedResume, AppError> {
        let raw = self.infer_raw(resume_id, text).await?;
        validate_provider_output(raw, resume_id, &self.clock())
    }
}

// ────────────────────────────────────────────────────────────────────────────
// HeuristicProvider (default)
// ────────────────────────────────────────────────────────────────────────────

/// Wraps the keyword/pattern engine. A fixed clock makes output reproducible.
#[derive(Debug, Clone, Default)]
pub struct HeuristicProvider {
    fixed_clock: Option<ParseClock>,
}

impl HeuristicProvider {
    pub fn new() -> Self {
        Self::default()
    }

    #[cfg(test)]
    pub fn with_clock(clock: ParseClock) -> Self {
        Self {
            fixed_clock: Some(clock),
        }
    }
}

#[async_trait]
impl ResumeProvider for HeuristicProvider {
    fn name(&self) -> &'static str {
        "heuristic"
    }

    fn clock(&self) -> ParseClock {
        self.fixed_clock.unwrap_or_else(ParseClock::system)
    }

    async fn infer_raw(&self, resume_id: Uuid, text: &str) -> Result<Value, AppError> {
        let parsed = infer_resume(resume_id, text, &self.clock());
        serde_json::to_value(parsed).map_err(|e| AppError::Internal(e.into()))
    }
}

// ────────────────────────────────────────────────────────────────────────────
// RemoteProvider (OpenAI-compatible endpoint)
// ────────────────────────────────────────────────────────────────────────────

pub struct RemoteProvider {
    llm: LlmClient,
    schema: String,
}

impl RemoteProvider {
    pub fn new(llm: LlmClient) -> Self {
        Self {
            llm,
            schema: resume_json_schema().to_string(),
        }
    }
}

#[async_trait]
impl ResumeProvider for RemoteProvider {
    fn name(&self) -> &'static str {
        "openai_compatible"
    }

    async fn infer_raw(&self, _resume_id: Uuid, text: &str) -> Result<Value, AppError> {
        let prompt = build_extract_prompt(&self.schema, text);
        self.llm
            .call_json::<Value>(&prompt, RESUME_EXTRACT_SYSTEM)
            .await
            .map_err(|e| match e {
                LlmError::Parse(e) => {
                    AppError::SchemaValidation(format!("provider returned invalid JSON: {e}"))
                }
                other => AppError::Provider(other.to_string()),
            })
    }
}

/// Builds the configured provider.
pub fn build_provider(config: &ProviderConfig) -> anyhow::Result<Arc<dyn ResumeProvider>> {
    let provider: Arc<dyn ResumeProvider> = match config {
        ProviderConfig::Heuristic => Arc::new(HeuristicProvider::new()),
        ProviderConfig::OpenAiCompatible(llm_config) => {
            let llm = LlmClient::new(llm_config)?;
            info!(
                "Remote resume provider: model={} base={}",
                llm.model(),
                llm_config.api_base
            );
            Arc::new(RemoteProvider::new(llm))
        }
    };
    Ok(provider)
}
