use anyhow::{bail, Context, Result};

use crate::llm_client::LlmConfig;

const DEFAULT_LLM_TIMEOUT_SECS: u64 = 90;
const DEFAULT_MAX_UPLOAD_BYTES: usize = 20 * 1024 * 1024;

/// Which text-understanding backend parses resumes.
#[derive(Debug, Clone, PartialEq)]
pub enum ProviderConfig {
    Heuristic,
    OpenAiCompatible(LlmConfig),
}

/// Application configuration loaded from environment variables.
/// Startup fails if required variables are missing.
#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub s3_bucket: String,
    pub s3_endpoint: String,
    pub aws_access_key_id: String,
    pub aws_secret_access_key: String,
    pub provider: ProviderConfig,
    pub max_upload_bytes: usize,
    pub port: u16,
    pub rust_log: String,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing
        Self::from_vars(|key| std::env::var(key).ok())
    }

    /// Builds the config from any key lookup.
    pub fn from_vars<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let require = |key: &str| require_var(&lookup, key);

        Ok(Config {
            database_url: require("DATABASE_URL")?,
            s3_bucket: require("S3_BUCKET")?,
            s3_endpoint: require("S3_ENDPOINT")?,
            aws_access_key_id: require("AWS_ACCESS_KEY_ID")?,
            aws_secret_access_key: require("AWS_SECRET_ACCESS_KEY")?,
            provider: provider_from_vars(&lookup)?,
            max_upload_bytes: lookup("MAX_UPLOAD_BYTES")
                .map(|v| v.parse::<usize>())
                .transpose()
                .context("MAX_UPLOAD_BYTES must be a byte count")?
                .unwrap_or(DEFAULT_MAX_UPLOAD_BYTES),
            port: lookup("PORT")
                .unwrap_or_else(|| "8080".to_string())
                .parse::<u16>()
                .context("PORT must be a valid port number")?,
            rust_log: lookup("RUST_LOG").unwrap_or_else(|| "info".to_string()),
        })
    }
}

fn provider_from_vars<F>(lookup: &F) -> Result<ProviderConfig>
where
    F: Fn(&str) -> Option<String>,
{
    let name = lookup("RESUME_PROVIDER").unwrap_or_else(|| "heuristic".to_string());
    match name.trim().to_lowercase().as_str() {
        "heuristic" => Ok(ProviderConfig::Heuristic),
        "openai_compatible" => Ok(ProviderConfig::OpenAiCompatible(LlmConfig {
            api_base: require_var(lookup, "LLM_API_BASE")?,
            api_key: require_var(lookup, "LLM_API_KEY")?,
            model: require_var(lookup, "LLM_MODEL")?,
            timeout_secs: lookup("LLM_TIMEOUT_SECS")
                .map(|v| v.parse::<u64>())
                .transpose()
                .context("LLM_TIMEOUT_SECS must be a whole number of seconds")?
                .unwrap_or(DEFAULT_LLM_TIMEOUT_SECS),
        })),
        other => bail!(
            "Unknown RESUME_PROVIDER '{other}': expected 'heuristic' or 'openai_compatible'"
        ),
    }
}

fn require_var<F>(lookup: &F, key: &str) -> Result<String>
where
    F: Fn(&str) -> Option<String>,
{
    lookup(key).with_context(|| format!("Required environment variable '{key}' is not set"))
}
