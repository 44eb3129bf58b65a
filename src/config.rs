use std::env;
use std::time::Duration;

use anyhow::Result;

use crate::completion::openai::{DEFAULT_BASE_URL, DEFAULT_MODEL, DEFAULT_TEMPERATURE};
use crate::source::bluesky::DEFAULT_PUBLIC_API_URL;

/// Default bound on a single text-completion call.
pub const DEFAULT_TIMEOUT_SECS: u64 = 60;

/// Central configuration loaded from environment variables.
///
/// Secrets come from env vars only. A `.env` file is loaded at startup via
/// dotenvy.
pub struct Config {
    /// API key for the text-completion service (LLM_API_KEY).
    pub llm_api_key: String,
    /// OpenAI-compatible API base (LLM_BASE_URL).
    pub llm_base_url: String,
    /// Model name sent with every completion (LLM_MODEL).
    pub llm_model: String,
    /// Sampling temperature (LLM_TEMPERATURE), 0.0 to 2.0.
    pub llm_temperature: f32,
    /// Upper bound for each completion call (QUILL_TIMEOUT_SECS).
    pub timeout: Duration,
    pub db_path: String,
    /// Public AT Protocol API endpoint, used by `ingest --bluesky`.
    pub public_api_url: String,
}

impl Config {
    pub fn load() -> Result<Self> {
        let timeout_secs = match env::var("QUILL_TIMEOUT_SECS") {
            Ok(raw) => raw.trim().parse::<u64>().map_err(|_| {
                anyhow::anyhow!("QUILL_TIMEOUT_SECS must be a whole number of seconds, got '{raw}'")
            })?,
            Err(_) => DEFAULT_TIMEOUT_SECS,
        };
        if timeout_secs == 0 {
            anyhow::bail!("QUILL_TIMEOUT_SECS must be at least 1");
        }

        Ok(Self {
            llm_api_key: env::var("LLM_API_KEY").unwrap_or_default(),
            llm_base_url: env::var("LLM_BASE_URL")
                .unwrap_or_else(|_| DEFAULT_BASE_URL.to_string()),
            llm_model: env::var("LLM_MODEL").unwrap_or_else(|_| DEFAULT_MODEL.to_string()),
            llm_temperature: parse_temperature(env::var("LLM_TEMPERATURE").ok().as_deref())?,
            timeout: Duration::from_secs(timeout_secs),
            db_path: env::var("QUILL_DB_PATH").unwrap_or_else(|_| "./quill.db".to_string()),
            public_api_url: env::var("PUBLIC_API_URL")
                .unwrap_or_else(|_| DEFAULT_PUBLIC_API_URL.to_string()),
        })
    }

    /// Check that the text-completion service is configured.
    /// Call this before anything that classifies or generates.
    pub fn require_llm(&self) -> Result<()> {
        if self.llm_api_key.is_empty() {
            anyhow::bail!(
                "LLM_API_KEY not set. Add it to your .env file.\n\
                 Set LLM_BASE_URL and LLM_MODEL too if you're not using OpenAI."
            );
        }
        Ok(())
    }
}

fn parse_temperature(raw: Option<&str>) -> Result<f32> {
    let Some(raw) = raw else {
        return Ok(DEFAULT_TEMPERATURE);
    };
    let value: f32 = raw
        .trim()
        .parse()
        .map_err(|_| anyhow::anyhow!("LLM_TEMPERATURE must be a number, got '{raw}'"))?;
    if !(0.0..=2.0).contains(&value) {
        anyhow::bail!("LLM_TEMPERATURE must be between 0.0 and 2.0, got {value}");
    }
    Ok(value)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn temperature_defaults_when_unset() {
        assert_eq!(parse_temperature(None).unwrap(), DEFAULT_TEMPERATURE);
    }

    #[test]
    fn temperature_parses_and_bounds() {
        assert_eq!(parse_temperature(Some(" 0.2 ")).unwrap(), 0.2);
        assert!(parse_temperature(Some("warm")).is_err());
        assert!(parse_temperature(Some("3.5")).is_err());
    }
}
