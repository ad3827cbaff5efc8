use std::str::FromStr;
use std::time::Duration;

use anyhow::{Context, Result};

use crate::llm_client::usable_api_key;
use crate::visualizer::fallback::MatchPolicy;

const DEFAULT_LLM_TIMEOUT_SECS: u64 = 30;

/// Application configuration loaded from environment variables.
///
/// A missing model key is not a startup error: the service then answers
/// every request from the fallback library.
#[derive(Debug, Clone)]
pub struct Config {
    pub google_ai_api_key: Option<String>,
    pub port: u16,
    pub rust_log: String,
    pub cors_allowed_origin: String,
    pub llm_timeout_secs: u64,
    pub fallback_match: MatchPolicy,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing

        Ok(Config {
            google_ai_api_key: std::env::var("GOOGLE_AI_API_KEY").ok(),
            port: parse_env("PORT", 8000).context("PORT must be a valid port number")?,
            rust_log: std::env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string()),
            cors_allowed_origin: std::env::var("CORS_ALLOWED_ORIGIN")
                .unwrap_or_else(|_| "http://localhost:5173".to_string()),
            llm_timeout_secs: llm_timeout_secs(
                std::env::var("LLM_TIMEOUT_SECS").ok().as_deref(),
            )?,
            fallback_match: match std::env::var("FALLBACK_MATCH") {
                Ok(raw) => raw.parse().map_err(anyhow::Error::msg)?,
                Err(_) => MatchPolicy::default(),
            },
        })
    }

    /// The model key, or `None` when unset, blank, or the placeholder.
    pub fn api_key(&self) -> Option<&str> {
        usable_api_key(self.google_ai_api_key.as_deref())
    }

    pub fn llm_timeout(&self) -> Duration {
        Duration::from_secs(self.llm_timeout_secs)
    }
}

/// Parses the per-call model timeout. Zero would time out every call, so it is rejected.
fn llm_timeout_secs(raw: Option<&str>) -> Result<u64> {
    let secs: u64 = match raw {
        Some(raw) => parse_value("LLM_TIMEOUT_SECS", raw)
            .context("LLM_TIMEOUT_SECS must be a whole number of seconds")?,
        None => DEFAULT_LLM_TIMEOUT_SECS,
    };
    anyhow::ensure!(secs > 0, "LLM_TIMEOUT_SECS must be greater than zero");
    Ok(secs)
}

fn parse_env<T>(key: &str, default: T) -> Result<T>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match std::env::var(key) {
        Ok(raw) => parse_value(key, &raw),
        Err(_) => Ok(default),
    }
}

fn parse_value<T>(key: &str, raw: &str) -> Result<T>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    raw.trim()
        .parse::<T>()
        .with_context(|| format!("Environment variable '{key}' has invalid value '{raw}'"))
}
