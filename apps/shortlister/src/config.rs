use std::path::PathBuf;

use anyhow::{anyhow, Context, Result};

use crate::extraction::fields::ProfileParser;

const DEFAULT_OLLAMA_URL: &str = "http://localhost:11434";
const DEFAULT_SCORING_CONFIG: &str = "config.yaml";
const DEFAULT_MAX_UPLOAD_BYTES: usize = 25 * 1024 * 1024;

/// Process configuration loaded from environment variables.
/// Every variable has a default; malformed values fail startup.
#[derive(Debug, Clone)]
pub struct Config {
    pub ollama_url: String,
    pub scoring_config_path: PathBuf,
    pub port: u16,
    pub rust_log: String,
    /// Candidates scored at once; bounds load on the model daemon.
    pub max_concurrent_candidates: usize,
    pub service_timeout_secs: u64,
    pub max_upload_bytes: usize,
    pub profile_parser: ProfileParser,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds the config from an arbitrary key lookup.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let max_concurrent_candidates: usize = parse_or(&lookup, "MAX_CONCURRENT_CANDIDATES", 2)?;
        if max_concurrent_candidates == 0 {
            return Err(anyhow!("MAX_CONCURRENT_CANDIDATES must be at least 1"));
        }

        let profile_parser = match lookup("PROFILE_PARSER") {
            Some(raw) => raw.parse::<ProfileParser>().map_err(|e| anyhow!(e))?,
            None => ProfileParser::default(),
        };

        Ok(Config {
            ollama_url: lookup("OLLAMA_URL").unwrap_or_else(|| DEFAULT_OLLAMA_URL.to_string()),
            scoring_config_path: lookup("SCORING_CONFIG_PATH")
                .unwrap_or_else(|| DEFAULT_SCORING_CONFIG.to_string())
                .into(),
            port: parse_or(&lookup, "PORT", 8080)?,
            rust_log: lookup("RUST_LOG").unwrap_or_else(|| "info".to_string()),
            max_concurrent_candidates,
            service_timeout_secs: parse_or(&lookup, "SERVICE_TIMEOUT_SECS", 120)?,
            max_upload_bytes: parse_or(&lookup, "MAX_UPLOAD_BYTES", DEFAULT_MAX_UPLOAD_BYTES)?,
            profile_parser,
        })
    }
}

fn parse_or<T>(lookup: &impl Fn(&str) -> Option<String>, key: &str, default: T) -> Result<T>
where
    T: std::str::FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match lookup(key) {
        Some(raw) => raw
            .trim()
            .parse::<T>()
            .with_context(|| format!("{key} must be a valid number, got '{raw}'")),
        None => Ok(default),
    }
}
