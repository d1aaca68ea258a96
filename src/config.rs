//! Environment-driven configuration.
//!
//! All settings come from environment variables (a `.env` file is loaded
//! by the binary before this runs). A missing `GOOGLE_API_KEY` is the one
//! fatal condition; everything else has a default.

use std::fs;
use std::path::PathBuf;

use crate::error::{Result, SupportError};

/// Default chat model identifier.
const DEFAULT_MODEL: &str = "gemini-2.5-flash";

/// Runtime configuration for the agent and knowledge base.
#[derive(Debug, Clone)]
pub struct Config {
    /// Gemini API credential. Required.
    pub api_key: String,
    /// Chat model identifier.
    pub model: String,
    /// Sampling temperature, in `[0, 2]`.
    pub temperature: f32,
    /// Maximum output tokens per model call.
    pub max_output_tokens: u32,
    /// Directory holding the persistent vector collection.
    pub persist_dir: PathBuf,
    /// Directory holding staged raw files pending ingestion.
    pub staging_dir: PathBuf,
}

fn env_or(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_string())
}

fn parse_env<T: std::str::FromStr>(key: &str, default: T) -> Result<T> {
    match std::env::var(key) {
        Ok(raw) => raw
            .parse()
            .map_err(|_| SupportError::Config(format!("{key} has an invalid value: {raw}"))),
        Err(_) => Ok(default),
    }
}

impl Config {
    /// Build the configuration from environment variables.
    ///
    /// # Errors
    ///
    /// Returns [`SupportError::Config`] if `GOOGLE_API_KEY` is unset or a
    /// numeric variable fails to parse or validate.
    pub fn from_env() -> Result<Self> {
        let api_key = std::env::var("GOOGLE_API_KEY").map_err(|_| {
            SupportError::Config(
                "GOOGLE_API_KEY is required. Set it in the environment or a .env file".to_string(),
            )
        })?;

        let temperature: f32 = parse_env("TEMPERATURE", 0.7)?;
        Self::validate_temperature(temperature)?;

        Ok(Self {
            api_key,
            model: env_or("GEMINI_MODEL", DEFAULT_MODEL),
            temperature,
            max_output_tokens: parse_env("MAX_TOKENS", 4000)?,
            persist_dir: PathBuf::from(env_or("VECTOR_DB_DIR", "./data/vector_db")),
            staging_dir: PathBuf::from(env_or("KNOWLEDGE_BASE_DIR", "./data/knowledge_base")),
        })
    }

    fn validate_temperature(temperature: f32) -> Result<()> {
        if !(0.0..=2.0).contains(&temperature) {
            return Err(SupportError::Config(format!(
                "TEMPERATURE must be within [0, 2], got {temperature}"
            )));
        }
        Ok(())
    }

    /// Create the persistence and staging directories if absent.
    pub fn ensure_directories(&self) -> Result<()> {
        for dir in [&self.persist_dir, &self.staging_dir] {
            fs::create_dir_all(dir).map_err(|e| {
                SupportError::Config(format!("failed to create {}: {e}", dir.display()))
            })?;
        }
        Ok(())
    }
}
