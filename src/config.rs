//! Runtime configuration for the extraction service and dashboard.

use std::{env, path::PathBuf};

use anyhow::Context;
use serde::Deserialize;

/// Longest input the model accepts, in characters.
pub const DEFAULT_MAX_TEXT_CHARS: usize = 1_000_000;

/// Application configuration resolved from `.env` and defaults.
#[derive(Debug, Clone, Deserialize)]
pub struct Settings {
    /// Directory holding the entity-ruler pattern files.
    pub model_dir: PathBuf,
    /// Inputs longer than this are refused by the model.
    pub max_text_chars: usize,
    /// Where the frequency table is persisted across restarts, if anywhere.
    pub frequency_snapshot: Option<PathBuf>,
    /// Base URL the dashboard uses to reach the extraction service.
    pub service_url: String,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            model_dir: PathBuf::from("./model"),
            max_text_chars: DEFAULT_MAX_TEXT_CHARS,
            frequency_snapshot: None,
            service_url: "http://127.0.0.1:8000".to_string(),
        }
    }
}

impl Settings {
    /// Load configuration from environment with reasonable defaults.
    pub fn load() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();
        let defaults = Self::default();

        let model_dir = env::var("MODEL_DIR")
            .map(PathBuf::from)
            .unwrap_or(defaults.model_dir);
        let max_text_chars = match env::var("MAX_TEXT_CHARS") {
            Ok(raw) => raw
                .trim()
                .parse()
                .with_context(|| format!("parsing MAX_TEXT_CHARS={raw:?}"))?,
            Err(_) => defaults.max_text_chars,
        };
        let frequency_snapshot = env::var("FREQUENCY_SNAPSHOT")
            .ok()
            .filter(|v| !v.trim().is_empty())
            .map(PathBuf::from);
        let service_url = env::var("SERVICE_URL")
            .map(|url| url.trim_end_matches('/').to_string())
            .unwrap_or(defaults.service_url);

        Ok(Self {
            model_dir,
            max_text_chars,
            frequency_snapshot,
            service_url,
        })
    }
}
