use std::collections::HashMap;

use anyhow::Context;
use serde::Deserialize;

const ENV_PREFIX: &str = "BOOKSUMMARY";
const API_KEY_VAR: &str = "GOOGLE_API_KEY";

/// Server settings read from the process environment.
///
/// | variable | default |
/// |---|---|
/// | `GOOGLE_API_KEY` | unset |
/// | `BOOKSUMMARY_MODEL` | `gemini-flash-latest` |
/// | `BOOKSUMMARY_GEMINI_URL` | `https://generativelanguage.googleapis.com` |
/// | `BOOKSUMMARY_COVERS_URL` | `https://www.googleapis.com` |
/// | `BOOKSUMMARY_HOST` | `0.0.0.0` |
/// | `BOOKSUMMARY_PORT` | `8080` |
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
pub struct Settings {
    pub google_api_key: Option<String>,
    pub model: String,
    pub gemini_url: String,
    pub covers_url: String,
    pub host: String,
    pub port: u16,
}

impl Settings {
    pub fn from_env() -> anyhow::Result<Self> {
        Self::from_vars(std::env::vars().collect())
    }

    pub fn from_vars(vars: HashMap<String, String>) -> anyhow::Result<Self> {
        // An empty key is treated the same as a missing one
        let api_key = vars
            .get(API_KEY_VAR)
            .filter(|key| !key.trim().is_empty())
            .cloned();

        let mut settings: Settings = config::Config::builder()
            .set_default("model", "gemini-flash-latest")?
            .set_default("gemini_url", "https://generativelanguage.googleapis.com")?
            .set_default("covers_url", "https://www.googleapis.com")?
            .set_default("host", "0.0.0.0")?
            .set_default("port", 8080)?
            .add_source(
                config::Environment::with_prefix(ENV_PREFIX)
                    .try_parsing(true)
                    .source(Some(vars)),
            )
            .build()
            .context("Failed to build configuration")?
            .try_deserialize()
            .context("Failed to deserialize configuration")?;

        settings.google_api_key = api_key;
        Ok(settings)
    }
}
