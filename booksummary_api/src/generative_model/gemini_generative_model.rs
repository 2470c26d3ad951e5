use anyhow::Context;
use reqwest_middleware::{ClientBuilder, ClientWithMiddleware};
use reqwest_tracing::TracingMiddleware;
use serde::Deserialize;
use serde_json::json;

use crate::generative_model::{GenerativeModel, GenerativeModelError};

const API_KEY_HEADER: &str = "x-goog-api-key";

pub struct GeminiGenerativeModelConfig {
    pub base_url: String,
    pub model: String,
    /// None (or empty) when GOOGLE_API_KEY is not set
    pub api_key: Option<String>,
}

pub struct GeminiGenerativeModel {
    url: String,
    api_key: Option<String>,
    client: ClientWithMiddleware,
}

#[derive(Deserialize)]
struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Deserialize)]
struct Candidate {
    content: Option<Content>,
}

#[derive(Deserialize)]
struct Content {
    #[serde(default)]
    parts: Vec<Part>,
}

#[derive(Deserialize)]
struct Part {
    text: Option<String>,
}

#[derive(Deserialize)]
struct ErrorEnvelope {
    error: ErrorDetails,
}

#[derive(Deserialize)]
struct ErrorDetails {
    #[serde(default)]
    message: String,
    status: Option<String>,
}

impl GeminiGenerativeModel {
    pub fn new(config: GeminiGenerativeModelConfig) -> anyhow::Result<Self> {
        let reqwest_client = reqwest::Client::builder()
            .build()
            .context("Failed to build reqwest client")?;
        let client = ClientBuilder::new(reqwest_client)
            // Insert the tracing middleware
            .with(TracingMiddleware::default())
            .build();

        Ok(Self {
            url: format!(
                "{}/v1beta/models/{}:generateContent",
                config.base_url.trim_end_matches('/'),
                config.model
            ),
            api_key: config.api_key.filter(|key| !key.trim().is_empty()),
            client,
        })
    }
}

#[async_trait::async_trait]
impl GenerativeModel for GeminiGenerativeModel {
    fn is_configured(&self) -> bool {
        self.api_key.is_some()
    }

    async fn generate(&self, prompt: &str) -> Result<String, GenerativeModelError> {
        let api_key = self
            .api_key
            .as_deref()
            .ok_or(GenerativeModelError::MissingCredential)?;

        let response = self
            .client
            .post(&self.url)
            .header(API_KEY_HEADER, api_key)
            .json(&json!({ "contents": [{ "parts": [{ "text": prompt }] }] }))
            .send()
            .await?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(reqwest_middleware::Error::from)?;

        if !status.is_success() {
            let (message, upstream_status) = match serde_json::from_str::<ErrorEnvelope>(&body) {
                Ok(envelope) => (envelope.error.message, envelope.error.status),
                Err(_) => (format!("Generative model responded with {status}"), None),
            };
            return Err(GenerativeModelError::from_upstream(
                status.as_u16(),
                upstream_status.as_deref(),
                message,
            ));
        }

        let parsed: GenerateContentResponse = serde_json::from_str(&body).map_err(|err| {
            GenerativeModelError::Upstream(format!("Unexpected generative model response: {err}"))
        })?;

        let text: String = parsed
            .candidates
            .into_iter()
            .next()
            .and_then(|candidate| candidate.content)
            .map(|content| {
                content
                    .parts
                    .into_iter()
                    .filter_map(|part| part.text)
                    .collect()
            })
            .unwrap_or_default();

        if text.is_empty() {
            Err(GenerativeModelError::EmptyResponse)
        } else {
            Ok(text)
        }
    }
}
