pub use gemini_generative_model::{GeminiGenerativeModel, GeminiGenerativeModelConfig};

mod gemini_generative_model;

#[derive(thiserror::Error, Debug)]
pub enum GenerativeModelError {
    #[error("GOOGLE_API_KEY is not configured on the server.")]
    MissingCredential,

    #[error("{0}")]
    RateLimited(String),

    #[error("{0}")]
    Upstream(String),

    #[error("Failed to call generative model: {0}")]
    Transport(#[from] reqwest_middleware::Error),

    #[error("Generative model returned no text")]
    EmptyResponse,
}

impl GenerativeModelError {
    /// Classifies an upstream failure, preferring the structured status over the message text
    pub fn from_upstream(http_status: u16, status: Option<&str>, message: String) -> Self {
        let rate_limited = http_status == 429
            || status == Some("RESOURCE_EXHAUSTED")
            || message.contains("429")
            || message.to_lowercase().contains("quota");
        if rate_limited {
            Self::RateLimited(message)
        } else {
            Self::Upstream(message)
        }
    }

    pub fn is_rate_limited(&self) -> bool {
        matches!(self, Self::RateLimited(_))
    }
}

#[async_trait::async_trait]
pub trait GenerativeModel {
    /// False when the service credential is missing, checked before every request
    fn is_configured(&self) -> bool;
    /// Sends the instruction to the model and returns its raw text answer
    async fn generate(&self, prompt: &str) -> Result<String, GenerativeModelError>;
}
