//! Gemini backend for the Google Generative Language API.

use crate::backend::{GenerationBackend, LlmConfig, LlmError, LlmResult};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

const GEMINI_API_URL: &str = "https://generativelanguage.googleapis.com/v1beta/models";

/// Gemini API request.
#[derive(Debug, Serialize)]
struct GenerateRequest {
    contents: Vec<Content>,
    #[serde(rename = "generationConfig")]
    generation_config: GenerationConfig,
}

#[derive(Debug, Serialize)]
struct Content {
    parts: Vec<Part>,
}

#[derive(Debug, Serialize)]
struct Part {
    text: String,
}

#[derive(Debug, Serialize)]
struct GenerationConfig {
    temperature: f32,
    #[serde(rename = "maxOutputTokens")]
    max_output_tokens: u32,
}

/// Gemini API response.
#[derive(Debug, Deserialize)]
struct GenerateResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    #[serde(default)]
    content: CandidateContent,
}

#[derive(Debug, Default, Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<CandidatePart>,
}

#[derive(Debug, Deserialize)]
struct CandidatePart {
    text: String,
}

/// Gemini backend over the REST API.
///
/// # Example
///
/// ```rust,ignore
/// use triptych_llm::{GeminiBackend, GenerationBackend};
///
/// let backend = GeminiBackend::new("AIza...");
/// let answer = backend.generate("What is a ledger?").await?;
/// ```
pub struct GeminiBackend {
    api_key: String,
    config: LlmConfig,
    client: reqwest::Client,
}

impl GeminiBackend {
    /// Create a new Gemini backend with the default configuration.
    pub fn new(api_key: &str) -> Self {
        Self::with_config(api_key, LlmConfig::default())
    }

    /// Create with custom config.
    pub fn with_config(api_key: &str, config: LlmConfig) -> Self {
        let client = reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(config.timeout_secs as u64))
            .build()
            .expect("Failed to create HTTP client");

        Self {
            api_key: api_key.to_string(),
            config,
            client,
        }
    }

    /// Create from the `GOOGLE_API_KEY` environment variable.
    pub fn from_env() -> LlmResult<Self> {
        let api_key =
            std::env::var("GOOGLE_API_KEY").map_err(|_| LlmError::AuthenticationFailed)?;
        Ok(Self::new(&api_key))
    }

    /// Set the model.
    pub fn with_model(mut self, model: &str) -> Self {
        self.config.model = model.to_string();
        self
    }

    /// Make a generateContent request.
    async fn request(
        &self,
        prompt: &str,
        temperature: f32,
        max_tokens: u32,
    ) -> LlmResult<String> {
        let url = format!("{}/{}:generateContent", GEMINI_API_URL, self.config.model);
        let request = GenerateRequest {
            contents: vec![Content {
                parts: vec![Part {
                    text: prompt.to_string(),
                }],
            }],
            generation_config: GenerationConfig {
                temperature,
                max_output_tokens: max_tokens,
            },
        };

        let response = self
            .client
            .post(&url)
            .header("x-goog-api-key", &self.api_key)
            .header("content-type", "application/json")
            .json(&request)
            .send()
            .await
            .map_err(|e| {
                if e.is_connect() {
                    LlmError::ConnectionFailed("Cannot connect to Gemini API".to_string())
                } else if e.is_timeout() {
                    LlmError::Timeout(self.config.timeout_secs)
                } else {
                    LlmError::ApiError(e.to_string())
                }
            })?;

        let status = response.status();

        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();

            match status.as_u16() {
                401 | 403 => return Err(LlmError::AuthenticationFailed),
                404 => return Err(LlmError::ModelNotFound(self.config.model.clone())),
                429 => return Err(LlmError::RateLimited(60)),
                _ => {}
            }

            return Err(LlmError::ApiError(format!(
                "Gemini API error {}: {}",
                status, body
            )));
        }

        let resp: GenerateResponse = response
            .json()
            .await
            .map_err(|e| LlmError::InvalidResponse(e.to_string()))?;

        resp.candidates
            .first()
            .and_then(|c| c.content.parts.first())
            .map(|p| p.text.clone())
            .ok_or_else(|| LlmError::InvalidResponse("No candidates in response".to_string()))
    }
}

#[async_trait]
impl GenerationBackend for GeminiBackend {
    fn name(&self) -> &str {
        "gemini"
    }

    fn config(&self) -> &LlmConfig {
        &self.config
    }

    async fn generate_with(
        &self,
        prompt: &str,
        temperature: f32,
        max_tokens: u32,
    ) -> LlmResult<String> {
        self.request(prompt, temperature, max_tokens).await
    }
}
