//! Gemini embedding backend for the Google Generative Language API.

use crate::{Embedder, EmbeddingError, EmbeddingResult};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

const GEMINI_API_URL: &str = "https://generativelanguage.googleapis.com/v1beta/models";
const DEFAULT_MODEL: &str = "text-embedding-004";
const DEFAULT_DIMENSION: usize = 768;

/// Batch embedding request.
#[derive(Debug, Serialize)]
struct BatchEmbedRequest {
    requests: Vec<EmbedRequest>,
}

#[derive(Debug, Serialize)]
struct EmbedRequest {
    model: String,
    content: EmbedContent,
}

#[derive(Debug, Serialize)]
struct EmbedContent {
    parts: Vec<EmbedPart>,
}

#[derive(Debug, Serialize)]
struct EmbedPart {
    text: String,
}

/// Batch embedding response.
#[derive(Debug, Deserialize)]
struct BatchEmbedResponse {
    #[serde(default)]
    embeddings: Vec<EmbeddingValues>,
}

#[derive(Debug, Deserialize)]
struct EmbeddingValues {
    #[serde(default)]
    values: Vec<f32>,
}

/// Gemini embedding backend over the REST API.
pub struct GeminiEmbedder {
    api_key: String,
    model: String,
    dimension: usize,
    timeout_secs: u32,
    client: reqwest::Client,
}

impl GeminiEmbedder {
    /// Create a new embedder for the default model (`text-embedding-004`).
    pub fn new(api_key: &str) -> Self {
        Self::with_model(api_key, DEFAULT_MODEL, DEFAULT_DIMENSION)
    }

    /// Create for a specific embedding model and dimension.
    pub fn with_model(api_key: &str, model: &str, dimension: usize) -> Self {
        let timeout_secs = 30;
        let client = reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(timeout_secs as u64))
            .build()
            .expect("Failed to create HTTP client");

        Self {
            api_key: api_key.to_string(),
            model: model.to_string(),
            dimension,
            timeout_secs,
            client,
        }
    }
}

#[async_trait]
impl Embedder for GeminiEmbedder {
    fn model_name(&self) -> &str {
        &self.model
    }

    fn dimension(&self) -> usize {
        self.dimension
    }

    async fn encode(&self, texts: &[String]) -> EmbeddingResult<Vec<Vec<f32>>> {
        if texts.is_empty() {
            return Ok(Vec::new());
        }

        let url = format!("{}/{}:batchEmbedContents", GEMINI_API_URL, self.model);
        let request = BatchEmbedRequest {
            requests: texts
                .iter()
                .map(|text| EmbedRequest {
                    model: format!("models/{}", self.model),
                    content: EmbedContent {
                        parts: vec![EmbedPart { text: text.clone() }],
                    },
                })
                .collect(),
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
                    EmbeddingError::ConnectionFailed("Cannot connect to Gemini API".to_string())
                } else if e.is_timeout() {
                    EmbeddingError::Timeout(self.timeout_secs)
                } else {
                    EmbeddingError::ApiError(e.to_string())
                }
            })?;

        let status = response.status();

        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();

            if matches!(status.as_u16(), 401 | 403) {
                return Err(EmbeddingError::AuthenticationFailed);
            }

            return Err(EmbeddingError::ApiError(format!(
                "Gemini API error {}: {}",
                status, body
            )));
        }

        let resp: BatchEmbedResponse = response
            .json()
            .await
            .map_err(|e| EmbeddingError::InvalidResponse(e.to_string()))?;

        if resp.embeddings.len() != texts.len() {
            return Err(EmbeddingError::InvalidResponse(format!(
                "Expected {} embeddings, got {}",
                texts.len(),
                resp.embeddings.len()
            )));
        }

        Ok(resp.embeddings.into_iter().map(|e| e.values).collect())
    }
}
