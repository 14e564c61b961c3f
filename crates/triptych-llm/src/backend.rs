//! Core text-generation backend trait.

use async_trait::async_trait;
use thiserror::Error;

/// Generation-related errors.
#[derive(Debug, Error)]
pub enum LlmError {
    #[error("API error: {0}")]
    ApiError(String),

    #[error("Connection failed: {0}")]
    ConnectionFailed(String),

    #[error("Rate limited: retry after {0} seconds")]
    RateLimited(u32),

    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    #[error("Model not found: {0}")]
    ModelNotFound(String),

    #[error("Authentication failed")]
    AuthenticationFailed,

    #[error("Timeout after {0} seconds")]
    Timeout(u32),
}

/// Result type for generation operations.
pub type LlmResult<T> = Result<T, LlmError>;

/// Configuration for generation requests.
#[derive(Debug, Clone)]
pub struct LlmConfig {
    /// Model name/identifier.
    pub model: String,
    /// Maximum tokens to generate.
    pub max_tokens: u32,
    /// Temperature (0.0 = deterministic, 1.0 = creative).
    pub temperature: f32,
    /// Request timeout in seconds.
    pub timeout_secs: u32,
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            model: "gemini-2.0-flash".to_string(),
            max_tokens: 512,
            temperature: 0.7,
            timeout_secs: 30,
        }
    }
}

impl LlmConfig {
    /// Set the model.
    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    /// Set max tokens.
    pub fn with_max_tokens(mut self, max_tokens: u32) -> Self {
        self.max_tokens = max_tokens;
        self
    }

    /// Set temperature.
    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = temperature.clamp(0.0, 2.0);
        self
    }

    /// Set timeout.
    pub fn with_timeout(mut self, timeout_secs: u32) -> Self {
        self.timeout_secs = timeout_secs;
        self
    }
}

/// Core trait for text-generation backends.
///
/// Implementors turn a prompt into completion text; all structured-output
/// interpretation happens in the callers.
#[async_trait]
pub trait GenerationBackend: Send + Sync {
    /// Get the backend name.
    fn name(&self) -> &str;

    /// Get the current configuration.
    fn config(&self) -> &LlmConfig;

    /// Generate a completion with explicit sampling parameters.
    async fn generate_with(
        &self,
        prompt: &str,
        temperature: f32,
        max_tokens: u32,
    ) -> LlmResult<String>;

    /// Generate a completion using the configured sampling parameters.
    async fn generate(&self, prompt: &str) -> LlmResult<String> {
        let config = self.config();
        self.generate_with(prompt, config.temperature, config.max_tokens)
            .await
    }
}

/// Extract a JSON object from generated text (handles markdown code blocks).
///
/// Returns the trimmed input unchanged when no object bounds are found, so a
/// downstream parse still gets a chance to report the raw text.
pub fn extract_json_object(text: &str) -> &str {
    // Remove markdown code blocks
    let text = text.trim();
    let text = text.strip_prefix("```json").unwrap_or(text);
    let text = text.strip_prefix("```").unwrap_or(text);
    let text = text.strip_suffix("```").unwrap_or(text);
    let text = text.trim();

    // Find object bounds
    if let (Some(start), Some(end)) = (text.find('{'), text.rfind('}')) {
        &text[start..=end]
    } else {
        text
    }
}

/// A mock backend for testing.
pub struct MockBackend {
    config: LlmConfig,
    responses: std::collections::HashMap<String, String>,
    failures: Vec<String>,
}

impl MockBackend {
    /// Create a new mock backend.
    pub fn new() -> Self {
        Self {
            config: LlmConfig::default(),
            responses: std::collections::HashMap::new(),
            failures: Vec::new(),
        }
    }

    /// Add a canned response for a prompt pattern.
    pub fn with_response(mut self, pattern: &str, response: &str) -> Self {
        self.responses
            .insert(pattern.to_string(), response.to_string());
        self
    }

    /// Fail any prompt containing the pattern with a connection error.
    pub fn with_failure(mut self, pattern: &str) -> Self {
        self.failures.push(pattern.to_string());
        self
    }
}

impl Default for MockBackend {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl GenerationBackend for MockBackend {
    fn name(&self) -> &str {
        "mock"
    }

    fn config(&self) -> &LlmConfig {
        &self.config
    }

    async fn generate_with(
        &self,
        prompt: &str,
        _temperature: f32,
        _max_tokens: u32,
    ) -> LlmResult<String> {
        for pattern in &self.failures {
            if prompt.contains(pattern) {
                return Err(LlmError::ConnectionFailed(format!(
                    "mock failure for '{}'",
                    pattern
                )));
            }
        }

        // Check for matching pattern
        for (pattern, response) in &self.responses {
            if prompt.contains(pattern) {
                return Ok(response.clone());
            }
        }
        Ok("Mock response".to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_mock_backend() {
        let backend = MockBackend::new().with_response("test", "Test response");

        let response = backend.generate("This is a test").await.unwrap();
        assert_eq!(response, "Test response");
    }

    #[tokio::test]
    async fn test_mock_default_response() {
        let backend = MockBackend::new();
        let response = backend.generate("anything").await.unwrap();
        assert_eq!(response, "Mock response");
    }

    #[tokio::test]
    async fn test_mock_failure() {
        let backend = MockBackend::new().with_failure("boom");

        let result = backend.generate("this goes boom").await;
        assert!(matches!(result, Err(LlmError::ConnectionFailed(_))));
    }

    #[test]
    fn test_config_builders() {
        let config = LlmConfig::default()
            .with_model("gemini-2.0-pro")
            .with_max_tokens(100)
            .with_temperature(0.3);

        assert_eq!(config.model, "gemini-2.0-pro");
        assert_eq!(config.max_tokens, 100);
        assert!((config.temperature - 0.3).abs() < 1e-6);
    }

    #[test]
    fn test_temperature_clamped() {
        let config = LlmConfig::default().with_temperature(5.0);
        assert!((config.temperature - 2.0).abs() < 1e-6);
    }

    #[test]
    fn test_extract_json_object_from_code_block() {
        let text = "```json\n{\"query_type\": \"factual\"}\n```";
        let extracted = extract_json_object(text);
        let value: serde_json::Value = serde_json::from_str(extracted).unwrap();
        assert_eq!(value["query_type"], "factual");
    }

    #[test]
    fn test_extract_json_object_with_surrounding_prose() {
        let text = "Here is the analysis: {\"priority\": 4} hope that helps";
        assert_eq!(extract_json_object(text), "{\"priority\": 4}");
    }

    #[test]
    fn test_extract_json_object_no_object() {
        assert_eq!(extract_json_object("  no json here  "), "no json here");
    }
}
