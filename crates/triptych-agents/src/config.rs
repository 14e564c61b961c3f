//! Pipeline configuration with environment overrides.

use serde::{Deserialize, Serialize};

fn default_generation_model() -> String {
    "gemini-2.0-flash".to_string()
}

fn default_query_max_tokens() -> u32 {
    150
}

fn default_temperature() -> f32 {
    0.7
}

fn default_embedding_model() -> String {
    "feature-hash".to_string()
}

fn default_top_k() -> usize {
    3
}

fn default_response_max_tokens() -> u32 {
    500
}

fn default_system_prompt() -> String {
    "You are an expert FAQ response generator. Generate clear, concise and accurate \
     responses based on the provided context."
        .to_string()
}

/// Query-understanding agent configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QueryAgentConfig {
    #[serde(default = "default_generation_model")]
    pub model: String,
    #[serde(default = "default_query_max_tokens")]
    pub max_tokens: u32,
    #[serde(default = "default_temperature")]
    pub temperature: f32,
}

impl Default for QueryAgentConfig {
    fn default() -> Self {
        Self {
            model: default_generation_model(),
            max_tokens: default_query_max_tokens(),
            temperature: default_temperature(),
        }
    }
}

/// Retrieval agent configuration.
///
/// `model_name` selects the embedder: `feature-hash` is the local hashing
/// embedder; any other value names a Gemini embedding model.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RetrievalAgentConfig {
    #[serde(default = "default_embedding_model")]
    pub model_name: String,
    #[serde(default = "default_top_k")]
    pub top_k: usize,
}

impl Default for RetrievalAgentConfig {
    fn default() -> Self {
        Self {
            model_name: default_embedding_model(),
            top_k: default_top_k(),
        }
    }
}

/// Response-generation agent configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResponseAgentConfig {
    #[serde(default = "default_generation_model")]
    pub model: String,
    #[serde(default = "default_response_max_tokens")]
    pub max_tokens: u32,
    #[serde(default = "default_temperature")]
    pub temperature: f32,
    #[serde(default = "default_system_prompt")]
    pub system_prompt: String,
}

impl Default for ResponseAgentConfig {
    fn default() -> Self {
        Self {
            model: default_generation_model(),
            max_tokens: default_response_max_tokens(),
            temperature: default_temperature(),
            system_prompt: default_system_prompt(),
        }
    }
}

/// Whole-pipeline configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PipelineConfig {
    #[serde(default)]
    pub query: QueryAgentConfig,
    #[serde(default)]
    pub retrieval: RetrievalAgentConfig,
    #[serde(default)]
    pub response: ResponseAgentConfig,
    /// API key for the Gemini backends. An empty key is accepted at
    /// construction; calls fail with an authentication error when made.
    #[serde(default, skip_serializing)]
    pub api_key: String,
}

impl PipelineConfig {
    /// Load configuration from the environment.
    ///
    /// Unset or unparseable variables fall back to their defaults.
    /// `GEMINI_MODEL` overrides the default generation model for both LLM
    /// agents; the per-agent variables override it in turn.
    pub fn from_env() -> Self {
        let fallback_model = env_string("GEMINI_MODEL").unwrap_or_else(default_generation_model);

        Self {
            api_key: env_string("GOOGLE_API_KEY").unwrap_or_default(),
            query: QueryAgentConfig {
                model: env_string("QUERY_AGENT_MODEL").unwrap_or_else(|| fallback_model.clone()),
                max_tokens: env_parse("QUERY_AGENT_MAX_TOKENS")
                    .unwrap_or_else(default_query_max_tokens),
                temperature: env_parse("QUERY_AGENT_TEMPERATURE")
                    .unwrap_or_else(default_temperature),
            },
            retrieval: RetrievalAgentConfig {
                model_name: env_string("RETRIEVAL_AGENT_MODEL")
                    .unwrap_or_else(default_embedding_model),
                top_k: env_parse("RETRIEVAL_AGENT_TOP_K").unwrap_or_else(default_top_k),
            },
            response: ResponseAgentConfig {
                model: env_string("RESPONSE_AGENT_MODEL").unwrap_or(fallback_model),
                max_tokens: env_parse("RESPONSE_AGENT_MAX_TOKENS")
                    .unwrap_or_else(default_response_max_tokens),
                temperature: env_parse("RESPONSE_AGENT_TEMPERATURE")
                    .unwrap_or_else(default_temperature),
                system_prompt: default_system_prompt(),
            },
        }
    }
}

fn env_string(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|v| !v.is_empty())
}

fn env_parse<T: std::str::FromStr>(key: &str) -> Option<T> {
    std::env::var(key).ok().and_then(|v| v.parse().ok())
}
