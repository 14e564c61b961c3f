//! Response-generation agent: answer synthesis plus self-scoring.

use crate::agent::{Agent, AgentResult, AgentStatus};
use crate::config::ResponseAgentConfig;
use crate::retrieval::RetrievedDocument;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use triptych_llm::{extract_json_object, GenerationBackend};

// The scoring call runs with fixed sampling, independent of the agent config
const QUALITY_TEMPERATURE: f32 = 0.3;
const QUALITY_MAX_TOKENS: u32 = 200;

fn default_score() -> u8 {
    3
}

/// Input for the response stage.
#[derive(Debug, Clone)]
pub struct ResponseRequest {
    pub query: String,
    pub context: Vec<RetrievedDocument>,
}

/// Self-assessed quality of a generated response, each score on a 1-5 scale.
///
/// The backend is prompted for `*_score` keys; the aliases accept both
/// spellings. Missing scores fall back to the neutral 3.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QualityMetrics {
    #[serde(default = "default_score", alias = "relevance_score")]
    pub relevance: u8,
    #[serde(default = "default_score", alias = "accuracy_score")]
    pub accuracy: u8,
    #[serde(default = "default_score", alias = "clarity_score")]
    pub clarity: u8,
    #[serde(default = "default_score", alias = "context_usage_score")]
    pub context_usage: u8,
    #[serde(default)]
    pub suggested_improvements: Vec<String>,
}

impl QualityMetrics {
    /// Neutral scores substituted when the scoring reply cannot be parsed.
    pub fn fallback() -> Self {
        Self {
            relevance: 3,
            accuracy: 3,
            clarity: 3,
            context_usage: 3,
            suggested_improvements: vec!["Unable to analyze response quality".to_string()],
        }
    }
}

/// Output of the response stage.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeneratedResponse {
    pub query: String,
    pub response: String,
    pub quality_metrics: QualityMetrics,
    pub context_used: usize,
}

/// Third pipeline stage: synthesizes the final answer from the query and the
/// retrieved context, then scores its own output with a second call.
pub struct ResponseAgent {
    name: String,
    config: ResponseAgentConfig,
    backend: Arc<dyn GenerationBackend>,
}

impl ResponseAgent {
    pub fn new(config: ResponseAgentConfig, backend: Arc<dyn GenerationBackend>) -> Self {
        Self {
            name: "response_generation".to_string(),
            config,
            backend,
        }
    }

    fn build_prompt(&self, query: &str, context: &[RetrievedDocument]) -> String {
        let context_text = context
            .iter()
            .enumerate()
            .map(|(i, doc)| format!("Document {}:\n{}", i + 1, doc.document))
            .collect::<Vec<_>>()
            .join("\n\n");

        format!(
            "{}\n\n\
             Based on the following context, please provide a clear and accurate \
             answer to the query.\n\n\
             Query: {}\n\n\
             Context:\n{}\n\n\
             Please provide a response that:\n\
             1. Directly answers the query\n\
             2. Uses information from the context\n\
             3. Is clear and concise\n\
             4. Maintains a professional tone",
            self.config.system_prompt, query, context_text
        )
    }

    async fn analyze_quality(&self, query: &str, response: &str) -> AgentResult<QualityMetrics> {
        let prompt = format!(
            "Analyze the following FAQ response and return a JSON object with:\n\
             1. relevance_score (1-5, where 5 is highest)\n\
             2. accuracy_score (1-5, where 5 is highest)\n\
             3. clarity_score (1-5, where 5 is highest)\n\
             4. context_usage_score (1-5, where 5 is highest)\n\
             5. suggested_improvements (list of specific improvements)\n\n\
             Query: {}\n\nResponse: {}",
            query, response
        );

        let analysis = self
            .backend
            .generate_with(&prompt, QUALITY_TEMPERATURE, QUALITY_MAX_TOKENS)
            .await?;

        // Malformed scoring output degrades to the neutral fallback
        Ok(serde_json::from_str(extract_json_object(&analysis))
            .unwrap_or_else(|_| QualityMetrics::fallback()))
    }
}

#[async_trait]
impl Agent for ResponseAgent {
    type Input = ResponseRequest;
    type Output = GeneratedResponse;

    fn name(&self) -> &str {
        &self.name
    }

    fn validate(&self, input: &ResponseRequest) -> bool {
        !input.query.trim().is_empty()
    }

    async fn process(&self, input: ResponseRequest) -> AgentResult<GeneratedResponse> {
        let prompt = self.build_prompt(&input.query, &input.context);

        let response = self
            .backend
            .generate_with(&prompt, self.config.temperature, self.config.max_tokens)
            .await?
            .trim()
            .to_string();

        let quality_metrics = self.analyze_quality(&input.query, &response).await?;

        Ok(GeneratedResponse {
            query: input.query,
            response,
            quality_metrics,
            context_used: input.context.len(),
        })
    }

    fn status(&self) -> AgentStatus {
        AgentStatus {
            name: self.name.clone(),
            status: "operational".to_string(),
            config: serde_json::to_value(&self.config).unwrap_or(serde_json::Value::Null),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::agent::AgentError;
    use triptych_llm::MockBackend;

    fn context(docs: &[&str]) -> Vec<RetrievedDocument> {
        docs.iter()
            .enumerate()
            .map(|(i, doc)| RetrievedDocument {
                document: doc.to_string(),
                score: 0.9,
                index: i,
            })
            .collect()
    }

    fn agent_with(backend: MockBackend) -> ResponseAgent {
        ResponseAgent::new(ResponseAgentConfig::default(), Arc::new(backend))
    }

    #[tokio::test]
    async fn test_process_generates_and_scores() {
        let backend = MockBackend::new()
            .with_response(
                "Based on the following context",
                "  Peers endorse transactions before ordering.  ",
            )
            .with_response(
                "Analyze the following FAQ response",
                r#"{"relevance_score": 5, "accuracy_score": 4, "clarity_score": 5, "context_usage_score": 4, "suggested_improvements": ["cite the documentation"]}"#,
            );

        let output = agent_with(backend)
            .run(ResponseRequest {
                query: "What do peers do?".to_string(),
                context: context(&["Peers endorse transactions."]),
            })
            .await
            .unwrap();

        assert_eq!(output.response, "Peers endorse transactions before ordering.");
        assert_eq!(output.quality_metrics.relevance, 5);
        assert_eq!(output.quality_metrics.context_usage, 4);
        assert_eq!(output.context_used, 1);
    }

    #[tokio::test]
    async fn test_unparseable_quality_reply_falls_back() {
        let backend = MockBackend::new()
            .with_response("Based on the following context", "An answer.")
            .with_response("Analyze the following FAQ response", "Looks good to me!");

        let output = agent_with(backend)
            .run(ResponseRequest {
                query: "Anything?".to_string(),
                context: context(&["doc"]),
            })
            .await
            .unwrap();

        assert_eq!(output.quality_metrics, QualityMetrics::fallback());
        assert_eq!(
            output.quality_metrics.suggested_improvements,
            vec!["Unable to analyze response quality"]
        );
    }

    #[tokio::test]
    async fn test_partial_quality_reply_fills_neutral_scores() {
        let backend = MockBackend::new()
            .with_response("Based on the following context", "An answer.")
            .with_response(
                "Analyze the following FAQ response",
                r#"{"relevance_score": 5}"#,
            );

        let output = agent_with(backend)
            .run(ResponseRequest {
                query: "Anything?".to_string(),
                context: context(&["doc"]),
            })
            .await
            .unwrap();

        assert_eq!(output.quality_metrics.relevance, 5);
        assert_eq!(output.quality_metrics.accuracy, 3);
        assert!(output.quality_metrics.suggested_improvements.is_empty());
    }

    #[tokio::test]
    async fn test_empty_context_still_generates() {
        let backend = MockBackend::new()
            .with_response("Based on the following context", "No material available.");

        let output = agent_with(backend)
            .run(ResponseRequest {
                query: "What about refunds?".to_string(),
                context: Vec::new(),
            })
            .await
            .unwrap();

        assert_eq!(output.context_used, 0);
        assert!(!output.response.is_empty());
    }

    #[tokio::test]
    async fn test_blank_query_rejected() {
        let err = agent_with(MockBackend::new())
            .run(ResponseRequest {
                query: String::new(),
                context: Vec::new(),
            })
            .await
            .unwrap_err();

        assert!(matches!(err, AgentError::InvalidInput(name) if name == "response_generation"));
    }

    #[test]
    fn test_prompt_numbers_context_documents() {
        let agent = agent_with(MockBackend::new());
        let prompt = agent.build_prompt("q", &context(&["first doc", "second doc"]));

        assert!(prompt.contains("Document 1:\nfirst doc"));
        assert!(prompt.contains("Document 2:\nsecond doc"));
        assert!(prompt.contains(&ResponseAgentConfig::default().system_prompt));
    }
}
