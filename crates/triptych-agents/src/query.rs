//! Query-understanding agent: concepts, reformulations, and metadata.

use crate::agent::{Agent, AgentResult, AgentStatus};
use crate::config::QueryAgentConfig;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use triptych_llm::{extract_json_object, GenerationBackend};

fn default_query_type() -> String {
    "unknown".to_string()
}

fn default_level() -> u8 {
    3
}

/// Structured metadata about a query.
///
/// Every field has a neutral default so a partially-formed reply from the
/// backend still yields usable metadata.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QueryMetadata {
    #[serde(default = "default_query_type")]
    pub query_type: String,
    #[serde(default = "default_level")]
    pub priority: u8,
    #[serde(default = "default_level")]
    pub complexity: u8,
    #[serde(default)]
    pub required_context: Vec<String>,
}

impl Default for QueryMetadata {
    fn default() -> Self {
        Self {
            query_type: default_query_type(),
            priority: default_level(),
            complexity: default_level(),
            required_context: Vec::new(),
        }
    }
}

/// Output of the query-understanding stage.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QueryAnalysis {
    pub original_query: String,
    pub concepts: Vec<String>,
    pub reformulations: Vec<String>,
    pub metadata: QueryMetadata,
}

/// First pipeline stage: turns a raw query into concepts, reformulations,
/// and routing metadata via three generation calls.
pub struct QueryAgent {
    name: String,
    config: QueryAgentConfig,
    backend: Arc<dyn GenerationBackend>,
}

impl QueryAgent {
    pub fn new(config: QueryAgentConfig, backend: Arc<dyn GenerationBackend>) -> Self {
        Self {
            name: "query_understanding".to_string(),
            config,
            backend,
        }
    }

    async fn generate(&self, prompt: &str) -> AgentResult<String> {
        Ok(self
            .backend
            .generate_with(prompt, self.config.temperature, self.config.max_tokens)
            .await?)
    }

    async fn extract_concepts(&self, query: &str) -> AgentResult<Vec<String>> {
        let prompt = format!(
            "Extract the key concepts from the following query. \
             Return only the concepts as a comma-separated list:\n\nQuery: {}",
            query
        );
        let response = self.generate(&prompt).await?;
        Ok(split_comma_list(&response))
    }

    async fn generate_reformulations(
        &self,
        query: &str,
        concepts: &[String],
    ) -> AgentResult<Vec<String>> {
        let prompt = format!(
            "Generate 3 alternative formulations of the following query, \
             focusing on these key concepts: {}\n\nOriginal query: {}\n\n\
             Return only the reformulations as a comma-separated list.",
            concepts.join(", "),
            query
        );
        let response = self.generate(&prompt).await?;
        Ok(split_comma_list(&response))
    }

    async fn analyze_query(&self, query: &str) -> AgentResult<QueryMetadata> {
        let prompt = format!(
            "Analyze the following query and return a JSON object with:\n\
             1. query_type (e.g., 'factual', 'procedural', 'conceptual')\n\
             2. priority (1-5, where 5 is highest)\n\
             3. complexity (1-5, where 5 is highest)\n\
             4. required_context (list of context types needed)\n\nQuery: {}",
            query
        );
        let response = self.generate(&prompt).await?;

        // Malformed analysis output degrades to the neutral default
        Ok(serde_json::from_str(extract_json_object(&response)).unwrap_or_default())
    }
}

#[async_trait]
impl Agent for QueryAgent {
    type Input = String;
    type Output = QueryAnalysis;

    fn name(&self) -> &str {
        &self.name
    }

    fn validate(&self, input: &String) -> bool {
        !input.trim().is_empty()
    }

    async fn process(&self, input: String) -> AgentResult<QueryAnalysis> {
        let concepts = self.extract_concepts(&input).await?;
        let reformulations = self.generate_reformulations(&input, &concepts).await?;
        let metadata = self.analyze_query(&input).await?;

        Ok(QueryAnalysis {
            original_query: input,
            concepts,
            reformulations,
            metadata,
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

fn split_comma_list(text: &str) -> Vec<String> {
    text.trim()
        .split(',')
        .map(|part| part.trim().to_string())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::agent::AgentError;
    use triptych_llm::MockBackend;

    fn agent_with(backend: MockBackend) -> QueryAgent {
        QueryAgent::new(QueryAgentConfig::default(), Arc::new(backend))
    }

    #[tokio::test]
    async fn test_process_assembles_analysis() {
        let backend = MockBackend::new()
            .with_response("Extract the key concepts", "refunds, billing cycle")
            .with_response("alternative formulations", "how do refunds work, refund policy, when am I refunded")
            .with_response(
                "Analyze the following query",
                r#"{"query_type": "procedural", "priority": 4, "complexity": 2, "required_context": ["billing docs"]}"#,
            );

        let analysis = agent_with(backend)
            .run("How do refunds work?".to_string())
            .await
            .unwrap();

        assert_eq!(analysis.original_query, "How do refunds work?");
        assert_eq!(analysis.concepts, vec!["refunds", "billing cycle"]);
        assert_eq!(analysis.reformulations.len(), 3);
        assert_eq!(analysis.metadata.query_type, "procedural");
        assert_eq!(analysis.metadata.priority, 4);
    }

    #[tokio::test]
    async fn test_malformed_analysis_falls_back() {
        let backend = MockBackend::new()
            .with_response("Analyze the following query", "Sorry, I cannot help with that.");

        let analysis = agent_with(backend)
            .run("What is a ledger?".to_string())
            .await
            .unwrap();

        assert_eq!(analysis.metadata, QueryMetadata::default());
        assert_eq!(analysis.metadata.query_type, "unknown");
        assert_eq!(analysis.metadata.priority, 3);
        assert!(analysis.metadata.required_context.is_empty());
    }

    #[tokio::test]
    async fn test_fenced_analysis_parses() {
        let backend = MockBackend::new().with_response(
            "Analyze the following query",
            "```json\n{\"query_type\": \"factual\", \"priority\": 5, \"complexity\": 1, \"required_context\": []}\n```",
        );

        let analysis = agent_with(backend)
            .run("What is chaincode?".to_string())
            .await
            .unwrap();

        assert_eq!(analysis.metadata.query_type, "factual");
        assert_eq!(analysis.metadata.priority, 5);
    }

    #[tokio::test]
    async fn test_partial_analysis_fills_field_defaults() {
        let backend = MockBackend::new()
            .with_response("Analyze the following query", r#"{"query_type": "factual"}"#);

        let analysis = agent_with(backend)
            .run("What is chaincode?".to_string())
            .await
            .unwrap();

        assert_eq!(analysis.metadata.query_type, "factual");
        assert_eq!(analysis.metadata.priority, 3);
        assert_eq!(analysis.metadata.complexity, 3);
    }

    #[tokio::test]
    async fn test_blank_query_rejected() {
        let err = agent_with(MockBackend::new())
            .run("   ".to_string())
            .await
            .unwrap_err();

        assert!(matches!(err, AgentError::InvalidInput(name) if name == "query_understanding"));
    }

    #[test]
    fn test_split_comma_list_trims_entries() {
        assert_eq!(
            split_comma_list(" a , b ,  c d "),
            vec!["a", "b", "c d"]
        );
    }
}
