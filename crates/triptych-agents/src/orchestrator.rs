//! Pipeline orchestration with a single failure boundary.

use crate::agent::{Agent, AgentResult, AgentStatus};
use crate::config::PipelineConfig;
use crate::query::{QueryAgent, QueryAnalysis};
use crate::response::{GeneratedResponse, ResponseAgent, ResponseRequest};
use crate::retrieval::{IndexStats, RetrievalAgent, RetrievalRequest, RetrievalResult};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{debug, info, warn};
use triptych_embeddings::{Embedder, GeminiEmbedder, HashEmbedder};
use triptych_llm::{GeminiBackend, GenerationBackend, LlmConfig};

/// Terminal state of one pipeline run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PipelineStatus {
    Success,
    Error,
}

/// Aggregated outcome of one [`Orchestrator::process_query`] call.
///
/// Always well-formed: stage failures surface as `status == Error` with the
/// message in `error`, never as an `Err` from the orchestrator.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PipelineResult {
    pub status: PipelineStatus,
    pub query: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub query_analysis: Option<QueryAnalysis>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub retrieval_results: Option<RetrievalResult>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub response: Option<GeneratedResponse>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl PipelineResult {
    fn success(
        query: String,
        analysis: QueryAnalysis,
        retrieval: RetrievalResult,
        response: GeneratedResponse,
    ) -> Self {
        Self {
            status: PipelineStatus::Success,
            query,
            query_analysis: Some(analysis),
            retrieval_results: Some(retrieval),
            response: Some(response),
            error: None,
        }
    }

    fn failure(query: String, error: String) -> Self {
        Self {
            status: PipelineStatus::Error,
            query,
            query_analysis: None,
            retrieval_results: None,
            response: None,
            error: Some(error),
        }
    }
}

/// System-wide status snapshot.
#[derive(Debug, Clone, Serialize)]
pub struct SystemStatus {
    pub query_agent: AgentStatus,
    pub retrieval_agent: AgentStatus,
    pub response_agent: AgentStatus,
    pub index_stats: IndexStats,
}

/// Owns the three pipeline agents and drives the fixed
/// query → retrieval → response sequence.
pub struct Orchestrator {
    query_agent: QueryAgent,
    retrieval_agent: RetrievalAgent,
    response_agent: ResponseAgent,
}

impl Orchestrator {
    /// Build the pipeline from configuration: Gemini generation backends for
    /// both LLM agents plus the configured embedder.
    pub fn new(config: PipelineConfig) -> Self {
        let query_backend: Arc<dyn GenerationBackend> = Arc::new(GeminiBackend::with_config(
            &config.api_key,
            LlmConfig::default()
                .with_model(config.query.model.clone())
                .with_max_tokens(config.query.max_tokens)
                .with_temperature(config.query.temperature),
        ));
        let response_backend: Arc<dyn GenerationBackend> = Arc::new(GeminiBackend::with_config(
            &config.api_key,
            LlmConfig::default()
                .with_model(config.response.model.clone())
                .with_max_tokens(config.response.max_tokens)
                .with_temperature(config.response.temperature),
        ));
        let embedder = build_embedder(&config);

        Self::with_backends(config, query_backend, embedder, response_backend)
    }

    /// Build the pipeline with injected backends.
    pub fn with_backends(
        config: PipelineConfig,
        query_backend: Arc<dyn GenerationBackend>,
        embedder: Arc<dyn Embedder>,
        response_backend: Arc<dyn GenerationBackend>,
    ) -> Self {
        Self {
            query_agent: QueryAgent::new(config.query, query_backend),
            retrieval_agent: RetrievalAgent::new(config.retrieval, embedder),
            response_agent: ResponseAgent::new(config.response, response_backend),
        }
    }

    /// Run the full pipeline for one query.
    ///
    /// Never fails: any stage error is folded into an error-status result
    /// carrying the message and the original query.
    pub async fn process_query(&self, query: &str, top_k: usize) -> PipelineResult {
        match self.run_pipeline(query, top_k).await {
            Ok(result) => result,
            Err(e) => {
                warn!(query, error = %e, "pipeline run failed");
                PipelineResult::failure(query.to_string(), e.to_string())
            }
        }
    }

    async fn run_pipeline(&self, query: &str, top_k: usize) -> AgentResult<PipelineResult> {
        debug!(query, "analyzing query");
        let analysis = self.query_agent.run(query.to_string()).await?;

        debug!(concepts = analysis.concepts.len(), "retrieving documents");
        let retrieval = self
            .retrieval_agent
            .run(RetrievalRequest {
                query: query.to_string(),
                top_k,
            })
            .await?;

        debug!(results = retrieval.results.len(), "generating response");
        let response = self
            .response_agent
            .run(ResponseRequest {
                query: query.to_string(),
                context: retrieval.results.clone(),
            })
            .await?;

        Ok(PipelineResult::success(
            query.to_string(),
            analysis,
            retrieval,
            response,
        ))
    }

    /// Add documents to the retrieval index.
    pub async fn add_documents(&self, documents: &[String]) -> AgentResult<()> {
        info!(count = documents.len(), "adding documents");
        self.retrieval_agent.add_documents(documents).await
    }

    /// Drop the index and all stored documents.
    pub fn clear_index(&self) -> AgentResult<()> {
        info!("clearing document index");
        self.retrieval_agent.clear_index()
    }

    /// Aggregate status of the three agents plus index statistics.
    pub fn system_status(&self) -> AgentResult<SystemStatus> {
        Ok(SystemStatus {
            query_agent: self.query_agent.status(),
            retrieval_agent: self.retrieval_agent.status(),
            response_agent: self.response_agent.status(),
            index_stats: self.retrieval_agent.get_index_stats()?,
        })
    }
}

fn build_embedder(config: &PipelineConfig) -> Arc<dyn Embedder> {
    if config.retrieval.model_name == "feature-hash" {
        Arc::new(HashEmbedder::default_dimension())
    } else {
        // Google embedding models are 768-dimensional
        Arc::new(GeminiEmbedder::with_model(
            &config.api_key,
            &config.retrieval.model_name,
            768,
        ))
    }
}
