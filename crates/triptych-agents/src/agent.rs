//! Capability contract shared by the pipeline stages.

use async_trait::async_trait;
use serde::Serialize;
use thiserror::Error;
use triptych_embeddings::EmbeddingError;
use triptych_index::IndexError;
use triptych_llm::LlmError;

/// Agent-level errors.
#[derive(Debug, Error)]
pub enum AgentError {
    #[error("Invalid input data for agent {0}")]
    InvalidInput(String),

    #[error("Generation backend error: {0}")]
    Generation(#[from] LlmError),

    #[error("Embedding backend error: {0}")]
    Embedding(#[from] EmbeddingError),

    #[error("Index error: {0}")]
    Index(#[from] IndexError),

    #[error("Internal error: {0}")]
    Internal(String),
}

/// Result type for agent operations.
pub type AgentResult<T> = Result<T, AgentError>;

/// Operational snapshot of one agent.
#[derive(Debug, Clone, Serialize)]
pub struct AgentStatus {
    pub name: String,
    pub status: String,
    pub config: serde_json::Value,
}

/// Uniform lifecycle for the pipeline stages.
///
/// Construction is the initialization step; anything that can fail there
/// fails before the agent exists. `run` is the entry point the orchestrator
/// uses: validate first, then process.
#[async_trait]
pub trait Agent: Send + Sync {
    type Input: Send + 'static;
    type Output: Send;

    /// Agent name, used in status reports and validation errors.
    fn name(&self) -> &str;

    /// Check an input without side effects.
    fn validate(&self, input: &Self::Input) -> bool;

    /// Do the agent's work on an already-validated input.
    async fn process(&self, input: Self::Input) -> AgentResult<Self::Output>;

    /// Validate, then process. Rejected inputs fail with
    /// [`AgentError::InvalidInput`] naming this agent.
    async fn run(&self, input: Self::Input) -> AgentResult<Self::Output> {
        if !self.validate(&input) {
            return Err(AgentError::InvalidInput(self.name().to_string()));
        }
        self.process(input).await
    }

    /// Status snapshot for aggregation by the orchestrator.
    fn status(&self) -> AgentStatus;
}
