//! # Triptych Agents
//!
//! The three-stage FAQ answering pipeline: query understanding, document
//! retrieval, and response generation, coordinated by an [`Orchestrator`].
//!
//! Each stage implements the [`Agent`] contract (validate, then process);
//! the orchestrator sequences them and folds any stage failure into a
//! structured error result, so callers always receive a well-formed
//! [`PipelineResult`].
//!
//! ## Usage
//!
//! ```rust,ignore
//! use triptych_agents::{Orchestrator, PipelineConfig};
//!
//! let orchestrator = Orchestrator::new(PipelineConfig::from_env());
//! orchestrator.add_documents(&docs).await?;
//! let result = orchestrator.process_query("How do channels work?", 3).await;
//! ```

mod agent;
mod config;
mod orchestrator;
mod query;
mod response;
mod retrieval;

pub use agent::{Agent, AgentError, AgentResult, AgentStatus};
pub use config::{PipelineConfig, QueryAgentConfig, ResponseAgentConfig, RetrievalAgentConfig};
pub use orchestrator::{Orchestrator, PipelineResult, PipelineStatus, SystemStatus};
pub use query::{QueryAgent, QueryAnalysis, QueryMetadata};
pub use response::{GeneratedResponse, QualityMetrics, ResponseAgent, ResponseRequest};
pub use retrieval::{
    IndexStats, RetrievalAgent, RetrievalRequest, RetrievalResult, RetrievedDocument,
    INDEX_NOT_READY,
};
