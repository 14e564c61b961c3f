//! # Triptych LLM
//!
//! Text-generation backends for the triptych RAG pipeline.
//!
//! The pipeline agents talk to a [`GenerationBackend`] for query analysis,
//! answer synthesis, and response scoring. The concrete backend is the
//! Google Gemini REST API; [`MockBackend`] keeps tests offline.
//!
//! ## Usage
//!
//! ```rust,ignore
//! use triptych_llm::{GeminiBackend, GenerationBackend};
//!
//! let backend = GeminiBackend::from_env()?;
//! let answer = backend.generate("Summarize the refund policy.").await?;
//! ```

mod backend;
mod gemini;

pub use backend::{extract_json_object, GenerationBackend, LlmConfig, LlmError, LlmResult, MockBackend};
pub use gemini::GeminiBackend;
