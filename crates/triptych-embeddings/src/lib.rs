//! # Triptych Embeddings
//!
//! Embedding backends for the triptych RAG pipeline.
//!
//! The retrieval agent converts documents and queries to dense vectors
//! through the [`Embedder`] trait. Two implementations are provided:
//!
//! - [`HashEmbedder`]: deterministic feature hashing, no network, no model
//!   files. The default, and what every test runs on.
//! - [`GeminiEmbedder`]: the Google embedding REST API.
//!
//! ## Usage
//!
//! ```rust
//! use triptych_embeddings::{Embedder, HashEmbedder};
//!
//! # #[tokio::main(flavor = "current_thread")]
//! # async fn main() {
//! let embedder = HashEmbedder::default_dimension();
//! let vector = embedder.encode_one("cell membrane transport").await.unwrap();
//! assert_eq!(vector.len(), 384);
//! # }
//! ```

use async_trait::async_trait;
use thiserror::Error;

mod gemini;
mod hash;

pub use gemini::GeminiEmbedder;
pub use hash::HashEmbedder;

/// Embedding error types.
#[derive(Debug, Error)]
pub enum EmbeddingError {
    #[error("API error: {0}")]
    ApiError(String),

    #[error("Connection failed: {0}")]
    ConnectionFailed(String),

    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    #[error("Authentication failed")]
    AuthenticationFailed,

    #[error("Timeout after {0} seconds")]
    Timeout(u32),
}

/// Result type for embedding operations.
pub type EmbeddingResult<T> = Result<T, EmbeddingError>;

/// Core trait for embedding providers.
///
/// Implementors convert text to dense fixed-dimension vectors. The dimension
/// is stable for the lifetime of the embedder; downstream indexes size
/// themselves from it once.
#[async_trait]
pub trait Embedder: Send + Sync {
    /// Get the model name/identifier.
    fn model_name(&self) -> &str;

    /// Get the embedding dimension.
    fn dimension(&self) -> usize;

    /// Embed a batch of texts, returning one vector per input in order.
    async fn encode(&self, texts: &[String]) -> EmbeddingResult<Vec<Vec<f32>>>;

    /// Embed a single text.
    async fn encode_one(&self, text: &str) -> EmbeddingResult<Vec<f32>> {
        let batch = [text.to_string()];
        let mut vectors = self.encode(&batch).await?;
        vectors
            .pop()
            .ok_or_else(|| EmbeddingError::InvalidResponse("Empty batch result".to_string()))
    }
}
