//! Retrieval agent: in-memory document store plus similarity search.

use crate::agent::{Agent, AgentError, AgentResult, AgentStatus};
use crate::config::RetrievalAgentConfig;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};
use triptych_embeddings::Embedder;
use triptych_index::{FlatL2Index, NO_MATCH};

/// Marker placed in [`RetrievalResult::error`] while no documents have been
/// indexed. A recoverable condition, not a stage failure.
pub const INDEX_NOT_READY: &str = "Index not initialized";

/// Input for the retrieval stage.
#[derive(Debug, Clone)]
pub struct RetrievalRequest {
    pub query: String,
    pub top_k: usize,
}

/// A single retrieved document with its similarity score.
///
/// `score` is `1 / (1 + distance)`: in `(0, 1]`, strictly decreasing in the
/// raw distance. `index` is the document's insertion position.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RetrievedDocument {
    pub document: String,
    pub score: f32,
    pub index: usize,
}

/// Output of the retrieval stage, sorted by descending score.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RetrievalResult {
    pub query: String,
    pub results: Vec<RetrievedDocument>,
    pub total_results: usize,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl RetrievalResult {
    fn not_ready(query: String) -> Self {
        Self {
            query,
            results: Vec::new(),
            total_results: 0,
            error: Some(INDEX_NOT_READY.to_string()),
        }
    }
}

/// Index statistics for status reports.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IndexStats {
    pub total_documents: usize,
    pub dimension: usize,
    pub index_type: String,
}

/// Documents and their index share one lock: the index position of vector
/// `i` must always refer to `documents[i]`.
struct DocumentStore {
    index: Option<FlatL2Index>,
    documents: Vec<String>,
}

/// Second pipeline stage: embeds the query and finds the nearest documents.
///
/// The only stateful agent. The store is append-only between clears; the
/// index is created lazily on the first `add_documents`.
pub struct RetrievalAgent {
    name: String,
    config: RetrievalAgentConfig,
    embedder: Arc<dyn Embedder>,
    dimension: usize,
    store: RwLock<DocumentStore>,
}

impl RetrievalAgent {
    pub fn new(config: RetrievalAgentConfig, embedder: Arc<dyn Embedder>) -> Self {
        let dimension = embedder.dimension();
        Self {
            name: "retrieval".to_string(),
            config,
            embedder,
            dimension,
            store: RwLock::new(DocumentStore {
                index: None,
                documents: Vec::new(),
            }),
        }
    }

    /// Embed and index a batch of documents. A no-op on an empty batch.
    pub async fn add_documents(&self, documents: &[String]) -> AgentResult<()> {
        if documents.is_empty() {
            return Ok(());
        }

        // Embed before taking the lock; the lock never spans an await
        let embeddings = self.embedder.encode(documents).await?;

        let mut guard = self.write_store()?;
        let store = &mut *guard;
        let index = store
            .index
            .get_or_insert_with(|| FlatL2Index::new(self.dimension));
        index.add(&embeddings)?;
        store.documents.extend_from_slice(documents);
        Ok(())
    }

    /// Drop the index and all documents. Idempotent.
    pub fn clear_index(&self) -> AgentResult<()> {
        let mut store = self.write_store()?;
        store.index = None;
        store.documents.clear();
        Ok(())
    }

    pub fn get_index_stats(&self) -> AgentResult<IndexStats> {
        let store = self.read_store()?;
        let index_type = if store.index.is_some() {
            "FlatL2"
        } else {
            "Not initialized"
        };

        Ok(IndexStats {
            total_documents: store.documents.len(),
            dimension: self.dimension,
            index_type: index_type.to_string(),
        })
    }

    fn read_store(&self) -> AgentResult<RwLockReadGuard<'_, DocumentStore>> {
        self.store
            .read()
            .map_err(|e| AgentError::Internal(format!("Failed to acquire read lock: {}", e)))
    }

    fn write_store(&self) -> AgentResult<RwLockWriteGuard<'_, DocumentStore>> {
        self.store
            .write()
            .map_err(|e| AgentError::Internal(format!("Failed to acquire write lock: {}", e)))
    }
}

#[async_trait]
impl Agent for RetrievalAgent {
    type Input = RetrievalRequest;
    type Output = RetrievalResult;

    fn name(&self) -> &str {
        &self.name
    }

    fn validate(&self, input: &RetrievalRequest) -> bool {
        !input.query.trim().is_empty()
    }

    async fn process(&self, input: RetrievalRequest) -> AgentResult<RetrievalResult> {
        {
            let store = self.read_store()?;
            if store.index.is_none() {
                return Ok(RetrievalResult::not_ready(input.query));
            }
        }

        let query_embedding = self.embedder.encode_one(&input.query).await?;

        let store = self.read_store()?;
        let Some(index) = store.index.as_ref() else {
            // Cleared between the check and the search
            return Ok(RetrievalResult::not_ready(input.query));
        };

        let (distances, indices) = index.search(&query_embedding, input.top_k)?;

        let results: Vec<RetrievedDocument> = distances
            .iter()
            .zip(indices.iter())
            .filter(|(_, idx)| **idx != NO_MATCH)
            .map(|(distance, idx)| RetrievedDocument {
                document: store.documents[*idx as usize].clone(),
                score: 1.0 / (1.0 + distance),
                index: *idx as usize,
            })
            .collect();

        let total_results = results.len();
        Ok(RetrievalResult {
            query: input.query,
            results,
            total_results,
            error: None,
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
    use triptych_embeddings::HashEmbedder;

    fn agent() -> RetrievalAgent {
        RetrievalAgent::new(
            RetrievalAgentConfig::default(),
            Arc::new(HashEmbedder::default_dimension()),
        )
    }

    fn request(query: &str, top_k: usize) -> RetrievalRequest {
        RetrievalRequest {
            query: query.to_string(),
            top_k,
        }
    }

    #[tokio::test]
    async fn test_search_before_ingestion_reports_not_ready() {
        let agent = agent();
        let result = agent.run(request("anything", 3)).await.unwrap();

        assert_eq!(result.error.as_deref(), Some(INDEX_NOT_READY));
        assert!(result.results.is_empty());
        assert_eq!(result.total_results, 0);
    }

    #[tokio::test]
    async fn test_search_finds_closest_document() {
        let agent = agent();
        agent
            .add_documents(&[
                "Channels partition the ledger between organizations".to_string(),
                "Bananas ripen faster in paper bags".to_string(),
            ])
            .await
            .unwrap();

        let result = agent
            .run(request("how do channels partition the ledger", 1))
            .await
            .unwrap();

        assert_eq!(result.total_results, 1);
        assert!(result.results[0].document.contains("Channels"));
        assert!(result.error.is_none());
    }

    #[tokio::test]
    async fn test_scores_descend_and_stay_in_range() {
        let agent = agent();
        agent
            .add_documents(&[
                "orderer nodes sequence transactions".to_string(),
                "peers endorse proposals".to_string(),
                "chaincode runs in containers".to_string(),
            ])
            .await
            .unwrap();

        let result = agent
            .run(request("how are transactions sequenced", 3))
            .await
            .unwrap();

        assert_eq!(result.total_results, 3);
        for pair in result.results.windows(2) {
            assert!(
                pair[0].score >= pair[1].score,
                "scores must be descending: {} then {}",
                pair[0].score,
                pair[1].score
            );
        }
        for doc in &result.results {
            assert!(doc.score > 0.0 && doc.score <= 1.0);
        }
    }

    #[tokio::test]
    async fn test_top_k_beyond_corpus_skips_sentinels() {
        let agent = agent();
        agent
            .add_documents(&["only one document".to_string()])
            .await
            .unwrap();

        let result = agent.run(request("document", 5)).await.unwrap();
        assert_eq!(result.total_results, 1);
    }

    #[tokio::test]
    async fn test_add_documents_accumulates() {
        let agent = agent();
        agent
            .add_documents(&["first".to_string(), "second".to_string()])
            .await
            .unwrap();
        agent.add_documents(&[]).await.unwrap();
        agent.add_documents(&["third".to_string()]).await.unwrap();

        let stats = agent.get_index_stats().unwrap();
        assert_eq!(stats.total_documents, 3);
        assert_eq!(stats.index_type, "FlatL2");
        assert_eq!(stats.dimension, 384);
    }

    #[tokio::test]
    async fn test_clear_index_resets_and_is_idempotent() {
        let agent = agent();
        agent.add_documents(&["doc".to_string()]).await.unwrap();

        agent.clear_index().unwrap();
        agent.clear_index().unwrap();

        let stats = agent.get_index_stats().unwrap();
        assert_eq!(stats.total_documents, 0);
        assert_eq!(stats.index_type, "Not initialized");

        let result = agent.run(request("doc", 1)).await.unwrap();
        assert_eq!(result.error.as_deref(), Some(INDEX_NOT_READY));
    }

    #[tokio::test]
    async fn test_indices_stay_stable_across_adds() {
        let agent = agent();
        agent.add_documents(&["alpha alpha".to_string()]).await.unwrap();
        agent.add_documents(&["beta beta".to_string()]).await.unwrap();

        let result = agent.run(request("beta beta", 1)).await.unwrap();
        assert_eq!(result.results[0].index, 1);
        assert_eq!(result.results[0].document, "beta beta");
    }

    #[tokio::test]
    async fn test_blank_query_rejected() {
        let err = agent().run(request("  ", 3)).await.unwrap_err();
        assert!(matches!(err, AgentError::InvalidInput(name) if name == "retrieval"));
    }
}
