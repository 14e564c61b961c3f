//! Hash-based embedder (no external dependencies).
//!
//! Creates embeddings by hashing words into a fixed-dimension space with
//! multiple hash functions. Not as semantically rich as neural embeddings,
//! but deterministic, fast, and fully offline.

use crate::{Embedder, EmbeddingResult};
use async_trait::async_trait;
use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};

/// Feature-hashing embedder.
///
/// The default dimension (384) matches the sentence-transformer models this
/// embedder stands in for, so indexes built against either stay compatible.
pub struct HashEmbedder {
    dimension: usize,
    num_hashes: usize,
}

impl HashEmbedder {
    /// Create a new hash embedder with the specified dimension.
    pub fn new(dimension: usize) -> Self {
        Self {
            dimension,
            num_hashes: 4, // Multiple hashes for better distribution
        }
    }

    /// Create with the default dimension (384).
    pub fn default_dimension() -> Self {
        Self::new(384)
    }

    /// Tokenize text into words.
    fn tokenize(&self, text: &str) -> Vec<String> {
        text.to_lowercase()
            .split(|c: char| !c.is_alphanumeric())
            .filter(|s| s.len() > 1)
            .map(|s| s.to_string())
            .collect()
    }

    /// Hash a word with a seed to get an index.
    fn hash_with_seed(&self, word: &str, seed: u64) -> usize {
        let mut hasher = DefaultHasher::new();
        seed.hash(&mut hasher);
        word.hash(&mut hasher);
        (hasher.finish() as usize) % self.dimension
    }

    /// Hash a word with a seed to get a sign (+1 or -1).
    fn sign_hash(&self, word: &str, seed: u64) -> f32 {
        let mut hasher = DefaultHasher::new();
        (seed + 1000).hash(&mut hasher);
        word.hash(&mut hasher);
        if hasher.finish() % 2 == 0 {
            1.0
        } else {
            -1.0
        }
    }

    fn embed(&self, text: &str) -> Vec<f32> {
        let tokens = self.tokenize(text);
        if tokens.is_empty() {
            // Zero vector for text with no valid tokens
            return vec![0.0; self.dimension];
        }

        let mut vector = vec![0.0f32; self.dimension];

        // Use multiple hash functions for each token
        for token in &tokens {
            for seed in 0..self.num_hashes as u64 {
                let idx = self.hash_with_seed(token, seed);
                let sign = self.sign_hash(token, seed);
                vector[idx] += sign;
            }
        }

        // Normalize by token count and number of hashes
        let scale = 1.0 / ((tokens.len() * self.num_hashes) as f32).sqrt();
        for v in &mut vector {
            *v *= scale;
        }

        // L2 normalize
        let norm: f32 = vector.iter().map(|x| x * x).sum::<f32>().sqrt();
        if norm > 0.0 {
            for v in &mut vector {
                *v /= norm;
            }
        }

        vector
    }
}

impl Default for HashEmbedder {
    fn default() -> Self {
        Self::default_dimension()
    }
}

#[async_trait]
impl Embedder for HashEmbedder {
    fn model_name(&self) -> &str {
        "feature-hash"
    }

    fn dimension(&self) -> usize {
        self.dimension
    }

    async fn encode(&self, texts: &[String]) -> EmbeddingResult<Vec<Vec<f32>>> {
        Ok(texts.iter().map(|t| self.embed(t)).collect())
    }
}
