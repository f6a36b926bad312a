//! Embedding seam for the vector store

use async_trait::async_trait;
use std::sync::Arc;

use crate::{IndexError, Result};

/// Turns texts into vectors, one per input, in input order
#[async_trait]
pub trait Embedder: Send + Sync {
    async fn embed(&self, texts: &[String]) -> Result<Vec<Vec<f32>>>;
}

/// Embedder backed by a configured LLM provider
pub struct ProviderEmbedder {
    provider: Arc<dyn presage_provider::Provider>,
}

impl ProviderEmbedder {
    pub fn new(provider: Arc<dyn presage_provider::Provider>) -> Self {
        Self { provider }
    }
}

#[async_trait]
impl Embedder for ProviderEmbedder {
    async fn embed(&self, texts: &[String]) -> Result<Vec<Vec<f32>>> {
        self.provider
            .embed(texts)
            .await
            .map_err(IndexError::Provider)
    }
}

/// Deterministic hash-based embedder, for tests and offline runs.
/// Same text always yields the same vector.
#[derive(Debug, Clone)]
pub struct MockEmbedder {
    dimension: usize,
}

impl MockEmbedder {
    pub fn new(dimension: usize) -> Self {
        Self { dimension }
    }
}

impl Default for MockEmbedder {
    fn default() -> Self {
        Self::new(8)
    }
}

#[async_trait]
impl Embedder for MockEmbedder {
    async fn embed(&self, texts: &[String]) -> Result<Vec<Vec<f32>>> {
        use std::collections::hash_map::DefaultHasher;
        use std::hash::{Hash, Hasher};

        let mut vectors = Vec::with_capacity(texts.len());
        for text in texts {
            let mut vector = Vec::with_capacity(self.dimension);
            for i in 0..self.dimension {
                let mut hasher = DefaultHasher::new();
                text.hash(&mut hasher);
                (i as u64).hash(&mut hasher);
                vector.push((hasher.finish() % 1000) as f32 / 1000.0);
            }
            vectors.push(vector);
        }
        Ok(vectors)
    }
}
