//! JSON-persisted vector collections with cosine-similarity search

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::debug;
use uuid::Uuid;

use crate::embed::Embedder;
use crate::{IndexError, Result};

/// A document to index
#[derive(Debug, Clone)]
pub struct Document {
    pub text: String,
    pub source: String,
}

impl Document {
    pub fn new(text: impl Into<String>, source: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            source: source.into(),
        }
    }
}

/// One embedded chunk inside a collection
#[derive(Debug, Clone, Serialize, Deserialize)]
struct StoredChunk {
    id: String,
    text: String,
    source: String,
    vector: Vec<f32>,
}

/// A search result
#[derive(Debug, Clone)]
pub struct SearchHit {
    pub score: f32,
    pub text: String,
    pub source: String,
}

fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    if a.len() != b.len() || a.is_empty() {
        return 0.0;
    }
    let dot: f32 = a.iter().zip(b.iter()).map(|(x, y)| x * y).sum();
    let norm_a: f32 = a.iter().map(|x| x * x).sum::<f32>().sqrt();
    let norm_b: f32 = b.iter().map(|x| x * x).sum::<f32>().sqrt();
    if norm_a == 0.0 || norm_b == 0.0 {
        return 0.0;
    }
    (dot / (norm_a * norm_b)).clamp(-1.0, 1.0)
}

/// Root of all persisted collections
pub struct VectorStore {
    dir: PathBuf,
}

impl VectorStore {
    pub fn new(dir: impl AsRef<Path>) -> Self {
        Self {
            dir: dir.as_ref().to_path_buf(),
        }
    }

    fn collection_path(&self, name: &str) -> PathBuf {
        let safe_name: String = name
            .chars()
            .map(|c| match c {
                '<' | '>' | ':' | '"' | '/' | '\\' | '|' | '?' | '*' => '_',
                _ => c,
            })
            .collect();
        self.dir.join(format!("{}.json", safe_name))
    }

    pub fn exists(&self, name: &str) -> bool {
        self.collection_path(name).exists()
    }

    /// Open an existing collection
    pub async fn open(&self, name: &str) -> Result<Collection> {
        let path = self.collection_path(name);
        if !path.exists() {
            return Err(IndexError::CollectionNotFound(name.to_string()));
        }
        let content = tokio::fs::read_to_string(&path).await?;
        let chunks: Vec<StoredChunk> = serde_json::from_str(&content)?;
        debug!("opened collection {} ({} chunks)", name, chunks.len());
        Ok(Collection {
            name: name.to_string(),
            path,
            chunks,
        })
    }

    /// Open a collection, creating an empty one if absent
    pub async fn open_or_create(&self, name: &str) -> Result<Collection> {
        match self.open(name).await {
            Ok(collection) => Ok(collection),
            Err(IndexError::CollectionNotFound(_)) => Ok(Collection {
                name: name.to_string(),
                path: self.collection_path(name),
                chunks: Vec::new(),
            }),
            Err(e) => Err(e),
        }
    }

    /// Names of all persisted collections
    pub async fn list(&self) -> Vec<String> {
        let mut names = Vec::new();
        if let Ok(mut entries) = tokio::fs::read_dir(&self.dir).await {
            while let Ok(Some(entry)) = entries.next_entry().await {
                if let Some(name) = entry.file_name().to_str() {
                    if let Some(stripped) = name.strip_suffix(".json") {
                        names.push(stripped.to_string());
                    }
                }
            }
        }
        names.sort();
        names
    }
}

/// An in-memory collection, persisted on demand
pub struct Collection {
    name: String,
    path: PathBuf,
    chunks: Vec<StoredChunk>,
}

impl Collection {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn len(&self) -> usize {
        self.chunks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.chunks.is_empty()
    }

    /// Embed and add documents; call `persist` to write them out
    pub async fn add(&mut self, documents: &[Document], embedder: &dyn Embedder) -> Result<usize> {
        if documents.is_empty() {
            return Ok(0);
        }

        let texts: Vec<String> = documents.iter().map(|d| d.text.clone()).collect();
        let vectors = embedder.embed(&texts).await?;
        if vectors.len() != documents.len() {
            return Err(IndexError::Embed(format!(
                "expected {} vectors, got {}",
                documents.len(),
                vectors.len()
            )));
        }

        for (document, vector) in documents.iter().zip(vectors) {
            self.chunks.push(StoredChunk {
                id: Uuid::new_v4().to_string(),
                text: document.text.clone(),
                source: document.source.clone(),
                vector,
            });
        }

        Ok(documents.len())
    }

    /// Top-k chunks by cosine similarity to the query vector
    pub fn search(&self, query_vector: &[f32], top_k: usize) -> Vec<SearchHit> {
        let mut scored: Vec<(f32, &StoredChunk)> = self
            .chunks
            .iter()
            .map(|c| (cosine_similarity(&c.vector, query_vector), c))
            .collect();
        scored.sort_by(|a, b| b.0.partial_cmp(&a.0).unwrap_or(std::cmp::Ordering::Equal));
        scored
            .into_iter()
            .take(top_k)
            .map(|(score, c)| SearchHit {
                score,
                text: c.text.clone(),
                source: c.source.clone(),
            })
            .collect()
    }

    /// Embed the query text and search
    pub async fn query(
        &self,
        query: &str,
        top_k: usize,
        embedder: &dyn Embedder,
    ) -> Result<Vec<SearchHit>> {
        let vectors = embedder.embed(&[query.to_string()]).await?;
        let query_vector = vectors
            .into_iter()
            .next()
            .ok_or_else(|| IndexError::Embed("empty embedding response".to_string()))?;
        Ok(self.search(&query_vector, top_k))
    }

    /// Write the collection to disk
    pub async fn persist(&self) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }
        let content = serde_json::to_string(&self.chunks)?;
        tokio::fs::write(&self.path, content).await?;
        debug!("persisted collection {} ({} chunks)", self.name, self.chunks.len());
        Ok(())
    }
}
