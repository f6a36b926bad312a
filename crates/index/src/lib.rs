//! Local vector-indexed document store
//!
//! Documents are split into small chunks, embedded, and persisted as JSON
//! collections under the index directory. Retrieval is cosine similarity
//! over the chunk vectors; `QaChain` turns the top hits into an answer with
//! sources via a single chat completion.

use thiserror::Error;

pub mod chunk;
pub mod embed;
pub mod ingest;
pub mod qa;
pub mod store;

pub use chunk::Chunker;
pub use embed::{Embedder, MockEmbedder, ProviderEmbedder};
pub use ingest::Ingestor;
pub use qa::{QaChain, QaResult, NO_ANSWER};
pub use store::{Collection, Document, SearchHit, VectorStore};

/// Index errors
#[derive(Error, Debug)]
pub enum IndexError {
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("invalid collection file: {0}")]
    Json(#[from] serde_json::Error),

    #[error("download failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("embedding failed: {0}")]
    Embed(String),

    #[error(transparent)]
    Provider(#[from] presage_provider::ProviderError),

    #[error("collection not found: {0}")]
    CollectionNotFound(String),

    #[error("unsupported document type: {0}")]
    Unsupported(String),
}

pub type Result<T> = std::result::Result<T, IndexError>;
