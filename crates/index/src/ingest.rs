//! File and URL ingestion into the vector store

use regex::Regex;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

use crate::chunk::Chunker;
use crate::embed::Embedder;
use crate::store::{Document, VectorStore};
use crate::{IndexError, Result};

/// Outcome of one ingestion
#[derive(Debug, Clone)]
pub struct IngestReport {
    pub collection: String,
    pub chunks_added: usize,
    pub source: String,
}

/// Chunks, embeds, and persists documents
pub struct Ingestor {
    store: VectorStore,
    documents_dir: PathBuf,
    chunker: Chunker,
}

impl Ingestor {
    pub fn new(index_dir: impl AsRef<Path>, documents_dir: impl AsRef<Path>) -> Self {
        Self {
            store: VectorStore::new(index_dir),
            documents_dir: documents_dir.as_ref().to_path_buf(),
            chunker: Chunker::default(),
        }
    }

    pub fn with_chunker(mut self, chunker: Chunker) -> Self {
        self.chunker = chunker;
        self
    }

    /// Ingest a local file into `collection`
    pub async fn ingest_path(
        &self,
        path: &Path,
        collection: &str,
        embedder: &dyn Embedder,
    ) -> Result<IngestReport> {
        let text = read_document(path).await?;
        self.ingest_text(&text, &path.display().to_string(), collection, embedder)
            .await
    }

    /// Download a URL (skipping the download when the file already exists)
    /// and ingest it into `collection`
    pub async fn ingest_url(
        &self,
        url: &str,
        collection: &str,
        embedder: &dyn Embedder,
    ) -> Result<IngestReport> {
        let filename = url_filename(url)
            .ok_or_else(|| IndexError::Unsupported(format!("not a document url: {}", url)))?;
        let local = self.documents_dir.join(&filename);

        if local.exists() {
            info!("{} already downloaded, skipping", filename);
        } else {
            info!("downloading {} from {}", filename, url);
            let response = reqwest::get(url).await?.error_for_status()?;
            let bytes = response.bytes().await?;
            tokio::fs::create_dir_all(&self.documents_dir).await?;
            tokio::fs::write(&local, &bytes).await?;
        }

        let text = read_document(&local).await?;
        self.ingest_text(&text, url, collection, embedder).await
    }

    async fn ingest_text(
        &self,
        text: &str,
        source: &str,
        collection: &str,
        embedder: &dyn Embedder,
    ) -> Result<IngestReport> {
        let chunks = self.chunker.split(text);
        debug!("split {} into {} chunks", source, chunks.len());

        let documents: Vec<Document> = chunks
            .into_iter()
            .enumerate()
            .map(|(i, chunk)| Document::new(chunk, format!("{}-{}", source, i)))
            .collect();

        let mut coll = self.store.open_or_create(collection).await?;
        let added = coll.add(&documents, embedder).await?;
        coll.persist().await?;

        info!("indexed {} chunks into {}", added, collection);
        Ok(IngestReport {
            collection: collection.to_string(),
            chunks_added: added,
            source: source.to_string(),
        })
    }
}

/// Read a document file as plain text. HTML is converted with html2text;
/// PDF is not supported.
async fn read_document(path: &Path) -> Result<String> {
    let extension = path
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or("")
        .to_lowercase();

    match extension.as_str() {
        "pdf" => Err(IndexError::Unsupported(
            "pdf parsing is not supported; convert to text first".to_string(),
        )),
        "html" | "htm" => {
            let html = tokio::fs::read_to_string(path).await?;
            Ok(html2text::from_read(html.as_bytes(), 100))
        }
        _ => Ok(tokio::fs::read_to_string(path).await?),
    }
}

/// Extract a file name from a document URL
fn url_filename(url: &str) -> Option<String> {
    let pattern = Regex::new(r"^https?://[\w.-]+(?:/[^\s?]*)*/([^\s/?]+\.\w+)$").ok()?;
    pattern
        .captures(url)
        .map(|caps| caps[1].to_string())
}
