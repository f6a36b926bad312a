//! Retrieval-augmented question answering over a collection

use std::sync::Arc;
use tracing::debug;

use presage_provider::{ChatParams, Message, Provider};

use crate::embed::{Embedder, ProviderEmbedder};
use crate::store::Collection;
use crate::Result;

/// The answer the chain gives when retrieval finds nothing useful. Callers
/// compare against this to decide whether to fall back to another source.
pub const NO_ANSWER: &str = "I don't know";

const DEFAULT_TOP_K: usize = 4;

/// An answer with the chunk sources that produced it
#[derive(Debug, Clone)]
pub struct QaResult {
    pub answer: String,
    pub sources: Vec<String>,
}

impl QaResult {
    pub fn is_no_answer(&self) -> bool {
        self.answer.trim() == NO_ANSWER
    }
}

/// Answers a question by stuffing the top matching chunks into one prompt
pub struct QaChain {
    provider: Arc<dyn Provider>,
    model: String,
    top_k: usize,
}

impl QaChain {
    pub fn new(provider: Arc<dyn Provider>, model: impl Into<String>) -> Self {
        Self {
            provider,
            model: model.into(),
            top_k: DEFAULT_TOP_K,
        }
    }

    pub fn with_top_k(mut self, top_k: usize) -> Self {
        self.top_k = top_k;
        self
    }

    /// Answer `question` from `collection`, or `NO_ANSWER` when the
    /// collection has nothing relevant
    pub async fn answer(&self, collection: &Collection, question: &str) -> Result<QaResult> {
        if collection.is_empty() {
            return Ok(QaResult {
                answer: NO_ANSWER.to_string(),
                sources: Vec::new(),
            });
        }

        let embedder = ProviderEmbedder::new(self.provider.clone());
        let hits = collection.query(question, self.top_k, &embedder).await?;

        let mut sources: Vec<String> = hits.iter().map(|h| h.source.clone()).collect();
        sources.dedup();

        let context = hits
            .iter()
            .map(|h| format!("Source: {}\n{}", h.source, h.text))
            .collect::<Vec<_>>()
            .join("\n\n---\n\n");

        debug!(
            "qa over {} with {} context chunks",
            collection.name(),
            hits.len()
        );

        let system = format!(
            "Use the following extracted parts of a document to answer the question. \
If the answer is not contained in them, reply exactly \"{}\" and nothing else.",
            NO_ANSWER
        );
        let user = format!("{}\n\nQuestion: {}", context, question);

        let params = ChatParams {
            model: self.model.clone(),
            messages: vec![Message::system(system), Message::user(user)],
            ..Default::default()
        };

        let response = self.provider.chat(params).await.map_err(crate::IndexError::Provider)?;

        Ok(QaResult {
            answer: response.content.trim().to_string(),
            sources,
        })
    }
}
