//! LLM provider boundary
//!
//! One trait for everything the assistant needs from a language model:
//! chat completion (used by the planner and the QA chain) and text
//! embeddings (used by the vector index).

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

pub mod openai;

pub use openai::OpenAiProvider;

/// Provider errors
///
/// Authentication, rate-limit, and quota failures stay distinguishable so
/// the turn boundary can report each one in its own words.
#[derive(Error, Debug)]
pub enum ProviderError {
    #[error("request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("invalid response body: {0}")]
    Json(#[from] serde_json::Error),

    #[error("authentication failed: {0}")]
    Auth(String),

    #[error("rate limited")]
    RateLimited,

    #[error("quota exceeded: {0}")]
    Quota(String),

    #[error("api error: {0}")]
    Api(String),

    #[error("no api key configured")]
    NoApiKey,

    #[error("malformed response")]
    InvalidResponse,
}

pub type Result<T> = std::result::Result<T, ProviderError>;

/// A chat message
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Message {
    pub role: String,
    pub content: String,
}

impl Message {
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: "system".to_string(),
            content: content.into(),
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: "user".to_string(),
            content: content.into(),
        }
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: "assistant".to_string(),
            content: content.into(),
        }
    }
}

/// Chat completion parameters
#[derive(Debug, Clone)]
pub struct ChatParams {
    pub model: String,
    pub messages: Vec<Message>,
    pub max_tokens: u32,
    pub temperature: f32,
}

impl Default for ChatParams {
    fn default() -> Self {
        Self {
            model: String::new(),
            messages: Vec::new(),
            max_tokens: 2000,
            temperature: 0.0,
        }
    }
}

/// Chat completion response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatResponse {
    pub content: String,
    #[serde(default)]
    pub finish_reason: String,
    #[serde(default)]
    pub usage: Usage,
}

impl ChatResponse {
    pub fn text(content: impl Into<String>) -> Self {
        Self {
            content: content.into(),
            finish_reason: "stop".to_string(),
            usage: Usage::default(),
        }
    }
}

/// Token usage
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Usage {
    pub prompt_tokens: u32,
    pub completion_tokens: u32,
    pub total_tokens: u32,
}

/// A language model endpoint
#[async_trait]
pub trait Provider: Send + Sync {
    async fn chat(&self, params: ChatParams) -> Result<ChatResponse>;

    /// Embed a batch of texts, one vector per input, in input order
    async fn embed(&self, texts: &[String]) -> Result<Vec<Vec<f32>>>;

    fn default_model(&self) -> String;

    fn is_configured(&self) -> bool;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_provider_error_display() {
        let err = ProviderError::NoApiKey;
        assert_eq!(err.to_string(), "no api key configured");

        let err = ProviderError::Auth("bad key".to_string());
        assert_eq!(err.to_string(), "authentication failed: bad key");

        let err = ProviderError::RateLimited;
        assert_eq!(err.to_string(), "rate limited");

        let err = ProviderError::Quota("billing hard limit".to_string());
        assert_eq!(err.to_string(), "quota exceeded: billing hard limit");
    }

    #[test]
    fn test_message_builders() {
        let msg = Message::system("You are a helpful assistant");
        assert_eq!(msg.role, "system");
        assert_eq!(msg.content, "You are a helpful assistant");

        let msg = Message::user("hello");
        assert_eq!(msg.role, "user");

        let msg = Message::assistant("hi there");
        assert_eq!(msg.role, "assistant");
    }

    #[test]
    fn test_chat_params_default() {
        let params = ChatParams::default();
        assert_eq!(params.model, "");
        assert!(params.messages.is_empty());
        assert_eq!(params.max_tokens, 2000);
        assert_eq!(params.temperature, 0.0);
    }

    #[test]
    fn test_chat_response_text_builder() {
        let response = ChatResponse::text("Hello, world!");
        assert_eq!(response.content, "Hello, world!");
        assert_eq!(response.finish_reason, "stop");
        assert_eq!(response.usage.total_tokens, 0);
    }

    #[test]
    fn test_message_serialization() {
        let msg = Message::user("Hello");
        let json_str = serde_json::to_string(&msg).unwrap();
        assert!(json_str.contains("\"role\":\"user\""));
        assert!(json_str.contains("\"content\":\"Hello\""));
    }
}
