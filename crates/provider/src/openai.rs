//! OpenAI-compatible provider
//!
//! Works against api.openai.com or any compatible endpoint (OpenRouter,
//! vLLM) for chat completions and embeddings.

use crate::*;
use reqwest::Client;
use serde_json::json;
use tracing::{debug, trace};

const DEFAULT_API_BASE: &str = "https://api.openai.com/v1";
const DEFAULT_EMBEDDING_MODEL: &str = "text-embedding-3-small";

/// OpenAI-compatible endpoint
pub struct OpenAiProvider {
    client: Client,
    api_key: String,
    api_base: String,
    default_model: String,
    embedding_model: String,
}

impl OpenAiProvider {
    pub fn new(
        api_key: impl Into<String>,
        api_base: Option<String>,
        default_model: Option<String>,
    ) -> Self {
        Self {
            client: Client::new(),
            api_key: api_key.into(),
            api_base: api_base.unwrap_or_else(|| DEFAULT_API_BASE.to_string()),
            default_model: default_model.unwrap_or_else(|| "gpt-4o-mini".to_string()),
            embedding_model: DEFAULT_EMBEDDING_MODEL.to_string(),
        }
    }

    pub fn with_embedding_model(mut self, model: impl Into<String>) -> Self {
        self.embedding_model = model.into();
        self
    }

    fn build_request(&self, params: &ChatParams) -> serde_json::Value {
        let messages: Vec<serde_json::Value> = params
            .messages
            .iter()
            .map(|m| json!({ "role": &m.role, "content": &m.content }))
            .collect();

        json!({
            "model": params.model,
            "messages": messages,
            "max_tokens": params.max_tokens,
            "temperature": params.temperature,
        })
    }

    fn parse_response(&self, json: serde_json::Value) -> Result<ChatResponse> {
        let choice = json["choices"]
            .get(0)
            .ok_or(ProviderError::InvalidResponse)?;
        let content = choice["message"]["content"]
            .as_str()
            .unwrap_or("")
            .to_string();
        let finish_reason = choice["finish_reason"]
            .as_str()
            .unwrap_or("stop")
            .to_string();

        let usage = if let Some(usage) = json["usage"].as_object() {
            Usage {
                prompt_tokens: usage.get("prompt_tokens").and_then(|v| v.as_u64()).unwrap_or(0)
                    as u32,
                completion_tokens: usage
                    .get("completion_tokens")
                    .and_then(|v| v.as_u64())
                    .unwrap_or(0) as u32,
                total_tokens: usage.get("total_tokens").and_then(|v| v.as_u64()).unwrap_or(0)
                    as u32,
            }
        } else {
            Usage::default()
        };

        Ok(ChatResponse {
            content,
            finish_reason,
            usage,
        })
    }

    /// Map an error payload to the right variant so the turn boundary can
    /// tell auth, rate-limit, and quota failures apart
    fn api_error(status: reqwest::StatusCode, json: &serde_json::Value) -> ProviderError {
        let message = json["error"]["message"]
            .as_str()
            .unwrap_or("unknown error")
            .to_string();
        let code = json["error"]["code"].as_str().unwrap_or("");

        match status.as_u16() {
            401 | 403 => ProviderError::Auth(message),
            429 if code == "insufficient_quota" => ProviderError::Quota(message),
            429 => ProviderError::RateLimited,
            _ => ProviderError::Api(message),
        }
    }
}

#[async_trait::async_trait]
impl Provider for OpenAiProvider {
    async fn chat(&self, params: ChatParams) -> Result<ChatResponse> {
        if self.api_key.is_empty() {
            return Err(ProviderError::NoApiKey);
        }

        trace!("chat completion via {}", self.api_base);

        let url = format!("{}/chat/completions", self.api_base);
        let body = self.build_request(&params);

        let response = self
            .client
            .post(&url)
            .header("Authorization", format!("Bearer {}", self.api_key))
            .header("Content-Type", "application/json")
            .json(&body)
            .send()
            .await?;

        let status = response.status();
        let json: serde_json::Value = response.json().await?;

        if !status.is_success() {
            return Err(Self::api_error(status, &json));
        }

        debug!(
            "chat completion: {} tokens",
            json["usage"]["total_tokens"].as_u64().unwrap_or(0)
        );

        self.parse_response(json)
    }

    async fn embed(&self, texts: &[String]) -> Result<Vec<Vec<f32>>> {
        if self.api_key.is_empty() {
            return Err(ProviderError::NoApiKey);
        }
        if texts.is_empty() {
            return Ok(Vec::new());
        }

        let url = format!("{}/embeddings", self.api_base);
        let body = json!({
            "model": self.embedding_model,
            "input": texts,
        });

        let response = self
            .client
            .post(&url)
            .header("Authorization", format!("Bearer {}", self.api_key))
            .header("Content-Type", "application/json")
            .json(&body)
            .send()
            .await?;

        let status = response.status();
        let json: serde_json::Value = response.json().await?;

        if !status.is_success() {
            return Err(Self::api_error(status, &json));
        }

        let data = json["data"]
            .as_array()
            .ok_or(ProviderError::InvalidResponse)?;

        let mut vectors = Vec::with_capacity(data.len());
        for item in data {
            let embedding = item["embedding"]
                .as_array()
                .ok_or(ProviderError::InvalidResponse)?
                .iter()
                .map(|v| v.as_f64().unwrap_or(0.0) as f32)
                .collect();
            vectors.push(embedding);
        }

        debug!("embedded {} texts", vectors.len());
        Ok(vectors)
    }

    fn default_model(&self) -> String {
        self.default_model.clone()
    }

    fn is_configured(&self) -> bool {
        !self.api_key.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_build_request_basic() {
        let provider = OpenAiProvider::new("sk-test", None, None);
        let params = ChatParams {
            model: "gpt-4o-mini".to_string(),
            messages: vec![Message::system("You are helpful"), Message::user("Hello")],
            max_tokens: 1024,
            temperature: 0.5,
        };

        let request = provider.build_request(&params);

        assert_eq!(request["model"], "gpt-4o-mini");
        assert_eq!(request["max_tokens"], 1024);
        assert_eq!(request["temperature"], 0.5);

        let messages = request["messages"].as_array().unwrap();
        assert_eq!(messages.len(), 2);
        assert_eq!(messages[0]["role"], "system");
        assert_eq!(messages[1]["content"], "Hello");
    }

    #[test]
    fn test_parse_response_simple() {
        let provider = OpenAiProvider::new("sk-test", None, None);
        let response_json = serde_json::json!({
            "choices": [{
                "message": { "content": "Hello!", "role": "assistant" },
                "finish_reason": "stop"
            }],
            "usage": { "prompt_tokens": 10, "completion_tokens": 5, "total_tokens": 15 }
        });

        let response = provider.parse_response(response_json).unwrap();

        assert_eq!(response.content, "Hello!");
        assert_eq!(response.finish_reason, "stop");
        assert_eq!(response.usage.total_tokens, 15);
    }

    #[test]
    fn test_parse_response_missing_choices() {
        let provider = OpenAiProvider::new("sk-test", None, None);
        let result = provider.parse_response(serde_json::json!({ "usage": {} }));
        assert!(matches!(result, Err(ProviderError::InvalidResponse)));
    }

    #[test]
    fn test_api_error_mapping() {
        let auth = OpenAiProvider::api_error(
            reqwest::StatusCode::UNAUTHORIZED,
            &serde_json::json!({ "error": { "message": "Incorrect API key" } }),
        );
        assert!(matches!(auth, ProviderError::Auth(_)));

        let rate = OpenAiProvider::api_error(
            reqwest::StatusCode::TOO_MANY_REQUESTS,
            &serde_json::json!({ "error": { "message": "slow down" } }),
        );
        assert!(matches!(rate, ProviderError::RateLimited));

        let quota = OpenAiProvider::api_error(
            reqwest::StatusCode::TOO_MANY_REQUESTS,
            &serde_json::json!({ "error": { "message": "quota", "code": "insufficient_quota" } }),
        );
        assert!(matches!(quota, ProviderError::Quota(_)));

        let api = OpenAiProvider::api_error(
            reqwest::StatusCode::INTERNAL_SERVER_ERROR,
            &serde_json::json!({ "error": { "message": "boom" } }),
        );
        assert!(matches!(api, ProviderError::Api(_)));
    }

    #[test]
    fn test_custom_api_base_and_model() {
        let provider = OpenAiProvider::new(
            "sk-test",
            Some("https://openrouter.ai/api/v1".to_string()),
            Some("anthropic/claude-sonnet-4".to_string()),
        );
        assert_eq!(provider.api_base, "https://openrouter.ai/api/v1");
        assert_eq!(provider.default_model(), "anthropic/claude-sonnet-4");
    }

    #[test]
    fn test_is_configured() {
        assert!(OpenAiProvider::new("sk-x", None, None).is_configured());
        assert!(!OpenAiProvider::new("", None, None).is_configured());
    }
}
