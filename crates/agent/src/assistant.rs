//! The turn boundary
//!
//! Everything that can go wrong in a turn is converted to a user-visible
//! diagnostic here; nothing below retries and nothing above crashes.

use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::{debug, warn};

use presage_config::AssistantConfig;
use presage_provider::{ChatParams, Message, Provider, ProviderError};
use presage_session::ConversationStore;

use crate::executor::{Executor, TurnState};
use crate::planner::PlannerError;
use crate::AgentError;

/// Chat driver: owns the cross-turn memory and the per-turn executor
pub struct Assistant {
    executor: Executor,
    store: Mutex<ConversationStore>,
    provider: Arc<dyn Provider>,
    settings: AssistantConfig,
}

impl Assistant {
    pub fn new(
        executor: Executor,
        store: ConversationStore,
        provider: Arc<dyn Provider>,
        settings: AssistantConfig,
    ) -> Self {
        Self {
            executor,
            store: Mutex::new(store),
            provider,
            settings,
        }
    }

    /// Process one user message and return the assistant's reply
    pub async fn process(&self, conversation: &str, input: &str) -> String {
        let history = {
            let mut store = self.store.lock().await;
            let conv = store.get_or_create(conversation).await;
            conv.history(self.settings.history_max_messages)
        };

        let reply = match self.executor.run_turn(&history, input).await {
            Ok(turn) => match turn.state {
                // A context-request is the tool's own question and must
                // reach the user verbatim
                TurnState::ContextRequested => turn.reply,
                TurnState::Finished => self.transform_reply(turn.reply).await,
            },
            Err(e) => diagnostic(&e),
        };

        {
            let mut store = self.store.lock().await;
            let conv = store.get_or_create(conversation).await;
            conv.append("user", input);
            conv.append("assistant", &reply);
            let snapshot = conv.clone();
            if let Err(e) = store.save(&snapshot).await {
                warn!("failed to save conversation {}: {}", conversation, e);
            }
        }

        reply
    }

    /// Optionally restate a final answer in the configured language and
    /// length. Falls back to the untouched reply on any failure.
    async fn transform_reply(&self, reply: String) -> String {
        let words_part = if self.settings.reply_max_words > 0 {
            format!("using up to {} words", self.settings.reply_max_words)
        } else {
            String::new()
        };

        let language_part = match self.settings.reply_language.as_str() {
            "" => String::new(),
            "auto" => match self.detect_language(&reply).await {
                Ok(language) => format!("in {}", language),
                Err(e) => {
                    warn!("language detection failed: {}", e);
                    String::new()
                }
            },
            language => format!("in {}", language),
        };

        if words_part.is_empty() && language_part.is_empty() {
            return reply;
        }

        debug!("restating reply {} {}", language_part, words_part);
        let params = ChatParams {
            model: self.settings.model.clone(),
            messages: vec![
                Message::system(
                    "You are a helpful pre-sales network & security engineer assistant, \
working at Fortinet. Use English technical terms in any language, like 'MSSP' or 'VPN'.",
                ),
                Message::user(format!(
                    "Restate {} {} the following:\n{}\n\n",
                    language_part, words_part, reply
                )),
            ],
            max_tokens: self.settings.max_tokens,
            temperature: self.settings.temperature,
        };

        match self.provider.chat(params).await {
            Ok(response) => response.content.trim().to_string(),
            Err(e) => {
                warn!("reply transform failed: {}", e);
                reply
            }
        }
    }

    async fn detect_language(&self, text: &str) -> Result<String, ProviderError> {
        let params = ChatParams {
            model: self.settings.model.clone(),
            messages: vec![Message::user(format!(
                "In one word, what's the language of the following: '{}'?",
                text
            ))],
            max_tokens: 10,
            temperature: 0.0,
        };
        let response = self.provider.chat(params).await?;
        Ok(response
            .content
            .trim()
            .trim_end_matches('.')
            .replace('\n', ""))
    }
}

/// Turn an agent error into the reply the user sees
pub fn diagnostic(error: &AgentError) -> String {
    match error {
        AgentError::Planner(PlannerError::Provider(ProviderError::Auth(message))) => {
            format!("AuthenticationError: {}", message)
        }
        AgentError::Planner(PlannerError::Provider(ProviderError::RateLimited)) => {
            "RateLimitError: the model is rate limited, please try again shortly".to_string()
        }
        AgentError::Planner(PlannerError::Provider(ProviderError::Quota(message))) => {
            format!("QuotaError: {}", message)
        }
        AgentError::Planner(PlannerError::Malformed(message)) => {
            format!("ValueError: {}", message)
        }
        other => format!("Error: {}", other),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn diagnostics_name_the_failure_class() {
        let err = AgentError::Planner(PlannerError::Provider(ProviderError::Auth(
            "bad key".to_string(),
        )));
        assert_eq!(diagnostic(&err), "AuthenticationError: bad key");

        let err = AgentError::Planner(PlannerError::Provider(ProviderError::RateLimited));
        assert!(diagnostic(&err).starts_with("RateLimitError:"));

        let err = AgentError::Planner(PlannerError::Malformed("not json".to_string()));
        assert_eq!(diagnostic(&err), "ValueError: not json");

        let err = AgentError::UnknownTool("docs".to_string());
        assert_eq!(diagnostic(&err), "Error: unknown tool: docs");

        let err = AgentError::StepBudget(8);
        assert_eq!(diagnostic(&err), "Error: no answer after 8 tool steps");
    }
}
