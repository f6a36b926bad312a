//! Planner: the language model wrapped in a decision-making adapter
//!
//! The planner sees the chat history, the current turn's scratchpad, and
//! the user input, and replies with one of two JSON schemas: pick a tool,
//! or answer the user directly.

use async_trait::async_trait;
use std::sync::Arc;
use thiserror::Error;
use tracing::trace;

use presage_provider::{ChatParams, Message, Provider, ProviderError};

/// The `action` value marking a direct reply to the user (schema #2)
pub const FINAL_ACTION: &str = "final";

/// A tool invocation chosen by the planner
#[derive(Debug, Clone, PartialEq)]
pub struct Action {
    pub tool: String,
    pub input: String,
    /// The model's raw reply, replayed verbatim into the scratchpad so the
    /// next planning call keeps its chain of thought
    pub log: String,
}

/// One planner decision per cycle
#[derive(Debug, Clone, PartialEq)]
pub enum Decision {
    Act(Action),
    Finish(String),
}

/// Planner failures, surfaced as a diagnostic at the turn boundary
#[derive(Error, Debug)]
pub enum PlannerError {
    #[error(transparent)]
    Provider(#[from] ProviderError),

    #[error("could not parse planner output: {0}")]
    Malformed(String),
}

#[async_trait]
pub trait Planner: Send + Sync {
    async fn plan(
        &self,
        history: &[Message],
        scratchpad: &[Message],
        input: &str,
    ) -> Result<Decision, PlannerError>;
}

const PERSONA: &str = "You are a helpful pre-sales network & security engineer assistant, \
working at Fortinet. Use English technical terms in any language, like 'MSSP' or 'VPN'.";

/// Chat-model planner speaking the two-schema JSON protocol
pub struct ChatPlanner {
    provider: Arc<dyn Provider>,
    model: String,
    max_tokens: u32,
    temperature: f32,
    /// (name, description) pairs, frozen at construction
    tools: Vec<(String, String)>,
}

impl ChatPlanner {
    pub fn new(
        provider: Arc<dyn Provider>,
        model: impl Into<String>,
        tools: Vec<(String, String)>,
    ) -> Self {
        Self {
            provider,
            model: model.into(),
            max_tokens: 2000,
            temperature: 0.0,
            tools,
        }
    }

    pub fn with_sampling(mut self, max_tokens: u32, temperature: f32) -> Self {
        self.max_tokens = max_tokens;
        self.temperature = temperature;
        self
    }

    fn system_prompt(&self) -> String {
        let tool_lines = self
            .tools
            .iter()
            .map(|(name, description)| format!("> {}: {}", name, description))
            .collect::<Vec<_>>()
            .join("\n");
        let tool_names = self
            .tools
            .iter()
            .map(|(name, _)| name.as_str())
            .collect::<Vec<_>>()
            .join(", ");

        format!(
            "{persona}\n\n\
TOOLS\n\
-----\n\
You can ask the user to use tools to look up information that may be helpful in answering their \
question. The tools you can use are:\n\n\
{tool_lines}\n\n\
RESPONSE FORMAT INSTRUCTIONS\n\
----------------------------\n\
When responding, reply with a json blob in one of two schemas and NOTHING else.\n\n\
Schema #1, to use a tool:\n\
{{\"action\": \"<tool name>\", \"action_input\": \"<input to the tool>\"}}\n\
The tool name must be one of: {tool_names}.\n\n\
Schema #2, to respond directly to the user:\n\
{{\"action\": \"{final_action}\", \"action_input\": \"<your response>\"}}",
            persona = PERSONA,
            tool_lines = tool_lines,
            tool_names = tool_names,
            final_action = FINAL_ACTION,
        )
    }
}

#[async_trait]
impl Planner for ChatPlanner {
    async fn plan(
        &self,
        history: &[Message],
        scratchpad: &[Message],
        input: &str,
    ) -> Result<Decision, PlannerError> {
        let mut messages = vec![Message::system(self.system_prompt())];
        messages.extend_from_slice(history);
        messages.push(Message::user(input));
        messages.extend_from_slice(scratchpad);

        let params = ChatParams {
            model: self.model.clone(),
            messages,
            max_tokens: self.max_tokens,
            temperature: self.temperature,
        };

        let response = self.provider.chat(params).await?;
        trace!("planner raw output: {}", response.content);
        parse_decision(&response.content)
    }
}

/// Parse the model's reply into a decision. Tolerates markdown code
/// fences around the JSON blob.
pub fn parse_decision(raw: &str) -> Result<Decision, PlannerError> {
    let cleaned = strip_fences(raw);

    let value: serde_json::Value = serde_json::from_str(cleaned)
        .map_err(|e| PlannerError::Malformed(format!("{}: {}", e, cleaned)))?;

    let action = value["action"]
        .as_str()
        .ok_or_else(|| PlannerError::Malformed(format!("missing action: {}", cleaned)))?
        .to_string();
    let action_input = match &value["action_input"] {
        serde_json::Value::String(s) => s.clone(),
        serde_json::Value::Null => {
            return Err(PlannerError::Malformed(format!(
                "missing action_input: {}",
                cleaned
            )))
        }
        other => other.to_string(),
    };

    if action == FINAL_ACTION {
        Ok(Decision::Finish(action_input))
    } else {
        Ok(Decision::Act(Action {
            tool: action,
            input: action_input,
            log: raw.to_string(),
        }))
    }
}

fn strip_fences(raw: &str) -> &str {
    let mut text = raw.trim();
    if let Some(start) = text.find("```json") {
        text = &text[start + "```json".len()..];
    } else if let Some(start) = text.find("```") {
        text = &text[start + "```".len()..];
    }
    if let Some(end) = text.find("```") {
        text = &text[..end];
    }
    text.trim()
}
