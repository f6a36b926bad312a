//! Tool contract
//!
//! Tools take one comma-delimited string input and return an
//! `Observation`. A tool that is missing a required field does not guess:
//! it returns a context-request, which the executor relays to the user as
//! the turn's reply.

use async_trait::async_trait;
use thiserror::Error;

/// Sentinel the planner puts in a positional slot it cannot fill.
/// A tool seeing this in a required field must ask instead of guessing.
pub const UNKNOWN_FIELD: &str = "0";

/// Wire prefix marking an observation as a context-request. Internal to
/// the tool/executor/scratchpad protocol; stripped before anything is
/// shown to the user or replayed to the model.
const CONTEXT_PREFIX: &str = "CONTEXT:";

/// Question template for a missing input field. "Schema #2" is the
/// planner's direct-reply schema, so a replayed question nudges the model
/// to ask the user rather than retry the tool.
const CONTEXT_QUESTION: &str = "You must ask me about {field}. Reply with schema #2.";

/// Tool execution errors, fatal for the current turn
#[derive(Error, Debug)]
pub enum ToolError {
    #[error("invalid tool input: {0}")]
    Parse(String),

    #[error("request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("not signed in to the knowledge portal: {0}")]
    Auth(String),

    #[error(transparent)]
    Index(#[from] presage_index::IndexError),

    #[error("{0}")]
    Other(String),
}

/// What a tool produced: data for the model, or a question for the user
#[derive(Debug, Clone, PartialEq)]
pub enum Observation {
    /// Plain result, fed back to the planner as a tool response
    Answer(String),
    /// A question the tool wants relayed to the user. Ends the turn.
    /// The text is the user-facing question, marker already stripped.
    ContextRequest(String),
}

impl Observation {
    pub fn answer(text: impl Into<String>) -> Self {
        Observation::Answer(text.into())
    }

    pub fn context_request(question: impl Into<String>) -> Self {
        Observation::ContextRequest(question.into())
    }

    /// Context-request about a missing input field, e.g.
    /// `ask_about("the firmware version")`
    pub fn ask_about(field: &str) -> Self {
        Observation::ContextRequest(CONTEXT_QUESTION.replace("{field}", field))
    }

    /// Parse the wire form: a `CONTEXT:` prefix marks a context-request,
    /// anything else is a plain answer
    pub fn parse(wire: &str) -> Self {
        match wire.strip_prefix(CONTEXT_PREFIX) {
            Some(question) => Observation::ContextRequest(question.to_string()),
            None => Observation::Answer(wire.to_string()),
        }
    }

    /// Render the wire form
    pub fn to_wire(&self) -> String {
        match self {
            Observation::Answer(text) => text.clone(),
            Observation::ContextRequest(question) => format!("{}{}", CONTEXT_PREFIX, question),
        }
    }

    pub fn text(&self) -> &str {
        match self {
            Observation::Answer(text) => text,
            Observation::ContextRequest(question) => question,
        }
    }

    pub fn needs_context(&self) -> bool {
        matches!(self, Observation::ContextRequest(_))
    }
}

const TOOL_RESPONSE_HEADER: &str = "TOOL RESPONSE:\n---------------------\n";
const TOOL_RESPONSE_FOOTER: &str = "\n---------------------\n\nOkay, so what is the response to my \
last comment? If using information from the tool response you must mention it explicitly without \
naming the tool. Respond with a json blob with a single action, and NOTHING else.";

/// Wrap a plain observation so the model can tell tool output apart from
/// genuine user input
pub fn wrap_tool_response(observation: &str) -> String {
    format!("{}{}{}", TOOL_RESPONSE_HEADER, observation, TOOL_RESPONSE_FOOTER)
}

/// Recover the observation text from a wrapped tool response
pub fn unwrap_tool_response(message: &str) -> Option<&str> {
    message
        .strip_prefix(TOOL_RESPONSE_HEADER)?
        .strip_suffix(TOOL_RESPONSE_FOOTER)
}

/// A callable capability the planner can pick by name
#[async_trait]
pub trait Tool: Send + Sync {
    fn name(&self) -> &str;

    /// Natural-language description the planner uses to decide when to
    /// invoke the tool, including its input convention
    fn description(&self) -> &str;

    /// When true, the tool's answer is meant for the user as-is
    fn returns_direct(&self) -> bool {
        false
    }

    async fn execute(&self, input: &str) -> Result<Observation, ToolError>;
}
