//! Scratchpad construction
//!
//! Replays the turn's completed steps into planner input. A past
//! context-request is re-emitted as a bare user message, as if the user had
//! supplied that information directly; a plain observation is wrapped in
//! the tool response template so the model can tell the two apart.

use presage_provider::Message;

use crate::executor::AgentStep;
use crate::tool::{wrap_tool_response, Observation};

/// Strategy for turning intermediate steps into planner messages. The
/// executor holds one; swap it to change how history is replayed.
pub trait ScratchpadBuilder: Send + Sync {
    /// Pure function of the steps: same input, same output, every time.
    /// Emits exactly two messages per step, in step order.
    fn build(&self, steps: &[AgentStep]) -> Vec<Message>;
}

/// Default chat-style scratchpad
#[derive(Debug, Clone, Default)]
pub struct ChatScratchpad;

impl ScratchpadBuilder for ChatScratchpad {
    fn build(&self, steps: &[AgentStep]) -> Vec<Message> {
        let mut messages = Vec::with_capacity(steps.len() * 2);
        for step in steps {
            messages.push(Message::assistant(step.action.log.clone()));
            let reply = match &step.observation {
                Observation::ContextRequest(question) => question.clone(),
                Observation::Answer(text) => wrap_tool_response(text),
            };
            messages.push(Message::user(reply));
        }
        messages
    }
}
