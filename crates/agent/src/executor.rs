//! The agent loop
//!
//! One executor per conversation. Each user turn runs planning and
//! dispatching cycles until the planner finishes, a tool requests context
//! from the user, or the step budget runs out. The executor owns the
//! turn's intermediate steps exclusively; they reset every turn.

use std::sync::Arc;
use tracing::{debug, error, info};

use presage_provider::Message;

use crate::planner::{Action, Decision, Planner};
use crate::registry::ToolRegistry;
use crate::scratchpad::{ChatScratchpad, ScratchpadBuilder};
use crate::tool::Observation;
use crate::{AgentError, Result};

/// Default maximum planning/dispatching cycles per turn
pub const DEFAULT_MAX_STEPS: u32 = 8;

/// One completed plan/dispatch cycle
#[derive(Debug, Clone)]
pub struct AgentStep {
    pub action: Action,
    pub observation: Observation,
}

/// How the turn ended
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TurnState {
    /// The planner produced a final answer
    Finished,
    /// A tool asked the user for more context; the reply is its question
    ContextRequested,
}

/// Outcome of one user turn
#[derive(Debug, Clone)]
pub struct Turn {
    pub reply: String,
    pub state: TurnState,
    pub steps: Vec<AgentStep>,
}

/// Drives the planning/dispatching loop for one conversation
pub struct Executor {
    registry: Arc<ToolRegistry>,
    planner: Box<dyn Planner>,
    scratchpad: Box<dyn ScratchpadBuilder>,
    max_steps: u32,
}

impl Executor {
    pub fn new(registry: Arc<ToolRegistry>, planner: Box<dyn Planner>) -> Self {
        Self {
            registry,
            planner,
            scratchpad: Box::new(ChatScratchpad),
            max_steps: DEFAULT_MAX_STEPS,
        }
    }

    pub fn with_scratchpad(mut self, scratchpad: Box<dyn ScratchpadBuilder>) -> Self {
        self.scratchpad = scratchpad;
        self
    }

    pub fn with_max_steps(mut self, max_steps: u32) -> Self {
        self.max_steps = max_steps;
        self
    }

    /// Run one user turn to completion
    pub async fn run_turn(&self, history: &[Message], input: &str) -> Result<Turn> {
        let mut steps: Vec<AgentStep> = Vec::new();

        for cycle in 1..=self.max_steps {
            let scratchpad = self.scratchpad.build(&steps);
            debug!(cycle, steps = steps.len(), "planning");

            let decision = self
                .planner
                .plan(history, &scratchpad, input)
                .await
                .map_err(|e| {
                    error!("planner failed: {}", e);
                    AgentError::Planner(e)
                })?;

            let action = match decision {
                Decision::Finish(reply) => {
                    debug!(cycle, "final answer");
                    return Ok(Turn {
                        reply,
                        state: TurnState::Finished,
                        steps,
                    });
                }
                Decision::Act(action) => action,
            };

            let tool = self.registry.get(&action.tool).ok_or_else(|| {
                // A miss means the planner's tool prompt and the registry
                // disagree, which is a configuration bug, not a model whim
                error!(tool = %action.tool, "planner chose an unregistered tool");
                AgentError::UnknownTool(action.tool.clone())
            })?;

            info!(tool = %action.tool, input = %action.input, "dispatching");
            let returns_direct = tool.returns_direct();
            let observation = tool.execute(&action.input).await.map_err(|e| {
                error!(tool = %action.tool, "tool failed: {}", e);
                AgentError::Tool(e)
            })?;
            debug!(tool = %action.tool, "tool finished");

            match observation {
                Observation::ContextRequest(question) => {
                    // The tool wants the user to answer before anything else
                    // can happen. Hand its question straight back; no
                    // further planning this turn.
                    info!(tool = %action.tool, "context requested, ending turn");
                    return Ok(Turn {
                        reply: question,
                        state: TurnState::ContextRequested,
                        steps,
                    });
                }
                Observation::Answer(text) if returns_direct => {
                    debug!(tool = %action.tool, "direct-return tool, ending turn");
                    return Ok(Turn {
                        reply: text,
                        state: TurnState::Finished,
                        steps,
                    });
                }
                observation @ Observation::Answer(_) => {
                    steps.push(AgentStep {
                        action,
                        observation,
                    });
                }
            }
        }

        error!(max_steps = self.max_steps, "step budget exhausted");
        Err(AgentError::StepBudget(self.max_steps))
    }
}
