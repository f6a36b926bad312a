//! Conversational agent core
//!
//! The executor drives a plan/dispatch loop per user turn. What sets it
//! apart from a stock tool-calling loop: any tool can return a
//! context-request instead of data, which ends the turn immediately and
//! relays the tool's question to the user verbatim. The scratchpad builder
//! replays prior steps into the planner's input, re-emitting past
//! context-requests as if the user had answered them directly.

use thiserror::Error;

pub mod assistant;
pub mod executor;
pub mod planner;
pub mod registry;
pub mod scratchpad;
pub mod tool;
pub mod tools;

pub use assistant::Assistant;
pub use executor::{AgentStep, Executor, Turn, TurnState};
pub use planner::{Action, ChatPlanner, Decision, Planner, PlannerError};
pub use registry::ToolRegistry;
pub use scratchpad::{ChatScratchpad, ScratchpadBuilder};
pub use tool::{Observation, Tool, ToolError, UNKNOWN_FIELD};

/// Turn-level agent errors, all handled at the outermost boundary
#[derive(Error, Debug)]
pub enum AgentError {
    /// The planner named a tool that is not registered. Indicates the
    /// planner's tool prompt is out of sync with the registry.
    #[error("unknown tool: {0}")]
    UnknownTool(String),

    #[error(transparent)]
    Tool(#[from] ToolError),

    #[error(transparent)]
    Planner(#[from] PlannerError),

    #[error("no answer after {0} tool steps")]
    StepBudget(u32),
}

pub type Result<T> = std::result::Result<T, AgentError>;
