//! Shared test doubles for agent tests
#![allow(dead_code)]

use async_trait::async_trait;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use presage_agent::{Action, Decision, Observation, Planner, PlannerError, Tool, ToolError};
use presage_provider::{ChatParams, ChatResponse, Message, Provider, ProviderError};

/// Planner that replays a fixed list of decisions and counts its calls
pub struct ScriptedPlanner {
    decisions: Mutex<Vec<Decision>>,
    pub calls: Arc<AtomicUsize>,
}

impl ScriptedPlanner {
    pub fn new(decisions: Vec<Decision>) -> Self {
        Self {
            decisions: Mutex::new(decisions),
            calls: Arc::new(AtomicUsize::new(0)),
        }
    }

    pub fn call_counter(&self) -> Arc<AtomicUsize> {
        self.calls.clone()
    }
}

#[async_trait]
impl Planner for ScriptedPlanner {
    async fn plan(
        &self,
        _history: &[Message],
        _scratchpad: &[Message],
        _input: &str,
    ) -> Result<Decision, PlannerError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let mut decisions = self.decisions.lock().unwrap();
        if decisions.is_empty() {
            return Err(PlannerError::Malformed("script exhausted".to_string()));
        }
        Ok(decisions.remove(0))
    }
}

/// Planner that always picks the same action, for step-budget tests
pub struct LoopingPlanner {
    pub action: Action,
    pub calls: Arc<AtomicUsize>,
}

impl LoopingPlanner {
    pub fn new(tool: &str, input: &str) -> Self {
        Self {
            action: Action {
                tool: tool.to_string(),
                input: input.to_string(),
                log: format!("{{\"action\": \"{}\", \"action_input\": \"{}\"}}", tool, input),
            },
            calls: Arc::new(AtomicUsize::new(0)),
        }
    }
}

#[async_trait]
impl Planner for LoopingPlanner {
    async fn plan(
        &self,
        _history: &[Message],
        _scratchpad: &[Message],
        _input: &str,
    ) -> Result<Decision, PlannerError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(Decision::Act(self.action.clone()))
    }
}

/// Tool that returns a fixed observation and counts executions
pub struct FixedTool {
    name: String,
    observation: Observation,
    returns_direct: bool,
    pub executions: Arc<AtomicUsize>,
}

impl FixedTool {
    pub fn new(name: &str, observation: Observation) -> Self {
        Self {
            name: name.to_string(),
            observation,
            returns_direct: false,
            executions: Arc::new(AtomicUsize::new(0)),
        }
    }

    pub fn direct(mut self) -> Self {
        self.returns_direct = true;
        self
    }

    pub fn execution_counter(&self) -> Arc<AtomicUsize> {
        self.executions.clone()
    }
}

#[async_trait]
impl Tool for FixedTool {
    fn name(&self) -> &str {
        &self.name
    }

    fn description(&self) -> &str {
        "test tool"
    }

    fn returns_direct(&self) -> bool {
        self.returns_direct
    }

    async fn execute(&self, _input: &str) -> Result<Observation, ToolError> {
        self.executions.fetch_add(1, Ordering::SeqCst);
        Ok(self.observation.clone())
    }
}

/// Tool that always fails
pub struct FailingTool;

#[async_trait]
impl Tool for FailingTool {
    fn name(&self) -> &str {
        "failing"
    }

    fn description(&self) -> &str {
        "always fails"
    }

    async fn execute(&self, _input: &str) -> Result<Observation, ToolError> {
        Err(ToolError::Other("backend unreachable".to_string()))
    }
}

/// Provider that replies with fixed text and records every request
pub struct CannedProvider {
    pub reply: String,
    pub requests: Mutex<Vec<ChatParams>>,
}

impl CannedProvider {
    pub fn new(reply: &str) -> Self {
        Self {
            reply: reply.to_string(),
            requests: Mutex::new(Vec::new()),
        }
    }
}

#[async_trait]
impl Provider for CannedProvider {
    async fn chat(&self, params: ChatParams) -> Result<ChatResponse, ProviderError> {
        self.requests.lock().unwrap().push(params);
        Ok(ChatResponse::text(self.reply.clone()))
    }

    async fn embed(&self, texts: &[String]) -> Result<Vec<Vec<f32>>, ProviderError> {
        Ok(texts.iter().map(|_| vec![0.1, 0.2, 0.3]).collect())
    }

    fn default_model(&self) -> String {
        "canned".to_string()
    }

    fn is_configured(&self) -> bool {
        true
    }
}

/// Provider that must never be called
pub struct StubProvider;

#[async_trait]
impl Provider for StubProvider {
    async fn chat(&self, _params: ChatParams) -> Result<ChatResponse, ProviderError> {
        panic!("provider should not be called in this test");
    }

    async fn embed(&self, _texts: &[String]) -> Result<Vec<Vec<f32>>, ProviderError> {
        panic!("provider should not be called in this test");
    }

    fn default_model(&self) -> String {
        "stub".to_string()
    }

    fn is_configured(&self) -> bool {
        true
    }
}
