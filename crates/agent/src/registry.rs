//! Tool registry

use std::collections::HashMap;

use crate::tool::Tool;

type BoxedTool = Box<dyn Tool>;

/// Name-keyed tool set. Built once at startup, read-only afterwards, so it
/// can be shared across concurrent conversations behind an `Arc`.
pub struct ToolRegistry {
    tools: HashMap<String, BoxedTool>,
}

impl ToolRegistry {
    pub fn new() -> Self {
        Self {
            tools: HashMap::new(),
        }
    }

    pub fn register<T: Tool + 'static>(&mut self, tool: T) {
        let name = tool.name().to_string();
        self.tools.insert(name, Box::new(tool));
    }

    pub fn get(&self, name: &str) -> Option<&dyn Tool> {
        self.tools.get(name).map(|t| t.as_ref())
    }

    pub fn has(&self, name: &str) -> bool {
        self.tools.contains_key(name)
    }

    pub fn names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.tools.keys().cloned().collect();
        names.sort();
        names
    }

    /// (name, description) pairs for the planner's tool prompt
    pub fn descriptors(&self) -> Vec<(String, String)> {
        let mut descriptors: Vec<(String, String)> = self
            .tools
            .values()
            .map(|t| (t.name().to_string(), t.description().to_string()))
            .collect();
        descriptors.sort();
        descriptors
    }
}

impl Default for ToolRegistry {
    fn default() -> Self {
        Self::new()
    }
}
