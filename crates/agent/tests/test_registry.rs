//! Tool registry tests

mod common;

use common::FixedTool;
use presage_agent::{Observation, ToolRegistry};

#[test]
fn new_registry_is_empty() {
    let registry = ToolRegistry::new();
    assert!(registry.names().is_empty());
    assert!(registry.descriptors().is_empty());
}

#[test]
fn register_and_lookup() {
    let mut registry = ToolRegistry::new();
    registry.register(FixedTool::new("docs_search", Observation::answer("x")));
    registry.register(FixedTool::new("ticket_search", Observation::answer("y")));

    assert!(registry.has("docs_search"));
    assert!(registry.has("ticket_search"));
    assert!(!registry.has("answer_library"));

    let tool = registry.get("docs_search").unwrap();
    assert_eq!(tool.name(), "docs_search");
    assert!(registry.get("nope").is_none());
}

#[test]
fn names_and_descriptors_are_sorted() {
    let mut registry = ToolRegistry::new();
    registry.register(FixedTool::new("zeta", Observation::answer("z")));
    registry.register(FixedTool::new("alpha", Observation::answer("a")));

    assert_eq!(registry.names(), vec!["alpha".to_string(), "zeta".to_string()]);
    let descriptors = registry.descriptors();
    assert_eq!(descriptors[0].0, "alpha");
    assert_eq!(descriptors[1].0, "zeta");
}

#[test]
fn reregistering_replaces_the_tool() {
    let mut registry = ToolRegistry::new();
    registry.register(FixedTool::new("docs_search", Observation::answer("old")));
    registry.register(FixedTool::new("docs_search", Observation::answer("new")));

    assert_eq!(registry.names().len(), 1);
}
