//! ChatPlanner prompt assembly and decision parsing

mod common;

use std::sync::Arc;

use common::CannedProvider;
use presage_agent::{ChatPlanner, Decision, Planner};
use presage_provider::Message;

fn tools() -> Vec<(String, String)> {
    vec![
        (
            "docs_search".to_string(),
            "Search the vendor documentation database.".to_string(),
        ),
        (
            "ticket_search".to_string(),
            "Search previous support tickets.".to_string(),
        ),
    ]
}

#[tokio::test]
async fn prompt_carries_history_input_and_scratchpad_in_order() {
    let provider = Arc::new(CannedProvider::new(
        r#"{"action": "final", "action_input": "Hi!"}"#,
    ));
    let planner = ChatPlanner::new(provider.clone(), "test-model", tools());

    let history = vec![
        Message::user("earlier question"),
        Message::assistant("earlier answer"),
    ];
    let scratchpad = vec![
        Message::assistant("thought"),
        Message::user("tool response"),
    ];

    let decision = planner
        .plan(&history, &scratchpad, "current question")
        .await
        .unwrap();
    assert_eq!(decision, Decision::Finish("Hi!".to_string()));

    let requests = provider.requests.lock().unwrap();
    assert_eq!(requests.len(), 1);
    let messages = &requests[0].messages;

    assert_eq!(requests[0].model, "test-model");
    assert_eq!(messages[0].role, "system");
    assert_eq!(messages[1].content, "earlier question");
    assert_eq!(messages[2].content, "earlier answer");
    assert_eq!(messages[3].content, "current question");
    assert_eq!(messages[4].content, "thought");
    assert_eq!(messages[5].content, "tool response");
    assert_eq!(messages.len(), 6);
}

#[tokio::test]
async fn system_prompt_lists_tools_and_both_schemas() {
    let provider = Arc::new(CannedProvider::new(
        r#"{"action": "final", "action_input": "ok"}"#,
    ));
    let planner = ChatPlanner::new(provider.clone(), "test-model", tools());

    planner.plan(&[], &[], "hello").await.unwrap();

    let requests = provider.requests.lock().unwrap();
    let system = &requests[0].messages[0].content;

    assert!(system.contains("> docs_search: Search the vendor documentation database."));
    assert!(system.contains("> ticket_search:"));
    assert!(system.contains("docs_search, ticket_search"));
    assert!(system.contains(r#"{"action": "<tool name>", "action_input": "<input to the tool>"}"#));
    assert!(system.contains(r#""action": "final""#));
}

#[tokio::test]
async fn fenced_tool_choice_is_parsed_into_an_action() {
    let provider = Arc::new(CannedProvider::new(
        "```json\n{\"action\": \"docs_search\", \"action_input\": \"FortiGate,7.2.4,SD-WAN\"}\n```",
    ));
    let planner = ChatPlanner::new(provider, "test-model", tools());

    let decision = planner.plan(&[], &[], "how does SD-WAN work?").await.unwrap();
    match decision {
        Decision::Act(action) => {
            assert_eq!(action.tool, "docs_search");
            assert_eq!(action.input, "FortiGate,7.2.4,SD-WAN");
            // The raw reply, fences and all, is kept for scratchpad replay
            assert!(action.log.starts_with("```json"));
        }
        other => panic!("expected Act, got {:?}", other),
    }
}
