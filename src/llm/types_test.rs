// ABOUTME: Tests for LLM types - serialization, deserialization, helpers.
// ABOUTME: Verifies JSON format matches provider APIs.

use super::*;

#[test]
fn test_role_serialization() {
    assert_eq!(serde_json::to_string(&Role::User).unwrap(), "\"user\"");
    assert_eq!(
        serde_json::to_string(&Role::Assistant).unwrap(),
        "\"assistant\""
    );
}

#[test]
fn test_content_block_text_serialization() {
    let block = ContentBlock::text("Hello");
    let json = serde_json::to_value(&block).unwrap();
    assert_eq!(json["type"], "text");
    assert_eq!(json["text"], "Hello");
}

#[test]
fn test_content_block_tool_use_deserialization() {
    let json = r#"{
        "type": "tool_use",
        "id": "123",
        "name": "subagent",
        "input": {"slug": "research", "prompt": "dig in"}
    }"#;
    let block: ContentBlock = serde_json::from_str(json).unwrap();
    match block {
        ContentBlock::ToolUse { id, name, input } => {
            assert_eq!(id, "123");
            assert_eq!(name, "subagent");
            assert_eq!(input["slug"], "research");
        }
        _ => panic!("Expected ToolUse"),
    }
}

#[test]
fn test_content_block_tool_error_serialization() {
    let block = ContentBlock::tool_error("123", "slug is required");
    let json = serde_json::to_value(&block).unwrap();
    assert_eq!(json["type"], "tool_result");
    assert_eq!(json["is_error"], true);
}

#[test]
fn test_message_helpers() {
    let msg = Message::user("Hello");
    assert_eq!(msg.role, Role::User);
    assert_eq!(msg.content.len(), 1);

    let msg = Message::assistant("Hi there!");
    assert_eq!(msg.role, Role::Assistant);

    let msg = Message::tool_results(vec![ContentBlock::tool_result("1", "ok")]);
    assert_eq!(msg.role, Role::User);
}

#[test]
fn test_request_builder() {
    let req = Request::new("sonnet-4")
        .message(Message::user("Hi"))
        .system("You are a subagent")
        .max_tokens(1024);

    assert_eq!(req.model, "sonnet-4");
    assert_eq!(req.messages.len(), 1);
    assert_eq!(req.system, Some("You are a subagent".to_string()));
    assert_eq!(req.max_tokens, Some(1024));
}

#[test]
fn test_response_has_tool_use() {
    let response = Response {
        id: "msg_1".into(),
        content: vec![
            ContentBlock::text("Let me check."),
            ContentBlock::ToolUse {
                id: "tu_1".into(),
                name: "subagent".into(),
                input: serde_json::json!({}),
            },
        ],
        stop_reason: StopReason::ToolUse,
        model: "sonnet-4".into(),
        usage: Usage::default(),
    };
    assert!(response.has_tool_use());
    assert_eq!(response.text(), "Let me check.");
}

#[test]
fn test_response_text_concatenates_blocks() {
    let response = Response {
        id: "msg_2".into(),
        content: vec![ContentBlock::text("part one"), ContentBlock::text(" part two")],
        stop_reason: StopReason::EndTurn,
        model: "sonnet-4".into(),
        usage: Usage::default(),
    };
    assert_eq!(response.text(), "part one part two");
}
