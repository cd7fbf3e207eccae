// ABOUTME: Tests for ToolResult - construction helpers and display data.
// ABOUTME: Verifies error flag and display payload behavior.

use serde::Serialize;

use super::*;

#[test]
fn test_text_result() {
    let result = ToolResult::text("all good");
    assert_eq!(result.content, "all good");
    assert!(!result.is_error);
    assert!(result.display.is_none());
}

#[test]
fn test_error_result() {
    let result = ToolResult::error("something broke");
    assert_eq!(result.content, "something broke");
    assert!(result.is_error);
}

#[test]
fn test_default_is_empty_text() {
    let result = ToolResult::default();
    assert_eq!(result.content, "");
    assert!(!result.is_error);
}

#[test]
fn test_with_display() {
    #[derive(Serialize)]
    struct Payload {
        slug: String,
        conversation_id: String,
    }

    let result = ToolResult::text("done").with_display(Payload {
        slug: "research".into(),
        conversation_id: "conv-1".into(),
    });

    let display = result.display.expect("display should be set");
    assert_eq!(display["slug"], "research");
    assert_eq!(display["conversation_id"], "conv-1");
}

#[test]
fn test_with_display_overwrites() {
    let result = ToolResult::text("x")
        .with_display(serde_json::json!({"a": 1}))
        .with_display(serde_json::json!({"b": 2}));
    assert_eq!(result.display.unwrap()["b"], 2);
}
