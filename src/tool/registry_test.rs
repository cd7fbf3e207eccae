// ABOUTME: Tests for tool Registry using subagent-shaped fixtures - the
// ABOUTME: catalog a child turn draws its definitions and lookups from.

use super::*;

/// Stub of the subagent tool surface: takes a slug, reports display data.
struct SpawnStub;

#[async_trait::async_trait]
impl Tool for SpawnStub {
    fn name(&self) -> &str {
        "spawn"
    }

    fn description(&self) -> &str {
        "Delegate a task to a child conversation"
    }

    fn schema(&self) -> serde_json::Value {
        serde_json::json!({
            "type": "object",
            "required": ["slug", "prompt"],
            "properties": {
                "slug": { "type": "string" },
                "prompt": { "type": "string" }
            }
        })
    }

    async fn execute(&self, params: serde_json::Value) -> Result<ToolResult, anyhow::Error> {
        let slug = params["slug"].as_str().unwrap_or("");
        if slug.is_empty() {
            return Ok(ToolResult::error("slug is required"));
        }
        Ok(
            ToolResult::text(format!("Subagent '{}' response:\nok", slug)).with_display(
                serde_json::json!({
                    "slug": slug,
                    "conversation_id": format!("conv-{}", slug),
                }),
            ),
        )
    }
}

/// Second fixture so ordering and counting have something to bite on.
struct CwdStub;

#[async_trait::async_trait]
impl Tool for CwdStub {
    fn name(&self) -> &str {
        "cwd"
    }

    fn description(&self) -> &str {
        "Report the conversation's working directory"
    }

    fn schema(&self) -> serde_json::Value {
        serde_json::json!({"type": "object", "properties": {}})
    }

    async fn execute(&self, _params: serde_json::Value) -> Result<ToolResult, anyhow::Error> {
        Ok(ToolResult::text("/tmp/project"))
    }
}

#[tokio::test]
async fn test_registered_tool_runs_with_display_payload() {
    let registry = Registry::new();
    registry.register(SpawnStub).await;

    let tool = registry.get("spawn").await.expect("spawn should resolve");
    let result = tool
        .execute(serde_json::json!({"slug": "research", "prompt": "dig in"}))
        .await
        .unwrap();

    assert!(result.content.starts_with("Subagent 'research' response:"));
    let display = result.display.expect("display data");
    assert_eq!(display["slug"], "research");
    assert_eq!(display["conversation_id"], "conv-research");
}

#[tokio::test]
async fn test_lookup_miss_returns_none() {
    let registry = Registry::new();
    registry.register(SpawnStub).await;

    // A turn asking for an unregistered tool gets None and reports it.
    assert!(registry.get("patch").await.is_none());
}

#[tokio::test]
async fn test_unregister_revokes_access() {
    let registry = Registry::new();
    registry.register(SpawnStub).await;
    registry.register(CwdStub).await;
    assert_eq!(registry.count().await, 2);

    registry.unregister("spawn").await;
    assert_eq!(registry.count().await, 1);
    assert!(registry.get("spawn").await.is_none());
    assert!(registry.get("cwd").await.is_some());
}

#[tokio::test]
async fn test_list_is_sorted_for_error_messages() {
    let registry = Registry::new();
    registry.register(SpawnStub).await;
    registry.register(CwdStub).await;

    // The turn loop joins this list into its unknown-tool error.
    assert_eq!(registry.list().await, vec!["cwd", "spawn"]);
}

#[tokio::test]
async fn test_definitions_carry_subagent_schema() {
    let registry = Registry::new();
    registry.register(SpawnStub).await;

    let defs = registry.to_definitions().await;
    assert_eq!(defs.len(), 1);
    assert_eq!(defs[0].name, "spawn");
    assert_eq!(defs[0].description, "Delegate a task to a child conversation");

    let required: Vec<&str> = defs[0].input_schema["required"]
        .as_array()
        .unwrap()
        .iter()
        .map(|v| v.as_str().unwrap())
        .collect();
    assert_eq!(required, vec!["slug", "prompt"]);
}

#[tokio::test]
async fn test_clone_shares_tools_with_child_turns() {
    let registry = Registry::new();
    // The scheduler clones the registry into each spawned turn; a tool
    // registered afterwards is visible through the clone.
    let turn_view = registry.clone();
    registry.register(SpawnStub).await;

    assert!(turn_view.get("spawn").await.is_some());
    assert_eq!(turn_view.count().await, 1);
}
