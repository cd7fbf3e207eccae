// ABOUTME: Builds the LLM-facing description and input schema for the subagent
// ABOUTME: tool, reflecting the model catalog in both.

use serde_json::json;

use super::ModelCatalog;

const PREAMBLE: &str = "Spawn or interact with a subagent conversation.

Subagents are independent conversations that can work on subtasks in parallel.
Use subagents for:
- Long-running tasks that you want to delegate
- Token-intensive tasks that produce lots of output, little of which is needed
- Parallel exploration of different approaches
- Breaking down complex problems into independent pieces

Each subagent has its own slug identifier within this conversation.
You can send messages to existing subagents by using the same slug.
The tool returns the subagent's last response, or a status if the timeout is reached.";

/// Build the tool description, listing models when the catalog is non-empty.
pub fn description(models: &ModelCatalog) -> String {
    let mut text = PREAMBLE.to_string();

    if !models.is_empty() {
        text.push_str("\n\nAvailable models (use the \"model\" parameter to override the default):");
        for model in models.iter() {
            match model.display() {
                Some(name) => text.push_str(&format!("\n- {} ({})", model.id, name)),
                None => text.push_str(&format!("\n- {}", model.id)),
            }
        }
    }

    text
}

/// Build the JSON input schema, including a model enum when the catalog is
/// non-empty. Schema and description stay consistent by construction: both
/// read the same catalog.
pub fn input_schema(models: &ModelCatalog) -> serde_json::Value {
    let mut schema = json!({
        "type": "object",
        "required": ["slug", "prompt"],
        "properties": {
            "slug": {
                "type": "string",
                "description": "A short identifier for this subagent (e.g., 'research-api', 'test-runner')"
            },
            "prompt": {
                "type": "string",
                "description": "The message to send to the subagent"
            },
            "timeout_seconds": {
                "type": "integer",
                "description": "How long to wait for a response (default: 60, max: 300)"
            },
            "wait": {
                "type": "boolean",
                "description": "Whether to wait for completion (default: true). If false, returns immediately."
            }
        }
    });

    if !models.is_empty() {
        schema["properties"]["model"] = json!({
            "type": "string",
            "description": "LLM model for the subagent. Defaults to the parent conversation's model.",
            "enum": models.ids()
        });
    }

    schema
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::subagent::AvailableModel;

    fn catalog() -> ModelCatalog {
        ModelCatalog::new(vec![
            AvailableModel::new("sonnet-4"),
            AvailableModel::named("haiku-4.5", "Haiku 4.5"),
        ])
    }

    #[test]
    fn test_description_lists_models() {
        let text = description(&catalog());
        assert!(text.contains("- haiku-4.5 (Haiku 4.5)"));
        assert!(text.contains("- sonnet-4"));
        // sonnet has no display name, so no parenthesized suffix.
        assert!(!text.contains("- sonnet-4 ("));
    }

    #[test]
    fn test_description_empty_catalog_has_no_model_section() {
        let text = description(&ModelCatalog::empty());
        assert!(!text.contains("Available models"));
    }

    #[test]
    fn test_schema_model_enum_preserves_order() {
        let schema = input_schema(&catalog());
        let enum_ids = schema["properties"]["model"]["enum"].as_array().unwrap();
        let ids: Vec<&str> = enum_ids.iter().map(|v| v.as_str().unwrap()).collect();
        assert_eq!(ids, vec!["sonnet-4", "haiku-4.5"]);
    }

    #[test]
    fn test_schema_empty_catalog_has_no_model_field() {
        let schema = input_schema(&ModelCatalog::empty());
        assert!(schema["properties"].get("model").is_none());
        assert!(!schema.to_string().contains("enum"));
    }

    #[test]
    fn test_schema_required_fields() {
        let schema = input_schema(&ModelCatalog::empty());
        let required: Vec<&str> = schema["required"]
            .as_array()
            .unwrap()
            .iter()
            .map(|v| v.as_str().unwrap())
            .collect();
        assert_eq!(required, vec!["slug", "prompt"]);
        assert!(schema["properties"]["timeout_seconds"].is_object());
        assert!(schema["properties"]["wait"].is_object());
    }
}
