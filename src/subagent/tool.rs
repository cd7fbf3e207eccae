// ABOUTME: SubagentTool - validates subagent requests, binds child
// ABOUTME: conversations, and dispatches prompts through the injected runner.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tokio_util::sync::CancellationToken;
use tracing::debug;

use super::{descriptor, slug, ModelCatalog, SubagentRunner};
use crate::conversation::{Directory, WorkingDir};
use crate::tool::{Tool, ToolResult};

/// Name the tool is registered under.
pub const SUBAGENT_TOOL_NAME: &str = "subagent";

const DEFAULT_TIMEOUT_SECS: i64 = 60;
const MAX_TIMEOUT_SECS: i64 = 300;

/// Display data sent to the UI for subagent tool results, letting it link the
/// rendered tool call to the child conversation view.
#[derive(Debug, Clone, Serialize)]
pub struct SubagentDisplay {
    pub slug: String,
    pub conversation_id: String,
}

#[derive(Debug, Deserialize)]
struct SubagentRequest {
    #[serde(default)]
    slug: String,
    #[serde(default)]
    prompt: String,
    #[serde(default)]
    timeout_seconds: Option<i64>,
    #[serde(default)]
    wait: Option<bool>,
    #[serde(default)]
    model: Option<String>,
}

/// The subagent tool: spawn or resume a child conversation from a parent.
///
/// One instance serves one parent conversation. The runner is injected so the
/// tool never depends on the scheduler that instantiates it.
pub struct SubagentTool {
    directory: Arc<dyn Directory>,
    runner: Arc<dyn SubagentRunner>,
    parent_id: String,
    working_dir: WorkingDir,
    model_id: String,
    models: ModelCatalog,
    cancel: CancellationToken,
    description: String,
}

impl SubagentTool {
    /// Create a subagent tool for a parent conversation.
    ///
    /// # Arguments
    /// * `directory` - Conversation directory for (parent, slug) bindings
    /// * `runner` - Executor for child conversation turns
    /// * `parent_id` - The parent conversation's id
    /// * `working_dir` - The parent's mutable working directory handle
    /// * `model_id` - The parent's model id (default for subagents)
    pub fn new(
        directory: Arc<dyn Directory>,
        runner: Arc<dyn SubagentRunner>,
        parent_id: impl Into<String>,
        working_dir: WorkingDir,
        model_id: impl Into<String>,
    ) -> Self {
        let models = ModelCatalog::empty();
        Self {
            directory,
            runner,
            parent_id: parent_id.into(),
            working_dir,
            model_id: model_id.into(),
            description: descriptor::description(&models),
            models,
            cancel: CancellationToken::new(),
        }
    }

    /// Set the catalog of models subagent calls may select.
    pub fn models(mut self, models: ModelCatalog) -> Self {
        self.description = descriptor::description(&models);
        self.models = models;
        self
    }

    /// Set the parent conversation's cancellation token. Cancelling it aborts
    /// in-flight subagent calls and tears their children down.
    pub fn cancellation(mut self, token: CancellationToken) -> Self {
        self.cancel = token;
        self
    }

    /// Resolve the effective timeout: default 60s, values above 300s silently
    /// clamped, values at or below zero replaced by the default.
    fn resolve_timeout(timeout_seconds: Option<i64>) -> Duration {
        let secs = match timeout_seconds {
            Some(secs) if secs > 0 => secs.min(MAX_TIMEOUT_SECS),
            _ => DEFAULT_TIMEOUT_SECS,
        };
        Duration::from_secs(secs as u64)
    }
}

#[async_trait]
impl Tool for SubagentTool {
    fn name(&self) -> &str {
        SUBAGENT_TOOL_NAME
    }

    fn description(&self) -> &str {
        &self.description
    }

    fn schema(&self) -> serde_json::Value {
        descriptor::input_schema(&self.models)
    }

    async fn execute(&self, params: serde_json::Value) -> Result<ToolResult, anyhow::Error> {
        let req: SubagentRequest = match serde_json::from_value(params) {
            Ok(req) => req,
            Err(e) => {
                return Ok(ToolResult::error(format!(
                    "failed to parse subagent input: {}",
                    e
                )))
            }
        };

        if req.slug.is_empty() {
            return Ok(ToolResult::error("slug is required"));
        }
        let requested = slug::sanitize(&req.slug);
        if requested.is_empty() {
            return Ok(ToolResult::error("slug must contain alphanumeric characters"));
        }

        if req.prompt.is_empty() {
            return Ok(ToolResult::error("prompt is required"));
        }

        let timeout = Self::resolve_timeout(req.timeout_seconds);
        let wait = req.wait.unwrap_or(true);

        // Explicit choice wins over the parent's model.
        let mut model_id = self.model_id.clone();
        if let Some(model) = req.model.as_deref().filter(|m| !m.is_empty()) {
            if !self.models.is_empty() {
                if let Err(e) = self.models.validate(model) {
                    return Ok(ToolResult::error(e.to_string()));
                }
            }
            model_id = model.to_string();
        }

        // New bindings capture the parent's working directory as of now;
        // existing bindings keep the directory they were created with.
        let cwd = self.working_dir.get();
        let binding = match self
            .directory
            .resolve_or_create(&self.parent_id, &requested, &cwd.to_string_lossy())
            .await
        {
            Ok(binding) => binding,
            Err(e) => {
                return Ok(ToolResult::error(format!(
                    "failed to get/create subagent conversation: {}",
                    e
                )))
            }
        };

        debug!(
            parent_id = %self.parent_id,
            slug = %binding.slug,
            conversation_id = %binding.conversation_id,
            model = %model_id,
            wait,
            "dispatching subagent prompt"
        );

        let response = match self
            .runner
            .run(
                &self.cancel,
                &binding.conversation_id,
                &req.prompt,
                wait,
                timeout,
                &model_id,
            )
            .await
        {
            Ok(text) => text,
            Err(e) => return Ok(ToolResult::error(format!("subagent error: {}", e))),
        };

        let slug_note = if binding.slug != requested {
            format!(
                " (Note: slug was changed to '{}' for uniqueness. Use '{}' for future messages to this subagent.)",
                binding.slug, binding.slug
            )
        } else {
            String::new()
        };

        Ok(ToolResult::text(format!(
            "Subagent '{}' response:{}\n{}",
            binding.slug, slug_note, response
        ))
        .with_display(SubagentDisplay {
            slug: binding.slug,
            conversation_id: binding.conversation_id,
        }))
    }
}
