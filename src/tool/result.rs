// ABOUTME: Defines the ToolResult type - a unified structure for tool
// ABOUTME: execution outcomes with LLM content, error state, and UI display data.

use serde::Serialize;

/// Result of a tool execution.
///
/// `content` is what the model sees; `display` is an optional structured
/// payload for the UI to render alongside the tool call.
#[derive(Debug, Clone)]
pub struct ToolResult {
    /// The output content, fed back to the LLM.
    pub content: String,

    /// Whether this result represents an error.
    pub is_error: bool,

    /// Optional structured payload for the UI.
    pub display: Option<serde_json::Value>,
}

impl ToolResult {
    /// Create a successful text result.
    pub fn text(content: impl Into<String>) -> Self {
        Self {
            content: content.into(),
            is_error: false,
            display: None,
        }
    }

    /// Create an error result.
    pub fn error(message: impl Into<String>) -> Self {
        Self {
            content: message.into(),
            is_error: true,
            display: None,
        }
    }

    /// Attach display data to the result.
    pub fn with_display(mut self, display: impl Serialize) -> Self {
        if let Ok(v) = serde_json::to_value(display) {
            self.display = Some(v);
        }
        self
    }
}

impl Default for ToolResult {
    fn default() -> Self {
        Self::text("")
    }
}
