// ABOUTME: Prelude module - convenient imports for common use cases.
// ABOUTME: Use `use convoy::prelude::*;` to get started quickly.

pub use crate::conversation::{
    Binding, Conversation, Directory, HistoryStore, MemoryDirectory, MemoryHistoryStore,
    SqliteDirectory, WorkingDir,
};
pub use crate::error::{ConvoyError, DirectoryError, LlmError, SubagentError};
pub use crate::llm::{
    ContentBlock, LlmClient, Message, Request, Response, Role, StopReason, ToolDefinition, Usage,
};
pub use crate::subagent::{
    AvailableModel, ModelCatalog, Scheduler, SubagentDisplay, SubagentRunner, SubagentTool,
    UnknownModel, SUBAGENT_TOOL_NAME,
};
pub use crate::tool::{Registry, Tool, ToolResult};
