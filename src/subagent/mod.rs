// ABOUTME: Subagent orchestration module - spawn and resume child conversations.
// ABOUTME: Provides the sanitizer, model catalog, descriptor, runner contract, scheduler, and tool.

pub mod descriptor;
mod models;
mod runner;
mod scheduler;
pub mod slug;
mod tool;

pub use models::{AvailableModel, ModelCatalog, UnknownModel};
pub use runner::SubagentRunner;
pub use scheduler::Scheduler;
pub use tool::{SubagentDisplay, SubagentTool, SUBAGENT_TOOL_NAME};
