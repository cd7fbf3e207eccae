// ABOUTME: Defines the LlmClient trait - the abstraction layer that lets the
// ABOUTME: subagent loop run against any provider the embedding server wires in.

use async_trait::async_trait;

use super::{Request, Response};
use crate::error::LlmError;

/// Trait for LLM client implementations.
///
/// The subagent turn loop drives a conversation exclusively through this
/// trait; concrete vendor clients live in the embedding server.
#[async_trait]
pub trait LlmClient: Send + Sync {
    /// Create a message (one model turn).
    async fn create_message(&self, req: &Request) -> Result<Response, LlmError>;
}
