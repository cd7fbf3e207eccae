// ABOUTME: SubagentRunner - the injected contract for driving one child
// ABOUTME: conversation turn, breaking the tool/scheduler dependency cycle.

use std::time::Duration;

use async_trait::async_trait;
use tokio_util::sync::CancellationToken;

use crate::error::SubagentError;

/// Runs a subagent conversation turn on behalf of the subagent tool.
///
/// The tool depends only on this trait; the concrete scheduler is injected at
/// construction. Without the inversion the tool subsystem would import the
/// scheduler, which in turn instantiates tools.
///
/// Contract:
/// - `wait=true` blocks until the child emits its final turn, `timeout`
///   elapses, or `cancel` fires. Timeout expiry is not an error: the child
///   keeps running in the background and the caller receives a status string.
/// - `wait=false` enqueues the prompt and returns promptly with a status
///   string.
/// - Cancellation propagates into the child's own loop and tears it down;
///   it surfaces as `SubagentError::Cancelled`.
#[async_trait]
pub trait SubagentRunner: Send + Sync {
    async fn run(
        &self,
        cancel: &CancellationToken,
        conversation_id: &str,
        prompt: &str,
        wait: bool,
        timeout: Duration,
        model_id: &str,
    ) -> Result<String, SubagentError>;
}
