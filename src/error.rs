// ABOUTME: Defines all error types for the convoy library using thiserror.
// ABOUTME: Each submodule has its own error enum, unified under ConvoyError.

/// Top-level error type for the convoy library.
#[derive(Debug, thiserror::Error)]
pub enum ConvoyError {
    #[error("LLM error: {0}")]
    Llm(#[from] LlmError),

    #[error("Directory error: {0}")]
    Directory(#[from] DirectoryError),

    #[error("Subagent error: {0}")]
    Subagent(#[from] SubagentError),
}

/// Errors from LLM client operations.
///
/// Concrete clients live in the embedding server; this is the failure surface
/// the subagent loop handles.
#[derive(Debug, thiserror::Error)]
pub enum LlmError {
    #[error("API error ({status}): {message}")]
    Api { status: u16, message: String },
}

/// Errors from conversation directory operations.
#[derive(Debug, thiserror::Error)]
pub enum DirectoryError {
    #[error("parent conversation not found: {0}")]
    ParentNotFound(String),

    #[error("storage error: {0}")]
    Storage(#[from] sqlx::Error),
}

/// Errors from running a subagent turn.
#[derive(Debug, thiserror::Error)]
pub enum SubagentError {
    #[error("LLM error: {0}")]
    Llm(#[from] LlmError),

    #[error("history error: {0}")]
    History(#[source] anyhow::Error),

    #[error("turn exceeded max iterations ({0})")]
    MaxIterations(usize),

    #[error("turn aborted before completion")]
    Aborted,

    #[error("cancelled")]
    Cancelled,
}
