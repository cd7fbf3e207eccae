// ABOUTME: Scheduler - the concrete SubagentRunner driving child conversation
// ABOUTME: turns with per-conversation serialization, timeouts, and cancellation.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use tokio::sync::{oneshot, Mutex};
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

use super::SubagentRunner;
use crate::conversation::HistoryStore;
use crate::error::SubagentError;
use crate::llm::{ContentBlock, LlmClient, Message, Request, Role};
use crate::tool::Registry;

const DEFAULT_SYSTEM_PROMPT: &str = "You are a subagent: an independent conversation \
spawned to work on a delegated task. Focus on the task you are given, use your tools \
as needed, and finish with a clear summary of the outcome. Your final message is \
relayed to the conversation that spawned you.";

const DEFAULT_MAX_ITERATIONS: usize = 10;
const DEFAULT_MAX_TOKENS: u32 = 4096;

/// Drives subagent conversation turns.
///
/// Each turn runs as a background task so a timed-out wait leaves the child
/// working; turns for the same conversation are serialized so a follow-up
/// prompt observes the previous turn's history.
pub struct Scheduler {
    client_factory: Arc<dyn Fn(&str) -> Arc<dyn LlmClient> + Send + Sync>,
    tools: Registry,
    history: Arc<dyn HistoryStore>,
    system_prompt: String,
    max_iterations: usize,
    max_tokens: u32,
    locks: Mutex<HashMap<String, Arc<Mutex<()>>>>,
}

impl Scheduler {
    /// Create a new scheduler.
    ///
    /// # Arguments
    /// * `client_factory` - Function that creates an LLM client for a given model id
    /// * `tools` - Registry of tools available to subagents
    /// * `history` - Store for conversation transcripts
    pub fn new<F>(client_factory: F, tools: Registry, history: Arc<dyn HistoryStore>) -> Self
    where
        F: Fn(&str) -> Arc<dyn LlmClient> + Send + Sync + 'static,
    {
        Self {
            client_factory: Arc::new(client_factory),
            tools,
            history,
            system_prompt: DEFAULT_SYSTEM_PROMPT.to_string(),
            max_iterations: DEFAULT_MAX_ITERATIONS,
            max_tokens: DEFAULT_MAX_TOKENS,
            locks: Mutex::new(HashMap::new()),
        }
    }

    /// Create with a single client shared by every model.
    pub fn with_default_client(
        client: Arc<dyn LlmClient>,
        tools: Registry,
        history: Arc<dyn HistoryStore>,
    ) -> Self {
        let client_clone = client.clone();
        Self::new(move |_| client_clone.clone(), tools, history)
    }

    /// Set the system prompt given to subagents.
    pub fn system_prompt(mut self, prompt: impl Into<String>) -> Self {
        self.system_prompt = prompt.into();
        self
    }

    /// Set the maximum iterations for a single turn's think-act loop.
    pub fn max_iterations(mut self, max: usize) -> Self {
        self.max_iterations = max;
        self
    }

    /// Set the max tokens per LLM call.
    pub fn max_tokens(mut self, max: u32) -> Self {
        self.max_tokens = max;
        self
    }

    /// Get (or create) the lock that serializes turns for a conversation.
    async fn turn_lock(&self, conversation_id: &str) -> Arc<Mutex<()>> {
        let mut locks = self.locks.lock().await;
        locks
            .entry(conversation_id.to_string())
            .or_insert_with(|| Arc::new(Mutex::new(())))
            .clone()
    }
}

#[async_trait]
impl SubagentRunner for Scheduler {
    async fn run(
        &self,
        cancel: &CancellationToken,
        conversation_id: &str,
        prompt: &str,
        wait: bool,
        timeout: Duration,
        model_id: &str,
    ) -> Result<String, SubagentError> {
        let turn = Turn {
            client: (self.client_factory)(model_id),
            tools: self.tools.clone(),
            history: self.history.clone(),
            conversation_id: conversation_id.to_string(),
            system_prompt: self.system_prompt.clone(),
            model_id: model_id.to_string(),
            prompt: prompt.to_string(),
            max_iterations: self.max_iterations,
            max_tokens: self.max_tokens,
        };

        let lock = self.turn_lock(conversation_id).await;
        // The child runs under a token derived from the caller's: parent
        // cancellation tears it down, timeout expiry does not.
        let child_cancel = cancel.child_token();
        let (tx, rx) = oneshot::channel();

        tokio::spawn(async move {
            let _guard = lock.lock().await;
            let conversation_id = turn.conversation_id.clone();
            let result = turn.run(&child_cancel).await;
            match &result {
                Ok(_) => debug!(%conversation_id, "subagent turn completed"),
                Err(SubagentError::Cancelled) => {
                    debug!(%conversation_id, "subagent turn cancelled")
                }
                Err(e) => warn!(%conversation_id, error = %e, "subagent turn failed"),
            }
            // The receiver is gone once the caller timed out or detached.
            let _ = tx.send(result);
        });

        if !wait {
            debug!(conversation_id, "subagent prompt queued in background");
            return Ok("Prompt accepted; the subagent is processing in the background.".to_string());
        }

        tokio::select! {
            biased;
            _ = cancel.cancelled() => Err(SubagentError::Cancelled),
            result = rx => result.unwrap_or(Err(SubagentError::Aborted)),
            _ = tokio::time::sleep(timeout) => {
                warn!(conversation_id, timeout_secs = timeout.as_secs(), "subagent wait timed out");
                Ok(format!(
                    "Subagent did not respond within {}s; it is still working. \
                     Send another message with the same slug to check on it.",
                    timeout.as_secs()
                ))
            }
        }
    }
}

/// One subagent turn: prompt in, think-act loop, final text out.
struct Turn {
    client: Arc<dyn LlmClient>,
    tools: Registry,
    history: Arc<dyn HistoryStore>,
    conversation_id: String,
    system_prompt: String,
    model_id: String,
    prompt: String,
    max_iterations: usize,
    max_tokens: u32,
}

impl Turn {
    async fn run(&self, cancel: &CancellationToken) -> Result<String, SubagentError> {
        // Context is everything earlier turns appended, plus this turn's
        // messages. Only flushed increments reach the store, so a turn torn
        // down mid-flight leaves no partial transcript behind.
        let mut messages = self
            .history
            .load(&self.conversation_id)
            .await
            .map_err(SubagentError::History)?
            .unwrap_or_default();
        let mut unsaved = vec![Message::user(&self.prompt)];
        messages.push(Message::user(&self.prompt));

        let mut iterations = 0;
        loop {
            iterations += 1;
            if iterations > self.max_iterations {
                return Err(SubagentError::MaxIterations(self.max_iterations));
            }

            let request = Request::new(&self.model_id)
                .system(&self.system_prompt)
                .messages(messages.clone())
                .tools(self.tools.to_definitions().await)
                .max_tokens(self.max_tokens);

            let response = tokio::select! {
                biased;
                _ = cancel.cancelled() => return Err(SubagentError::Cancelled),
                r = self.client.create_message(&request) => r?,
            };

            if response.has_tool_use() {
                let assistant = Message {
                    role: Role::Assistant,
                    content: response.content.clone(),
                };
                messages.push(assistant.clone());
                unsaved.push(assistant);

                let mut results = Vec::new();
                for block in &response.content {
                    if let ContentBlock::ToolUse { id, name, input } = block {
                        if cancel.is_cancelled() {
                            return Err(SubagentError::Cancelled);
                        }
                        debug!(conversation_id = %self.conversation_id, tool = %name, "subagent tool call");
                        let result = match self.tools.get(name).await {
                            Some(tool) => match tool.execute(input.clone()).await {
                                Ok(out) if out.is_error => ContentBlock::tool_error(id, &out.content),
                                Ok(out) => ContentBlock::tool_result(id, &out.content),
                                Err(e) => ContentBlock::tool_error(id, e.to_string()),
                            },
                            None => {
                                let available = self.tools.list().await;
                                ContentBlock::tool_error(
                                    id,
                                    format!(
                                        "Tool '{}' not found. Available tools: {}",
                                        name,
                                        available.join(", ")
                                    ),
                                )
                            }
                        };
                        results.push(result);
                    }
                }
                let results = Message::tool_results(results);
                messages.push(results.clone());
                unsaved.push(results);

                self.history
                    .append(&self.conversation_id, &unsaved)
                    .await
                    .map_err(SubagentError::History)?;
                unsaved.clear();
                continue;
            }

            // No tool use - the turn is done.
            unsaved.push(Message {
                role: Role::Assistant,
                content: response.content.clone(),
            });
            self.history
                .append(&self.conversation_id, &unsaved)
                .await
                .map_err(SubagentError::History)?;
            return Ok(response.text());
        }
    }
}
