// ABOUTME: History storage for conversation transcripts, written in turn-sized
// ABOUTME: increments so same-slug dispatches resume where the child left off.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::llm::Message;

/// Trait for accumulating and retrieving conversation history.
///
/// A subagent turn appends the messages it produced; the next turn addressed
/// to the same slug loads everything earlier turns appended and continues
/// from there. A turn that is torn down before reaching a flush point leaves
/// no trace here.
#[async_trait]
pub trait HistoryStore: Send + Sync {
    /// Append messages to a conversation's history, creating the history on
    /// first use. Order of appends is the order of the transcript.
    async fn append(
        &self,
        conversation_id: &str,
        messages: &[Message],
    ) -> Result<(), anyhow::Error>;

    /// Load the accumulated history for a conversation.
    /// Returns None if no turn has appended to it yet.
    async fn load(&self, conversation_id: &str) -> Result<Option<Vec<Message>>, anyhow::Error>;

    /// Delete a conversation's history.
    async fn delete(&self, conversation_id: &str) -> Result<(), anyhow::Error>;
}

/// In-memory history store.
///
/// Useful for testing and short-lived sessions where persistence is not
/// required.
pub struct MemoryHistoryStore {
    histories: RwLock<HashMap<String, Vec<Message>>>,
}

impl MemoryHistoryStore {
    /// Create a new empty in-memory store.
    pub fn new() -> Self {
        Self {
            histories: RwLock::new(HashMap::new()),
        }
    }

    /// Create a new store wrapped in Arc for sharing.
    pub fn shared() -> Arc<Self> {
        Arc::new(Self::new())
    }

    /// Number of conversations that have accumulated history.
    pub async fn conversation_count(&self) -> usize {
        self.histories.read().await.len()
    }
}

impl Default for MemoryHistoryStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl HistoryStore for MemoryHistoryStore {
    async fn append(
        &self,
        conversation_id: &str,
        messages: &[Message],
    ) -> Result<(), anyhow::Error> {
        self.histories
            .write()
            .await
            .entry(conversation_id.to_string())
            .or_default()
            .extend(messages.iter().cloned());
        Ok(())
    }

    async fn load(&self, conversation_id: &str) -> Result<Option<Vec<Message>>, anyhow::Error> {
        Ok(self.histories.read().await.get(conversation_id).cloned())
    }

    async fn delete(&self, conversation_id: &str) -> Result<(), anyhow::Error> {
        self.histories.write().await.remove(conversation_id);
        Ok(())
    }
}
