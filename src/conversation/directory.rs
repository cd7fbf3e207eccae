// ABOUTME: The conversation directory - resolves (parent, slug) pairs to child
// ABOUTME: conversations, allocating new children with inherited model and cwd.

use std::collections::HashMap;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tokio::sync::RwLock;
use tracing::{debug, info};
use uuid::Uuid;

use crate::error::DirectoryError;

/// A conversation record.
///
/// `parent_id` and `slug` are empty for top-level conversations. Model and
/// working directory are fixed at creation; children inherit the parent's
/// model at allocation time.
#[derive(Debug, Clone)]
pub struct Conversation {
    pub id: String,
    pub parent_id: String,
    pub slug: String,
    pub model: String,
    pub cwd: String,
    pub created_at: DateTime<Utc>,
}

/// A resolved (parent, slug) binding.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Binding {
    pub conversation_id: String,
    pub slug: String,
}

/// Persistent mapping from (parent conversation, slug) to child conversations.
///
/// All slug-uniqueness reasoning lives here; callers never pre-check for
/// collisions. Bindings are created on first reference, reused thereafter,
/// never renamed and never deleted by this subsystem.
#[async_trait]
pub trait Directory: Send + Sync {
    /// Create a top-level conversation.
    async fn create_root(&self, model: &str, cwd: &str) -> Result<Conversation, DirectoryError>;

    /// Fetch a conversation by id.
    async fn get(&self, id: &str) -> Result<Option<Conversation>, DirectoryError>;

    /// Resolve a (parent, slug) binding, allocating a child conversation if
    /// none exists. The child inherits the parent's model; its working
    /// directory is `cwd` as of allocation time. If a concurrent caller binds
    /// the same slug first, the winner's binding is returned unsuffixed.
    ///
    /// Fails if the parent conversation does not exist.
    async fn resolve_or_create(
        &self,
        parent_id: &str,
        slug: &str,
        cwd: &str,
    ) -> Result<Binding, DirectoryError>;

    /// Force-allocate a fresh child even when the slug is taken, appending
    /// `-2`, `-3`, ... until an unbound slug is found. Deterministic and
    /// monotonic per parent.
    async fn create_unique(
        &self,
        parent_id: &str,
        slug: &str,
        cwd: &str,
    ) -> Result<Binding, DirectoryError>;
}

fn new_conversation(parent_id: &str, slug: &str, model: &str, cwd: &str) -> Conversation {
    Conversation {
        id: Uuid::new_v4().to_string(),
        parent_id: parent_id.to_string(),
        slug: slug.to_string(),
        model: model.to_string(),
        cwd: cwd.to_string(),
        created_at: Utc::now(),
    }
}

/// In-memory directory.
///
/// Holds all conversations under one lock; writes are serialized, so the
/// unique-binding discipline is trivially satisfied. Useful for tests and
/// short-lived sessions.
#[derive(Default)]
pub struct MemoryDirectory {
    conversations: RwLock<HashMap<String, Conversation>>,
}

impl MemoryDirectory {
    /// Create a new empty directory.
    pub fn new() -> Self {
        Self::default()
    }

    fn find_binding(map: &HashMap<String, Conversation>, parent_id: &str, slug: &str) -> Option<String> {
        map.values()
            .find(|c| c.parent_id == parent_id && c.slug == slug)
            .map(|c| c.id.clone())
    }
}

#[async_trait]
impl Directory for MemoryDirectory {
    async fn create_root(&self, model: &str, cwd: &str) -> Result<Conversation, DirectoryError> {
        let convo = new_conversation("", "", model, cwd);
        self.conversations
            .write()
            .await
            .insert(convo.id.clone(), convo.clone());
        Ok(convo)
    }

    async fn get(&self, id: &str) -> Result<Option<Conversation>, DirectoryError> {
        Ok(self.conversations.read().await.get(id).cloned())
    }

    async fn resolve_or_create(
        &self,
        parent_id: &str,
        slug: &str,
        cwd: &str,
    ) -> Result<Binding, DirectoryError> {
        let mut map = self.conversations.write().await;

        if let Some(id) = Self::find_binding(&map, parent_id, slug) {
            debug!(parent_id, slug, conversation_id = %id, "reusing subagent binding");
            return Ok(Binding {
                conversation_id: id,
                slug: slug.to_string(),
            });
        }

        let model = map
            .get(parent_id)
            .map(|p| p.model.clone())
            .ok_or_else(|| DirectoryError::ParentNotFound(parent_id.to_string()))?;

        let convo = new_conversation(parent_id, slug, &model, cwd);
        let id = convo.id.clone();
        map.insert(id.clone(), convo);
        info!(parent_id, slug, conversation_id = %id, "allocated subagent conversation");
        Ok(Binding {
            conversation_id: id,
            slug: slug.to_string(),
        })
    }

    async fn create_unique(
        &self,
        parent_id: &str,
        slug: &str,
        cwd: &str,
    ) -> Result<Binding, DirectoryError> {
        let mut map = self.conversations.write().await;

        let model = map
            .get(parent_id)
            .map(|p| p.model.clone())
            .ok_or_else(|| DirectoryError::ParentNotFound(parent_id.to_string()))?;

        let mut n = 1usize;
        let actual = loop {
            let candidate = if n == 1 {
                slug.to_string()
            } else {
                format!("{}-{}", slug, n)
            };
            if Self::find_binding(&map, parent_id, &candidate).is_none() {
                break candidate;
            }
            n += 1;
        };

        let convo = new_conversation(parent_id, &actual, &model, cwd);
        let id = convo.id.clone();
        map.insert(id.clone(), convo);
        info!(parent_id, slug = %actual, conversation_id = %id, "allocated subagent conversation");
        Ok(Binding {
            conversation_id: id,
            slug: actual,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn root(dir: &MemoryDirectory) -> Conversation {
        dir.create_root("sonnet-4", "/tmp/work").await.unwrap()
    }

    #[tokio::test]
    async fn test_resolve_creates_then_reuses() {
        let dir = MemoryDirectory::new();
        let parent = root(&dir).await;

        let first = dir
            .resolve_or_create(&parent.id, "research", "/tmp/work")
            .await
            .unwrap();
        let second = dir
            .resolve_or_create(&parent.id, "research", "/tmp/elsewhere")
            .await
            .unwrap();

        assert_eq!(first, second);
        assert_eq!(first.slug, "research");
    }

    #[tokio::test]
    async fn test_child_inherits_parent_model_and_captures_cwd() {
        let dir = MemoryDirectory::new();
        let parent = root(&dir).await;

        let binding = dir
            .resolve_or_create(&parent.id, "task", "/tmp/other")
            .await
            .unwrap();
        let child = dir.get(&binding.conversation_id).await.unwrap().unwrap();

        assert_eq!(child.model, "sonnet-4");
        assert_eq!(child.cwd, "/tmp/other");
        assert_eq!(child.parent_id, parent.id);
    }

    #[tokio::test]
    async fn test_unknown_parent_is_an_error() {
        let dir = MemoryDirectory::new();
        let err = dir
            .resolve_or_create("no-such-parent", "task", "/tmp")
            .await
            .unwrap_err();
        assert!(matches!(err, DirectoryError::ParentNotFound(_)));
    }

    #[tokio::test]
    async fn test_same_slug_different_parents() {
        let dir = MemoryDirectory::new();
        let p1 = root(&dir).await;
        let p2 = root(&dir).await;

        let b1 = dir.resolve_or_create(&p1.id, "task", "/tmp").await.unwrap();
        let b2 = dir.resolve_or_create(&p2.id, "task", "/tmp").await.unwrap();

        assert_ne!(b1.conversation_id, b2.conversation_id);
    }

    #[tokio::test]
    async fn test_create_unique_suffixes_monotonically() {
        let dir = MemoryDirectory::new();
        let parent = root(&dir).await;

        dir.resolve_or_create(&parent.id, "foo", "/tmp").await.unwrap();
        dir.resolve_or_create(&parent.id, "foo-2", "/tmp").await.unwrap();

        let forced = dir.create_unique(&parent.id, "foo", "/tmp").await.unwrap();
        assert_eq!(forced.slug, "foo-3");
    }

    #[tokio::test]
    async fn test_create_unique_unbound_slug_is_unsuffixed() {
        let dir = MemoryDirectory::new();
        let parent = root(&dir).await;

        let forced = dir.create_unique(&parent.id, "fresh", "/tmp").await.unwrap();
        assert_eq!(forced.slug, "fresh");
    }

    #[tokio::test]
    async fn test_concurrent_same_slug_observes_one_child() {
        let dir = std::sync::Arc::new(MemoryDirectory::new());
        let parent = dir.create_root("m", "/tmp").await.unwrap();

        let a = {
            let dir = dir.clone();
            let pid = parent.id.clone();
            tokio::spawn(async move { dir.resolve_or_create(&pid, "shared", "/tmp").await })
        };
        let b = {
            let dir = dir.clone();
            let pid = parent.id.clone();
            tokio::spawn(async move { dir.resolve_or_create(&pid, "shared", "/tmp").await })
        };

        let a = a.await.unwrap().unwrap();
        let b = b.await.unwrap().unwrap();
        assert_eq!(a.conversation_id, b.conversation_id);
        assert_eq!(a.slug, "shared");
    }
}
