// ABOUTME: SQLite-backed conversation directory using sqlx.
// ABOUTME: A unique index on (parent_id, slug) is the allocation race arbiter.

use std::path::Path;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions, SqliteRow};
use sqlx::Row;
use tracing::{debug, info};
use uuid::Uuid;

use super::{Binding, Conversation, Directory};
use crate::error::DirectoryError;

/// Persistent conversation directory backed by SQLite.
///
/// Writers race on the unique `(parent_id, slug)` index; a loser re-reads the
/// winner's row instead of suffixing. Readers never block writers.
pub struct SqliteDirectory {
    pool: SqlitePool,
}

impl SqliteDirectory {
    /// Create a directory over an existing pool, running migrations.
    pub async fn new(pool: SqlitePool) -> Result<Self, DirectoryError> {
        let dir = Self { pool };
        dir.migrate().await?;
        Ok(dir)
    }

    /// Open (or create) a database file at the given path.
    pub async fn open(path: impl AsRef<Path>) -> Result<Self, DirectoryError> {
        let options = SqliteConnectOptions::new()
            .filename(path.as_ref())
            .create_if_missing(true);
        let pool = SqlitePoolOptions::new().connect_with(options).await?;
        Self::new(pool).await
    }

    /// Open an in-memory database. The pool is pinned to one connection so
    /// every caller sees the same database.
    pub async fn in_memory() -> Result<Self, DirectoryError> {
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect("sqlite::memory:")
            .await?;
        Self::new(pool).await
    }

    async fn migrate(&self) -> Result<(), DirectoryError> {
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS conversations (
                id TEXT PRIMARY KEY,
                parent_id TEXT NOT NULL DEFAULT '',
                slug TEXT NOT NULL DEFAULT '',
                model TEXT NOT NULL DEFAULT '',
                cwd TEXT NOT NULL DEFAULT '',
                created_at TEXT NOT NULL
            )
            "#,
        )
        .execute(&self.pool)
        .await?;

        // Top-level conversations all carry an empty slug, so the uniqueness
        // constraint only applies to subagent bindings.
        sqlx::query(
            r#"
            CREATE UNIQUE INDEX IF NOT EXISTS idx_conversations_parent_slug
            ON conversations (parent_id, slug) WHERE slug <> ''
            "#,
        )
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn lookup_binding(
        &self,
        parent_id: &str,
        slug: &str,
    ) -> Result<Option<String>, DirectoryError> {
        let row = sqlx::query(
            "SELECT id FROM conversations WHERE parent_id = ? AND slug = ?",
        )
        .bind(parent_id)
        .bind(slug)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(|r| r.get("id")))
    }

    async fn insert_child(
        &self,
        parent_id: &str,
        slug: &str,
        model: &str,
        cwd: &str,
    ) -> Result<String, sqlx::Error> {
        let id = Uuid::new_v4().to_string();
        sqlx::query(
            r#"
            INSERT INTO conversations (id, parent_id, slug, model, cwd, created_at)
            VALUES (?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&id)
        .bind(parent_id)
        .bind(slug)
        .bind(model)
        .bind(cwd)
        .bind(Utc::now().to_rfc3339())
        .execute(&self.pool)
        .await?;
        Ok(id)
    }

    async fn parent_model(&self, parent_id: &str) -> Result<String, DirectoryError> {
        self.get(parent_id)
            .await?
            .map(|p| p.model)
            .ok_or_else(|| DirectoryError::ParentNotFound(parent_id.to_string()))
    }
}

fn is_unique_violation(err: &sqlx::Error) -> bool {
    err.as_database_error()
        .map(|db| db.is_unique_violation())
        .unwrap_or(false)
}

fn row_to_conversation(row: &SqliteRow) -> Result<Conversation, DirectoryError> {
    let created_at: String = row.get("created_at");
    let created_at = DateTime::parse_from_rfc3339(&created_at)
        .map_err(|e| DirectoryError::Storage(sqlx::Error::Decode(Box::new(e))))?
        .with_timezone(&Utc);

    Ok(Conversation {
        id: row.get("id"),
        parent_id: row.get("parent_id"),
        slug: row.get("slug"),
        model: row.get("model"),
        cwd: row.get("cwd"),
        created_at,
    })
}

#[async_trait]
impl Directory for SqliteDirectory {
    async fn create_root(&self, model: &str, cwd: &str) -> Result<Conversation, DirectoryError> {
        let id = Uuid::new_v4().to_string();
        let created_at = Utc::now();
        sqlx::query(
            r#"
            INSERT INTO conversations (id, parent_id, slug, model, cwd, created_at)
            VALUES (?, '', '', ?, ?, ?)
            "#,
        )
        .bind(&id)
        .bind(model)
        .bind(cwd)
        .bind(created_at.to_rfc3339())
        .execute(&self.pool)
        .await?;

        Ok(Conversation {
            id,
            parent_id: String::new(),
            slug: String::new(),
            model: model.to_string(),
            cwd: cwd.to_string(),
            created_at,
        })
    }

    async fn get(&self, id: &str) -> Result<Option<Conversation>, DirectoryError> {
        let row = sqlx::query("SELECT * FROM conversations WHERE id = ?")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        row.as_ref().map(row_to_conversation).transpose()
    }

    async fn resolve_or_create(
        &self,
        parent_id: &str,
        slug: &str,
        cwd: &str,
    ) -> Result<Binding, DirectoryError> {
        loop {
            if let Some(id) = self.lookup_binding(parent_id, slug).await? {
                debug!(parent_id, slug, conversation_id = %id, "reusing subagent binding");
                return Ok(Binding {
                    conversation_id: id,
                    slug: slug.to_string(),
                });
            }

            let model = self.parent_model(parent_id).await?;
            match self.insert_child(parent_id, slug, &model, cwd).await {
                Ok(id) => {
                    info!(parent_id, slug, conversation_id = %id, "allocated subagent conversation");
                    return Ok(Binding {
                        conversation_id: id,
                        slug: slug.to_string(),
                    });
                }
                // Lost the allocation race; the next lookup returns the winner.
                Err(e) if is_unique_violation(&e) => continue,
                Err(e) => return Err(e.into()),
            }
        }
    }

    async fn create_unique(
        &self,
        parent_id: &str,
        slug: &str,
        cwd: &str,
    ) -> Result<Binding, DirectoryError> {
        let model = self.parent_model(parent_id).await?;

        let mut n = 1usize;
        loop {
            let candidate = if n == 1 {
                slug.to_string()
            } else {
                format!("{}-{}", slug, n)
            };
            match self.insert_child(parent_id, &candidate, &model, cwd).await {
                Ok(id) => {
                    info!(parent_id, slug = %candidate, conversation_id = %id, "allocated subagent conversation");
                    return Ok(Binding {
                        conversation_id: id,
                        slug: candidate,
                    });
                }
                Err(e) if is_unique_violation(&e) => {
                    n += 1;
                    continue;
                }
                Err(e) => return Err(e.into()),
            }
        }
    }
}
