//! Chat session repository implementation.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{FromRow, PgPool};
use uuid::Uuid;

use roastme_core::error::{AppError, ErrorKind};
use roastme_core::result::AppResult;
use roastme_core::types::LinkId;
use roastme_entity::chat::{Message, NewMessage, Presence, SessionPurge};

use crate::traits::SessionStore;

#[derive(Debug, FromRow)]
struct MessageRow {
    id: Uuid,
    link_id: String,
    codename: String,
    content: String,
    created_at: DateTime<Utc>,
}

impl From<MessageRow> for Message {
    fn from(row: MessageRow) -> Self {
        Self {
            id: row.id,
            link_id: LinkId::new(row.link_id),
            codename: row.codename,
            content: row.content,
            created_at: row.created_at,
        }
    }
}

#[derive(Debug, FromRow)]
struct PresenceRow {
    link_id: String,
    codename: String,
    joined_at: DateTime<Utc>,
    is_typing: bool,
}

impl From<PresenceRow> for Presence {
    fn from(row: PresenceRow) -> Self {
        Self {
            link_id: LinkId::new(row.link_id),
            codename: row.codename,
            joined_at: row.joined_at,
            is_typing: row.is_typing,
        }
    }
}

/// Repository for messages and presence rows.
#[derive(Debug, Clone)]
pub struct SessionRepository {
    pool: PgPool,
}

impl SessionRepository {
    /// Create a new session repository.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl SessionStore for SessionRepository {
    async fn add_message(&self, link_id: &LinkId, message: &NewMessage) -> AppResult<Message> {
        sqlx::query_as::<_, MessageRow>(
            "INSERT INTO messages (id, link_id, codename, content) VALUES ($1, $2, $3, $4) \
             RETURNING id, link_id, codename, content, created_at",
        )
        .bind(Uuid::new_v4())
        .bind(link_id.as_str())
        .bind(&message.codename)
        .bind(&message.content)
        .fetch_one(&self.pool)
        .await
        .map(Message::from)
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to add message", e))
    }

    async fn list_messages(&self, link_id: &LinkId) -> AppResult<Vec<Message>> {
        let rows = sqlx::query_as::<_, MessageRow>(
            "SELECT id, link_id, codename, content, created_at FROM messages \
             WHERE link_id = $1 ORDER BY created_at, seq",
        )
        .bind(link_id.as_str())
        .fetch_all(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to list messages", e))?;
        Ok(rows.into_iter().map(Message::from).collect())
    }

    async fn upsert_presence(&self, link_id: &LinkId, codename: &str) -> AppResult<Presence> {
        sqlx::query_as::<_, PresenceRow>(
            "INSERT INTO presence (link_id, codename) VALUES ($1, $2) \
             ON CONFLICT (link_id, codename) DO UPDATE SET is_typing = FALSE \
             RETURNING link_id, codename, joined_at, is_typing",
        )
        .bind(link_id.as_str())
        .bind(codename)
        .fetch_one(&self.pool)
        .await
        .map(Presence::from)
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to upsert presence", e))
    }

    async fn find_presence(
        &self,
        link_id: &LinkId,
        codename: &str,
    ) -> AppResult<Option<Presence>> {
        sqlx::query_as::<_, PresenceRow>(
            "SELECT link_id, codename, joined_at, is_typing FROM presence \
             WHERE link_id = $1 AND codename = $2",
        )
        .bind(link_id.as_str())
        .bind(codename)
        .fetch_optional(&self.pool)
        .await
        .map(|row| row.map(Presence::from))
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to find presence", e))
    }

    async fn set_typing(
        &self,
        link_id: &LinkId,
        codename: &str,
        is_typing: bool,
    ) -> AppResult<bool> {
        let result = sqlx::query(
            "UPDATE presence SET is_typing = $3 WHERE link_id = $1 AND codename = $2",
        )
        .bind(link_id.as_str())
        .bind(codename)
        .bind(is_typing)
        .execute(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to update typing", e))?;
        Ok(result.rows_affected() > 0)
    }

    async fn remove_presence(&self, link_id: &LinkId, codename: &str) -> AppResult<bool> {
        let result = sqlx::query("DELETE FROM presence WHERE link_id = $1 AND codename = $2")
            .bind(link_id.as_str())
            .bind(codename)
            .execute(&self.pool)
            .await
            .map_err(|e| {
                AppError::with_source(ErrorKind::Database, "Failed to remove presence", e)
            })?;
        Ok(result.rows_affected() > 0)
    }

    async fn list_presence(&self, link_id: &LinkId) -> AppResult<Vec<Presence>> {
        let rows = sqlx::query_as::<_, PresenceRow>(
            "SELECT link_id, codename, joined_at, is_typing FROM presence \
             WHERE link_id = $1 ORDER BY joined_at, codename",
        )
        .bind(link_id.as_str())
        .fetch_all(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to list presence", e))?;
        Ok(rows.into_iter().map(Presence::from).collect())
    }

    async fn purge(&self, link_id: &LinkId) -> AppResult<SessionPurge> {
        let messages = sqlx::query("DELETE FROM messages WHERE link_id = $1")
            .bind(link_id.as_str())
            .execute(&self.pool)
            .await
            .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to purge messages", e))?
            .rows_affected();

        let presence = sqlx::query("DELETE FROM presence WHERE link_id = $1")
            .bind(link_id.as_str())
            .execute(&self.pool)
            .await
            .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to purge presence", e))?
            .rows_affected();

        Ok(SessionPurge { messages, presence })
    }

    async fn session_ids(&self) -> AppResult<Vec<LinkId>> {
        let ids: Vec<String> = sqlx::query_scalar(
            "SELECT link_id FROM messages UNION SELECT link_id FROM presence ORDER BY 1",
        )
        .fetch_all(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to list sessions", e))?;
        Ok(ids.into_iter().map(LinkId::new).collect())
    }
}
