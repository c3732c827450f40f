//! Link repository implementation.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{FromRow, PgPool};

use roastme_core::error::{AppError, ErrorKind};
use roastme_core::result::AppResult;
use roastme_core::types::{LinkId, OwnerId};
use roastme_entity::link::{ClosedReason, Link};

use crate::traits::LinkStore;

/// Raw `links` row.
#[derive(Debug, FromRow)]
struct LinkRow {
    id: String,
    owner_id: String,
    owner_display_name: String,
    owner_avatar_url: String,
    created_at: DateTime<Utc>,
    expires_at: DateTime<Utc>,
    active: bool,
    closed_reason: Option<String>,
}

impl TryFrom<LinkRow> for Link {
    type Error = AppError;

    fn try_from(row: LinkRow) -> Result<Self, Self::Error> {
        let closed_reason = row
            .closed_reason
            .as_deref()
            .map(str::parse::<ClosedReason>)
            .transpose()?;

        Ok(Link {
            id: LinkId::new(row.id),
            owner_id: OwnerId::new(row.owner_id),
            owner_display_name: row.owner_display_name,
            owner_avatar_url: row.owner_avatar_url,
            created_at: row.created_at,
            expires_at: row.expires_at,
            active: row.active,
            closed_reason,
        })
    }
}

/// Repository for link records.
#[derive(Debug, Clone)]
pub struct LinkRepository {
    pool: PgPool,
}

impl LinkRepository {
    /// Create a new link repository.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

fn into_links(rows: Vec<LinkRow>) -> AppResult<Vec<Link>> {
    rows.into_iter().map(Link::try_from).collect()
}

#[async_trait]
impl LinkStore for LinkRepository {
    async fn insert(&self, link: &Link) -> AppResult<()> {
        let result = sqlx::query(
            "INSERT INTO links (id, owner_id, owner_display_name, owner_avatar_url, \
             created_at, expires_at, active) \
             VALUES ($1, $2, $3, $4, $5, $6, $7) ON CONFLICT (id) DO NOTHING",
        )
        .bind(link.id.as_str())
        .bind(link.owner_id.as_str())
        .bind(&link.owner_display_name)
        .bind(&link.owner_avatar_url)
        .bind(link.created_at)
        .bind(link.expires_at)
        .bind(link.active)
        .execute(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to create link", e))?;

        if result.rows_affected() == 0 {
            return Err(AppError::conflict(format!(
                "Link '{}' already exists",
                link.id
            )));
        }
        Ok(())
    }

    async fn find(&self, id: &LinkId) -> AppResult<Option<Link>> {
        sqlx::query_as::<_, LinkRow>("SELECT * FROM links WHERE id = $1")
            .bind(id.as_str())
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to find link", e))?
            .map(Link::try_from)
            .transpose()
    }

    async fn find_by_owner(&self, owner_id: &OwnerId) -> AppResult<Vec<Link>> {
        let rows = sqlx::query_as::<_, LinkRow>(
            "SELECT * FROM links WHERE owner_id = $1 ORDER BY created_at, id",
        )
        .bind(owner_id.as_str())
        .fetch_all(&self.pool)
        .await
        .map_err(|e| {
            AppError::with_source(ErrorKind::Database, "Failed to list links by owner", e)
        })?;
        into_links(rows)
    }

    async fn find_unusable(&self, now: DateTime<Utc>) -> AppResult<Vec<Link>> {
        let rows = sqlx::query_as::<_, LinkRow>(
            "SELECT * FROM links WHERE active = FALSE OR expires_at < $1",
        )
        .bind(now)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| {
            AppError::with_source(ErrorKind::Database, "Failed to list unusable links", e)
        })?;
        into_links(rows)
    }

    async fn close(
        &self,
        id: &LinkId,
        expected_active: bool,
        closed_at: DateTime<Utc>,
        reason: ClosedReason,
    ) -> AppResult<bool> {
        let result = sqlx::query(
            "UPDATE links SET active = FALSE, expires_at = $3, closed_reason = $4 \
             WHERE id = $1 AND active = $2",
        )
        .bind(id.as_str())
        .bind(expected_active)
        .bind(closed_at)
        .bind(reason.as_str())
        .execute(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to close link", e))?;
        Ok(result.rows_affected() > 0)
    }

    async fn delete(&self, id: &LinkId) -> AppResult<bool> {
        let result = sqlx::query("DELETE FROM links WHERE id = $1")
            .bind(id.as_str())
            .execute(&self.pool)
            .await
            .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to delete link", e))?;
        Ok(result.rows_affected() > 0)
    }

    async fn health_check(&self) -> AppResult<bool> {
        sqlx::query_scalar::<_, i32>("SELECT 1")
            .fetch_one(&self.pool)
            .await
            .map(|v| v == 1)
            .map_err(|e| AppError::with_source(ErrorKind::Database, "Health check failed", e))
    }
}
