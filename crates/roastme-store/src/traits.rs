//! Store traits implemented by every backend.

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use roastme_core::result::AppResult;
use roastme_core::types::{LinkId, OwnerId};
use roastme_entity::chat::{Message, NewMessage, Presence, SessionPurge};
use roastme_entity::link::{ClosedReason, Link};

/// Keyed storage of [`Link`] records.
///
/// Reads return raw records; usability is decided by the caller.
#[async_trait]
pub trait LinkStore: Send + Sync + std::fmt::Debug + 'static {
    /// Insert a new link. Fails with `Conflict` if the ID is already taken.
    async fn insert(&self, link: &Link) -> AppResult<()>;

    /// Fetch a link by ID.
    async fn find(&self, id: &LinkId) -> AppResult<Option<Link>>;

    /// Fetch every link created by `owner_id`, in no particular order.
    async fn find_by_owner(&self, owner_id: &OwnerId) -> AppResult<Vec<Link>>;

    /// Fetch links that are inactive or whose `expires_at` is before `now`.
    async fn find_unusable(&self, now: DateTime<Utc>) -> AppResult<Vec<Link>>;

    /// Write the terminal state (`active = false`, `expires_at = closed_at`).
    ///
    /// Applied only if the stored `active` flag still equals
    /// `expected_active`. Returns `true` if the write was applied.
    async fn close(
        &self,
        id: &LinkId,
        expected_active: bool,
        closed_at: DateTime<Utc>,
        reason: ClosedReason,
    ) -> AppResult<bool>;

    /// Delete a link record. Returns `true` if a record was removed.
    async fn delete(&self, id: &LinkId) -> AppResult<bool>;

    /// Check that the backend is reachable.
    async fn health_check(&self) -> AppResult<bool>;
}

/// Messages and presence records scoped under a link ID.
#[async_trait]
pub trait SessionStore: Send + Sync + std::fmt::Debug + 'static {
    /// Append a message; the store assigns its ID and `created_at`.
    async fn add_message(&self, link_id: &LinkId, message: &NewMessage) -> AppResult<Message>;

    /// List a session's messages by `created_at`, then insertion order.
    async fn list_messages(&self, link_id: &LinkId) -> AppResult<Vec<Message>>;

    /// Create or refresh a participant. `joined_at` is kept on re-join and
    /// `is_typing` is reset to false.
    async fn upsert_presence(&self, link_id: &LinkId, codename: &str) -> AppResult<Presence>;

    /// Fetch one participant.
    async fn find_presence(&self, link_id: &LinkId, codename: &str)
    -> AppResult<Option<Presence>>;

    /// Update the typing flag. Returns `false` if the participant is unknown.
    async fn set_typing(&self, link_id: &LinkId, codename: &str, is_typing: bool)
    -> AppResult<bool>;

    /// Remove a participant. Returns `true` if a record was removed.
    async fn remove_presence(&self, link_id: &LinkId, codename: &str) -> AppResult<bool>;

    /// List a session's participants by `joined_at`, then codename.
    async fn list_presence(&self, link_id: &LinkId) -> AppResult<Vec<Presence>>;

    /// Delete every message and presence record of a session.
    async fn purge(&self, link_id: &LinkId) -> AppResult<SessionPurge>;

    /// IDs of every session that still holds at least one record.
    async fn session_ids(&self) -> AppResult<Vec<LinkId>>;
}
