//! Chat message records.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use roastme_core::types::LinkId;

/// A message posted into a link's chat session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    /// Store-generated message ID.
    pub id: Uuid,
    /// Session (link) the message belongs to.
    pub link_id: LinkId,
    /// Sender's per-session alias.
    pub codename: String,
    /// Message text.
    pub content: String,
    /// Assigned by the store at write time.
    pub created_at: DateTime<Utc>,
}

/// A message as submitted, before the store assigns id and timestamp.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewMessage {
    /// Sender's per-session alias.
    pub codename: String,
    /// Message text.
    pub content: String,
}
