//! Participant presence records.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use roastme_core::types::LinkId;

/// A participant in a chat session, keyed by codename within the link.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Presence {
    /// Session (link) joined.
    pub link_id: LinkId,
    /// Per-session alias chosen by the participant.
    pub codename: String,
    /// Assigned by the store on first join.
    pub joined_at: DateTime<Utc>,
    /// Whether the participant is currently typing.
    pub is_typing: bool,
}
