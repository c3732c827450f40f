//! Chat session records scoped under a link.

pub mod message;
pub mod presence;

pub use message::{Message, NewMessage};
pub use presence::Presence;

/// Counts of records removed when a session is purged.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct SessionPurge {
    /// Messages deleted.
    pub messages: u64,
    /// Presence records deleted.
    pub presence: u64,
}

impl SessionPurge {
    /// Whether nothing was deleted.
    pub fn is_empty(&self) -> bool {
        self.messages == 0 && self.presence == 0
    }
}
