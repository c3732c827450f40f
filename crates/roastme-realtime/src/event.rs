//! Session event definitions.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use roastme_entity::chat::Message;
use roastme_entity::link::ClosedReason;

/// An event published on a chat session's channel.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum SessionEvent {
    /// A message was stored.
    MessagePosted {
        /// The stored message.
        message: Message,
    },
    /// A participant joined (or re-joined).
    Joined {
        /// Participant alias.
        codename: String,
        /// When the participant first joined.
        joined_at: DateTime<Utc>,
    },
    /// A participant left.
    Left {
        /// Participant alias.
        codename: String,
    },
    /// A participant started or stopped typing.
    Typing {
        /// Participant alias.
        codename: String,
        /// Current typing state.
        is_typing: bool,
    },
    /// The link is gone and its session was purged.
    Closed {
        /// Why the link closed.
        reason: ClosedReason,
    },
}

impl SessionEvent {
    /// Event name as used on the wire.
    pub fn name(&self) -> &'static str {
        match self {
            Self::MessagePosted { .. } => "message_posted",
            Self::Joined { .. } => "joined",
            Self::Left { .. } => "left",
            Self::Typing { .. } => "typing",
            Self::Closed { .. } => "closed",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tagged_serialization() {
        let event = SessionEvent::Typing {
            codename: "spicy".to_string(),
            is_typing: true,
        };
        let json = serde_json::to_value(&event).unwrap();
        assert_eq!(json["type"], "typing");
        assert_eq!(json["codename"], "spicy");
        assert_eq!(event.name(), "typing");

        let closed = SessionEvent::Closed {
            reason: ClosedReason::Expired,
        };
        assert_eq!(serde_json::to_value(&closed).unwrap()["reason"], "expired");
    }
}
