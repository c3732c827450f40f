//! Link entity model.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

use roastme_core::error::AppError;
use roastme_core::result::AppResult;
use roastme_core::types::{LinkId, OwnerId};

/// Why a link stopped being usable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ClosedReason {
    /// The owner deactivated the link.
    Revoked,
    /// The link outlived its TTL.
    Expired,
}

impl ClosedReason {
    /// Converts to the persisted string form.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Revoked => "revoked",
            Self::Expired => "expired",
        }
    }
}

impl fmt::Display for ClosedReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ClosedReason {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "revoked" => Ok(Self::Revoked),
            "expired" => Ok(Self::Expired),
            other => Err(AppError::internal(format!("Unknown closed reason: {other}"))),
        }
    }
}

/// A time-limited, revocable invitation to one chat session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Link {
    /// Short shareable identifier.
    pub id: LinkId,
    /// User who created the link.
    pub owner_id: OwnerId,
    /// Owner's display name captured at creation.
    pub owner_display_name: String,
    /// Owner's avatar URL captured at creation.
    pub owner_avatar_url: String,
    /// When the link was created.
    pub created_at: DateTime<Utc>,
    /// When the link stops being usable.
    pub expires_at: DateTime<Utc>,
    /// False once the link has been revoked.
    pub active: bool,
    /// Set together with the terminal state.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub closed_reason: Option<ClosedReason>,
}

impl Link {
    /// A link is usable while active and not past `expires_at` (inclusive).
    pub fn is_usable_at(&self, now: DateTime<Utc>) -> bool {
        self.active && now <= self.expires_at
    }

    /// Why the link is unusable at `now`, or `None` if it is still usable.
    pub fn closed_reason_at(&self, now: DateTime<Utc>) -> Option<ClosedReason> {
        if !self.active {
            Some(self.closed_reason.unwrap_or(ClosedReason::Revoked))
        } else if now > self.expires_at {
            Some(ClosedReason::Expired)
        } else {
            None
        }
    }

    /// Time left before expiry, clamped at zero.
    pub fn remaining_at(&self, now: DateTime<Utc>) -> Duration {
        (self.expires_at - now).max(Duration::zero())
    }
}

/// Data required to create a new link.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateLink {
    /// Freshly generated identifier.
    pub id: LinkId,
    /// Creating user.
    pub owner_id: OwnerId,
    /// Creator's display name.
    pub owner_display_name: String,
    /// Creator's avatar URL.
    pub owner_avatar_url: String,
    /// Creation instant.
    pub created_at: DateTime<Utc>,
    /// Lifetime from `created_at`.
    pub ttl: Duration,
}

impl CreateLink {
    /// Builds the initial, active record.
    ///
    /// Fails if `created_at + ttl` falls outside the representable range.
    pub fn into_link(self) -> AppResult<Link> {
        let expires_at = self
            .created_at
            .checked_add_signed(self.ttl)
            .ok_or_else(|| {
                AppError::configuration(format!("Link TTL out of range: {}", self.ttl))
            })?;
        Ok(Link {
            expires_at,
            id: self.id,
            owner_id: self.owner_id,
            owner_display_name: self.owner_display_name,
            owner_avatar_url: self.owner_avatar_url,
            created_at: self.created_at,
            active: true,
            closed_reason: None,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn link_at(created_at: DateTime<Utc>) -> Link {
        CreateLink {
            id: LinkId::new("abcdEFGH12"),
            owner_id: OwnerId::new("alice"),
            owner_display_name: "Alice".to_string(),
            owner_avatar_url: "https://img.example/alice.png".to_string(),
            created_at,
            ttl: Duration::seconds(1800),
        }
        .into_link()
        .unwrap()
    }

    #[test]
    fn test_out_of_range_ttl_is_an_error() {
        let err = CreateLink {
            id: LinkId::new("abcdEFGH12"),
            owner_id: OwnerId::new("alice"),
            owner_display_name: "Alice".to_string(),
            owner_avatar_url: String::new(),
            created_at: DateTime::<Utc>::MAX_UTC - Duration::seconds(10),
            ttl: Duration::seconds(60),
        }
        .into_link()
        .unwrap_err();
        assert_eq!(err.kind, roastme_core::error::ErrorKind::Configuration);
    }

    #[test]
    fn test_new_link_is_active_with_ttl() {
        let t = Utc::now();
        let link = link_at(t);
        assert!(link.active);
        assert_eq!(link.expires_at, t + Duration::seconds(1800));
        assert!(link.closed_reason.is_none());
    }

    #[test]
    fn test_ttl_boundary_is_inclusive() {
        let t = Utc::now();
        let link = link_at(t);
        assert!(link.is_usable_at(t + Duration::seconds(1799)));
        assert!(link.is_usable_at(t + Duration::seconds(1800)));
        assert!(!link.is_usable_at(t + Duration::seconds(1801)));
        assert_eq!(
            link.closed_reason_at(t + Duration::seconds(1801)),
            Some(ClosedReason::Expired)
        );
    }

    #[test]
    fn test_inactive_is_never_usable() {
        let t = Utc::now();
        let mut link = link_at(t);
        link.active = false;
        assert!(!link.is_usable_at(t));
        assert_eq!(link.closed_reason_at(t), Some(ClosedReason::Revoked));
    }

    #[test]
    fn test_remaining_clamps_at_zero() {
        let t = Utc::now();
        let link = link_at(t);
        assert_eq!(link.remaining_at(t + Duration::hours(2)), Duration::zero());
        assert_eq!(link.remaining_at(t), Duration::seconds(1800));
    }

    #[test]
    fn test_closed_reason_parse() {
        assert_eq!("revoked".parse::<ClosedReason>().unwrap(), ClosedReason::Revoked);
        assert_eq!("expired".parse::<ClosedReason>().unwrap(), ClosedReason::Expired);
        assert!("deleted".parse::<ClosedReason>().is_err());
    }
}
