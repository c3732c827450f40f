//! Identity of the authenticated user creating links.

use serde::{Deserialize, Serialize};

use roastme_core::types::OwnerId;

/// Profile data supplied by the identity provider for the acting user.
///
/// Captured into the link at creation time; later profile changes are
/// not synced to existing links.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OwnerProfile {
    /// The authenticated user's ID.
    pub owner_id: OwnerId,
    /// Display name at the time of the request.
    pub display_name: String,
    /// Avatar URL at the time of the request.
    pub avatar_url: String,
}

impl OwnerProfile {
    /// Creates a new owner profile.
    pub fn new(
        owner_id: impl Into<OwnerId>,
        display_name: impl Into<String>,
        avatar_url: impl Into<String>,
    ) -> Self {
        Self {
            owner_id: owner_id.into(),
            display_name: display_name.into(),
            avatar_url: avatar_url.into(),
        }
    }
}
