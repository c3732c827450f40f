//! Link lifecycle manager.
//!
//! Every read of a link goes through here so that nobody observes a link
//! that has silently expired. An unusable link discovered on read is
//! cascade-deleted before the read returns: the session's messages and
//! presence first, the link record last.

use std::sync::Arc;
use std::time::Duration as StdDuration;

use chrono::{DateTime, Duration, Utc};
use tracing::{debug, error, info, warn};

use roastme_core::config::LinkConfig;
use roastme_core::error::{AppError, ErrorKind};
use roastme_core::result::AppResult;
use roastme_core::types::{Clock, LinkId, OwnerId};
use roastme_entity::chat::SessionPurge;
use roastme_entity::link::{ClosedReason, CreateLink, Link};
use roastme_realtime::SessionHub;
use roastme_store::{LinkStore, SessionStore, StoreManager};

use crate::context::OwnerProfile;

/// Fresh IDs tried before giving up on a create.
const MAX_CREATE_ATTEMPTS: u32 = 5;

/// Creates, reads, deactivates, and reclaims links.
///
/// Holds no state between calls; the stores are the source of truth.
#[derive(Debug, Clone)]
pub struct LinkService {
    /// Link records.
    link_store: Arc<dyn LinkStore>,
    /// Messages and presence keyed by link ID.
    session_store: Arc<dyn SessionStore>,
    /// Session fan-out, told when a session closes.
    hub: Arc<SessionHub>,
    /// Time source for creation and expiry checks.
    clock: Arc<dyn Clock>,
    /// TTL, ID length, and cascade retry policy.
    config: LinkConfig,
}

impl LinkService {
    /// Creates a new link service.
    pub fn new(
        stores: &StoreManager,
        hub: Arc<SessionHub>,
        clock: Arc<dyn Clock>,
        config: LinkConfig,
    ) -> Self {
        Self {
            link_store: stores.links(),
            session_store: stores.sessions(),
            hub,
            clock,
            config,
        }
    }

    /// Creates a new active link owned by `owner` and returns its ID.
    pub async fn create(&self, owner: &OwnerProfile) -> AppResult<LinkId> {
        let ttl = i64::try_from(self.config.ttl_seconds)
            .ok()
            .and_then(Duration::try_seconds)
            .ok_or_else(|| {
                AppError::configuration(format!(
                    "link.ttl_seconds out of range: {}",
                    self.config.ttl_seconds
                ))
            })?;

        for attempt in 1..=MAX_CREATE_ATTEMPTS {
            let link = CreateLink {
                id: LinkId::generate(self.config.id_length),
                owner_id: owner.owner_id.clone(),
                owner_display_name: owner.display_name.clone(),
                owner_avatar_url: owner.avatar_url.clone(),
                created_at: self.clock.now(),
                ttl,
            }
            .into_link()?;

            match self.link_store.insert(&link).await {
                Ok(()) => {
                    info!(
                        link_id = %link.id,
                        owner_id = %link.owner_id,
                        expires_at = %link.expires_at,
                        "Link created"
                    );
                    return Ok(link.id);
                }
                Err(e) if e.kind == ErrorKind::Conflict => {
                    warn!(link_id = %link.id, attempt, "Link ID collision, regenerating");
                }
                Err(e) => return Err(e),
            }
        }

        Err(AppError::conflict("Could not allocate a unique link ID"))
    }

    /// Returns the link if it exists and is usable.
    ///
    /// An existing but unusable link is cascade-deleted before `None` is
    /// returned.
    pub async fn get(&self, id: &LinkId) -> AppResult<Option<Link>> {
        let Some(link) = self.link_store.find(id).await? else {
            debug!(link_id = %id, "Link not found");
            return Ok(None);
        };
        self.check_usable(link, self.clock.now()).await
    }

    /// Returns the owner's usable links, oldest first.
    ///
    /// Unusable links are cascade-deleted as a side effect.
    pub async fn list_by_owner(&self, owner_id: &OwnerId) -> AppResult<Vec<Link>> {
        let mut links = self.link_store.find_by_owner(owner_id).await?;
        links.sort_by(|a, b| a.created_at.cmp(&b.created_at).then_with(|| a.id.cmp(&b.id)));

        let now = self.clock.now();
        let mut usable = Vec::with_capacity(links.len());
        for link in links {
            if let Some(link) = self.check_usable(link, now).await? {
                usable.push(link);
            }
        }
        Ok(usable)
    }

    /// Revokes a link and deletes it together with its session.
    ///
    /// A missing link is a no-op, so calling this twice is harmless.
    pub async fn deactivate(&self, id: &LinkId) -> AppResult<()> {
        let Some(link) = self.link_store.find(id).await? else {
            debug!(link_id = %id, "Deactivate on missing link, nothing to do");
            return Ok(());
        };

        let purged = self.session_store.purge(id).await?;

        // Readers racing this call see the link as unusable from here on.
        let applied = self
            .link_store
            .close(id, link.active, self.clock.now(), ClosedReason::Revoked)
            .await?;
        if !applied {
            debug!(link_id = %id, "Link state changed concurrently, finishing cascade");
        }

        self.finish_cascade(id, ClosedReason::Revoked, purged).await
    }

    /// Replaces a link with a fresh one for the same owner.
    ///
    /// The old link is deactivated first, so its session is gone before the
    /// new ID exists. A missing old link still yields a new one; a link owned
    /// by someone else is left alone.
    pub async fn regenerate(&self, id: &LinkId, owner: &OwnerProfile) -> AppResult<LinkId> {
        if let Some(link) = self.link_store.find(id).await? {
            if link.owner_id != owner.owner_id {
                return Err(AppError::validation(format!(
                    "Link {id} is not owned by {}",
                    owner.owner_id
                )));
            }
        }

        self.deactivate(id).await?;
        let new_id = self.create(owner).await?;
        info!(old_link_id = %id, link_id = %new_id, "Link regenerated");
        Ok(new_id)
    }

    /// Cascade-deletes the link if it exists and is no longer usable.
    ///
    /// Returns `true` if the link was reclaimed.
    pub async fn reclaim_if_unusable(&self, id: &LinkId) -> AppResult<bool> {
        match self.link_store.find(id).await? {
            Some(link) => Ok(self.check_usable(link, self.clock.now()).await?.is_none()),
            None => Ok(false),
        }
    }

    /// IDs of links that are inactive or past their expiry right now.
    pub async fn unusable_link_ids(&self) -> AppResult<Vec<LinkId>> {
        let links = self.link_store.find_unusable(self.clock.now()).await?;
        Ok(links.into_iter().map(|l| l.id).collect())
    }

    /// IDs of sessions that still hold data but have no link record.
    pub async fn orphaned_session_ids(&self) -> AppResult<Vec<LinkId>> {
        let mut orphans = Vec::new();
        for id in self.session_store.session_ids().await? {
            if self.link_store.find(&id).await?.is_none() {
                orphans.push(id);
            }
        }
        Ok(orphans)
    }

    /// Purges a session whose link record no longer exists.
    ///
    /// Returns `None` without touching anything if the link still exists.
    pub async fn purge_orphan(&self, id: &LinkId) -> AppResult<Option<SessionPurge>> {
        if self.link_store.find(id).await?.is_some() {
            return Ok(None);
        }
        let purged = self.session_store.purge(id).await?;
        info!(
            link_id = %id,
            messages = purged.messages,
            presence = purged.presence,
            "Purged orphaned session"
        );
        Ok(Some(purged))
    }

    async fn check_usable(&self, link: Link, now: DateTime<Utc>) -> AppResult<Option<Link>> {
        match link.closed_reason_at(now) {
            None => Ok(Some(link)),
            Some(reason) => {
                self.cascade_delete(&link.id, reason).await?;
                Ok(None)
            }
        }
    }

    /// Deletes the session's children, then the link record.
    async fn cascade_delete(&self, id: &LinkId, reason: ClosedReason) -> AppResult<()> {
        let purged = self.session_store.purge(id).await?;
        self.finish_cascade(id, reason, purged).await
    }

    async fn finish_cascade(
        &self,
        id: &LinkId,
        reason: ClosedReason,
        purged: SessionPurge,
    ) -> AppResult<()> {
        self.delete_link(id).await?;
        self.hub.close(id, reason);

        info!(
            link_id = %id,
            %reason,
            messages = purged.messages,
            presence = purged.presence,
            "Link closed and session purged"
        );
        Ok(())
    }

    /// Deletes the link record, retrying since the session is already gone.
    async fn delete_link(&self, id: &LinkId) -> AppResult<()> {
        let attempts = self.config.cascade_retry_attempts.max(1);
        let mut attempt = 1;
        loop {
            match self.link_store.delete(id).await {
                Ok(_) => return Ok(()),
                Err(e) if attempt < attempts => {
                    warn!(
                        link_id = %id,
                        attempt,
                        error = %e,
                        "Link delete failed after session purge, retrying"
                    );
                    let backoff = self.config.cascade_retry_backoff_ms * u64::from(attempt);
                    tokio::time::sleep(StdDuration::from_millis(backoff)).await;
                    attempt += 1;
                }
                Err(e) => {
                    error!(
                        link_id = %id,
                        attempts,
                        error = %e,
                        "Link delete failed, record left for the next read"
                    );
                    return Err(e);
                }
            }
        }
    }
}
