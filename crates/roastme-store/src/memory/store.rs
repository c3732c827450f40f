//! In-memory document store using dashmap.

use std::collections::{BTreeMap, BTreeSet};
use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use dashmap::DashMap;
use dashmap::mapref::entry::Entry;
use tracing::debug;
use uuid::Uuid;

use roastme_core::error::AppError;
use roastme_core::result::AppResult;
use roastme_core::types::{Clock, LinkId, OwnerId};
use roastme_entity::chat::{Message, NewMessage, Presence, SessionPurge};
use roastme_entity::link::{ClosedReason, Link};

use crate::traits::{LinkStore, SessionStore};

/// In-process store holding links and sessions in concurrent maps.
///
/// Timestamps that a managed document store would assign server-side
/// come from the injected [`Clock`].
#[derive(Debug, Clone)]
pub struct MemoryStore {
    /// Link ID → link record.
    links: Arc<DashMap<LinkId, Link>>,
    /// Link ID → messages in insertion order.
    messages: Arc<DashMap<LinkId, Vec<Message>>>,
    /// Link ID → codename → presence.
    presence: Arc<DashMap<LinkId, BTreeMap<String, Presence>>>,
    /// Source of store-assigned timestamps.
    clock: Arc<dyn Clock>,
}

impl MemoryStore {
    /// Create an empty store.
    pub fn new(clock: Arc<dyn Clock>) -> Self {
        Self {
            links: Arc::new(DashMap::new()),
            messages: Arc::new(DashMap::new()),
            presence: Arc::new(DashMap::new()),
            clock,
        }
    }

    /// Number of link records held.
    pub fn link_count(&self) -> usize {
        self.links.len()
    }

    fn now(&self) -> DateTime<Utc> {
        self.clock.now()
    }
}

#[async_trait]
impl LinkStore for MemoryStore {
    async fn insert(&self, link: &Link) -> AppResult<()> {
        match self.links.entry(link.id.clone()) {
            Entry::Occupied(_) => Err(AppError::conflict(format!(
                "Link '{}' already exists",
                link.id
            ))),
            Entry::Vacant(slot) => {
                slot.insert(link.clone());
                Ok(())
            }
        }
    }

    async fn find(&self, id: &LinkId) -> AppResult<Option<Link>> {
        Ok(self.links.get(id).map(|r| r.value().clone()))
    }

    async fn find_by_owner(&self, owner_id: &OwnerId) -> AppResult<Vec<Link>> {
        Ok(self
            .links
            .iter()
            .filter(|r| &r.value().owner_id == owner_id)
            .map(|r| r.value().clone())
            .collect())
    }

    async fn find_unusable(&self, now: DateTime<Utc>) -> AppResult<Vec<Link>> {
        Ok(self
            .links
            .iter()
            .filter(|r| !r.value().active || r.value().expires_at < now)
            .map(|r| r.value().clone())
            .collect())
    }

    async fn close(
        &self,
        id: &LinkId,
        expected_active: bool,
        closed_at: DateTime<Utc>,
        reason: ClosedReason,
    ) -> AppResult<bool> {
        match self.links.get_mut(id) {
            Some(mut link) if link.active == expected_active => {
                link.active = false;
                link.expires_at = closed_at;
                link.closed_reason = Some(reason);
                Ok(true)
            }
            _ => Ok(false),
        }
    }

    async fn delete(&self, id: &LinkId) -> AppResult<bool> {
        Ok(self.links.remove(id).is_some())
    }

    async fn health_check(&self) -> AppResult<bool> {
        Ok(true)
    }
}

#[async_trait]
impl SessionStore for MemoryStore {
    async fn add_message(&self, link_id: &LinkId, message: &NewMessage) -> AppResult<Message> {
        let message = Message {
            id: Uuid::new_v4(),
            link_id: link_id.clone(),
            codename: message.codename.clone(),
            content: message.content.clone(),
            created_at: self.now(),
        };
        self.messages
            .entry(link_id.clone())
            .or_default()
            .push(message.clone());
        Ok(message)
    }

    async fn list_messages(&self, link_id: &LinkId) -> AppResult<Vec<Message>> {
        let mut messages = self
            .messages
            .get(link_id)
            .map(|r| r.value().clone())
            .unwrap_or_default();
        // Stable sort keeps insertion order for equal timestamps.
        messages.sort_by_key(|m| m.created_at);
        Ok(messages)
    }

    async fn upsert_presence(&self, link_id: &LinkId, codename: &str) -> AppResult<Presence> {
        let now = self.now();
        let mut session = self.presence.entry(link_id.clone()).or_default();
        let presence = session
            .entry(codename.to_string())
            .and_modify(|p| p.is_typing = false)
            .or_insert_with(|| Presence {
                link_id: link_id.clone(),
                codename: codename.to_string(),
                joined_at: now,
                is_typing: false,
            });
        Ok(presence.clone())
    }

    async fn find_presence(
        &self,
        link_id: &LinkId,
        codename: &str,
    ) -> AppResult<Option<Presence>> {
        Ok(self
            .presence
            .get(link_id)
            .and_then(|session| session.get(codename).cloned()))
    }

    async fn set_typing(
        &self,
        link_id: &LinkId,
        codename: &str,
        is_typing: bool,
    ) -> AppResult<bool> {
        let Some(mut session) = self.presence.get_mut(link_id) else {
            return Ok(false);
        };
        match session.get_mut(codename) {
            Some(presence) => {
                presence.is_typing = is_typing;
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn remove_presence(&self, link_id: &LinkId, codename: &str) -> AppResult<bool> {
        let removed = match self.presence.get_mut(link_id) {
            Some(mut session) => session.remove(codename).is_some(),
            None => false,
        };
        self.presence.remove_if(link_id, |_, session| session.is_empty());
        Ok(removed)
    }

    async fn list_presence(&self, link_id: &LinkId) -> AppResult<Vec<Presence>> {
        let mut participants: Vec<Presence> = self
            .presence
            .get(link_id)
            .map(|session| session.values().cloned().collect())
            .unwrap_or_default();
        participants.sort_by(|a, b| {
            a.joined_at
                .cmp(&b.joined_at)
                .then_with(|| a.codename.cmp(&b.codename))
        });
        Ok(participants)
    }

    async fn purge(&self, link_id: &LinkId) -> AppResult<SessionPurge> {
        let messages = self
            .messages
            .remove(link_id)
            .map(|(_, m)| m.len() as u64)
            .unwrap_or(0);
        let presence = self
            .presence
            .remove(link_id)
            .map(|(_, p)| p.len() as u64)
            .unwrap_or(0);

        debug!(link_id = %link_id, messages, presence, "Purged session");
        Ok(SessionPurge { messages, presence })
    }

    async fn session_ids(&self) -> AppResult<Vec<LinkId>> {
        let ids: BTreeSet<LinkId> = self
            .messages
            .iter()
            .filter(|r| !r.value().is_empty())
            .map(|r| r.key().clone())
            .chain(
                self.presence
                    .iter()
                    .filter(|r| !r.value().is_empty())
                    .map(|r| r.key().clone()),
            )
            .collect();
        Ok(ids.into_iter().collect())
    }
}
