//! Shared test helpers for integration tests.

#![allow(dead_code)]

use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use roastme_core::config::LinkConfig;
use roastme_core::error::AppError;
use roastme_core::result::AppResult;
use roastme_core::types::{LinkId, ManualClock, OwnerId};
use roastme_entity::chat::{Message, NewMessage, Presence, SessionPurge};
use roastme_entity::link::{ClosedReason, Link};
use roastme_realtime::SessionHub;
use roastme_service::{ChatService, LinkService, OwnerProfile};
use roastme_store::memory::MemoryStore;
use roastme_store::{LinkStore, SessionStore, StoreManager};

/// Memory store that records destructive calls and can be told to fail.
#[derive(Debug)]
pub struct RecordingStore {
    inner: MemoryStore,
    ops: Mutex<Vec<String>>,
    failing_deletes: AtomicU32,
    failing_purges: AtomicU32,
}

impl RecordingStore {
    pub fn new(clock: Arc<ManualClock>) -> Self {
        Self {
            inner: MemoryStore::new(clock),
            ops: Mutex::new(Vec::new()),
            failing_deletes: AtomicU32::new(0),
            failing_purges: AtomicU32::new(0),
        }
    }

    /// Makes the next `n` link deletes fail.
    pub fn fail_next_deletes(&self, n: u32) {
        self.failing_deletes.store(n, Ordering::SeqCst);
    }

    /// Makes the next `n` session purges fail.
    pub fn fail_next_purges(&self, n: u32) {
        self.failing_purges.store(n, Ordering::SeqCst);
    }

    /// Destructive operations seen so far, as `"op:link_id"`.
    pub fn ops(&self) -> Vec<String> {
        self.ops.lock().unwrap().clone()
    }

    pub fn clear_ops(&self) {
        self.ops.lock().unwrap().clear();
    }

    pub fn link_count(&self) -> usize {
        self.inner.link_count()
    }

    fn record(&self, op: &str, id: &LinkId) {
        self.ops.lock().unwrap().push(format!("{op}:{id}"));
    }

    fn take_failure(counter: &AtomicU32) -> bool {
        counter
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1))
            .is_ok()
    }
}

#[async_trait]
impl LinkStore for RecordingStore {
    async fn insert(&self, link: &Link) -> AppResult<()> {
        self.inner.insert(link).await
    }

    async fn find(&self, id: &LinkId) -> AppResult<Option<Link>> {
        self.inner.find(id).await
    }

    async fn find_by_owner(&self, owner_id: &OwnerId) -> AppResult<Vec<Link>> {
        self.inner.find_by_owner(owner_id).await
    }

    async fn find_unusable(&self, now: DateTime<Utc>) -> AppResult<Vec<Link>> {
        self.inner.find_unusable(now).await
    }

    async fn close(
        &self,
        id: &LinkId,
        expected_active: bool,
        closed_at: DateTime<Utc>,
        reason: ClosedReason,
    ) -> AppResult<bool> {
        self.record("close", id);
        self.inner.close(id, expected_active, closed_at, reason).await
    }

    async fn delete(&self, id: &LinkId) -> AppResult<bool> {
        self.record("delete", id);
        if Self::take_failure(&self.failing_deletes) {
            return Err(AppError::storage("injected delete failure"));
        }
        self.inner.delete(id).await
    }

    async fn health_check(&self) -> AppResult<bool> {
        self.inner.health_check().await
    }
}

#[async_trait]
impl SessionStore for RecordingStore {
    async fn add_message(&self, link_id: &LinkId, message: &NewMessage) -> AppResult<Message> {
        self.inner.add_message(link_id, message).await
    }

    async fn list_messages(&self, link_id: &LinkId) -> AppResult<Vec<Message>> {
        self.inner.list_messages(link_id).await
    }

    async fn upsert_presence(&self, link_id: &LinkId, codename: &str) -> AppResult<Presence> {
        self.inner.upsert_presence(link_id, codename).await
    }

    async fn find_presence(
        &self,
        link_id: &LinkId,
        codename: &str,
    ) -> AppResult<Option<Presence>> {
        self.inner.find_presence(link_id, codename).await
    }

    async fn set_typing(
        &self,
        link_id: &LinkId,
        codename: &str,
        is_typing: bool,
    ) -> AppResult<bool> {
        self.inner.set_typing(link_id, codename, is_typing).await
    }

    async fn remove_presence(&self, link_id: &LinkId, codename: &str) -> AppResult<bool> {
        self.inner.remove_presence(link_id, codename).await
    }

    async fn list_presence(&self, link_id: &LinkId) -> AppResult<Vec<Presence>> {
        self.inner.list_presence(link_id).await
    }

    async fn purge(&self, link_id: &LinkId) -> AppResult<SessionPurge> {
        self.record("purge", link_id);
        if Self::take_failure(&self.failing_purges) {
            return Err(AppError::storage("injected purge failure"));
        }
        self.inner.purge(link_id).await
    }

    async fn session_ids(&self) -> AppResult<Vec<LinkId>> {
        self.inner.session_ids().await
    }
}

/// Test application context
pub struct TestApp {
    pub links: Arc<LinkService>,
    pub chat: ChatService,
    pub hub: Arc<SessionHub>,
    pub store: Arc<RecordingStore>,
    pub clock: Arc<ManualClock>,
}

impl TestApp {
    /// Create a new test application with default link settings
    pub fn new() -> Self {
        Self::with_config(LinkConfig::default())
    }

    pub fn with_config(config: LinkConfig) -> Self {
        let clock = Arc::new(ManualClock::starting_now());
        let store = Arc::new(RecordingStore::new(clock.clone()));
        let stores = StoreManager::from_parts(store.clone(), store.clone());
        let hub = Arc::new(SessionHub::new(64));
        let links = Arc::new(LinkService::new(
            &stores,
            hub.clone(),
            clock.clone(),
            config,
        ));
        let chat = ChatService::new(links.clone(), &stores, hub.clone());
        Self {
            links,
            chat,
            hub,
            store,
            clock,
        }
    }

    /// Creates a link owned by `owner`.
    pub async fn create_link(&self, owner: &str) -> LinkId {
        self.links
            .create(&owner_profile(owner))
            .await
            .expect("Failed to create link")
    }

    /// Joins `codename` and posts one message.
    pub async fn roast(&self, id: &LinkId, codename: &str, content: &str) {
        self.chat.join(id, codename).await.expect("Failed to join");
        self.chat
            .send_message(id, codename, content)
            .await
            .expect("Failed to post");
    }
}

pub fn owner_profile(owner: &str) -> OwnerProfile {
    let mut name = owner.to_string();
    if let Some(first) = name.get_mut(0..1) {
        first.make_ascii_uppercase();
    }
    OwnerProfile::new(owner, name, format!("https://img.example/{owner}.png"))
}
