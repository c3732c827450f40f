//! Chat session service.
//!
//! Every operation first asks [`LinkService`] whether the link is still
//! usable, so an expired link is cascade-deleted here too and the caller
//! sees a session-expired error instead of stale data.

use std::sync::Arc;

use tokio::sync::broadcast;
use tracing::{debug, info};

use roastme_core::error::AppError;
use roastme_core::result::AppResult;
use roastme_core::types::LinkId;
use roastme_entity::chat::{Message, NewMessage, Presence};
use roastme_entity::link::Link;
use roastme_realtime::{SessionEvent, SessionHub};
use roastme_store::{SessionStore, StoreManager};

use crate::link::LinkService;

use super::request::{JoinRequest, PostMessageRequest, validate_request};

/// Join, leave, typing, and messaging for a link's session.
#[derive(Debug, Clone)]
pub struct ChatService {
    links: Arc<LinkService>,
    sessions: Arc<dyn SessionStore>,
    hub: Arc<SessionHub>,
}

impl ChatService {
    /// Creates a new chat service.
    pub fn new(links: Arc<LinkService>, stores: &StoreManager, hub: Arc<SessionHub>) -> Self {
        Self {
            links,
            sessions: stores.sessions(),
            hub,
        }
    }

    /// Adds a participant, or refreshes one that already joined.
    pub async fn join(&self, link_id: &LinkId, codename: &str) -> AppResult<Presence> {
        let request = JoinRequest::new(codename);
        validate_request(&request)?;
        self.usable_link(link_id).await?;

        let presence = self
            .sessions
            .upsert_presence(link_id, &request.codename)
            .await?;
        self.hub.publish(
            link_id,
            SessionEvent::Joined {
                codename: presence.codename.clone(),
                joined_at: presence.joined_at,
            },
        );

        info!(link_id = %link_id, codename = %presence.codename, "Participant joined");
        Ok(presence)
    }

    /// Removes a participant. Leaving a closed session succeeds silently.
    pub async fn leave(&self, link_id: &LinkId, codename: &str) -> AppResult<()> {
        let codename = codename.trim();
        if self.links.get(link_id).await?.is_none() {
            debug!(link_id = %link_id, codename, "Leave on unusable link ignored");
            return Ok(());
        }

        if self.sessions.remove_presence(link_id, codename).await? {
            self.hub.publish(
                link_id,
                SessionEvent::Left {
                    codename: codename.to_string(),
                },
            );
            info!(link_id = %link_id, codename, "Participant left");
        }
        Ok(())
    }

    /// Updates a participant's typing indicator.
    pub async fn set_typing(
        &self,
        link_id: &LinkId,
        codename: &str,
        is_typing: bool,
    ) -> AppResult<()> {
        let codename = codename.trim();
        self.usable_link(link_id).await?;

        if !self.sessions.set_typing(link_id, codename, is_typing).await? {
            return Err(AppError::not_found(format!(
                "Participant '{codename}' has not joined"
            )));
        }
        self.hub.publish(
            link_id,
            SessionEvent::Typing {
                codename: codename.to_string(),
                is_typing,
            },
        );
        Ok(())
    }

    /// Stores a message from a joined participant and broadcasts it.
    pub async fn send_message(
        &self,
        link_id: &LinkId,
        codename: &str,
        content: &str,
    ) -> AppResult<Message> {
        let request = PostMessageRequest::new(codename, content);
        validate_request(&request)?;
        self.usable_link(link_id).await?;

        if self
            .sessions
            .find_presence(link_id, &request.codename)
            .await?
            .is_none()
        {
            return Err(AppError::not_found(format!(
                "Participant '{}' has not joined",
                request.codename
            )));
        }

        let message = self
            .sessions
            .add_message(
                link_id,
                &NewMessage {
                    codename: request.codename.clone(),
                    content: request.content,
                },
            )
            .await?;

        // Posting ends the sender's typing state.
        if self
            .sessions
            .set_typing(link_id, &request.codename, false)
            .await?
        {
            self.hub.publish(
                link_id,
                SessionEvent::Typing {
                    codename: request.codename.clone(),
                    is_typing: false,
                },
            );
        }
        self.hub.publish(
            link_id,
            SessionEvent::MessagePosted {
                message: message.clone(),
            },
        );

        debug!(link_id = %link_id, message_id = %message.id, "Message posted");
        Ok(message)
    }

    /// Messages in the session, oldest first.
    pub async fn messages(&self, link_id: &LinkId) -> AppResult<Vec<Message>> {
        self.usable_link(link_id).await?;
        self.sessions.list_messages(link_id).await
    }

    /// Current participants, in join order.
    pub async fn participants(&self, link_id: &LinkId) -> AppResult<Vec<Presence>> {
        self.usable_link(link_id).await?;
        self.sessions.list_presence(link_id).await
    }

    /// Subscribes to the session's live events.
    ///
    /// The stream ends with a `Closed` event once the link is gone. The link
    /// is checked after the receiver exists, so a close that lands in between
    /// is either delivered or reported as an expired session.
    pub async fn subscribe(
        &self,
        link_id: &LinkId,
    ) -> AppResult<broadcast::Receiver<SessionEvent>> {
        let rx = self.hub.subscribe(link_id);
        match self.usable_link(link_id).await {
            Ok(_) => Ok(rx),
            Err(e) => {
                drop(rx);
                self.hub.release_idle(link_id);
                Err(e)
            }
        }
    }

    async fn usable_link(&self, link_id: &LinkId) -> AppResult<Link> {
        self.links
            .get(link_id)
            .await?
            .ok_or_else(AppError::session_expired)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use roastme_core::config::LinkConfig;
    use roastme_core::error::ErrorKind;
    use roastme_core::types::ManualClock;
    use roastme_store::memory::MemoryStore;

    use crate::context::OwnerProfile;

    struct Fixture {
        chat: ChatService,
        links: Arc<LinkService>,
        clock: Arc<ManualClock>,
    }

    fn fixture() -> Fixture {
        let clock = Arc::new(ManualClock::starting_now());
        let store = Arc::new(MemoryStore::new(clock.clone()));
        let stores = StoreManager::from_parts(store.clone(), store);
        let hub = Arc::new(SessionHub::new(32));
        let links = Arc::new(LinkService::new(
            &stores,
            hub.clone(),
            clock.clone(),
            LinkConfig::default(),
        ));
        Fixture {
            chat: ChatService::new(links.clone(), &stores, hub),
            links,
            clock,
        }
    }

    async fn new_link(f: &Fixture) -> LinkId {
        f.links
            .create(&OwnerProfile::new("alice", "Alice", ""))
            .await
            .unwrap()
    }

    #[tokio::test]
    async fn test_join_and_post() {
        let f = fixture();
        let id = new_link(&f).await;

        let presence = f.chat.join(&id, " spicy ").await.unwrap();
        assert_eq!(presence.codename, "spicy");

        f.chat.send_message(&id, "spicy", "  nice hat  ").await.unwrap();
        let messages = f.chat.messages(&id).await.unwrap();
        assert_eq!(messages.len(), 1);
        assert_eq!(messages[0].content, "nice hat");
    }

    #[tokio::test]
    async fn test_post_requires_join() {
        let f = fixture();
        let id = new_link(&f).await;
        let err = f.chat.send_message(&id, "ghost", "boo").await.unwrap_err();
        assert_eq!(err.kind, ErrorKind::NotFound);
    }

    #[tokio::test]
    async fn test_invalid_input_rejected() {
        let f = fixture();
        let id = new_link(&f).await;
        f.chat.join(&id, "spicy").await.unwrap();

        let err = f.chat.send_message(&id, "spicy", "   ").await.unwrap_err();
        assert_eq!(err.kind, ErrorKind::Validation);
        let err = f.chat.join(&id, "").await.unwrap_err();
        assert_eq!(err.kind, ErrorKind::Validation);
    }

    #[tokio::test]
    async fn test_expired_link_refuses_chat() {
        let f = fixture();
        let id = new_link(&f).await;
        f.chat.join(&id, "spicy").await.unwrap();

        f.clock.advance_secs(1801);
        let err = f.chat.send_message(&id, "spicy", "late").await.unwrap_err();
        assert!(err.is_session_expired());
        assert!(f.chat.join(&id, "mild").await.unwrap_err().is_session_expired());
        assert!(f.chat.subscribe(&id).await.unwrap_err().is_session_expired());
        f.chat.leave(&id, "spicy").await.unwrap();
    }

    #[tokio::test]
    async fn test_typing_flow() {
        let f = fixture();
        let id = new_link(&f).await;
        f.chat.join(&id, "spicy").await.unwrap();
        let mut rx = f.chat.subscribe(&id).await.unwrap();

        f.chat.set_typing(&id, "spicy", true).await.unwrap();
        assert!(f.chat.participants(&id).await.unwrap()[0].is_typing);
        assert_eq!(
            rx.recv().await.unwrap(),
            SessionEvent::Typing {
                codename: "spicy".to_string(),
                is_typing: true
            }
        );

        f.chat.send_message(&id, "spicy", "done typing").await.unwrap();
        assert!(!f.chat.participants(&id).await.unwrap()[0].is_typing);
        assert!(matches!(
            rx.recv().await.unwrap(),
            SessionEvent::Typing { is_typing: false, .. }
        ));
        assert!(matches!(
            rx.recv().await.unwrap(),
            SessionEvent::MessagePosted { .. }
        ));

        let err = f.chat.set_typing(&id, "ghost", true).await.unwrap_err();
        assert_eq!(err.kind, ErrorKind::NotFound);
    }

    #[tokio::test]
    async fn test_leave_removes_participant() {
        let f = fixture();
        let id = new_link(&f).await;
        f.chat.join(&id, "spicy").await.unwrap();
        f.clock.advance_secs(1);
        f.chat.join(&id, "mild").await.unwrap();

        let names: Vec<String> = f
            .chat
            .participants(&id)
            .await
            .unwrap()
            .into_iter()
            .map(|p| p.codename)
            .collect();
        assert_eq!(names, vec!["spicy", "mild"]);

        f.chat.leave(&id, "spicy").await.unwrap();
        f.chat.leave(&id, "spicy").await.unwrap();
        assert_eq!(f.chat.participants(&id).await.unwrap().len(), 1);
    }
}
