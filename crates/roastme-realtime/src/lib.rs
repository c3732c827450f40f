//! # roastme-realtime
//!
//! Real-time fan-out of chat session events. Each link ID gets a
//! broadcast channel; subscribers receive messages, presence changes,
//! typing indicators, and a final `Closed` event when the link goes away.

pub mod event;
pub mod hub;

pub use event::SessionEvent;
pub use hub::SessionHub;
