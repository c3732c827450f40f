//! # roastme-service
//!
//! Business logic for Roast Me. [`LinkService`] owns the link lifecycle
//! (creation, lazy expiry, deactivation, and cascade deletion of the chat
//! session a link owns). [`ChatService`] is the participant-facing layer
//! and refuses to act on links that are no longer usable.

pub mod chat;
pub mod context;
pub mod link;

pub use chat::ChatService;
pub use context::OwnerProfile;
pub use link::LinkService;
