//! Participant-facing chat operations.

pub mod request;
pub mod service;

pub use request::{JoinRequest, PostMessageRequest};
pub use service::ChatService;
