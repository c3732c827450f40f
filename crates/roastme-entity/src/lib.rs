//! # roastme-entity
//!
//! Domain records for Roast Me. A [`link::Link`] owns exactly one chat
//! session, made of [`chat::Message`]s and [`chat::Presence`] records
//! keyed by the link's ID.

pub mod chat;
pub mod link;
