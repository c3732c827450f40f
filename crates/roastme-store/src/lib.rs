//! # roastme-store
//!
//! Storage backends for links and chat sessions. Supports two modes:
//!
//! - **memory**: in-process document store built on `dashmap`
//! - **postgres**: PostgreSQL tables accessed through `sqlx`
//!
//! The backend is selected at runtime based on configuration. Neither
//! backend enforces link/session ownership: cascade ordering is the
//! job of the link lifecycle manager.

#[cfg(feature = "memory")]
pub mod memory;
#[cfg(feature = "postgres")]
pub mod postgres;
pub mod provider;
pub mod traits;

pub use provider::StoreManager;
pub use traits::{LinkStore, SessionStore};
