//! Shareable chat links.

pub mod model;

pub use model::{ClosedReason, CreateLink, Link};
