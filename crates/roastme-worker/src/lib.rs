//! Background maintenance for Roast Me.
//!
//! Expiry is enforced lazily on every read, so nothing here is required
//! for correctness. The sweeper reclaims links nobody reads again and
//! session data left behind by an interrupted cascade.

pub mod jobs;
pub mod scheduler;

pub use jobs::{ExpirySweeper, SweepReport};
pub use scheduler::CronScheduler;
