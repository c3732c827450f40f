//! # roastme-core
//!
//! Core crate for Roast Me. Contains configuration schemas, typed
//! identifiers, the clock abstraction, and the unified error system.
//!
//! This crate has **no** internal dependencies on other Roast Me crates.

pub mod config;
pub mod error;
pub mod result;
pub mod types;

pub use error::AppError;
pub use result::AppResult;
