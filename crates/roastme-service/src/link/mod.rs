//! Link lifecycle management.

pub mod service;

pub use service::LinkService;
