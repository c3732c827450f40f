//! PostgreSQL store backend.

pub mod backend;
pub mod link;
pub mod session;

pub use backend::PostgresBackend;
pub use link::LinkRepository;
pub use session::SessionRepository;
