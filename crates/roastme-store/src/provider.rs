//! Store manager that dispatches to the configured backend.

use std::sync::Arc;

use tracing::info;

use roastme_core::config::StoreConfig;
use roastme_core::error::AppError;
use roastme_core::result::AppResult;
use roastme_core::types::Clock;

use crate::traits::{LinkStore, SessionStore};

/// Handles to the link and session stores of one backend.
///
/// The backend is selected at construction time based on configuration.
#[derive(Debug, Clone)]
pub struct StoreManager {
    links: Arc<dyn LinkStore>,
    sessions: Arc<dyn SessionStore>,
}

impl StoreManager {
    /// Create the configured backend.
    ///
    /// The clock stamps records in the in-memory backend; PostgreSQL uses
    /// its own `NOW()` for store-assigned timestamps.
    pub async fn new(config: &StoreConfig, clock: Arc<dyn Clock>) -> AppResult<Self> {
        match config.provider.as_str() {
            #[cfg(feature = "memory")]
            "memory" => {
                info!("Initializing in-memory store");
                let store = Arc::new(crate::memory::MemoryStore::new(clock));
                Ok(Self::from_parts(store.clone(), store))
            }
            #[cfg(feature = "postgres")]
            "postgres" => {
                let _ = clock;
                info!("Initializing PostgreSQL store");
                let backend = crate::postgres::PostgresBackend::open(&config.database).await?;
                Ok(Self::from_parts(
                    Arc::new(backend.links()),
                    Arc::new(backend.sessions()),
                ))
            }
            other => Err(AppError::configuration(format!(
                "Unknown store provider: '{other}'. Supported: memory, postgres"
            ))),
        }
    }

    /// Create a manager from existing stores (for testing).
    pub fn from_parts(links: Arc<dyn LinkStore>, sessions: Arc<dyn SessionStore>) -> Self {
        Self { links, sessions }
    }

    /// The link store.
    pub fn links(&self) -> Arc<dyn LinkStore> {
        Arc::clone(&self.links)
    }

    /// The session store.
    pub fn sessions(&self) -> Arc<dyn SessionStore> {
        Arc::clone(&self.sessions)
    }

    /// Check that the backend is reachable.
    pub async fn health_check(&self) -> AppResult<bool> {
        self.links.health_check().await
    }
}
