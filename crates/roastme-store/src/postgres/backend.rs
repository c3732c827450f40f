//! PostgreSQL backend bootstrap.
//!
//! Opens the pool, brings the schema up to date, and checks that the link
//! and session tables are in place before any repository is handed out.

use std::time::Duration;

use sqlx::PgPool;
use sqlx::postgres::PgPoolOptions;
use tracing::{debug, info};

use roastme_core::config::DatabaseConfig;
use roastme_core::error::{AppError, ErrorKind};
use roastme_core::result::AppResult;

use super::{LinkRepository, SessionRepository};

/// Tables a link cascade touches, parent first.
pub const ROAST_TABLES: [&str; 3] = ["links", "messages", "presence"];

/// A ready-to-use PostgreSQL backend.
#[derive(Debug, Clone)]
pub struct PostgresBackend {
    pool: PgPool,
}

impl PostgresBackend {
    /// Connect, optionally migrate, and verify the schema.
    pub async fn open(config: &DatabaseConfig) -> AppResult<Self> {
        info!(
            url = %config.masked_url(),
            max_connections = config.max_connections,
            "Opening PostgreSQL link store"
        );

        let pool = PgPoolOptions::new()
            .max_connections(config.max_connections)
            .min_connections(config.min_connections)
            .acquire_timeout(Duration::from_secs(config.connect_timeout_seconds))
            .connect(&config.url)
            .await
            .map_err(|e| db_error(format!("Cannot reach {}", config.masked_url()), e))?;

        let backend = Self { pool };
        if config.run_migrations {
            backend.apply_schema().await?;
        }
        backend.verify_schema().await?;
        Ok(backend)
    }

    /// Repository over the `links` table.
    pub fn links(&self) -> LinkRepository {
        LinkRepository::new(self.pool.clone())
    }

    /// Repository over the `messages` and `presence` tables.
    pub fn sessions(&self) -> SessionRepository {
        SessionRepository::new(self.pool.clone())
    }

    async fn apply_schema(&self) -> AppResult<()> {
        let migrator = sqlx::migrate!("../../migrations");
        for migration in migrator.iter() {
            debug!(
                version = migration.version,
                description = %migration.description,
                "Known schema migration"
            );
        }

        migrator
            .run(&self.pool)
            .await
            .map_err(|e| db_error("Schema migration failed".to_string(), e))?;

        info!(tables = ?ROAST_TABLES, "Link store schema is current");
        Ok(())
    }

    /// Fails if any of [`ROAST_TABLES`] is absent from the current schema.
    async fn verify_schema(&self) -> AppResult<()> {
        let present: Vec<String> = sqlx::query_scalar(
            "SELECT table_name::TEXT FROM information_schema.tables \
             WHERE table_schema = current_schema() AND table_name = ANY($1)",
        )
        .bind(ROAST_TABLES.to_vec())
        .fetch_all(&self.pool)
        .await
        .map_err(|e| db_error("Cannot inspect link store schema".to_string(), e))?;

        let missing = missing_tables(&present);
        if missing.is_empty() {
            Ok(())
        } else {
            Err(AppError::new(
                ErrorKind::Database,
                format!(
                    "Link store schema incomplete, missing: {}. \
                     Enable store.database.run_migrations",
                    missing.join(", ")
                ),
            ))
        }
    }
}

/// Tables from [`ROAST_TABLES`] that are not in `present`.
fn missing_tables(present: &[String]) -> Vec<&'static str> {
    ROAST_TABLES
        .into_iter()
        .filter(|table| !present.iter().any(|p| p == table))
        .collect()
}

fn db_error<E>(context: String, e: E) -> AppError
where
    E: std::error::Error + Send + Sync + 'static,
{
    AppError::with_source(ErrorKind::Database, format!("{context}: {e}"), e)
}
