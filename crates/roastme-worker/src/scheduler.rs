//! Cron scheduler for the periodic expiry sweep.

use tokio_cron_scheduler::{Job as CronJob, JobScheduler};

use roastme_core::error::AppError;

use crate::jobs::ExpirySweeper;

/// Cron-based scheduler for periodic background tasks
pub struct CronScheduler {
    /// The underlying job scheduler
    scheduler: JobScheduler,
}

impl std::fmt::Debug for CronScheduler {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CronScheduler").finish()
    }
}

impl CronScheduler {
    /// Create a new cron scheduler
    pub async fn new() -> Result<Self, AppError> {
        let scheduler = JobScheduler::new()
            .await
            .map_err(|e| AppError::internal(format!("Failed to create scheduler: {}", e)))?;

        Ok(Self { scheduler })
    }

    /// Register the expiry sweep on a six-field cron expression
    pub async fn register_expiry_sweep(
        &self,
        cron: &str,
        sweeper: ExpirySweeper,
    ) -> Result<(), AppError> {
        let job = CronJob::new_async(cron, move |_uuid, _lock| {
            let sweeper = sweeper.clone();
            Box::pin(async move {
                tracing::debug!("Running scheduled expiry sweep");
                match sweeper.run_once().await {
                    Ok(report) => tracing::debug!(summary = %report.to_json(), "Sweep summary"),
                    Err(e) => tracing::error!("Expiry sweep failed: {}", e),
                }
            })
        })
        .map_err(|e| {
            AppError::configuration(format!("Invalid expiry sweep schedule '{}': {}", cron, e))
        })?;

        self.scheduler.add(job).await.map_err(|e| {
            AppError::internal(format!("Failed to add expiry_sweep schedule: {}", e))
        })?;

        tracing::info!(cron, "Registered: expiry_sweep");
        Ok(())
    }

    /// Start the scheduler
    pub async fn start(&self) -> Result<(), AppError> {
        self.scheduler
            .start()
            .await
            .map_err(|e| AppError::internal(format!("Failed to start scheduler: {}", e)))?;

        tracing::info!("Cron scheduler started");
        Ok(())
    }

    /// Shutdown the scheduler
    pub async fn shutdown(&mut self) -> Result<(), AppError> {
        self.scheduler
            .shutdown()
            .await
            .map_err(|e| AppError::internal(format!("Failed to shutdown scheduler: {}", e)))?;

        tracing::info!("Cron scheduler shut down");
        Ok(())
    }
}
