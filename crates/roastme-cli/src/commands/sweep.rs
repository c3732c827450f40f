//! One-off expiry sweep.

use std::sync::Arc;

use crate::output::{self, OutputFormat};
use roastme_core::config::AppConfig;
use roastme_core::error::AppError;
use roastme_worker::ExpirySweeper;

/// Run a single sweep pass and print the report
pub async fn execute(config: &AppConfig, format: OutputFormat) -> Result<(), AppError> {
    let links = super::link_service(config).await?;
    let report = ExpirySweeper::new(Arc::new(links)).run_once().await?;
    output::print_sweep(&report, format);
    Ok(())
}
