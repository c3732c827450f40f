//! Expired link sweep.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{info, warn};

use roastme_core::result::AppResult;
use roastme_service::LinkService;

/// Outcome of one sweep pass.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SweepReport {
    /// Unusable links cascade-deleted.
    pub expired_links: u64,
    /// Sessions purged because their link record was already gone.
    pub orphan_sessions: u64,
    /// Items that failed and were left for the next pass.
    pub failures: u64,
}

impl SweepReport {
    /// Summary as JSON, for job logs.
    pub fn to_json(&self) -> Value {
        serde_json::json!({
            "task": "expiry_sweep",
            "expired_links": self.expired_links,
            "orphan_sessions": self.orphan_sessions,
            "failures": self.failures,
        })
    }
}

/// Reclaims links that are no longer usable.
#[derive(Debug, Clone)]
pub struct ExpirySweeper {
    links: Arc<LinkService>,
}

impl ExpirySweeper {
    /// Create a new sweeper.
    pub fn new(links: Arc<LinkService>) -> Self {
        Self { links }
    }

    /// Runs one pass.
    ///
    /// Failures on individual links are logged and counted; the pass only
    /// errors if the candidate listings themselves fail.
    pub async fn run_once(&self) -> AppResult<SweepReport> {
        let mut report = SweepReport::default();

        for id in self.links.unusable_link_ids().await? {
            match self.links.reclaim_if_unusable(&id).await {
                Ok(true) => report.expired_links += 1,
                Ok(false) => {}
                Err(e) => {
                    warn!(link_id = %id, error = %e, "Failed to reclaim link");
                    report.failures += 1;
                }
            }
        }

        for id in self.links.orphaned_session_ids().await? {
            match self.links.purge_orphan(&id).await {
                Ok(Some(_)) => report.orphan_sessions += 1,
                Ok(None) => {}
                Err(e) => {
                    warn!(link_id = %id, error = %e, "Failed to purge orphaned session");
                    report.failures += 1;
                }
            }
        }

        info!(
            expired_links = report.expired_links,
            orphan_sessions = report.orphan_sessions,
            failures = report.failures,
            "Expiry sweep finished"
        );
        Ok(report)
    }
}
