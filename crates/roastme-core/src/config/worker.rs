//! Background worker configuration.

use serde::{Deserialize, Serialize};

/// Background expiry sweep configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WorkerConfig {
    /// Whether the periodic sweep runs at all.
    #[serde(default = "default_true")]
    pub enabled: bool,
    /// Six-field cron expression (with seconds) for the expiry sweep.
    #[serde(default = "default_sweep_cron")]
    pub sweep_cron: String,
}

impl Default for WorkerConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            sweep_cron: default_sweep_cron(),
        }
    }
}

fn default_true() -> bool {
    true
}

fn default_sweep_cron() -> String {
    "0 * * * * *".to_string()
}
