//! Link lifecycle configuration.

use serde::{Deserialize, Serialize};

/// Longest lifetime a link may be configured with: one year.
pub const MAX_TTL_SECONDS: u64 = 365 * 24 * 60 * 60;

/// Link lifecycle settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LinkConfig {
    /// Lifetime of a link from creation, in seconds.
    #[serde(default = "default_ttl")]
    pub ttl_seconds: u64,
    /// Length of generated link IDs.
    #[serde(default = "default_id_length")]
    pub id_length: usize,
    /// How many times the final link delete of a cascade is attempted.
    #[serde(default = "default_retry_attempts")]
    pub cascade_retry_attempts: u32,
    /// Linear backoff between cascade retries, in milliseconds.
    #[serde(default = "default_retry_backoff")]
    pub cascade_retry_backoff_ms: u64,
}

impl Default for LinkConfig {
    fn default() -> Self {
        Self {
            ttl_seconds: default_ttl(),
            id_length: default_id_length(),
            cascade_retry_attempts: default_retry_attempts(),
            cascade_retry_backoff_ms: default_retry_backoff(),
        }
    }
}

fn default_ttl() -> u64 {
    1800
}

fn default_id_length() -> usize {
    10
}

fn default_retry_attempts() -> u32 {
    3
}

fn default_retry_backoff() -> u64 {
    50
}
