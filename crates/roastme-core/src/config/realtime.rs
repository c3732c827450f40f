//! Real-time fan-out configuration.

use serde::{Deserialize, Serialize};

/// Session event fan-out settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RealtimeConfig {
    /// Buffered events per session channel before slow subscribers lag.
    #[serde(default = "default_channel_capacity")]
    pub channel_capacity: usize,
}

impl Default for RealtimeConfig {
    fn default() -> Self {
        Self {
            channel_capacity: default_channel_capacity(),
        }
    }
}

fn default_channel_capacity() -> usize {
    256
}
