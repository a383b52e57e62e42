//! Usage logging configuration

use serde::{Deserialize, Serialize};

/// Usage logger configuration
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct UsageConfig {
    /// Flush to the sink once this many records are buffered
    #[serde(default = "default_batch_size")]
    pub batch_size: usize,
    /// Flush at least this often regardless of batch size, in seconds
    #[serde(default = "default_flush_interval")]
    pub flush_interval_secs: u64,
    /// Bounded channel depth; overflow drops records, never blocks requests
    #[serde(default = "default_channel_capacity")]
    pub channel_capacity: usize,
}

impl Default for UsageConfig {
    fn default() -> Self {
        Self {
            batch_size: default_batch_size(),
            flush_interval_secs: default_flush_interval(),
            channel_capacity: default_channel_capacity(),
        }
    }
}

impl UsageConfig {
    /// Validate the configuration
    pub fn validate(&self) -> Result<(), String> {
        if self.batch_size == 0 {
            return Err("usage batch_size must be positive".to_string());
        }
        if self.flush_interval_secs == 0 {
            return Err("usage flush_interval_secs must be positive".to_string());
        }
        if self.channel_capacity == 0 {
            return Err("usage channel_capacity must be positive".to_string());
        }
        Ok(())
    }
}

fn default_batch_size() -> usize {
    20
}

fn default_flush_interval() -> u64 {
    5
}

fn default_channel_capacity() -> usize {
    1_024
}
