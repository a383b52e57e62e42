//! Cache configuration

use serde::{Deserialize, Serialize};

/// Response cache configuration. TTLs are per query category; the cache
/// itself is TTL-agnostic and receives them from the orchestrator.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CacheConfig {
    /// Maximum number of entries before eviction kicks in
    #[serde(default = "default_capacity")]
    pub capacity: usize,
    /// Eviction drains oldest-first down to this size
    #[serde(default = "default_low_watermark")]
    pub low_watermark: usize,
    /// TTL for general-knowledge responses, in seconds
    #[serde(default = "default_general_ttl")]
    pub general_ttl_secs: u64,
    /// TTL for responses derived from the user's own data, in seconds
    #[serde(default = "default_app_data_ttl")]
    pub app_data_ttl_secs: u64,
    /// TTL for time-sensitive responses, in seconds
    #[serde(default = "default_time_sensitive_ttl")]
    pub time_sensitive_ttl_secs: u64,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            capacity: default_capacity(),
            low_watermark: default_low_watermark(),
            general_ttl_secs: default_general_ttl(),
            app_data_ttl_secs: default_app_data_ttl(),
            time_sensitive_ttl_secs: default_time_sensitive_ttl(),
        }
    }
}

impl CacheConfig {
    /// Validate the configuration
    pub fn validate(&self) -> Result<(), String> {
        if self.capacity == 0 {
            return Err("cache capacity must be positive".to_string());
        }
        if self.low_watermark >= self.capacity {
            return Err(format!(
                "cache low_watermark ({}) must be below capacity ({})",
                self.low_watermark, self.capacity
            ));
        }
        Ok(())
    }
}

fn default_capacity() -> usize {
    1_000
}

fn default_low_watermark() -> usize {
    900
}

fn default_general_ttl() -> u64 {
    3_600
}

fn default_app_data_ttl() -> u64 {
    300
}

fn default_time_sensitive_ttl() -> u64 {
    120
}
