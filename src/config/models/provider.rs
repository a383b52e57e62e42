//! Provider configuration

use super::*;
use serde::{Deserialize, Serialize};

/// Static descriptor for one provider. Loaded once at process start and
/// never mutated at runtime.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProviderConfig {
    /// Provider name (groq, cerebras, mistral, gemini, openrouter, cohere)
    pub name: String,
    /// Base endpoint
    pub base_url: String,
    /// Supported model identifiers, in preference order
    #[serde(default)]
    pub models: Vec<String>,
    /// Model used when the caller does not override
    pub default_model: String,
    /// Quota windows
    #[serde(default)]
    pub quotas: QuotaConfig,
    /// Hard timeout budget per call, in seconds
    #[serde(default = "default_timeout")]
    pub timeout_secs: u64,
    /// Maximum retries for transient failures inside the client
    #[serde(default = "default_max_retries")]
    pub max_retries: u32,
    /// Retry backoff configuration
    #[serde(default)]
    pub retry: RetryConfig,
    /// API key, resolved from the process environment. Never serialized,
    /// never logged.
    #[serde(skip)]
    pub api_key: Option<String>,
}

impl ProviderConfig {
    /// Validate the descriptor
    pub fn validate(&self) -> Result<(), String> {
        if self.name.is_empty() {
            return Err("provider name must not be empty".to_string());
        }
        if self.base_url.is_empty() {
            return Err(format!("provider {}: base_url must not be empty", self.name));
        }
        if self.default_model.is_empty() {
            return Err(format!("provider {}: default_model must not be empty", self.name));
        }
        if !self.models.is_empty() && !self.models.contains(&self.default_model) {
            return Err(format!(
                "provider {}: default_model {} is not in the models list",
                self.name, self.default_model
            ));
        }
        if self.timeout_secs == 0 {
            return Err(format!("provider {}: timeout_secs must be positive", self.name));
        }
        self.quotas.validate(&self.name)
    }
}

/// Per-provider quota windows. A reservation is granted only when every
/// window has headroom.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct QuotaConfig {
    /// Requests per minute (sliding window)
    #[serde(default = "default_per_minute")]
    pub per_minute: u32,
    /// Requests per day (fixed window)
    #[serde(default = "default_per_day")]
    pub per_day: u32,
    /// Requests per 30 days (fixed window)
    #[serde(default = "default_per_month")]
    pub per_month: u32,
}

impl Default for QuotaConfig {
    fn default() -> Self {
        Self {
            per_minute: default_per_minute(),
            per_day: default_per_day(),
            per_month: default_per_month(),
        }
    }
}

impl QuotaConfig {
    fn validate(&self, provider: &str) -> Result<(), String> {
        if self.per_minute == 0 || self.per_day == 0 || self.per_month == 0 {
            return Err(format!("provider {provider}: quota windows must be positive"));
        }
        Ok(())
    }
}

/// Retry backoff configuration
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct RetryConfig {
    /// Base delay in milliseconds
    #[serde(default = "default_base_delay")]
    pub base_delay_ms: u64,
    /// Maximum delay in milliseconds
    #[serde(default = "default_max_delay")]
    pub max_delay_ms: u64,
    /// Jitter added to each delay, as a fraction of the delay (0.0 to 1.0)
    #[serde(default = "default_jitter")]
    pub jitter: f64,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            base_delay_ms: default_base_delay(),
            max_delay_ms: default_max_delay(),
            jitter: default_jitter(),
        }
    }
}

fn default_per_minute() -> u32 {
    30
}

fn default_per_day() -> u32 {
    1_000
}

fn default_per_month() -> u32 {
    20_000
}

fn default_base_delay() -> u64 {
    500
}

fn default_max_delay() -> u64 {
    8_000
}

fn default_jitter() -> f64 {
    0.1
}
