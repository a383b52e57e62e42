//! Configuration management
//!
//! Loading, validation, and defaults for the gateway configuration. The six
//! provider descriptors, quota numbers, cache TTLs, and category chains are
//! all externally configurable; the built-in defaults match the provider
//! free tiers this layer was tuned for.

pub mod loader;
pub mod models;

pub use loader::env_key_var;
pub use models::*;

use crate::utils::error::{GatewayError, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::info;

/// Main configuration struct
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Provider descriptors
    #[serde(default = "Config::default_providers")]
    pub providers: Vec<ProviderConfig>,
    /// Response cache settings
    #[serde(default)]
    pub cache: CacheConfig,
    /// Category chains and request defaults
    #[serde(default)]
    pub routing: RoutingConfig,
    /// Usage logger settings
    #[serde(default)]
    pub usage: UsageConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            providers: Self::default_providers(),
            cache: CacheConfig::default(),
            routing: RoutingConfig::default(),
            usage: UsageConfig::default(),
        }
    }
}

impl Config {
    /// Load configuration from a YAML file, then resolve API keys from the
    /// environment and validate.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        info!("Loading configuration from: {:?}", path);

        let content = std::fs::read_to_string(path)
            .map_err(|e| GatewayError::Config(format!("Failed to read config file: {e}")))?;

        let mut config: Config = serde_yaml::from_str(&content)
            .map_err(|e| GatewayError::Config(format!("Failed to parse config: {e}")))?;

        config.resolve_api_keys();
        config.validate()?;
        Ok(config)
    }

    /// Build the default configuration with API keys resolved from the
    /// environment.
    pub fn from_env() -> Result<Self> {
        let mut config = Self::default();
        config.resolve_api_keys();
        config.validate()?;
        Ok(config)
    }

    /// Validate the whole configuration
    pub fn validate(&self) -> Result<()> {
        if self.providers.is_empty() {
            return Err(GatewayError::Config(
                "at least one provider must be configured".to_string(),
            ));
        }

        let mut names: Vec<&str> = Vec::with_capacity(self.providers.len());
        for provider in &self.providers {
            provider.validate().map_err(GatewayError::Config)?;
            if names.contains(&provider.name.as_str()) {
                return Err(GatewayError::Config(format!(
                    "Duplicate provider name: {}",
                    provider.name
                )));
            }
            names.push(&provider.name);
        }

        self.cache.validate().map_err(GatewayError::Config)?;
        self.usage.validate().map_err(GatewayError::Config)?;

        let known: Vec<String> = self.providers.iter().map(|p| p.name.clone()).collect();
        self.routing.validate(&known).map_err(GatewayError::Config)?;

        Ok(())
    }

    /// Descriptor lookup by provider name
    pub fn provider(&self, name: &str) -> Option<&ProviderConfig> {
        self.providers.iter().find(|p| p.name == name)
    }

    /// The six built-in provider descriptors
    pub fn default_providers() -> Vec<ProviderConfig> {
        vec![
            ProviderConfig {
                name: "groq".to_string(),
                base_url: "https://api.groq.com/openai/v1".to_string(),
                models: vec![
                    "llama-3.1-8b-instant".to_string(),
                    "llama-3.3-70b-versatile".to_string(),
                ],
                default_model: "llama-3.1-8b-instant".to_string(),
                quotas: QuotaConfig {
                    per_minute: 30,
                    per_day: 14_400,
                    per_month: 200_000,
                },
                timeout_secs: 8,
                max_retries: 2,
                retry: RetryConfig::default(),
                api_key: None,
            },
            ProviderConfig {
                name: "cerebras".to_string(),
                base_url: "https://api.cerebras.ai/v1".to_string(),
                models: vec!["llama-3.3-70b".to_string(), "llama3.1-8b".to_string()],
                default_model: "llama-3.3-70b".to_string(),
                quotas: QuotaConfig {
                    per_minute: 30,
                    per_day: 14_400,
                    per_month: 200_000,
                },
                timeout_secs: 8,
                max_retries: 2,
                retry: RetryConfig::default(),
                api_key: None,
            },
            ProviderConfig {
                name: "mistral".to_string(),
                base_url: "https://api.mistral.ai/v1".to_string(),
                models: vec![
                    "mistral-small-latest".to_string(),
                    "open-mistral-nemo".to_string(),
                ],
                default_model: "mistral-small-latest".to_string(),
                quotas: QuotaConfig {
                    per_minute: 60,
                    per_day: 10_000,
                    per_month: 100_000,
                },
                timeout_secs: 15,
                max_retries: 2,
                retry: RetryConfig::default(),
                api_key: None,
            },
            ProviderConfig {
                name: "gemini".to_string(),
                base_url: "https://generativelanguage.googleapis.com/v1beta".to_string(),
                models: vec![
                    "gemini-2.0-flash".to_string(),
                    "gemini-1.5-flash".to_string(),
                ],
                default_model: "gemini-2.0-flash".to_string(),
                quotas: QuotaConfig {
                    per_minute: 15,
                    per_day: 1_500,
                    per_month: 45_000,
                },
                timeout_secs: 20,
                max_retries: 2,
                retry: RetryConfig::default(),
                api_key: None,
            },
            ProviderConfig {
                name: "openrouter".to_string(),
                base_url: "https://openrouter.ai/api/v1".to_string(),
                models: vec![
                    "meta-llama/llama-3.3-70b-instruct:free".to_string(),
                    "google/gemma-3-27b-it:free".to_string(),
                ],
                default_model: "meta-llama/llama-3.3-70b-instruct:free".to_string(),
                quotas: QuotaConfig {
                    per_minute: 20,
                    per_day: 200,
                    per_month: 6_000,
                },
                timeout_secs: 25,
                max_retries: 2,
                retry: RetryConfig::default(),
                api_key: None,
            },
            ProviderConfig {
                name: "cohere".to_string(),
                base_url: "https://api.cohere.com/v2".to_string(),
                models: vec![
                    "command-r7b-12-2024".to_string(),
                    "command-r-08-2024".to_string(),
                ],
                default_model: "command-r7b-12-2024".to_string(),
                quotas: QuotaConfig {
                    per_minute: 20,
                    per_day: 1_000,
                    per_month: 30_000,
                },
                timeout_secs: 15,
                max_retries: 2,
                retry: RetryConfig::default(),
                api_key: None,
            },
        ]
    }
}
