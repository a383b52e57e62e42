//! Common test utilities
//!
//! Scripted mock providers, a capturing usage sink, and config fixtures
//! shared by the integration tests.

use async_trait::async_trait;
use parking_lot::Mutex;
use std::collections::VecDeque;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Arc;
use study_ai_gateway::config::models::{ProviderConfig, QuotaConfig, RetryConfig};
use study_ai_gateway::core::providers::{ChatProvider, HealthStatus};
use study_ai_gateway::{
    Completion, CompletionRequest, Config, ProviderError, TokenUsage, UsageRecord, UsageSink,
};

/// Provider whose outcomes are scripted up front. Once the script is
/// exhausted it answers with a canned success, so tests only script the
/// interesting prefix.
pub struct MockProvider {
    name: String,
    models: Vec<String>,
    script: Mutex<VecDeque<Result<Completion, ProviderError>>>,
    calls: AtomicU32,
}

impl MockProvider {
    pub fn new(name: &str, script: Vec<Result<Completion, ProviderError>>) -> Arc<Self> {
        Arc::new(Self {
            name: name.to_string(),
            models: vec![format!("{name}-default")],
            script: Mutex::new(script.into()),
            calls: AtomicU32::new(0),
        })
    }

    /// Number of completion calls this provider has received
    pub fn calls(&self) -> u32 {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl ChatProvider for MockProvider {
    fn name(&self) -> &str {
        &self.name
    }

    fn supported_models(&self) -> &[String] {
        &self.models
    }

    fn default_model(&self) -> &str {
        &self.models[0]
    }

    async fn complete(&self, request: CompletionRequest) -> Result<Completion, ProviderError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.script.lock().pop_front().unwrap_or_else(|| {
            Ok(Completion {
                content: format!("reply from {}", self.name),
                model: request.model,
                usage: TokenUsage::default(),
            })
        })
    }

    async fn health_check(&self) -> HealthStatus {
        HealthStatus::Healthy
    }
}

/// Successful scripted outcome
pub fn ok(content: &str) -> Result<Completion, ProviderError> {
    Ok(Completion {
        content: content.to_string(),
        model: "scripted-model".to_string(),
        usage: TokenUsage {
            input_tokens: 10,
            output_tokens: 5,
        },
    })
}

/// Sink that captures every flushed record for assertions
#[derive(Default)]
pub struct CapturingSink {
    records: Mutex<Vec<UsageRecord>>,
}

impl CapturingSink {
    pub fn records(&self) -> Vec<UsageRecord> {
        self.records.lock().clone()
    }
}

#[async_trait]
impl UsageSink for CapturingSink {
    async fn append(&self, records: Vec<UsageRecord>) -> anyhow::Result<()> {
        self.records.lock().extend(records);
        Ok(())
    }
}

/// Config whose provider entries match the mock provider names, with roomy
/// quotas unless a test overrides them.
pub fn test_config() -> Config {
    let mut config = Config::default();
    config.providers = ["groq", "cerebras", "mistral", "gemini", "openrouter", "cohere"]
        .iter()
        .map(|name| provider_entry(name))
        .collect();
    config
}

pub fn provider_entry(name: &str) -> ProviderConfig {
    ProviderConfig {
        name: name.to_string(),
        base_url: "https://example.invalid/v1".to_string(),
        models: vec![format!("{name}-default")],
        default_model: format!("{name}-default"),
        quotas: QuotaConfig {
            per_minute: 100,
            per_day: 10_000,
            per_month: 100_000,
        },
        timeout_secs: 5,
        max_retries: 0,
        retry: RetryConfig::default(),
        api_key: None,
    }
}
