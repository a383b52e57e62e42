//! Groq provider
//!
//! LPU-backed inference behind Groq's OpenAI-compatible API. The fastest
//! provider in the default set, which is why it leads the app-data chain.

use super::base::OpenAiCompatClient;
use super::{ChatProvider, CompletionStream, HealthStatus};
use crate::config::models::ProviderConfig;
use crate::core::types::errors::ProviderError;
use crate::core::types::requests::CompletionRequest;
use crate::core::types::responses::Completion;
use crate::utils::error::GatewayError;
use async_trait::async_trait;

/// Groq provider implementation
pub struct GroqProvider {
    client: OpenAiCompatClient,
    models: Vec<String>,
    default_model: String,
}

impl GroqProvider {
    /// Create a provider from its descriptor
    pub fn new(config: &ProviderConfig) -> Result<Self, GatewayError> {
        Ok(Self {
            client: OpenAiCompatClient::new(config)?,
            models: config.models.clone(),
            default_model: config.default_model.clone(),
        })
    }
}

#[async_trait]
impl ChatProvider for GroqProvider {
    fn name(&self) -> &str {
        "groq"
    }

    fn supported_models(&self) -> &[String] {
        &self.models
    }

    fn default_model(&self) -> &str {
        &self.default_model
    }

    async fn complete(&self, request: CompletionRequest) -> Result<Completion, ProviderError> {
        self.client.chat(&request).await
    }

    async fn complete_stream(
        &self,
        request: CompletionRequest,
    ) -> Result<CompletionStream, ProviderError> {
        self.client.chat_stream(&request).await
    }

    async fn health_check(&self) -> HealthStatus {
        self.client.health_check().await
    }
}
