//! OpenRouter provider
//!
//! Aggregator with free-tier routes, OpenAI-compatible wire. Leads the
//! general chain on cost. OpenRouter asks callers to identify themselves
//! via referer headers, which the client attaches to every request.

use super::base::OpenAiCompatClient;
use super::{ChatProvider, CompletionStream, HealthStatus};
use crate::config::models::ProviderConfig;
use crate::core::types::errors::ProviderError;
use crate::core::types::requests::CompletionRequest;
use crate::core::types::responses::Completion;
use crate::utils::error::GatewayError;
use async_trait::async_trait;

/// OpenRouter provider implementation
pub struct OpenRouterProvider {
    client: OpenAiCompatClient,
    models: Vec<String>,
    default_model: String,
}

impl OpenRouterProvider {
    /// Create a provider from its descriptor
    pub fn new(config: &ProviderConfig) -> Result<Self, GatewayError> {
        let headers = vec![
            ("HTTP-Referer", "https://github.com/majiayu000/study-ai-gateway".to_string()),
            ("X-Title", "study-ai-gateway".to_string()),
        ];
        Ok(Self {
            client: OpenAiCompatClient::with_headers(config, headers)?,
            models: config.models.clone(),
            default_model: config.default_model.clone(),
        })
    }
}

#[async_trait]
impl ChatProvider for OpenRouterProvider {
    fn name(&self) -> &str {
        "openrouter"
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
