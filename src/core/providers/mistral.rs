//! Mistral provider
//!
//! OpenAI-compatible chat plus Mistral's embeddings endpoint. Embedding
//! responses are validated for vector dimensionality before they leave the
//! client.

use super::base::{
    OpenAiCompatClient, map_status, map_transport_error, retry_after_from, retry_transient,
};
use super::{ChatProvider, CompletionStream, HealthStatus};
use crate::config::models::{ProviderConfig, RetryConfig};
use crate::core::types::errors::ProviderError;
use crate::core::types::requests::CompletionRequest;
use crate::core::types::responses::Completion;
use crate::utils::error::GatewayError;
use async_trait::async_trait;
use futures::FutureExt;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Embedding model served by the embeddings endpoint
pub const EMBEDDING_MODEL: &str = "mistral-embed";
/// Dimensionality `mistral-embed` is contracted to return
pub const EMBEDDING_DIM: usize = 1024;

/// Mistral provider implementation
pub struct MistralProvider {
    client: OpenAiCompatClient,
    http: reqwest::Client,
    base_url: String,
    api_key: String,
    timeout: Duration,
    max_retries: u32,
    retry: RetryConfig,
    models: Vec<String>,
    default_model: String,
}

#[derive(Serialize)]
struct EmbeddingBody<'a> {
    model: &'static str,
    input: &'a [String],
}

#[derive(Deserialize)]
struct EmbeddingReply {
    #[serde(default)]
    data: Vec<EmbeddingDatum>,
}

#[derive(Deserialize)]
struct EmbeddingDatum {
    embedding: Vec<f32>,
}

impl MistralProvider {
    /// Create a provider from its descriptor
    pub fn new(config: &ProviderConfig) -> Result<Self, GatewayError> {
        let api_key = config.api_key.clone().ok_or_else(|| {
            GatewayError::Config(format!("provider {}: API key is not set", config.name))
        })?;
        let timeout = Duration::from_secs(config.timeout_secs);
        let http = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| {
                GatewayError::Config(format!(
                    "provider {}: failed to build HTTP client: {e}",
                    config.name
                ))
            })?;

        Ok(Self {
            client: OpenAiCompatClient::new(config)?,
            http,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            api_key,
            timeout,
            max_retries: config.max_retries,
            retry: config.retry,
            models: config.models.clone(),
            default_model: config.default_model.clone(),
        })
    }

    /// Embed a batch of texts, validating the vector dimensionality of
    /// every returned embedding.
    pub async fn embed(&self, texts: &[String]) -> Result<Vec<Vec<f32>>, ProviderError> {
        retry_transient("mistral", &self.retry, self.max_retries, || {
            self.embed_once(texts).boxed()
        })
        .await
    }

    async fn embed_once(&self, texts: &[String]) -> Result<Vec<Vec<f32>>, ProviderError> {
        let url = format!("{}/embeddings", self.base_url);
        let body = EmbeddingBody {
            model: EMBEDDING_MODEL,
            input: texts,
        };

        let response = self
            .http
            .post(&url)
            .bearer_auth(&self.api_key)
            .json(&body)
            .send()
            .await
            .map_err(|e| map_transport_error("mistral", e, self.timeout))?;

        let status = response.status();
        if !status.is_success() {
            let retry_after = retry_after_from(response.headers());
            let body = response.text().await.ok();
            return Err(map_status("mistral", status, retry_after, body));
        }

        let reply: EmbeddingReply = response.json().await.map_err(|e| {
            ProviderError::validation("mistral", format!("failed to parse response: {e}"))
        })?;

        if reply.data.len() != texts.len() {
            return Err(ProviderError::validation(
                "mistral",
                format!(
                    "expected {} embeddings, got {}",
                    texts.len(),
                    reply.data.len()
                ),
            ));
        }

        let mut vectors = Vec::with_capacity(reply.data.len());
        for datum in reply.data {
            if datum.embedding.len() != EMBEDDING_DIM {
                return Err(ProviderError::validation(
                    "mistral",
                    format!(
                        "embedding dimensionality {} does not match expected {EMBEDDING_DIM}",
                        datum.embedding.len()
                    ),
                ));
            }
            vectors.push(datum.embedding);
        }
        Ok(vectors)
    }
}

#[async_trait]
impl ChatProvider for MistralProvider {
    fn name(&self) -> &str {
        "mistral"
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
