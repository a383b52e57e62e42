//! Cohere provider
//!
//! Cohere's v2 chat wire format: role/content messages like OpenAI, but
//! content comes back as a list of typed blocks and usage under
//! `billed_units`.

use super::base::{map_status, map_transport_error, retry_after_from, retry_transient};
use super::{ChatProvider, HealthStatus};
use crate::config::models::{ProviderConfig, RetryConfig};
use crate::core::types::errors::ProviderError;
use crate::core::types::requests::CompletionRequest;
use crate::core::types::responses::{Completion, TokenUsage};
use crate::utils::error::GatewayError;
use async_trait::async_trait;
use futures::FutureExt;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Cohere provider implementation
pub struct CohereProvider {
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
struct ChatBody<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
    max_tokens: u32,
    temperature: f32,
}

#[derive(Serialize)]
struct ChatMessage<'a> {
    role: &'static str,
    content: &'a str,
}

#[derive(Deserialize)]
struct ChatReply {
    #[serde(default)]
    message: Option<ReplyMessage>,
    #[serde(default)]
    usage: Option<ReplyUsage>,
}

#[derive(Deserialize)]
struct ReplyMessage {
    #[serde(default)]
    content: Vec<ContentBlock>,
}

#[derive(Deserialize)]
struct ContentBlock {
    #[serde(default)]
    text: Option<String>,
}

#[derive(Deserialize)]
struct ReplyUsage {
    #[serde(default)]
    billed_units: Option<BilledUnits>,
}

#[derive(Deserialize, Default)]
struct BilledUnits {
    #[serde(default)]
    input_tokens: u32,
    #[serde(default)]
    output_tokens: u32,
}

impl CohereProvider {
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

    async fn chat_once(&self, request: &CompletionRequest) -> Result<Completion, ProviderError> {
        let url = format!("{}/chat", self.base_url);

        let mut messages = Vec::with_capacity(2);
        if let Some(system) = &request.system_prompt {
            messages.push(ChatMessage {
                role: "system",
                content: system,
            });
        }
        messages.push(ChatMessage {
            role: "user",
            content: &request.prompt,
        });

        let body = ChatBody {
            model: &request.model,
            messages,
            max_tokens: request.max_tokens,
            temperature: request.temperature,
        };

        let response = self
            .http
            .post(&url)
            .bearer_auth(&self.api_key)
            .json(&body)
            .send()
            .await
            .map_err(|e| map_transport_error("cohere", e, self.timeout))?;

        let status = response.status();
        if !status.is_success() {
            let retry_after = retry_after_from(response.headers());
            let body = response.text().await.ok();
            return Err(map_status("cohere", status, retry_after, body));
        }

        let reply: ChatReply = response.json().await.map_err(|e| {
            ProviderError::validation("cohere", format!("failed to parse response: {e}"))
        })?;

        let content: String = reply
            .message
            .map(|message| {
                message
                    .content
                    .into_iter()
                    .filter_map(|block| block.text)
                    .collect::<Vec<_>>()
                    .join("")
            })
            .unwrap_or_default();

        if content.is_empty() {
            return Err(ProviderError::validation(
                "cohere",
                "completion content is empty",
            ));
        }

        let billed = reply
            .usage
            .and_then(|usage| usage.billed_units)
            .unwrap_or_default();

        Ok(Completion {
            content,
            model: request.model.clone(),
            usage: TokenUsage {
                input_tokens: billed.input_tokens,
                output_tokens: billed.output_tokens,
            },
        })
    }
}

#[async_trait]
impl ChatProvider for CohereProvider {
    fn name(&self) -> &str {
        "cohere"
    }

    fn supported_models(&self) -> &[String] {
        &self.models
    }

    fn default_model(&self) -> &str {
        &self.default_model
    }

    async fn complete(&self, request: CompletionRequest) -> Result<Completion, ProviderError> {
        retry_transient("cohere", &self.retry, self.max_retries, || {
            self.chat_once(&request).boxed()
        })
        .await
    }

    async fn health_check(&self) -> HealthStatus {
        let url = format!("{}/models", self.base_url);
        match self.http.get(&url).bearer_auth(&self.api_key).send().await {
            Ok(response) if response.status().is_success() => HealthStatus::Healthy,
            _ => HealthStatus::Unhealthy,
        }
    }
}
