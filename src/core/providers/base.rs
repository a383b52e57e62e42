//! Shared provider plumbing
//!
//! The OpenAI-compatible chat client used by Groq, Cerebras, Mistral, and
//! OpenRouter, plus the status-code mapping, transient-retry loop, and SSE
//! stream parsing shared by every client. Wire shapes stay inside this
//! module.

use crate::config::models::{ProviderConfig, RetryConfig};
use crate::core::types::errors::{ErrorKind, ProviderError};
use crate::core::types::requests::CompletionRequest;
use crate::core::types::responses::{Completion, TokenUsage};
use crate::utils::error::{GatewayError, Result};
use futures::future::BoxFuture;
use futures::{FutureExt, Stream, StreamExt};
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::pin::Pin;
use std::task::{Context, Poll};
use std::time::Duration;
use tracing::{debug, warn};

use super::CompletionStream;

/// Map a non-2xx status to the error taxonomy.
///
/// 401/403 are credential problems, 429 is an upstream rate limit, and
/// everything else is Unknown; the chain advances on all of them, but only
/// the rate limit releases the local reservation.
pub(crate) fn map_status(
    provider: &str,
    status: reqwest::StatusCode,
    retry_after: Option<Duration>,
    body: Option<String>,
) -> ProviderError {
    match status.as_u16() {
        401 | 403 => ProviderError::authentication(
            provider,
            body.unwrap_or_else(|| "invalid API key".to_string()),
        ),
        429 => ProviderError::rate_limit(provider, retry_after),
        code => ProviderError::unknown(
            provider,
            format!(
                "HTTP {code}: {}",
                body.unwrap_or_else(|| "no response body".to_string())
            ),
        ),
    }
}

/// Parse a `Retry-After` header expressed in seconds
pub(crate) fn retry_after_from(headers: &reqwest::header::HeaderMap) -> Option<Duration> {
    headers
        .get(reqwest::header::RETRY_AFTER)?
        .to_str()
        .ok()?
        .parse::<u64>()
        .ok()
        .map(Duration::from_secs)
}

/// Map a reqwest transport failure to the error taxonomy
pub(crate) fn map_transport_error(
    provider: &str,
    error: reqwest::Error,
    timeout: Duration,
) -> ProviderError {
    if error.is_timeout() {
        ProviderError::timeout(provider, timeout.as_millis() as u64)
    } else {
        ProviderError::network(provider, error.to_string())
    }
}

/// Exponential backoff with jitter: `base * 2^(attempt-1)`, capped
pub(crate) fn backoff_delay(retry: &RetryConfig, attempt: u32) -> Duration {
    let exp = retry
        .base_delay_ms
        .saturating_mul(1u64 << (attempt.saturating_sub(1)).min(16));
    let capped = exp.min(retry.max_delay_ms);
    let jitter = (capped as f64 * retry.jitter * rand::thread_rng().gen::<f64>()) as u64;
    Duration::from_millis(capped + jitter)
}

/// Run `op` with bounded retry for transient failures only.
///
/// Timeout and network errors retry with doubling delay; authentication and
/// validation failures indicate misconfiguration or a broken contract and
/// return immediately. Upstream rate limits also return immediately so the
/// fallback chain advances instead of waiting out the window.
pub(crate) async fn retry_transient<'a, T>(
    provider: &str,
    retry: &RetryConfig,
    max_retries: u32,
    op: impl Fn() -> BoxFuture<'a, std::result::Result<T, ProviderError>>,
) -> std::result::Result<T, ProviderError> {
    let mut attempt = 0u32;
    loop {
        attempt += 1;
        match op().await {
            Ok(value) => return Ok(value),
            Err(error)
                if matches!(error.kind(), ErrorKind::Timeout | ErrorKind::Network)
                    && attempt <= max_retries =>
            {
                let delay = backoff_delay(retry, attempt);
                debug!(
                    provider,
                    attempt,
                    delay_ms = delay.as_millis() as u64,
                    "transient failure, retrying: {error}"
                );
                tokio::time::sleep(delay).await;
            }
            Err(error) => return Err(error),
        }
    }
}

// ---------------------------------------------------------------------------
// OpenAI-compatible wire types
// ---------------------------------------------------------------------------

#[derive(Serialize)]
struct WireMessage<'a> {
    role: &'static str,
    content: &'a str,
}

fn is_false(value: &bool) -> bool {
    !value
}

#[derive(Serialize)]
struct ChatCompletionBody<'a> {
    model: &'a str,
    messages: Vec<WireMessage<'a>>,
    max_tokens: u32,
    temperature: f32,
    #[serde(skip_serializing_if = "is_false")]
    stream: bool,
}

#[derive(Deserialize)]
struct ChatCompletionReply {
    #[serde(default)]
    choices: Vec<WireChoice>,
    #[serde(default)]
    usage: Option<WireUsage>,
    #[serde(default)]
    model: Option<String>,
}

#[derive(Deserialize)]
struct WireChoice {
    message: WireReplyMessage,
}

#[derive(Deserialize)]
struct WireReplyMessage {
    #[serde(default)]
    content: Option<String>,
}

#[derive(Deserialize, Default)]
struct WireUsage {
    #[serde(default)]
    prompt_tokens: u32,
    #[serde(default)]
    completion_tokens: u32,
}

#[derive(Deserialize)]
struct StreamChunk {
    #[serde(default)]
    choices: Vec<StreamChoice>,
}

#[derive(Deserialize)]
struct StreamChoice {
    #[serde(default)]
    delta: StreamDelta,
}

#[derive(Deserialize, Default)]
struct StreamDelta {
    #[serde(default)]
    content: Option<String>,
}

// ---------------------------------------------------------------------------
// Client
// ---------------------------------------------------------------------------

/// HTTP client for OpenAI-compatible chat endpoints
pub(crate) struct OpenAiCompatClient {
    provider: String,
    http: reqwest::Client,
    base_url: String,
    api_key: String,
    timeout: Duration,
    max_retries: u32,
    retry: RetryConfig,
    extra_headers: Vec<(&'static str, String)>,
}

impl OpenAiCompatClient {
    /// Build a client from a provider descriptor. Fails fast and clearly
    /// when the API key is absent.
    pub(crate) fn new(config: &ProviderConfig) -> Result<Self> {
        Self::with_headers(config, Vec::new())
    }

    /// Build a client with provider-specific extra headers
    pub(crate) fn with_headers(
        config: &ProviderConfig,
        extra_headers: Vec<(&'static str, String)>,
    ) -> Result<Self> {
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
            provider: config.name.clone(),
            http,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            api_key,
            timeout,
            max_retries: config.max_retries,
            retry: config.retry,
            extra_headers,
        })
    }

    fn request_builder(&self, url: &str) -> reqwest::RequestBuilder {
        let mut builder = self.http.post(url).bearer_auth(&self.api_key);
        for (name, value) in &self.extra_headers {
            builder = builder.header(*name, value);
        }
        builder
    }

    /// One chat completion call with transient-failure retry
    pub(crate) async fn chat(
        &self,
        request: &CompletionRequest,
    ) -> std::result::Result<Completion, ProviderError> {
        retry_transient(&self.provider, &self.retry, self.max_retries, || {
            self.chat_once(request).boxed()
        })
        .await
    }

    async fn chat_once(
        &self,
        request: &CompletionRequest,
    ) -> std::result::Result<Completion, ProviderError> {
        let url = format!("{}/chat/completions", self.base_url);
        let body = build_body(request, false);

        debug!(provider = %self.provider, model = %request.model, "chat request");

        let response = self
            .request_builder(&url)
            .json(&body)
            .send()
            .await
            .map_err(|e| map_transport_error(&self.provider, e, self.timeout))?;

        let status = response.status();
        if !status.is_success() {
            let retry_after = retry_after_from(response.headers());
            let body = response.text().await.ok();
            return Err(map_status(&self.provider, status, retry_after, body));
        }

        let reply: ChatCompletionReply = response.json().await.map_err(|e| {
            ProviderError::validation(&self.provider, format!("failed to parse response: {e}"))
        })?;

        validate_reply(&self.provider, reply, &request.model)
    }

    /// Streaming chat completion. The returned stream ends at the upstream
    /// `[DONE]` marker; dropping it drops the response body and with it the
    /// connection.
    pub(crate) async fn chat_stream(
        &self,
        request: &CompletionRequest,
    ) -> std::result::Result<CompletionStream, ProviderError> {
        let url = format!("{}/chat/completions", self.base_url);
        let body = build_body(request, true);

        let response = self
            .request_builder(&url)
            .json(&body)
            .send()
            .await
            .map_err(|e| map_transport_error(&self.provider, e, self.timeout))?;

        let status = response.status();
        if !status.is_success() {
            let retry_after = retry_after_from(response.headers());
            let body = response.text().await.ok();
            return Err(map_status(&self.provider, status, retry_after, body));
        }

        let stream = SseStream::new(self.provider.clone(), response.bytes_stream());
        Ok(Box::pin(stream))
    }

    /// Probe the models listing endpoint
    pub(crate) async fn health_check(&self) -> super::HealthStatus {
        let url = format!("{}/models", self.base_url);
        match self.http.get(&url).bearer_auth(&self.api_key).send().await {
            Ok(response) if response.status().is_success() => super::HealthStatus::Healthy,
            _ => super::HealthStatus::Unhealthy,
        }
    }
}

fn build_body<'a>(request: &'a CompletionRequest, stream: bool) -> ChatCompletionBody<'a> {
    let mut messages = Vec::with_capacity(2);
    if let Some(system) = &request.system_prompt {
        messages.push(WireMessage {
            role: "system",
            content: system,
        });
    }
    messages.push(WireMessage {
        role: "user",
        content: &request.prompt,
    });

    ChatCompletionBody {
        model: &request.model,
        messages,
        max_tokens: request.max_tokens,
        temperature: request.temperature,
        stream,
    }
}

/// Validate the response shape: a completion with no content is a contract
/// violation, not a usable answer.
fn validate_reply(
    provider: &str,
    reply: ChatCompletionReply,
    requested_model: &str,
) -> std::result::Result<Completion, ProviderError> {
    let usage = reply.usage.unwrap_or_default();
    let model = reply
        .model
        .unwrap_or_else(|| requested_model.to_string());

    let content = reply
        .choices
        .into_iter()
        .next()
        .and_then(|choice| choice.message.content)
        .unwrap_or_default();

    if content.is_empty() {
        return Err(ProviderError::validation(
            provider,
            "completion content is empty",
        ));
    }

    Ok(Completion {
        content,
        model,
        usage: TokenUsage {
            input_tokens: usage.prompt_tokens,
            output_tokens: usage.completion_tokens,
        },
    })
}

// ---------------------------------------------------------------------------
// SSE stream
// ---------------------------------------------------------------------------

/// Parses `data:` lines from an OpenAI-compatible SSE body into text deltas
pub(crate) struct SseStream {
    provider: String,
    inner: Pin<Box<dyn Stream<Item = std::result::Result<bytes::Bytes, reqwest::Error>> + Send>>,
    buffer: String,
    done: bool,
}

impl SseStream {
    pub(crate) fn new(
        provider: String,
        inner: impl Stream<Item = std::result::Result<bytes::Bytes, reqwest::Error>>
        + Send
        + 'static,
    ) -> Self {
        Self {
            provider,
            inner: Box::pin(inner),
            buffer: String::new(),
            done: false,
        }
    }

    /// Pull the next complete `data:` payload out of the buffer
    fn next_data_payload(&mut self) -> Option<String> {
        while let Some(pos) = self.buffer.find('\n') {
            let line: String = self.buffer.drain(..=pos).collect();
            let line = line.trim();
            if let Some(data) = line.strip_prefix("data:") {
                return Some(data.trim().to_string());
            }
        }
        None
    }
}

impl Stream for SseStream {
    type Item = std::result::Result<String, ProviderError>;

    fn poll_next(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        loop {
            if self.done {
                return Poll::Ready(None);
            }

            if let Some(data) = self.next_data_payload() {
                if data == "[DONE]" {
                    self.done = true;
                    return Poll::Ready(None);
                }
                match serde_json::from_str::<StreamChunk>(&data) {
                    Ok(chunk) => {
                        let delta = chunk
                            .choices
                            .into_iter()
                            .next()
                            .and_then(|choice| choice.delta.content);
                        match delta {
                            Some(text) if !text.is_empty() => {
                                return Poll::Ready(Some(Ok(text)));
                            }
                            // Role-only or empty deltas carry no text
                            _ => continue,
                        }
                    }
                    Err(e) => {
                        warn!(provider = %self.provider, "skipping unparseable SSE chunk: {e}");
                        continue;
                    }
                }
            }

            match self.inner.poll_next_unpin(cx) {
                Poll::Ready(Some(Ok(bytes))) => {
                    self.buffer.push_str(&String::from_utf8_lossy(&bytes));
                }
                Poll::Ready(Some(Err(e))) => {
                    self.done = true;
                    let provider = self.provider.clone();
                    return Poll::Ready(Some(Err(ProviderError::network(
                        provider,
                        e.to_string(),
                    ))));
                }
                Poll::Ready(None) => {
                    self.done = true;
                    return Poll::Ready(None);
                }
                Poll::Pending => return Poll::Pending,
            }
        }
    }
}
