//! Provider clients
//!
//! Six providers behind one explicit [`ChatProvider`] trait, selected at
//! startup via a registry keyed by provider name. Groq, Cerebras, and
//! OpenRouter speak the OpenAI-compatible chat wire through the shared
//! client in [`base`]; Mistral adds an embeddings endpoint; Gemini and
//! Cohere carry their own wire formats. Translation between wire shapes and
//! the crate's [`CompletionRequest`]/[`Completion`] happens exactly once at
//! this boundary, in each direction.

pub(crate) mod base;

pub mod cerebras;
pub mod cohere;
pub mod gemini;
pub mod groq;
pub mod mistral;
pub mod openrouter;

pub mod registry;

#[cfg(test)]
mod tests;

pub use registry::ProviderRegistry;

use crate::core::types::errors::ProviderError;
use crate::core::types::requests::CompletionRequest;
use crate::core::types::responses::Completion;
use async_trait::async_trait;
use futures::Stream;
use serde::Serialize;
use std::pin::Pin;

/// Outcome of a provider health probe
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum HealthStatus {
    Healthy,
    Unhealthy,
}

/// Lazy, finite, non-restartable sequence of completion text deltas.
/// Dropping the stream mid-flight releases the underlying connection.
pub type CompletionStream = Pin<Box<dyn Stream<Item = Result<String, ProviderError>> + Send>>;

/// Uniform contract over the six LLM providers.
///
/// Implementations are stateless between calls apart from static
/// configuration, so they need no locking and are safe to share behind an
/// `Arc` across all in-flight requests.
#[async_trait]
pub trait ChatProvider: Send + Sync {
    /// Registry name of this provider
    fn name(&self) -> &str;

    /// Model identifiers this provider accepts
    fn supported_models(&self) -> &[String];

    /// Model used when the caller does not specify one
    fn default_model(&self) -> &str;

    /// Whether `model` is on the supported list
    fn supports_model(&self, model: &str) -> bool {
        self.supported_models().iter().any(|m| m == model)
    }

    /// Issue one completion call, bounded by the provider's timeout budget
    /// and internal transient-failure retry.
    async fn complete(&self, request: CompletionRequest) -> Result<Completion, ProviderError>;

    /// Streaming completion. Providers without streaming support return a
    /// validation error.
    async fn complete_stream(
        &self,
        _request: CompletionRequest,
    ) -> Result<CompletionStream, ProviderError> {
        Err(ProviderError::validation(
            self.name().to_string(),
            "streaming is not supported by this provider",
        ))
    }

    /// Cheap reachability probe
    async fn health_check(&self) -> HealthStatus;
}
