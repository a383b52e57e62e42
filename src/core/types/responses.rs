//! Response types
//!
//! [`StandardResponse`] is the only shape ever returned to callers;
//! provider-specific response bodies are translated into [`Completion`]
//! inside each client and never leak upward.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::core::classifier::QueryCategory;

/// Token accounting for a single completion
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct TokenUsage {
    /// Tokens consumed by the prompt
    pub input_tokens: u32,
    /// Tokens produced by the completion
    pub output_tokens: u32,
}

impl TokenUsage {
    /// Total tokens billed for the call
    pub fn total(&self) -> u32 {
        self.input_tokens + self.output_tokens
    }
}

/// Provider-level completion result, produced at the client boundary
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Completion {
    /// Completion text, validated non-empty by the client
    pub content: String,
    /// Model that produced the completion
    pub model: String,
    /// Token accounting as reported by the provider
    #[serde(default)]
    pub usage: TokenUsage,
}

/// The single response shape returned to callers.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StandardResponse {
    /// Id of the originating request
    pub request_id: Uuid,

    /// Response text; the configured degraded message when `degraded` is set
    pub content: String,

    /// Provider that produced the content; `None` for a degraded response
    #[serde(skip_serializing_if = "Option::is_none")]
    pub provider: Option<String>,

    /// Model that produced the content
    #[serde(skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,

    /// Category the query was classified into
    pub category: QueryCategory,

    /// 1-based position in the fallback chain that satisfied the request;
    /// 0 when the degraded message was served
    pub tier: u32,

    /// Whether this response was served from the cache
    pub cached: bool,

    /// Whether a fallback tier (tier > 1) satisfied the request
    pub fallback_used: bool,

    /// Whether every provider failed and the degraded message was served
    pub degraded: bool,

    /// Token accounting
    #[serde(default)]
    pub usage: TokenUsage,

    /// End-to-end latency in milliseconds
    pub latency_ms: u64,

    /// Set when any quota window of the serving provider is at or above 80%
    pub rate_limit_warning: bool,
}
