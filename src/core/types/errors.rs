//! Provider error taxonomy
//!
//! Every provider client maps its wire-level failures into this one enum;
//! provider-specific error shapes never leak above the client boundary. The
//! orchestrator advances the fallback chain (and decides reservation
//! rollback) purely on [`ErrorKind`].

use serde::{Deserialize, Serialize};
use std::time::Duration;
use thiserror::Error;

/// Kind of provider failure, used for fallback and retry decisions
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    /// 401/403 from the provider: misconfigured or revoked credentials
    Authentication,
    /// 429 from the provider
    RateLimit,
    /// The request exceeded its timeout budget
    Timeout,
    /// Connection or transport failure
    Network,
    /// Malformed or empty upstream response
    Validation,
    /// Anything else (unexpected status codes, provider bugs)
    Unknown,
}

impl ErrorKind {
    /// String tag used in usage records and log events
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorKind::Authentication => "authentication",
            ErrorKind::RateLimit => "rate_limit",
            ErrorKind::Timeout => "timeout",
            ErrorKind::Network => "network",
            ErrorKind::Validation => "validation",
            ErrorKind::Unknown => "unknown",
        }
    }
}

/// Unified provider error
#[derive(Debug, Clone, Error)]
pub enum ProviderError {
    #[error("{provider}: authentication failed: {message}")]
    Authentication { provider: String, message: String },

    #[error("{provider}: rate limited upstream")]
    RateLimit {
        provider: String,
        retry_after: Option<Duration>,
    },

    #[error("{provider}: request timed out after {elapsed_ms}ms")]
    Timeout { provider: String, elapsed_ms: u64 },

    #[error("{provider}: network error: {message}")]
    Network { provider: String, message: String },

    #[error("{provider}: invalid upstream response: {message}")]
    Validation { provider: String, message: String },

    #[error("{provider}: unexpected error: {message}")]
    Unknown { provider: String, message: String },
}

impl ProviderError {
    /// Authentication failure (never retried, never released)
    pub fn authentication(provider: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Authentication {
            provider: provider.into(),
            message: message.into(),
        }
    }

    /// Upstream 429
    pub fn rate_limit(provider: impl Into<String>, retry_after: Option<Duration>) -> Self {
        Self::RateLimit {
            provider: provider.into(),
            retry_after,
        }
    }

    /// Timeout after `elapsed_ms` milliseconds
    pub fn timeout(provider: impl Into<String>, elapsed_ms: u64) -> Self {
        Self::Timeout {
            provider: provider.into(),
            elapsed_ms,
        }
    }

    /// Connection or transport failure
    pub fn network(provider: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Network {
            provider: provider.into(),
            message: message.into(),
        }
    }

    /// Malformed upstream response
    pub fn validation(provider: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Validation {
            provider: provider.into(),
            message: message.into(),
        }
    }

    /// Unexpected failure
    pub fn unknown(provider: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Unknown {
            provider: provider.into(),
            message: message.into(),
        }
    }

    /// Name of the provider that produced this error
    pub fn provider(&self) -> &str {
        match self {
            Self::Authentication { provider, .. }
            | Self::Network { provider, .. }
            | Self::Validation { provider, .. }
            | Self::Unknown { provider, .. }
            | Self::RateLimit { provider, .. }
            | Self::Timeout { provider, .. } => provider,
        }
    }

    /// The taxonomy kind of this error
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Authentication { .. } => ErrorKind::Authentication,
            Self::RateLimit { .. } => ErrorKind::RateLimit,
            Self::Timeout { .. } => ErrorKind::Timeout,
            Self::Network { .. } => ErrorKind::Network,
            Self::Validation { .. } => ErrorKind::Validation,
            Self::Unknown { .. } => ErrorKind::Unknown,
        }
    }

    /// Whether this failure means no billable call completed.
    ///
    /// Transient kinds drive fallback-chain advancement and roll back the
    /// rate-limit reservation; authentication and validation failures are
    /// never retried and keep the reservation consumed.
    pub fn is_transient(&self) -> bool {
        matches!(
            self.kind(),
            ErrorKind::RateLimit | ErrorKind::Timeout | ErrorKind::Network
        )
    }
}
