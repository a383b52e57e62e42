//! Error handling
//!
//! Crate-level error type and `Result` alias. Provider-level failures use
//! the [`ProviderError`] taxonomy in `core::types::errors`; this enum is the
//! boundary surfaced to the embedding application.

use crate::core::types::errors::ProviderError;
use thiserror::Error;

/// Result type used throughout the gateway
pub type Result<T> = std::result::Result<T, GatewayError>;

/// Top-level gateway error
#[derive(Debug, Error)]
pub enum GatewayError {
    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Request validation error (e.g. an explicit provider/model override
    /// naming an unknown provider)
    #[error("Validation error: {field}: {message}")]
    Validation {
        /// Offending request field
        field: String,
        /// Human-readable reason
        message: String,
    },

    /// Provider call failure
    #[error(transparent)]
    Provider(#[from] ProviderError),

    /// Every provider in the fallback chain failed or was skipped
    #[error("all providers exhausted after {attempts} attempts")]
    Exhausted {
        /// Number of chain positions attempted or skipped
        attempts: u32,
    },

    /// Internal error
    #[error("Internal error: {0}")]
    Internal(String),
}

impl GatewayError {
    /// Shorthand for a request validation failure
    pub fn validation(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Validation {
            field: field.into(),
            message: message.into(),
        }
    }
}
