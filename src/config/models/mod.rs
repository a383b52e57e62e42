//! Configuration data models
//!
//! Serde-backed configuration structures for providers, cache, routing, and
//! usage logging.

pub mod cache;
pub mod provider;
pub mod routing;
pub mod usage;

// Re-export all configuration types
pub use cache::*;
pub use provider::*;
pub use routing::*;
pub use usage::*;

/// Default request timeout in seconds
pub fn default_timeout() -> u64 {
    15
}

/// Default maximum retry attempts inside a provider client
pub fn default_max_retries() -> u32 {
    2
}

/// Default completion budget in tokens
pub fn default_max_tokens() -> u32 {
    1024
}

/// Default sampling temperature
pub fn default_temperature() -> f32 {
    0.7
}
