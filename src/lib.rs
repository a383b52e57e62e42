//! # Study AI Gateway
//!
//! Multi-provider AI request routing and resilience layer. Accepts a chat
//! request, classifies it, selects among six interchangeable LLM providers
//! under per-provider quota windows, applies a deterministic fallback chain
//! on failure, caches responses, and logs usage. Callers always receive a
//! usable response: when every provider in a chain fails or is skipped, a
//! pre-written degraded message is returned instead of a raw error.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use study_ai_gateway::{
//!     Config, ProviderRegistry, QueryRequest, ServiceManager, UsageLogger,
//! };
//! # use study_ai_gateway::core::usage::{UsageRecord, UsageSink};
//! # struct NullSink;
//! # #[async_trait::async_trait]
//! # impl UsageSink for NullSink {
//! #     async fn append(&self, _records: Vec<UsageRecord>) -> anyhow::Result<()> { Ok(()) }
//! # }
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = Config::from_env()?;
//!     let registry = ProviderRegistry::from_config(&config);
//!     let usage = UsageLogger::new(Arc::new(NullSink), &config.usage);
//!     let manager = ServiceManager::new(&config, registry, usage);
//!
//!     let request = QueryRequest::new("user-42", "How do derivatives work?");
//!     let response = manager.process_query(request).await?;
//!     println!("[{}] {}", response.provider.as_deref().unwrap_or("degraded"), response.content);
//!     Ok(())
//! }
//! ```

#![warn(clippy::all)]
#![allow(clippy::module_inception)]

pub mod config;
pub mod core;
pub mod utils;

// Re-export main types
pub use config::Config;
pub use utils::error::{GatewayError, Result};

pub use core::classifier::{Classification, QueryCategory, classify};
pub use core::providers::{ChatProvider, CompletionStream, HealthStatus, ProviderRegistry};
pub use core::rate_limiter::{RateLimitSnapshot, RateLimitTracker};
pub use core::router::{ContextSource, ServiceManager};
pub use core::types::errors::{ErrorKind, ProviderError};
pub use core::types::requests::{CompletionRequest, ProviderOverride, QueryRequest, RequestMode};
pub use core::types::responses::{Completion, StandardResponse, TokenUsage};
pub use core::usage::{RequestOutcome, UsageLogger, UsageRecord, UsageSink};
pub use core::cache::{CacheKey, CacheStats, ResponseCache};
pub use utils::logging::init_tracing;

/// Current version of the crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
/// Name of the crate
pub const NAME: &str = env!("CARGO_PKG_NAME");
