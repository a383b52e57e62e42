//! Usage logging
//!
//! One [`UsageRecord`] per completed (or terminally failed) request,
//! buffered through a bounded channel and flushed to the durable
//! [`UsageSink`] in batches. Recording never blocks or fails the
//! originating request: channel overflow drops the record with a warning,
//! and sink failures are logged and swallowed.

mod logger;


pub use logger::UsageLogger;

use crate::core::classifier::QueryCategory;
use crate::core::types::errors::ErrorKind;
use crate::core::types::responses::TokenUsage;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// How a request ultimately ended
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RequestOutcome {
    /// A provider produced a completion
    Success,
    /// Served from the response cache
    CacheHit,
    /// Every provider in the chain failed or was skipped
    Exhausted,
    /// The overall request deadline expired mid-chain
    DeadlineExceeded,
}

/// One failed or skipped chain position, kept for post-hoc outage diagnosis
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AttemptFailure {
    /// Provider at this chain position
    pub provider: String,
    /// Error taxonomy kind
    pub kind: ErrorKind,
    /// Human-readable detail (error display, or skip reason)
    pub detail: String,
}

/// Append-only usage record, one per request
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UsageRecord {
    /// Id of the originating request
    pub request_id: Uuid,
    /// Requesting user
    pub user_id: String,
    /// Conversation, when supplied
    #[serde(skip_serializing_if = "Option::is_none")]
    pub conversation_id: Option<String>,
    /// Provider that served the request, when any did
    #[serde(skip_serializing_if = "Option::is_none")]
    pub provider: Option<String>,
    /// Model that served the request, when any did
    #[serde(skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,
    /// Query category
    pub category: QueryCategory,
    /// 1-based chain position that served the request; 0 when none did
    pub tier: u32,
    /// Terminal outcome
    pub outcome: RequestOutcome,
    /// Failed or skipped chain positions before the terminal outcome
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub attempts: Vec<AttemptFailure>,
    /// Token accounting
    #[serde(default)]
    pub usage: TokenUsage,
    /// Whether the response came from the cache
    pub cached: bool,
    /// End-to-end latency in milliseconds
    pub latency_ms: u64,
    /// Record creation time
    pub timestamp: DateTime<Utc>,
}

/// Durable destination for usage records. The surrounding application wires
/// this to its persistence store; the gateway only needs append.
#[async_trait]
pub trait UsageSink: Send + Sync {
    /// Persist a batch of records
    async fn append(&self, records: Vec<UsageRecord>) -> anyhow::Result<()>;
}
