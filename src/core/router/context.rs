//! Student-context collaborator
//!
//! When a request sets `include_context_data`, the orchestrator asks this
//! collaborator for a pre-built textual summary of the user's study state
//! and splices it into the prompt as an opaque string. Context failures
//! degrade to no-context; they never fail the request.

use async_trait::async_trait;

/// Source of per-user context summaries, implemented by the surrounding
/// application
#[async_trait]
pub trait ContextSource: Send + Sync {
    /// Build a textual context summary for the user
    async fn context_summary(&self, user_id: &str) -> anyhow::Result<String>;
}
