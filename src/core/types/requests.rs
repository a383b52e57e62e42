//! Request types
//!
//! Defines the caller-facing [`QueryRequest`] and the internal
//! [`CompletionRequest`] handed to provider clients. A `QueryRequest` never
//! touches a provider's wire format; translation happens once inside each
//! client.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Conversation mode supplied by the caller.
///
/// Selects the system prompt and participates in the cache key; it does not
/// influence provider selection (the classifier does that).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RequestMode {
    /// Plain chat
    #[default]
    General,
    /// Study-assistant persona with access to the student's context
    StudyAssistant,
}

impl RequestMode {
    /// String tag used in cache keys and usage records
    pub fn as_str(&self) -> &'static str {
        match self {
            RequestMode::General => "general",
            RequestMode::StudyAssistant => "study_assistant",
        }
    }
}

/// Explicit provider/model override.
///
/// A valid override becomes chain position 1 with the category chain as the
/// fallback tail; an invalid one fails the request fast with a validation
/// error.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProviderOverride {
    /// Provider name, e.g. `"groq"`
    pub provider: String,
    /// Model identifier; the provider's default model when absent
    #[serde(skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,
}

/// An inbound query. Immutable once constructed.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QueryRequest {
    /// Unique id attached to log events and usage records
    pub request_id: Uuid,

    /// Identifier of the requesting user
    pub user_id: String,

    /// The message text
    pub message: String,

    /// Conversation this message belongs to
    #[serde(skip_serializing_if = "Option::is_none")]
    pub conversation_id: Option<String>,

    /// Conversation mode
    #[serde(default)]
    pub mode: RequestMode,

    /// Explicit provider/model override, bypassing the classifier's chain
    #[serde(skip_serializing_if = "Option::is_none")]
    pub provider_override: Option<ProviderOverride>,

    /// Splice the student's context summary into the prompt
    #[serde(default)]
    pub include_context_data: bool,
}

impl QueryRequest {
    /// Create a request with a fresh request id
    pub fn new(user_id: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            request_id: Uuid::new_v4(),
            user_id: user_id.into(),
            message: message.into(),
            conversation_id: None,
            mode: RequestMode::default(),
            provider_override: None,
            include_context_data: false,
        }
    }

    /// Attach a conversation id
    pub fn with_conversation(mut self, conversation_id: impl Into<String>) -> Self {
        self.conversation_id = Some(conversation_id.into());
        self
    }

    /// Set the conversation mode
    pub fn with_mode(mut self, mode: RequestMode) -> Self {
        self.mode = mode;
        self
    }

    /// Force a specific provider (and optionally model)
    pub fn with_override(mut self, provider: impl Into<String>, model: Option<String>) -> Self {
        self.provider_override = Some(ProviderOverride {
            provider: provider.into(),
            model,
        });
        self
    }

    /// Request the student-context splice
    pub fn with_context_data(mut self) -> Self {
        self.include_context_data = true;
        self
    }
}

/// Provider-facing completion request, built by the orchestrator.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CompletionRequest {
    /// Model identifier, already validated against the provider
    pub model: String,

    /// System prompt (mode prompt plus optional context splice)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub system_prompt: Option<String>,

    /// The user prompt
    pub prompt: String,

    /// Completion budget in tokens
    pub max_tokens: u32,

    /// Sampling temperature
    pub temperature: f32,
}
