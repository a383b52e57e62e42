//! Routing configuration
//!
//! Category-to-chain mappings, the degraded response text, and per-request
//! completion defaults. Chains are hand-ordered and tried strictly in the
//! declared order so the tier number in responses stays reproducible.

use super::*;
use serde::{Deserialize, Serialize};

/// Routing configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RoutingConfig {
    /// Chain for time-sensitive queries (current-data support first)
    #[serde(default = "default_time_sensitive_chain")]
    pub time_sensitive: Vec<String>,
    /// Chain for queries about the user's own data (lowest latency first)
    #[serde(default = "default_app_data_chain")]
    pub app_data: Vec<String>,
    /// Chain for general queries (cost/throughput first)
    #[serde(default = "default_general_chain")]
    pub general: Vec<String>,
    /// Text served when every provider in a chain fails or is skipped
    #[serde(default = "default_degraded_message")]
    pub degraded_message: String,
    /// Overall ceiling for one request across the whole chain, in
    /// milliseconds
    #[serde(default = "default_request_deadline_ms")]
    pub request_deadline_ms: u64,
    /// Completion budget handed to providers
    #[serde(default = "default_max_tokens")]
    pub max_tokens: u32,
    /// Sampling temperature handed to providers
    #[serde(default = "default_temperature")]
    pub temperature: f32,
    /// System prompt for plain chat
    #[serde(default = "default_general_system_prompt")]
    pub general_system_prompt: String,
    /// System prompt for the study-assistant mode
    #[serde(default = "default_study_system_prompt")]
    pub study_assistant_system_prompt: String,
}

impl Default for RoutingConfig {
    fn default() -> Self {
        Self {
            time_sensitive: default_time_sensitive_chain(),
            app_data: default_app_data_chain(),
            general: default_general_chain(),
            degraded_message: default_degraded_message(),
            request_deadline_ms: default_request_deadline_ms(),
            max_tokens: default_max_tokens(),
            temperature: default_temperature(),
            general_system_prompt: default_general_system_prompt(),
            study_assistant_system_prompt: default_study_system_prompt(),
        }
    }
}

impl RoutingConfig {
    /// Validate chains against the set of configured provider names
    pub fn validate(&self, known_providers: &[String]) -> Result<(), String> {
        for (category, chain) in [
            ("time_sensitive", &self.time_sensitive),
            ("app_data", &self.app_data),
            ("general", &self.general),
        ] {
            if chain.is_empty() {
                return Err(format!("routing chain for {category} must not be empty"));
            }
            for name in chain {
                if !known_providers.contains(name) {
                    return Err(format!(
                        "routing chain for {category} references unknown provider {name}"
                    ));
                }
            }
        }
        if self.degraded_message.is_empty() {
            return Err("degraded_message must not be empty".to_string());
        }
        if self.request_deadline_ms == 0 {
            return Err("request_deadline_ms must be positive".to_string());
        }
        Ok(())
    }
}

fn default_time_sensitive_chain() -> Vec<String> {
    ["gemini", "openrouter", "mistral", "groq"]
        .map(String::from)
        .to_vec()
}

fn default_app_data_chain() -> Vec<String> {
    ["groq", "cerebras", "mistral"].map(String::from).to_vec()
}

fn default_general_chain() -> Vec<String> {
    ["openrouter", "mistral", "gemini", "cerebras"]
        .map(String::from)
        .to_vec()
}

fn default_degraded_message() -> String {
    "I'm having trouble reaching the AI tutors right now. Please try again in a \
     moment — your question was not lost."
        .to_string()
}

fn default_request_deadline_ms() -> u64 {
    30_000
}

fn default_general_system_prompt() -> String {
    "You are a helpful, concise assistant for students.".to_string()
}

fn default_study_system_prompt() -> String {
    "You are a study assistant. Answer using the student's own study data when \
     provided, and keep explanations exam-focused."
        .to_string()
}
