//! Configuration loading
//!
//! API keys come from the process environment (optionally via a `.env`
//! file), never from config files, and are never logged.

use super::Config;
use std::env;
use tracing::warn;

/// Environment variable holding the API key for a provider
pub fn env_key_var(provider: &str) -> Option<&'static str> {
    match provider.to_lowercase().as_str() {
        "groq" => Some("GROQ_API_KEY"),
        "cerebras" => Some("CEREBRAS_API_KEY"),
        "mistral" => Some("MISTRAL_API_KEY"),
        "gemini" | "google" => Some("GEMINI_API_KEY"),
        "openrouter" => Some("OPENROUTER_API_KEY"),
        "cohere" => Some("COHERE_API_KEY"),
        _ => None,
    }
}

impl Config {
    /// Resolve each provider's API key from the environment.
    ///
    /// A missing key does not fail loading: the provider is left without a
    /// key and the registry will skip it at startup, leaving the rest of
    /// the system usable.
    pub fn resolve_api_keys(&mut self) {
        dotenvy::dotenv().ok();

        for provider in &mut self.providers {
            let Some(var) = env_key_var(&provider.name) else {
                warn!(provider = %provider.name, "no known API key variable for provider");
                continue;
            };
            match env::var(var) {
                Ok(key) if !key.is_empty() => provider.api_key = Some(key),
                _ => {
                    warn!(
                        provider = %provider.name,
                        variable = var,
                        "API key not set; provider will be unavailable"
                    );
                }
            }
        }
    }
}
