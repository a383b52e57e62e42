//! Provider registry
//!
//! Startup-time registry keyed by provider name. Providers whose API key is
//! absent are skipped with a warning rather than failing the whole system;
//! the orchestrator treats a missing registry entry as a skipped chain
//! position.

use super::cerebras::CerebrasProvider;
use super::cohere::CohereProvider;
use super::gemini::GeminiProvider;
use super::groq::GroqProvider;
use super::mistral::MistralProvider;
use super::openrouter::OpenRouterProvider;
use super::ChatProvider;
use crate::config::Config;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{info, warn};

/// Registry of constructed provider clients
#[derive(Default)]
pub struct ProviderRegistry {
    providers: HashMap<String, Arc<dyn ChatProvider>>,
}

impl ProviderRegistry {
    /// Create an empty registry
    pub fn new() -> Self {
        Self {
            providers: HashMap::new(),
        }
    }

    /// Construct every configured provider that has an API key.
    pub fn from_config(config: &Config) -> Self {
        let mut registry = Self::new();

        for provider_config in &config.providers {
            let built: Result<Arc<dyn ChatProvider>, _> = match provider_config.name.as_str() {
                "groq" => GroqProvider::new(provider_config)
                    .map(|p| Arc::new(p) as Arc<dyn ChatProvider>),
                "cerebras" => CerebrasProvider::new(provider_config)
                    .map(|p| Arc::new(p) as Arc<dyn ChatProvider>),
                "mistral" => MistralProvider::new(provider_config)
                    .map(|p| Arc::new(p) as Arc<dyn ChatProvider>),
                "gemini" => GeminiProvider::new(provider_config)
                    .map(|p| Arc::new(p) as Arc<dyn ChatProvider>),
                "openrouter" => OpenRouterProvider::new(provider_config)
                    .map(|p| Arc::new(p) as Arc<dyn ChatProvider>),
                "cohere" => CohereProvider::new(provider_config)
                    .map(|p| Arc::new(p) as Arc<dyn ChatProvider>),
                other => {
                    warn!(provider = other, "unknown provider type; skipping");
                    continue;
                }
            };

            match built {
                Ok(provider) => registry.register(provider),
                Err(e) => warn!(
                    provider = %provider_config.name,
                    "provider unavailable: {e}"
                ),
            }
        }

        info!(
            providers = ?registry.names(),
            "provider registry initialized"
        );
        registry
    }

    /// Register a provider under its own name
    pub fn register(&mut self, provider: Arc<dyn ChatProvider>) {
        self.providers
            .insert(provider.name().to_string(), provider);
    }

    /// Get a provider by name
    pub fn get(&self, name: &str) -> Option<Arc<dyn ChatProvider>> {
        self.providers.get(name).cloned()
    }

    /// Whether a provider is registered
    pub fn contains(&self, name: &str) -> bool {
        self.providers.contains_key(name)
    }

    /// Registered provider names, sorted for stable output
    pub fn names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.providers.keys().cloned().collect();
        names.sort();
        names
    }

    /// All registered providers
    pub fn all(&self) -> Vec<Arc<dyn ChatProvider>> {
        self.providers.values().cloned().collect()
    }

    /// Number of registered providers
    pub fn len(&self) -> usize {
        self.providers.len()
    }

    /// Whether the registry is empty
    pub fn is_empty(&self) -> bool {
        self.providers.is_empty()
    }
}

impl std::fmt::Debug for ProviderRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProviderRegistry")
            .field("providers", &self.names())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_registry_skips_providers_without_keys() {
        // No API keys resolved, so nothing can be constructed
        let config = Config::default();
        let registry = ProviderRegistry::from_config(&config);
        assert!(registry.is_empty());
    }

    #[test]
    fn test_registry_builds_provider_with_key() {
        let mut config = Config::default();
        for provider in &mut config.providers {
            if provider.name == "groq" {
                provider.api_key = Some("test-key".to_string());
            }
        }

        let registry = ProviderRegistry::from_config(&config);
        assert_eq!(registry.len(), 1);
        assert!(registry.contains("groq"));
        assert!(!registry.contains("cerebras"));
        let groq = registry.get("groq").unwrap();
        assert_eq!(groq.default_model(), "llama-3.1-8b-instant");
    }
}
