//! Routing orchestrator
//!
//! Per-call state machine over the injected components. Providers within a
//! chain are always tried in the declared order, so the tier number in
//! responses and usage records is reproducible. Rate-window state is
//! mutated here and nowhere else, which keeps quota accounting in lockstep
//! with actual attempts.

use super::context::ContextSource;
use crate::config::models::{CacheConfig, RoutingConfig};
use crate::config::Config;
use crate::core::cache::{CacheKey, CacheStats, ResponseCache};
use crate::core::classifier::{classify, QueryCategory};
use crate::core::providers::{HealthStatus, ProviderRegistry};
use crate::core::rate_limiter::{RateLimitSnapshot, RateLimitTracker};
use crate::core::types::errors::ErrorKind;
use crate::core::types::requests::{CompletionRequest, QueryRequest, RequestMode};
use crate::core::types::responses::{StandardResponse, TokenUsage};
use crate::core::usage::{AttemptFailure, RequestOutcome, UsageLogger, UsageRecord};
use crate::utils::error::{GatewayError, Result};
use chrono::Utc;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{debug, info, warn};

/// Composes the routing pipeline. One instance serves any number of
/// concurrent requests; all shared mutable state lives in the rate tracker
/// and cache, which handle their own locking.
pub struct ServiceManager {
    registry: ProviderRegistry,
    rate_tracker: RateLimitTracker,
    cache: ResponseCache,
    usage: UsageLogger,
    context: Option<Arc<dyn ContextSource>>,
    routing: RoutingConfig,
    cache_config: CacheConfig,
}

impl ServiceManager {
    /// Build the orchestrator from configuration plus the injected
    /// registry and usage logger.
    pub fn new(config: &Config, registry: ProviderRegistry, usage: UsageLogger) -> Self {
        Self {
            registry,
            rate_tracker: RateLimitTracker::new(&config.providers),
            cache: ResponseCache::new(&config.cache),
            usage,
            context: None,
            routing: config.routing.clone(),
            cache_config: config.cache.clone(),
        }
    }

    /// Wire the student-context collaborator
    pub fn with_context(mut self, context: Arc<dyn ContextSource>) -> Self {
        self.context = Some(context);
        self
    }

    /// Replace the rate tracker (used by tests to shrink quota windows)
    pub fn with_rate_tracker(mut self, tracker: RateLimitTracker) -> Self {
        self.rate_tracker = tracker;
        self
    }

    /// Sole entry point: process one query and always produce a usable
    /// response. The only error surfaced to callers is a fail-fast
    /// validation error for an invalid explicit override.
    pub async fn process_query(&self, request: QueryRequest) -> Result<StandardResponse> {
        let started = Instant::now();

        // An invalid override fails fast rather than silently falling back.
        if let Some(ov) = &request.provider_override {
            let Some(provider) = self.registry.get(&ov.provider) else {
                return Err(GatewayError::validation(
                    "provider",
                    format!("unknown provider: {}", ov.provider),
                ));
            };
            if let Some(model) = &ov.model {
                if !provider.supports_model(model) {
                    return Err(GatewayError::validation(
                        "model",
                        format!("model {} is not supported by {}", model, ov.provider),
                    ));
                }
            }
        }

        let classification = classify(&request.message);
        let category = classification.category;
        debug!(
            request_id = %request.request_id,
            category = category.as_str(),
            confidence = classification.confidence,
            "query classified"
        );

        let key = CacheKey::derive(
            &request.user_id,
            category,
            &request.message,
            request.mode,
            request.include_context_data,
        );

        if let Some(mut hit) = self.cache.get(&key) {
            debug!(request_id = %request.request_id, key = %key, "cache hit");
            hit.request_id = request.request_id;
            hit.cached = true;
            hit.latency_ms = started.elapsed().as_millis() as u64;
            self.usage.record(self.build_record(
                &request,
                category,
                &hit,
                RequestOutcome::CacheHit,
                Vec::new(),
            ));
            return Ok(hit);
        }

        let chain = self.build_chain(&request, category);
        let system_prompt = self.build_system_prompt(&request).await;
        let deadline = started + Duration::from_millis(self.routing.request_deadline_ms);

        let mut attempts: Vec<AttemptFailure> = Vec::new();
        let mut deadline_hit = false;

        for (index, provider_name) in chain.iter().enumerate() {
            let tier = index as u32 + 1;

            let Some(provider) = self.registry.get(provider_name) else {
                attempts.push(AttemptFailure {
                    provider: provider_name.clone(),
                    kind: ErrorKind::Authentication,
                    detail: "provider not registered (missing API key)".to_string(),
                });
                continue;
            };

            if !self.rate_tracker.try_reserve(provider_name) {
                debug!(
                    request_id = %request.request_id,
                    provider = %provider_name,
                    tier,
                    "quota exhausted; skipping"
                );
                attempts.push(AttemptFailure {
                    provider: provider_name.clone(),
                    kind: ErrorKind::RateLimit,
                    detail: "local quota window full; skipped".to_string(),
                });
                continue;
            }

            let remaining = deadline.saturating_duration_since(Instant::now());
            if remaining.is_zero() {
                self.rate_tracker.release(provider_name);
                deadline_hit = true;
                break;
            }

            let model = self.model_for(&request, tier, provider.default_model());
            let completion_request = CompletionRequest {
                model,
                system_prompt: system_prompt.clone(),
                prompt: request.message.clone(),
                max_tokens: self.routing.max_tokens,
                temperature: self.routing.temperature,
            };

            match tokio::time::timeout(remaining, provider.complete(completion_request)).await {
                Ok(Ok(completion)) => {
                    let response = StandardResponse {
                        request_id: request.request_id,
                        content: completion.content,
                        provider: Some(provider_name.clone()),
                        model: Some(completion.model),
                        category,
                        tier,
                        cached: false,
                        fallback_used: tier > 1,
                        degraded: false,
                        usage: completion.usage,
                        latency_ms: started.elapsed().as_millis() as u64,
                        rate_limit_warning: self.rate_tracker.approaching_limit(provider_name),
                    };

                    self.cache.put(key, response.clone(), self.ttl_for(category));
                    self.usage.record(self.build_record(
                        &request,
                        category,
                        &response,
                        RequestOutcome::Success,
                        attempts,
                    ));
                    info!(
                        request_id = %request.request_id,
                        provider = %provider_name,
                        tier,
                        latency_ms = response.latency_ms,
                        "request served"
                    );
                    return Ok(response);
                }
                Ok(Err(error)) => {
                    // Transient kinds produced no billable call; the
                    // reservation rolls back. Auth/validation keep it
                    // consumed, and only skip the provider for this request.
                    if error.is_transient() {
                        self.rate_tracker.release(provider_name);
                    }
                    warn!(
                        request_id = %request.request_id,
                        provider = %provider_name,
                        tier,
                        kind = error.kind().as_str(),
                        "provider attempt failed: {error}"
                    );
                    attempts.push(AttemptFailure {
                        provider: provider_name.clone(),
                        kind: error.kind(),
                        detail: error.to_string(),
                    });
                }
                Err(_) => {
                    // Overall deadline expired mid-call. The dropped future
                    // aborts the connection; cancellation is terminal, not
                    // a reason to try the next tier.
                    self.rate_tracker.release(provider_name);
                    attempts.push(AttemptFailure {
                        provider: provider_name.clone(),
                        kind: ErrorKind::Timeout,
                        detail: "overall request deadline expired".to_string(),
                    });
                    deadline_hit = true;
                    break;
                }
            }
        }

        let outcome = if deadline_hit {
            RequestOutcome::DeadlineExceeded
        } else {
            RequestOutcome::Exhausted
        };
        warn!(
            request_id = %request.request_id,
            category = category.as_str(),
            attempted = attempts.len(),
            outcome = ?outcome,
            "no provider produced a response; serving degraded message"
        );

        let response = StandardResponse {
            request_id: request.request_id,
            content: self.routing.degraded_message.clone(),
            provider: None,
            model: None,
            category,
            tier: 0,
            cached: false,
            fallback_used: true,
            degraded: true,
            usage: TokenUsage::default(),
            latency_ms: started.elapsed().as_millis() as u64,
            rate_limit_warning: false,
        };
        self.usage
            .record(self.build_record(&request, category, &response, outcome, attempts));
        Ok(response)
    }

    /// Probe every registered provider concurrently
    pub async fn health_check_all(&self) -> HashMap<String, HealthStatus> {
        let providers = self.registry.all();
        let probes = providers.iter().map(|provider| async {
            (provider.name().to_string(), provider.health_check().await)
        });
        futures::future::join_all(probes).await.into_iter().collect()
    }

    /// Cache counter snapshot
    pub fn cache_stats(&self) -> CacheStats {
        self.cache.stats()
    }

    /// Quota window snapshot for every provider
    pub fn rate_snapshot(&self) -> Vec<RateLimitSnapshot> {
        self.rate_tracker.snapshot()
    }

    /// Flush pending usage records and stop the logger
    pub async fn shutdown(&self) {
        self.usage.shutdown().await;
    }

    /// Chain = override provider first (when present), then the category
    /// chain, deduplicated, in declared order.
    fn build_chain(&self, request: &QueryRequest, category: QueryCategory) -> Vec<String> {
        let mut chain: Vec<String> = Vec::new();
        if let Some(ov) = &request.provider_override {
            chain.push(ov.provider.clone());
        }
        for name in self.chain_for(category) {
            if !chain.contains(name) {
                chain.push(name.clone());
            }
        }
        chain
    }

    fn chain_for(&self, category: QueryCategory) -> &[String] {
        match category {
            QueryCategory::TimeSensitive => &self.routing.time_sensitive,
            QueryCategory::AppData => &self.routing.app_data,
            QueryCategory::General => &self.routing.general,
        }
    }

    fn ttl_for(&self, category: QueryCategory) -> Duration {
        let secs = match category {
            QueryCategory::TimeSensitive => self.cache_config.time_sensitive_ttl_secs,
            QueryCategory::AppData => self.cache_config.app_data_ttl_secs,
            QueryCategory::General => self.cache_config.general_ttl_secs,
        };
        Duration::from_secs(secs)
    }

    /// The override model applies only at chain position 1; fallback tiers
    /// use their own provider's default.
    fn model_for(&self, request: &QueryRequest, tier: u32, default_model: &str) -> String {
        if tier == 1 {
            if let Some(model) = request
                .provider_override
                .as_ref()
                .and_then(|ov| ov.model.clone())
            {
                return model;
            }
        }
        default_model.to_string()
    }

    async fn build_system_prompt(&self, request: &QueryRequest) -> Option<String> {
        let base = match request.mode {
            RequestMode::General => &self.routing.general_system_prompt,
            RequestMode::StudyAssistant => &self.routing.study_assistant_system_prompt,
        };

        if !request.include_context_data {
            return Some(base.clone());
        }

        let Some(source) = &self.context else {
            return Some(base.clone());
        };

        match source.context_summary(&request.user_id).await {
            Ok(summary) if !summary.is_empty() => {
                Some(format!("{base}\n\nStudent context:\n{summary}"))
            }
            Ok(_) => Some(base.clone()),
            Err(e) => {
                warn!(
                    request_id = %request.request_id,
                    "context lookup failed; continuing without context: {e}"
                );
                Some(base.clone())
            }
        }
    }

    fn build_record(
        &self,
        request: &QueryRequest,
        category: QueryCategory,
        response: &StandardResponse,
        outcome: RequestOutcome,
        attempts: Vec<AttemptFailure>,
    ) -> UsageRecord {
        UsageRecord {
            request_id: request.request_id,
            user_id: request.user_id.clone(),
            conversation_id: request.conversation_id.clone(),
            provider: response.provider.clone(),
            model: response.model.clone(),
            category,
            tier: response.tier,
            outcome,
            attempts,
            usage: response.usage,
            cached: response.cached,
            latency_ms: response.latency_ms,
            timestamp: Utc::now(),
        }
    }
}
