//! End-to-end orchestrator tests
//!
//! Exercises the full routing pipeline against scripted mock providers:
//! deterministic chain order, short-circuiting, reservation accounting,
//! cache round-trips, and graceful exhaustion.

mod common;

use common::{ok, CapturingSink, MockProvider, test_config};
use std::sync::Arc;
use std::time::Duration;
use study_ai_gateway::core::usage::RequestOutcome;
use study_ai_gateway::{
    ErrorKind, ProviderError, ProviderRegistry, QueryRequest, RateLimitTracker, ServiceManager,
    UsageLogger,
};

// A message the classifier routes to the app-data chain [groq, cerebras, mistral]
const APP_DATA_MESSAGE: &str = "how many topics have I completed in my plan?";
// A message the classifier routes to the general chain
const GENERAL_MESSAGE: &str = "explain the photoelectric effect";

struct Harness {
    manager: ServiceManager,
    sink: Arc<CapturingSink>,
}

fn harness(providers: Vec<Arc<MockProvider>>) -> Harness {
    harness_with_tracker(providers, None)
}

fn harness_with_tracker(
    providers: Vec<Arc<MockProvider>>,
    tracker: Option<RateLimitTracker>,
) -> Harness {
    let config = test_config();
    let mut registry = ProviderRegistry::new();
    for provider in providers {
        registry.register(provider);
    }
    let sink = Arc::new(CapturingSink::default());
    let usage = UsageLogger::new(sink.clone(), &config.usage);
    let mut manager = ServiceManager::new(&config, registry, usage);
    if let Some(tracker) = tracker {
        manager = manager.with_rate_tracker(tracker);
    }
    Harness { manager, sink }
}

#[tokio::test]
async fn test_chain_order_is_deterministic() {
    let groq = MockProvider::new("groq", vec![]);
    let cerebras = MockProvider::new("cerebras", vec![]);
    let mistral = MockProvider::new("mistral", vec![]);
    let h = harness(vec![groq.clone(), cerebras.clone(), mistral.clone()]);

    for i in 0..5 {
        let request = QueryRequest::new(format!("user-{i}"), APP_DATA_MESSAGE);
        let response = h.manager.process_query(request).await.unwrap();
        assert_eq!(response.provider.as_deref(), Some("groq"));
        assert_eq!(response.tier, 1);
    }

    assert_eq!(groq.calls(), 5);
    assert_eq!(cerebras.calls(), 0);
}

#[tokio::test]
async fn test_first_success_short_circuits_chain() {
    let groq = MockProvider::new("groq", vec![ok("fast answer")]);
    let cerebras = MockProvider::new("cerebras", vec![]);
    let mistral = MockProvider::new("mistral", vec![]);
    let h = harness(vec![groq.clone(), cerebras.clone(), mistral.clone()]);

    let response = h
        .manager
        .process_query(QueryRequest::new("u1", APP_DATA_MESSAGE))
        .await
        .unwrap();

    assert_eq!(response.content, "fast answer");
    assert_eq!(cerebras.calls(), 0);
    assert_eq!(mistral.calls(), 0);
}

#[tokio::test]
async fn test_auth_error_consumes_exactly_one_reservation() {
    let groq = MockProvider::new(
        "groq",
        vec![Err(ProviderError::authentication("groq", "revoked key"))],
    );
    let cerebras = MockProvider::new("cerebras", vec![ok("fallback answer")]);
    let h = harness(vec![groq.clone(), cerebras.clone()]);

    let response = h
        .manager
        .process_query(QueryRequest::new("u1", APP_DATA_MESSAGE))
        .await
        .unwrap();

    assert_eq!(response.provider.as_deref(), Some("cerebras"));
    assert_eq!(response.tier, 2);

    // The auth failure burned one upstream request, so the reservation
    // stays consumed, once.
    let snapshot = h.manager.rate_snapshot();
    let groq_window = snapshot.iter().find(|s| s.provider == "groq").unwrap();
    assert_eq!(groq_window.minute_used, 1);
}

#[tokio::test]
async fn test_transient_failure_releases_reservation() {
    let groq = MockProvider::new(
        "groq",
        vec![Err(ProviderError::rate_limit("groq", None))],
    );
    let cerebras = MockProvider::new("cerebras", vec![ok("fallback answer")]);
    let h = harness(vec![groq.clone(), cerebras.clone()]);

    h.manager
        .process_query(QueryRequest::new("u1", APP_DATA_MESSAGE))
        .await
        .unwrap();

    let snapshot = h.manager.rate_snapshot();
    let groq_window = snapshot.iter().find(|s| s.provider == "groq").unwrap();
    assert_eq!(groq_window.minute_used, 0, "429 must roll the reservation back");
}

#[tokio::test]
async fn test_cache_roundtrip_issues_zero_provider_calls() {
    let openrouter = MockProvider::new("openrouter", vec![ok("cached answer")]);
    let h = harness(vec![openrouter.clone()]);

    let first = h
        .manager
        .process_query(QueryRequest::new("u1", GENERAL_MESSAGE))
        .await
        .unwrap();
    assert!(!first.cached);
    assert_eq!(openrouter.calls(), 1);

    let second = h
        .manager
        .process_query(QueryRequest::new("u1", GENERAL_MESSAGE))
        .await
        .unwrap();
    assert!(second.cached);
    assert_eq!(second.content, "cached answer");
    assert_eq!(openrouter.calls(), 1, "cache hit must not touch providers");
}

#[tokio::test]
async fn test_cache_is_per_user() {
    let openrouter = MockProvider::new("openrouter", vec![]);
    let h = harness(vec![openrouter.clone()]);

    h.manager
        .process_query(QueryRequest::new("u1", GENERAL_MESSAGE))
        .await
        .unwrap();
    let other_user = h
        .manager
        .process_query(QueryRequest::new("u2", GENERAL_MESSAGE))
        .await
        .unwrap();

    assert!(!other_user.cached);
    assert_eq!(openrouter.calls(), 2);
}

#[tokio::test]
async fn test_quota_exhaustion_skips_to_next_tier() {
    let mut config = test_config();
    for provider in &mut config.providers {
        if provider.name == "groq" {
            provider.quotas.per_minute = 1;
        }
    }
    let tracker = RateLimitTracker::new(&config.providers);

    let groq = MockProvider::new("groq", vec![]);
    let cerebras = MockProvider::new("cerebras", vec![]);
    let h = harness_with_tracker(vec![groq.clone(), cerebras.clone()], Some(tracker));

    // Distinct messages so the cache does not satisfy the second request
    let first = h
        .manager
        .process_query(QueryRequest::new("u1", "how many topics have I completed?"))
        .await
        .unwrap();
    assert_eq!(first.provider.as_deref(), Some("groq"));

    let second = h
        .manager
        .process_query(QueryRequest::new("u1", "how many tests did I attempt?"))
        .await
        .unwrap();
    assert_eq!(second.provider.as_deref(), Some("cerebras"));
    assert_eq!(second.tier, 2);
    assert!(second.fallback_used);
    assert_eq!(groq.calls(), 1, "groq must be skipped, not called");
}

#[tokio::test]
async fn test_exhaustion_returns_degraded_response() {
    let groq = MockProvider::new(
        "groq",
        vec![Err(ProviderError::timeout("groq", 5_000))],
    );
    let cerebras = MockProvider::new(
        "cerebras",
        vec![Err(ProviderError::network("cerebras", "connection reset"))],
    );
    let mistral = MockProvider::new(
        "mistral",
        vec![Err(ProviderError::unknown("mistral", "HTTP 500"))],
    );
    let h = harness(vec![groq, cerebras, mistral]);

    let response = h
        .manager
        .process_query(QueryRequest::new("u1", APP_DATA_MESSAGE))
        .await
        .unwrap();

    assert!(response.degraded);
    assert!(!response.content.is_empty(), "degraded content must be usable");
    assert_eq!(response.provider, None);
    assert_eq!(response.tier, 0);

    h.manager.shutdown().await;
    let records = h.sink.records();
    let exhausted: Vec<_> = records
        .iter()
        .filter(|r| r.outcome == RequestOutcome::Exhausted)
        .collect();
    assert_eq!(exhausted.len(), 1, "exactly one exhaustion record");
    assert_eq!(exhausted[0].attempts.len(), 3);
    assert_eq!(exhausted[0].attempts[0].kind, ErrorKind::Timeout);
    assert_eq!(exhausted[0].attempts[1].kind, ErrorKind::Network);
    assert_eq!(exhausted[0].attempts[2].kind, ErrorKind::Unknown);
}

#[tokio::test]
async fn test_rate_limited_groq_falls_back_to_cerebras() {
    // The concrete scenario: app-data chain [groq, cerebras, mistral],
    // groq rate-limited, cerebras succeeds.
    let groq = MockProvider::new("groq", vec![Err(ProviderError::rate_limit("groq", None))]);
    let cerebras = MockProvider::new("cerebras", vec![ok("42 topics completed")]);
    let mistral = MockProvider::new("mistral", vec![]);
    let h = harness(vec![groq.clone(), cerebras.clone(), mistral.clone()]);

    let request = QueryRequest::new("student-7", APP_DATA_MESSAGE);
    let response = h.manager.process_query(request).await.unwrap();

    assert_eq!(response.provider.as_deref(), Some("cerebras"));
    assert_eq!(response.tier, 2);
    assert!(response.fallback_used);
    assert!(!response.cached);
    assert_eq!(response.content, "42 topics completed");
    assert_eq!(mistral.calls(), 0);

    // Exactly one cache write, keyed to the original request: the replay
    // hits it and invokes nobody.
    let replay = h
        .manager
        .process_query(QueryRequest::new("student-7", APP_DATA_MESSAGE))
        .await
        .unwrap();
    assert!(replay.cached);
    assert_eq!(replay.content, "42 topics completed");
    assert_eq!(groq.calls(), 1);
    assert_eq!(cerebras.calls(), 1);
}

#[tokio::test]
async fn test_cached_replay_is_fast_and_flagged() {
    let openrouter = MockProvider::new("openrouter", vec![ok("general knowledge")]);
    let h = harness(vec![openrouter.clone()]);

    h.manager
        .process_query(QueryRequest::new("u1", GENERAL_MESSAGE))
        .await
        .unwrap();

    let replay = h
        .manager
        .process_query(QueryRequest::new("u1", GENERAL_MESSAGE))
        .await
        .unwrap();

    assert!(replay.cached);
    assert!(replay.latency_ms < 50, "cache hits should be near-instant");
    assert_eq!(openrouter.calls(), 1);

    h.manager.shutdown().await;
    let records = h.sink.records();
    assert!(records
        .iter()
        .any(|r| r.outcome == RequestOutcome::CacheHit));
}

#[tokio::test]
async fn test_usage_records_capture_success_metadata() {
    let groq = MockProvider::new("groq", vec![ok("answer")]);
    let h = harness(vec![groq]);

    h.manager
        .process_query(QueryRequest::new("u1", APP_DATA_MESSAGE).with_conversation("c-1"))
        .await
        .unwrap();
    h.manager.shutdown().await;

    let records = h.sink.records();
    assert_eq!(records.len(), 1);
    let record = &records[0];
    assert_eq!(record.outcome, RequestOutcome::Success);
    assert_eq!(record.provider.as_deref(), Some("groq"));
    assert_eq!(record.tier, 1);
    assert_eq!(record.user_id, "u1");
    assert_eq!(record.conversation_id.as_deref(), Some("c-1"));
    assert_eq!(record.usage.input_tokens, 10);
}

#[tokio::test]
async fn test_minute_window_rollover_restores_service() {
    let mut config = test_config();
    for provider in &mut config.providers {
        provider.quotas.per_minute = 1;
    }
    let tracker =
        RateLimitTracker::with_minute_window(&config.providers, Duration::from_millis(50));

    let groq = MockProvider::new("groq", vec![]);
    let h = harness_with_tracker(vec![groq.clone()], Some(tracker));

    let first = h
        .manager
        .process_query(QueryRequest::new("u1", "how many topics have I completed?"))
        .await
        .unwrap();
    assert!(!first.degraded);

    // Window full and no other provider registered: degraded
    let second = h
        .manager
        .process_query(QueryRequest::new("u1", "how many tests did I attempt?"))
        .await
        .unwrap();
    assert!(second.degraded);

    // After rollover the same provider serves again
    tokio::time::sleep(Duration::from_millis(80)).await;
    let third = h
        .manager
        .process_query(QueryRequest::new("u1", "how many notes did I revise?"))
        .await
        .unwrap();
    assert!(!third.degraded);
    assert_eq!(third.provider.as_deref(), Some("groq"));
}
