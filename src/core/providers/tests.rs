//! HTTP mapping tests for the provider clients
//!
//! Wiremock-backed tests covering status-code mapping, response-shape
//! validation, transient retry, and SSE streaming.

#[cfg(test)]
mod tests {
    use super::super::gemini::GeminiProvider;
    use super::super::groq::GroqProvider;
    use super::super::mistral::{EMBEDDING_DIM, MistralProvider};
    use super::super::ChatProvider;
    use crate::config::models::{ProviderConfig, QuotaConfig, RetryConfig};
    use crate::core::types::errors::ErrorKind;
    use crate::core::types::requests::CompletionRequest;
    use futures::StreamExt;
    use serde_json::json;
    use std::time::Duration;
    use wiremock::matchers::{header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn provider_config(name: &str, base_url: &str, max_retries: u32) -> ProviderConfig {
        ProviderConfig {
            name: name.to_string(),
            base_url: base_url.to_string(),
            models: vec!["test-model".to_string()],
            default_model: "test-model".to_string(),
            quotas: QuotaConfig::default(),
            timeout_secs: 1,
            max_retries,
            retry: RetryConfig {
                base_delay_ms: 10,
                max_delay_ms: 50,
                jitter: 0.0,
            },
            api_key: Some("test-key".to_string()),
        }
    }

    fn request() -> CompletionRequest {
        CompletionRequest {
            model: "test-model".to_string(),
            system_prompt: Some("You are a helpful assistant.".to_string()),
            prompt: "What is 6 x 7?".to_string(),
            max_tokens: 64,
            temperature: 0.7,
        }
    }

    fn chat_reply(content: &str) -> serde_json::Value {
        json!({
            "id": "chatcmpl-123",
            "object": "chat.completion",
            "model": "test-model",
            "choices": [{
                "index": 0,
                "message": {"role": "assistant", "content": content},
                "finish_reason": "stop"
            }],
            "usage": {"prompt_tokens": 12, "completion_tokens": 3, "total_tokens": 15}
        })
    }

    #[tokio::test]
    async fn test_chat_success() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/chat/completions"))
            .and(header("authorization", "Bearer test-key"))
            .respond_with(ResponseTemplate::new(200).set_body_json(chat_reply("42")))
            .mount(&server)
            .await;

        let provider = GroqProvider::new(&provider_config("groq", &server.uri(), 0)).unwrap();
        let completion = provider.complete(request()).await.unwrap();

        assert_eq!(completion.content, "42");
        assert_eq!(completion.model, "test-model");
        assert_eq!(completion.usage.input_tokens, 12);
        assert_eq!(completion.usage.output_tokens, 3);
    }

    #[tokio::test]
    async fn test_401_maps_to_authentication_without_retry() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(401).set_body_string("invalid key"))
            .mount(&server)
            .await;

        let provider = GroqProvider::new(&provider_config("groq", &server.uri(), 2)).unwrap();
        let error = provider.complete(request()).await.unwrap_err();

        assert_eq!(error.kind(), ErrorKind::Authentication);
        assert_eq!(server.received_requests().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_429_maps_to_rate_limit_without_retry() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(
                ResponseTemplate::new(429).insert_header("retry-after", "30"),
            )
            .mount(&server)
            .await;

        let provider = GroqProvider::new(&provider_config("groq", &server.uri(), 2)).unwrap();
        let error = provider.complete(request()).await.unwrap_err();

        assert_eq!(error.kind(), ErrorKind::RateLimit);
        // Upstream rate limits advance the chain instead of retrying in place
        assert_eq!(server.received_requests().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_empty_choices_maps_to_validation() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "id": "chatcmpl-123",
                "model": "test-model",
                "choices": []
            })))
            .mount(&server)
            .await;

        let provider = GroqProvider::new(&provider_config("groq", &server.uri(), 0)).unwrap();
        let error = provider.complete(request()).await.unwrap_err();
        assert_eq!(error.kind(), ErrorKind::Validation);
    }

    #[tokio::test]
    async fn test_empty_content_maps_to_validation() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_json(chat_reply("")))
            .mount(&server)
            .await;

        let provider = GroqProvider::new(&provider_config("groq", &server.uri(), 0)).unwrap();
        let error = provider.complete(request()).await.unwrap_err();
        assert_eq!(error.kind(), ErrorKind::Validation);
    }

    #[tokio::test]
    async fn test_500_maps_to_unknown() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(500).set_body_string("internal"))
            .mount(&server)
            .await;

        let provider = GroqProvider::new(&provider_config("groq", &server.uri(), 0)).unwrap();
        let error = provider.complete(request()).await.unwrap_err();
        assert_eq!(error.kind(), ErrorKind::Unknown);
    }

    #[tokio::test]
    async fn test_timeout_retries_then_maps_to_timeout() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(chat_reply("slow"))
                    .set_delay(Duration::from_millis(1_500)),
            )
            .mount(&server)
            .await;

        let provider = GroqProvider::new(&provider_config("groq", &server.uri(), 1)).unwrap();
        let error = provider.complete(request()).await.unwrap_err();

        assert_eq!(error.kind(), ErrorKind::Timeout);
        assert_eq!(
            server.received_requests().await.unwrap().len(),
            2,
            "one transient retry expected"
        );
    }

    #[tokio::test]
    async fn test_connection_refused_maps_to_network() {
        // Nothing listens on this port
        let provider =
            GroqProvider::new(&provider_config("groq", "http://127.0.0.1:9", 0)).unwrap();
        let error = provider.complete(request()).await.unwrap_err();
        assert_eq!(error.kind(), ErrorKind::Network);
    }

    #[tokio::test]
    async fn test_missing_api_key_fails_construction() {
        let mut config = provider_config("groq", "http://127.0.0.1:9", 0);
        config.api_key = None;
        let result = GroqProvider::new(&config);
        assert!(result.is_err());
        assert!(result.unwrap_err().to_string().contains("API key"));
    }

    #[tokio::test]
    async fn test_streaming_yields_deltas_until_done() {
        let sse_body = concat!(
            "data: {\"choices\":[{\"delta\":{\"role\":\"assistant\"}}]}\n\n",
            "data: {\"choices\":[{\"delta\":{\"content\":\"The answer\"}}]}\n\n",
            "data: {\"choices\":[{\"delta\":{\"content\":\" is 42.\"}}]}\n\n",
            "data: [DONE]\n\n",
        );

        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(
                ResponseTemplate::new(200).set_body_raw(sse_body, "text/event-stream"),
            )
            .mount(&server)
            .await;

        let provider = GroqProvider::new(&provider_config("groq", &server.uri(), 0)).unwrap();
        let mut stream = provider.complete_stream(request()).await.unwrap();

        let mut deltas = Vec::new();
        while let Some(item) = stream.next().await {
            deltas.push(item.unwrap());
        }
        assert_eq!(deltas, vec!["The answer", " is 42."]);
    }

    #[tokio::test]
    async fn test_stream_abandoned_mid_flight() {
        let sse_body = concat!(
            "data: {\"choices\":[{\"delta\":{\"content\":\"first\"}}]}\n\n",
            "data: {\"choices\":[{\"delta\":{\"content\":\"second\"}}]}\n\n",
            "data: [DONE]\n\n",
        );

        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(
                ResponseTemplate::new(200).set_body_raw(sse_body, "text/event-stream"),
            )
            .mount(&server)
            .await;

        let provider = GroqProvider::new(&provider_config("groq", &server.uri(), 0)).unwrap();
        let mut stream = provider.complete_stream(request()).await.unwrap();

        let first = stream.next().await.unwrap().unwrap();
        assert_eq!(first, "first");
        // Dropping mid-flight must not hang or leak the connection
        drop(stream);
    }

    #[tokio::test]
    async fn test_gemini_wire_format() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/models/test-model:generateContent"))
            .and(header("x-goog-api-key", "test-key"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "candidates": [{
                    "content": {"parts": [{"text": "Paris"}], "role": "model"},
                    "finishReason": "STOP"
                }],
                "usageMetadata": {"promptTokenCount": 8, "candidatesTokenCount": 1}
            })))
            .mount(&server)
            .await;

        let provider = GeminiProvider::new(&provider_config("gemini", &server.uri(), 0)).unwrap();
        let completion = provider.complete(request()).await.unwrap();

        assert_eq!(completion.content, "Paris");
        assert_eq!(completion.usage.input_tokens, 8);
        assert_eq!(completion.usage.output_tokens, 1);
    }

    #[tokio::test]
    async fn test_gemini_empty_candidates_maps_to_validation() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"candidates": []})))
            .mount(&server)
            .await;

        let provider = GeminiProvider::new(&provider_config("gemini", &server.uri(), 0)).unwrap();
        let error = provider.complete(request()).await.unwrap_err();
        assert_eq!(error.kind(), ErrorKind::Validation);
    }

    #[tokio::test]
    async fn test_mistral_embeddings_validate_dimensionality() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/embeddings"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "data": [{"embedding": [0.1, 0.2, 0.3], "index": 0}]
            })))
            .mount(&server)
            .await;

        let provider =
            MistralProvider::new(&provider_config("mistral", &server.uri(), 0)).unwrap();
        let error = provider
            .embed(&["hello".to_string()])
            .await
            .unwrap_err();

        assert_eq!(error.kind(), ErrorKind::Validation);
        assert!(error.to_string().contains("dimensionality"));
    }

    #[tokio::test]
    async fn test_mistral_embeddings_success() {
        let vector: Vec<f32> = vec![0.25; EMBEDDING_DIM];
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/embeddings"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "data": [{"embedding": vector, "index": 0}]
            })))
            .mount(&server)
            .await;

        let provider =
            MistralProvider::new(&provider_config("mistral", &server.uri(), 0)).unwrap();
        let vectors = provider.embed(&["hello".to_string()]).await.unwrap();

        assert_eq!(vectors.len(), 1);
        assert_eq!(vectors[0].len(), EMBEDDING_DIM);
    }
}
