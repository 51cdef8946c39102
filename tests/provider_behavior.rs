//! Behavior-driven tests for the Gemini provider adapter.
//!
//! These tests verify HOW the adapter classifies upstream failures, parses
//! structured output, and protects the upstream with its circuit breaker.

use std::future::Future;
use std::pin::Pin;
use std::sync::{Arc, Mutex};

use serde_json::json;

use lotpilot_core::{
    CompletionProvider, CompletionRequest, GeminiProvider, HttpClient, HttpError, HttpRequest,
    HttpResponse, ProviderErrorKind,
};

/// Scripted HTTP transport that records every request it sees.
struct ScriptedHttpClient {
    responses: Mutex<Vec<Result<HttpResponse, HttpError>>>,
    requests: Mutex<Vec<HttpRequest>>,
}

impl ScriptedHttpClient {
    fn new(responses: Vec<Result<HttpResponse, HttpError>>) -> Self {
        Self {
            responses: Mutex::new(responses),
            requests: Mutex::new(Vec::new()),
        }
    }

    fn always(response: Result<HttpResponse, HttpError>) -> Self {
        Self::new(vec![response])
    }

    fn request_count(&self) -> usize {
        self.requests
            .lock()
            .expect("request store should not be poisoned")
            .len()
    }
}

impl HttpClient for ScriptedHttpClient {
    fn execute<'a>(
        &'a self,
        request: HttpRequest,
    ) -> Pin<Box<dyn Future<Output = Result<HttpResponse, HttpError>> + Send + 'a>> {
        let mut requests = self
            .requests
            .lock()
            .expect("request store should not be poisoned");
        let index = requests.len();
        requests.push(request);
        drop(requests);

        let responses = self
            .responses
            .lock()
            .expect("response script should not be poisoned");
        let response = responses[index.min(responses.len() - 1)].clone();
        Box::pin(async move { response })
    }

    fn is_mock(&self) -> bool {
        true
    }
}

fn completion_request() -> CompletionRequest {
    CompletionRequest::new(
        "interpret_command",
        "prompt text",
        json!({ "transcript": "Find parking" }),
    )
}

fn candidate_body(payload: &str) -> String {
    json!({
        "candidates": [
            { "content": { "parts": [ { "text": payload } ] } }
        ]
    })
    .to_string()
}

// =============================================================================
// Gemini: structured output parsing
// =============================================================================

#[tokio::test]
async fn when_gemini_returns_valid_candidates_the_payload_is_parsed() {
    let transport = Arc::new(ScriptedHttpClient::always(Ok(HttpResponse::ok_json(
        candidate_body(r#"{"intent":"find_parking","entities":{},"responseText":"ok"}"#),
    ))));
    let provider = GeminiProvider::with_scripted_transport(transport.clone());

    let value = provider
        .complete(completion_request())
        .await
        .expect("valid response should parse");

    assert_eq!(value["intent"], "find_parking");
    assert_eq!(transport.request_count(), 1);
}

#[tokio::test]
async fn when_candidate_text_is_fenced_json_it_still_parses() {
    let fenced = "```json\n{\"intent\":\"unknown\",\"entities\":{},\"responseText\":\"ok\"}\n```";
    let transport = Arc::new(ScriptedHttpClient::always(Ok(HttpResponse::ok_json(
        candidate_body(fenced),
    ))));
    let provider = GeminiProvider::with_scripted_transport(transport);

    let value = provider
        .complete(completion_request())
        .await
        .expect("fenced payload should parse");
    assert_eq!(value["intent"], "unknown");
}

#[tokio::test]
async fn when_candidate_text_is_prose_the_error_is_malformed_output() {
    let transport = Arc::new(ScriptedHttpClient::always(Ok(HttpResponse::ok_json(
        candidate_body("I'm sorry, I cannot answer in JSON today."),
    ))));
    let provider = GeminiProvider::with_scripted_transport(transport);

    let error = provider
        .complete(completion_request())
        .await
        .expect_err("prose is not structured output");

    assert_eq!(error.kind(), ProviderErrorKind::MalformedOutput);
    assert!(!error.retryable());
}

// =============================================================================
// Gemini: failure classification
// =============================================================================

#[tokio::test]
async fn status_429_is_a_retryable_rate_limit() {
    let transport = Arc::new(ScriptedHttpClient::always(Ok(HttpResponse {
        status: 429,
        body: String::from(r#"{"error":{"status":"RESOURCE_EXHAUSTED"}}"#),
    })));
    let provider = GeminiProvider::with_scripted_transport(transport);

    let error = provider
        .complete(completion_request())
        .await
        .expect_err("429 must fail");

    assert_eq!(error.kind(), ProviderErrorKind::RateLimited);
    assert!(error.retryable());
}

#[tokio::test]
async fn status_503_is_a_retryable_overload() {
    let transport = Arc::new(ScriptedHttpClient::always(Ok(HttpResponse {
        status: 503,
        body: String::from("overloaded"),
    })));
    let provider = GeminiProvider::with_scripted_transport(transport);

    let error = provider
        .complete(completion_request())
        .await
        .expect_err("503 must fail");

    assert_eq!(error.kind(), ProviderErrorKind::Overloaded);
    assert!(error.retryable());
}

#[tokio::test]
async fn status_400_is_fatal() {
    let transport = Arc::new(ScriptedHttpClient::always(Ok(HttpResponse {
        status: 400,
        body: String::from("bad request"),
    })));
    let provider = GeminiProvider::with_scripted_transport(transport);

    let error = provider
        .complete(completion_request())
        .await
        .expect_err("400 must fail");

    assert_eq!(error.kind(), ProviderErrorKind::InvalidRequest);
    assert!(!error.retryable());
}

#[tokio::test]
async fn transport_timeouts_are_retryable() {
    let transport = Arc::new(ScriptedHttpClient::always(Err(HttpError::timed_out(
        "deadline exceeded",
    ))));
    let provider = GeminiProvider::with_scripted_transport(transport);

    let error = provider
        .complete(completion_request())
        .await
        .expect_err("timeout must fail");

    assert_eq!(error.kind(), ProviderErrorKind::Timeout);
    assert!(error.retryable());
}

// =============================================================================
// Gemini: circuit breaker
// =============================================================================

#[tokio::test]
async fn breaker_opens_after_repeated_transport_failures_and_blocks_calls() {
    let transport = Arc::new(ScriptedHttpClient::always(Err(HttpError::new(
        "connection refused",
    ))));
    let provider = GeminiProvider::with_scripted_transport(transport.clone());

    for _ in 0..3 {
        let error = provider
            .complete(completion_request())
            .await
            .expect_err("transport failure");
        assert_eq!(error.kind(), ProviderErrorKind::Internal);
    }
    assert_eq!(transport.request_count(), 3);

    // The next call is refused before reaching the transport.
    let error = provider
        .complete(completion_request())
        .await
        .expect_err("breaker should refuse");
    assert!(error.message().contains("circuit breaker is open"));
    assert_eq!(transport.request_count(), 3);
}

#[tokio::test]
async fn malformed_output_does_not_trip_the_breaker() {
    let transport = Arc::new(ScriptedHttpClient::always(Ok(HttpResponse::ok_json(
        candidate_body("never json"),
    ))));
    let provider = GeminiProvider::with_scripted_transport(transport.clone());

    for _ in 0..5 {
        let error = provider
            .complete(completion_request())
            .await
            .expect_err("malformed output");
        assert_eq!(error.kind(), ProviderErrorKind::MalformedOutput);
    }

    // All five calls reached the transport: the breaker never opened.
    assert_eq!(transport.request_count(), 5);
}

// =============================================================================
// Gemini: mock mode
// =============================================================================

#[tokio::test]
async fn mock_mode_answers_deterministically_without_a_transport() {
    let provider = GeminiProvider::mock();

    let request = CompletionRequest::new(
        "interpret_command",
        "prompt",
        json!({ "transcript": "Reserve spot A5" }),
    );
    let first = provider.complete(request.clone()).await.expect("mock answers");
    let second = provider.complete(request).await.expect("mock answers");

    assert_eq!(first, second);
    assert_eq!(first["intent"], "reserve_spot");
}
