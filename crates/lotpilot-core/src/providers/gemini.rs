use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

use serde::Deserialize;
use serde_json::{json, Value};

use crate::breaker::CircuitBreaker;
use crate::http_client::{HttpAuth, HttpClient, HttpRequest, NoopHttpClient, ReqwestHttpClient};
use crate::provider::{CompletionProvider, CompletionRequest, ProviderError, ProviderId};

const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta";
const DEFAULT_MODEL: &str = "gemini-2.0-flash";

/// Gemini adapter supporting both real API calls and mock mode.
///
/// In mock mode (the default transport) the adapter produces deterministic
/// structured outputs derived from the request payload, so flows and the CLI
/// work offline without a key.
#[derive(Clone)]
pub struct GeminiProvider {
    http_client: Arc<dyn HttpClient>,
    auth: HttpAuth,
    base_url: String,
    model: String,
    breaker: Arc<CircuitBreaker>,
    use_real_api: bool,
}

impl Default for GeminiProvider {
    fn default() -> Self {
        Self {
            http_client: Arc::new(NoopHttpClient),
            auth: HttpAuth::None,
            base_url: String::from(DEFAULT_BASE_URL),
            model: String::from(DEFAULT_MODEL),
            breaker: Arc::new(CircuitBreaker::default()),
            use_real_api: false,
        }
    }
}

impl GeminiProvider {
    /// Deterministic offline adapter.
    pub fn mock() -> Self {
        Self::default()
    }

    /// Real adapter authenticated with an API key.
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            http_client: Arc::new(ReqwestHttpClient::new()),
            auth: HttpAuth::Header {
                name: String::from("x-goog-api-key"),
                value: api_key.into(),
            },
            use_real_api: true,
            ..Self::default()
        }
    }

    /// Adapter over a caller-supplied transport; real mode is inferred from
    /// the transport itself.
    pub fn with_http_client(http_client: Arc<dyn HttpClient>, auth: HttpAuth) -> Self {
        let use_real_api = !http_client.is_mock();
        Self {
            http_client,
            auth,
            use_real_api,
            ..Self::default()
        }
    }

    /// Force real-API request/response handling even over a mock transport.
    ///
    /// Used by tests that script HTTP responses.
    pub fn with_scripted_transport(http_client: Arc<dyn HttpClient>) -> Self {
        Self {
            http_client,
            use_real_api: true,
            ..Self::default()
        }
    }

    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    pub fn with_breaker(mut self, breaker: Arc<CircuitBreaker>) -> Self {
        self.breaker = breaker;
        self
    }

    pub fn breaker(&self) -> &CircuitBreaker {
        &self.breaker
    }

    async fn complete_real(&self, request: &CompletionRequest) -> Result<Value, ProviderError> {
        let endpoint = format!(
            "{}/models/{}:generateContent",
            self.base_url,
            urlencoding::encode(&self.model)
        );

        let body = json!({
            "contents": [{ "parts": [{ "text": request.prompt }] }],
            "generationConfig": { "responseMimeType": "application/json" },
        });

        let http_request = HttpRequest::post(endpoint)
            .with_json_body(body.to_string())
            .with_auth(&self.auth);

        let response = self.http_client.execute(http_request).await.map_err(|e| {
            let error = if e.is_timeout() {
                ProviderError::timeout(format!("gemini transport timeout: {}", e.message()))
            } else {
                ProviderError::internal(format!("gemini transport error: {}", e.message()))
            };
            self.record(&error);
            error
        })?;

        if !response.is_success() {
            let error = classify_status(response.status, &response.body);
            self.record(&error);
            return Err(error);
        }

        // The upstream answered; parse failures below are output problems,
        // not health problems.
        self.breaker.on_success();
        extract_structured_output(&response.body)
    }

    fn record(&self, error: &ProviderError) {
        if error.counts_against_breaker() {
            self.breaker.on_failure();
        }
    }
}

impl CompletionProvider for GeminiProvider {
    fn id(&self) -> ProviderId {
        ProviderId::Gemini
    }

    fn complete<'a>(
        &'a self,
        request: CompletionRequest,
    ) -> Pin<Box<dyn Future<Output = Result<Value, ProviderError>> + Send + 'a>> {
        Box::pin(async move {
            if let Err(open) = self.breaker.try_acquire() {
                return Err(ProviderError::internal(format!(
                    "gemini circuit breaker is open; next probe in {}ms",
                    open.retry_in.as_millis()
                )));
            }

            if self.use_real_api {
                self.complete_real(&request).await
            } else {
                self.breaker.on_success();
                Ok(mock_completion(&request))
            }
        })
    }
}

fn classify_status(status: u16, body: &str) -> ProviderError {
    match status {
        429 => ProviderError::rate_limited(format!("gemini returned status 429: {}", excerpt(body))),
        503 => ProviderError::overloaded(format!("gemini returned status 503: {}", excerpt(body))),
        400 | 404 => {
            ProviderError::invalid_request(format!("gemini rejected request ({status}): {}", excerpt(body)))
        }
        other => ProviderError::internal(format!("gemini returned status {other}: {}", excerpt(body))),
    }
}

fn excerpt(body: &str) -> &str {
    let trimmed = body.trim();
    match trimmed.char_indices().nth(200) {
        Some((index, _)) => &trimmed[..index],
        None => trimmed,
    }
}

/// Pull the first candidate's text out of a generateContent response and
/// parse it as JSON, tolerating markdown code fences around the payload.
fn extract_structured_output(body: &str) -> Result<Value, ProviderError> {
    let response: GenerateContentResponse = serde_json::from_str(body).map_err(|e| {
        ProviderError::malformed_output(format!("failed to parse gemini response: {e}"))
    })?;

    let text = response
        .candidates
        .first()
        .and_then(|candidate| candidate.content.parts.first())
        .map(|part| part.text.as_str())
        .ok_or_else(|| ProviderError::malformed_output("gemini response carried no candidates"))?;

    let stripped = strip_code_fence(text);
    serde_json::from_str(stripped).map_err(|e| {
        ProviderError::malformed_output(format!("gemini candidate text is not valid JSON: {e}"))
    })
}

fn strip_code_fence(text: &str) -> &str {
    let trimmed = text.trim();
    let Some(rest) = trimmed.strip_prefix("```") else {
        return trimmed;
    };

    let rest = rest.strip_prefix("json").unwrap_or(rest);
    rest.strip_suffix("```").unwrap_or(rest).trim()
}

// Gemini generateContent response structures.
#[derive(Debug, Clone, Deserialize)]
struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Clone, Deserialize)]
struct Candidate {
    content: CandidateContent,
}

#[derive(Debug, Clone, Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<CandidatePart>,
}

#[derive(Debug, Clone, Deserialize)]
struct CandidatePart {
    #[serde(default)]
    text: String,
}

// ============================================================================
// Mock mode
// ============================================================================

fn mock_completion(request: &CompletionRequest) -> Value {
    match request.template {
        "interpret_command" => mock_interpretation(&request.input),
        "recommend_parking" => mock_recommendations(&request.input),
        "predict_availability" => mock_forecast(&request.input),
        _ => json!({}),
    }
}

fn mock_interpretation(input: &Value) -> Value {
    let transcript = input
        .get("transcript")
        .and_then(Value::as_str)
        .unwrap_or_default();
    let lowered = transcript.to_lowercase();

    if lowered.contains("reserve") {
        let spot = token_after(&lowered, "spot ").unwrap_or_else(|| String::from("A1"));
        return json!({
            "intent": "reserve_spot",
            "entities": { "spotId": spot },
            "responseText": format!("Got it. You want to reserve spot {}.", spot.to_uppercase()),
        });
    }

    if lowered.contains("available") || lowered.contains("free") {
        let spot = token_after(&lowered, "spot ").unwrap_or_else(|| String::from("A1"));
        return json!({
            "intent": "check_availability",
            "entities": { "spotId": spot },
            "responseText": format!("Let me check the availability of spot {}.", spot.to_uppercase()),
        });
    }

    if lowered.contains("directions") {
        return json!({
            "intent": "get_directions",
            "entities": {},
            "responseText": "Okay, getting directions.",
        });
    }

    if lowered.contains("report") {
        return json!({
            "intent": "report_issue",
            "entities": { "issueType": "occupied" },
            "responseText": "Okay, I can help report an issue with that spot.",
        });
    }

    if lowered.contains("parking") || lowered.contains("park") {
        let destination = token_tail(&lowered, "near ");
        return json!({
            "intent": "find_parking",
            "entities": destination
                .map(|d| json!({ "destination": d }))
                .unwrap_or_else(|| json!({})),
            "responseText": "Okay, looking for parking.",
        });
    }

    json!({
        "intent": "unknown",
        "entities": {},
        "responseText": "Sorry, I can only help with parking tasks.",
    })
}

fn mock_recommendations(input: &Value) -> Value {
    let lots = input
        .get("nearbyParkingLots")
        .and_then(Value::as_str)
        .and_then(|raw| serde_json::from_str::<Value>(raw).ok())
        .and_then(|value| value.as_array().cloned())
        .unwrap_or_default();

    let recommendations: Vec<Value> = lots
        .iter()
        .take(3)
        .filter_map(|lot| {
            let id = lot.get("id").and_then(Value::as_str)?;
            let name = lot.get("name").and_then(Value::as_str)?;
            let score = (seed(id) % 101) as f64 / 100.0;
            Some(json!({
                "lotId": id,
                "lotName": name,
                "reason": format!("{name} is nearby with predicted availability in offline mode"),
                "availabilityScore": score,
            }))
        })
        .collect();

    json!({ "recommendations": recommendations })
}

fn mock_forecast(input: &Value) -> Value {
    let spot_id = input
        .get("spotId")
        .and_then(Value::as_str)
        .unwrap_or("unknown");
    let availability = (seed(spot_id) % 101) as f64 / 100.0;

    json!({
        "predictedAvailability": availability,
        "confidence": "medium",
        "factors": "derived from recent occupancy patterns in offline mode",
    })
}

fn token_after(haystack: &str, marker: &str) -> Option<String> {
    let tail = haystack.split(marker).nth(1)?;
    let token: String = tail
        .chars()
        .take_while(|ch| ch.is_ascii_alphanumeric() || *ch == '_' || *ch == '-' || *ch == ' ')
        .collect();
    let token = token.trim();
    if token.is_empty() {
        None
    } else {
        Some(token.to_owned())
    }
}

fn token_tail(haystack: &str, marker: &str) -> Option<String> {
    haystack
        .split(marker)
        .nth(1)
        .map(str::trim)
        .filter(|tail| !tail.is_empty())
        .map(str::to_owned)
}

fn seed(input: &str) -> u64 {
    input.bytes().fold(0_u64, |acc, byte| {
        acc.wrapping_mul(33).wrapping_add(byte as u64)
    })
}
