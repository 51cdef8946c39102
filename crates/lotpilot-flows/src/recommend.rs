//! Personalized parking recommendation flow.

use serde_json::{json, Value};

use lotpilot_core::{
    nearby_lots_from_json, CompletionRequest, NearbyLot, Recommendation, RecommendationSet,
    ValidationError,
};

use crate::assistant::Assistant;
use crate::normalize::{number_field, string_field};
use crate::prompt;
use crate::reply::FlowReply;

/// Upper bound on returned recommendations; the prompt asks for 3-5.
const MAX_RECOMMENDATIONS: usize = 5;

/// Request for personalized parking recommendations.
#[derive(Debug, Clone, PartialEq)]
pub struct RecommendRequest {
    pub user_id: String,
    pub current_latitude: Option<f64>,
    pub current_longitude: Option<f64>,
    pub destination_latitude: Option<f64>,
    pub destination_longitude: Option<f64>,
    pub preferred_services: Vec<String>,
    pub max_distance_km: Option<f64>,
    /// Optional JSON-encoded array of nearby lots with availability/pricing.
    pub nearby_lots_json: Option<String>,
    /// Short summary of the user's recent parking behavior.
    pub history_summary: Option<String>,
}

impl RecommendRequest {
    pub fn new(user_id: impl Into<String>) -> Result<Self, ValidationError> {
        let user_id = user_id.into();
        if user_id.trim().is_empty() {
            return Err(ValidationError::EmptyField { field: "user_id" });
        }

        Ok(Self {
            user_id,
            current_latitude: None,
            current_longitude: None,
            destination_latitude: None,
            destination_longitude: None,
            preferred_services: Vec::new(),
            max_distance_km: None,
            nearby_lots_json: None,
            history_summary: None,
        })
    }

    pub fn with_current_position(mut self, latitude: f64, longitude: f64) -> Self {
        self.current_latitude = Some(latitude);
        self.current_longitude = Some(longitude);
        self
    }

    pub fn with_destination(mut self, latitude: f64, longitude: f64) -> Self {
        self.destination_latitude = Some(latitude);
        self.destination_longitude = Some(longitude);
        self
    }

    pub fn with_preferred_services(mut self, services: Vec<String>) -> Self {
        self.preferred_services = services;
        self
    }

    pub fn with_max_distance_km(mut self, km: f64) -> Self {
        self.max_distance_km = Some(km);
        self
    }

    pub fn with_nearby_lots_json(mut self, nearby_lots_json: impl Into<String>) -> Self {
        self.nearby_lots_json = Some(nearby_lots_json.into());
        self
    }

    pub fn with_history_summary(mut self, summary: impl Into<String>) -> Self {
        self.history_summary = Some(summary.into());
        self
    }
}

pub(crate) async fn run(
    assistant: &Assistant,
    request: RecommendRequest,
) -> FlowReply<RecommendationSet> {
    let provider = assistant.provider_id();

    let context = nearby_lots_from_json(request.nearby_lots_json.as_deref());
    let mut warnings = context.warnings;

    // With no usable lot context there is nothing to rank; answering an
    // empty list locally matches what the model could honestly produce.
    if context.items.is_empty() {
        warnings.push(String::from(
            "no nearby-lot context available; returning no recommendations",
        ));
        return FlowReply::live(RecommendationSet::empty(), provider, 0).with_warnings(warnings);
    }

    let lots_json =
        serde_json::to_string(&context.items).unwrap_or_else(|_| String::from("[]"));
    let input = json!({
        "userId": request.user_id,
        "nearbyParkingLots": lots_json,
        "userHistorySummary": request.history_summary,
        "preferredServices": request.preferred_services,
    });
    let rendered = prompt::recommend_prompt(&request, &context.items);
    let invocation = assistant
        .invoke_model(CompletionRequest::new(
            prompt::RECOMMEND_TEMPLATE,
            rendered,
            input,
        ))
        .await;
    warnings.extend(invocation.warnings);

    match normalize_output(invocation.output, &context.items, &mut warnings) {
        Some(result) => {
            FlowReply::live(result, provider, invocation.attempts).with_warnings(warnings)
        }
        None => FlowReply::fallback(RecommendationSet::empty(), provider, invocation.attempts)
            .with_warnings(warnings),
    }
}

/// Filter the raw recommendation list down to schema-valid entries.
///
/// A missing or non-array `recommendations` field is a schema violation and
/// yields the fallback; individually broken entries are dropped with a
/// count-mismatch warning instead of failing the whole operation.
fn normalize_output(
    output: Option<Value>,
    known_lots: &[NearbyLot],
    warnings: &mut Vec<String>,
) -> Option<RecommendationSet> {
    let output = output?;

    let raw_entries = match output.get("recommendations").and_then(Value::as_array) {
        Some(entries) => entries.clone(),
        None => {
            warnings.push(String::from(
                "model output was missing a recommendations list",
            ));
            return None;
        }
    };

    let total = raw_entries.len();
    let mut recommendations = Vec::new();

    for entry in raw_entries.iter().take(MAX_RECOMMENDATIONS) {
        let Some(rec) = normalize_entry(entry, known_lots, warnings) else {
            continue;
        };
        recommendations.push(rec);
    }

    if recommendations.len() < total {
        tracing::warn!(
            kept = recommendations.len(),
            received = total,
            "dropped invalid or excess recommendation entries"
        );
        warnings.push(format!(
            "kept {} of {} recommendations returned by the model",
            recommendations.len(),
            total
        ));
    }

    Some(RecommendationSet::new(recommendations))
}

fn normalize_entry(
    entry: &Value,
    known_lots: &[NearbyLot],
    warnings: &mut Vec<String>,
) -> Option<Recommendation> {
    let lot_id = string_field(entry, "lotId")?;
    let lot_name = string_field(entry, "lotName")?;
    let reason = string_field(entry, "reason")?;

    let estimated_cost = number_field(entry, "estimatedCost").filter(|cost| *cost >= 0.0);
    let availability_score = number_field(entry, "availabilityScore").map(|s| s.clamp(0.0, 1.0));

    if !known_lots
        .iter()
        .any(|lot| lot.id.eq_ignore_ascii_case(&lot_id))
    {
        warnings.push(format!(
            "recommendation references lot '{lot_id}' that is not in the supplied context"
        ));
    }

    Recommendation::new(lot_id, lot_name, reason, estimated_cost, availability_score).ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    use lotpilot_core::{ProviderError, RetryPolicy, ScriptedProvider};

    const LOTS: &str = r#"[
        {"id":"lot_A","name":"Downtown Garage","availableSpots":12,"pricePerHour":2.5},
        {"id":"lot_B","name":"Airport Lot","availableSpots":48,"pricePerHour":4.0}
    ]"#;

    fn assistant(provider: Arc<ScriptedProvider>) -> Assistant {
        Assistant::new(provider).with_retry_policy(RetryPolicy::fast())
    }

    fn entry(lot_id: &str, reason: &str) -> Value {
        json!({
            "lotId": lot_id,
            "lotName": format!("{lot_id} name"),
            "reason": reason,
            "availabilityScore": 0.7,
        })
    }

    #[tokio::test]
    async fn filters_entries_missing_required_fields() {
        let provider = Arc::new(ScriptedProvider::always(json!({
            "recommendations": [
                entry("lot_A", "closest to destination"),
                entry("lot_B", "cheapest nearby"),
                { "lotId": "lot_A", "lotName": "Downtown Garage" },
                entry("lot_A", "has EV charging"),
                entry("lot_B", "rarely full"),
            ]
        })));
        let assistant = assistant(provider);

        let request = RecommendRequest::new("user_abc123")
            .expect("valid")
            .with_nearby_lots_json(LOTS);
        let reply = assistant.recommend(request).await;

        assert_eq!(reply.result.len(), 4);
        assert!(!reply.fallback);
        assert!(reply
            .warnings
            .iter()
            .any(|w| w.contains("kept 4 of 5")));
    }

    #[tokio::test]
    async fn clamps_availability_scores_into_unit_interval() {
        let provider = Arc::new(ScriptedProvider::always(json!({
            "recommendations": [{
                "lotId": "lot_A",
                "lotName": "Downtown Garage",
                "reason": "closest",
                "availabilityScore": 1.4,
            }]
        })));
        let assistant = assistant(provider);

        let request = RecommendRequest::new("user_abc123")
            .expect("valid")
            .with_nearby_lots_json(LOTS);
        let reply = assistant.recommend(request).await;

        assert_eq!(reply.result.recommendations[0].availability_score, Some(1.0));
    }

    #[tokio::test]
    async fn missing_recommendations_field_is_a_fallback() {
        let provider = Arc::new(ScriptedProvider::always(json!({ "results": [] })));
        let assistant = assistant(provider.clone());

        let request = RecommendRequest::new("user_abc123")
            .expect("valid")
            .with_nearby_lots_json(LOTS);
        let reply = assistant.recommend(request).await;

        assert!(reply.fallback);
        assert!(reply.result.is_empty());
        assert_eq!(provider.calls(), 1);
    }

    #[tokio::test]
    async fn malformed_lot_context_skips_the_provider() {
        let provider = Arc::new(ScriptedProvider::always(json!({ "recommendations": [] })));
        let assistant = assistant(provider.clone());

        let request = RecommendRequest::new("user_abc123")
            .expect("valid")
            .with_nearby_lots_json("not json at all");
        let reply = assistant.recommend(request).await;

        assert!(reply.result.is_empty());
        assert!(!reply.fallback);
        assert_eq!(provider.calls(), 0);
        assert!(reply.warnings.iter().any(|w| w.contains("malformed")));
    }

    #[tokio::test]
    async fn transient_errors_exhaust_into_empty_fallback() {
        let provider = Arc::new(ScriptedProvider::failing(ProviderError::rate_limited(
            "quota exceeded",
        )));
        let assistant = assistant(provider.clone());

        let request = RecommendRequest::new("user_abc123")
            .expect("valid")
            .with_nearby_lots_json(LOTS);
        let reply = assistant.recommend(request).await;

        assert!(reply.fallback);
        assert!(reply.result.is_empty());
        assert_eq!(provider.calls(), 3);
        assert_eq!(reply.attempts, 3);
    }

    #[tokio::test]
    async fn flags_recommendations_for_unknown_lots() {
        let provider = Arc::new(ScriptedProvider::always(json!({
            "recommendations": [entry("lot_Z", "hallucinated")]
        })));
        let assistant = assistant(provider);

        let request = RecommendRequest::new("user_abc123")
            .expect("valid")
            .with_nearby_lots_json(LOTS);
        let reply = assistant.recommend(request).await;

        assert_eq!(reply.result.len(), 1);
        assert!(reply
            .warnings
            .iter()
            .any(|w| w.contains("lot 'lot_Z'")));
    }
}
