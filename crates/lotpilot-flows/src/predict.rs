//! Spot availability prediction flow.

use std::str::FromStr;

use serde_json::{json, Value};

use lotpilot_core::{
    AvailabilityForecast, CompletionRequest, Confidence, ValidationError,
};

use crate::assistant::Assistant;
use crate::normalize::{number_field, string_field};
use crate::prompt;
use crate::reply::FlowReply;

const FALLBACK_FACTORS: &str =
    "prediction unavailable; defaulting to pessimistic availability";

/// Request to predict availability for one spot.
#[derive(Debug, Clone, PartialEq)]
pub struct PredictRequest {
    pub spot_id: String,
    /// Free-text summary of historical occupancy for the spot.
    pub historical_data: String,
    /// Free-text description of current trends (events, time of day).
    pub trends: String,
}

impl PredictRequest {
    pub fn new(
        spot_id: impl Into<String>,
        historical_data: impl Into<String>,
        trends: impl Into<String>,
    ) -> Result<Self, ValidationError> {
        let spot_id = spot_id.into();
        if spot_id.trim().is_empty() {
            return Err(ValidationError::EmptyField { field: "spot_id" });
        }

        Ok(Self {
            spot_id,
            historical_data: historical_data.into(),
            trends: trends.into(),
        })
    }
}

pub(crate) async fn run(
    assistant: &Assistant,
    request: PredictRequest,
) -> FlowReply<AvailabilityForecast> {
    let provider = assistant.provider_id();

    let input = json!({
        "spotId": request.spot_id,
        "historicalData": request.historical_data,
        "trends": request.trends,
    });
    let rendered = prompt::predict_prompt(&request);
    let invocation = assistant
        .invoke_model(CompletionRequest::new(
            prompt::PREDICT_TEMPLATE,
            rendered,
            input,
        ))
        .await;
    let mut warnings = invocation.warnings;

    match normalize_output(invocation.output, &mut warnings) {
        Some(result) => {
            FlowReply::live(result, provider, invocation.attempts).with_warnings(warnings)
        }
        None => {
            let result = AvailabilityForecast::new(0.0, Confidence::Low, FALLBACK_FACTORS)
                .expect("static fallback forecast is valid");
            FlowReply::fallback(result, provider, invocation.attempts).with_warnings(warnings)
        }
    }
}

fn normalize_output(
    output: Option<Value>,
    warnings: &mut Vec<String>,
) -> Option<AvailabilityForecast> {
    let output = output?;

    let Some(raw_availability) = number_field(&output, "predictedAvailability") else {
        warnings.push(String::from(
            "model output was missing a numeric predicted availability",
        ));
        return None;
    };

    let predicted_availability = raw_availability.clamp(0.0, 1.0);
    if predicted_availability != raw_availability {
        warnings.push(format!(
            "predicted availability {raw_availability} was clamped into [0, 1]"
        ));
    }

    let confidence = match string_field(&output, "confidence") {
        Some(raw) => match Confidence::from_str(&raw) {
            Ok(confidence) => confidence,
            Err(error) => {
                warnings.push(format!("{error}; degrading to low"));
                Confidence::Low
            }
        },
        None => {
            warnings.push(String::from("model output omitted confidence; assuming low"));
            Confidence::Low
        }
    };

    let factors = string_field(&output, "factors")
        .unwrap_or_else(|| String::from("no contributing factors reported"));

    match AvailabilityForecast::new(predicted_availability, confidence, factors) {
        Ok(result) => Some(result),
        Err(error) => {
            warnings.push(error.to_string());
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    use lotpilot_core::{ProviderError, RetryPolicy, ScriptedProvider};

    fn assistant(provider: Arc<ScriptedProvider>) -> Assistant {
        Assistant::new(provider).with_retry_policy(RetryPolicy::fast())
    }

    fn request() -> PredictRequest {
        PredictRequest::new("lot_A-S5", "busy on weekday mornings", "rainy Tuesday")
            .expect("valid request")
    }

    #[tokio::test]
    async fn returns_validated_forecast() {
        let provider = Arc::new(ScriptedProvider::always(json!({
            "predictedAvailability": 0.72,
            "confidence": "high",
            "factors": "mid-morning lull before lunch traffic",
        })));
        let assistant = assistant(provider);

        let reply = assistant.predict(request()).await;

        assert!(!reply.fallback);
        assert_eq!(reply.result.predicted_availability, 0.72);
        assert_eq!(reply.result.confidence, Confidence::High);
    }

    #[tokio::test]
    async fn clamps_out_of_range_availability() {
        let provider = Arc::new(ScriptedProvider::always(json!({
            "predictedAvailability": 1.8,
            "confidence": "medium",
            "factors": "overly optimistic model",
        })));
        let assistant = assistant(provider);

        let reply = assistant.predict(request()).await;

        assert_eq!(reply.result.predicted_availability, 1.0);
        assert!(reply.warnings.iter().any(|w| w.contains("clamped")));
    }

    #[tokio::test]
    async fn unknown_confidence_degrades_to_low() {
        let provider = Arc::new(ScriptedProvider::always(json!({
            "predictedAvailability": 0.4,
            "confidence": "certain",
            "factors": "event nearby",
        })));
        let assistant = assistant(provider);

        let reply = assistant.predict(request()).await;

        assert_eq!(reply.result.confidence, Confidence::Low);
        assert!(!reply.fallback);
    }

    #[tokio::test]
    async fn missing_availability_yields_pessimistic_fallback() {
        let provider = Arc::new(ScriptedProvider::always(json!({
            "confidence": "high",
            "factors": "no number though",
        })));
        let assistant = assistant(provider.clone());

        let reply = assistant.predict(request()).await;

        assert!(reply.fallback);
        assert_eq!(reply.result.predicted_availability, 0.0);
        assert_eq!(reply.result.confidence, Confidence::Low);
        assert_eq!(provider.calls(), 1);
    }

    #[tokio::test]
    async fn provider_failure_yields_fallback_after_retries() {
        let provider = Arc::new(ScriptedProvider::failing(ProviderError::overloaded(
            "model overloaded",
        )));
        let assistant = assistant(provider.clone());

        let reply = assistant.predict(request()).await;

        assert!(reply.fallback);
        assert_eq!(provider.calls(), 3);
    }
}
