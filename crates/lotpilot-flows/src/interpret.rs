//! Voice command interpretation flow.

use std::str::FromStr;

use serde_json::{json, Value};

use lotpilot_core::{
    bookmarks_from_json, canonical_lot_id, normalize_spot_id, Bookmark, CommandEntities,
    CommandInterpretation, CompletionRequest, Intent, ValidationError,
};

use crate::assistant::Assistant;
use crate::normalize::{resolve_bookmark_label, string_field, BookmarkMatch};
use crate::prompt;
use crate::reply::FlowReply;

const FALLBACK_RESPONSE: &str =
    "Sorry, I didn't quite understand that. Can you please repeat or try phrasing it differently?";
const CANCEL_RESPONSE: &str = "Okay, which reservation would you like to cancel? \
You can check your active reservations in your profile.";

/// Request to interpret one transcribed voice command.
#[derive(Debug, Clone, PartialEq)]
pub struct InterpretRequest {
    pub transcript: String,
    /// Optional JSON-encoded array of the user's saved bookmarks.
    pub bookmarks_json: Option<String>,
}

impl InterpretRequest {
    pub fn new(transcript: impl Into<String>) -> Result<Self, ValidationError> {
        let transcript = transcript.into();
        if transcript.trim().is_empty() {
            return Err(ValidationError::EmptyField {
                field: "transcript",
            });
        }

        Ok(Self {
            transcript,
            bookmarks_json: None,
        })
    }

    pub fn with_bookmarks_json(mut self, bookmarks_json: impl Into<String>) -> Self {
        self.bookmarks_json = Some(bookmarks_json.into());
        self
    }
}

pub(crate) async fn run(
    assistant: &Assistant,
    request: InterpretRequest,
) -> FlowReply<CommandInterpretation> {
    let provider = assistant.provider_id();

    // Unambiguous commands skip the model entirely.
    let lowered = request.transcript.to_lowercase();
    if lowered.contains("cancel") && lowered.contains("reservation") {
        let result = CommandInterpretation::new(
            Intent::CancelReservation,
            CommandEntities::default(),
            CANCEL_RESPONSE,
        )
        .expect("static cancel response is valid");
        return FlowReply::live(result, provider, 0);
    }

    let context = bookmarks_from_json(request.bookmarks_json.as_deref());
    let mut warnings = context.warnings;

    let input = json!({ "transcript": request.transcript });
    let rendered = prompt::interpret_prompt(&request, &context.items);
    let invocation = assistant
        .invoke_model(CompletionRequest::new(
            prompt::INTERPRET_TEMPLATE,
            rendered,
            input,
        ))
        .await;
    warnings.extend(invocation.warnings);

    match normalize_output(invocation.output, &context.items, &mut warnings) {
        Some(result) => {
            FlowReply::live(result, provider, invocation.attempts).with_warnings(warnings)
        }
        None => {
            let result = CommandInterpretation::new(
                Intent::Unknown,
                CommandEntities::default(),
                FALLBACK_RESPONSE,
            )
            .expect("static fallback response is valid");
            FlowReply::fallback(result, provider, invocation.attempts).with_warnings(warnings)
        }
    }
}

/// Enforce the minimum-required-fields predicate and apply field-level
/// normalization. `None` means the caller substitutes the fallback.
fn normalize_output(
    output: Option<Value>,
    bookmarks: &[Bookmark],
    warnings: &mut Vec<String>,
) -> Option<CommandInterpretation> {
    let output = output?;

    let intent_raw = string_field(&output, "intent").or_else(|| {
        warnings.push(String::from("model output was missing an intent"));
        None
    })?;
    let intent = match Intent::from_str(&intent_raw) {
        Ok(intent) => intent,
        Err(error) => {
            warnings.push(error.to_string());
            return None;
        }
    };

    let response_text = string_field(&output, "responseText").or_else(|| {
        warnings.push(String::from("model output was missing a spoken response"));
        None
    })?;

    let raw_entities = output.get("entities").cloned().unwrap_or_else(|| json!({}));
    let mut entities = CommandEntities {
        destination: string_field(&raw_entities, "destination"),
        spot_id: string_field(&raw_entities, "spotId"),
        location_id: string_field(&raw_entities, "locationId"),
        issue_type: string_field(&raw_entities, "issueType"),
    };

    if let Some(spot_id) = entities.spot_id.take() {
        entities.spot_id = Some(normalize_spot_id(&spot_id));
    }

    if let Some(location_id) = entities.location_id.take() {
        entities.location_id = Some(match canonical_lot_id(&location_id) {
            Some(canonical) => canonical.to_owned(),
            None => location_id,
        });
    }

    if let Some(destination) = entities.destination.take() {
        entities.destination = Some(match resolve_bookmark_label(&destination, bookmarks) {
            BookmarkMatch::Exact(label) => label,
            BookmarkMatch::CaseInsensitive(label) => {
                warnings.push(format!(
                    "destination '{destination}' matched bookmark '{label}' ignoring case"
                ));
                label
            }
            BookmarkMatch::None => destination,
        });
    }

    match CommandInterpretation::new(intent, entities, response_text) {
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

    #[tokio::test]
    async fn cancel_command_short_circuits_without_provider_call() {
        let provider = Arc::new(ScriptedProvider::always(json!({})));
        let assistant = assistant(provider.clone());

        let reply = assistant
            .interpret(InterpretRequest::new("Please CANCEL my Reservation").expect("valid"))
            .await;

        assert_eq!(reply.result.intent, Intent::CancelReservation);
        assert_eq!(reply.attempts, 0);
        assert!(!reply.fallback);
        assert_eq!(provider.calls(), 0);
    }

    #[tokio::test]
    async fn normalizes_spot_id_from_model_output() {
        let provider = Arc::new(ScriptedProvider::always(json!({
            "intent": "reserve_spot",
            "entities": { "spotId": "c 12" },
            "responseText": "ok",
        })));
        let assistant = assistant(provider);

        let reply = assistant
            .interpret(InterpretRequest::new("Reserve spot C twelve").expect("valid"))
            .await;

        assert_eq!(reply.result.intent, Intent::ReserveSpot);
        assert_eq!(reply.result.entities.spot_id.as_deref(), Some("C12"));
        assert!(!reply.fallback);
    }

    #[tokio::test]
    async fn maps_location_names_onto_canonical_ids() {
        let provider = Arc::new(ScriptedProvider::always(json!({
            "intent": "get_directions",
            "entities": { "locationId": "Downtown Garage" },
            "responseText": "Okay, getting directions to Downtown Garage.",
        })));
        let assistant = assistant(provider);

        let reply = assistant
            .interpret(InterpretRequest::new("Get directions to Downtown Garage").expect("valid"))
            .await;

        assert_eq!(reply.result.entities.location_id.as_deref(), Some("lot_A"));
    }

    #[tokio::test]
    async fn resolves_destination_against_bookmarks_case_insensitively() {
        let provider = Arc::new(ScriptedProvider::always(json!({
            "intent": "find_parking",
            "entities": { "destination": "home" },
            "responseText": "Okay, looking for parking near home.",
        })));
        let assistant = assistant(provider);

        let bookmarks = r#"[{"id":"bm_1","label":"Home"}]"#;
        let reply = assistant
            .interpret(
                InterpretRequest::new("Find parking near home")
                    .expect("valid")
                    .with_bookmarks_json(bookmarks),
            )
            .await;

        assert_eq!(reply.result.entities.destination.as_deref(), Some("Home"));
        assert!(reply
            .warnings
            .iter()
            .any(|w| w.contains("ignoring case")));
    }

    #[tokio::test]
    async fn missing_response_text_substitutes_fallback() {
        let provider = Arc::new(ScriptedProvider::always(json!({
            "intent": "reserve_spot",
            "entities": { "spotId": "A5" },
        })));
        let assistant = assistant(provider.clone());

        let reply = assistant
            .interpret(InterpretRequest::new("Reserve spot A5").expect("valid"))
            .await;

        assert!(reply.fallback);
        assert_eq!(reply.result.intent, Intent::Unknown);
        assert_eq!(reply.result.response_text, FALLBACK_RESPONSE);
        assert_eq!(provider.calls(), 1);
    }

    #[tokio::test]
    async fn transient_failures_retry_then_succeed() {
        let provider = Arc::new(ScriptedProvider::new(vec![
            Err(ProviderError::overloaded("model overloaded")),
            Err(ProviderError::overloaded("model overloaded")),
            Ok(json!({
                "intent": "find_parking",
                "entities": {},
                "responseText": "Okay, looking for parking.",
            })),
        ]));
        let assistant = assistant(provider.clone());

        let reply = assistant
            .interpret(InterpretRequest::new("Find me parking").expect("valid"))
            .await;

        assert!(!reply.fallback);
        assert_eq!(reply.attempts, 3);
        assert_eq!(provider.calls(), 3);
    }

    #[tokio::test]
    async fn fatal_failure_falls_back_without_retry() {
        let provider = Arc::new(ScriptedProvider::failing(ProviderError::invalid_request(
            "prompt rejected",
        )));
        let assistant = assistant(provider.clone());

        let reply = assistant
            .interpret(InterpretRequest::new("Find me parking").expect("valid"))
            .await;

        assert!(reply.fallback);
        assert_eq!(provider.calls(), 1);
    }

    #[tokio::test]
    async fn malformed_bookmark_context_degrades_gracefully() {
        let provider = Arc::new(ScriptedProvider::always(json!({
            "intent": "find_parking",
            "entities": { "destination": "home" },
            "responseText": "Okay.",
        })));
        let assistant = assistant(provider);

        let reply = assistant
            .interpret(
                InterpretRequest::new("Find parking near home")
                    .expect("valid")
                    .with_bookmarks_json("{broken json"),
            )
            .await;

        // Destination behaves as if no bookmarks were supplied.
        assert_eq!(reply.result.entities.destination.as_deref(), Some("home"));
        assert!(reply.warnings.iter().any(|w| w.contains("malformed")));
        assert!(!reply.fallback);
    }

    #[test]
    fn rejects_empty_transcript() {
        let err = InterpretRequest::new("   ").expect_err("must fail");
        assert!(matches!(err, ValidationError::EmptyField { .. }));
    }
}
