//! Prompt templates for the assistant flows.
//!
//! Each flow renders one template from its validated request. The rendered
//! text instructs the model to answer with a single JSON object matching the
//! flow's output schema; the normalizers treat that instruction as a hope,
//! not a guarantee.

use lotpilot_core::{Bookmark, NearbyLot};

use crate::interpret::InterpretRequest;
use crate::predict::PredictRequest;
use crate::recommend::RecommendRequest;

pub const INTERPRET_TEMPLATE: &str = "interpret_command";
pub const RECOMMEND_TEMPLATE: &str = "recommend_parking";
pub const PREDICT_TEMPLATE: &str = "predict_availability";

pub fn interpret_prompt(request: &InterpretRequest, bookmarks: &[Bookmark]) -> String {
    let bookmark_lines = if bookmarks.is_empty() {
        String::from("(none saved)")
    } else {
        bookmarks
            .iter()
            .map(|b| format!("- {}", b.label))
            .collect::<Vec<_>>()
            .join("\n")
    };

    format!(
        r#"You are a voice assistant for a smart parking app. Analyze the user command transcript below and determine the user's intent and any relevant entities.

User Command: "{transcript}"

The user's saved bookmarks:
{bookmark_lines}

Possible intents: find_parking, reserve_spot, check_availability, cancel_reservation, get_directions, report_issue, unknown.

Entities to extract when present:
- destination: a place name or address, or one of the saved bookmark labels
- spotId: a specific spot identifier (normalize spoken forms, e.g. "spot a five" -> "A5")
- locationId: a parking lot name or id
- issueType: the nature of a reported problem (e.g. "occupied", "blocked")

Answer with a single JSON object with fields "intent", "entities" and "responseText". The responseText is spoken back to the user: confirm what you understood or ask for clarification, and politely decline anything unrelated to parking.

Examples:
Command: "Find parking near the train station"
Output: {{"intent":"find_parking","entities":{{"destination":"train station"}},"responseText":"Okay, looking for parking near the train station."}}
Command: "Reserve spot C twelve"
Output: {{"intent":"reserve_spot","entities":{{"spotId":"C12"}},"responseText":"Got it. You want to reserve spot C12. Please confirm on the screen."}}
Command: "What's the weather like?"
Output: {{"intent":"unknown","entities":{{}},"responseText":"Sorry, I can only help with parking tasks."}}
"#,
        transcript = request.transcript,
        bookmark_lines = bookmark_lines,
    )
}

pub fn recommend_prompt(request: &RecommendRequest, lots: &[NearbyLot]) -> String {
    let lots_json = serde_json::to_string(lots).unwrap_or_else(|_| String::from("[]"));

    let location = match (request.current_latitude, request.current_longitude) {
        (Some(lat), Some(lon)) => format!("Current position: lat {lat}, lon {lon}."),
        _ => String::from("Current position unknown."),
    };
    let destination = match (request.destination_latitude, request.destination_longitude) {
        (Some(lat), Some(lon)) => format!("Destination: lat {lat}, lon {lon}."),
        _ => String::from("Destination unknown."),
    };
    let services = if request.preferred_services.is_empty() {
        String::from("No specific service preferences.")
    } else {
        format!("Prefers lots with: {}.", request.preferred_services.join(", "))
    };
    let distance = request
        .max_distance_km
        .map(|km| format!(" Maximum distance from destination: {km} km."))
        .unwrap_or_default();
    let history = request
        .history_summary
        .as_deref()
        .unwrap_or("No recent parking history.");

    format!(
        r#"You are a smart parking assistant. Provide personalized parking recommendations for user {user_id}.

{location}
{destination}
{services}{distance}
Recent behavior: {history}

Nearby parking lots (JSON):
{lots_json}

Evaluate the lots by proximity, current availability, price, offered services and the user's past behavior. Answer with a single JSON object {{"recommendations":[...]}} holding the top 3-5 lots ordered by relevance. Each entry needs "lotId", "lotName" and a specific "reason"; include "estimatedCost" and "availabilityScore" (0 to 1) when you can estimate them.
"#,
        user_id = request.user_id,
    )
}

pub fn predict_prompt(request: &PredictRequest) -> String {
    format!(
        r#"You are an expert in predicting parking availability.

Spot ID: {spot_id}
Historical occupancy: {historical}
Current trends: {trends}

Consider time of day, day of week and any events mentioned in the trends. Answer with a single JSON object with "predictedAvailability" (a number between 0 and 1), "confidence" (low, medium or high) and "factors" (a short sentence naming the main influences).
"#,
        spot_id = request.spot_id,
        historical = request.historical_data,
        trends = request.trends,
    )
}
