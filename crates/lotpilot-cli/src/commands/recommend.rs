use lotpilot_core::{to_context_json, ContextStore, InMemoryStore};
use lotpilot_flows::{Assistant, RecommendRequest};

use crate::cli::RecommendArgs;
use crate::error::CliError;

use super::CommandResult;

pub async fn run(
    args: &RecommendArgs,
    user_id: &str,
    assistant: &Assistant,
    store: &InMemoryStore,
) -> Result<CommandResult, CliError> {
    let lots = store.nearby_lots();
    let lots_json = to_context_json(&lots).map_err(|e| CliError::Command(e.to_string()))?;

    let mut request = RecommendRequest::new(user_id)?
        .with_nearby_lots_json(lots_json)
        .with_history_summary("prefers covered parking close to the destination");

    if let (Some(lat), Some(lon)) = (args.dest_lat, args.dest_lon) {
        request = request.with_destination(lat, lon);
    }
    if !args.services.is_empty() {
        request = request.with_preferred_services(args.services.clone());
    }
    if let Some(km) = args.max_distance_km {
        request = request.with_max_distance_km(km);
    }

    let reply = assistant.recommend(request).await;
    CommandResult::from_reply(reply)
}
