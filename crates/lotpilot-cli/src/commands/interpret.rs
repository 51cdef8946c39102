use lotpilot_core::{to_context_json, ContextStore, InMemoryStore};
use lotpilot_flows::{Assistant, InterpretRequest};

use crate::cli::InterpretArgs;
use crate::error::CliError;

use super::CommandResult;

pub async fn run(
    args: &InterpretArgs,
    user_id: &str,
    assistant: &Assistant,
    store: &InMemoryStore,
) -> Result<CommandResult, CliError> {
    let bookmarks = store.bookmarks_for(user_id);
    let bookmarks_json =
        to_context_json(&bookmarks).map_err(|e| CliError::Command(e.to_string()))?;

    let request =
        InterpretRequest::new(args.transcript.clone())?.with_bookmarks_json(bookmarks_json);

    let reply = assistant.interpret(request).await;
    CommandResult::from_reply(reply)
}
