use lotpilot_flows::{Assistant, PredictRequest};

use crate::cli::PredictArgs;
use crate::error::CliError;

use super::CommandResult;

pub async fn run(args: &PredictArgs, assistant: &Assistant) -> Result<CommandResult, CliError> {
    let request = PredictRequest::new(
        args.spot_id.clone(),
        args.historical.clone(),
        args.trends.clone(),
    )?;

    let reply = assistant.predict(request).await;
    CommandResult::from_reply(reply)
}
