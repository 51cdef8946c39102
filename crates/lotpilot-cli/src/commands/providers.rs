use serde::Serialize;
use serde_json::Value;

use lotpilot_core::ProviderId;

use crate::cli::Cli;
use crate::error::CliError;

use super::CommandResult;

#[derive(Debug, Serialize)]
struct ProviderStatus {
    id: ProviderId,
    mode: &'static str,
    model: Option<String>,
}

pub fn run(cli: &Cli) -> Result<CommandResult, CliError> {
    let key_configured = super::gemini_api_key().is_some();
    let mode = if cli.mock || !key_configured {
        "mock"
    } else {
        "real"
    };

    let statuses = vec![
        ProviderStatus {
            id: ProviderId::Gemini,
            mode,
            model: Some(cli.model.clone()),
        },
        ProviderStatus {
            id: ProviderId::Scripted,
            mode: "test-only",
            model: None,
        },
    ];

    let data: Value = serde_json::to_value(&statuses)?;
    let mut result = CommandResult::ok(data, vec![ProviderId::Gemini]);
    if mode == "mock" && !cli.mock {
        result = result.with_warning("no API key configured; gemini runs in mock mode");
    }

    Ok(result)
}
