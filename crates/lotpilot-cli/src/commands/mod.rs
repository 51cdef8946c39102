mod interpret;
mod predict;
mod providers;
mod recommend;

use std::sync::Arc;
use std::time::Instant;

use serde_json::Value;
use uuid::Uuid;

use lotpilot_core::{
    Envelope, EnvelopeError, EnvelopeMeta, GeminiProvider, InMemoryStore, ProviderId,
};
use lotpilot_flows::{Assistant, FlowReply};

use crate::cli::{Cli, Command};
use crate::error::CliError;

const SCHEMA_VERSION: &str = "v1.0.0";

pub struct CommandResult {
    pub data: Value,
    pub warnings: Vec<String>,
    pub errors: Vec<EnvelopeError>,
    pub fallback: bool,
    pub provider_chain: Vec<ProviderId>,
}

impl CommandResult {
    pub fn ok(data: Value, provider_chain: Vec<ProviderId>) -> Self {
        Self {
            data,
            warnings: Vec::new(),
            errors: Vec::new(),
            fallback: false,
            provider_chain,
        }
    }

    pub fn from_reply<T: serde::Serialize>(reply: FlowReply<T>) -> Result<Self, CliError> {
        let data = serde_json::to_value(&reply.result)?;

        let errors = if reply.fallback {
            vec![
                EnvelopeError::new("flow.fallback", "live result unavailable; returning fallback")?
                    .with_provider(reply.provider),
            ]
        } else {
            Vec::new()
        };

        Ok(Self {
            data,
            warnings: reply.warnings,
            errors,
            fallback: reply.fallback,
            provider_chain: vec![reply.provider],
        })
    }

    pub fn with_warning(mut self, warning: impl Into<String>) -> Self {
        self.warnings.push(warning.into());
        self
    }
}

pub async fn run(cli: &Cli) -> Result<Envelope<Value>, CliError> {
    let started = Instant::now();
    let store = InMemoryStore::seeded();

    let command_result = match &cli.command {
        Command::Interpret(args) => {
            let (assistant, setup_warning) = build_assistant(cli);
            let result = interpret::run(args, &cli.user, &assistant, &store).await?;
            attach_setup_warning(result, setup_warning)
        }
        Command::Recommend(args) => {
            let (assistant, setup_warning) = build_assistant(cli);
            let result = recommend::run(args, &cli.user, &assistant, &store).await?;
            attach_setup_warning(result, setup_warning)
        }
        Command::Predict(args) => {
            let (assistant, setup_warning) = build_assistant(cli);
            let result = predict::run(args, &assistant).await?;
            attach_setup_warning(result, setup_warning)
        }
        Command::Providers => providers::run(cli)?,
    };

    let mut meta = EnvelopeMeta::new(
        format!("req-{}", Uuid::new_v4()),
        SCHEMA_VERSION,
        command_result.provider_chain.clone(),
        started.elapsed().as_millis() as u64,
        command_result.fallback,
    )?;
    for warning in &command_result.warnings {
        meta.push_warning(warning.clone());
    }

    Ok(Envelope::with_errors(
        meta,
        command_result.data,
        command_result.errors,
    )?)
}

/// Build the assistant for this invocation.
///
/// A real provider needs an API key from `LOTPILOT_GEMINI_API_KEY` (or the
/// conventional `GEMINI_API_KEY`); without one the deterministic mock
/// provider answers and a warning says so.
fn build_assistant(cli: &Cli) -> (Assistant, Option<String>) {
    if cli.mock {
        let provider = GeminiProvider::mock().with_model(cli.model.clone());
        return (Assistant::new(Arc::new(provider)), None);
    }

    match gemini_api_key() {
        Some(api_key) => {
            let provider = GeminiProvider::new(api_key).with_model(cli.model.clone());
            (Assistant::new(Arc::new(provider)), None)
        }
        None => {
            let provider = GeminiProvider::mock().with_model(cli.model.clone());
            (
                Assistant::new(Arc::new(provider)),
                Some(String::from(
                    "no API key configured; answering with the deterministic mock provider",
                )),
            )
        }
    }
}

fn attach_setup_warning(result: CommandResult, warning: Option<String>) -> CommandResult {
    match warning {
        Some(warning) => result.with_warning(warning),
        None => result,
    }
}

pub fn gemini_api_key() -> Option<String> {
    std::env::var("LOTPILOT_GEMINI_API_KEY")
        .or_else(|_| std::env::var("GEMINI_API_KEY"))
        .ok()
        .filter(|key| !key.trim().is_empty())
}
