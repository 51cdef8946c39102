//! CLI argument definitions for Lotpilot.
//!
//! # Commands
//!
//! | Command | Description |
//! |---------|-------------|
//! | `interpret` | Interpret a transcribed voice command |
//! | `recommend` | Personalized parking recommendations |
//! | `predict` | Predict availability for one spot |
//! | `providers` | List completion providers and their configuration |
//!
//! # Global Options
//!
//! | Option | Default | Description |
//! |--------|---------|-------------|
//! | `--format` | `json` | Output format (json, text) |
//! | `--pretty` | `false` | Pretty-print JSON output |
//! | `--strict` | `false` | Treat warnings as errors (exit code 5) |
//! | `--mock` | `false` | Force the deterministic offline provider |
//! | `--model` | `gemini-2.0-flash` | Model name for the real provider |
//! | `--user` | `user_abc123` | Acting user id for context lookups |

use clap::{Args, Parser, Subcommand, ValueEnum};

/// Lotpilot - AI assistant flows for smart parking
///
/// Interpret voice commands, recommend parking lots and predict spot
/// availability through one resilient model-invocation pipeline. Without an
/// API key (or with `--mock`) a deterministic offline provider answers.
#[derive(Debug, Parser)]
#[command(
    name = "lotpilot",
    author,
    version,
    about = "AI assistant flows for smart parking"
)]
pub struct Cli {
    /// Output format for results.
    #[arg(long, global = true, value_enum, default_value_t = OutputFormat::Json)]
    pub format: OutputFormat,

    /// Pretty-print JSON output with indentation.
    #[arg(long, global = true, default_value_t = false)]
    pub pretty: bool,

    /// Treat warnings and errors as failures (exit code 5).
    #[arg(long, global = true, default_value_t = false)]
    pub strict: bool,

    /// Force the deterministic offline provider even when a key is set.
    #[arg(long, global = true, default_value_t = false)]
    pub mock: bool,

    /// Model name used by the real provider.
    #[arg(long, global = true, default_value = "gemini-2.0-flash")]
    pub model: String,

    /// Acting user id for bookmark/context lookups.
    #[arg(long, global = true, default_value = "user_abc123")]
    pub user: String,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Interpret a transcribed voice command.
    Interpret(InterpretArgs),
    /// Personalized parking recommendations.
    Recommend(RecommendArgs),
    /// Predict availability for one parking spot.
    Predict(PredictArgs),
    /// List completion providers and their configuration.
    Providers,
}

#[derive(Debug, Args)]
pub struct InterpretArgs {
    /// The transcribed command, e.g. "Reserve spot C twelve".
    pub transcript: String,
}

#[derive(Debug, Args)]
pub struct RecommendArgs {
    /// Destination latitude.
    #[arg(long)]
    pub dest_lat: Option<f64>,

    /// Destination longitude.
    #[arg(long)]
    pub dest_lon: Option<f64>,

    /// Preferred lot services (repeatable), e.g. --service "EV Charging".
    #[arg(long = "service")]
    pub services: Vec<String>,

    /// Maximum distance from the destination in kilometers.
    #[arg(long)]
    pub max_distance_km: Option<f64>,
}

#[derive(Debug, Args)]
pub struct PredictArgs {
    /// The spot identifier, e.g. "lot_A-S5".
    pub spot_id: String,

    /// Historical occupancy summary.
    #[arg(long, default_value = "no historical data supplied")]
    pub historical: String,

    /// Current trends (events, weather, time of day).
    #[arg(long, default_value = "no trend data supplied")]
    pub trends: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Single JSON envelope.
    Json,
    /// Human-readable summary.
    Text,
}
