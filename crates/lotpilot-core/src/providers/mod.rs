//! Completion provider adapters.

mod gemini;
mod scripted;

pub use gemini::GeminiProvider;
pub use scripted::ScriptedProvider;
