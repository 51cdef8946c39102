//! # Lotpilot Core
//!
//! Provider contracts and resilience primitives for the Lotpilot parking
//! assistant.
//!
//! ## Overview
//!
//! This crate provides the foundational components for Lotpilot:
//!
//! - **Completion provider contract** for model backends (Gemini, scripted)
//! - **Typed provider errors** carrying their own transient/fatal split
//! - **Retry controller** with exponential backoff and jitter
//! - **Circuit breaker** and **admission gate** for resilient upstream calls
//! - **Context-blob parsing** that degrades gracefully on untrusted input
//! - **Domain models** for interpretations, recommendations, and forecasts
//! - **Response envelope** with metadata and structured errors
//!
//! ## Modules
//!
//! | Module | Description |
//! |--------|-------------|
//! | [`admission`] | Rate-quota gate in front of the provider |
//! | [`breaker`] | Circuit breaker for upstream calls |
//! | [`context`] | Untrusted context-blob parsing |
//! | [`domain`] | Domain models (Intent, Recommendation, Forecast, ...) |
//! | [`envelope`] | Response envelope with metadata |
//! | [`error`] | Core error types |
//! | [`http_client`] | HTTP transport abstraction |
//! | [`provider`] | Completion provider trait and typed errors |
//! | [`providers`] | Provider adapters (Gemini, scripted) |
//! | [`retry`] | Bounded retry with backoff |
//! | [`store`] | Injected context storage |
//!
//! ## Error Handling
//!
//! Provider calls return structured errors that classify themselves:
//!
//! ```rust
//! use lotpilot_core::{ProviderError, ProviderErrorKind};
//!
//! fn handle_error(error: ProviderError) {
//!     match error.kind() {
//!         ProviderErrorKind::RateLimited | ProviderErrorKind::Overloaded => {
//!             // Wait and retry
//!         }
//!         ProviderErrorKind::MalformedOutput => {
//!             // Substitute the documented fallback
//!         }
//!         _ => {}
//!     }
//! }
//! ```
//!
//! ## Security
//!
//! - API keys are read from environment variables only (never logged)
//! - Context blobs are treated as untrusted input and validated on parse

pub mod admission;
pub mod breaker;
pub mod context;
pub mod domain;
pub mod envelope;
pub mod error;
pub mod http_client;
pub mod provider;
pub mod providers;
pub mod retry;
pub mod store;

// Re-export commonly used types at crate root for convenience

// Admission gate
pub use admission::{AdmissionGate, AdmissionPolicy};

// Circuit breaker
pub use breaker::{BreakerConfig, BreakerState, CircuitBreaker, CircuitOpen};

// Context parsing
pub use context::{
    bookmarks_from_json, nearby_lots_from_json, parse_optional_json_array, ContextSlice,
    ParsedContext,
};

// Domain models
pub use domain::{
    canonical_lot_id, normalize_spot_id, AvailabilityForecast, Bookmark, CommandEntities,
    CommandInterpretation, Confidence, Intent, NearbyLot, Recommendation, RecommendationSet,
    UtcDateTime,
};

// Envelope types
pub use envelope::{Envelope, EnvelopeError, EnvelopeMeta};

// Error types
pub use error::{CoreError, ValidationError};

// HTTP client types
pub use http_client::{
    HttpAuth, HttpClient, HttpError, HttpMethod, HttpRequest, HttpResponse, NoopHttpClient,
    ReqwestHttpClient,
};

// Provider contract
pub use provider::{
    CompletionProvider, CompletionRequest, ProviderError, ProviderErrorKind, ProviderId,
};

// Provider adapters
pub use providers::{GeminiProvider, ScriptedProvider};

// Retry logic
pub use retry::{run_with_retry, Backoff, RetryOutcome, RetryPolicy};

// Storage
pub use store::{to_context_json, ContextStore, InMemoryStore};
