//! Completion provider trait and request/error types.
//!
//! This module defines the adapter contract (`CompletionProvider`) that all
//! model backends must follow. The contract is deliberately narrow: one call
//! that takes a rendered prompt plus its structured input and either returns
//! the provider's structured output as JSON or fails with a typed error.
//!
//! Error classification is carried by the error itself (`ProviderErrorKind`
//! plus a `retryable` flag) so retry policy never has to inspect message
//! text.

use std::fmt::{Display, Formatter};
use std::future::Future;
use std::pin::Pin;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::ValidationError;

/// Canonical provider identifiers used in envelopes and replies.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProviderId {
    Gemini,
    Scripted,
}

impl ProviderId {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Gemini => "gemini",
            Self::Scripted => "scripted",
        }
    }
}

impl Display for ProviderId {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ProviderId {
    type Err = ValidationError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "gemini" => Ok(Self::Gemini),
            "scripted" => Ok(Self::Scripted),
            other => Err(ValidationError::InvalidProvider {
                value: other.to_owned(),
            }),
        }
    }
}

/// One structured completion request.
///
/// `template` names the prompt template for logging and mock dispatch,
/// `prompt` is the fully rendered text sent to the model, and `input` is the
/// structured payload the template was rendered from.
#[derive(Debug, Clone, PartialEq)]
pub struct CompletionRequest {
    pub template: &'static str,
    pub prompt: String,
    pub input: Value,
}

impl CompletionRequest {
    pub fn new(template: &'static str, prompt: impl Into<String>, input: Value) -> Self {
        Self {
            template,
            prompt: prompt.into(),
            input,
        }
    }
}

/// Provider-level error classification.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProviderErrorKind {
    /// The upstream model is overloaded (HTTP 503 and friends).
    Overloaded,
    /// The caller exceeded the provider's rate limits (HTTP 429).
    RateLimited,
    /// The transport timed out before a response arrived.
    Timeout,
    /// The request itself was rejected as invalid.
    InvalidRequest,
    /// The provider answered, but not with parseable structured output.
    MalformedOutput,
    /// Anything else: transport faults, unexpected statuses, open breaker.
    Internal,
}

/// Structured provider error consumed by the retry controller.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProviderError {
    kind: ProviderErrorKind,
    message: String,
    retryable: bool,
}

impl ProviderError {
    pub fn overloaded(message: impl Into<String>) -> Self {
        Self {
            kind: ProviderErrorKind::Overloaded,
            message: message.into(),
            retryable: true,
        }
    }

    pub fn rate_limited(message: impl Into<String>) -> Self {
        Self {
            kind: ProviderErrorKind::RateLimited,
            message: message.into(),
            retryable: true,
        }
    }

    pub fn timeout(message: impl Into<String>) -> Self {
        Self {
            kind: ProviderErrorKind::Timeout,
            message: message.into(),
            retryable: true,
        }
    }

    pub fn invalid_request(message: impl Into<String>) -> Self {
        Self {
            kind: ProviderErrorKind::InvalidRequest,
            message: message.into(),
            retryable: false,
        }
    }

    pub fn malformed_output(message: impl Into<String>) -> Self {
        Self {
            kind: ProviderErrorKind::MalformedOutput,
            message: message.into(),
            retryable: false,
        }
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self {
            kind: ProviderErrorKind::Internal,
            message: message.into(),
            retryable: false,
        }
    }

    pub const fn kind(&self) -> ProviderErrorKind {
        self.kind
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    /// Whether the retry controller may attempt the call again.
    pub const fn retryable(&self) -> bool {
        self.retryable
    }

    /// Whether this failure should count against the provider's circuit
    /// breaker. Rejected requests and unparseable output say nothing about
    /// upstream health, so they do not trip it.
    pub const fn counts_against_breaker(&self) -> bool {
        !matches!(
            self.kind,
            ProviderErrorKind::InvalidRequest | ProviderErrorKind::MalformedOutput
        )
    }

    pub const fn code(&self) -> &'static str {
        match self.kind {
            ProviderErrorKind::Overloaded => "provider.overloaded",
            ProviderErrorKind::RateLimited => "provider.rate_limited",
            ProviderErrorKind::Timeout => "provider.timeout",
            ProviderErrorKind::InvalidRequest => "provider.invalid_request",
            ProviderErrorKind::MalformedOutput => "provider.malformed_output",
            ProviderErrorKind::Internal => "provider.internal",
        }
    }
}

impl Display for ProviderError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} ({})", self.message, self.code())
    }
}

impl std::error::Error for ProviderError {}

/// Completion provider contract.
///
/// Implementations must be `Send + Sync`; one provider instance is shared
/// across concurrent flow invocations without coordination.
pub trait CompletionProvider: Send + Sync {
    /// Returns the provider identifier for envelopes and logs.
    fn id(&self) -> ProviderId;

    /// Executes one completion call.
    ///
    /// # Errors
    ///
    /// Returns [`ProviderError`] carrying its own transient/fatal
    /// classification; callers decide retry behavior from
    /// [`ProviderError::retryable`] alone.
    fn complete<'a>(
        &'a self,
        request: CompletionRequest,
    ) -> Pin<Box<dyn Future<Output = Result<Value, ProviderError>> + Send + 'a>>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn transient_kinds_are_retryable() {
        assert!(ProviderError::overloaded("503").retryable());
        assert!(ProviderError::rate_limited("429").retryable());
        assert!(ProviderError::timeout("deadline").retryable());
    }

    #[test]
    fn fatal_kinds_are_not_retryable() {
        assert!(!ProviderError::invalid_request("bad prompt").retryable());
        assert!(!ProviderError::malformed_output("not json").retryable());
        assert!(!ProviderError::internal("boom").retryable());
    }

    #[test]
    fn output_failures_do_not_trip_the_breaker() {
        assert!(!ProviderError::malformed_output("not json").counts_against_breaker());
        assert!(ProviderError::overloaded("503").counts_against_breaker());
    }
}
