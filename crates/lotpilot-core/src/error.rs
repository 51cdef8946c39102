use thiserror::Error;

/// Validation and contract errors exposed by `lotpilot-core`.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("invalid intent '{value}', expected one of find_parking, reserve_spot, check_availability, cancel_reservation, get_directions, report_issue, unknown")]
    InvalidIntent { value: String },
    #[error("invalid confidence '{value}', expected one of low, medium, high")]
    InvalidConfidence { value: String },
    #[error("invalid provider '{value}', expected one of gemini, scripted")]
    InvalidProvider { value: String },

    #[error("response text cannot be empty")]
    EmptyResponseText,

    #[error("field '{field}' cannot be empty")]
    EmptyField { field: &'static str },
    #[error("field '{field}' must be finite")]
    NonFiniteValue { field: &'static str },
    #[error("field '{field}' must be within [0, 1]")]
    ScoreOutOfRange { field: &'static str },
    #[error("field '{field}' must be non-negative")]
    NegativeValue { field: &'static str },

    #[error("timestamp must be RFC3339 UTC (suffix Z): '{value}'")]
    TimestampNotUtc { value: String },

    #[error("request_id must be at least 8 characters")]
    InvalidRequestId,
    #[error("schema_version must match vMAJOR.MINOR.PATCH: '{value}'")]
    InvalidSchemaVersion { value: String },
    #[error("provider_chain must contain at least one provider")]
    EmptyProviderChain,

    #[error("error code cannot be empty")]
    EmptyErrorCode,
    #[error("error message cannot be empty")]
    EmptyErrorMessage,
}

/// Top-level error type for core operations.
#[derive(Debug, Error)]
pub enum CoreError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}
