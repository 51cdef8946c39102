use std::fmt::{Display, Formatter};
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::ValidationError;

/// Primary goal extracted from a transcribed voice command.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Intent {
    FindParking,
    ReserveSpot,
    CheckAvailability,
    CancelReservation,
    GetDirections,
    ReportIssue,
    Unknown,
}

impl Intent {
    pub const ALL: [Self; 7] = [
        Self::FindParking,
        Self::ReserveSpot,
        Self::CheckAvailability,
        Self::CancelReservation,
        Self::GetDirections,
        Self::ReportIssue,
        Self::Unknown,
    ];

    pub const fn as_str(self) -> &'static str {
        match self {
            Self::FindParking => "find_parking",
            Self::ReserveSpot => "reserve_spot",
            Self::CheckAvailability => "check_availability",
            Self::CancelReservation => "cancel_reservation",
            Self::GetDirections => "get_directions",
            Self::ReportIssue => "report_issue",
            Self::Unknown => "unknown",
        }
    }
}

impl Display for Intent {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Intent {
    type Err = ValidationError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "find_parking" => Ok(Self::FindParking),
            "reserve_spot" => Ok(Self::ReserveSpot),
            "check_availability" => Ok(Self::CheckAvailability),
            "cancel_reservation" => Ok(Self::CancelReservation),
            "get_directions" => Ok(Self::GetDirections),
            "report_issue" => Ok(Self::ReportIssue),
            "unknown" => Ok(Self::Unknown),
            other => Err(ValidationError::InvalidIntent {
                value: other.to_owned(),
            }),
        }
    }
}

/// Entities extracted alongside an intent.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommandEntities {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub destination: Option<String>,
    #[serde(rename = "spotId", skip_serializing_if = "Option::is_none")]
    pub spot_id: Option<String>,
    #[serde(rename = "locationId", skip_serializing_if = "Option::is_none")]
    pub location_id: Option<String>,
    #[serde(rename = "issueType", skip_serializing_if = "Option::is_none")]
    pub issue_type: Option<String>,
}

impl CommandEntities {
    pub fn is_empty(&self) -> bool {
        self.destination.is_none()
            && self.spot_id.is_none()
            && self.location_id.is_none()
            && self.issue_type.is_none()
    }
}

/// Validated interpretation of one voice command.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommandInterpretation {
    pub intent: Intent,
    pub entities: CommandEntities,
    #[serde(rename = "responseText")]
    pub response_text: String,
}

impl CommandInterpretation {
    pub fn new(
        intent: Intent,
        entities: CommandEntities,
        response_text: impl Into<String>,
    ) -> Result<Self, ValidationError> {
        let response_text = response_text.into();
        if response_text.trim().is_empty() {
            return Err(ValidationError::EmptyResponseText);
        }

        Ok(Self {
            intent,
            entities,
            response_text,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_intent() {
        let intent = Intent::from_str("reserve_spot").expect("must parse");
        assert_eq!(intent, Intent::ReserveSpot);
    }

    #[test]
    fn rejects_invalid_intent() {
        let err = Intent::from_str("order_pizza").expect_err("must fail");
        assert!(matches!(err, ValidationError::InvalidIntent { .. }));
    }

    #[test]
    fn rejects_empty_response_text() {
        let err = CommandInterpretation::new(Intent::Unknown, CommandEntities::default(), "  ")
            .expect_err("must fail");
        assert_eq!(err, ValidationError::EmptyResponseText);
    }
}
