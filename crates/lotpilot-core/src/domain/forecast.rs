use std::fmt::{Display, Formatter};
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::ValidationError;

/// Confidence bucket attached to an availability forecast.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Confidence {
    Low,
    Medium,
    High,
}

impl Confidence {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Low => "low",
            Self::Medium => "medium",
            Self::High => "high",
        }
    }
}

impl Display for Confidence {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Confidence {
    type Err = ValidationError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "low" => Ok(Self::Low),
            "medium" => Ok(Self::Medium),
            "high" => Ok(Self::High),
            other => Err(ValidationError::InvalidConfidence {
                value: other.to_owned(),
            }),
        }
    }
}

/// Predicted availability for one parking spot.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AvailabilityForecast {
    #[serde(rename = "predictedAvailability")]
    pub predicted_availability: f64,
    pub confidence: Confidence,
    pub factors: String,
}

impl AvailabilityForecast {
    pub fn new(
        predicted_availability: f64,
        confidence: Confidence,
        factors: impl Into<String>,
    ) -> Result<Self, ValidationError> {
        if !predicted_availability.is_finite() {
            return Err(ValidationError::NonFiniteValue {
                field: "predicted_availability",
            });
        }
        if !(0.0..=1.0).contains(&predicted_availability) {
            return Err(ValidationError::ScoreOutOfRange {
                field: "predicted_availability",
            });
        }

        let factors = factors.into();
        if factors.trim().is_empty() {
            return Err(ValidationError::EmptyField { field: "factors" });
        }

        Ok(Self {
            predicted_availability,
            confidence,
            factors,
        })
    }
}
