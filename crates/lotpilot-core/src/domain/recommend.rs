use serde::{Deserialize, Serialize};

use crate::ValidationError;

/// One personalized parking recommendation.
///
/// Construction enforces the invariants the provider is asked for but cannot
/// be trusted to honor: non-empty identifier, name, and justification, and a
/// predicted-availability score inside [0, 1] when present.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Recommendation {
    #[serde(rename = "lotId")]
    pub lot_id: String,
    #[serde(rename = "lotName")]
    pub lot_name: String,
    pub reason: String,
    #[serde(rename = "estimatedCost", skip_serializing_if = "Option::is_none")]
    pub estimated_cost: Option<f64>,
    #[serde(rename = "availabilityScore", skip_serializing_if = "Option::is_none")]
    pub availability_score: Option<f64>,
}

impl Recommendation {
    pub fn new(
        lot_id: impl Into<String>,
        lot_name: impl Into<String>,
        reason: impl Into<String>,
        estimated_cost: Option<f64>,
        availability_score: Option<f64>,
    ) -> Result<Self, ValidationError> {
        let lot_id = lot_id.into();
        let lot_name = lot_name.into();
        let reason = reason.into();

        if lot_id.trim().is_empty() {
            return Err(ValidationError::EmptyField { field: "lot_id" });
        }
        if lot_name.trim().is_empty() {
            return Err(ValidationError::EmptyField { field: "lot_name" });
        }
        if reason.trim().is_empty() {
            return Err(ValidationError::EmptyField { field: "reason" });
        }

        if let Some(cost) = estimated_cost {
            if !cost.is_finite() {
                return Err(ValidationError::NonFiniteValue {
                    field: "estimated_cost",
                });
            }
            if cost < 0.0 {
                return Err(ValidationError::NegativeValue {
                    field: "estimated_cost",
                });
            }
        }

        if let Some(score) = availability_score {
            if !score.is_finite() {
                return Err(ValidationError::NonFiniteValue {
                    field: "availability_score",
                });
            }
            if !(0.0..=1.0).contains(&score) {
                return Err(ValidationError::ScoreOutOfRange {
                    field: "availability_score",
                });
            }
        }

        Ok(Self {
            lot_id,
            lot_name,
            reason,
            estimated_cost,
            availability_score,
        })
    }
}

/// Ordered recommendation list returned by the recommendation flow.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RecommendationSet {
    pub recommendations: Vec<Recommendation>,
}

impl RecommendationSet {
    pub fn new(recommendations: Vec<Recommendation>) -> Self {
        Self { recommendations }
    }

    /// The documented fallback: an empty list.
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.recommendations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.recommendations.is_empty()
    }
}
