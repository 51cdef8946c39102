//! Domain models for the parking assistant flows.

mod forecast;
mod intent;
mod location;
mod places;
mod recommend;
mod timestamp;

pub use forecast::{AvailabilityForecast, Confidence};
pub use intent::{CommandEntities, CommandInterpretation, Intent};
pub use location::{canonical_lot_id, normalize_spot_id};
pub use places::{Bookmark, NearbyLot};
pub use recommend::{Recommendation, RecommendationSet};
pub use timestamp::UtcDateTime;
