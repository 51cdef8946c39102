//! # Lotpilot Flows
//!
//! Flow orchestrators for the Lotpilot parking assistant.
//!
//! Every flow follows the same resilient invocation pipeline: validate the
//! request, parse optional context blobs with graceful degradation, render a
//! prompt, make exactly one retried call to the completion provider, then
//! normalize the structured output or substitute the flow's documented
//! fallback. No flow surfaces an error to its caller; the worst observable
//! outcome is a typed fallback with a displayable message.
//!
//! ## Flows
//!
//! | Flow | Input | Output |
//! |------|-------|--------|
//! | [`Assistant::interpret`] | voice transcript + bookmarks context | [`CommandInterpretation`](lotpilot_core::CommandInterpretation) |
//! | [`Assistant::recommend`] | user context + nearby-lots blob | [`RecommendationSet`](lotpilot_core::RecommendationSet) |
//! | [`Assistant::predict`] | spot id + history + trends | [`AvailabilityForecast`](lotpilot_core::AvailabilityForecast) |
//!
//! ## Example
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use lotpilot_core::GeminiProvider;
//! use lotpilot_flows::{Assistant, InterpretRequest};
//!
//! # async fn demo() {
//! let assistant = Assistant::new(Arc::new(GeminiProvider::mock()));
//! let reply = assistant
//!     .interpret(InterpretRequest::new("Reserve spot C twelve").unwrap())
//!     .await;
//! println!("{}", reply.result.response_text);
//! # }
//! ```

mod assistant;
pub mod interpret;
pub mod normalize;
pub mod predict;
pub mod prompt;
pub mod recommend;
mod reply;

pub use assistant::Assistant;
pub use interpret::InterpretRequest;
pub use normalize::{resolve_bookmark_label, BookmarkMatch};
pub use predict::PredictRequest;
pub use recommend::RecommendRequest;
pub use reply::FlowReply;
