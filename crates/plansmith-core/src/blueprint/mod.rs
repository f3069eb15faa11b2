//! Blueprint wire types and provider-output parsing.
//!
//! [`GoalContext`] and [`UserProfile`] describe what the caller wants
//! planned. [`RawGoalBlueprint`] is one goal as returned by the external
//! planning service, before positional identifiers and schedule parameters
//! are derived.

mod lenient;
pub mod parser;
pub mod types;

pub use parser::parse_blueprint_response;
pub use types::{
    BlueprintRequest, BlueprintResponse, GoalContext, RawGoalBlueprint, RawMilestone, RawPhase,
    RawSubtask, RawTask, SuggestedSchedule, UserProfile,
};
