//! Plan synthesis engine.
//!
//! Turns a list of user goals into fully structured, schedulable plans
//! (phases -> milestones -> tasks -> subtasks) by calling an external
//! blueprint provider in batches, validating its output, and deriving
//! stable scheduling parameters for every goal.
//!
//! ```text
//! synthesize_plan
//!     |
//!     v
//! BlueprintProvider --> transform_goal (per goal)
//!                            |
//!                            v
//!                       schedule::normalize
//!                       (archetype priors + task stats + jitter)
//! ```

pub mod archetype;
pub mod blueprint;
pub mod config;
pub mod goal;
pub mod jitter;
pub mod progress;
pub mod provider;
pub mod schedule;
pub mod stats;
pub mod synthesis;
pub mod transform;

pub use archetype::{Archetype, Prior};
pub use blueprint::{
    BlueprintRequest, BlueprintResponse, GoalContext, RawGoalBlueprint, SuggestedSchedule,
    UserProfile, parse_blueprint_response,
};
pub use config::SynthesisConfig;
pub use goal::{Milestone, Phase, Subtask, SynthesizedGoal, Task};
pub use progress::{Progress, ProgressReporter};
pub use provider::{BlueprintProvider, CommandProvider, ProviderError};
pub use schedule::{EnergyCost, PreferredTime, ScheduleParams};
pub use stats::TaskStats;
pub use synthesis::{CountScope, PlanSynthesis, PlanSynthesizer, SynthesisError, synthesize_plan};
pub use transform::transform_goal;
