//! Serde types exchanged with the blueprint provider.
//!
//! Requests are built by the synthesizer; responses are produced by the
//! external planning service and are read leniently (see
//! [`super::parser`]).

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::lenient;

// ---------------------------------------------------------------------------
// Caller input
// ---------------------------------------------------------------------------

/// One goal the user wants planned.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GoalContext {
    /// The goal as the user phrased it.
    pub title: String,
    /// Prerequisites the user says they have already completed.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub completed_prerequisites: Vec<String>,
    /// Prerequisites the user chose to skip.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub skipped_prerequisites: Vec<String>,
    /// Free-text notes.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    /// Structured intake answers, keyed by question id.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub intake_answers: BTreeMap<String, Value>,
}

impl GoalContext {
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            ..Self::default()
        }
    }
}

/// Who the plan is for. Forwarded to the provider untouched.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct UserProfile {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub display_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub role: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bio: Option<String>,
    /// Self-reported chronotype (e.g. "early bird").
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub chronotype: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub weekly_hours_available: Option<f64>,
}

// ---------------------------------------------------------------------------
// Provider exchange
// ---------------------------------------------------------------------------

/// A single call to the blueprint provider.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BlueprintRequest {
    pub goal_contexts: Vec<GoalContext>,
    pub profile: UserProfile,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub additional_context: Option<String>,
}

/// The provider's answer: zero or more raw goal blueprints.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BlueprintResponse {
    #[serde(default)]
    pub goals: Vec<RawGoalBlueprint>,
}

/// One goal as generated by the provider.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RawGoalBlueprint {
    #[serde(default)]
    pub title: String,
    /// Archetype tag. Unknown values are kept and resolved later.
    #[serde(default, deserialize_with = "lenient::string")]
    pub archetype: Option<String>,
    #[serde(default)]
    pub category: String,
    /// Free-text timeline, e.g. "12 weeks".
    #[serde(default)]
    pub timeline: String,
    #[serde(default, deserialize_with = "lenient::number")]
    pub estimated_weeks: Option<f64>,
    /// Strategy narrative.
    #[serde(default, alias = "strategy_overview")]
    pub strategy: String,
    #[serde(default)]
    pub critical_gaps: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub behavior_plan: Option<Value>,
    #[serde(default, deserialize_with = "lenient::number")]
    pub priority_weight: Option<f64>,
    #[serde(default, deserialize_with = "lenient::string")]
    pub risk_level: Option<String>,
    #[serde(default)]
    pub suggested_schedule: Option<SuggestedSchedule>,
    #[serde(default)]
    pub phases: Vec<RawPhase>,
}

/// The provider's scheduling suggestion. Any field may be missing or junk.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SuggestedSchedule {
    /// Session length in minutes.
    #[serde(default, deserialize_with = "lenient::number")]
    pub duration: Option<f64>,
    /// Sessions per week.
    #[serde(default, deserialize_with = "lenient::number")]
    pub frequency: Option<f64>,
    #[serde(default, deserialize_with = "lenient::string")]
    pub preferred_time: Option<String>,
    #[serde(default, deserialize_with = "lenient::string")]
    pub energy_cost: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RawPhase {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub milestones: Vec<RawMilestone>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RawMilestone {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub tasks: Vec<RawTask>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RawTask {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub description: String,
    /// Difficulty on a 1-5 scale; clamped during transformation.
    #[serde(default, deserialize_with = "lenient::number")]
    pub difficulty: Option<f64>,
    #[serde(default, deserialize_with = "lenient::string")]
    pub cognitive_type: Option<String>,
    #[serde(default, deserialize_with = "lenient::number")]
    pub estimated_minutes: Option<f64>,
    #[serde(default)]
    pub subtasks: Vec<RawSubtask>,
}

/// A subtask. Providers send either a bare title string or an object.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(from = "SubtaskRepr")]
pub struct RawSubtask {
    pub title: String,
    pub description: String,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum SubtaskRepr {
    Title(String),
    Full {
        #[serde(default)]
        title: String,
        #[serde(default)]
        description: String,
    },
}

impl From<SubtaskRepr> for RawSubtask {
    fn from(repr: SubtaskRepr) -> Self {
        match repr {
            SubtaskRepr::Title(title) => Self {
                title,
                description: String::new(),
            },
            SubtaskRepr::Full { title, description } => Self { title, description },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn deserialize_minimal_goal() {
        let goal: RawGoalBlueprint = serde_json::from_str(r#"{"title": "Run a 10k"}"#).unwrap();
        assert_eq!(goal.title, "Run a 10k");
        assert!(goal.archetype.is_none());
        assert!(goal.suggested_schedule.is_none());
        assert!(goal.phases.is_empty());
    }

    #[test]
    fn subtasks_accept_strings_and_objects() {
        let task: RawTask = serde_json::from_str(
            r#"{
                "title": "Set up",
                "subtasks": ["Buy shoes", {"title": "Pick a route", "description": "5km loop"}]
            }"#,
        )
        .unwrap();
        assert_eq!(task.subtasks.len(), 2);
        assert_eq!(task.subtasks[0].title, "Buy shoes");
        assert_eq!(task.subtasks[1].description, "5km loop");
    }

    #[test]
    fn junk_schedule_fields_are_dropped() {
        let schedule: SuggestedSchedule = serde_json::from_str(
            r#"{"duration": "about an hour", "frequency": "3", "preferred_time": 9}"#,
        )
        .unwrap();
        assert_eq!(schedule.duration, None);
        assert_eq!(schedule.frequency, Some(3.0));
        assert_eq!(schedule.preferred_time, None);
    }

    #[test]
    fn strategy_overview_alias() {
        let goal: RawGoalBlueprint =
            serde_json::from_str(r#"{"title": "x", "strategy_overview": "go slow"}"#).unwrap();
        assert_eq!(goal.strategy, "go slow");
    }

    #[test]
    fn goal_context_skips_empty_fields_when_serialized() {
        let json = serde_json::to_value(GoalContext::new("Learn piano")).unwrap();
        assert_eq!(json, serde_json::json!({"title": "Learn piano"}));
    }
}
