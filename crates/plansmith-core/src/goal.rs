//! Synthesized goal tree: the engine's output shape.
//!
//! Mirrors the raw blueprint tree, but every phase, milestone, task and
//! subtask carries a positional identifier and the goal carries its derived
//! schedule.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::archetype::Archetype;
use crate::schedule::ScheduleParams;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SynthesizedGoal {
    pub title: String,
    /// Resolved archetype (unknown tags become skill acquisition).
    pub archetype: Archetype,
    pub category: String,
    pub timeline: String,
    pub estimated_weeks: u32,
    pub strategy: String,
    pub critical_gaps: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub behavior_plan: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub priority_weight: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub risk_level: Option<String>,
    pub schedule: ScheduleParams,
    pub phases: Vec<Phase>,
}

impl SynthesizedGoal {
    /// Iterate over every task in the goal, in tree order.
    pub fn tasks(&self) -> impl Iterator<Item = &Task> {
        self.phases
            .iter()
            .flat_map(|p| p.milestones.iter())
            .flat_map(|m| m.tasks.iter())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Phase {
    /// `phase-{n}`.
    pub id: String,
    /// 1-based position of the phase within the goal.
    pub number: u32,
    pub title: String,
    pub description: String,
    pub milestones: Vec<Milestone>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Milestone {
    /// `milestone-{phase}-{m}`.
    pub id: String,
    pub title: String,
    pub description: String,
    pub tasks: Vec<Task>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Task {
    /// `task-{phase}-{m}-{t}`.
    pub id: String,
    pub title: String,
    pub description: String,
    /// 1 to 5 when present.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub difficulty: Option<u8>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cognitive_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub estimated_minutes: Option<f64>,
    pub subtasks: Vec<Subtask>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Subtask {
    /// `subtask-{phase}-{m}-{t}-{s}`.
    pub id: String,
    pub title: String,
    pub description: String,
}
