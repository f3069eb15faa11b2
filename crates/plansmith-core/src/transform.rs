//! Goal tree transformer: raw blueprint -> synthesized goal.
//!
//! Walks phases -> milestones -> tasks -> subtasks in the order given and
//! assigns each entity an identifier derived only from its position:
//!
//! ```text
//! phase-{p}
//! milestone-{p}-{m}
//! task-{p}-{m}-{t}
//! subtask-{p}-{m}-{t}-{s}
//! ```
//!
//! All indices are 1-based. Byte-identical input yields byte-identical
//! identifiers, so callers can reference entities before anything is
//! persisted. Once the tree is built, the schedule normalizer fills in the
//! goal's schedule.

use crate::archetype::Archetype;
use crate::blueprint::{RawGoalBlueprint, RawMilestone, RawPhase, RawSubtask, RawTask};
use crate::goal::{Milestone, Phase, Subtask, SynthesizedGoal, Task};
use crate::schedule;
use crate::stats;

/// Used when neither `estimated_weeks` nor the timeline yields a number.
pub const DEFAULT_ESTIMATED_WEEKS: u32 = 24;

/// Transform one raw blueprint into a synthesized goal.
pub fn transform_goal(raw: &RawGoalBlueprint) -> SynthesizedGoal {
    let archetype = Archetype::resolve(raw.archetype.as_deref());

    let phases: Vec<Phase> = raw
        .phases
        .iter()
        .enumerate()
        .map(|(i, phase)| transform_phase(i as u32 + 1, phase))
        .collect();

    let task_stats = stats::aggregate(&phases);
    let schedule = schedule::normalize(
        &raw.title,
        archetype,
        raw.suggested_schedule.as_ref(),
        &task_stats,
    );

    SynthesizedGoal {
        title: raw.title.clone(),
        archetype,
        category: raw.category.clone(),
        timeline: raw.timeline.clone(),
        estimated_weeks: estimated_weeks(raw),
        strategy: raw.strategy.clone(),
        critical_gaps: raw.critical_gaps.clone(),
        behavior_plan: raw.behavior_plan.clone(),
        priority_weight: raw.priority_weight,
        risk_level: raw.risk_level.clone(),
        schedule,
        phases,
    }
}

fn transform_phase(number: u32, raw: &RawPhase) -> Phase {
    Phase {
        id: format!("phase-{number}"),
        number,
        title: raw.title.clone(),
        description: raw.description.clone(),
        milestones: raw
            .milestones
            .iter()
            .enumerate()
            .map(|(m, milestone)| transform_milestone(number, m + 1, milestone))
            .collect(),
    }
}

fn transform_milestone(phase: u32, m: usize, raw: &RawMilestone) -> Milestone {
    let prefix = format!("{phase}-{m}");
    Milestone {
        id: format!("milestone-{prefix}"),
        title: raw.title.clone(),
        description: raw.description.clone(),
        tasks: raw
            .tasks
            .iter()
            .enumerate()
            .map(|(t, task)| transform_task(&format!("{prefix}-{}", t + 1), task))
            .collect(),
    }
}

fn transform_task(position: &str, raw: &RawTask) -> Task {
    Task {
        id: format!("task-{position}"),
        title: raw.title.clone(),
        description: raw.description.clone(),
        difficulty: raw.difficulty.and_then(clamp_difficulty),
        cognitive_type: raw.cognitive_type.clone(),
        estimated_minutes: raw.estimated_minutes,
        subtasks: raw
            .subtasks
            .iter()
            .enumerate()
            .map(|(s, subtask)| transform_subtask(position, s + 1, subtask))
            .collect(),
    }
}

fn transform_subtask(task_position: &str, s: usize, raw: &RawSubtask) -> Subtask {
    Subtask {
        id: format!("subtask-{task_position}-{s}"),
        title: raw.title.clone(),
        description: raw.description.clone(),
    }
}

/// Round and clamp into 1..=5. Non-finite values are dropped.
fn clamp_difficulty(value: f64) -> Option<u8> {
    value
        .is_finite()
        .then(|| value.round().clamp(1.0, 5.0) as u8)
}

fn estimated_weeks(raw: &RawGoalBlueprint) -> u32 {
    raw.estimated_weeks
        .filter(|w| *w > 0.0)
        .map(|w| w.round() as u32)
        .or_else(|| leading_number(&raw.timeline))
        .unwrap_or(DEFAULT_ESTIMATED_WEEKS)
}

/// Parse the run of digits at the start of `text` (after whitespace).
fn leading_number(text: &str) -> Option<u32> {
    let trimmed = text.trim_start();
    let end = trimmed
        .find(|c: char| !c.is_ascii_digit())
        .unwrap_or(trimmed.len());
    trimmed[..end].parse().ok().filter(|n| *n > 0)
}
