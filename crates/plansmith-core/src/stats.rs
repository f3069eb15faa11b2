//! Task statistics: the task-derived signal fed into schedule blending.

use serde::Serialize;

use crate::goal::Phase;

/// Counts and averages over every task of a goal.
///
/// Averages only consider tasks carrying a finite, positive value; tasks
/// without one are left out of both numerator and denominator. An average
/// with no qualifying tasks is `0.0`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct TaskStats {
    pub task_count: usize,
    pub average_estimated_minutes: f64,
    pub average_difficulty: f64,
}

/// Aggregate statistics across phases -> milestones -> tasks.
pub fn aggregate(phases: &[Phase]) -> TaskStats {
    let tasks = phases
        .iter()
        .flat_map(|p| p.milestones.iter())
        .flat_map(|m| m.tasks.iter());

    let mut task_count = 0;
    let mut minutes = Mean::default();
    let mut difficulty = Mean::default();
    for task in tasks {
        task_count += 1;
        minutes.push(task.estimated_minutes);
        difficulty.push(task.difficulty.map(f64::from));
    }

    TaskStats {
        task_count,
        average_estimated_minutes: minutes.value(),
        average_difficulty: difficulty.value(),
    }
}

/// Running mean over usable samples.
#[derive(Default)]
struct Mean {
    sum: f64,
    count: usize,
}

impl Mean {
    fn push(&mut self, sample: Option<f64>) {
        if let Some(v) = sample.filter(|v| v.is_finite() && *v > 0.0) {
            self.sum += v;
            self.count += 1;
        }
    }

    fn value(&self) -> f64 {
        if self.count == 0 {
            0.0
        } else {
            self.sum / self.count as f64
        }
    }
}
