//! Batch orchestrator: turns goal contexts into a synthesized plan.
//!
//! Small requests go to the provider in one call. Larger ones are split
//! into consecutive batches of at most [`SynthesisConfig::batch_size`]
//! contexts, processed strictly one after another so at most one provider
//! call is ever in flight and progress only moves forward.
//!
//! Every contract violation is fatal to the whole call. The only retry is
//! for a batch that came back successfully but empty: it is re-sent once.

pub mod error;

use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::blueprint::{BlueprintRequest, GoalContext, RawGoalBlueprint, UserProfile};
use crate::config::SynthesisConfig;
use crate::goal::SynthesizedGoal;
use crate::progress::{Progress, ProgressReporter};
use crate::provider::BlueprintProvider;
use crate::transform::transform_goal;

pub use error::{CountScope, SynthesisError};

/// Result of a successful synthesis call.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlanSynthesis {
    pub goals: Vec<SynthesizedGoal>,
    pub summary: String,
}

/// Plan synthesizer bound to a provider and configuration.
#[derive(Debug)]
pub struct PlanSynthesizer<P> {
    provider: P,
    config: SynthesisConfig,
}

impl<P: BlueprintProvider> PlanSynthesizer<P> {
    /// Create a synthesizer using [`SynthesisConfig::default`].
    pub fn new(provider: P) -> Self {
        Self::with_config(provider, SynthesisConfig::default())
    }

    pub fn with_config(provider: P, config: SynthesisConfig) -> Self {
        Self { provider, config }
    }

    pub fn config(&self) -> &SynthesisConfig {
        &self.config
    }

    /// Synthesize a plan for `goal_contexts`.
    ///
    /// Returns exactly one synthesized goal per context, or an error.
    pub async fn synthesize(
        &self,
        goal_contexts: &[GoalContext],
        profile: &UserProfile,
        progress: Option<&dyn ProgressReporter>,
    ) -> Result<PlanSynthesis, SynthesisError> {
        let run = Run {
            provider: &self.provider,
            profile,
            progress,
        };
        run.execute(goal_contexts, self.config.batch_size.max(1))
            .await
    }
}

/// Synthesize a plan with the default configuration.
pub async fn synthesize_plan(
    provider: &dyn BlueprintProvider,
    goal_contexts: &[GoalContext],
    profile: &UserProfile,
    progress: Option<&dyn ProgressReporter>,
) -> Result<PlanSynthesis, SynthesisError> {
    PlanSynthesizer::new(provider)
        .synthesize(goal_contexts, profile, progress)
        .await
}

/// State for one synthesis call.
struct Run<'a, P: ?Sized> {
    provider: &'a P,
    profile: &'a UserProfile,
    progress: Option<&'a dyn ProgressReporter>,
}

impl<P: BlueprintProvider + ?Sized> Run<'_, P> {
    async fn execute(
        &self,
        contexts: &[GoalContext],
        batch_size: usize,
    ) -> Result<PlanSynthesis, SynthesisError> {
        if contexts.is_empty() {
            return Err(SynthesisError::NoGoalsSynthesized);
        }

        let goals = if contexts.len() <= batch_size {
            self.single(contexts).await?
        } else {
            self.batched(contexts, batch_size).await?
        };

        if goals.is_empty() {
            return Err(SynthesisError::NoGoalsSynthesized);
        }

        let summary = summarize(&goals);
        info!(goals = goals.len(), "plan synthesized");
        self.report("Plan ready", Progress::Percent(100));
        Ok(PlanSynthesis { goals, summary })
    }

    /// Every context in one provider call.
    async fn single(
        &self,
        contexts: &[GoalContext],
    ) -> Result<Vec<SynthesizedGoal>, SynthesisError> {
        self.report(
            &format!("Generating blueprints for {}", plural(contexts.len(), "goal")),
            Progress::Indeterminate,
        );

        let request = self.request(contexts, None);
        info!(
            provider = self.provider.name(),
            requested = contexts.len(),
            "requesting blueprints"
        );
        let response = self.provider.generate(&request).await?;
        if response.goals.is_empty() {
            return Err(SynthesisError::EmptyBlueprint);
        }

        let goals = transform_all(&response.goals);
        ensure_count(CountScope::Plan, contexts.len(), goals.len())?;
        Ok(goals)
    }

    /// Consecutive batches, one call at a time.
    async fn batched(
        &self,
        contexts: &[GoalContext],
        batch_size: usize,
    ) -> Result<Vec<SynthesizedGoal>, SynthesisError> {
        let total = contexts.len().div_ceil(batch_size);
        let mut goals: Vec<SynthesizedGoal> = Vec::with_capacity(contexts.len());

        for (index, chunk) in contexts.chunks(batch_size).enumerate() {
            let number = index + 1;
            let first = index * batch_size + 1;
            let last = first + chunk.len() - 1;

            self.report(
                &format!("Planning goals {first}-{last} of {}", contexts.len()),
                Progress::percent((10 + index * 80 / total) as u32),
            );

            let context_line = format!(
                "Batch {number} of {total}: return exactly {} for the goals listed, in order.",
                plural(chunk.len(), "goal")
            );
            let request = self.request(chunk, Some(context_line));

            info!(
                provider = self.provider.name(),
                chunk = number,
                requested = chunk.len(),
                "requesting blueprints for batch"
            );
            let mut attempt: u8 = 1;
            let mut response = self.provider.generate(&request).await?;

            if response.goals.is_empty() {
                warn!(chunk = number, "provider returned no goals for batch, retrying once");
                self.report(
                    &format!("Retrying batch {number} of {total}"),
                    Progress::Indeterminate,
                );
                attempt = 2;
                response = self.provider.generate(&request).await?;
                if response.goals.is_empty() {
                    return Err(SynthesisError::ChunkExhausted {
                        chunk: number,
                        completed: goals,
                    });
                }
            }

            let transformed = transform_all(&response.goals);
            ensure_count(
                CountScope::Chunk {
                    chunk: number,
                    attempt,
                },
                chunk.len(),
                transformed.len(),
            )?;

            info!(
                chunk = number,
                returned = transformed.len(),
                "batch synthesized"
            );
            goals.extend(transformed);
        }

        Ok(goals)
    }

    fn request(
        &self,
        contexts: &[GoalContext],
        additional_context: Option<String>,
    ) -> BlueprintRequest {
        BlueprintRequest {
            goal_contexts: contexts.to_vec(),
            profile: self.profile.clone(),
            additional_context,
        }
    }

    fn report(&self, message: &str, progress: Progress) {
        if let Some(reporter) = self.progress {
            reporter.report(message, progress);
        }
    }
}

fn transform_all(raw: &[RawGoalBlueprint]) -> Vec<SynthesizedGoal> {
    raw.iter().map(transform_goal).collect()
}

fn ensure_count(scope: CountScope, expected: usize, actual: usize) -> Result<(), SynthesisError> {
    if expected != actual {
        return Err(SynthesisError::CountMismatch {
            scope,
            expected,
            actual,
        });
    }
    Ok(())
}

fn summarize(goals: &[SynthesizedGoal]) -> String {
    let phases: usize = goals.iter().map(|g| g.phases.len()).sum();
    let tasks: usize = goals.iter().map(|g| g.tasks().count()).sum();
    format!(
        "Synthesized a plan for {} spanning {} and {}.",
        plural(goals.len(), "goal"),
        plural(phases, "phase"),
        plural(tasks, "task")
    )
}

fn plural(n: usize, noun: &str) -> String {
    if n == 1 {
        format!("{n} {noun}")
    } else {
        format!("{n} {noun}s")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn plural_forms() {
        assert_eq!(plural(1, "goal"), "1 goal");
        assert_eq!(plural(0, "task"), "0 tasks");
        assert_eq!(plural(7, "phase"), "7 phases");
    }

    #[test]
    fn ensure_count_reports_scope() {
        let err = ensure_count(CountScope::Chunk { chunk: 3, attempt: 1 }, 3, 2).unwrap_err();
        assert_eq!(
            err.to_string(),
            "batch 3: requested 3 goals but the provider produced 2"
        );
        assert!(ensure_count(CountScope::Plan, 2, 2).is_ok());
    }

    #[test]
    fn summary_counts_goals_phases_tasks() {
        let raw = RawGoalBlueprint {
            title: "Learn chess".into(),
            phases: vec![crate::blueprint::RawPhase {
                title: "Openings".into(),
                milestones: vec![crate::blueprint::RawMilestone {
                    title: "Italian".into(),
                    tasks: vec![
                        crate::blueprint::RawTask {
                            title: "Study".into(),
                            ..Default::default()
                        },
                        crate::blueprint::RawTask {
                            title: "Play".into(),
                            ..Default::default()
                        },
                    ],
                    ..Default::default()
                }],
                ..Default::default()
            }],
            ..Default::default()
        };
        let goals = transform_all(&[raw]);
        assert_eq!(
            summarize(&goals),
            "Synthesized a plan for 1 goal spanning 1 phase and 2 tasks."
        );
    }
}
