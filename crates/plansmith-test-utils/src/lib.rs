//! Shared test utilities for plansmith integration tests.
//!
//! Provides scripted and echoing [`BlueprintProvider`] implementations that
//! record every request, plus fixture builders for goal contexts and raw
//! blueprints.

use std::collections::VecDeque;
use std::sync::Mutex;

use async_trait::async_trait;
use serde_json::json;

use plansmith_core::blueprint::{
    BlueprintRequest, BlueprintResponse, GoalContext, RawGoalBlueprint, RawMilestone, RawPhase,
    RawSubtask, RawTask, SuggestedSchedule,
};
use plansmith_core::provider::{BlueprintProvider, ProviderError};

// ---------------------------------------------------------------------------
// Providers
// ---------------------------------------------------------------------------

/// Provider that replays a queue of canned outcomes, one per call.
///
/// Once the queue is empty every further call fails with
/// [`ProviderError::Unavailable`].
#[derive(Default)]
pub struct ScriptedProvider {
    outcomes: Mutex<VecDeque<Result<BlueprintResponse, ProviderError>>>,
    requests: Mutex<Vec<BlueprintRequest>>,
}

impl ScriptedProvider {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue a successful response containing `goals`.
    pub fn then_goals(self, goals: Vec<RawGoalBlueprint>) -> Self {
        self.push(Ok(BlueprintResponse { goals }))
    }

    /// Queue a successful response with no goals.
    pub fn then_empty(self) -> Self {
        self.then_goals(Vec::new())
    }

    /// Queue a provider failure.
    pub fn then_error(self, error: ProviderError) -> Self {
        self.push(Err(error))
    }

    fn push(self, outcome: Result<BlueprintResponse, ProviderError>) -> Self {
        lock(&self.outcomes).push_back(outcome);
        self
    }

    /// Every request received so far, in call order.
    pub fn requests(&self) -> Vec<BlueprintRequest> {
        lock(&self.requests).clone()
    }

    pub fn call_count(&self) -> usize {
        lock(&self.requests).len()
    }
}

#[async_trait]
impl BlueprintProvider for ScriptedProvider {
    fn name(&self) -> &str {
        "scripted"
    }

    async fn generate(
        &self,
        request: &BlueprintRequest,
    ) -> Result<BlueprintResponse, ProviderError> {
        lock(&self.requests).push(request.clone());
        lock(&self.outcomes)
            .pop_front()
            .unwrap_or_else(|| Err(ProviderError::Unavailable("script exhausted".into())))
    }
}

/// Provider that answers every request with one fixture blueprint per
/// goal context, titled after the context.
#[derive(Default)]
pub struct EchoProvider {
    requests: Mutex<Vec<BlueprintRequest>>,
}

impl EchoProvider {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn requests(&self) -> Vec<BlueprintRequest> {
        lock(&self.requests).clone()
    }

    pub fn call_count(&self) -> usize {
        lock(&self.requests).len()
    }
}

#[async_trait]
impl BlueprintProvider for EchoProvider {
    fn name(&self) -> &str {
        "echo"
    }

    async fn generate(
        &self,
        request: &BlueprintRequest,
    ) -> Result<BlueprintResponse, ProviderError> {
        lock(&self.requests).push(request.clone());
        let goals = request
            .goal_contexts
            .iter()
            .map(|ctx| blueprint(&ctx.title, Some("skill_acquisition")))
            .collect();
        Ok(BlueprintResponse { goals })
    }
}

fn lock<T>(mutex: &Mutex<T>) -> std::sync::MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

// ---------------------------------------------------------------------------
// Fixtures
// ---------------------------------------------------------------------------

/// `n` goal contexts titled "Goal 1" .. "Goal n".
pub fn contexts(n: usize) -> Vec<GoalContext> {
    (1..=n).map(|i| GoalContext::new(format!("Goal {i}"))).collect()
}

/// A realistic blueprint: two phases, three milestones, four tasks, and a
/// complete, valid suggested schedule.
pub fn blueprint(title: &str, archetype: Option<&str>) -> RawGoalBlueprint {
    RawGoalBlueprint {
        title: title.to_string(),
        archetype: archetype.map(str::to_string),
        category: "growth".to_string(),
        timeline: "12 weeks".to_string(),
        estimated_weeks: None,
        strategy: format!("Steady weekly progress on {title}."),
        critical_gaps: vec!["Consistent time slot".to_string()],
        behavior_plan: Some(json!({"cue": "after breakfast", "reward": "coffee"})),
        priority_weight: Some(0.7),
        risk_level: Some("medium".to_string()),
        suggested_schedule: Some(SuggestedSchedule {
            duration: Some(50.0),
            frequency: Some(4.0),
            preferred_time: Some("morning".to_string()),
            energy_cost: Some("medium".to_string()),
        }),
        phases: vec![
            RawPhase {
                title: "Foundations".to_string(),
                description: "Set up the basics.".to_string(),
                milestones: vec![
                    milestone(
                        "Get started",
                        vec![task("Research", 2.0, 40.0), task("Set up", 1.0, 30.0)],
                    ),
                    milestone("First results", vec![task("Practice", 3.0, 60.0)]),
                ],
            },
            RawPhase {
                title: "Momentum".to_string(),
                description: "Build on what works.".to_string(),
                milestones: vec![milestone("Stretch", vec![task("Push further", 4.0, 75.0)])],
            },
        ],
    }
}

fn milestone(title: &str, tasks: Vec<RawTask>) -> RawMilestone {
    RawMilestone {
        title: title.to_string(),
        description: String::new(),
        tasks,
    }
}

fn task(title: &str, difficulty: f64, minutes: f64) -> RawTask {
    RawTask {
        title: title.to_string(),
        description: String::new(),
        difficulty: Some(difficulty),
        cognitive_type: Some("focused".to_string()),
        estimated_minutes: Some(minutes),
        subtasks: vec![RawSubtask {
            title: format!("{title}: first step"),
            description: String::new(),
        }],
    }
}

/// One fixture blueprint per title.
pub fn blueprints(titles: &[&str]) -> Vec<RawGoalBlueprint> {
    titles
        .iter()
        .map(|t| blueprint(t, Some("skill_acquisition")))
        .collect()
}
