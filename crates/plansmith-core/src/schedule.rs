//! Schedule parameter normalizer.
//!
//! Blends the provider's suggested schedule with archetype priors and the
//! goal's task statistics, adds deterministic jitter, and clamps the result
//! into the archetype's ranges. Total: every input combination, including
//! "nothing suggested at all", yields an in-range [`ScheduleParams`].

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::archetype::Archetype;
use crate::blueprint::SuggestedSchedule;
use crate::jitter;
use crate::stats::TaskStats;

/// Weight of the provider's duration when blending.
const EXTERNAL_DURATION_WEIGHT: f64 = 0.55;
/// Weight of the provider's frequency when blending.
const EXTERNAL_FREQUENCY_WEIGHT: f64 = 0.6;
/// Durations are rounded to this many minutes.
const DURATION_STEP: f64 = 5.0;

/// Derived scheduling parameters for one goal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScheduleParams {
    /// Session length in minutes; always a multiple of 5.
    pub duration_minutes: u32,
    /// Sessions per week.
    pub frequency_per_week: u32,
    pub preferred_time: PreferredTime,
    pub energy_cost: EnergyCost,
}

// ---------------------------------------------------------------------------
// Enums
// ---------------------------------------------------------------------------

/// Time of day a session should be scheduled.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PreferredTime {
    Morning,
    Afternoon,
    Evening,
}

impl fmt::Display for PreferredTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Morning => "morning",
            Self::Afternoon => "afternoon",
            Self::Evening => "evening",
        };
        f.write_str(s)
    }
}

impl FromStr for PreferredTime {
    type Err = UnknownValue;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "morning" => Ok(Self::Morning),
            "afternoon" => Ok(Self::Afternoon),
            "evening" => Ok(Self::Evening),
            _ => Err(UnknownValue(s.to_owned())),
        }
    }
}

/// How demanding a session is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EnergyCost {
    High,
    Medium,
    Low,
}

impl fmt::Display for EnergyCost {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::High => "high",
            Self::Medium => "medium",
            Self::Low => "low",
        };
        f.write_str(s)
    }
}

impl FromStr for EnergyCost {
    type Err = UnknownValue;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "high" => Ok(Self::High),
            "medium" => Ok(Self::Medium),
            "low" => Ok(Self::Low),
            _ => Err(UnknownValue(s.to_owned())),
        }
    }
}

/// Error returned when a preferred time or energy cost is not recognized.
#[derive(Debug, Clone, thiserror::Error)]
#[error("unrecognized value: {0:?}")]
pub struct UnknownValue(pub String);

// ---------------------------------------------------------------------------
// Normalization
// ---------------------------------------------------------------------------

/// Derive the final schedule for a goal.
///
/// `title` keys the deterministic jitter, so the same goal always lands on
/// the same numbers.
pub fn normalize(
    title: &str,
    archetype: Archetype,
    suggestion: Option<&SuggestedSchedule>,
    stats: &TaskStats,
) -> ScheduleParams {
    let suggestion = suggestion.cloned().unwrap_or_default();

    let params = ScheduleParams {
        duration_minutes: duration(title, archetype, suggestion.duration, stats),
        frequency_per_week: frequency(title, archetype, suggestion.frequency, stats),
        preferred_time: suggestion
            .preferred_time
            .as_deref()
            .and_then(|s| s.parse().ok())
            .unwrap_or_else(|| default_time(archetype)),
        energy_cost: suggestion
            .energy_cost
            .as_deref()
            .and_then(|s| s.parse().ok())
            .unwrap_or_else(|| default_energy(archetype)),
    };

    debug!(
        goal = title,
        archetype = %archetype,
        duration = params.duration_minutes,
        frequency = params.frequency_per_week,
        preferred_time = %params.preferred_time,
        energy_cost = %params.energy_cost,
        "normalized schedule"
    );
    params
}

fn duration(title: &str, archetype: Archetype, external: Option<f64>, stats: &TaskStats) -> u32 {
    let prior = archetype.duration();

    let deterministic = if stats.average_estimated_minutes > 0.0 {
        stats.average_estimated_minutes
    } else {
        f64::from(prior.fallback)
    };

    let blended = match external.filter(|v| v.is_finite()) {
        Some(ext) => {
            EXTERNAL_DURATION_WEIGHT * ext + (1.0 - EXTERNAL_DURATION_WEIGHT) * deterministic
        }
        None => deterministic,
    };

    let jittered = blended + jitter::duration_jitter(title, stats.task_count) as f64;
    let clamped = jittered.clamp(f64::from(prior.min), f64::from(prior.max));
    // Range bounds are multiples of the step, so rounding stays in range.
    ((clamped / DURATION_STEP).round() * DURATION_STEP) as u32
}

fn frequency(title: &str, archetype: Archetype, external: Option<f64>, stats: &TaskStats) -> u32 {
    let prior = archetype.frequency();
    let fallback = f64::from(prior.fallback);

    let base = match external.filter(|v| v.is_finite()) {
        Some(ext) => {
            (EXTERNAL_FREQUENCY_WEIGHT * ext + (1.0 - EXTERNAL_FREQUENCY_WEIGHT) * fallback).round()
                as i64
        }
        None => i64::from(prior.fallback),
    };

    let adjustment = if stats.average_difficulty >= 4.0 {
        -1
    } else if stats.average_difficulty <= 2.0 && stats.task_count >= 8 {
        1
    } else {
        0
    };

    prior.clamp(
        base.saturating_add(jitter::frequency_jitter(title))
            .saturating_add(adjustment),
    )
}

fn default_time(archetype: Archetype) -> PreferredTime {
    match archetype {
        Archetype::DeepWorkProject | Archetype::SkillAcquisition => PreferredTime::Morning,
        Archetype::HabitBuilding | Archetype::Maintenance => PreferredTime::Afternoon,
    }
}

fn default_energy(archetype: Archetype) -> EnergyCost {
    match archetype {
        Archetype::DeepWorkProject => EnergyCost::High,
        Archetype::Maintenance => EnergyCost::Low,
        Archetype::HabitBuilding | Archetype::SkillAcquisition => EnergyCost::Medium,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn suggestion(duration: Option<f64>, frequency: Option<f64>) -> SuggestedSchedule {
        SuggestedSchedule {
            duration,
            frequency,
            preferred_time: None,
            energy_cost: None,
        }
    }

    fn stats(task_count: usize, minutes: f64, difficulty: f64) -> TaskStats {
        TaskStats {
            task_count,
            average_estimated_minutes: minutes,
            average_difficulty: difficulty,
        }
    }

    fn round5(v: f64) -> u32 {
        ((v / 5.0).round() * 5.0) as u32
    }

    #[test]
    fn fallback_only_matches_prior_plus_jitter() {
        let title = "Keep the garden tidy";
        for archetype in Archetype::ALL {
            let params = normalize(title, archetype, None, &TaskStats::default());

            let d = archetype.duration();
            let expected_duration = round5(
                (f64::from(d.fallback) + jitter::duration_jitter(title, 0) as f64)
                    .clamp(f64::from(d.min), f64::from(d.max)),
            );
            assert_eq!(params.duration_minutes, expected_duration, "{archetype}");

            let f = archetype.frequency();
            let expected_frequency =
                f.clamp(i64::from(f.fallback) + jitter::frequency_jitter(title));
            assert_eq!(params.frequency_per_week, expected_frequency, "{archetype}");
        }
    }

    #[test]
    fn outputs_stay_in_range_for_extreme_inputs() {
        let externals = [
            None,
            Some(-500.0),
            Some(0.0),
            Some(1.0),
            Some(37.0),
            Some(10_000.0),
            Some(f64::INFINITY),
            Some(f64::NAN),
            Some(1e300),
        ];
        let task_stats = [
            TaskStats::default(),
            stats(3, 25.0, 1.0),
            stats(12, 0.0, 1.5),
            stats(20, 500.0, 5.0),
            stats(1, 3.0, 4.0),
        ];
        for archetype in Archetype::ALL {
            for (i, ext) in externals.iter().enumerate() {
                for (j, st) in task_stats.iter().enumerate() {
                    let title = format!("goal {i}-{j}");
                    let s = suggestion(*ext, *ext);
                    let params = normalize(&title, archetype, Some(&s), st);

                    let d = archetype.duration();
                    assert_eq!(params.duration_minutes % 5, 0);
                    assert!(
                        (d.min..=d.max).contains(&params.duration_minutes),
                        "{archetype} {ext:?}: duration {}",
                        params.duration_minutes
                    );

                    let f = archetype.frequency();
                    assert!(
                        (f.min..=f.max).contains(&params.frequency_per_week),
                        "{archetype} {ext:?}: frequency {}",
                        params.frequency_per_week
                    );
                }
            }
        }
    }

    #[test]
    fn external_duration_is_blended_not_copied() {
        // Deep work: prior fallback 85, external 125 -> 0.55*125 + 0.45*85 = 107.
        let title = "Write the thesis";
        let params = normalize(
            title,
            Archetype::DeepWorkProject,
            Some(&suggestion(Some(125.0), None)),
            &TaskStats::default(),
        );
        let expected = round5(107.0 + jitter::duration_jitter(title, 0) as f64);
        assert_eq!(params.duration_minutes, expected);
    }

    #[test]
    fn task_average_replaces_fallback_as_prior() {
        let title = "Learn to draw";
        let st = stats(4, 60.0, 3.0);
        let params = normalize(title, Archetype::SkillAcquisition, None, &st);
        let expected = round5(60.0 + jitter::duration_jitter(title, 4) as f64);
        assert_eq!(params.duration_minutes, expected);
    }

    #[test]
    fn external_frequency_is_blended_and_rounded() {
        // Skill: fallback 4, external 6 -> 0.6*6 + 0.4*4 = 5.2 -> 5.
        let title = "Learn Japanese";
        let params = normalize(
            title,
            Archetype::SkillAcquisition,
            Some(&suggestion(None, Some(6.0))),
            &stats(3, 0.0, 3.0),
        );
        let f = Archetype::SkillAcquisition.frequency();
        assert_eq!(
            params.frequency_per_week,
            f.clamp(5 + jitter::frequency_jitter(title))
        );
    }

    #[test]
    fn hard_tasks_reduce_frequency() {
        let title = "Hard goal";
        let easy = normalize(title, Archetype::HabitBuilding, None, &stats(3, 0.0, 3.0));
        let hard = normalize(title, Archetype::HabitBuilding, None, &stats(3, 0.0, 4.5));
        let f = Archetype::HabitBuilding.frequency();
        let base = i64::from(f.fallback) + jitter::frequency_jitter(title);
        assert_eq!(easy.frequency_per_week, f.clamp(base));
        assert_eq!(hard.frequency_per_week, f.clamp(base - 1));
    }

    #[test]
    fn many_easy_tasks_increase_frequency() {
        let title = "Easy goal";
        let f = Archetype::Maintenance.frequency();
        let base = i64::from(f.fallback) + jitter::frequency_jitter(title);

        let few = normalize(title, Archetype::Maintenance, None, &stats(7, 0.0, 1.5));
        let many = normalize(title, Archetype::Maintenance, None, &stats(8, 0.0, 1.5));
        assert_eq!(few.frequency_per_week, f.clamp(base));
        assert_eq!(many.frequency_per_week, f.clamp(base + 1));
    }

    #[test]
    fn recognized_time_and_energy_pass_through() {
        let s = SuggestedSchedule {
            duration: None,
            frequency: None,
            preferred_time: Some("Evening".into()),
            energy_cost: Some("low".into()),
        };
        let params = normalize("x", Archetype::DeepWorkProject, Some(&s), &TaskStats::default());
        assert_eq!(params.preferred_time, PreferredTime::Evening);
        assert_eq!(params.energy_cost, EnergyCost::Low);
    }

    #[test]
    fn unrecognized_time_and_energy_fall_back_per_archetype() {
        let s = SuggestedSchedule {
            duration: None,
            frequency: None,
            preferred_time: Some("midnight".into()),
            energy_cost: Some("extreme".into()),
        };
        let cases = [
            (Archetype::DeepWorkProject, PreferredTime::Morning, EnergyCost::High),
            (Archetype::SkillAcquisition, PreferredTime::Morning, EnergyCost::Medium),
            (Archetype::HabitBuilding, PreferredTime::Afternoon, EnergyCost::Medium),
            (Archetype::Maintenance, PreferredTime::Afternoon, EnergyCost::Low),
        ];
        for (archetype, time, energy) in cases {
            let params = normalize("x", archetype, Some(&s), &TaskStats::default());
            assert_eq!(params.preferred_time, time, "{archetype}");
            assert_eq!(params.energy_cost, energy, "{archetype}");
        }
    }

    #[test]
    fn same_inputs_same_output() {
        let s = suggestion(Some(50.0), Some(3.0));
        let st = stats(6, 45.0, 2.5);
        let a = normalize("Run a marathon", Archetype::HabitBuilding, Some(&s), &st);
        let b = normalize("Run a marathon", Archetype::HabitBuilding, Some(&s), &st);
        assert_eq!(a, b);
    }
}
