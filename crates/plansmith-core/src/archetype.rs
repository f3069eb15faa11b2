//! Goal archetypes and their scheduling priors.
//!
//! Every synthesized goal is classified into one of four archetypes. The
//! archetype selects the valid range and fallback value for session duration
//! (minutes) and weekly frequency (sessions per week). Unknown or missing
//! archetype tags resolve to [`Archetype::SkillAcquisition`].

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// The four fixed goal shapes used to select scheduling priors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Archetype {
    HabitBuilding,
    DeepWorkProject,
    #[default]
    SkillAcquisition,
    Maintenance,
}

/// A `[min, max]` range with the value to use when nothing better is known.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Prior {
    pub min: u32,
    pub max: u32,
    pub fallback: u32,
}

impl Prior {
    const fn new(min: u32, max: u32, fallback: u32) -> Self {
        Self { min, max, fallback }
    }

    /// Clamp a signed value into `[min, max]`.
    pub fn clamp(&self, value: i64) -> u32 {
        value.clamp(i64::from(self.min), i64::from(self.max)) as u32
    }
}

impl Archetype {
    /// All archetypes, in table order.
    pub const ALL: [Archetype; 4] = [
        Archetype::HabitBuilding,
        Archetype::DeepWorkProject,
        Archetype::SkillAcquisition,
        Archetype::Maintenance,
    ];

    /// Resolve an optional, possibly unrecognized tag.
    ///
    /// Never fails: anything that does not name a known archetype maps to
    /// the default ([`Archetype::SkillAcquisition`]).
    pub fn resolve(tag: Option<&str>) -> Self {
        tag.and_then(|t| t.parse().ok()).unwrap_or_default()
    }

    /// Session duration prior, in minutes.
    pub const fn duration(self) -> Prior {
        match self {
            Self::HabitBuilding => Prior::new(20, 70, 35),
            Self::DeepWorkProject => Prior::new(45, 140, 85),
            Self::SkillAcquisition => Prior::new(30, 100, 55),
            Self::Maintenance => Prior::new(20, 75, 40),
        }
    }

    /// Weekly frequency prior, in sessions per week.
    pub const fn frequency(self) -> Prior {
        match self {
            Self::HabitBuilding => Prior::new(4, 7, 5),
            Self::DeepWorkProject => Prior::new(2, 4, 3),
            Self::SkillAcquisition => Prior::new(3, 6, 4),
            Self::Maintenance => Prior::new(1, 4, 2),
        }
    }
}

impl fmt::Display for Archetype {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::HabitBuilding => "habit_building",
            Self::DeepWorkProject => "deep_work_project",
            Self::SkillAcquisition => "skill_acquisition",
            Self::Maintenance => "maintenance",
        };
        f.write_str(s)
    }
}

impl FromStr for Archetype {
    type Err = ArchetypeParseError;

    /// Accepts snake_case, kebab-case or space separated names in any case,
    /// plus the short forms `habit` and `deep_work`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized: String = s
            .trim()
            .chars()
            .map(|c| match c {
                '-' | ' ' => '_',
                other => other.to_ascii_lowercase(),
            })
            .collect();
        match normalized.as_str() {
            "habit_building" | "habit" => Ok(Self::HabitBuilding),
            "deep_work_project" | "deep_work" => Ok(Self::DeepWorkProject),
            "skill_acquisition" | "skill" => Ok(Self::SkillAcquisition),
            "maintenance" => Ok(Self::Maintenance),
            _ => Err(ArchetypeParseError(s.to_owned())),
        }
    }
}

/// Error returned when parsing an invalid [`Archetype`] string.
#[derive(Debug, Clone, thiserror::Error)]
#[error("invalid archetype: {0:?}")]
pub struct ArchetypeParseError(pub String);
