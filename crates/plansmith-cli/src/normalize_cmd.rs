//! `plansmith normalize`: offline transformation of a saved provider
//! response. No provider call and no count contract.

use std::path::Path;

use anyhow::{Context, Result};
use serde::Serialize;

use plansmith_core::{SynthesizedGoal, parse_blueprint_response, transform_goal};

use crate::output::{self, OutputFormat};

#[derive(Debug, Serialize)]
struct Normalized {
    goals: Vec<SynthesizedGoal>,
}

pub fn run_normalize(file: &Path, format: OutputFormat, out: Option<&Path>) -> Result<()> {
    let content = std::fs::read_to_string(file)
        .with_context(|| format!("failed to read blueprint file: {}", file.display()))?;
    let normalized = normalize_str(&content)
        .with_context(|| format!("invalid blueprint file: {}", file.display()))?;
    let rendered = output::render(&normalized, format)?;
    output::emit(&rendered, out)
}

fn normalize_str(content: &str) -> Result<Normalized> {
    let response = parse_blueprint_response(content)?;
    Ok(Normalized {
        goals: response.goals.iter().map(transform_goal).collect(),
    })
}
