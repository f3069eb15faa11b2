//! `plansmith synthesize`: run the full engine against the configured
//! provider.

use std::path::PathBuf;

use anyhow::{Context, Result, bail};
use tracing::info;

use plansmith_core::{
    BlueprintProvider, GoalContext, PlanSynthesizer, Progress, SynthesisConfig, UserProfile,
};

use crate::config::PlansmithConfig;
use crate::output::{self, OutputFormat};

/// Inputs for one synthesis run.
#[derive(Debug)]
pub struct SynthesizeArgs {
    pub goals: PathBuf,
    pub profile: Option<PathBuf>,
    pub output: Option<PathBuf>,
    pub format: OutputFormat,
}

pub async fn run_synthesize(args: &SynthesizeArgs, config: &PlansmithConfig) -> Result<()> {
    let provider = config.command_provider()?;
    info!(
        provider = provider.command(),
        batch_size = config.synthesis.batch_size,
        "using command provider"
    );
    synthesize_with(provider, config.synthesis.clone(), args).await
}

/// Run synthesis against an already constructed provider.
pub async fn synthesize_with<P: BlueprintProvider>(
    provider: P,
    synthesis: SynthesisConfig,
    args: &SynthesizeArgs,
) -> Result<()> {
    // 1. Load inputs.
    let contexts: Vec<GoalContext> = output::read_json(&args.goals, "goals")?;
    if contexts.is_empty() {
        bail!("goals file {} contains no goals", args.goals.display());
    }
    let profile: UserProfile = match &args.profile {
        Some(path) => output::read_json(path, "profile")?,
        None => UserProfile::default(),
    };

    // 2. Run, logging progress as it arrives.
    info!(
        provider = provider.name(),
        goals = contexts.len(),
        "starting plan synthesis"
    );
    let synthesizer = PlanSynthesizer::with_config(provider, synthesis);
    let reporter = |message: &str, progress: Progress| {
        info!(progress = %progress, "{message}");
    };
    let plan = synthesizer
        .synthesize(&contexts, &profile, Some(&reporter))
        .await
        .context("plan synthesis failed")?;

    // 3. Emit.
    let rendered = output::render(&plan, args.format)?;
    output::emit(&rendered, args.output.as_deref())?;
    info!("{}", plan.summary);
    Ok(())
}
