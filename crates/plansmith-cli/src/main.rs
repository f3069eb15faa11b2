mod config;
mod normalize_cmd;
mod output;
mod synthesize_cmd;

use std::path::PathBuf;

use clap::{CommandFactory, Parser, Subcommand};
use clap_complete::Shell;

use plansmith_core::Archetype;

use config::{CliOverrides, PlansmithConfig};
use output::OutputFormat;

#[derive(Parser)]
#[command(name = "plansmith", about = "Turn goals into schedulable, phased plans")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Write a plansmith config file
    Init {
        /// Program that turns a blueprint request (stdin) into a response (stdout)
        #[arg(long)]
        provider_command: Option<String>,
        /// Overwrite existing config file
        #[arg(long)]
        force: bool,
    },
    /// Synthesize a plan for a list of goals using the configured provider
    Synthesize {
        /// Path to a JSON array of goal contexts
        goals: PathBuf,
        /// Path to a JSON user profile
        #[arg(long)]
        profile: Option<PathBuf>,
        /// Output file path (defaults to stdout)
        #[arg(long)]
        output: Option<PathBuf>,
        /// Output format
        #[arg(long, value_enum, default_value_t = OutputFormat::Json)]
        format: OutputFormat,
        /// Provider command (overrides PLANSMITH_PROVIDER_COMMAND and config file)
        #[arg(long)]
        provider_command: Option<String>,
        /// Argument for the provider command (repeatable)
        #[arg(long = "provider-arg")]
        provider_args: Vec<String>,
        /// Goals per provider call (overrides PLANSMITH_BATCH_SIZE and config file)
        #[arg(long)]
        batch_size: Option<usize>,
    },
    /// Transform a saved provider response without calling the provider
    Normalize {
        /// Path to a blueprint response document
        file: PathBuf,
        /// Output file path (defaults to stdout)
        #[arg(long)]
        output: Option<PathBuf>,
        /// Output format
        #[arg(long, value_enum, default_value_t = OutputFormat::Json)]
        format: OutputFormat,
    },
    /// Show the scheduling priors for each goal archetype
    Archetypes,
    /// Generate shell completions
    Completions {
        /// Target shell
        shell: Shell,
    },
}

/// Execute the `plansmith init` command: write config file.
fn cmd_init(provider_command: Option<String>, force: bool) -> anyhow::Result<()> {
    let path = config::config_path();

    if path.exists() && !force {
        anyhow::bail!(
            "config file already exists at {}\nUse --force to overwrite.",
            path.display()
        );
    }

    let cfg = config::ConfigFile {
        provider: config::ProviderSection {
            command: provider_command.clone(),
            args: Vec::new(),
            timeout_secs: Some(plansmith_core::CommandProvider::DEFAULT_TIMEOUT.as_secs()),
        },
        synthesis: config::SynthesisSection {
            batch_size: Some(plansmith_core::SynthesisConfig::DEFAULT_BATCH_SIZE),
        },
    };

    config::save_config(&cfg)?;

    println!("Config written to {}", path.display());
    match provider_command {
        Some(cmd) => println!("  provider.command = {cmd}"),
        None => {
            println!("  provider.command is not set.");
            println!();
            println!(
                "Edit the file or pass --provider-command before running `plansmith synthesize`."
            );
        }
    }

    Ok(())
}

/// Print the archetype prior table.
fn cmd_archetypes() {
    let name_w = Archetype::ALL
        .iter()
        .map(|a| a.to_string().len())
        .max()
        .unwrap_or(9)
        .max(9);

    println!(
        "{:<name_w$}  {:>15}  {:>8}  {:>13}  {:>8}",
        "ARCHETYPE", "DURATION (MIN)", "FALLBACK", "SESSIONS/WEEK", "FALLBACK"
    );
    for archetype in Archetype::ALL {
        let d = archetype.duration();
        let f = archetype.frequency();
        println!(
            "{:<name_w$}  {:>15}  {:>8}  {:>13}  {:>8}",
            archetype.to_string(),
            format!("{}-{}", d.min, d.max),
            d.fallback,
            format!("{}-{}", f.min, f.max),
            f.fallback
        );
    }
    println!();
    println!("Goals without a recognized archetype use {}.", Archetype::default());
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Init {
            provider_command,
            force,
        } => {
            cmd_init(provider_command, force)?;
        }
        Commands::Synthesize {
            goals,
            profile,
            output,
            format,
            provider_command,
            provider_args,
            batch_size,
        } => {
            let resolved = PlansmithConfig::resolve(&CliOverrides {
                provider_command: provider_command.as_deref(),
                provider_args: &provider_args,
                batch_size,
            })?;
            let args = synthesize_cmd::SynthesizeArgs {
                goals,
                profile,
                output,
                format,
            };
            synthesize_cmd::run_synthesize(&args, &resolved).await?;
        }
        Commands::Normalize {
            file,
            output,
            format,
        } => {
            normalize_cmd::run_normalize(&file, format, output.as_deref())?;
        }
        Commands::Archetypes => cmd_archetypes(),
        Commands::Completions { shell } => {
            clap_complete::generate(
                shell,
                &mut Cli::command(),
                "plansmith",
                &mut std::io::stdout(),
            );
        }
    }

    Ok(())
}

#[cfg(test)]
mod test_util {
    use std::sync::{Mutex, MutexGuard};

    static ENV_LOCK: Mutex<()> = Mutex::new(());

    /// Serialize tests that mutate process environment variables.
    pub fn lock_env() -> MutexGuard<'static, ()> {
        ENV_LOCK.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}
