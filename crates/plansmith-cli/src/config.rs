//! Configuration file management for plansmith.
//!
//! Provides a TOML-based config file at `~/.config/plansmith/config.toml`
//! and a resolution chain: CLI flag > env var > config file > default.

use std::path::PathBuf;
use std::time::Duration;

use anyhow::{Context, Result, bail};
use serde::{Deserialize, Serialize};

use plansmith_core::{CommandProvider, SynthesisConfig};

pub const PROVIDER_COMMAND_ENV: &str = "PLANSMITH_PROVIDER_COMMAND";
pub const PROVIDER_TIMEOUT_ENV: &str = "PLANSMITH_PROVIDER_TIMEOUT_SECS";

// -----------------------------------------------------------------------
// Config file types
// -----------------------------------------------------------------------

#[derive(Debug, Default, Serialize, Deserialize)]
pub struct ConfigFile {
    #[serde(default)]
    pub provider: ProviderSection,
    #[serde(default)]
    pub synthesis: SynthesisSection,
}

#[derive(Debug, Default, Serialize, Deserialize)]
pub struct ProviderSection {
    /// Program that reads a blueprint request on stdin and prints a
    /// blueprint response on stdout.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub command: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub args: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timeout_secs: Option<u64>,
}

#[derive(Debug, Default, Serialize, Deserialize)]
pub struct SynthesisSection {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub batch_size: Option<usize>,
}

// -----------------------------------------------------------------------
// Paths
// -----------------------------------------------------------------------

/// Return the plansmith config directory.
///
/// Always uses XDG layout: `$XDG_CONFIG_HOME/plansmith` or
/// `~/.config/plansmith`.
pub fn config_dir() -> PathBuf {
    if let Ok(xdg) = std::env::var("XDG_CONFIG_HOME") {
        return PathBuf::from(xdg).join("plansmith");
    }
    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".config")
        .join("plansmith")
}

/// Return the path to the plansmith config file.
pub fn config_path() -> PathBuf {
    config_dir().join("config.toml")
}

// -----------------------------------------------------------------------
// Read / write
// -----------------------------------------------------------------------

/// Load and parse the config file. `Ok(None)` if it does not exist.
pub fn load_config() -> Result<Option<ConfigFile>> {
    let path = config_path();
    if !path.exists() {
        return Ok(None);
    }
    let contents = std::fs::read_to_string(&path)
        .with_context(|| format!("failed to read config file at {}", path.display()))?;
    let config: ConfigFile = toml::from_str(&contents)
        .with_context(|| format!("failed to parse config file at {}", path.display()))?;
    Ok(Some(config))
}

/// Serialize and write the config file, creating parent dirs as needed.
/// Sets file permissions to 0600 on Unix.
pub fn save_config(config: &ConfigFile) -> Result<()> {
    let path = config_path();
    let dir = config_dir();
    std::fs::create_dir_all(&dir)
        .with_context(|| format!("failed to create config directory {}", dir.display()))?;

    let contents = toml::to_string_pretty(config).context("failed to serialize config")?;
    std::fs::write(&path, &contents)
        .with_context(|| format!("failed to write config file at {}", path.display()))?;

    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        let perms = std::fs::Permissions::from_mode(0o600);
        std::fs::set_permissions(&path, perms)
            .with_context(|| format!("failed to set permissions on {}", path.display()))?;
    }

    Ok(())
}

// -----------------------------------------------------------------------
// Resolved config
// -----------------------------------------------------------------------

/// Values given on the command line, highest priority.
#[derive(Debug, Default)]
pub struct CliOverrides<'a> {
    pub provider_command: Option<&'a str>,
    pub provider_args: &'a [String],
    pub batch_size: Option<usize>,
}

/// How to launch the blueprint provider.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProviderSettings {
    pub command: String,
    pub args: Vec<String>,
    pub timeout: Duration,
}

/// Fully resolved configuration, ready for use.
#[derive(Debug)]
pub struct PlansmithConfig {
    pub provider: Option<ProviderSettings>,
    pub synthesis: SynthesisConfig,
}

impl PlansmithConfig {
    /// Resolve configuration using the chain: CLI flag > env var > config file > default.
    ///
    /// - Provider command: `--provider-command` > `PLANSMITH_PROVIDER_COMMAND` > `provider.command` > none
    /// - Provider args: `--provider-arg` (repeatable) > `provider.args`
    /// - Timeout: `PLANSMITH_PROVIDER_TIMEOUT_SECS` > `provider.timeout_secs` > 300s (0 is rejected)
    /// - Batch size: `--batch-size` > `PLANSMITH_BATCH_SIZE` > `synthesis.batch_size` > 3
    pub fn resolve(cli: &CliOverrides<'_>) -> Result<Self> {
        let file = load_config()?.unwrap_or_default();

        let command = if let Some(cmd) = cli.provider_command {
            Some(cmd.to_string())
        } else if let Ok(cmd) = std::env::var(PROVIDER_COMMAND_ENV) {
            Some(cmd)
        } else {
            file.provider.command.clone()
        };

        let args = if cli.provider_args.is_empty() {
            file.provider.args.clone()
        } else {
            cli.provider_args.to_vec()
        };

        let timeout_secs = match std::env::var(PROVIDER_TIMEOUT_ENV) {
            Ok(raw) => raw
                .trim()
                .parse::<u64>()
                .with_context(|| format!("{PROVIDER_TIMEOUT_ENV} is not a number: {raw:?}"))?,
            Err(_) => file
                .provider
                .timeout_secs
                .unwrap_or(CommandProvider::DEFAULT_TIMEOUT.as_secs()),
        };
        if timeout_secs == 0 {
            bail!(
                "provider timeout must be at least 1 second (check {PROVIDER_TIMEOUT_ENV} and provider.timeout_secs)"
            );
        }

        let provider = command
            .filter(|c| !c.trim().is_empty())
            .map(|command| ProviderSettings {
                command,
                args,
                timeout: Duration::from_secs(timeout_secs),
            });

        let batch_size = if let Some(n) = cli.batch_size {
            n
        } else if let Ok(raw) = std::env::var(SynthesisConfig::BATCH_SIZE_ENV) {
            raw.trim().parse::<usize>().with_context(|| {
                format!("{} is not a number: {raw:?}", SynthesisConfig::BATCH_SIZE_ENV)
            })?
        } else {
            file.synthesis
                .batch_size
                .unwrap_or(SynthesisConfig::DEFAULT_BATCH_SIZE)
        };

        Ok(Self {
            provider,
            synthesis: SynthesisConfig::with_batch_size(batch_size),
        })
    }

    /// Build the command provider, or explain how to configure one.
    pub fn command_provider(&self) -> Result<CommandProvider> {
        let Some(settings) = &self.provider else {
            bail!(
                "no provider command configured; pass --provider-command, set {PROVIDER_COMMAND_ENV}, or run `plansmith init`"
            );
        };
        Ok(CommandProvider::new(&settings.command)
            .with_args(settings.args.iter().cloned())
            .with_timeout(settings.timeout))
    }
}

// -----------------------------------------------------------------------
// Tests
// -----------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    fn lock_env() -> std::sync::MutexGuard<'static, ()> {
        crate::test_util::lock_env()
    }

    /// Point XDG_CONFIG_HOME at a fresh temp dir and clear plansmith env
    /// vars. Returns the temp dir (keep it alive) and the previous XDG value.
    fn isolate() -> (tempfile::TempDir, Option<String>) {
        let tmp = tempfile::TempDir::new().unwrap();
        let orig_xdg = std::env::var("XDG_CONFIG_HOME").ok();
        unsafe { std::env::set_var("XDG_CONFIG_HOME", tmp.path()) };
        unsafe { std::env::remove_var(PROVIDER_COMMAND_ENV) };
        unsafe { std::env::remove_var(PROVIDER_TIMEOUT_ENV) };
        unsafe { std::env::remove_var(SynthesisConfig::BATCH_SIZE_ENV) };
        (tmp, orig_xdg)
    }

    fn restore(orig_xdg: Option<String>) {
        match orig_xdg {
            Some(x) => unsafe { std::env::set_var("XDG_CONFIG_HOME", x) },
            None => unsafe { std::env::remove_var("XDG_CONFIG_HOME") },
        }
        unsafe { std::env::remove_var(PROVIDER_COMMAND_ENV) };
        unsafe { std::env::remove_var(PROVIDER_TIMEOUT_ENV) };
        unsafe { std::env::remove_var(SynthesisConfig::BATCH_SIZE_ENV) };
    }

    fn write_file_config(contents: &str) {
        let dir = config_dir();
        std::fs::create_dir_all(&dir).unwrap();
        std::fs::write(dir.join("config.toml"), contents).unwrap();
    }

    #[test]
    fn defaults_when_nothing_set() {
        let _lock = lock_env();
        let (_tmp, orig) = isolate();

        let config = PlansmithConfig::resolve(&CliOverrides::default());
        restore(orig);

        let config = config.unwrap();
        assert!(config.provider.is_none());
        assert_eq!(config.synthesis.batch_size, SynthesisConfig::DEFAULT_BATCH_SIZE);
        let err = config.command_provider().unwrap_err();
        assert!(
            err.to_string().contains("no provider command configured"),
            "unexpected error: {err}"
        );
    }

    #[test]
    fn config_file_is_used() {
        let _lock = lock_env();
        let (_tmp, orig) = isolate();
        write_file_config(
            r#"
[provider]
command = "planner"
args = ["--model", "large"]
timeout_secs = 45

[synthesis]
batch_size = 5
"#,
        );

        let config = PlansmithConfig::resolve(&CliOverrides::default());
        restore(orig);

        let config = config.unwrap();
        let provider = config.provider.unwrap();
        assert_eq!(provider.command, "planner");
        assert_eq!(provider.args, vec!["--model", "large"]);
        assert_eq!(provider.timeout, Duration::from_secs(45));
        assert_eq!(config.synthesis.batch_size, 5);
    }

    #[test]
    fn env_var_overrides_config_file() {
        let _lock = lock_env();
        let (_tmp, orig) = isolate();
        write_file_config("[provider]\ncommand = \"from-file\"\n\n[synthesis]\nbatch_size = 5\n");
        unsafe { std::env::set_var(PROVIDER_COMMAND_ENV, "from-env") };
        unsafe { std::env::set_var(SynthesisConfig::BATCH_SIZE_ENV, "2") };

        let config = PlansmithConfig::resolve(&CliOverrides::default());
        restore(orig);

        let config = config.unwrap();
        assert_eq!(config.provider.unwrap().command, "from-env");
        assert_eq!(config.synthesis.batch_size, 2);
    }

    #[test]
    fn cli_flag_overrides_all() {
        let _lock = lock_env();
        let (_tmp, orig) = isolate();
        write_file_config("[provider]\ncommand = \"from-file\"\nargs = [\"--file-arg\"]\n");
        unsafe { std::env::set_var(PROVIDER_COMMAND_ENV, "from-env") };
        unsafe { std::env::set_var(SynthesisConfig::BATCH_SIZE_ENV, "2") };

        let args = vec!["--cli-arg".to_string()];
        let config = PlansmithConfig::resolve(&CliOverrides {
            provider_command: Some("from-cli"),
            provider_args: &args,
            batch_size: Some(4),
        });
        restore(orig);

        let config = config.unwrap();
        let provider = config.provider.unwrap();
        assert_eq!(provider.command, "from-cli");
        assert_eq!(provider.args, vec!["--cli-arg"]);
        assert_eq!(config.synthesis.batch_size, 4);
    }

    #[test]
    fn invalid_batch_size_env_is_an_error() {
        let _lock = lock_env();
        let (_tmp, orig) = isolate();
        unsafe { std::env::set_var(SynthesisConfig::BATCH_SIZE_ENV, "lots") };

        let result = PlansmithConfig::resolve(&CliOverrides::default());
        restore(orig);

        let msg = result.unwrap_err().to_string();
        assert!(msg.contains("PLANSMITH_BATCH_SIZE"), "unexpected error: {msg}");
    }

    #[test]
    fn zero_timeout_from_env_is_rejected() {
        let _lock = lock_env();
        let (_tmp, orig) = isolate();
        unsafe { std::env::set_var(PROVIDER_COMMAND_ENV, "planner") };
        unsafe { std::env::set_var(PROVIDER_TIMEOUT_ENV, "0") };

        let result = PlansmithConfig::resolve(&CliOverrides::default());
        restore(orig);

        let msg = result.unwrap_err().to_string();
        assert!(msg.contains("at least 1 second"), "unexpected error: {msg}");
    }

    #[test]
    fn zero_timeout_from_config_file_is_rejected() {
        let _lock = lock_env();
        let (_tmp, orig) = isolate();
        write_file_config("[provider]\ncommand = \"planner\"\ntimeout_secs = 0\n");

        let result = PlansmithConfig::resolve(&CliOverrides::default());
        restore(orig);

        assert!(result.is_err(), "zero timeout should not be accepted");
    }

    #[test]
    fn malformed_config_file_is_an_error() {
        let _lock = lock_env();
        let (_tmp, orig) = isolate();
        write_file_config("[provider\ncommand = ");

        let result = PlansmithConfig::resolve(&CliOverrides::default());
        restore(orig);

        assert!(result.is_err(), "malformed config should not be ignored");
    }

    #[test]
    fn save_and_load_config_roundtrip() {
        let _lock = lock_env();
        let (_tmp, orig) = isolate();

        let original = ConfigFile {
            provider: ProviderSection {
                command: Some("planner".into()),
                args: vec!["--json".into()],
                timeout_secs: Some(60),
            },
            synthesis: SynthesisSection {
                batch_size: Some(4),
            },
        };
        let saved = save_config(&original);
        let loaded = load_config();
        let path = config_path();
        restore(orig);

        saved.unwrap();
        let loaded = loaded.unwrap().expect("config should exist");
        assert_eq!(loaded.provider.command.as_deref(), Some("planner"));
        assert_eq!(loaded.provider.args, vec!["--json"]);
        assert_eq!(loaded.synthesis.batch_size, Some(4));

        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            let meta = std::fs::metadata(&path).unwrap();
            assert_eq!(meta.permissions().mode() & 0o777, 0o600);
        }
        let _ = path;
    }

    #[test]
    fn command_provider_uses_settings() {
        let config = PlansmithConfig {
            provider: Some(ProviderSettings {
                command: "planner".into(),
                args: vec![],
                timeout: Duration::from_secs(9),
            }),
            synthesis: SynthesisConfig::with_batch_size(3),
        };
        let provider = config.command_provider().unwrap();
        assert_eq!(provider.command(), "planner");
        assert_eq!(provider.timeout(), Duration::from_secs(9));
    }

    #[test]
    fn config_path_ends_with_expected_filename() {
        let path = config_path();
        assert!(
            path.ends_with("plansmith/config.toml"),
            "unexpected config path: {}",
            path.display()
        );
    }
}
