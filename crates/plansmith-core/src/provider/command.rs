//! Subprocess-backed blueprint provider.
//!
//! Runs an external program, writes the [`BlueprintRequest`] to its stdin as
//! JSON, and parses a [`BlueprintResponse`] from its stdout. The program is
//! killed if it outlives the configured timeout.

use std::process::Stdio;
use std::time::Duration;

use async_trait::async_trait;
use tokio::io::AsyncWriteExt;
use tokio::process::Command;
use tracing::{debug, warn};

use super::error::ProviderError;
use super::trait_def::BlueprintProvider;
use crate::blueprint::{BlueprintRequest, BlueprintResponse, parse_blueprint_response};

/// Provider that shells out to a planning command.
#[derive(Debug, Clone)]
pub struct CommandProvider {
    command: String,
    args: Vec<String>,
    timeout: Duration,
}

impl CommandProvider {
    /// Default wall-clock limit for one provider call.
    pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(300);

    /// Create a provider for `command` (resolved via `$PATH`) with no
    /// arguments and the default timeout.
    pub fn new(command: impl Into<String>) -> Self {
        Self {
            command: command.into(),
            args: Vec::new(),
            timeout: Self::DEFAULT_TIMEOUT,
        }
    }

    pub fn with_args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.args = args.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn command(&self) -> &str {
        &self.command
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }
}

#[async_trait]
impl BlueprintProvider for CommandProvider {
    fn name(&self) -> &str {
        &self.command
    }

    async fn generate(
        &self,
        request: &BlueprintRequest,
    ) -> Result<BlueprintResponse, ProviderError> {
        let payload = serde_json::to_vec(request).map_err(|e| {
            ProviderError::Io(std::io::Error::new(std::io::ErrorKind::InvalidData, e))
        })?;

        let mut child = Command::new(&self.command)
            .args(&self.args)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()
            .map_err(|source| ProviderError::Spawn {
                command: self.command.clone(),
                source,
            })?;

        let mut stdin = child
            .stdin
            .take()
            .ok_or_else(|| ProviderError::Unavailable("provider stdin was not captured".into()))?;

        debug!(
            command = %self.command,
            contexts = request.goal_contexts.len(),
            bytes = payload.len(),
            "sending blueprint request"
        );

        // Feed stdin while collecting output so a chatty child cannot
        // deadlock against a full pipe.
        let write = async move {
            let result = stdin.write_all(&payload).await;
            drop(stdin);
            result
        };
        let run = async { tokio::join!(write, child.wait_with_output()) };

        let (write_result, output) = tokio::time::timeout(self.timeout, run)
            .await
            .map_err(|_| ProviderError::Timeout(self.timeout))?;

        if let Err(e) = write_result {
            if e.kind() == std::io::ErrorKind::BrokenPipe {
                warn!(command = %self.command, "provider closed stdin before reading the request");
            } else {
                return Err(ProviderError::Io(e));
            }
        }

        let output = output?;
        let stderr = String::from_utf8_lossy(&output.stderr).trim().to_string();

        if !output.status.success() {
            return Err(ProviderError::Exit {
                status: output.status.to_string(),
                stderr,
            });
        }
        if !stderr.is_empty() {
            warn!(command = %self.command, stderr = %stderr, "provider wrote to stderr");
        }

        let stdout = String::from_utf8_lossy(&output.stdout);
        parse_blueprint_response(&stdout)
    }
}
