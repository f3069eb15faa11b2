use std::time::Duration;

use thiserror::Error;

/// Failures surfaced by a [`super::BlueprintProvider`].
#[derive(Debug, Error)]
pub enum ProviderError {
    #[error("failed to start provider command {command:?}: {source}")]
    Spawn {
        command: String,
        #[source]
        source: std::io::Error,
    },

    #[error("provider I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("provider did not answer within {0:?}")]
    Timeout(Duration),

    #[error("provider exited with {status}: {stderr}")]
    Exit { status: String, stderr: String },

    #[error("provider returned malformed JSON: {0}")]
    Malformed(String),

    #[error("provider output violates the blueprint contract: {0}")]
    Contract(String),

    #[error("provider unavailable: {0}")]
    Unavailable(String),
}
