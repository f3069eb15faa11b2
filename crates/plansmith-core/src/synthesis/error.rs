use std::fmt;

use thiserror::Error;

use crate::goal::SynthesizedGoal;
use crate::provider::ProviderError;

/// Which provider call a count check applies to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CountScope {
    /// The single call made when every context fits in one batch.
    Plan,
    /// One batch of a multi-batch run. `attempt` is 1 or 2.
    Chunk { chunk: usize, attempt: u8 },
}

impl fmt::Display for CountScope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Plan => f.write_str("plan"),
            Self::Chunk { chunk, attempt: 1 } => write!(f, "batch {chunk}"),
            Self::Chunk { chunk, attempt } => write!(f, "batch {chunk} (attempt {attempt})"),
        }
    }
}

/// Fatal outcomes of a synthesis call. None of them yield partial results.
#[derive(Debug, Error)]
pub enum SynthesisError {
    #[error("no goals returned by the blueprint provider")]
    EmptyBlueprint,

    #[error("{scope}: requested {expected} goals but the provider produced {actual}")]
    CountMismatch {
        scope: CountScope,
        expected: usize,
        actual: usize,
    },

    /// A batch came back empty twice. `completed` holds the goals from
    /// earlier batches, for diagnostics only.
    #[error("batch {chunk} returned no goals, even after a retry")]
    ChunkExhausted {
        chunk: usize,
        completed: Vec<SynthesizedGoal>,
    },

    #[error("no goals were synthesized")]
    NoGoalsSynthesized,

    #[error(transparent)]
    Provider(#[from] ProviderError),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn count_scope_display() {
        assert_eq!(CountScope::Plan.to_string(), "plan");
        assert_eq!(
            CountScope::Chunk { chunk: 2, attempt: 1 }.to_string(),
            "batch 2"
        );
        assert_eq!(
            CountScope::Chunk { chunk: 2, attempt: 2 }.to_string(),
            "batch 2 (attempt 2)"
        );
    }

    #[test]
    fn provider_errors_are_transparent() {
        let err = SynthesisError::from(ProviderError::Unavailable("rate limited".into()));
        assert_eq!(err.to_string(), "provider unavailable: rate limited");
    }
}
