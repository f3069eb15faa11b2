/// Synthesis configuration.
///
/// The default batch size is fixed at [`SynthesisConfig::DEFAULT_BATCH_SIZE`].
/// Callers that want an override (the CLI reads `PLANSMITH_BATCH_SIZE`) pass
/// it through [`SynthesisConfig::with_batch_size`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SynthesisConfig {
    /// Maximum goal contexts sent to the provider in one call.
    pub batch_size: usize,
}

impl SynthesisConfig {
    pub const DEFAULT_BATCH_SIZE: usize = 3;

    /// Environment variable the CLI reads to override the batch size.
    pub const BATCH_SIZE_ENV: &str = "PLANSMITH_BATCH_SIZE";

    /// Build a config with an explicit batch size. Zero is raised to one.
    pub fn with_batch_size(batch_size: usize) -> Self {
        Self {
            batch_size: batch_size.max(1),
        }
    }
}

impl Default for SynthesisConfig {
    fn default() -> Self {
        Self {
            batch_size: Self::DEFAULT_BATCH_SIZE,
        }
    }
}
