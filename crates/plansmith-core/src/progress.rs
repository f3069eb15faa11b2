//! Advisory progress reporting.
//!
//! Reports are fire-and-forget: they never influence control flow.

use std::fmt;

/// How far along a synthesis call is.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Progress {
    /// Percentage in `0..=100`.
    Percent(u8),
    /// Leave whatever progress the UI is currently showing alone.
    Indeterminate,
}

impl Progress {
    /// Percentage clamped to 100.
    pub fn percent(value: u32) -> Self {
        Self::Percent(value.min(100) as u8)
    }
}

impl fmt::Display for Progress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Percent(p) => write!(f, "{p}%"),
            Self::Indeterminate => f.write_str("..."),
        }
    }
}

/// Receiver for progress messages.
pub trait ProgressReporter: Send + Sync {
    fn report(&self, message: &str, progress: Progress);
}

impl<F> ProgressReporter for F
where
    F: Fn(&str, Progress) + Send + Sync,
{
    fn report(&self, message: &str, progress: Progress) {
        self(message, progress)
    }
}
