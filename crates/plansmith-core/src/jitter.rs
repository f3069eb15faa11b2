//! Deterministic jitter: small, bounded offsets derived from a string hash.
//!
//! The same key always yields the same offset. Nothing here reads the clock,
//! the environment, or any mutable state.

/// Modulus for the rolling hash accumulator.
const HASH_BASE: u64 = 1_000_003;

/// Multiplier for the rolling hash.
const HASH_MULTIPLIER: u64 = 31;

/// Maximum absolute duration offset, in minutes.
pub const DURATION_SPREAD: i64 = 5;

/// Maximum absolute frequency offset, in sessions per week.
pub const FREQUENCY_SPREAD: i64 = 1;

/// Polynomial rolling hash of `key`, reduced modulo [`HASH_BASE`].
fn rolling_hash(key: &str) -> u64 {
    key.chars().fold(0u64, |acc, c| {
        (acc * HASH_MULTIPLIER + u64::from(u32::from(c))) % HASH_BASE
    })
}

/// Map `key` to an integer in `[-spread, spread]`.
pub fn jitter(key: &str, spread: i64) -> i64 {
    if spread <= 0 {
        return 0;
    }
    let width = (2 * spread + 1) as u64;
    (rolling_hash(key) % width) as i64 - spread
}

/// Duration offset for a goal, keyed by title and task count.
pub fn duration_jitter(title: &str, task_count: usize) -> i64 {
    jitter(&format!("{title}:{task_count}"), DURATION_SPREAD)
}

/// Frequency offset for a goal. The key suffix keeps it independent of the
/// duration offset for the same title.
pub fn frequency_jitter(title: &str) -> i64 {
    jitter(&format!("{title}:frequency"), FREQUENCY_SPREAD)
}
