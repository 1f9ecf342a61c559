//! Seed list handling
use anyhow::{Context, Result};

/// Seed used when the caller gives none.
pub const DEFAULT_SEED: u64 = 1337;

/// Turn raw seed inputs into a deduplicated list, preserving order.
/// Blank entries are skipped, negative numbers map to their magnitude,
/// anything non-numeric is an error.
///
/// # Errors
///
/// Returns an error when an entry does not parse as a number.
pub fn resolve_seed_inputs(inputs: &[String]) -> Result<Vec<u64>> {
    let mut seeds = Vec::new();

    for raw in inputs {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            continue;
        }
        let seed = trimmed
            .parse::<u64>()
            .or_else(|_| trimmed.parse::<i64>().map(i64::unsigned_abs))
            .with_context(|| format!("seed {trimmed:?} is not a number"))?;
        if !seeds.contains(&seed) {
            seeds.push(seed);
        }
    }

    if seeds.is_empty() {
        seeds.push(DEFAULT_SEED);
    }

    log::debug!("resolved {} seed(s): {seeds:?}", seeds.len());
    Ok(seeds)
}
