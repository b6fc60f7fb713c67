//! Column Generator (spec.md §4.2): a lazy, restartable, finite producer of
//! [`Column`] values keyed by fingerprint, driven by the restricted master.

mod engine;
mod metrics;
mod ordering;

pub use metrics::{block_base_cost, reduced_cost};
pub use ordering::Candidate;

use crate::config::PolicyConfig;
use crate::model::{Block, Column, DriverType};
use rand::rngs::StdRng;
use rand::SeedableRng;
use std::collections::{BTreeMap, HashMap, HashSet};

/// Generates up to `max_columns` new, previously-unseen columns for
/// `driver_type`, pricing each day's block against `duals`.
///
/// Re-entrant: `seen` accumulates fingerprints across calls so the generator
/// never emits a duplicate column, matching spec.md §4.2's "re-entrant and
/// resumable" guarantee. Returns fewer columns than requested, never an
/// error, when the seed's random walk exhausts the block pool's diversity.
pub fn generate_columns(
    block_pool_by_day: &BTreeMap<u8, Vec<Block>>,
    driver_type: DriverType,
    duals: &HashMap<String, f64>,
    seed: u64,
    max_columns: usize,
    seen: &mut HashSet<String>,
) -> Vec<Column> {
    let mut out = Vec::new();
    let mut attempt: u64 = 0;
    let max_attempts = max_columns.saturating_mul(8).max(32);

    while out.len() < max_columns && attempt < max_attempts as u64 {
        let mut rng = StdRng::seed_from_u64(seed.wrapping_add(attempt));
        attempt += 1;

        let Some(column) =
            engine::build_one_column(block_pool_by_day, driver_type, duals, &PolicyConfig::default(), &mut rng)
        else {
            continue;
        };

        if seen.insert(column.fingerprint.clone()) {
            out.push(column);
        }
    }

    out
}

/// Same as [`generate_columns`] but threading an explicit [`PolicyConfig`]
/// (weekly-hours cap, PT penalty) instead of the default.
pub fn generate_columns_with_config(
    block_pool_by_day: &BTreeMap<u8, Vec<Block>>,
    driver_type: DriverType,
    duals: &HashMap<String, f64>,
    seed: u64,
    max_columns: usize,
    seen: &mut HashSet<String>,
    config: &PolicyConfig,
) -> Vec<Column> {
    let mut out = Vec::new();
    let mut attempt: u64 = 0;
    let max_attempts = max_columns.saturating_mul(8).max(32);

    while out.len() < max_columns && attempt < max_attempts as u64 {
        let mut rng = StdRng::seed_from_u64(seed.wrapping_add(attempt));
        attempt += 1;

        let Some(column) = engine::build_one_column(block_pool_by_day, driver_type, duals, config, &mut rng)
        else {
            continue;
        };

        if seen.insert(column.fingerprint.clone()) {
            out.push(column);
        }
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{BlockKind, Tour};

    fn pool_for(day: u8, start: u32, end: u32, id: &str) -> Vec<Block> {
        let t = Tour {
            id: id.to_string(),
            tenant: "a".into(),
            site: "s".into(),
            day,
            start,
            end,
            depot: "D".into(),
            skill: "van".into(),
            count: 1,
        };
        let inst = t.expand().remove(0);
        vec![Block {
            day,
            tours: vec![inst],
            gaps_min: vec![],
            block_kind: BlockKind::B1,
            pause_zone: None,
        }]
    }

    #[test]
    fn never_emits_a_duplicate_fingerprint() {
        let mut pool = BTreeMap::new();
        pool.insert(1, pool_for(1, 480, 960, "t1"));

        let mut seen = HashSet::new();
        let cols = generate_columns(&pool, DriverType::Fte, &HashMap::new(), 1, 5, &mut seen);
        let mut fps: Vec<_> = cols.iter().map(|c| c.fingerprint.clone()).collect();
        fps.sort();
        fps.dedup();
        assert_eq!(fps.len(), cols.len());
    }

    #[test]
    fn reentrant_seen_set_prevents_cross_call_duplicates() {
        let mut pool = BTreeMap::new();
        pool.insert(1, pool_for(1, 480, 960, "t1"));

        let mut seen = HashSet::new();
        let first = generate_columns(&pool, DriverType::Fte, &HashMap::new(), 1, 1, &mut seen);
        assert_eq!(first.len(), 1);
        let second = generate_columns(&pool, DriverType::Fte, &HashMap::new(), 1, 1, &mut seen);
        // With only one possible column shape, the re-entrant call finds nothing new.
        assert!(second.is_empty());
    }
}
