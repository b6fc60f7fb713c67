//! Set-Partition Master (spec.md §4.3).
//!
//! No LP/MIP solver crate is available in this dependency family (see
//! DESIGN.md). The restricted master is therefore a pure-Rust heuristic:
//! greedy set-packing selection standing in for the MIP solve, with a
//! subgradient-style dual-price update standing in for true LP duals and
//! driving the column generator toward currently-uncovered tours.

mod lex_cost;

pub use lex_cost::LexCost;

use crate::block::BlockCaps;
use crate::column;
use crate::config::PolicyConfig;
use crate::model::{Block, Column, DriverType, TourInstance};
use std::collections::{BTreeMap, HashMap, HashSet};

#[derive(Debug, Clone, PartialEq)]
pub struct MasterResult {
    pub selected: Vec<Column>,
    pub uncovered: Vec<String>,
    pub lex_cost: LexCost,
    /// Set when the driver-capped MIP-like phase found no feasible partition
    /// and the master fell back to an uncapped greedy partition.
    pub fallback: bool,
}

/// Builds a per-day block pool keyed by day from the full instance set.
pub fn build_block_pool(
    instances: &[TourInstance],
    caps: &BlockCaps,
) -> BTreeMap<u8, Vec<Block>> {
    let mut by_day: BTreeMap<u8, Vec<TourInstance>> = BTreeMap::new();
    for inst in instances {
        by_day.entry(inst.day).or_default().push(inst.clone());
    }
    by_day
        .into_iter()
        .map(|(day, insts)| (day, crate::block::build_blocks(&insts, caps)))
        .collect()
}

/// Solves the set-partitioning master problem over the given tour instances.
///
/// Returns `Err(SolverError::Solver{code: "INFEASIBLE", ..})` only if even the
/// uncapped fallback partition cannot cover every tour — the caller receives
/// the uncovered tour ids via the error message's companion list by calling
/// [`solve_master_diagnostic`] instead when that detail is required.
pub fn solve_master(
    instances: &[TourInstance],
    config: &PolicyConfig,
    max_rounds: u32,
) -> crate::SolverResult<MasterResult> {
    let _span = tracing::info_span!("master_solve", n_tours = instances.len()).entered();

    let caps = BlockCaps::default().with_cap_quota_2er(config.cap_quota_2er);
    let block_pool = build_block_pool(instances, &caps);

    let universe: HashSet<String> = instances.iter().map(|t| t.instance_id()).collect();
    let total_work_min: u32 = instances.iter().map(|t| t.duration_min).sum();
    let lower_bound_drivers =
        ((total_work_min as f64 / 60.0) / config.max_weekly_hours).ceil().max(1.0) as usize;
    let max_drivers = (instances.len()).min((lower_bound_drivers as f64 * 1.2).ceil() as usize);

    let mut duals: HashMap<String, f64> = HashMap::new();
    let mut seen_fte: HashSet<String> = HashSet::new();
    let mut seen_pt: HashSet<String> = HashSet::new();
    let mut pool: Vec<Column> = Vec::new();

    for round in 0..max_rounds.max(1) {
        let seed = config.seed.wrapping_add(round as u64);
        let mut fresh = column::generate_columns_with_config(
            &block_pool,
            DriverType::Fte,
            &duals,
            seed,
            24,
            &mut seen_fte,
            config,
        );
        fresh.extend(column::generate_columns_with_config(
            &block_pool,
            DriverType::Pt,
            &duals,
            seed.wrapping_add(1_000_000),
            12,
            &mut seen_pt,
            config,
        ));
        if fresh.is_empty() && round > 0 {
            break;
        }
        pool.extend(fresh);

        let (_, uncovered) = greedy_partition(&pool, &universe, Some(max_drivers));
        if uncovered.is_empty() {
            break;
        }
        // Subgradient step: bump dual price for every still-uncovered tour so
        // the next round's pricing favors blocks that touch them.
        for id in &uncovered {
            *duals.entry(id.clone()).or_insert(0.0) += 50.0;
        }
    }

    let (selected, uncovered) = greedy_partition(&pool, &universe, Some(max_drivers));
    if uncovered.is_empty() {
        let lex_cost = LexCost::from_columns(&selected);
        return Ok(MasterResult {
            selected,
            uncovered: Vec::new(),
            lex_cost,
            fallback: false,
        });
    }

    // MIP-like capped phase failed to cover everything; fall back to an
    // uncapped greedy partition (spec.md §4.3 step 4).
    let (fallback_selected, fallback_uncovered) = greedy_partition(&pool, &universe, None);
    if fallback_uncovered.is_empty() {
        let lex_cost = LexCost::from_columns(&fallback_selected);
        return Ok(MasterResult {
            selected: fallback_selected,
            uncovered: Vec::new(),
            lex_cost,
            fallback: true,
        });
    }

    let mut uncovered_list: Vec<String> = fallback_uncovered.into_iter().collect();
    uncovered_list.sort();
    Err(crate::SolverError::solver(
        "INFEASIBLE",
        format!(
            "{} tour instance(s) have no feasible partition: {}",
            uncovered_list.len(),
            uncovered_list.join(", ")
        ),
    ))
}

/// Greedily selects a disjoint (set-packing) subset of `columns` covering as
/// much of `universe` as possible, cheapest-cost-per-tour first, honoring an
/// optional cap on the number of selected columns (drivers).
fn greedy_partition(
    columns: &[Column],
    universe: &HashSet<String>,
    driver_cap: Option<usize>,
) -> (Vec<Column>, HashSet<String>) {
    let mut covered: HashSet<String> = HashSet::new();
    let mut selected: Vec<Column> = Vec::new();
    let mut remaining: Vec<&Column> = columns.iter().collect();

    loop {
        if let Some(cap) = driver_cap {
            if selected.len() >= cap {
                break;
            }
        }

        let best = remaining
            .iter()
            .filter(|c| {
                c.tour_instance_ids()
                    .iter()
                    .all(|id| !covered.contains(id))
            })
            .filter(|c| !c.tour_instance_ids().is_empty())
            .min_by(|a, b| {
                let ca = a.cost / a.tour_instance_ids().len() as f64;
                let cb = b.cost / b.tour_instance_ids().len() as f64;
                ca.partial_cmp(&cb).unwrap_or(std::cmp::Ordering::Equal)
            })
            .copied();

        let Some(chosen) = best else {
            break;
        };

        for id in chosen.tour_instance_ids() {
            covered.insert(id);
        }
        selected.push(chosen.clone());
        remaining.retain(|c| c.fingerprint != chosen.fingerprint);
    }

    let uncovered: HashSet<String> = universe.difference(&covered).cloned().collect();
    (selected, uncovered)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Tour;

    fn tour(id: &str, day: u8, start: u32, end: u32, count: u32) -> Tour {
        Tour {
            id: id.into(),
            tenant: "a".into(),
            site: "s".into(),
            day,
            start,
            end,
            depot: "D".into(),
            skill: "van".into(),
            count,
        }
    }

    #[test]
    fn solves_a_small_feasible_instance() {
        let instances: Vec<TourInstance> = vec![
            tour("t1", 1, 8 * 60, 16 * 60, 1),
            tour("t2", 2, 8 * 60, 16 * 60, 1),
        ]
        .into_iter()
        .flat_map(|t| t.expand())
        .collect();

        let config = PolicyConfig::default();
        let result = solve_master(&instances, &config, 3).expect("should be feasible");
        assert!(result.uncovered.is_empty());

        let covered: HashSet<String> = result
            .selected
            .iter()
            .flat_map(|c| c.tour_instance_ids())
            .collect();
        let universe: HashSet<String> = instances.iter().map(|t| t.instance_id()).collect();
        assert_eq!(covered, universe);
    }

    #[test]
    fn lex_cost_reflects_selected_columns() {
        let instances: Vec<TourInstance> = vec![tour("t1", 1, 8 * 60, 16 * 60, 1)]
            .into_iter()
            .flat_map(|t| t.expand())
            .collect();
        let config = PolicyConfig::default();
        let result = solve_master(&instances, &config, 2).unwrap();
        assert!(result.lex_cost.drivers >= 1);
    }
}
