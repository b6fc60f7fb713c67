//! Column generation engine: builds one weekly roster column via a priced
//! greedy walk over days, driven by a seeded RNG for per-seed diversity.

use super::metrics::reduced_cost;
use super::ordering::Candidate;
use crate::config::PolicyConfig;
use crate::model::{Block, BlockKind, Column, DriverType};
use rand::rngs::StdRng;
use rand::Rng;
use std::collections::{BTreeMap, HashMap};

const MIN_REST_MIN: u32 = 660;

fn rest_ok(prev: &Block, next: &Block, prev_day: u8, next_day: u8) -> bool {
    if next_day != prev_day + 1 {
        // non-adjacent calendar days always satisfy rest.
        return true;
    }
    let prev_end_abs = prev.last_end() as i64;
    let next_start_abs = next.first_start() as i64 + 1440;
    (next_start_abs - prev_end_abs) >= MIN_REST_MIN as i64
}

/// Builds one column by walking days 1..=7 in order, greedily picking the
/// best-reduced-cost feasible block for each day, or leaving the day off.
pub fn build_one_column(
    block_pool_by_day: &BTreeMap<u8, Vec<Block>>,
    driver_type: DriverType,
    duals: &HashMap<String, f64>,
    config: &PolicyConfig,
    rng: &mut StdRng,
) -> Option<Column> {
    let mut days: BTreeMap<u8, Block> = BTreeMap::new();
    let mut weekly_minutes: u32 = 0;

    for day in 1..=7u8 {
        let Some(pool) = block_pool_by_day.get(&day) else {
            continue;
        };
        if pool.is_empty() {
            continue;
        }

        let prev = days
            .range(..day)
            .next_back()
            .filter(|(d, _)| **d + 1 == day);

        let feasible: Vec<Candidate> = pool
            .iter()
            .filter(|block| {
                let projected_hours = (weekly_minutes + block.work_min()) as f64 / 60.0;
                if projected_hours > config.max_weekly_hours {
                    return false;
                }
                if let Some((prev_day, prev_block)) = prev {
                    if !rest_ok(prev_block, block, *prev_day, day) {
                        return false;
                    }
                    if prev_block.block_kind == BlockKind::B3 && block.block_kind == BlockKind::B3
                    {
                        return false; // fatigue: no B3 on two consecutive days
                    }
                }
                true
            })
            .map(|block| Candidate {
                block,
                reduced_cost: reduced_cost(block, duals),
            })
            .collect();

        if feasible.is_empty() {
            continue;
        }

        let mut sorted = feasible;
        sorted.sort_by(super::ordering::compare);
        let top_k = sorted.len().min(3);
        let pick = rng.gen_range(0..top_k);
        let chosen = sorted[pick].block.clone();

        weekly_minutes += chosen.work_min();
        days.insert(day, chosen);
    }

    if days.is_empty() {
        return None;
    }

    let weekly_hours = weekly_minutes as f64 / 60.0;
    let fingerprint = Column::compute_fingerprint(&days);
    let cost = compute_cost(&days, driver_type, weekly_hours, config);

    Some(Column {
        driver_type,
        days,
        weekly_hours,
        cost,
        fingerprint,
    })
}

/// `cost = base_cost + PT_PENALTY·[driver_type=PT] + HOURS_PENALTY(weekly_hours)
/// + LONG_DAY_PENALTY(count of spans > 13h)` (spec.md §4.2).
fn compute_cost(
    days: &BTreeMap<u8, Block>,
    driver_type: DriverType,
    weekly_hours: f64,
    config: &PolicyConfig,
) -> f64 {
    let base_cost: f64 = days.values().map(super::metrics::block_base_cost).sum();
    let pt_penalty = if driver_type == DriverType::Pt {
        config.pt_penalty
    } else {
        0.0
    };
    let hours_penalty = if weekly_hours > config.max_weekly_hours {
        (weekly_hours - config.max_weekly_hours) * 10_000.0
    } else {
        0.0
    };
    let long_day_count = days.values().filter(|b| b.span_min() > 13 * 60).count() as f64;
    let long_day_penalty = long_day_count * 500.0;

    base_cost + pt_penalty + hours_penalty + long_day_penalty
}
