//! The eight individual audit checks (spec.md §4.5 / §8).

use super::{CheckOutcome, CheckStatus};
use crate::model::{BlockKind, Column, TourInstance};
use std::collections::HashMap;

/// Every tour instance in the universe must be covered by exactly one
/// selected column. FAIL on any missing or doubly-covered instance.
pub fn check_coverage(
    columns: &[Column],
    universe: &HashMap<String, &TourInstance>,
) -> CheckOutcome {
    let mut counts: HashMap<String, u32> = HashMap::new();
    for column in columns {
        for id in column.tour_instance_ids() {
            *counts.entry(id).or_insert(0) += 1;
        }
    }

    let mut details = Vec::new();
    for id in universe.keys() {
        match counts.get(id).copied().unwrap_or(0) {
            0 => details.push(format!("{id}: uncovered")),
            1 => {}
            n => details.push(format!("{id}: covered {n} times")),
        }
    }
    for id in counts.keys() {
        if !universe.contains_key(id) {
            details.push(format!("{id}: covered but not in universe"));
        }
    }
    details.sort();

    if details.is_empty() {
        CheckOutcome::pass("coverage")
    } else {
        CheckOutcome::from_violations("coverage", CheckStatus::Fail, details)
    }
}

/// No two tour instances assigned to the same driver may overlap in time,
/// across the whole week (absolute minute-of-week timeline).
pub fn check_overlap(columns: &[Column]) -> CheckOutcome {
    let mut details = Vec::new();

    for (idx, column) in columns.iter().enumerate() {
        let mut spans: Vec<(u32, u32, String)> = column
            .days
            .values()
            .flat_map(|b| &b.tours)
            .map(|t| (t.absolute_start(), t.absolute_end(), t.instance_id()))
            .collect();
        spans.sort_by_key(|(start, _, _)| *start);

        for window in spans.windows(2) {
            let (_, end_a, id_a) = &window[0];
            let (start_b, _, id_b) = &window[1];
            if start_b < end_a {
                details.push(format!(
                    "driver #{idx}: {id_a} overlaps {id_b}"
                ));
            }
        }
    }

    if details.is_empty() {
        CheckOutcome::pass("overlap")
    } else {
        CheckOutcome::from_violations("overlap", CheckStatus::Fail, details)
    }
}

/// Rest between consecutive worked days on the same driver's column must be
/// at least `min_rest_minutes`. Boundary: exactly `min_rest_minutes` passes.
pub fn check_rest(columns: &[Column], min_rest_minutes: u32) -> CheckOutcome {
    let mut details = Vec::new();

    for (idx, column) in columns.iter().enumerate() {
        let days: Vec<(&u8, &crate::model::Block)> = column.days.iter().collect();
        for window in days.windows(2) {
            let (prev_day, prev_block) = window[0];
            let (next_day, next_block) = window[1];

            let prev_end_abs = (*prev_day as u32 - 1) * 1440 + prev_block.last_end();
            let next_start_abs = (*next_day as u32 - 1) * 1440 + next_block.first_start();

            if next_start_abs <= prev_end_abs {
                continue; // overlap check already reports this
            }
            let rest = next_start_abs - prev_end_abs;
            if rest < min_rest_minutes {
                details.push(format!(
                    "driver #{idx}: day {prev_day}->{next_day} rest {rest}min < {min_rest_minutes}min"
                ));
            }
        }
    }

    if details.is_empty() {
        CheckOutcome::pass("rest")
    } else {
        CheckOutcome::from_violations("rest", CheckStatus::Fail, details)
    }
}

/// REGULAR-zone blocks (B1 / B2_REG) must not exceed their 14h span cap.
pub fn check_span_regular(columns: &[Column]) -> CheckOutcome {
    let mut details = Vec::new();
    for (idx, column) in columns.iter().enumerate() {
        for (day, block) in &column.days {
            if matches!(block.block_kind, BlockKind::B1 | BlockKind::B2Reg) {
                let cap = block.block_kind.max_span_min();
                if block.span_min() > cap {
                    details.push(format!(
                        "driver #{idx} day {day}: span {}min > {cap}min cap",
                        block.span_min()
                    ));
                }
            }
        }
    }
    if details.is_empty() {
        CheckOutcome::pass("span_regular")
    } else {
        CheckOutcome::from_violations("span_regular", CheckStatus::Fail, details)
    }
}

/// SPLIT-zone blocks (B2_SPLIT / B3) must not exceed their 16h span cap.
pub fn check_span_split(columns: &[Column]) -> CheckOutcome {
    let mut details = Vec::new();
    for (idx, column) in columns.iter().enumerate() {
        for (day, block) in &column.days {
            if matches!(block.block_kind, BlockKind::B2Split | BlockKind::B3) {
                let cap = block.block_kind.max_span_min();
                if block.span_min() > cap {
                    details.push(format!(
                        "driver #{idx} day {day}: span {}min > {cap}min cap",
                        block.span_min()
                    ));
                }
            }
        }
    }
    if details.is_empty() {
        CheckOutcome::pass("span_split")
    } else {
        CheckOutcome::from_violations("span_split", CheckStatus::Fail, details)
    }
}

/// No driver may work a B3 (3-tour) block on two consecutive calendar days
/// (spec.md §4.5's Fatigue contract).
pub fn check_fatigue(columns: &[Column]) -> CheckOutcome {
    let mut details = Vec::new();
    for (idx, column) in columns.iter().enumerate() {
        let days: Vec<(&u8, &crate::model::Block)> = column.days.iter().collect();
        for window in days.windows(2) {
            let (prev_day, prev_block) = window[0];
            let (next_day, next_block) = window[1];
            if *next_day == *prev_day + 1
                && prev_block.block_kind == BlockKind::B3
                && next_block.block_kind == BlockKind::B3
            {
                details.push(format!(
                    "driver #{idx}: B3 block on consecutive days {prev_day}->{next_day}"
                ));
            }
        }
    }
    if details.is_empty() {
        CheckOutcome::pass("fatigue")
    } else {
        CheckOutcome::from_violations("fatigue", CheckStatus::Fail, details)
    }
}

/// Weekly worked hours per driver must not exceed `max_weekly_hours`. Not one
/// of the eight audit checks in spec.md §4.5, but the policy-cap boundary
/// named explicitly in spec.md §8 ("55h01min rejected, 55h00min accepted").
/// Wired into [`super::run_all`] as a ninth, always-run guard so a plan that
/// slips past column-generation's own cap still fails audit rather than
/// publish.
pub fn check_weekly_hours(columns: &[Column], max_weekly_hours: f64) -> CheckOutcome {
    let mut details = Vec::new();
    for (idx, column) in columns.iter().enumerate() {
        if column.weekly_hours > max_weekly_hours {
            details.push(format!(
                "driver #{idx}: {:.2}h > {:.2}h cap",
                column.weekly_hours, max_weekly_hours
            ));
        }
    }
    if details.is_empty() {
        CheckOutcome::pass("weekly_hours")
    } else {
        CheckOutcome::from_violations("weekly_hours", CheckStatus::Fail, details)
    }
}

/// Re-solving the same instance with the same seed must select the exact
/// same set of column fingerprints. WARN (not FAIL) on divergence: a
/// non-reproducible solve is suspicious but not itself an unsafe plan.
pub fn check_reproducibility(columns: &[Column], prior_seed_columns: Option<&[Column]>) -> CheckOutcome {
    let Some(prior) = prior_seed_columns else {
        return CheckOutcome::pass("reproducibility");
    };

    let mut current: Vec<&str> = columns.iter().map(|c| c.fingerprint.as_str()).collect();
    let mut previous: Vec<&str> = prior.iter().map(|c| c.fingerprint.as_str()).collect();
    current.sort();
    previous.sort();

    if current == previous {
        CheckOutcome::pass("reproducibility")
    } else {
        CheckOutcome::from_violations(
            "reproducibility",
            CheckStatus::Warn,
            vec![format!(
                "fingerprint set differs: {} current vs {} prior",
                current.len(),
                previous.len()
            )],
        )
    }
}

/// Flags selected columns whose every tour instance is also covered by some
/// other selected column — a driver the plan is not sensitive to removing,
/// signalling the master may not have reached a minimal partition.
pub fn check_sensitivity(
    columns: &[Column],
    universe: &HashMap<String, &TourInstance>,
) -> CheckOutcome {
    let mut counts: HashMap<String, u32> = HashMap::new();
    for column in columns {
        for id in column.tour_instance_ids() {
            *counts.entry(id).or_insert(0) += 1;
        }
    }

    let mut details = Vec::new();
    for (idx, column) in columns.iter().enumerate() {
        let ids = column.tour_instance_ids();
        if !ids.is_empty()
            && ids
                .iter()
                .all(|id| universe.contains_key(id) && counts.get(id).copied().unwrap_or(0) > 1)
        {
            details.push(format!("driver #{idx}: fully redundant, every tour double-covered"));
        }
    }

    if details.is_empty() {
        CheckOutcome::pass("sensitivity")
    } else {
        CheckOutcome::from_violations("sensitivity", CheckStatus::Warn, details)
    }
}
