//! Block Builder (spec.md §4.1): enumerates legal 1/2/3-tour blocks for a
//! driver-day.

mod caps;
mod gap;

pub use caps::BlockCaps;
pub use gap::classify_gap;

use crate::model::{Block, BlockKind, TourInstance};
use std::collections::HashMap;

/// Absolute end-of-day minute, treating a midnight-crossing tour's end as
/// `end + 1440` so ordering/gap arithmetic stays linear within the day.
fn absolute_end(t: &TourInstance) -> u32 {
    if t.crosses_midnight {
        t.end + 1440
    } else {
        t.end
    }
}

fn make_block(tours: Vec<TourInstance>, gaps_min: Vec<u32>, kind: BlockKind) -> Option<Block> {
    let zone = match kind {
        BlockKind::B1 => None,
        _ => {
            let mut zones = gaps_min.iter().map(|g| crate::block::classify_gap(*g));
            let first = zones.next().flatten()?;
            for z in zones {
                if z? != first {
                    return None;
                }
            }
            Some(first)
        }
    };
    let day = tours[0].day;
    let block = Block {
        day,
        tours,
        gaps_min,
        block_kind: kind,
        pause_zone: zone,
    };
    if block.span_min() > kind.max_span_min() {
        return None;
    }
    Some(block)
}

/// Enumerates all feasible 1/2/3-tour blocks for the given day's tour
/// instances, applying [`BlockCaps`] per anchor tour, and returns them in the
/// deterministic order `(day, first_start, last_end, kind)`.
pub fn build_blocks(instances: &[TourInstance], caps: &BlockCaps) -> Vec<Block> {
    if instances.is_empty() {
        return Vec::new();
    }

    let mut ordered: Vec<&TourInstance> = instances.iter().collect();
    ordered.sort_by_key(|t| (t.start, t.end, t.instance_id()));

    let mut pool: Vec<Block> = Vec::new();

    // B1: every tour is its own singleton block.
    for t in &ordered {
        pool.push(
            make_block(vec![(*t).clone()], vec![], BlockKind::B1)
                .expect("singleton block is always valid"),
        );
    }

    let n = ordered.len();

    // B2: every chronologically non-overlapping ordered pair.
    for i in 0..n {
        for j in (i + 1)..n {
            let a = ordered[i];
            let b = ordered[j];
            let a_end = absolute_end(a);
            if b.start < a_end {
                continue; // overlaps, not chronologically orderable
            }
            let gap = b.start - a_end;
            let Some(zone) = classify_gap(gap) else {
                continue;
            };
            let kind = match zone {
                crate::model::PauseZone::Regular => BlockKind::B2Reg,
                crate::model::PauseZone::Split => BlockKind::B2Split,
            };
            if let Some(block) = make_block(vec![a.clone(), b.clone()], vec![gap], kind) {
                pool.push(block);
            }
        }
    }

    // B3: chronologically ordered triples, REGULAR gaps only.
    for i in 0..n {
        for j in (i + 1)..n {
            for k in (j + 1)..n {
                let a = ordered[i];
                let b = ordered[j];
                let c = ordered[k];
                let a_end = absolute_end(a);
                let b_end = absolute_end(b);
                if b.start < a_end || c.start < b_end {
                    continue;
                }
                let gap1 = b.start - a_end;
                let gap2 = c.start - b_end;
                let (Some(crate::model::PauseZone::Regular), Some(crate::model::PauseZone::Regular)) =
                    (classify_gap(gap1), classify_gap(gap2))
                else {
                    continue;
                };
                if let Some(block) = make_block(
                    vec![a.clone(), b.clone(), c.clone()],
                    vec![gap1, gap2],
                    BlockKind::B3,
                ) {
                    pool.push(block);
                }
            }
        }
    }

    apply_caps(pool, caps)
}

/// Groups multi-tour blocks by their anchor (first) tour and keeps at most
/// the configured cap per kind, ranked by span ascending then by latest-end
/// first (to preserve diversity among equally-short blocks).
fn apply_caps(pool: Vec<Block>, caps: &BlockCaps) -> Vec<Block> {
    let mut by_anchor: HashMap<String, Vec<Block>> = HashMap::new();
    let mut singles: Vec<Block> = Vec::new();

    for block in pool {
        if block.block_kind == BlockKind::B1 {
            singles.push(block);
        } else {
            let anchor = block.tours[0].instance_id();
            by_anchor.entry(anchor).or_default().push(block);
        }
    }

    let mut result = singles;
    for (_, mut blocks) in by_anchor {
        blocks.sort_by(|a, b| {
            a.span_min()
                .cmp(&b.span_min())
                .then(b.last_end().cmp(&a.last_end()))
        });
        let mut kept_2er = 0usize;
        let mut kept_2er_split = 0usize;
        let mut kept_3er = 0usize;
        for block in blocks {
            let keep = match block.block_kind {
                BlockKind::B2Reg => {
                    kept_2er += 1;
                    kept_2er <= caps.k_2er
                }
                BlockKind::B2Split => {
                    kept_2er_split += 1;
                    kept_2er_split <= caps.k_2er_split
                }
                BlockKind::B3 => {
                    kept_3er += 1;
                    kept_3er <= caps.k_3er
                }
                BlockKind::B1 => unreachable!("singles are filtered out above"),
            };
            if keep {
                result.push(block);
            }
        }
    }

    result.sort_by_key(|b| b.sort_key());
    result
}
