//! Candidate-priority comparator for the column generator's greedy block pick.
//!
//! Mirrors the earliest-start-time scheduler's candidate ordering: a
//! deterministic total order so that the "best" pick at each day is
//! reproducible for a fixed seed and block pool.

use crate::model::Block;
use std::cmp::Ordering;

/// A priced block candidate for a single day.
#[derive(Debug, Clone)]
pub struct Candidate<'a> {
    pub block: &'a Block,
    pub reduced_cost: f64,
}

/// Orders candidates by reduced cost ascending, then shorter span, then the
/// block's own deterministic sort key, so ties never depend on pool order.
pub fn compare(a: &Candidate, b: &Candidate) -> Ordering {
    a.reduced_cost
        .partial_cmp(&b.reduced_cost)
        .unwrap_or(Ordering::Equal)
        .then_with(|| a.block.span_min().cmp(&b.block.span_min()))
        .then_with(|| a.block.sort_key().cmp(&b.block.sort_key()))
}

/// Picks the best feasible candidate, or `None` if the slice is empty.
pub fn best<'a, 'b>(candidates: &'b [Candidate<'a>]) -> Option<&'b Candidate<'a>> {
    candidates.iter().min_by(|x, y| compare(x, y))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{BlockKind, Tour};

    fn block(start: u32, end: u32) -> Block {
        let t = Tour {
            id: format!("t{start}"),
            tenant: "a".into(),
            site: "s".into(),
            day: 1,
            start,
            end,
            depot: "D".into(),
            skill: "van".into(),
            count: 1,
        };
        let inst = t.expand().remove(0);
        Block {
            day: 1,
            tours: vec![inst],
            gaps_min: vec![],
            block_kind: BlockKind::B1,
            pause_zone: None,
        }
    }

    #[test]
    fn lower_reduced_cost_wins() {
        let b1 = block(0, 100);
        let b2 = block(200, 300);
        let candidates = vec![
            Candidate {
                block: &b1,
                reduced_cost: 5.0,
            },
            Candidate {
                block: &b2,
                reduced_cost: 1.0,
            },
        ];
        let picked = best(&candidates).unwrap();
        assert_eq!(picked.reduced_cost, 1.0);
    }

    #[test]
    fn ties_break_on_span_then_sort_key() {
        let b1 = block(0, 200);
        let b2 = block(0, 100);
        let candidates = vec![
            Candidate {
                block: &b1,
                reduced_cost: 1.0,
            },
            Candidate {
                block: &b2,
                reduced_cost: 1.0,
            },
        ];
        let picked = best(&candidates).unwrap();
        assert_eq!(picked.block.span_min(), 100);
    }
}
