//! Reduced-cost pricing for block candidates, the column generator's analogue
//! of the earliest-start-time scheduler's EST/deadline/flexibility metrics.

use crate::model::Block;
use std::collections::HashMap;

/// Base monetary cost of working a block, before roster-level penalties.
/// Proportional to work minutes; split/3-tour blocks cost a little more to
/// reflect the operational overhead of a broken or long day.
pub fn block_base_cost(block: &Block) -> f64 {
    let minutes = block.work_min() as f64;
    let overhead = match block.block_kind {
        crate::model::BlockKind::B1 => 1.0,
        crate::model::BlockKind::B2Reg => 1.0,
        crate::model::BlockKind::B2Split => 1.15,
        crate::model::BlockKind::B3 => 1.1,
    };
    minutes * overhead
}

/// `cost(block) - Σ dual[tour]` over the block's tours — the quantity the
/// column generator greedily minimizes when choosing a day's block.
pub fn reduced_cost(block: &Block, duals: &HashMap<String, f64>) -> f64 {
    let dual_sum: f64 = block
        .tours
        .iter()
        .map(|t| duals.get(&t.instance_id()).copied().unwrap_or(0.0))
        .sum();
    block_base_cost(block) - dual_sum
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{BlockKind, Tour};

    fn block() -> Block {
        let t = Tour {
            id: "t".into(),
            tenant: "a".into(),
            site: "s".into(),
            day: 1,
            start: 480,
            end: 960,
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
    fn reduced_cost_subtracts_matching_duals() {
        let b = block();
        let mut duals = HashMap::new();
        duals.insert(b.tours[0].instance_id(), 100.0);
        let base = block_base_cost(&b);
        assert_eq!(reduced_cost(&b, &duals), base - 100.0);
    }

    #[test]
    fn missing_dual_treated_as_zero() {
        let b = block();
        let duals = HashMap::new();
        assert_eq!(reduced_cost(&b, &duals), block_base_cost(&b));
    }
}
