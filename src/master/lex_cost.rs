//! Four-level lexicographic objective (spec.md §4.3).

use crate::model::{Column, DriverType};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub struct LexCost {
    pub drivers: u64,
    pub pt_drivers: u64,
    pub split_blocks: u64,
    pub singleton_blocks: u64,
}

impl LexCost {
    pub fn from_columns(columns: &[Column]) -> Self {
        Self {
            drivers: columns.len() as u64,
            pt_drivers: columns
                .iter()
                .filter(|c| c.driver_type == DriverType::Pt)
                .count() as u64,
            split_blocks: columns.iter().map(|c| c.split_block_count() as u64).sum(),
            singleton_blocks: columns
                .iter()
                .map(|c| c.singleton_block_count() as u64)
                .sum(),
        }
    }

    /// `10^9·drivers + 10^6·PT + 10^3·split_blocks + 10^2·singletons`.
    pub fn scalar(&self) -> f64 {
        1e9 * self.drivers as f64
            + 1e6 * self.pt_drivers as f64
            + 1e3 * self.split_blocks as f64
            + 1e2 * self.singleton_blocks as f64
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn headcount_dominates_every_other_level() {
        let fewer_drivers_more_pt = LexCost {
            drivers: 1,
            pt_drivers: 1,
            split_blocks: 100,
            singleton_blocks: 100,
        };
        let more_drivers_no_pt = LexCost {
            drivers: 2,
            pt_drivers: 0,
            split_blocks: 0,
            singleton_blocks: 0,
        };
        assert!(fewer_drivers_more_pt < more_drivers_no_pt);
    }
}
