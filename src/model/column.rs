//! The `Column` value type: one driver's weekly roster candidate.

use crate::model::Block;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DriverType {
    Fte,
    Pt,
}

/// One driver's weekly schedule: a day -> optional block map plus derived cost.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Column {
    pub driver_type: DriverType,
    /// Day (1..=7) -> block worked that day, if any.
    pub days: BTreeMap<u8, Block>,
    pub weekly_hours: f64,
    pub cost: f64,
    /// SHA-256 over sorted `(day, block_kind, sorted_tour_instance_ids)`.
    pub fingerprint: String,
}

impl Column {
    pub fn tour_instance_ids(&self) -> Vec<String> {
        let mut ids: Vec<String> = self
            .days
            .values()
            .flat_map(|b| b.tour_instance_ids())
            .collect();
        ids.sort();
        ids
    }

    pub fn block_count(&self) -> usize {
        self.days.len()
    }

    pub fn split_block_count(&self) -> usize {
        self.days.values().filter(|b| b.is_split()).count()
    }

    pub fn singleton_block_count(&self) -> usize {
        self.days.values().filter(|b| b.is_singleton()).count()
    }

    /// Computes the fingerprint described in spec.md §4.2: SHA-256 over the
    /// sorted `(day, block_kind, sorted_tour_instance_ids)` tuples. Collision
    /// implies structural identity, independent of driver_type/cost.
    pub fn compute_fingerprint(days: &BTreeMap<u8, Block>) -> String {
        let mut rows: Vec<String> = days
            .iter()
            .map(|(day, block)| {
                let mut ids = block.tour_instance_ids();
                ids.sort();
                format!("{}:{:?}:{}", day, block.block_kind, ids.join(","))
            })
            .collect();
        rows.sort();
        crate::sha256_hex(rows.join("|"))
    }

    /// Returns the day of the last worked day preceding `day`, if any, with its block.
    pub fn previous_block(&self, day: u8) -> Option<(&u8, &Block)> {
        self.days.range(..day).next_back()
    }
}
