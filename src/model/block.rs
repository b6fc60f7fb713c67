//! The `Block` value type: 1-3 tour-instances for one driver on one day.
//!
//! Construction (enumeration of legal blocks from a day's tour instances)
//! lives in the top-level `block` module; this type only carries the data
//! and the invariants that follow directly from its own fields.

use crate::model::TourInstance;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PauseZone {
    /// Gaps in [30, 120] minutes.
    Regular,
    /// Gaps in [240, 360] minutes.
    Split,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum BlockKind {
    /// Single tour, no gap.
    B1,
    /// Two tours, REGULAR gap.
    B2Reg,
    /// Two tours, SPLIT gap.
    B2Split,
    /// Three tours, REGULAR gaps only (SPLIT 3-tour blocks are never emitted).
    B3,
}

impl BlockKind {
    pub fn tour_count(self) -> usize {
        match self {
            BlockKind::B1 => 1,
            BlockKind::B2Reg | BlockKind::B2Split => 2,
            BlockKind::B3 => 3,
        }
    }

    /// Policy span cap in minutes: 14h for REGULAR, 16h for SPLIT/B3.
    pub fn max_span_min(self) -> u32 {
        match self {
            BlockKind::B1 | BlockKind::B2Reg => 14 * 60,
            BlockKind::B2Split | BlockKind::B3 => 16 * 60,
        }
    }

    pub fn is_split(self) -> bool {
        matches!(self, BlockKind::B2Split)
    }
}

/// An ordered sequence of 1..3 tour-instances for a single driver on a single
/// calendar day.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Block {
    pub day: u8,
    pub tours: Vec<TourInstance>,
    /// Gap durations in minutes between consecutive tours (len = tours.len() - 1).
    pub gaps_min: Vec<u32>,
    pub block_kind: BlockKind,
    pub pause_zone: Option<PauseZone>,
}

impl Block {
    pub fn first_start(&self) -> u32 {
        self.tours[0].start
    }

    pub fn last_end(&self) -> u32 {
        let last = self.tours.last().expect("block has at least one tour");
        if last.crosses_midnight {
            last.end + 1440
        } else {
            last.end
        }
    }

    /// Total span from first start to last end, in minutes.
    pub fn span_min(&self) -> u32 {
        self.last_end() - self.first_start()
    }

    /// Sum of each tour's own worked duration, excluding gaps.
    pub fn work_min(&self) -> u32 {
        self.tours.iter().map(|t| t.duration_min).sum()
    }

    pub fn tour_instance_ids(&self) -> Vec<String> {
        self.tours.iter().map(|t| t.instance_id()).collect()
    }

    /// Deterministic sort key for block pools: `(day, first_start, last_end, kind)`.
    pub fn sort_key(&self) -> (u8, u32, u32, u8) {
        (
            self.day,
            self.first_start(),
            self.last_end(),
            self.block_kind as u8,
        )
    }

    pub fn is_singleton(&self) -> bool {
        matches!(self.block_kind, BlockKind::B1)
    }

    pub fn is_split(&self) -> bool {
        self.block_kind.is_split()
    }
}
