//! Core domain entities: tour templates/instances, blocks, and roster columns.
//!
//! These are plain owned value types; cross-references are ids resolved via
//! the plan store, not pointers (spec.md §9, "pointer graphs").

mod block;
mod column;
mod tour;

pub use block::{Block, BlockKind, PauseZone};
pub use column::{Column, DriverType};
pub use tour::{Tour, TourInstance};
