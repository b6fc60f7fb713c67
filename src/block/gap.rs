//! Gap classification via the crate's constraint-tree machinery.
//!
//! The REGULAR ∪ SPLIT allowed-gap zone (never the forbidden (120,240) zone)
//! is expressed as a [`ConstraintExpr`] over [`IntervalConstraint<Minute>`]
//! leaves, the same composition pattern used for resource availability
//! elsewhere in the crate — generalized here from "a resource is open" to
//! "a gap duration is legal."

use crate::constraints::{Constraint, ConstraintExpr, IntervalConstraint};
use crate::model::PauseZone;
use crate::solution_space::Interval;
use qtty::Minute;

const REGULAR_MIN: f64 = 30.0;
const REGULAR_MAX: f64 = 120.0;
const SPLIT_MIN: f64 = 240.0;
const SPLIT_MAX: f64 = 360.0;
/// Upper bound used only to give the constraint tree a finite range to query.
const HORIZON_MAX: f64 = 24.0 * 60.0;

fn allowed_zones() -> ConstraintExpr<IntervalConstraint<Minute>> {
    ConstraintExpr::union(vec![
        ConstraintExpr::leaf(IntervalConstraint::new(Interval::from_f64(
            REGULAR_MIN,
            REGULAR_MAX,
        ))),
        ConstraintExpr::leaf(IntervalConstraint::new(Interval::from_f64(
            SPLIT_MIN, SPLIT_MAX,
        ))),
    ])
}

/// Classifies a gap duration (minutes) between two consecutive tours.
///
/// Returns `Some(Regular)` for gaps fully in `[30, 120]`, `Some(Split)` for
/// gaps fully in `[240, 360]`, and `None` for anything else — including the
/// forbidden `(120, 240)` zone and durations outside both ranges.
pub fn classify_gap(gap_min: u32) -> Option<PauseZone> {
    let tree = allowed_zones();
    let horizon = Interval::<Minute>::from_f64(0.0, HORIZON_MAX);
    let allowed = tree.compute_intervals(horizon);
    let point = qtty::Quantity::<Minute>::new(gap_min as f64);

    if allowed
        .iter()
        .any(|iv| (REGULAR_MIN..=REGULAR_MAX).contains(&iv.start().value()) && iv.contains(point))
    {
        return Some(PauseZone::Regular);
    }
    if allowed
        .iter()
        .any(|iv| (SPLIT_MIN..=SPLIT_MAX).contains(&iv.start().value()) && iv.contains(point))
    {
        return Some(PauseZone::Split);
    }
    None
}
