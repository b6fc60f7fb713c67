use crate::solution_space::Interval;
use crate::solution_space::IntervalSet;
use qtty::Unit;

/// Computes the intersection of two sorted interval sets.
///
/// # Arguments
///
/// * `a` - First set of sorted, non-overlapping intervals
/// * `b` - Second set of sorted, non-overlapping intervals
///
/// # Returns
///
/// A vector of intervals representing the intersection, sorted and non-overlapping.
pub fn compute_intersection<U: Unit>(a: &[Interval<U>], b: &[Interval<U>]) -> IntervalSet<U> {
    // assert a and b are canonical (debug-only)
    debug_assert!(super::assertions::is_canonical(a));
    debug_assert!(super::assertions::is_canonical(b));

    if a.is_empty() || b.is_empty() {
        return IntervalSet::new();
    }

    let mut result = Vec::with_capacity(a.len().min(b.len()));
    let mut i = 0usize;
    let mut j = 0usize;

    while i < a.len() && j < b.len() {
        let ia = &a[i];
        let ib = &b[j];

        if ia.overlaps(ib) {
            result.push(Interval::new(
                crate::constraints::quantity_max(ia.start(), ib.start()),
                crate::constraints::quantity_min(ia.end(), ib.end()),
            ));
        }

        match ia.end().partial_cmp(&ib.end()) {
            Some(std::cmp::Ordering::Less) => i += 1,
            Some(std::cmp::Ordering::Greater) => j += 1,
            _ => {
                i += 1;
                j += 1;
            }
        }
    }

    IntervalSet::from_sorted_unchecked(result)
}
