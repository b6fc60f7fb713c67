//! Unit conversion traits for same-dimension unit compatibility.
//!
//! This module provides traits that enable solvereign to work with different units
//! of the same physical dimension, allowing tasks to specify durations in one unit
//! (e.g., seconds) while constraints and scheduling operate on another unit
//! (e.g., days/MJD).

use qtty::{Quantity, Unit};

/// Marker trait for units that share the same physical dimension.
///
/// This trait is automatically implemented for any pair of units where
/// `From::Dim == To::Dim`, enabling compile-time checked conversions.
///
/// # Example
///
/// ```ignore
/// use qtty::{Second, Day};
/// use solvereign::units::SameDim;
///
/// // This compiles because Second and Day share the Time dimension
/// fn accepts_same_dim<From, To>()
/// where
///     From: SameDim<To>,
/// {}
///
/// accepts_same_dim::<Second, Day>(); // OK
/// // accepts_same_dim::<Second, Meter>(); // Error: different dimensions
/// ```
pub trait SameDim<To: Unit>: Unit<Dim = To::Dim> {}

// Blanket implementation: any two units with the same dimension satisfy SameDim
impl<From, To> SameDim<To> for From
where
    From: Unit,
    To: Unit<Dim = From::Dim>,
{
}

/// Converts a quantity from one unit to another unit of the same dimension.
///
/// This is a convenience wrapper around `Quantity::to::<T>()` that works
/// with the `SameDim` trait bounds.
///
/// # Example
///
/// ```ignore
/// use qtty::{Quantity, Second, Day};
/// use solvereign::units::convert;
///
/// let duration_sec = Quantity::<Second>::new(86400.0);
/// let duration_day: Quantity<Day> = convert(duration_sec);
/// assert!((duration_day.value() - 1.0).abs() < 1e-12);
/// ```
#[inline]
pub const fn convert<From, To>(q: Quantity<From>) -> Quantity<To>
where
    From: SameDim<To>,
    To: Unit,
{
    q.to_const::<To>()
}
