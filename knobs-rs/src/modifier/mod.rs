//! Value-conditioning modifiers for [`Lever`](crate::Lever).
//!
//! A lever threads each raw sample through its modifiers in attachment
//! order. Each modifier rewrites the value in place and says whether it is
//! ready to propagate; the first "not ready" ends the chain for that tick
//! and nothing is activated.

mod average;
mod deviation;
mod scale;

pub use average::{Average, AverageTime, RunningAverage};
pub use deviation::{Deviation, RunningDeviation};
pub use scale::{AcsVariant, Scale, Transpose};

use crate::clock::Millis;

/// Raw value range of the lever a modifier is attached to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct ValueRange {
    pub min: i32,
    pub max: i32,
}

/// One stage of a lever's pipeline.
pub trait Modifier {
    /// Transform `value` in place. Return `false` to hold back
    /// propagation (not enough samples yet, window still open).
    fn modify(&mut self, range: &ValueRange, value: &mut i32, now: Millis) -> bool;
}

/// Round half away from zero, saturating at the `i32` range.
pub(crate) fn round(x: f32) -> i32 {
    libm::roundf(x) as i32
}

/// Saturating narrowing of wide intermediate results.
pub(crate) fn narrow(x: i64) -> i32 {
    x.clamp(i32::MIN as i64, i32::MAX as i64) as i32
}
