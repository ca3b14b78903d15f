//! Min/max accumulator reported by every evaluation entry point.
//!
//! [`ValueRange`] starts empty (`min = +inf`, `max = -inf`) and widens as samples are
//! included. NaN samples never become an extreme, matching [`f32::min`] and [`f32::max`].
#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Range of values observed during one evaluation call.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ValueRange {
    /// Smallest observed sample, `+inf` when nothing was observed.
    pub min: f32,
    /// Largest observed sample, `-inf` when nothing was observed.
    pub max: f32,
}

impl ValueRange {
    /// The identity range.
    pub const EMPTY: ValueRange = ValueRange {
        min: f32::INFINITY,
        max: f32::NEG_INFINITY,
    };

    /// Creates an empty range.
    pub const fn new() -> Self {
        Self::EMPTY
    }

    /// Range of a field that is `value` everywhere.
    pub const fn constant(value: f32) -> Self {
        Self {
            min: value,
            max: value,
        }
    }

    /// Returns `true` if no (non-NaN) sample has been included.
    pub fn is_empty(&self) -> bool {
        self.min > self.max
    }

    /// Widens the range to include `value`.
    #[inline]
    pub fn include(&mut self, value: f32) -> &mut Self {
        self.min = self.min.min(value);
        self.max = self.max.max(value);
        self
    }

    /// Widens the range to include `other`.
    #[inline]
    pub fn merge(&mut self, other: &ValueRange) -> &mut Self {
        self.min = self.min.min(other.min);
        self.max = self.max.max(other.max);
        self
    }

    /// Returns `true` if `value` lies inside the range.
    pub fn contains(&self, value: f32) -> bool {
        value >= self.min && value <= self.max
    }
}

impl Default for ValueRange {
    fn default() -> Self {
        Self::EMPTY
    }
}

impl Extend<f32> for ValueRange {
    fn extend<I: IntoIterator<Item = f32>>(&mut self, iter: I) {
        for v in iter {
            self.include(v);
        }
    }
}

impl FromIterator<f32> for ValueRange {
    fn from_iter<I: IntoIterator<Item = f32>>(iter: I) -> Self {
        let mut range = ValueRange::EMPTY;
        range.extend(iter);
        range
    }
}
