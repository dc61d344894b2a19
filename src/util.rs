//! Miscellaneous utility structs and functions.

use std::fmt::Debug;

use cgmath::num_traits::Float;
#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// An interval on the real number line.
#[derive(Copy, Clone, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Interval<T> {
    pub min: T,
    pub max: T,
}

impl<T> Interval<T> {
    /// Creates a new interval.
    pub const fn new(min: T, max: T) -> Self {
        Self { min, max }
    }
}

impl<T: std::cmp::PartialOrd> Interval<T> {
    /// Returns true if this interval contains the value.
    pub fn contains(&self, value: T) -> bool {
        value >= self.min && value <= self.max
    }
}

impl<T: std::ops::Sub<T, Output = T> + Copy> Interval<T> {
    /// Gets the magnitude of the interval.
    pub fn length(&self) -> T {
        self.max - self.min
    }
}

impl<T: Float> Interval<T> {
    /// Clamps a value into the interval.
    pub fn clamp(&self, value: T) -> T {
        value.max(self.min).min(self.max)
    }

    pub fn lerp(&self, t: T) -> T {
        self.min + t * (self.max - self.min)
    }

    /// The fractional position of `value` within the interval.
    /// A degenerate interval maps everything to zero.
    pub fn inv_lerp(&self, value: T) -> T {
        let length = self.max - self.min;
        if length == T::zero() {
            return T::zero();
        }
        (value - self.min) / length
    }
}

impl<T: Debug> Debug for Interval<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Interval({:?}, {:?})", &self.min, &self.max)
    }
}

#[cfg(test)]
mod test {
    use super::Interval;

    #[test]
    fn fractions() {
        let range = Interval::new(2.0, 6.0);
        assert_eq!(range.inv_lerp(2.0), 0.0);
        assert_eq!(range.inv_lerp(4.0), 0.5);
        assert_eq!(range.inv_lerp(6.0), 1.0);
        assert_eq!(range.lerp(0.25), 3.0);
        assert_eq!(Interval::new(3.0, 3.0).inv_lerp(3.0), 0.0);
    }

    #[test]
    fn clamping() {
        let range = Interval::new(-1.0, 1.0);
        assert_eq!(range.clamp(-5.0), -1.0);
        assert_eq!(range.clamp(0.5), 0.5);
        assert_eq!(range.clamp(5.0), 1.0);
        assert!(range.contains(1.0));
        assert!(!range.contains(1.0001));
        assert_eq!(range.length(), 2.0);
    }
}
