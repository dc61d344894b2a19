//! Scalar trajectories built from chained polynomial segments.

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

pub use container::SplineContainer;
pub use scalar::SplineScalarCurve;
pub use segment::{PolynomialSpline, PolynomialSplineCubic, PolynomialSplineQuintic};

mod container;
mod scalar;
mod segment;

/// A constraint on one derivative of a polynomial at a local time.
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct BoundaryCondition {
    /// The local time of the constraint.
    pub time: f64,
    /// Which derivative is constrained, zero being the position.
    pub derivative: usize,
    /// The required value.
    pub value: f64,
}

impl BoundaryCondition {
    pub fn position(time: f64, value: f64) -> Self {
        Self {
            time,
            derivative: 0,
            value,
        }
    }

    pub fn velocity(time: f64, value: f64) -> Self {
        Self {
            time,
            derivative: 1,
            value,
        }
    }

    pub fn acceleration(time: f64, value: f64) -> Self {
        Self {
            time,
            derivative: 2,
            value,
        }
    }
}

/// The end states of a single quintic segment.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct SplineOptions {
    /// The length of the segment.
    pub duration: f64,
    /// Position at the start.
    pub pos0: f64,
    /// Velocity at the start.
    pub vel0: f64,
    /// Acceleration at the start.
    pub acc0: f64,
    /// Position at the end.
    pub pos_t: f64,
    /// Velocity at the end.
    pub vel_t: f64,
    /// Acceleration at the end.
    pub acc_t: f64,
}
