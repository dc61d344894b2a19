//! Continuous-time trajectories.
//!
//! Scalar trajectories are chains of quintic polynomial segments
//! ([SplineScalarCurve]); pose trajectories are time-indexed group
//! coefficients joined by geodesic interpolation ([SlerpCurve]).
//! Both are queried through the [Curve] trait.
//!
//! None of the containers here lock internally. Mutating a curve while
//! another thread evaluates it must be serialized by the caller.

pub use cgmath;
pub use coefficient::ManifoldCoefficient;
pub use curve::Curve;
pub use error::{CurveError, Result};
pub use manager::{Bracket, CoefficientManager, DuplicateTimePolicy, Entry};
pub use math::{LieGroup, SE2, SE3};
pub use slerp::{PriorFactor, SamplingParams, SlerpCurve, SlerpPolicy, SlerpSE2Curve, SlerpSE3Curve};
use slotmap::new_key_type;
pub use slotmap::{Key, KeyData, SecondaryMap};
pub use spline::{
    BoundaryCondition, PolynomialSpline, PolynomialSplineCubic, PolynomialSplineQuintic,
    SplineContainer, SplineOptions, SplineScalarCurve,
};
pub use util::Interval;

mod coefficient;
mod curve;
mod error;
mod manager;
pub mod math;
mod slerp;
mod spline;
mod util;

/// A point in time. Units are up to the caller but must be consistent
/// across a trajectory.
pub type Time = f64;

new_key_type! {
    /// Stable ID of a coefficient stored in a [CoefficientManager].
    pub struct CoefficientKey;
}

/// Values exchanged with an external optimizer, addressed by coefficient key.
pub type Values<C> = SecondaryMap<CoefficientKey, C>;
