use super::{BoundaryCondition, SplineOptions};
use crate::error::{CurveError, Result};
use crate::math::{basis, dot, solve_linear_system};
use arrayvec::ArrayVec;
use log::warn;
use nalgebra::{DMatrix, DVector};
#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// A cubic polynomial segment.
pub type PolynomialSplineCubic = PolynomialSpline<4>;

/// A quintic polynomial segment.
pub type PolynomialSplineQuintic = PolynomialSpline<6>;

/// A polynomial with `N` coefficients over the local times `[0, duration]`.
///
/// Coefficients are stored highest degree first. Evaluation is not limited
/// to `[0, duration]`; querying outside it extrapolates the polynomial.
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(into = "SegmentRepr", try_from = "SegmentRepr"))]
pub struct PolynomialSpline<const N: usize> {
    coefficients: [f64; N],
    duration: f64,
}

impl<const N: usize> Default for PolynomialSpline<N> {
    fn default() -> Self {
        Self {
            coefficients: [0.0; N],
            duration: 0.0,
        }
    }
}

impl<const N: usize> PolynomialSpline<N> {
    pub fn new(coefficients: [f64; N], duration: f64) -> Self {
        Self {
            coefficients,
            duration,
        }
    }

    /// Solves for the polynomial meeting exactly `N` boundary conditions.
    pub fn fit(conditions: &[BoundaryCondition], duration: f64) -> Result<Self> {
        check_duration(duration)?;
        if conditions.len() != N {
            return Err(CurveError::InfeasibleBoundaryConditions(format!(
                "a polynomial with {} coefficients needs as many conditions, got {}",
                N,
                conditions.len()
            )));
        }
        let mut a = DMatrix::zeros(N, N);
        let mut b = DVector::zeros(N);
        for (row, condition) in conditions.iter().enumerate() {
            let weights = basis::<N>(condition.time, condition.derivative);
            for (col, weight) in weights.into_iter().enumerate() {
                a[(row, col)] = weight;
            }
            b[row] = condition.value;
        }
        let solution = solve_linear_system(a, &b).ok_or_else(|| {
            warn!("singular boundary conditions for a segment of duration {}", duration);
            CurveError::InfeasibleBoundaryConditions("the boundary conditions are singular".into())
        })?;

        let mut coefficients = [0.0; N];
        coefficients.copy_from_slice(solution.as_slice());
        Ok(Self::new(coefficients, duration))
    }

    pub fn position_at(&self, t: f64) -> f64 {
        self.derivative_at(t, 0)
    }

    pub fn velocity_at(&self, t: f64) -> f64 {
        self.derivative_at(t, 1)
    }

    pub fn acceleration_at(&self, t: f64) -> f64 {
        self.derivative_at(t, 2)
    }

    /// Evaluates the `order`-th derivative at local time `t`.
    pub fn derivative_at(&self, t: f64, order: usize) -> f64 {
        dot(&self.coefficients, &basis(t, order))
    }

    pub fn set_coefficients_and_duration(&mut self, coefficients: [f64; N], duration: f64) {
        self.coefficients = coefficients;
        self.duration = duration;
    }

    /// The coefficients, highest degree first.
    pub fn coefficients(&self) -> &[f64; N] {
        &self.coefficients
    }

    pub fn duration(&self) -> f64 {
        self.duration
    }

    /// The degree of the polynomial.
    pub const fn order(&self) -> usize {
        N - 1
    }
}

/// Fails unless `duration` is positive and finite.
pub(crate) fn check_duration(duration: f64) -> Result<()> {
    if !(duration > 0.0 && duration.is_finite()) {
        return Err(CurveError::InfeasibleBoundaryConditions(format!(
            "a segment cannot last {}",
            duration
        )));
    }
    Ok(())
}

/// The serialized form of a segment. Serde has no impls for arrays of a
/// generic length.
#[cfg(feature = "serde")]
#[derive(Serialize, Deserialize)]
struct SegmentRepr {
    coefficients: Vec<f64>,
    duration: f64,
}

#[cfg(feature = "serde")]
impl<const N: usize> From<PolynomialSpline<N>> for SegmentRepr {
    fn from(spline: PolynomialSpline<N>) -> Self {
        Self {
            coefficients: spline.coefficients.to_vec(),
            duration: spline.duration,
        }
    }
}

#[cfg(feature = "serde")]
impl<const N: usize> TryFrom<SegmentRepr> for PolynomialSpline<N> {
    type Error = CurveError;

    fn try_from(repr: SegmentRepr) -> Result<Self> {
        let coefficients = repr.coefficients.try_into().map_err(|c: Vec<f64>| {
            CurveError::DimensionMismatch {
                expected: N,
                actual: c.len(),
            }
        })?;
        Ok(Self::new(coefficients, repr.duration))
    }
}

impl PolynomialSplineQuintic {
    /// Fits the quintic joining the start and end states in `options`.
    pub fn from_options(options: &SplineOptions) -> Result<Self> {
        let t = options.duration;
        let conditions: ArrayVec<BoundaryCondition, 6> = [
            BoundaryCondition::position(0.0, options.pos0),
            BoundaryCondition::velocity(0.0, options.vel0),
            BoundaryCondition::acceleration(0.0, options.acc0),
            BoundaryCondition::position(t, options.pos_t),
            BoundaryCondition::velocity(t, options.vel_t),
            BoundaryCondition::acceleration(t, options.acc_t),
        ]
        .into_iter()
        .collect();
        Self::fit(&conditions, t)
    }
}
