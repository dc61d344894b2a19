use crate::error::Result;
use crate::util::Interval;
use crate::{CoefficientKey, Time};

/// A trajectory that can be queried at arbitrary times and re-fit from
/// observations.
///
/// Implementations are picked statically per value type: [crate::SplineScalarCurve]
/// for scalars and [crate::SlerpCurve] for rigid transforms.
pub trait Curve {
    /// The value of the curve at a point in time.
    type Value;
    /// The type of a time derivative of the curve.
    type Derivative;

    /// The first time at which the curve is defined.
    fn min_time(&self) -> Result<Time>;

    /// The last time at which the curve is defined.
    fn max_time(&self) -> Result<Time>;

    /// The times between which the curve is defined.
    fn time_range(&self) -> Result<Interval<Time>> {
        Ok(Interval::new(self.min_time()?, self.max_time()?))
    }

    /// Evaluates the curve at the given time.
    fn evaluate(&self, time: Time) -> Result<Self::Value>;

    /// Evaluates the `order`-th time derivative of the curve.
    fn evaluate_derivative(&self, time: Time, order: u32) -> Result<Self::Derivative>;

    /// Evaluates the curve at each of the given times.
    fn evaluate_many(&self, times: &[Time]) -> Result<Vec<Self::Value>> {
        times.iter().map(|&time| self.evaluate(time)).collect()
    }

    /// Replaces the curve with one fit through the given observations.
    ///
    /// Returns the keys of any coefficients created, in input order.
    fn fit_curve(&mut self, times: &[Time], values: &[Self::Value]) -> Result<Vec<CoefficientKey>>;

    /// Adds observations to the end of the curve.
    fn extend(&mut self, times: &[Time], values: &[Self::Value]) -> Result<Vec<CoefficientKey>>;

    /// Returns the curve to its empty state.
    fn clear(&mut self);
}
