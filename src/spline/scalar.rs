use super::container::SplineContainer;
use super::segment::PolynomialSplineQuintic;
use super::SplineOptions;
use crate::curve::Curve;
use crate::error::{check_sizes, CurveError, Result};
use crate::{CoefficientKey, Time};
use itertools::Itertools;
use log::debug;

/// A scalar trajectory made of quintic segments, starting at any time.
#[derive(Clone, Debug, Default)]
pub struct SplineScalarCurve {
    container: SplineContainer,
    /// The time at which the first segment starts.
    min_time: Time,
}

impl SplineScalarCurve {
    pub fn new() -> Self {
        Default::default()
    }

    /// The segments, with times relative to [Curve::min_time].
    pub fn container(&self) -> &SplineContainer {
        &self.container
    }

    /// Fits a spline through the observations with the given velocity and
    /// acceleration at both ends.
    pub fn fit_curve_with_boundary(
        &mut self,
        times: &[Time],
        values: &[f64],
        v0: f64,
        a0: f64,
        vf: f64,
        af: f64,
    ) -> Result<()> {
        check_sizes(times, values)?;
        let start = times.first().copied().unwrap_or_default();
        let local = times.iter().map(|t| t - start).collect_vec();
        self.container.set_data(&local, values, v0, a0, vf, af)?;
        self.min_time = start;
        Ok(())
    }

    /// Replaces the curve with one quintic per entry of `options`, chained
    /// from time zero.
    pub fn fit_curve_from_options(&mut self, options: &[SplineOptions]) -> Result<()> {
        let segments = options
            .iter()
            .map(PolynomialSplineQuintic::from_options)
            .collect::<Result<Vec<_>>>()?;
        self.clear();
        for segment in segments {
            self.container.add_spline(segment)?;
        }
        debug!("chained {} segments", options.len());
        Ok(())
    }

    /// Not supported for splines.
    pub fn transform_curve(&mut self, _offset: f64) -> Result<()> {
        Err(CurveError::Unimplemented("transforming a spline curve"))
    }

    /// Maps a curve time to a container time.
    fn local_time(&self, time: Time) -> Result<f64> {
        let range = self.time_range()?;
        if !range.contains(time) {
            return Err(CurveError::TimeOutOfBounds {
                time,
                min: range.min,
                max: range.max,
            });
        }
        Ok(time - self.min_time)
    }
}

impl Curve for SplineScalarCurve {
    type Value = f64;
    type Derivative = f64;

    fn min_time(&self) -> Result<Time> {
        if self.container.is_empty() {
            return Err(CurveError::NotFound);
        }
        Ok(self.min_time)
    }

    fn max_time(&self) -> Result<Time> {
        Ok(self.min_time()? + self.container.duration())
    }

    fn evaluate(&self, time: Time) -> Result<f64> {
        self.container.position_at_time(self.local_time(time)?)
    }

    /// Supports velocities and accelerations.
    fn evaluate_derivative(&self, time: Time, order: u32) -> Result<f64> {
        let local = self.local_time(time)?;
        match order {
            1 => self.container.velocity_at_time(local),
            2 => self.container.acceleration_at_time(local),
            _ => Err(CurveError::Unimplemented("spline derivatives other than 1st and 2nd")),
        }
    }

    /// Fits a spline at rest at both ends. Splines have no keyed
    /// coefficients, so no keys are returned.
    fn fit_curve(&mut self, times: &[Time], values: &[f64]) -> Result<Vec<CoefficientKey>> {
        self.fit_curve_with_boundary(times, values, 0.0, 0.0, 0.0, 0.0)?;
        Ok(vec![])
    }

    fn extend(&mut self, _times: &[Time], _values: &[f64]) -> Result<Vec<CoefficientKey>> {
        Err(CurveError::Unimplemented("extending a spline curve"))
    }

    fn clear(&mut self) {
        self.container.reset();
        self.min_time = 0.0;
    }
}
