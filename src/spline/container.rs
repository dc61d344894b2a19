use super::segment::{check_duration, PolynomialSplineQuintic};
use crate::error::{check_sizes, CurveError, Result};
use crate::math::{basis, solve_linear_system};
use crate::util::Interval;
use itertools::Itertools;
use log::{debug, warn};
use nalgebra::{DMatrix, DVector};

/// Coefficients per segment.
const N: usize = 6;

/// The highest derivative kept continuous across junctions.
const CONTINUITY: usize = 4;

/// A chain of quintic segments, each starting where the previous one ends.
///
/// Times are local to the container, which always starts at zero.
#[derive(Clone, Debug, Default)]
pub struct SplineContainer {
    splines: Vec<PolynomialSplineQuintic>,
    duration: f64,
}

impl SplineContainer {
    pub fn new() -> Self {
        Default::default()
    }

    /// Replaces the content with a spline through `(times, values)`.
    ///
    /// The velocity and acceleration at both ends are fixed to the given
    /// values. At every interior sample the segments meet with continuous
    /// derivatives up to the 4th, so the result is the unique C⁴ quintic
    /// spline through the samples. On failure the content is left unchanged.
    pub fn set_data(
        &mut self,
        times: &[f64],
        values: &[f64],
        v0: f64,
        a0: f64,
        vf: f64,
        af: f64,
    ) -> Result<()> {
        check_sizes(times, values)?;
        if times.len() < 2 {
            return Err(infeasible(format!("{} samples cannot span a segment", times.len())));
        }
        if let Some((t0, t1)) = times.iter().tuple_windows().find(|(t0, t1)| !(t0 < t1)) {
            return Err(infeasible(format!("times {} and {} are not increasing", t0, t1)));
        }

        let durations = times.iter().tuple_windows().map(|(t0, t1)| t1 - t0).collect_vec();
        for &duration in &durations {
            check_duration(duration)?;
        }
        let segments = durations.len();
        let size = N * segments;
        let mut system = System {
            a: DMatrix::zeros(size, size),
            b: DVector::zeros(size),
            row: 0,
        };

        // Start and end states
        for (derivative, value) in [values[0], v0, a0].into_iter().enumerate() {
            system.add(&[(0, basis(0.0, derivative))], value);
        }
        let last = segments - 1;
        for (derivative, value) in [values[segments], vf, af].into_iter().enumerate() {
            system.add(&[(last, basis(durations[last], derivative))], value);
        }

        // Junctions
        for (i, &duration) in durations.iter().enumerate().take(last) {
            let knot = values[i + 1];
            system.add(&[(i, basis(duration, 0))], knot);
            system.add(&[(i + 1, basis(0.0, 0))], knot);
            for derivative in 1..=CONTINUITY {
                let end = basis(duration, derivative);
                let start = basis::<N>(0.0, derivative).map(|w| -w);
                system.add(&[(i, end), (i + 1, start)], 0.0);
            }
        }
        debug_assert_eq!(system.row, size);

        let solution = solve_linear_system(system.a, &system.b).ok_or_else(|| {
            warn!("could not fit a spline through {} samples", times.len());
            infeasible("the spline system is singular".into())
        })?;

        self.splines = solution
            .as_slice()
            .chunks_exact(N)
            .zip_eq(&durations)
            .map(|(coefficients, &duration)| {
                let mut segment = PolynomialSplineQuintic::default();
                let mut fixed = [0.0; N];
                fixed.copy_from_slice(coefficients);
                segment.set_coefficients_and_duration(fixed, duration);
                segment
            })
            .collect();
        // Summed durations may drift from the sample times
        self.duration = times[segments] - times[0];
        debug!("fit {} segments over a duration of {}", segments, self.duration);
        Ok(())
    }

    /// Appends a segment to the end of the chain. Segments must have a
    /// positive, finite duration.
    pub fn add_spline(&mut self, spline: PolynomialSplineQuintic) -> Result<()> {
        check_duration(spline.duration())?;
        self.duration += spline.duration();
        self.splines.push(spline);
        Ok(())
    }

    /// Removes every segment.
    pub fn reset(&mut self) {
        self.splines.clear();
        self.duration = 0.0;
    }

    pub fn position_at_time(&self, time: f64) -> Result<f64> {
        self.derivative_at_time(time, 0)
    }

    pub fn velocity_at_time(&self, time: f64) -> Result<f64> {
        self.derivative_at_time(time, 1)
    }

    pub fn acceleration_at_time(&self, time: f64) -> Result<f64> {
        self.derivative_at_time(time, 2)
    }

    /// Evaluates the `order`-th derivative at a container time.
    pub fn derivative_at_time(&self, time: f64, order: usize) -> Result<f64> {
        let (index, local) = self.segment_at(time)?;
        Ok(self.splines[index].derivative_at(local, order))
    }

    /// Finds the segment covering `time`, along with the time local to it.
    ///
    /// A time on a junction resolves to the earlier segment.
    pub fn segment_at(&self, time: f64) -> Result<(usize, f64)> {
        let last = self.splines.len().checked_sub(1).ok_or(CurveError::NotFound)?;
        if !self.time_range().contains(time) {
            return Err(CurveError::TimeOutOfBounds {
                time,
                min: 0.0,
                max: self.duration,
            });
        }
        let mut local = time;
        for (index, spline) in self.splines.iter().enumerate() {
            if local <= spline.duration() || index == last {
                return Ok((index, local));
            }
            local -= spline.duration();
        }
        unreachable!("the last segment always matches")
    }

    /// The total duration of all segments.
    pub fn duration(&self) -> f64 {
        self.duration
    }

    pub fn time_range(&self) -> Interval<f64> {
        Interval::new(0.0, self.duration)
    }

    pub fn splines(&self) -> &[PolynomialSplineQuintic] {
        &self.splines
    }

    pub fn is_empty(&self) -> bool {
        self.splines.is_empty()
    }
}

/// A square linear system filled one constraint row at a time.
struct System {
    a: DMatrix<f64>,
    b: DVector<f64>,
    row: usize,
}

impl System {
    /// Adds the constraint `Σ weights · coefficients(segment) = value`.
    fn add(&mut self, terms: &[(usize, [f64; N])], value: f64) {
        for (segment, weights) in terms {
            for (col, weight) in weights.iter().enumerate() {
                self.a[(self.row, segment * N + col)] = *weight;
            }
        }
        self.b[self.row] = value;
        self.row += 1;
    }
}

fn infeasible(reason: String) -> CurveError {
    CurveError::InfeasibleBoundaryConditions(reason)
}
