//! Pose trajectories interpolated along geodesics.

use crate::coefficient::ManifoldCoefficient;
use crate::curve::Curve;
use crate::error::{check_sizes, CurveError, Result};
use crate::manager::{repeated_time, CoefficientManager, DuplicateTimePolicy};
use crate::math::{SE2, SE3};
use crate::{CoefficientKey, Time, Values};
use itertools::Itertools;
use std::fmt;

pub use policy::{SamplingParams, SlerpPolicy};

mod policy;

/// The standard deviation of the priors that pin a coefficient in place.
const PRIOR_SIGMA: f64 = 1e-7;

/// A curve through planar poses.
pub type SlerpSE2Curve = SlerpCurve<SE2>;

/// A curve through 3D poses.
pub type SlerpSE3Curve = SlerpCurve<SE3>;

/// A prior on one coefficient, handed to an external optimizer as is.
#[derive(Clone, Copy, Debug)]
pub struct PriorFactor<G: ManifoldCoefficient> {
    /// The coefficient the prior applies to.
    pub key: CoefficientKey,
    /// The value the coefficient is held at.
    pub measured: G,
    /// Standard deviation per tangent-space component.
    pub sigmas: G::Tangent,
}

/// A trajectory through group values, linearly interpolated in the
/// tangent space between consecutive coefficients.
#[derive(Clone)]
pub struct SlerpCurve<G> {
    manager: CoefficientManager<G>,
    policy: SlerpPolicy,
}

impl<G: ManifoldCoefficient> Default for SlerpCurve<G> {
    fn default() -> Self {
        Self::new()
    }
}

impl<G: ManifoldCoefficient> SlerpCurve<G> {
    /// Creates an empty curve which adds a coefficient for every observation.
    pub fn new() -> Self {
        Self::with_params(SamplingParams::default(), DuplicateTimePolicy::default())
    }

    pub fn with_params(params: SamplingParams, duplicates: DuplicateTimePolicy) -> Self {
        Self {
            manager: CoefficientManager::with_policy(duplicates),
            policy: SlerpPolicy::new(params),
        }
    }

    /// The underlying coefficients.
    pub fn manager(&self) -> &CoefficientManager<G> {
        &self.manager
    }

    pub fn sampling_params(&self) -> &SamplingParams {
        self.policy.params()
    }

    pub fn set_min_sampling_period(&mut self, period: Time) {
        self.policy.set_min_sampling_period(period);
    }

    pub fn set_sampling_ratio(&mut self, ratio: usize) {
        self.policy.set_sampling_ratio(ratio);
    }

    /// Inserts coefficients without discarding the existing ones.
    pub fn set_curve(&mut self, times: &[Time], values: &[G]) -> Result<Vec<CoefficientKey>> {
        self.manager.insert_many(times, values)
    }

    /// The time of the coefficient stored under `key`.
    pub fn time_at_key(&self, key: CoefficientKey) -> Result<Time> {
        self.manager.time_of(key)
    }

    pub fn keys(&self) -> Vec<CoefficientKey> {
        self.manager.keys()
    }

    pub fn times(&self) -> Vec<Time> {
        self.manager.times()
    }

    pub fn len(&self) -> usize {
        self.manager.len()
    }

    pub fn is_empty(&self) -> bool {
        self.manager.is_empty()
    }

    /// Copies the coefficients stored under `keys` into `values`.
    pub fn initialize_values(&self, keys: &[CoefficientKey], values: &mut Values<G>) -> Result<()> {
        self.manager.initialize_values(keys, values)
    }

    pub fn initialize_all_values(&self, values: &mut Values<G>) {
        self.manager.initialize_all_values(values);
    }

    /// Takes on the values refined by an optimizer.
    pub fn update_from_values(&mut self, values: &Values<G>) {
        self.manager.update_from_values(values);
    }

    /// Priors holding both coefficients around `time` at their current values.
    pub fn prior_factors(&self, time: Time) -> Result<[PriorFactor<G>; 2]> {
        let bracket = self.manager.bracket_at(time)?;
        let mut sigmas = G::Tangent::default();
        sigmas.as_mut()[..G::DOF].fill(PRIOR_SIGMA);
        Ok([bracket.a, bracket.b].map(|entry| PriorFactor {
            key: entry.key,
            measured: *entry.coefficient,
            sigmas,
        }))
    }

    /// Left-multiplies every coefficient by `transform`.
    pub fn transform_curve(&mut self, transform: &G) -> Result<()> {
        for key in self.manager.keys() {
            let coefficient = self.manager.coefficient(key).ok_or(CurveError::UnknownKey(key))?;
            let transformed = transform.compose(coefficient);
            self.manager.set_coefficient(key, transformed)?;
        }
        Ok(())
    }

    /// Coefficient times are fixed once inserted.
    pub fn set_time_range(&mut self, _min_time: Time, _max_time: Time) -> Result<()> {
        Err(CurveError::Unimplemented("setting the time range of a slerp curve"))
    }
}

impl<G: ManifoldCoefficient> Curve for SlerpCurve<G> {
    type Value = G;
    type Derivative = G::Tangent;

    fn min_time(&self) -> Result<Time> {
        self.manager.min_time().ok_or(CurveError::NotFound)
    }

    fn max_time(&self) -> Result<Time> {
        self.manager.max_time().ok_or(CurveError::NotFound)
    }

    fn evaluate(&self, time: Time) -> Result<G> {
        let bracket = self.manager.bracket_at(time)?;
        Ok(SlerpPolicy::interpolate(&bracket, time))
    }

    fn evaluate_derivative(&self, _time: Time, _order: u32) -> Result<G::Tangent> {
        Err(CurveError::Unimplemented("derivatives of a slerp curve"))
    }

    fn fit_curve(&mut self, times: &[Time], values: &[G]) -> Result<Vec<CoefficientKey>> {
        if times.is_empty() && values.is_empty() {
            return Ok(vec![]);
        }
        check_sizes(times, values)?;
        if self.manager.duplicate_policy() == DuplicateTimePolicy::Reject {
            if let Some(time) = repeated_time(times) {
                return Err(CurveError::DuplicateTimeConflict { time });
            }
        }
        self.clear();
        self.manager.insert_many(times, values)
    }

    fn extend(&mut self, times: &[Time], values: &[G]) -> Result<Vec<CoefficientKey>> {
        self.policy.extend(&mut self.manager, times, values)
    }

    fn clear(&mut self) {
        self.manager.clear();
        self.policy.reset();
    }
}

impl<G: ManifoldCoefficient> fmt::Display for SlerpCurve<G> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let range = match self.manager.time_range() {
            Some(range) => range,
            None => return writeln!(f, "slerp curve with no coefficients"),
        };
        let n = self.manager.len();
        writeln!(f, "slerp curve with {} coefficients over [{}, {}]", n, range.min, range.max)?;
        if n > 1 {
            let steps = self.manager.iter().tuple_windows().map(|(a, b)| {
                let delta = a.coefficient.local_coordinates(b.coefficient);
                delta.as_ref().iter().map(|x| x * x).sum::<f64>().sqrt()
            });
            let mean_step = steps.sum::<f64>() / (n - 1) as f64;
            writeln!(f, "average spacing {}, average step {}", range.length() / (n - 1) as f64, mean_step)?;
        }
        for entry in self.manager.iter() {
            writeln!(f, "  {}: {:?}", entry.time, entry.coefficient.to_coefficients())?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::math::LieGroup;
    use assert_approx_eq::assert_approx_eq;
    use cgmath::{Quaternion, Rad, Rotation3, Vector3};

    fn along_x(times: &[Time]) -> SlerpSE2Curve {
        let mut curve = SlerpSE2Curve::new();
        let values = times.iter().map(|&t| SE2::new(t, 0.0, 0.0)).collect::<Vec<_>>();
        curve.fit_curve(times, &values).unwrap();
        curve
    }

    #[test]
    fn evaluate_between_samples() {
        let curve = along_x(&[0.0, 1.0, 2.0]);
        let pose = curve.evaluate(1.25).unwrap();
        assert_approx_eq!(pose.translation().x, 1.25);
        assert_approx_eq!(pose.translation().y, 0.0);
        assert_eq!(curve.evaluate(2.0).unwrap(), SE2::new(2.0, 0.0, 0.0));
        assert!(curve.evaluate(2.5).is_err());
    }

    #[test]
    fn empty_curve() {
        let curve = SlerpSE3Curve::new();
        assert_eq!(curve.min_time(), Err(CurveError::NotFound));
        assert_eq!(curve.max_time(), Err(CurveError::NotFound));
        assert_eq!(curve.evaluate(0.0), Err(CurveError::NotFound));
        assert_eq!(curve.to_string(), "slerp curve with no coefficients\n");
    }

    #[test]
    fn derivatives_are_unimplemented() {
        let curve = along_x(&[0.0, 1.0]);
        let err = curve.evaluate_derivative(0.5, 1).unwrap_err();
        assert!(matches!(err, CurveError::Unimplemented(_)));
        assert!(err.is_recoverable());
    }

    #[test]
    fn fit_curve_replaces_content() {
        let mut curve = along_x(&[0.0, 1.0, 2.0]);
        let old_keys = curve.keys();
        let keys = curve
            .fit_curve(&[5.0, 6.0], &[SE2::identity(), SE2::identity()])
            .unwrap();
        assert_eq!(curve.times(), vec![5.0, 6.0]);
        assert!(keys.iter().all(|k| !old_keys.contains(k)));
        assert!(curve.time_at_key(old_keys[0]).is_err());
        assert_eq!(curve.time_at_key(keys[1]), Ok(6.0));

        // Fitting nothing leaves the curve alone
        assert_eq!(curve.fit_curve(&[], &[]), Ok(vec![]));
        assert_eq!(curve.len(), 2);
    }

    #[test]
    fn rejected_fit_keeps_content() {
        let mut curve =
            SlerpSE2Curve::with_params(SamplingParams::default(), DuplicateTimePolicy::Reject);
        let keys = curve.fit_curve(&[0.0, 1.0], &[SE2::identity(); 2]).unwrap();
        assert_eq!(
            curve.fit_curve(&[2.0, 3.0, 2.0], &[SE2::new(1.0, 0.0, 0.0); 3]),
            Err(CurveError::DuplicateTimeConflict { time: 2.0 })
        );
        assert_eq!(curve.keys(), keys);
        assert_eq!(curve.times(), vec![0.0, 1.0]);

        // Times of the old content may be reused by a new fit
        let refit = curve.fit_curve(&[1.0, 2.0], &[SE2::identity(); 2]).unwrap();
        assert_eq!(curve.times(), vec![1.0, 2.0]);
        assert!(refit.iter().all(|k| !keys.contains(k)));
    }

    #[test]
    fn set_curve_keeps_content() {
        let mut curve = along_x(&[0.0, 2.0]);
        curve.set_curve(&[1.0], &[SE2::new(1.0, 1.0, 0.0)]).unwrap();
        assert_eq!(curve.times(), vec![0.0, 1.0, 2.0]);
        assert_approx_eq!(curve.evaluate(1.0).unwrap().translation().y, 1.0);
    }

    #[test]
    fn extend_follows_sampling_params() {
        let mut curve = along_x(&[0.0, 1.0]);
        curve.set_sampling_ratio(2);
        for t in [2.0, 3.0, 4.0] {
            curve.extend(&[t], &[SE2::new(t, 0.0, 0.0)]).unwrap();
        }
        assert_eq!(curve.times(), vec![0.0, 2.0, 4.0]);
        assert_eq!(curve.max_time(), Ok(4.0));
    }

    #[test]
    fn optimizer_round_trip() {
        let mut curve = along_x(&[0.0, 1.0, 2.0]);
        let keys = curve.keys();
        let mut values = Values::new();
        curve.initialize_values(&keys[1..2], &mut values).unwrap();
        assert_eq!(values.len(), 1);

        values[keys[1]] = values[keys[1]].retract(&[0.0, 1.0, 0.0]);
        curve.update_from_values(&values);
        assert_approx_eq!(curve.evaluate(1.0).unwrap().translation().y, 1.0);
        assert_eq!(curve.time_at_key(keys[1]), Ok(1.0));

        let mut all = Values::new();
        curve.initialize_all_values(&mut all);
        assert_eq!(all.len(), 3);
    }

    #[test]
    fn priors_around_a_time() {
        let curve = along_x(&[0.0, 1.0, 2.0]);
        let keys = curve.keys();
        let [a, b] = curve.prior_factors(1.5).unwrap();
        assert_eq!((a.key, b.key), (keys[1], keys[2]));
        assert_eq!(a.measured, SE2::new(1.0, 0.0, 0.0));
        assert_eq!(a.sigmas, [PRIOR_SIGMA; SE2::DOF]);
        assert_eq!(b.sigmas, [PRIOR_SIGMA; SE2::DOF]);
        assert!(curve.prior_factors(3.0).is_err());

        let mut spatial = SlerpSE3Curve::new();
        spatial.fit_curve(&[0.0, 1.0], &[SE3::identity(); 2]).unwrap();
        let [a, _] = spatial.prior_factors(0.5).unwrap();
        assert_eq!(a.sigmas, [PRIOR_SIGMA; SE3::DOF]);
    }

    #[test]
    fn transform_se3_curve() {
        let mut curve = SlerpSE3Curve::new();
        let poses = [
            SE3::from_translation(Vector3::new(1.0, 0.0, 0.0)),
            SE3::from_translation(Vector3::new(2.0, 0.0, 0.0)),
        ];
        curve.fit_curve(&[0.0, 1.0], &poses).unwrap();

        let quarter_turn = Quaternion::from_angle_z(Rad(0.5 * std::f64::consts::PI));
        let turn = SE3::new(Vector3::new(0.0, 0.0, 1.0), quarter_turn);
        curve.transform_curve(&turn).unwrap();

        let start = curve.evaluate(0.0).unwrap().translation();
        assert_approx_eq!(start.x, 0.0);
        assert_approx_eq!(start.y, 1.0);
        assert_approx_eq!(start.z, 1.0);
        let mid = curve.evaluate(0.5).unwrap().translation();
        assert_approx_eq!(mid.y, 1.5);
    }

    #[test]
    fn time_range_is_fixed() {
        let mut curve = along_x(&[0.0, 1.0]);
        assert!(matches!(curve.set_time_range(0.0, 2.0), Err(CurveError::Unimplemented(_))));
        assert_eq!(curve.time_range().unwrap().max, 1.0);
    }

    #[test]
    fn summary() {
        let curve = along_x(&[0.0, 1.0, 2.0]);
        let text = curve.to_string();
        assert!(text.starts_with("slerp curve with 3 coefficients over [0, 2]"));
        assert!(text.contains("average spacing 1, average step 1"));
        assert!(text.contains("  1: [1.0, 0.0, 0.0]"));
    }

    #[test]
    fn clear_resets() {
        let mut curve = along_x(&[0.0, 1.0]);
        curve.clear();
        assert!(curve.is_empty());
        assert!(curve.min_time().is_err());
    }
}
