use crate::coefficient::ManifoldCoefficient;
use crate::error::{check_sizes, Result};
use crate::manager::{Bracket, CoefficientManager};
use crate::math::{scale_tangent, LieGroup};
use crate::{CoefficientKey, Time};
use log::debug;
#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Parameters limiting how densely [SlerpPolicy::extend] adds coefficients.
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct SamplingParams {
    /// The minimum time between two committed coefficients.
    pub min_sampling_period: Time,
    /// Commit a new coefficient at most once per this many observations.
    pub sampling_ratio: usize,
}

impl Default for SamplingParams {
    fn default() -> Self {
        Self {
            min_sampling_period: 0.0,
            sampling_ratio: 1,
        }
    }
}

/// Geodesic interpolation between coefficients, and the rules for
/// extending a curve with new observations.
#[derive(Clone, Debug, Default)]
pub struct SlerpPolicy {
    params: SamplingParams,
    /// Observations received since a coefficient was last committed.
    measurements_since_extend: usize,
    /// The time of the last committed coefficient.
    last_extend: Option<Time>,
}

impl SlerpPolicy {
    pub fn new(params: SamplingParams) -> Self {
        Self {
            params,
            ..Default::default()
        }
    }

    pub fn params(&self) -> &SamplingParams {
        &self.params
    }

    pub fn set_min_sampling_period(&mut self, period: Time) {
        self.params.min_sampling_period = period;
    }

    /// E.g. a ratio of 4 adds a coefficient every 4th extension.
    pub fn set_sampling_ratio(&mut self, ratio: usize) {
        self.params.sampling_ratio = ratio;
    }

    /// Forgets the extension history. Use whenever the curve is refit or cleared.
    pub fn reset(&mut self) {
        self.measurements_since_extend = 0;
        self.last_extend = None;
    }

    /// Evaluates `a ∘ Exp(α · Log(a⁻¹ ∘ b))` for the bracket `(a, b)`.
    ///
    /// At `α = 0` and `α = 1` the stored coefficients are returned as is.
    pub fn interpolate<G: LieGroup>(bracket: &Bracket<'_, G>, time: Time) -> G {
        let alpha = bracket.alpha(time);
        if alpha == 0.0 {
            return *bracket.a.coefficient;
        }
        if alpha == 1.0 {
            return *bracket.b.coefficient;
        }
        let a = bracket.a.coefficient;
        let delta = a.between(bracket.b.coefficient).log();
        a.compose(&G::exp(&scale_tangent::<G>(&delta, alpha)))
    }

    /// Adds observations to the curve held by `manager`.
    ///
    /// A single observation past the end of a curve with at least two
    /// coefficients becomes a new coefficient only if at least
    /// `sampling_ratio` observations have arrived and `min_sampling_period`
    /// has elapsed since the last committed coefficient. Otherwise the
    /// trailing coefficient is moved onto the observation, which gives it a
    /// new key. Anything else is inserted as is.
    pub fn extend<C: ManifoldCoefficient>(
        &mut self,
        manager: &mut CoefficientManager<C>,
        times: &[Time],
        values: &[C],
    ) -> Result<Vec<CoefficientKey>> {
        check_sizes(times, values)?;

        let tail = match (manager.max_time(), times) {
            (Some(tail), &[time]) if manager.len() >= 2 && time > tail => tail,
            _ => {
                let keys = manager.insert_many(times, values)?;
                self.measurements_since_extend = 0;
                self.last_extend = manager.max_time();
                debug!("inserted {} coefficients directly", keys.len());
                return Ok(keys);
            }
        };

        let (time, value) = (times[0], values[0]);
        self.measurements_since_extend += 1;
        let last_extend = *self.last_extend.get_or_insert(tail);
        let commit = self.measurements_since_extend >= self.params.sampling_ratio
            && time - last_extend >= self.params.min_sampling_period;

        if commit {
            self.measurements_since_extend = 0;
            self.last_extend = Some(time);
            debug!("committing a coefficient at {}", time);
        } else {
            manager.remove_at_time(tail);
            debug!("moving the trailing coefficient from {} to {}", tail, time);
        }
        Ok(vec![manager.insert(time, value)?])
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::math::SE2;
    use assert_approx_eq::assert_approx_eq;

    fn straight_line(times: &[Time]) -> CoefficientManager<SE2> {
        let mut manager = CoefficientManager::new();
        for &t in times {
            manager.insert(t, SE2::new(t, 0.0, 0.0)).unwrap();
        }
        manager
    }

    #[test]
    fn interpolation_is_exact_at_samples() {
        let manager = straight_line(&[0.0, 1.0, 2.0]);
        for t in [0.0, 1.0, 2.0] {
            let bracket = manager.bracket_at(t).unwrap();
            let value = SlerpPolicy::interpolate(&bracket, t);
            assert_eq!(value, SE2::new(t, 0.0, 0.0));
        }
    }

    #[test]
    fn interpolation_follows_the_geodesic() {
        let mut manager = CoefficientManager::new();
        let p1 = SE2::new(0.0, 0.0, 0.0);
        let p2 = SE2::new(0.0, 2.0, std::f64::consts::PI);
        manager.insert(1.0, p1).unwrap();
        manager.insert(2.0, p2).unwrap();

        let bracket = manager.bracket_at(1.5).unwrap();
        let mid = SlerpPolicy::interpolate(&bracket, 1.5);

        // Rotating half way along a circle of radius 1 from p1 to p2
        assert_approx_eq!(mid.heading(), 0.5 * std::f64::consts::PI);
        assert_approx_eq!(mid.translation().x, 1.0);
        assert_approx_eq!(mid.translation().y, 1.0);

        let half = p1.between(&p2).log().map(|x| 0.5 * x);
        assert!(mid.equals(&p1.compose(&SE2::exp(&half)), 1e-12));
    }

    #[test]
    fn extend_every_observation_by_default() {
        let mut manager = straight_line(&[0.0, 1.0]);
        let mut policy = SlerpPolicy::default();
        for t in [1.5, 2.0, 2.5] {
            policy.extend(&mut manager, &[t], &[SE2::new(t, 0.0, 0.0)]).unwrap();
        }
        assert_eq!(manager.times(), vec![0.0, 1.0, 1.5, 2.0, 2.5]);
    }

    #[test]
    fn extend_with_sampling_ratio() {
        let mut manager = straight_line(&[0.0, 1.0]);
        let mut policy = SlerpPolicy::new(SamplingParams {
            sampling_ratio: 3,
            ..Default::default()
        });
        let times = [2.0, 3.0, 4.0, 5.0, 6.0];
        for t in times {
            let keys = policy.extend(&mut manager, &[t], &[SE2::new(t, 0.0, 0.0)]).unwrap();
            assert_eq!(keys.len(), 1);
            assert_eq!(manager.max_time(), Some(t));
        }
        // 2 and 3 drag the tail, 4 freezes it and starts a new one,
        // which 5 and 6 drag along
        assert_eq!(manager.times(), vec![0.0, 3.0, 6.0]);
    }

    #[test]
    fn extend_with_min_sampling_period() {
        let mut manager = straight_line(&[0.0, 1.0]);
        let mut policy = SlerpPolicy::new(SamplingParams {
            min_sampling_period: 0.5,
            ..Default::default()
        });
        for t in [1.2, 1.4, 1.6, 1.8] {
            policy.extend(&mut manager, &[t], &[SE2::new(t, 0.0, 0.0)]).unwrap();
        }
        // 1.2 and 1.4 are too close to 1.0, 1.6 is committed, 1.8 drags the tail
        assert_eq!(manager.times(), vec![0.0, 1.4, 1.8]);
    }

    #[test]
    fn extend_needs_both_ratio_and_period() {
        let mut manager = straight_line(&[0.0, 1.0]);
        let mut policy = SlerpPolicy::new(SamplingParams {
            min_sampling_period: 1.0,
            sampling_ratio: 2,
        });
        // The ratio is met from the 2nd observation on, the period only by 2.1
        for t in [1.1, 1.2, 1.5, 2.1] {
            policy.extend(&mut manager, &[t], &[SE2::new(t, 0.0, 0.0)]).unwrap();
        }
        assert_eq!(manager.times(), vec![0.0, 1.5, 2.1]);
    }

    #[test]
    fn extend_inserts_batches_and_short_curves_directly() {
        let mut manager = CoefficientManager::new();
        let mut policy = SlerpPolicy::new(SamplingParams {
            sampling_ratio: 10,
            ..Default::default()
        });
        policy.extend(&mut manager, &[0.0], &[SE2::identity()]).unwrap();
        policy.extend(&mut manager, &[1.0], &[SE2::identity()]).unwrap();
        policy
            .extend(&mut manager, &[0.5, 3.0], &[SE2::identity(), SE2::identity()])
            .unwrap();
        assert_eq!(manager.times(), vec![0.0, 0.5, 1.0, 3.0]);
    }

    #[test]
    fn extend_size_mismatch() {
        let mut manager = CoefficientManager::new();
        let mut policy = SlerpPolicy::default();
        assert!(policy.extend(&mut manager, &[0.0, 1.0], &[SE2::identity()]).is_err());
        assert!(manager.is_empty());
    }
}
