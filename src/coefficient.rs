//! Manifold-valued coefficients, as seen by an optimizer.

use crate::error::{CurveError, Result};
use crate::math::{max_abs, LieGroup, SE2, SE3};
use cgmath::{Matrix4, Quaternion, Vector3};

/// The operations an optimizer needs to treat a group value as a variable.
///
/// Increments live in the tangent space and are applied on the left:
/// `retract(x, δ) = Exp(δ) ∘ x` and `local_coordinates(x, y) = Log(y ∘ x⁻¹)`.
pub trait ManifoldCoefficient: LieGroup {
    /// Length of the flat coefficient vector.
    const COEFFICIENT_DIM: usize;

    /// Maps the value to a unique representative.
    fn canonicalize(&self) -> Self;

    /// Flattens the value into its coefficient vector.
    fn to_coefficients(&self) -> Vec<f64>;

    /// Builds a value from a coefficient vector of length
    /// [ManifoldCoefficient::COEFFICIENT_DIM].
    fn from_coefficients(coeffs: &[f64]) -> Result<Self>;

    /// Writes the coefficient vector into pre-sized storage.
    fn write_coefficients(&self, out: &mut [f64]) -> Result<()> {
        check_dim(Self::COEFFICIENT_DIM, out.len())?;
        out.copy_from_slice(&self.to_coefficients());
        Ok(())
    }

    fn retract(&self, delta: &Self::Tangent) -> Self {
        Self::exp(delta).compose(self)
    }

    fn local_coordinates(&self, other: &Self) -> Self::Tangent {
        other.compose(&self.inverse()).log()
    }

    /// Compares two values by their tangent-space distance, so that
    /// different representations of the same element are equal.
    fn equals(&self, other: &Self, tol: f64) -> bool {
        max_abs(self.local_coordinates(other).as_ref()) < tol
    }
}

fn check_dim(expected: usize, actual: usize) -> Result<()> {
    if expected != actual {
        return Err(CurveError::DimensionMismatch { expected, actual });
    }
    Ok(())
}

/// Stored as `[tx, ty, tz, qw, qx, qy, qz]`.
impl ManifoldCoefficient for SE3 {
    const COEFFICIENT_DIM: usize = 7;

    fn canonicalize(&self) -> Self {
        let q = self.rotation();
        if q.s < 0.0 {
            SE3::new(self.translation(), -q)
        } else {
            *self
        }
    }

    fn to_coefficients(&self) -> Vec<f64> {
        let t = self.translation();
        let q = self.rotation();
        vec![t.x, t.y, t.z, q.s, q.v.x, q.v.y, q.v.z]
    }

    fn from_coefficients(coeffs: &[f64]) -> Result<Self> {
        check_dim(Self::COEFFICIENT_DIM, coeffs.len())?;
        Ok(SE3::new(
            Vector3::new(coeffs[0], coeffs[1], coeffs[2]),
            Quaternion::new(coeffs[3], coeffs[4], coeffs[5], coeffs[6]),
        ))
    }
}

impl SE3 {
    /// Writes the coefficients of a homogeneous transform matrix into
    /// storage pre-sized to [ManifoldCoefficient::COEFFICIENT_DIM].
    pub fn write_matrix_coefficients(matrix: &Matrix4<f64>, out: &mut [f64]) -> Result<()> {
        SE3::from_matrix(matrix).write_coefficients(out)
    }
}

/// Stored as `[x, y, θ]`.
impl ManifoldCoefficient for SE2 {
    const COEFFICIENT_DIM: usize = 3;

    fn canonicalize(&self) -> Self {
        // Headings are wrapped on construction
        SE2::new(self.translation().x, self.translation().y, self.heading())
    }

    fn to_coefficients(&self) -> Vec<f64> {
        let t = self.translation();
        vec![t.x, t.y, self.heading()]
    }

    fn from_coefficients(coeffs: &[f64]) -> Result<Self> {
        check_dim(Self::COEFFICIENT_DIM, coeffs.len())?;
        Ok(SE2::new(coeffs[0], coeffs[1], coeffs[2]))
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use assert_approx_eq::assert_approx_eq;
    use cgmath::prelude::*;
    use cgmath::Rad;
    use rand::{Rng, SeedableRng};

    fn random_se3(rng: &mut impl Rng) -> SE3 {
        let axis = Vector3::new(
            rng.gen_range(-1.0..1.0),
            rng.gen_range(-1.0..1.0),
            rng.gen_range(-1.0..1.0),
        )
        .normalize();
        let rotation = Quaternion::from_axis_angle(axis, Rad(rng.gen_range(-3.0..3.0)));
        let translation = Vector3::new(
            rng.gen_range(-5.0..5.0),
            rng.gen_range(-5.0..5.0),
            rng.gen_range(-5.0..5.0),
        );
        SE3::new(translation, rotation)
    }

    #[test]
    fn local_coordinates_invert_retract() {
        let mut rng = rand::rngs::StdRng::from_seed(*b"Vegemite sandwhich is not fun...");
        for _ in 0..100 {
            let x = random_se3(&mut rng);
            let delta: [f64; 6] = std::array::from_fn(|_| rng.gen_range(-1e-3..1e-3));
            let recovered = x.local_coordinates(&x.retract(&delta));
            for (a, b) in recovered.iter().zip(delta) {
                assert_approx_eq!(*a, b, 1e-9);
            }
        }
    }

    #[test]
    fn retract_of_local_coordinates() {
        let mut rng = rand::rngs::StdRng::from_seed(*b"Vegemite sandwhich is not fun...");
        for _ in 0..100 {
            let x = random_se3(&mut rng);
            let y = random_se3(&mut rng);
            assert!(x.retract(&x.local_coordinates(&y)).equals(&y, 1e-8));
        }
    }

    #[test]
    fn canonicalize_is_idempotent() {
        let flipped = SE3::from_coefficients(&[1.0, 2.0, 3.0, -0.5, 0.5, -0.5, 0.5]).unwrap();
        let once = flipped.canonicalize();
        assert!(once.rotation().s >= 0.0);
        assert_eq!(once.canonicalize(), once);
        assert!(flipped.equals(&once, 1e-12));
        // The raw components differ but the elements are the same
        assert_ne!(flipped.to_coefficients(), once.to_coefficients());
    }

    #[test]
    fn se2_canonicalize() {
        let pose = SE2::new(1.0, -1.0, 7.0);
        assert_eq!(pose.canonicalize(), pose.canonicalize().canonicalize());
        assert!(pose.equals(&pose.canonicalize(), 1e-12));
        assert!(pose.heading() <= std::f64::consts::PI);
    }

    #[test]
    fn equals_rejects_distinct_values() {
        let a = SE2::new(0.0, 0.0, 0.0);
        let b = SE2::new(0.0, 0.1, 0.0);
        assert!(!a.equals(&b, 0.01));
        assert!(a.equals(&b, 0.2));
    }

    #[test]
    fn coefficient_layout() {
        let pose = SE3::new(Vector3::new(1.0, 2.0, 3.0), Quaternion::new(1.0, 0.0, 0.0, 0.0));
        assert_eq!(pose.to_coefficients(), vec![1.0, 2.0, 3.0, 1.0, 0.0, 0.0, 0.0]);
        let mut out = [0.0; 7];
        pose.write_coefficients(&mut out).unwrap();
        assert_eq!(out, [1.0, 2.0, 3.0, 1.0, 0.0, 0.0, 0.0]);
    }

    #[test]
    fn dimension_mismatch() {
        let mut short = [0.0; 6];
        assert_eq!(
            SE3::identity().write_coefficients(&mut short),
            Err(CurveError::DimensionMismatch { expected: 7, actual: 6 })
        );
        assert_eq!(
            SE2::from_coefficients(&[0.0; 4]),
            Err(CurveError::DimensionMismatch { expected: 3, actual: 4 })
        );
        let matrix = Matrix4::from_translation(Vector3::new(1.0, 0.0, 0.0));
        assert!(SE3::write_matrix_coefficients(&matrix, &mut short).is_err());
        let mut out = vec![0.0; 7];
        SE3::write_matrix_coefficients(&matrix, &mut out).unwrap();
        assert_approx_eq!(out[0], 1.0);
        assert_approx_eq!(out[3].abs(), 1.0);
    }
}
