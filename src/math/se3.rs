use super::{LieGroup, Vector3d};
use cgmath::prelude::*;
use cgmath::{Matrix3, Matrix4, One, Quaternion, Zero};
#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Below this rotation angle the rotation maps switch to series expansions.
const SMALL_ANGLE: f64 = 1e-6;

/// Below this rotation angle the translation Jacobian uses series expansions.
const SERIES_ANGLE: f64 = 1e-2;

/// A rigid transform in 3D: a translation and a unit quaternion rotation.
///
/// The tangent space is ordered `[ρx, ρy, ρz, ωx, ωy, ωz]`, translational
/// part first.
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct SE3 {
    translation: Vector3d,
    rotation: Quaternion<f64>,
}

impl SE3 {
    /// Creates a transform. The rotation is normalised.
    pub fn new(translation: Vector3d, rotation: Quaternion<f64>) -> Self {
        Self {
            translation,
            rotation: rotation.normalize(),
        }
    }

    /// A pure translation.
    pub fn from_translation(translation: Vector3d) -> Self {
        Self::new(translation, Quaternion::one())
    }

    /// Extracts the transform from a homogeneous 4x4 matrix.
    /// The upper-left block must be a rotation matrix.
    pub fn from_matrix(matrix: &Matrix4<f64>) -> Self {
        let rotation = Matrix3::from_cols(
            matrix.x.truncate(),
            matrix.y.truncate(),
            matrix.z.truncate(),
        );
        Self::new(matrix.w.truncate(), Quaternion::from(rotation))
    }

    /// The homogeneous 4x4 matrix of this transform.
    pub fn to_matrix(&self) -> Matrix4<f64> {
        Matrix4::from_translation(self.translation) * Matrix4::from(self.rotation)
    }

    pub fn translation(&self) -> Vector3d {
        self.translation
    }

    pub fn rotation(&self) -> Quaternion<f64> {
        self.rotation
    }

    /// Applies the transform to a point.
    pub fn transform_point(&self, point: Vector3d) -> Vector3d {
        self.rotation * point + self.translation
    }
}

impl Default for SE3 {
    fn default() -> Self {
        Self::identity()
    }
}

impl LieGroup for SE3 {
    type Tangent = [f64; 6];

    const DOF: usize = 6;

    fn identity() -> Self {
        Self {
            translation: Vector3d::zero(),
            rotation: Quaternion::one(),
        }
    }

    fn compose(&self, other: &Self) -> Self {
        Self {
            translation: self.translation + self.rotation * other.translation,
            rotation: (self.rotation * other.rotation).normalize(),
        }
    }

    fn inverse(&self) -> Self {
        let rotation = self.rotation.conjugate();
        Self {
            translation: -(rotation * self.translation),
            rotation,
        }
    }

    fn exp(tangent: &[f64; 6]) -> Self {
        let rho = Vector3d::new(tangent[0], tangent[1], tangent[2]);
        let omega = Vector3d::new(tangent[3], tangent[4], tangent[5]);
        let theta2 = omega.magnitude2();
        let theta = theta2.sqrt();

        let (b, c) = if theta < SERIES_ANGLE {
            (
                0.5 - theta2 / 24.0 + theta2 * theta2 / 720.0,
                1.0 / 6.0 - theta2 / 120.0 + theta2 * theta2 / 5040.0,
            )
        } else {
            let half_sin = (0.5 * theta).sin();
            (
                2.0 * half_sin * half_sin / theta2,
                (theta - theta.sin()) / (theta2 * theta),
            )
        };

        // t = V ρ, with V the left Jacobian of SO(3)
        let w_rho = omega.cross(rho);
        let translation = rho + w_rho * b + omega.cross(w_rho) * c;

        Self {
            translation,
            rotation: so3_exp(omega),
        }
    }

    fn log(&self) -> [f64; 6] {
        let omega = so3_log(self.rotation);
        let theta2 = omega.magnitude2();
        let theta = theta2.sqrt();

        let d = if theta < SERIES_ANGLE {
            1.0 / 12.0 + theta2 / 720.0 + theta2 * theta2 / 30240.0
        } else {
            let half = 0.5 * theta;
            (1.0 - half / half.tan()) / theta2
        };

        // ρ = V⁻¹ t
        let t = self.translation;
        let w_t = omega.cross(t);
        let rho = t - w_t * 0.5 + omega.cross(w_t) * d;

        [rho.x, rho.y, rho.z, omega.x, omega.y, omega.z]
    }
}

/// Rotation vector to unit quaternion.
fn so3_exp(omega: Vector3d) -> Quaternion<f64> {
    let theta = omega.magnitude();
    if theta < SMALL_ANGLE {
        Quaternion::from_sv(1.0, omega * 0.5).normalize()
    } else {
        let half = 0.5 * theta;
        Quaternion::from_sv(half.cos(), omega * (half.sin() / theta))
    }
}

/// Unit quaternion to rotation vector, taking the shorter of the two
/// rotations the quaternion double cover allows.
fn so3_log(rotation: Quaternion<f64>) -> Vector3d {
    let q = if rotation.s < 0.0 { -rotation } else { rotation };
    let n = q.v.magnitude();
    if n < SMALL_ANGLE {
        q.v * (2.0 / q.s)
    } else {
        let theta = 2.0 * n.atan2(q.s);
        q.v * (theta / n)
    }
}
