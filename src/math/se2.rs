use super::{LieGroup, Vector2d};
use cgmath::{Matrix2, Rad, Zero};
#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};
use std::f64::consts::PI;

/// Below this rotation angle the exp/log maps switch to series expansions.
const SMALL_ANGLE: f64 = 1e-9;

/// A rigid transform in the plane: a translation and a heading in radians.
///
/// The tangent space is ordered `[vx, vy, ω]`.
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct SE2 {
    translation: Vector2d,
    heading: f64,
}

impl SE2 {
    /// Creates a transform. The heading is wrapped into `(-π, π]`.
    pub fn new(x: f64, y: f64, heading: f64) -> Self {
        Self {
            translation: Vector2d::new(x, y),
            heading: wrap_angle(heading),
        }
    }

    pub fn translation(&self) -> Vector2d {
        self.translation
    }

    /// The heading in radians, within `(-π, π]`.
    pub fn heading(&self) -> f64 {
        self.heading
    }

    /// Applies the transform to a point.
    pub fn transform_point(&self, point: Vector2d) -> Vector2d {
        rotation(self.heading) * point + self.translation
    }
}

impl Default for SE2 {
    fn default() -> Self {
        Self::identity()
    }
}

impl LieGroup for SE2 {
    type Tangent = [f64; 3];

    const DOF: usize = 3;

    fn identity() -> Self {
        Self {
            translation: Vector2d::zero(),
            heading: 0.0,
        }
    }

    fn compose(&self, other: &Self) -> Self {
        Self {
            translation: self.translation + rotation(self.heading) * other.translation,
            heading: wrap_angle(self.heading + other.heading),
        }
    }

    fn inverse(&self) -> Self {
        Self {
            translation: -(rotation(-self.heading) * self.translation),
            heading: wrap_angle(-self.heading),
        }
    }

    fn exp(tangent: &[f64; 3]) -> Self {
        let [vx, vy, w] = *tangent;
        let translation = if w.abs() < SMALL_ANGLE {
            Vector2d::new(vx - 0.5 * w * vy, vy + 0.5 * w * vx)
        } else {
            let (s, c) = (w.sin() / w, (1.0 - w.cos()) / w);
            Vector2d::new(s * vx - c * vy, c * vx + s * vy)
        };
        Self {
            translation,
            heading: wrap_angle(w),
        }
    }

    fn log(&self) -> [f64; 3] {
        let w = self.heading;
        let Vector2d { x, y } = self.translation;
        if w.abs() < SMALL_ANGLE {
            return [x + 0.5 * w * y, y - 0.5 * w * x, w];
        }
        let half = 0.5 * w;
        let a = half / half.tan();
        [a * x + half * y, -half * x + a * y, w]
    }
}

fn rotation(angle: f64) -> Matrix2<f64> {
    Matrix2::from_angle(Rad(angle))
}

/// Wraps an angle into `(-π, π]`.
pub(crate) fn wrap_angle(angle: f64) -> f64 {
    if angle > -PI && angle <= PI {
        return angle;
    }
    let wrapped = (angle + PI).rem_euclid(2.0 * PI) - PI;
    if wrapped <= -PI {
        PI
    } else {
        wrapped
    }
}
