//! Mathematical structs and functions.

use cgmath::{Vector2, Vector3};
pub use basis::{basis, ddtau, dtau, tau};
pub(crate) use basis::dot;
pub use lie::LieGroup;
pub(crate) use lie::{max_abs, scale_tangent};
pub use se2::SE2;
pub use se3::SE3;
pub use solve::solve_linear_system;

mod basis;
mod lie;
mod se2;
mod se3;
mod solve;

/// A 2D vector
pub type Vector2d = Vector2<f64>;

/// A 3D vector
pub type Vector3d = Vector3<f64>;
