/// The group operations a pose type must provide to be interpolated
/// and optimized.
///
/// Implementations must satisfy `exp(&x.log()) == x` and
/// `x.compose(&x.inverse()) == identity()` up to rounding.
pub trait LieGroup: Copy {
    /// A tangent-space vector, one entry per degree of freedom.
    type Tangent: Copy + Default + AsRef<[f64]> + AsMut<[f64]>;

    /// Degrees of freedom of the group.
    const DOF: usize;

    fn identity() -> Self;

    /// `self ∘ other`
    fn compose(&self, other: &Self) -> Self;

    fn inverse(&self) -> Self;

    /// The exponential map from the tangent space at identity.
    fn exp(tangent: &Self::Tangent) -> Self;

    /// The logarithm map, inverse of [LieGroup::exp].
    fn log(&self) -> Self::Tangent;

    /// `self⁻¹ ∘ other`, the transform taking `self` to `other`.
    fn between(&self, other: &Self) -> Self {
        self.inverse().compose(other)
    }
}

/// Multiplies every component of a tangent vector by `factor`.
pub(crate) fn scale_tangent<G: LieGroup>(tangent: &G::Tangent, factor: f64) -> G::Tangent {
    let mut out = *tangent;
    for x in out.as_mut() {
        *x *= factor;
    }
    out
}

/// The infinity norm of a tangent vector.
pub(crate) fn max_abs(tangent: &[f64]) -> f64 {
    tangent.iter().fold(0.0, |acc, x| f64::max(acc, x.abs()))
}
