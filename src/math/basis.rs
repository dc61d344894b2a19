//! Polynomial basis functions.
//!
//! A polynomial with `N` coefficients is stored highest degree first,
//! `[a_k, ..., a_1, a_0]` with `k = N - 1`. Evaluating it, or any of its
//! derivatives, is the dot product of those coefficients with a basis vector.

/// The basis vector for the `derivative`-th derivative of a polynomial
/// with `N` coefficients, evaluated at `t`.
///
/// Entry `i` weights the coefficient of `t^p` with `p = N - 1 - i`, and equals
/// `p! / (p - derivative)! * t^(p - derivative)`, or zero once the derivative
/// has consumed the power.
pub fn basis<const N: usize>(t: f64, derivative: usize) -> [f64; N] {
    let mut out = [0.0; N];
    for (i, weight) in out.iter_mut().enumerate() {
        let power = N - 1 - i;
        if power < derivative {
            continue;
        }
        let factor: f64 = (power - derivative + 1..=power).map(|p| p as f64).product();
        *weight = factor * t.powi((power - derivative) as i32);
    }
    out
}

/// The position basis `[t^k, ..., t, 1]`.
#[inline]
pub fn tau<const N: usize>(t: f64) -> [f64; N] {
    basis(t, 0)
}

/// The velocity basis.
#[inline]
pub fn dtau<const N: usize>(t: f64) -> [f64; N] {
    basis(t, 1)
}

/// The acceleration basis.
#[inline]
pub fn ddtau<const N: usize>(t: f64) -> [f64; N] {
    basis(t, 2)
}

/// Dot product of a coefficient vector with a basis vector.
#[inline]
pub(crate) fn dot<const N: usize>(coeffs: &[f64; N], basis: &[f64; N]) -> f64 {
    coeffs.iter().zip(basis).map(|(c, b)| c * b).sum()
}
