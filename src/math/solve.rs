use nalgebra::{DMatrix, DVector};

/// Solves the square system `a x = b`.
///
/// Returns `None` if the system is singular or the solution is not finite.
pub fn solve_linear_system(a: DMatrix<f64>, b: &DVector<f64>) -> Option<DVector<f64>> {
    if !a.is_square() || a.nrows() != b.len() {
        return None;
    }
    let lu = a.full_piv_lu();
    if !lu.is_invertible() {
        return None;
    }
    lu.solve(b).filter(|x| x.iter().all(|v| v.is_finite()))
}

#[cfg(test)]
mod test {
    use super::*;
    use assert_approx_eq::assert_approx_eq;

    #[test]
    fn two_by_two() {
        let a = DMatrix::from_row_slice(2, 2, &[2.0, 1.0, 1.0, 3.0]);
        let b = DVector::from_vec(vec![3.0, 5.0]);
        let x = solve_linear_system(a, &b).unwrap();
        assert_approx_eq!(x[0], 0.8);
        assert_approx_eq!(x[1], 1.4);
    }

    #[test]
    fn singular() {
        let a = DMatrix::from_row_slice(2, 2, &[1.0, 2.0, 2.0, 4.0]);
        let b = DVector::from_vec(vec![1.0, 2.0]);
        assert!(solve_linear_system(a, &b).is_none());
    }

    #[test]
    fn not_square() {
        let a = DMatrix::from_row_slice(1, 2, &[1.0, 2.0]);
        let b = DVector::from_vec(vec![1.0]);
        assert!(solve_linear_system(a, &b).is_none());
    }
}
