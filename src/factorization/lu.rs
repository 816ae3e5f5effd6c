//! LU factorization with partial (row) pivoting: `P A = L U`.

use faer::linalg::solvers::{DenseSolveCore, PartialPivLu};

use crate::core::scalar::Scalar;
use crate::error::{LinalgError, Result};
use crate::factorization::{Solve, diagonal, from_field, solve_with, to_field};
use crate::matrix::Matrix;
use crate::utils::checks;

/// LU factors of a square matrix.
///
/// `L` is unit lower triangular and `U` upper triangular. Row `i` of `P A`
/// is row `row_permutation()[i]` of `A`.
#[derive(Debug, Clone)]
pub struct Lu<T: Scalar> {
    factor: PartialPivLu<T::Field>,
    permutation: Vec<usize>,
    zero_pivot: Option<usize>,
}

impl<T: Scalar> Lu<T> {
    pub fn new(a: &Matrix<T>) -> Result<Self> {
        checks::square("matrix", a.row_count(), a.column_count())?;
        let factor = PartialPivLu::<T::Field>::new(to_field(a).as_ref());
        let permutation = factor.P().arrays().0.to_vec();
        let zero_pivot = diagonal::<T>(factor.U()).iter().position(|u| *u == T::zero());
        if let Some(k) = zero_pivot {
            log::debug!("LU of a {}x{} matrix has a zero pivot at {k}", a.row_count(), a.column_count());
        }
        Ok(Self {
            factor,
            permutation,
            zero_pivot,
        })
    }

    pub fn is_singular(&self) -> bool {
        self.zero_pivot.is_some()
    }

    pub fn row_permutation(&self) -> &[usize] {
        &self.permutation
    }

    /// Product of the pivots with the sign of the row permutation; zero when singular.
    pub fn determinant(&self) -> T {
        if self.is_singular() {
            return T::zero();
        }
        let det = diagonal::<T>(self.factor.U())
            .into_iter()
            .fold(T::one(), |acc, u| acc * u);
        if permutation_is_odd(&self.permutation) { -det } else { det }
    }

    /// Unit lower triangular factor.
    pub fn lower(&self) -> Result<Matrix<T>> {
        from_field(self.factor.L())
    }

    pub fn upper(&self) -> Result<Matrix<T>> {
        from_field(self.factor.U())
    }

    pub fn inverse(&self) -> Result<Matrix<T>> {
        if let Some(k) = self.zero_pivot {
            return Err(LinalgError::ZeroPivot(k));
        }
        from_field(self.factor.inverse().as_ref())
    }
}

impl<T: Scalar> Solve<T> for Lu<T> {
    fn input_len(&self) -> usize {
        self.permutation.len()
    }

    fn output_len(&self) -> usize {
        self.permutation.len()
    }

    fn solve_column(&self, b: &[T]) -> Result<Vec<T>> {
        if let Some(k) = self.zero_pivot {
            return Err(LinalgError::ZeroPivot(k));
        }
        Ok(solve_with(&self.factor, b, self.permutation.len()))
    }
}

/// Parity from the cycle decomposition: a cycle of length `l` takes `l - 1` swaps.
fn permutation_is_odd(permutation: &[usize]) -> bool {
    let mut seen = vec![false; permutation.len()];
    let mut swaps = 0;
    for start in 0..permutation.len() {
        let mut i = start;
        let mut length: usize = 0;
        while !seen[i] {
            seen[i] = true;
            i = permutation[i];
            length += 1;
        }
        swaps += length.saturating_sub(1);
    }
    swaps % 2 == 1
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::StorageKind;
    use crate::vector::Vector;
    use approx::assert_abs_diff_eq;

    fn sample() -> Matrix<f64> {
        Matrix::dense_from_fn(3, 3, |i, j| [[2.0, 1.0, 1.0], [4.0, -6.0, 0.0], [-2.0, 7.0, 2.0]][i][j])
    }

    #[test]
    fn factors_reproduce_the_permuted_matrix() {
        let a = sample();
        let lu = Lu::new(&a).unwrap();
        let product = lu.lower().unwrap().multiply(&lu.upper().unwrap()).unwrap();
        let rows = a.to_row_arrays();
        for (i, &p) in lu.row_permutation().iter().enumerate() {
            for j in 0..3 {
                assert_abs_diff_eq!(product.at(i, j).unwrap(), rows[p][j], epsilon = 1e-12);
            }
        }
        assert_abs_diff_eq!(lu.determinant(), -16.0, epsilon = 1e-12);
    }

    #[test]
    fn identity_solves_exactly() {
        let lu = Lu::new(&Matrix::<f64>::identity(StorageKind::Dense, 3)).unwrap();
        let b = Vector::dense_from_vec(vec![1.0, 2.0, 3.0]);
        assert_eq!(lu.solve(&b).unwrap().to_vec(), vec![1.0, 2.0, 3.0]);
        assert_eq!(lu.row_permutation(), &[0, 1, 2]);
        assert_eq!(lu.determinant(), 1.0);
    }

    #[test]
    fn singular_matrix_reports_zero_pivot() {
        let a = Matrix::dense_from_fn(2, 2, |i, _| (i + 1) as f64);
        let lu = Lu::new(&a).unwrap();
        assert!(lu.is_singular());
        assert_eq!(lu.determinant(), 0.0);
        assert!(matches!(lu.inverse(), Err(LinalgError::ZeroPivot(1))));
        let b = Vector::dense_from_vec(vec![1.0, 2.0]);
        assert!(matches!(lu.solve(&b), Err(LinalgError::ZeroPivot(1))));
    }

    #[test]
    fn inverse_times_matrix_is_identity() {
        let a = sample();
        let inv = Lu::new(&a).unwrap().inverse().unwrap();
        let id = a.multiply(&inv).unwrap();
        for i in 0..3 {
            for j in 0..3 {
                assert_abs_diff_eq!(id.at(i, j).unwrap(), if i == j { 1.0 } else { 0.0 }, epsilon = 1e-12);
            }
        }
    }

    #[test]
    fn permutation_parity_counts_cycles() {
        assert!(!permutation_is_odd(&[0, 1, 2]));
        assert!(permutation_is_odd(&[1, 0, 2]));
        assert!(!permutation_is_odd(&[1, 2, 0]));
    }
}
