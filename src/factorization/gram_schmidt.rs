//! Thin QR with the Gram–Schmidt normalization: `R` has a positive real diagonal.
//!
//! Faer's Householder QR does the orthogonalization; the column phases of
//! `Q` are then rotated so that every `R_kk` is real and positive.

use faer::linalg::solvers::Qr as QrFactor;

use crate::core::scalar::{RealScalar, Scalar};
use crate::error::{LinalgError, Result};
use crate::factorization::{Solve, dense_matrix, solve_lstsq_with, to_field};
use crate::matrix::Matrix;

#[derive(Debug, Clone)]
pub struct GramSchmidt<T: Scalar> {
    factor: QrFactor<T::Field>,
    q: Vec<T>,
    r: Vec<T>,
    rows: usize,
    columns: usize,
}

impl<T: Scalar> GramSchmidt<T> {
    /// Factor `a` (`m × n`, `m ≥ n`, full column rank) as `Q R` with `Q` `m × n`.
    pub fn new(a: &Matrix<T>) -> Result<Self> {
        let (m, n) = (a.row_count(), a.column_count());
        if m < n {
            return Err(LinalgError::invalid(
                "matrix",
                format!("Gram-Schmidt needs at least as many rows as columns, got {m}x{n}"),
            ));
        }
        let factor = QrFactor::<T::Field>::new(to_field(a).as_ref());
        let thin_q = factor.compute_thin_Q();
        let thin_r = factor.thin_R();

        let scale = a.frobenius_norm();
        let tolerance = scale * <T::Real as RealScalar>::epsilon() * T::Real::from_usize(m.max(1));
        let mut q = vec![T::zero(); m * n];
        let mut r = vec![T::zero(); n * n];
        for k in 0..n {
            let pivot = T::from_field(thin_r[(k, k)]);
            let norm = pivot.magnitude();
            if norm <= tolerance {
                return Err(LinalgError::FactorError(format!(
                    "matrix is rank deficient: column {k} is linearly dependent on the previous columns"
                )));
            }
            let phase = pivot / T::from_real(norm);
            for i in 0..m {
                q[k * m + i] = T::from_field(thin_q[(i, k)]) * phase;
            }
            let back = phase.conjugate();
            for j in k..n {
                r[j * n + k] = back * T::from_field(thin_r[(k, j)]);
            }
            r[k * n + k] = T::from_real(norm);
        }

        Ok(Self {
            factor,
            q,
            r,
            rows: m,
            columns: n,
        })
    }

    /// Orthonormal `m × n` factor.
    pub fn q(&self) -> Result<Matrix<T>> {
        dense_matrix(self.rows, self.columns, self.q.clone())
    }

    /// Upper triangular `n × n` factor with a positive diagonal.
    pub fn r(&self) -> Result<Matrix<T>> {
        dense_matrix(self.columns, self.columns, self.r.clone())
    }
}

impl<T: Scalar> Solve<T> for GramSchmidt<T> {
    fn input_len(&self) -> usize {
        self.rows
    }

    fn output_len(&self) -> usize {
        self.columns
    }

    fn solve_column(&self, b: &[T]) -> Result<Vec<T>> {
        Ok(solve_lstsq_with(&self.factor, b, self.columns))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    #[test]
    fn columns_are_orthonormal() {
        let a = Matrix::dense_from_fn(4, 3, |i, j| ((i + 1) * (j + 1)) as f64 + if i == j { 3.0 } else { 0.0 });
        let gs = GramSchmidt::new(&a).unwrap();
        let q = gs.q().unwrap();
        let qtq = q.transpose_this_and_multiply(&q).unwrap();
        for i in 0..3 {
            for j in 0..3 {
                assert_abs_diff_eq!(qtq.at(i, j).unwrap(), if i == j { 1.0 } else { 0.0 }, epsilon = 1e-12);
            }
        }
        let back = q.multiply(&gs.r().unwrap()).unwrap();
        for (x, y) in back.to_column_major().iter().zip(a.to_column_major()) {
            assert_abs_diff_eq!(*x, y, epsilon = 1e-12);
        }
    }

    #[test]
    fn diagonal_of_r_is_positive() {
        let a = Matrix::dense_from_fn(3, 2, |i, j| [[-1.0, 2.0], [0.0, -3.0], [0.0, 0.0]][i][j]);
        let r = GramSchmidt::new(&a).unwrap().r().unwrap();
        assert_abs_diff_eq!(r.at(0, 0).unwrap(), 1.0, epsilon = 1e-12);
        assert_abs_diff_eq!(r.at(0, 1).unwrap(), -2.0, epsilon = 1e-12);
        assert_abs_diff_eq!(r.at(1, 1).unwrap(), 3.0, epsilon = 1e-12);
    }

    #[test]
    fn dependent_columns_fail() {
        let a = Matrix::dense_from_fn(3, 2, |i, _| i as f64 + 1.0);
        assert!(matches!(GramSchmidt::new(&a), Err(LinalgError::FactorError(_))));
    }
}
