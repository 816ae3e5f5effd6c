//! Cholesky factorization `A = L Lᴴ` of a Hermitian positive definite matrix.
//!
//! Only the lower triangle of the input is read.

use faer::Side;
use faer::linalg::solvers::Llt;
use num_traits::{One, Zero};

use crate::core::scalar::Scalar;
use crate::core::traits::MatrixStorageOps;
use crate::error::{LinalgError, Result};
use crate::factorization::{Solve, diagonal, from_field, solve_with, to_field};
use crate::matrix::Matrix;
use crate::utils::checks;

#[derive(Debug, Clone)]
pub struct Cholesky<T: Scalar> {
    factor: Llt<T::Field>,
    order: usize,
}

impl<T: Scalar> Cholesky<T> {
    pub fn new(a: &Matrix<T>) -> Result<Self> {
        checks::square("matrix", a.row_count(), a.column_count())?;
        let n = a.row_count();
        if (0..n).any(|i| a.storage().at(i, i).imaginary() != T::Real::zero()) {
            return Err(LinalgError::NotPositiveDefinite);
        }
        let factor = Llt::<T::Field>::new(to_field(a).as_ref(), Side::Lower).map_err(|e| {
            log::debug!("Cholesky of a {n}x{n} matrix failed: {e:?}");
            LinalgError::NotPositiveDefinite
        })?;
        Ok(Self { factor, order: n })
    }

    /// Lower triangular factor `L`.
    pub fn factor(&self) -> Result<Matrix<T>> {
        from_field(self.factor.L())
    }

    /// `det A = ∏ L_jj²`.
    pub fn determinant(&self) -> T::Real {
        diagonal::<T>(self.factor.L())
            .into_iter()
            .fold(T::Real::one(), |acc, l| acc * l.magnitude_squared())
    }
}

impl<T: Scalar> Solve<T> for Cholesky<T> {
    fn input_len(&self) -> usize {
        self.order
    }

    fn output_len(&self) -> usize {
        self.order
    }

    fn solve_column(&self, b: &[T]) -> Result<Vec<T>> {
        Ok(solve_with(&self.factor, b, self.order))
    }
}
