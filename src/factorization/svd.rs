//! Singular value decomposition `A = U Σ Vᴴ`.
//!
//! Faer computes the decomposition; rank, kernel, range and the
//! pseudo-inverse are read off it with a `max(m, n) · σ_max · ε` cut-off.

use faer::linalg::solvers::{Svd as SvdFactor, SvdError};
use num_traits::{One, Zero};

use crate::core::scalar::{RealScalar, Scalar};
use crate::error::{LinalgError, Result};
use crate::factorization::{Solve, dense_matrix, from_field, to_field};
use crate::matrix::Matrix;
use crate::storage::{DiagonalMatrixStorage, MatrixStorage};
use crate::vector::Vector;

#[derive(Debug, Clone)]
pub struct Svd<T: Scalar> {
    singular_values: Vec<T::Real>,
    vectors: Option<SvdFactor<T::Field>>,
    rows: usize,
    columns: usize,
}

impl<T: Scalar> Svd<T> {
    /// Decompose `a`. Singular vectors are only formed when `compute_vectors` is set.
    pub fn new(a: &Matrix<T>, compute_vectors: bool) -> Result<Self> {
        if a.enumerate_non_zero().any(|(_, _, v)| !v.is_finite()) {
            return Err(LinalgError::FactorError("matrix contains non-finite values".into()));
        }
        let (rows, columns) = (a.row_count(), a.column_count());
        let field = to_field(a);
        let (singular_values, vectors) = if compute_vectors {
            let factor = SvdFactor::<T::Field>::new(field.as_ref()).map_err(svd_failed)?;
            let s = factor.S().column_vector();
            let values = (0..s.nrows()).map(|k| T::from_field(s[k]).real()).collect();
            (values, Some(factor))
        } else {
            (field.singular_values().map_err(svd_failed)?, None)
        };
        Ok(Self {
            singular_values,
            vectors,
            rows,
            columns,
        })
    }

    /// Singular values in descending order.
    pub fn singular_values(&self) -> &[T::Real] {
        &self.singular_values
    }

    fn tolerance(&self) -> T::Real {
        let max = self.singular_values.first().copied().unwrap_or_else(T::Real::zero);
        T::Real::from_usize(self.rows.max(self.columns)) * max * <T::Real as RealScalar>::epsilon()
    }

    /// Number of singular values above `max(m, n) · σ_max · ε`.
    pub fn rank(&self) -> usize {
        let tol = self.tolerance();
        self.singular_values.iter().filter(|&&s| s > tol).count()
    }

    pub fn l2_norm(&self) -> T::Real {
        self.singular_values.first().copied().unwrap_or_else(T::Real::zero)
    }

    /// `σ_max / σ_min`; infinite for a singular matrix.
    pub fn condition_number(&self) -> T::Real {
        match (self.singular_values.first(), self.singular_values.last()) {
            (Some(&max), Some(&min)) if min > T::Real::zero() => max / min,
            (Some(_), Some(_)) => <T::Real as RealScalar>::infinity(),
            _ => T::Real::zero(),
        }
    }

    fn factor(&self) -> Result<&SvdFactor<T::Field>> {
        self.vectors.as_ref().ok_or_else(|| {
            LinalgError::invalid("compute_vectors", "singular vectors were not computed for this decomposition")
        })
    }

    /// Left singular vectors, `m × m`.
    pub fn u(&self) -> Result<Matrix<T>> {
        from_field(self.factor()?.U())
    }

    /// Right singular vectors, `n × n`.
    pub fn v(&self) -> Result<Matrix<T>> {
        from_field(self.factor()?.V())
    }

    pub fn vt(&self) -> Result<Matrix<T>> {
        Ok(self.v()?.conjugate_transpose())
    }

    /// `Σ` as an `m × n` diagonal matrix.
    pub fn w(&self) -> Result<Matrix<T>> {
        let diagonal = self.singular_values.iter().map(|&s| T::from_real(s)).collect();
        Ok(Matrix::from_storage(MatrixStorage::Diagonal(DiagonalMatrixStorage::from_diagonal(
            self.rows,
            self.columns,
            diagonal,
        )?)))
    }

    /// Orthonormal basis of the column space.
    pub fn range(&self) -> Result<Vec<Vector<T>>> {
        let u = self.factor()?.U();
        Ok((0..self.rank())
            .map(|k| Vector::dense_from_vec((0..self.rows).map(|i| T::from_field(u[(i, k)])).collect()))
            .collect())
    }

    /// Orthonormal basis of the null space.
    pub fn kernel(&self) -> Result<Vec<Vector<T>>> {
        let v = self.factor()?.V();
        Ok((self.rank()..self.columns)
            .map(|k| Vector::dense_from_vec((0..self.columns).map(|i| T::from_field(v[(i, k)])).collect()))
            .collect())
    }

    /// Moore–Penrose pseudo-inverse `V Σ⁺ Uᴴ` (`n × m`).
    pub fn pseudo_inverse(&self) -> Result<Matrix<T>> {
        let factor = self.factor()?;
        let (u, v) = (factor.U(), factor.V());
        let (m, n) = (self.rows, self.columns);
        let mut values = vec![T::zero(); n * m];
        for k in 0..self.rank() {
            let inv = T::from_real(T::Real::one() / self.singular_values[k]);
            for j in 0..m {
                let ujk = T::from_field(u[(j, k)]).conjugate() * inv;
                for i in 0..n {
                    values[j * n + i] += T::from_field(v[(i, k)]) * ujk;
                }
            }
        }
        dense_matrix(n, m, values)
    }
}

impl<T: Scalar> Solve<T> for Svd<T> {
    fn input_len(&self) -> usize {
        self.rows
    }

    fn output_len(&self) -> usize {
        self.columns
    }

    /// Minimum-norm least-squares solution.
    fn solve_column(&self, b: &[T]) -> Result<Vec<T>> {
        let factor = self.factor()?;
        let (u, v) = (factor.U(), factor.V());
        let mut x = vec![T::zero(); self.columns];
        for k in 0..self.rank() {
            let coefficient: T = (0..self.rows)
                .map(|i| T::from_field(u[(i, k)]).conjugate() * b[i])
                .sum::<T>()
                / T::from_real(self.singular_values[k]);
            for (i, xi) in x.iter_mut().enumerate() {
                *xi += T::from_field(v[(i, k)]) * coefficient;
            }
        }
        Ok(x)
    }
}

fn svd_failed(e: SvdError) -> LinalgError {
    LinalgError::FactorError(format!("singular value decomposition failed: {e:?}"))
}
