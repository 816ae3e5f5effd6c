//! Dense matrix factorizations and the [`Solve`] capability.
//!
//! The decompositions themselves are faer's. Each wrapper copies its input
//! into a `faer::Mat`, so any storage representation is accepted, and hands
//! factors back as dense [`Matrix`] values. Right-hand sides are solved
//! column by column through [`Solve::solve_column`].

pub mod cholesky;
pub mod evd;
pub mod gram_schmidt;
pub mod lu;
pub mod qr;
pub mod svd;

pub use cholesky::Cholesky;
pub use evd::{Evd, Symmetricity};
pub use gram_schmidt::GramSchmidt;
pub use lu::Lu;
pub use qr::{Qr, QrMethod};
pub use svd::Svd;

use faer::{Conj, Mat, MatMut, MatRef};
use faer::linalg::solvers::{SolveCore, SolveLstsqCore};

use crate::core::scalar::Scalar;
use crate::core::traits::MatrixStorageOps;
use crate::error::{LinalgError, Result, Shape};
use crate::matrix::Matrix;
use crate::storage::{DenseColumnMajorStorage, MatrixStorage};
use crate::utils::checks;
use crate::vector::Vector;

/// A factorization that can solve `A x = b`.
pub trait Solve<T: Scalar> {
    /// Length of a right-hand side (rows of the factored matrix).
    fn input_len(&self) -> usize;
    /// Length of a solution (columns of the factored matrix).
    fn output_len(&self) -> usize;
    /// Solve for a single right-hand side given as a slice of `input_len` values.
    fn solve_column(&self, b: &[T]) -> Result<Vec<T>>;

    fn solve(&self, b: &Vector<T>) -> Result<Vector<T>> {
        checks::same_shape("input", Shape::vector(self.input_len()), b.shape())?;
        Ok(Vector::dense_from_vec(self.solve_column(&b.to_vec())?))
    }

    /// Solve for every column of `b`.
    fn solve_matrix(&self, b: &Matrix<T>) -> Result<Matrix<T>> {
        if b.row_count() != self.input_len() {
            return Err(LinalgError::DimensionMismatch {
                param: "input",
                left: Shape::matrix(self.input_len(), b.column_count()),
                right: b.shape(),
            });
        }
        let n = self.output_len();
        let mut values = Vec::with_capacity(n * b.column_count());
        for j in 0..b.column_count() {
            let column: Vec<T> = (0..b.row_count()).map(|i| b.storage().at(i, j)).collect();
            values.extend(self.solve_column(&column)?);
        }
        dense_matrix(n, b.column_count(), values)
    }
}

/// Faer copy of `a`.
pub(crate) fn to_field<T: Scalar>(a: &Matrix<T>) -> Mat<T::Field> {
    let rows = a.row_count();
    let values = a.to_column_major();
    Mat::from_fn(rows, a.column_count(), |i, j| values[j * rows + i].into_field())
}

/// Dense copy of a faer factor.
pub(crate) fn from_field<T: Scalar>(m: MatRef<'_, T::Field>) -> Result<Matrix<T>> {
    let (rows, columns) = (m.nrows(), m.ncols());
    let mut values = Vec::with_capacity(rows * columns);
    for j in 0..columns {
        values.extend((0..rows).map(|i| T::from_field(m[(i, j)])));
    }
    dense_matrix(rows, columns, values)
}

pub(crate) fn dense_matrix<T: Scalar>(rows: usize, columns: usize, values: Vec<T>) -> Result<Matrix<T>> {
    Ok(Matrix::from_storage(MatrixStorage::Dense(DenseColumnMajorStorage::from_column_major(
        rows, columns, values,
    )?)))
}

/// Solve in place with `factor` and return the leading `output_len` entries.
pub(crate) fn solve_with<T, F>(factor: &F, b: &[T], output_len: usize) -> Vec<T>
where
    T: Scalar,
    F: SolveCore<T::Field>,
{
    let mut x: Vec<T::Field> = b.iter().map(|v| v.into_field()).collect();
    let n = x.len();
    factor.solve_in_place_with_conj(Conj::No, MatMut::from_column_major_slice_mut(&mut x, n, 1));
    x.into_iter().take(output_len).map(T::from_field).collect()
}

/// Least-squares counterpart of [`solve_with`]; the solution lands in the top rows.
pub(crate) fn solve_lstsq_with<T, F>(factor: &F, b: &[T], output_len: usize) -> Vec<T>
where
    T: Scalar,
    F: SolveLstsqCore<T::Field>,
{
    let mut x: Vec<T::Field> = b.iter().map(|v| v.into_field()).collect();
    let n = x.len();
    factor.solve_lstsq_in_place_with_conj(Conj::No, MatMut::from_column_major_slice_mut(&mut x, n, 1));
    x.into_iter().take(output_len).map(T::from_field).collect()
}

/// Diagonal entries of a square or trapezoidal faer factor.
pub(crate) fn diagonal<T: Scalar>(m: MatRef<'_, T::Field>) -> Vec<T> {
    (0..m.nrows().min(m.ncols())).map(|k| T::from_field(m[(k, k)])).collect()
}
