//! Interop with Faer dense matrices.
//!
//! Any representation converts to a `faer::Mat`; the way back always yields
//! dense column-major storage.

use faer::Mat;

use crate::core::scalar::Scalar;
use crate::matrix::Matrix;
use crate::storage::{DenseColumnMajorStorage, MatrixStorage};

impl<T: Scalar> Matrix<T> {
    /// Copy into a Faer matrix.
    pub fn to_faer(&self) -> Mat<T> {
        let rows = self.row_count();
        let values = self.to_column_major();
        Mat::from_fn(rows, self.column_count(), |i, j| values[j * rows + i])
    }

    /// Dense copy of a Faer matrix.
    pub fn from_faer(m: &Mat<T>) -> Self {
        Self::from_storage(MatrixStorage::Dense(DenseColumnMajorStorage::from_fn(
            m.nrows(),
            m.ncols(),
            |i, j| m[(i, j)],
        )))
    }
}
