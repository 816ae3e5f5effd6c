//! `Matrix<T>`: a shape-checked handle over dense, sparse or diagonal storage.
//!
//! The row and column counts are always read from the storage itself, so they
//! can never disagree with it. Arithmetic lives in [`arithmetic`], norms and
//! reductions in [`norms`], factorizations and solves in [`solve`], and faer
//! interop in [`dense`].

use std::hash::{Hash, Hasher};

use num_traits::Zero;

use crate::core::scalar::Scalar;
use crate::core::traits::MatrixStorageOps;
use crate::error::{LinalgError, Result, Shape};
use crate::storage::{
    DenseColumnMajorStorage, DenseVectorStorage, DiagonalMatrixStorage, MatrixStorage, SparseCompressedRowStorage,
    SparseVectorStorage, StorageKind, VectorStorage,
};
use crate::utils::checks;
use crate::vector::Vector;

pub mod arithmetic;
pub mod dense;
pub mod norms;
pub mod solve;

pub use arithmetic::Operand;
pub use crate::storage::kernels::Op;

#[derive(Debug, Clone)]
pub struct Matrix<T> {
    storage: MatrixStorage<T>,
}

impl<T: Scalar> Matrix<T> {
    /// Wrap a storage without copying it.
    pub fn from_storage(storage: MatrixStorage<T>) -> Self {
        Self { storage }
    }

    pub(crate) fn zeros(kind: StorageKind, rows: usize, columns: usize) -> Self {
        Self::from_storage(MatrixStorage::zeros(kind, rows, columns))
    }

    pub(crate) fn dense_from_fn(rows: usize, columns: usize, f: impl FnMut(usize, usize) -> T) -> Self {
        Self::from_storage(MatrixStorage::Dense(DenseColumnMajorStorage::from_fn(rows, columns, f)))
    }

    /// Identity of the given kind and size.
    pub(crate) fn identity(kind: StorageKind, order: usize) -> Self {
        let storage = match kind {
            StorageKind::Dense => MatrixStorage::Dense(DenseColumnMajorStorage::from_fn(order, order, |i, j| {
                if i == j { T::one() } else { T::zero() }
            })),
            StorageKind::Sparse => MatrixStorage::Sparse(SparseCompressedRowStorage::from_fn(order, order, |i, j| {
                if i == j { T::one() } else { T::zero() }
            })),
            StorageKind::Diagonal => {
                MatrixStorage::Diagonal(DiagonalMatrixStorage::from_fn(order, order, |_| T::one()))
            }
        };
        Self::from_storage(storage)
    }

    pub fn storage(&self) -> &MatrixStorage<T> {
        &self.storage
    }

    pub fn into_storage(self) -> MatrixStorage<T> {
        self.storage
    }

    pub fn row_count(&self) -> usize {
        self.storage.row_count()
    }

    pub fn column_count(&self) -> usize {
        self.storage.column_count()
    }

    pub fn shape(&self) -> Shape {
        Shape::matrix(self.row_count(), self.column_count())
    }

    pub fn kind(&self) -> StorageKind {
        self.storage.kind()
    }

    pub fn is_dense(&self) -> bool {
        self.storage.is_dense()
    }

    pub fn is_square(&self) -> bool {
        self.row_count() == self.column_count()
    }

    pub fn at(&self, row: usize, column: usize) -> Result<T> {
        checks::index(row, self.row_count())?;
        checks::index(column, self.column_count())?;
        Ok(self.storage.at(row, column))
    }

    pub fn set(&mut self, row: usize, column: usize, value: T) -> Result<()> {
        checks::index(row, self.row_count())?;
        checks::index(column, self.column_count())?;
        self.storage.set(row, column, value)
    }

    pub fn clear(&mut self) {
        self.storage.clear();
    }

    /// Stored non-zero elements as `(row, column, value)`, row by row.
    pub fn enumerate_non_zero(&self) -> impl Iterator<Item = (usize, usize, T)> + '_ {
        self.storage.enumerate_non_zero()
    }

    pub fn to_column_major(&self) -> Vec<T> {
        self.storage.to_column_major()
    }

    pub fn to_row_arrays(&self) -> Vec<Vec<T>> {
        (0..self.row_count())
            .map(|i| (0..self.column_count()).map(|j| self.storage.at(i, j)).collect())
            .collect()
    }

    /// Write a batch of elements, checking that the representation can hold
    /// every one of them before the first write.
    fn write_all(&mut self, entries: &[(usize, usize, T)]) -> Result<()> {
        if let Some(&(i, j, _)) = entries
            .iter()
            .find(|&&(i, j, v)| v != T::zero() && !self.storage.is_mutable_at(i, j))
        {
            return Err(LinalgError::invalid(
                "values",
                format!("element ({i}, {j}) cannot hold a non-zero value in {:?} storage", self.kind()),
            ));
        }
        for &(i, j, v) in entries {
            self.storage.set(i, j, v)?;
        }
        Ok(())
    }

    fn vector_like(&self, values: Vec<T>) -> Vector<T> {
        if self.is_dense() {
            Vector::from_storage(VectorStorage::Dense(DenseVectorStorage::from_vec(values)))
        } else {
            let n = values.len();
            Vector::from_storage(VectorStorage::Sparse(SparseVectorStorage::from_fn(n, |i| values[i])))
        }
    }

    pub fn row(&self, row: usize) -> Result<Vector<T>> {
        checks::index(row, self.row_count())?;
        let values = (0..self.column_count()).map(|j| self.storage.at(row, j)).collect();
        Ok(self.vector_like(values))
    }

    pub fn column(&self, column: usize) -> Result<Vector<T>> {
        checks::index(column, self.column_count())?;
        let values = (0..self.row_count()).map(|i| self.storage.at(i, column)).collect();
        Ok(self.vector_like(values))
    }

    pub fn set_row(&mut self, row: usize, values: &Vector<T>) -> Result<()> {
        checks::index(row, self.row_count())?;
        checks::same_shape("values", Shape::vector(self.column_count()), values.shape())?;
        let entries: Vec<_> = values.to_vec().into_iter().enumerate().map(|(j, v)| (row, j, v)).collect();
        self.write_all(&entries)
    }

    pub fn set_column(&mut self, column: usize, values: &Vector<T>) -> Result<()> {
        checks::index(column, self.column_count())?;
        checks::same_shape("values", Shape::vector(self.row_count()), values.shape())?;
        let entries: Vec<_> = values.to_vec().into_iter().enumerate().map(|(i, v)| (i, column, v)).collect();
        self.write_all(&entries)
    }

    /// Elements `(row, columns[k])` for every `k`.
    pub fn row_at_columns(&self, row: usize, columns: &[usize]) -> Result<Vector<T>> {
        checks::index(row, self.row_count())?;
        checks::non_empty("columns", columns.len())?;
        for &j in columns {
            checks::index(j, self.column_count())?;
        }
        let values = columns.iter().map(|&j| self.storage.at(row, j)).collect();
        Ok(self.vector_like(values))
    }

    /// Write `values[k]` to `(row, columns[k])`; the inverse of [`Matrix::row_at_columns`].
    pub fn set_row_at_columns(&mut self, row: usize, columns: &[usize], values: &[T]) -> Result<()> {
        checks::index(row, self.row_count())?;
        checks::non_empty("columns", columns.len())?;
        checks::same_shape("values", Shape::vector(columns.len()), Shape::vector(values.len()))?;
        for &j in columns {
            checks::index(j, self.column_count())?;
        }
        let entries: Vec<_> = columns.iter().zip(values).map(|(&j, &v)| (row, j, v)).collect();
        self.write_all(&entries)
    }

    /// Copy of the block starting at `(row, column)`.
    pub fn sub_matrix(&self, row: usize, row_count: usize, column: usize, column_count: usize) -> Result<Matrix<T>> {
        checks::range(row, row_count, self.row_count())?;
        checks::range(column, column_count, self.column_count())?;
        let at = |i: usize, j: usize| self.storage.at(row + i, column + j);
        let storage = match &self.storage {
            MatrixStorage::Dense(_) => {
                MatrixStorage::Dense(DenseColumnMajorStorage::from_fn(row_count, column_count, at))
            }
            MatrixStorage::Diagonal(_) if row == column => MatrixStorage::Diagonal(DiagonalMatrixStorage::from_fn(
                row_count,
                column_count,
                |i| at(i, i),
            )),
            _ => MatrixStorage::Sparse(SparseCompressedRowStorage::from_fn(row_count, column_count, at)),
        };
        Ok(Self::from_storage(storage))
    }

    pub fn set_sub_matrix(&mut self, row: usize, column: usize, block: &Matrix<T>) -> Result<()> {
        checks::range(row, block.row_count(), self.row_count())?;
        checks::range(column, block.column_count(), self.column_count())?;
        let mut entries = Vec::with_capacity(block.row_count() * block.column_count());
        for j in 0..block.column_count() {
            for i in 0..block.row_count() {
                entries.push((row + i, column + j, block.storage.at(i, j)));
            }
        }
        self.write_all(&entries)
    }

    /// Main diagonal as a dense vector.
    pub fn diagonal(&self) -> Vector<T> {
        let n = self.row_count().min(self.column_count());
        Vector::from_storage(VectorStorage::Dense(DenseVectorStorage::from_vec(
            (0..n).map(|i| self.storage.at(i, i)).collect(),
        )))
    }

    pub fn set_diagonal(&mut self, values: &Vector<T>) -> Result<()> {
        let n = self.row_count().min(self.column_count());
        checks::same_shape("values", Shape::vector(n), values.shape())?;
        let entries: Vec<_> = values.to_vec().into_iter().enumerate().map(|(i, v)| (i, i, v)).collect();
        self.write_all(&entries)
    }

    pub fn transpose(&self) -> Matrix<T> {
        Self::from_storage(self.storage.transpose(false))
    }

    pub fn conjugate_transpose(&self) -> Matrix<T> {
        Self::from_storage(self.storage.transpose(T::ELEMENT_TYPE.is_complex()))
    }

    pub fn is_symmetric(&self) -> bool {
        self.is_square()
            && self
                .storage
                .enumerate_non_zero()
                .all(|(i, j, v)| self.storage.at(j, i) == v)
    }

    pub fn is_hermitian(&self) -> bool {
        self.is_square()
            && self
                .storage
                .enumerate_non_zero()
                .all(|(i, j, v)| self.storage.at(j, i) == v.conjugate())
            && (0..self.row_count()).all(|i| self.storage.at(i, i).imaginary() == T::Real::zero())
    }
}

impl<T: Scalar> PartialEq for Matrix<T> {
    fn eq(&self, other: &Self) -> bool {
        self.storage == other.storage
    }
}

impl<T: Scalar> Hash for Matrix<T> {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.row_count().hash(state);
        self.column_count().hash(state);
        for v in self.to_column_major().into_iter().take(25) {
            v.hash_value(state);
        }
    }
}
