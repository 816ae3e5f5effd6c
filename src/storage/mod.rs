//! Storage representations backing matrices and vectors.
//!
//! The closed set of representations is expressed as two tagged variants,
//! [`MatrixStorage`] and [`VectorStorage`]; dispatch is a `match`, never a
//! chain of runtime type tests.

use bitflags::bitflags;

use crate::core::scalar::Scalar;
use crate::core::traits::{MatVec, MatrixStorageOps, VectorStorageOps};
use crate::error::{LinalgError, Result};

pub mod dense;
pub mod diagonal;
pub mod kernels;
pub mod sparse;
pub mod vector;

pub use dense::DenseColumnMajorStorage;
pub use diagonal::DiagonalMatrixStorage;
pub use sparse::SparseCompressedRowStorage;
pub use vector::{DenseVectorStorage, SparseVectorStorage};

bitflags! {
    #[derive(Copy, Clone, Debug, PartialEq, Eq)]
    pub struct StorageFlags: u8 {
        /// Every element is physically stored.
        const DENSE         = 0b0000_0001;
        /// Any element can take any value.
        const FULLY_MUTABLE = 0b0000_0010;
        /// Only the main diagonal is stored.
        const DIAGONAL      = 0b0000_0100;
    }
}

/// Whether a map/pointwise operation must visit zero entries of a sparse
/// representation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Zeros {
    /// Visit every element, zeros included.
    Include,
    /// Zero entries may be skipped when the function maps zero to zero.
    AllowSkip,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StorageKind {
    Dense,
    Sparse,
    Diagonal,
}

/// Tagged variant over the matrix storage representations.
#[derive(Debug, Clone)]
pub enum MatrixStorage<T> {
    Dense(DenseColumnMajorStorage<T>),
    Sparse(SparseCompressedRowStorage<T>),
    Diagonal(DiagonalMatrixStorage<T>),
}

macro_rules! each_matrix_storage {
    ($value:expr, $s:ident => $body:expr) => {
        match $value {
            MatrixStorage::Dense($s) => $body,
            MatrixStorage::Sparse($s) => $body,
            MatrixStorage::Diagonal($s) => $body,
        }
    };
}

impl<T: Scalar> MatrixStorage<T> {
    pub fn kind(&self) -> StorageKind {
        match self {
            MatrixStorage::Dense(_) => StorageKind::Dense,
            MatrixStorage::Sparse(_) => StorageKind::Sparse,
            MatrixStorage::Diagonal(_) => StorageKind::Diagonal,
        }
    }

    pub fn is_dense(&self) -> bool {
        self.flags().contains(StorageFlags::DENSE)
    }

    /// Zero storage of the given kind and shape.
    pub fn zeros(kind: StorageKind, rows: usize, columns: usize) -> Self {
        match kind {
            StorageKind::Dense => MatrixStorage::Dense(DenseColumnMajorStorage::new(rows, columns)),
            StorageKind::Sparse => MatrixStorage::Sparse(SparseCompressedRowStorage::new(rows, columns)),
            StorageKind::Diagonal => MatrixStorage::Diagonal(DiagonalMatrixStorage::new(rows, columns)),
        }
    }

    /// Overwrite every element from a column-major buffer of the same shape.
    /// Nothing is written unless the whole buffer fits the representation.
    pub fn assign_column_major(&mut self, values: &[T]) -> Result<()> {
        let (rows, columns) = (self.row_count(), self.column_count());
        debug_assert_eq!(values.len(), rows * columns);
        match self {
            MatrixStorage::Dense(s) => s.values_mut().copy_from_slice(values),
            MatrixStorage::Sparse(s) => {
                *s = SparseCompressedRowStorage::from_fn(rows, columns, |i, j| values[j * rows + i]);
            }
            MatrixStorage::Diagonal(s) => {
                if !s.accepts(values) {
                    return Err(LinalgError::invalid(
                        "result",
                        "a diagonal matrix cannot hold non-zero off-diagonal elements",
                    ));
                }
                for (i, d) in s.diagonal_mut().iter_mut().enumerate() {
                    *d = values[i * rows + i];
                }
            }
        }
        Ok(())
    }

    /// Copy all elements of `other` (same shape) into this storage, keeping
    /// this storage's representation.
    pub fn copy_from(&mut self, other: &MatrixStorage<T>) -> Result<()> {
        if self.kind() == other.kind() {
            *self = other.clone();
            return Ok(());
        }
        self.assign_column_major(&other.to_column_major())
    }

    /// Apply `f` to every element in place.
    pub fn map_inplace(&mut self, f: impl Fn(T) -> T, zeros: Zeros) -> Result<()> {
        let skip_zeros = f(T::zero()) == T::zero() || zeros == Zeros::AllowSkip;
        match self {
            MatrixStorage::Dense(s) => {
                s.values_mut().iter_mut().for_each(|v| *v = f(*v));
                return Ok(());
            }
            MatrixStorage::Sparse(s) if skip_zeros => {
                s.map_stored(&f);
                return Ok(());
            }
            MatrixStorage::Diagonal(s) if skip_zeros => {
                s.diagonal_mut().iter_mut().for_each(|v| *v = f(*v));
                return Ok(());
            }
            _ => {}
        }
        let mapped: Vec<T> = self.to_column_major().into_iter().map(&f).collect();
        self.assign_column_major(&mapped)
    }

    /// Transposed (optionally conjugated) copy in the same representation.
    pub fn transpose(&self, conjugate: bool) -> MatrixStorage<T> {
        let c = |v: T| if conjugate { v.conjugate() } else { v };
        let (rows, columns) = (self.row_count(), self.column_count());
        match self {
            MatrixStorage::Dense(s) => MatrixStorage::Dense(DenseColumnMajorStorage::from_fn(columns, rows, |i, j| c(s.at(j, i)))),
            MatrixStorage::Sparse(s) => {
                let mut per_row: Vec<Vec<(usize, T)>> = vec![Vec::new(); columns];
                for (i, j, v) in s.enumerate_non_zero() {
                    per_row[j].push((i, c(v)));
                }
                MatrixStorage::Sparse(SparseCompressedRowStorage::from_unsorted_rows(columns, rows, per_row))
            }
            MatrixStorage::Diagonal(s) => {
                MatrixStorage::Diagonal(DiagonalMatrixStorage::from_fn(columns, rows, |i| c(s.diagonal()[i])))
            }
        }
    }
}

impl<T: Scalar> MatrixStorageOps<T> for MatrixStorage<T> {
    fn row_count(&self) -> usize {
        each_matrix_storage!(self, s => s.row_count())
    }

    fn column_count(&self) -> usize {
        each_matrix_storage!(self, s => s.column_count())
    }

    fn flags(&self) -> StorageFlags {
        each_matrix_storage!(self, s => s.flags())
    }

    fn at(&self, row: usize, column: usize) -> T {
        each_matrix_storage!(self, s => s.at(row, column))
    }

    fn set(&mut self, row: usize, column: usize, value: T) -> Result<()> {
        each_matrix_storage!(self, s => s.set(row, column, value))
    }

    fn clear(&mut self) {
        each_matrix_storage!(self, s => s.clear())
    }

    fn enumerate_non_zero(&self) -> Box<dyn Iterator<Item = (usize, usize, T)> + '_> {
        each_matrix_storage!(self, s => s.enumerate_non_zero())
    }

    fn is_mutable_at(&self, row: usize, column: usize) -> bool {
        each_matrix_storage!(self, s => s.is_mutable_at(row, column))
    }

    fn to_column_major(&self) -> Vec<T> {
        each_matrix_storage!(self, s => s.to_column_major())
    }
}

impl<T: Scalar> MatVec<T> for MatrixStorage<T> {
    fn mat_vec(&self, x: &[T], y: &mut [T]) {
        each_matrix_storage!(self, s => s.mat_vec(x, y))
    }

    fn transpose_mat_vec(&self, x: &[T], y: &mut [T], conjugate: bool) {
        each_matrix_storage!(self, s => s.transpose_mat_vec(x, y, conjugate))
    }
}

/// Structural equality: same shape and equal elements, whatever the
/// representation.
impl<T: Scalar> PartialEq for MatrixStorage<T> {
    fn eq(&self, other: &Self) -> bool {
        self.row_count() == other.row_count()
            && self.column_count() == other.column_count()
            && self.to_column_major() == other.to_column_major()
    }
}

/// Tagged variant over the vector storage representations.
#[derive(Debug, Clone)]
pub enum VectorStorage<T> {
    Dense(DenseVectorStorage<T>),
    Sparse(SparseVectorStorage<T>),
}

macro_rules! each_vector_storage {
    ($value:expr, $s:ident => $body:expr) => {
        match $value {
            VectorStorage::Dense($s) => $body,
            VectorStorage::Sparse($s) => $body,
        }
    };
}

impl<T: Scalar> VectorStorage<T> {
    pub fn kind(&self) -> StorageKind {
        match self {
            VectorStorage::Dense(_) => StorageKind::Dense,
            VectorStorage::Sparse(_) => StorageKind::Sparse,
        }
    }

    pub fn is_dense(&self) -> bool {
        matches!(self, VectorStorage::Dense(_))
    }

    pub fn zeros(kind: StorageKind, length: usize) -> Self {
        match kind {
            StorageKind::Sparse => VectorStorage::Sparse(SparseVectorStorage::new(length)),
            StorageKind::Dense | StorageKind::Diagonal => VectorStorage::Dense(DenseVectorStorage::new(length)),
        }
    }

    /// Overwrite every element from a buffer of the same length.
    pub fn assign_values(&mut self, values: &[T]) {
        debug_assert_eq!(values.len(), self.length());
        match self {
            VectorStorage::Dense(s) => s.values_mut().copy_from_slice(values),
            VectorStorage::Sparse(s) => {
                *s = SparseVectorStorage::from_fn(values.len(), |i| values[i]);
            }
        }
    }

    pub fn copy_from(&mut self, other: &VectorStorage<T>) {
        if self.kind() == other.kind() {
            *self = other.clone();
        } else {
            self.assign_values(&other.to_vec());
        }
    }

    pub fn map_inplace(&mut self, f: impl Fn(T) -> T, zeros: Zeros) {
        let skip_zeros = f(T::zero()) == T::zero() || zeros == Zeros::AllowSkip;
        match self {
            VectorStorage::Dense(s) => {
                s.values_mut().iter_mut().for_each(|v| *v = f(*v));
                return;
            }
            VectorStorage::Sparse(s) if skip_zeros => {
                s.map_stored(&f);
                return;
            }
            VectorStorage::Sparse(_) => {}
        }
        let mapped: Vec<T> = self.to_vec().into_iter().map(&f).collect();
        self.assign_values(&mapped);
    }
}

impl<T: Scalar> VectorStorageOps<T> for VectorStorage<T> {
    fn length(&self) -> usize {
        each_vector_storage!(self, s => s.length())
    }

    fn flags(&self) -> StorageFlags {
        each_vector_storage!(self, s => s.flags())
    }

    fn at(&self, index: usize) -> T {
        each_vector_storage!(self, s => s.at(index))
    }

    fn set(&mut self, index: usize, value: T) {
        each_vector_storage!(self, s => s.set(index, value))
    }

    fn clear(&mut self) {
        each_vector_storage!(self, s => s.clear())
    }

    fn enumerate_non_zero(&self) -> Box<dyn Iterator<Item = (usize, T)> + '_> {
        each_vector_storage!(self, s => s.enumerate_non_zero())
    }

    fn to_vec(&self) -> Vec<T> {
        each_vector_storage!(self, s => s.to_vec())
    }
}

impl<T: Scalar> PartialEq for VectorStorage<T> {
    fn eq(&self, other: &Self) -> bool {
        self.length() == other.length() && self.to_vec() == other.to_vec()
    }
}
