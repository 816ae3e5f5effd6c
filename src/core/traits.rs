//! Capability traits every storage representation provides.
//!
//! The shape checks, aliasing handling and identity shortcuts live once in the
//! `matrix`/`vector` dispatch layer; a storage only has to report its shape,
//! give element access, and run the handful of true numeric kernels below.

use crate::core::scalar::Scalar;
use crate::error::Result;
use crate::storage::StorageFlags;

/// Shape, element access and enumeration for a matrix storage.
pub trait MatrixStorageOps<T: Scalar> {
    /// Number of rows.
    fn row_count(&self) -> usize;
    /// Number of columns.
    fn column_count(&self) -> usize;
    fn flags(&self) -> StorageFlags;
    /// Element at `(row, column)`. Bounds are the caller's responsibility.
    fn at(&self, row: usize, column: usize) -> T;
    /// Write an element. Fails only where the representation cannot hold the
    /// value (e.g. an off-diagonal entry of a diagonal storage).
    fn set(&mut self, row: usize, column: usize, value: T) -> Result<()>;
    /// Reset every element to zero.
    fn clear(&mut self);
    /// Stored entries in row-major order; may include explicit zeros.
    fn enumerate_non_zero(&self) -> Box<dyn Iterator<Item = (usize, usize, T)> + '_>;
    /// Whether `(row, column)` can take an arbitrary value.
    fn is_mutable_at(&self, row: usize, column: usize) -> bool {
        let _ = (row, column);
        self.flags().contains(StorageFlags::FULLY_MUTABLE)
    }

    /// Column-major copy of all elements.
    fn to_column_major(&self) -> Vec<T> {
        let (rows, cols) = (self.row_count(), self.column_count());
        let mut out = vec![T::zero(); rows * cols];
        for (i, j, v) in self.enumerate_non_zero() {
            out[j * rows + i] = v;
        }
        out
    }
}

/// Length, element access and enumeration for a vector storage.
pub trait VectorStorageOps<T: Scalar> {
    fn length(&self) -> usize;
    fn flags(&self) -> StorageFlags;
    fn at(&self, index: usize) -> T;
    fn set(&mut self, index: usize, value: T);
    fn clear(&mut self);
    fn enumerate_non_zero(&self) -> Box<dyn Iterator<Item = (usize, T)> + '_>;

    fn to_vec(&self) -> Vec<T> {
        let mut out = vec![T::zero(); self.length()];
        for (i, v) in self.enumerate_non_zero() {
            out[i] = v;
        }
        out
    }
}

/// Matrix–vector products: y ← op(A) x.
pub trait MatVec<T: Scalar> {
    /// Compute y = A · x.
    fn mat_vec(&self, x: &[T], y: &mut [T]);
    /// Compute y = Aᵀ · x, or Aᴴ · x when `conjugate` is set.
    fn transpose_mat_vec(&self, x: &[T], y: &mut [T], conjugate: bool);
}
