//! Dense column-major matrix storage.

use crate::core::scalar::Scalar;
use crate::core::traits::{MatVec, MatrixStorageOps};
use crate::error::{LinalgError, Result};
use crate::storage::StorageFlags;

/// All elements in one flat array, column after column.
#[derive(Debug, Clone)]
pub struct DenseColumnMajorStorage<T> {
    rows: usize,
    columns: usize,
    data: Vec<T>,
}

impl<T: Scalar> DenseColumnMajorStorage<T> {
    /// Zero-filled `rows × columns` storage.
    pub fn new(rows: usize, columns: usize) -> Self {
        Self {
            rows,
            columns,
            data: vec![T::zero(); rows * columns],
        }
    }

    /// Take ownership of a column-major array without copying.
    pub fn from_column_major(rows: usize, columns: usize, data: Vec<T>) -> Result<Self> {
        if data.len() != rows * columns {
            return Err(LinalgError::invalid(
                "data",
                format!(
                    "expected {} elements for a {rows}x{columns} matrix, got {}",
                    rows * columns,
                    data.len()
                ),
            ));
        }
        Ok(Self { rows, columns, data })
    }

    pub fn from_fn(rows: usize, columns: usize, mut f: impl FnMut(usize, usize) -> T) -> Self {
        let mut data = Vec::with_capacity(rows * columns);
        for j in 0..columns {
            for i in 0..rows {
                data.push(f(i, j));
            }
        }
        Self { rows, columns, data }
    }

    pub fn filled(rows: usize, columns: usize, value: T) -> Self {
        Self {
            rows,
            columns,
            data: vec![value; rows * columns],
        }
    }

    /// Raw column-major values.
    pub fn values(&self) -> &[T] {
        &self.data
    }

    pub fn values_mut(&mut self) -> &mut [T] {
        &mut self.data
    }

    pub fn into_values(self) -> Vec<T> {
        self.data
    }

    #[inline]
    pub(crate) fn index(&self, row: usize, column: usize) -> usize {
        column * self.rows + row
    }
}

impl<T: Scalar> MatrixStorageOps<T> for DenseColumnMajorStorage<T> {
    fn row_count(&self) -> usize {
        self.rows
    }

    fn column_count(&self) -> usize {
        self.columns
    }

    fn flags(&self) -> StorageFlags {
        StorageFlags::DENSE | StorageFlags::FULLY_MUTABLE
    }

    #[inline]
    fn at(&self, row: usize, column: usize) -> T {
        self.data[self.index(row, column)]
    }

    #[inline]
    fn set(&mut self, row: usize, column: usize, value: T) -> Result<()> {
        let k = self.index(row, column);
        self.data[k] = value;
        Ok(())
    }

    fn clear(&mut self) {
        self.data.iter_mut().for_each(|x| *x = T::zero());
    }

    fn enumerate_non_zero(&self) -> Box<dyn Iterator<Item = (usize, usize, T)> + '_> {
        let rows = self.rows;
        let columns = self.columns;
        Box::new(
            (0..rows)
                .flat_map(move |i| (0..columns).map(move |j| (i, j)))
                .map(move |(i, j)| (i, j, self.data[j * rows + i]))
                .filter(|&(_, _, v)| v != T::zero()),
        )
    }

    fn to_column_major(&self) -> Vec<T> {
        self.data.clone()
    }
}

impl<T: Scalar> MatVec<T> for DenseColumnMajorStorage<T> {
    fn mat_vec(&self, x: &[T], y: &mut [T]) {
        assert_eq!(self.rows, y.len(), "Output vector y has incorrect length");
        assert_eq!(self.columns, x.len(), "Input vector x has incorrect length");
        y.iter_mut().for_each(|v| *v = T::zero());
        for (j, &xj) in x.iter().enumerate() {
            if xj == T::zero() {
                continue;
            }
            let col = &self.data[j * self.rows..(j + 1) * self.rows];
            for (yi, &aij) in y.iter_mut().zip(col) {
                *yi += aij * xj;
            }
        }
    }

    fn transpose_mat_vec(&self, x: &[T], y: &mut [T], conjugate: bool) {
        assert_eq!(self.columns, y.len(), "Output vector y has incorrect length");
        assert_eq!(self.rows, x.len(), "Input vector x has incorrect length");
        for (j, yj) in y.iter_mut().enumerate() {
            let col = &self.data[j * self.rows..(j + 1) * self.rows];
            let mut sum = T::zero();
            for (&aij, &xi) in col.iter().zip(x) {
                let a = if conjugate { aij.conjugate() } else { aij };
                sum += a * xi;
            }
            *yj = sum;
        }
    }
}
