//! Diagonal-only matrix storage: one array, implicit zeros elsewhere.

use crate::core::scalar::Scalar;
use crate::core::traits::{MatVec, MatrixStorageOps};
use crate::error::{LinalgError, Result};
use crate::storage::StorageFlags;

#[derive(Debug, Clone)]
pub struct DiagonalMatrixStorage<T> {
    rows: usize,
    columns: usize,
    data: Vec<T>,
}

impl<T: Scalar> DiagonalMatrixStorage<T> {
    pub fn new(rows: usize, columns: usize) -> Self {
        Self {
            rows,
            columns,
            data: vec![T::zero(); rows.min(columns)],
        }
    }

    /// Take ownership of the diagonal array without copying.
    pub fn from_diagonal(rows: usize, columns: usize, data: Vec<T>) -> Result<Self> {
        if data.len() != rows.min(columns) {
            return Err(LinalgError::invalid(
                "diagonal",
                format!(
                    "expected {} diagonal elements for a {rows}x{columns} matrix, got {}",
                    rows.min(columns),
                    data.len()
                ),
            ));
        }
        Ok(Self { rows, columns, data })
    }

    pub fn from_fn(rows: usize, columns: usize, f: impl FnMut(usize) -> T) -> Self {
        Self {
            rows,
            columns,
            data: (0..rows.min(columns)).map(f).collect(),
        }
    }

    pub fn diagonal(&self) -> &[T] {
        &self.data
    }

    pub fn diagonal_mut(&mut self) -> &mut [T] {
        &mut self.data
    }

    /// Whether a column-major buffer of this shape fits on the diagonal.
    pub(crate) fn accepts(&self, values: &[T]) -> bool {
        (0..self.columns).all(|j| {
            (0..self.rows).all(|i| i == j || values[j * self.rows + i] == T::zero())
        })
    }
}

impl<T: Scalar> MatrixStorageOps<T> for DiagonalMatrixStorage<T> {
    fn row_count(&self) -> usize {
        self.rows
    }

    fn column_count(&self) -> usize {
        self.columns
    }

    fn flags(&self) -> StorageFlags {
        StorageFlags::DIAGONAL
    }

    fn at(&self, row: usize, column: usize) -> T {
        if row == column { self.data[row] } else { T::zero() }
    }

    fn set(&mut self, row: usize, column: usize, value: T) -> Result<()> {
        if row == column {
            self.data[row] = value;
            Ok(())
        } else if value == T::zero() {
            Ok(())
        } else {
            Err(LinalgError::invalid(
                "value",
                format!("cannot set off-diagonal element ({row}, {column}) of a diagonal matrix"),
            ))
        }
    }

    fn clear(&mut self) {
        self.data.iter_mut().for_each(|x| *x = T::zero());
    }

    fn enumerate_non_zero(&self) -> Box<dyn Iterator<Item = (usize, usize, T)> + '_> {
        Box::new(
            self.data
                .iter()
                .enumerate()
                .filter(|&(_, &v)| v != T::zero())
                .map(|(i, &v)| (i, i, v)),
        )
    }

    fn is_mutable_at(&self, row: usize, column: usize) -> bool {
        row == column
    }
}

impl<T: Scalar> MatVec<T> for DiagonalMatrixStorage<T> {
    fn mat_vec(&self, x: &[T], y: &mut [T]) {
        assert_eq!(x.len(), self.columns);
        assert_eq!(y.len(), self.rows);
        y.iter_mut().for_each(|v| *v = T::zero());
        for (i, &d) in self.data.iter().enumerate() {
            y[i] = d * x[i];
        }
    }

    fn transpose_mat_vec(&self, x: &[T], y: &mut [T], conjugate: bool) {
        assert_eq!(x.len(), self.rows);
        assert_eq!(y.len(), self.columns);
        y.iter_mut().for_each(|v| *v = T::zero());
        for (i, &d) in self.data.iter().enumerate() {
            let d = if conjugate { d.conjugate() } else { d };
            y[i] = d * x[i];
        }
    }
}
