//! Compressed sparse row (CSR) matrix storage.
//!
//! Imports from coordinate, CSR and CSC triples sum duplicate entries and keep
//! explicit zeros. Writing a zero through `set` removes the stored entry.

use crate::core::scalar::Scalar;
use crate::core::traits::{MatVec, MatrixStorageOps};
use crate::error::{LinalgError, Result};
use crate::storage::StorageFlags;

#[derive(Debug, Clone)]
pub struct SparseCompressedRowStorage<T> {
    rows: usize,
    columns: usize,
    row_pointers: Vec<usize>,
    column_indices: Vec<usize>,
    values: Vec<T>,
}

impl<T: Scalar> SparseCompressedRowStorage<T> {
    /// Empty `rows × columns` storage (all zeros, nothing stored).
    pub fn new(rows: usize, columns: usize) -> Self {
        Self {
            rows,
            columns,
            row_pointers: vec![0; rows + 1],
            column_indices: Vec::new(),
            values: Vec::new(),
        }
    }

    /// Every element stored explicitly with `value`.
    pub fn filled(rows: usize, columns: usize, value: T) -> Self {
        let mut row_pointers = Vec::with_capacity(rows + 1);
        let mut column_indices = Vec::with_capacity(rows * columns);
        row_pointers.push(0);
        for _ in 0..rows {
            column_indices.extend(0..columns);
            row_pointers.push(column_indices.len());
        }
        Self {
            rows,
            columns,
            row_pointers,
            values: vec![value; rows * columns],
            column_indices,
        }
    }

    /// Store only the non-zero results of `f`.
    pub fn from_fn(rows: usize, columns: usize, mut f: impl FnMut(usize, usize) -> T) -> Self {
        let mut row_pointers = Vec::with_capacity(rows + 1);
        let mut column_indices = Vec::new();
        let mut values = Vec::new();
        row_pointers.push(0);
        for i in 0..rows {
            for j in 0..columns {
                let v = f(i, j);
                if v != T::zero() {
                    column_indices.push(j);
                    values.push(v);
                }
            }
            row_pointers.push(values.len());
        }
        Self {
            rows,
            columns,
            row_pointers,
            column_indices,
            values,
        }
    }

    /// Build from coordinate (triplet) format.
    pub fn from_coordinate(
        rows: usize,
        columns: usize,
        row_indices: &[usize],
        column_indices: &[usize],
        values: &[T],
    ) -> Result<Self> {
        if row_indices.len() != values.len() || column_indices.len() != values.len() {
            return Err(LinalgError::invalid(
                "values",
                format!(
                    "coordinate arrays must have equal length (rows: {}, columns: {}, values: {})",
                    row_indices.len(),
                    column_indices.len(),
                    values.len()
                ),
            ));
        }
        let mut per_row: Vec<Vec<(usize, T)>> = vec![Vec::new(); rows];
        for ((&i, &j), &v) in row_indices.iter().zip(column_indices).zip(values) {
            check_entry(i, rows, j, columns)?;
            per_row[i].push((j, v));
        }
        Ok(Self::from_unsorted_rows(rows, columns, per_row))
    }

    /// Build from compressed sparse row arrays.
    pub fn from_compressed_row(
        rows: usize,
        columns: usize,
        row_pointers: &[usize],
        column_indices: &[usize],
        values: &[T],
    ) -> Result<Self> {
        check_pointers("row_pointers", row_pointers, rows, values.len())?;
        if column_indices.len() != values.len() {
            return Err(LinalgError::invalid(
                "column_indices",
                format!("expected {} column indices, got {}", values.len(), column_indices.len()),
            ));
        }
        let mut per_row: Vec<Vec<(usize, T)>> = vec![Vec::new(); rows];
        for i in 0..rows {
            for k in row_pointers[i]..row_pointers[i + 1] {
                let j = column_indices[k];
                check_entry(i, rows, j, columns)?;
                per_row[i].push((j, values[k]));
            }
        }
        Ok(Self::from_unsorted_rows(rows, columns, per_row))
    }

    /// Build from compressed sparse column arrays.
    pub fn from_compressed_column(
        rows: usize,
        columns: usize,
        row_indices: &[usize],
        column_pointers: &[usize],
        values: &[T],
    ) -> Result<Self> {
        check_pointers("column_pointers", column_pointers, columns, values.len())?;
        if row_indices.len() != values.len() {
            return Err(LinalgError::invalid(
                "row_indices",
                format!("expected {} row indices, got {}", values.len(), row_indices.len()),
            ));
        }
        let mut per_row: Vec<Vec<(usize, T)>> = vec![Vec::new(); rows];
        for j in 0..columns {
            for k in column_pointers[j]..column_pointers[j + 1] {
                let i = row_indices[k];
                check_entry(i, rows, j, columns)?;
                per_row[i].push((j, values[k]));
            }
        }
        Ok(Self::from_unsorted_rows(rows, columns, per_row))
    }

    /// Sort each row by column and merge duplicates by summation. Explicit
    /// zeros, including sums that cancel, stay stored.
    pub(crate) fn from_unsorted_rows(rows: usize, columns: usize, mut per_row: Vec<Vec<(usize, T)>>) -> Self {
        let mut row_pointers = Vec::with_capacity(rows + 1);
        let mut column_indices = Vec::new();
        let mut values: Vec<T> = Vec::new();
        row_pointers.push(0);
        for row in per_row.iter_mut() {
            row.sort_by_key(|&(j, _)| j);
            let start = values.len();
            for &(j, v) in row.iter() {
                if values.len() > start && column_indices[values.len() - 1] == j {
                    let last = values.len() - 1;
                    values[last] += v;
                } else {
                    column_indices.push(j);
                    values.push(v);
                }
            }
            row_pointers.push(values.len());
        }
        Self {
            rows,
            columns,
            row_pointers,
            column_indices,
            values,
        }
    }

    pub fn row_pointers(&self) -> &[usize] {
        &self.row_pointers
    }

    pub fn column_indices(&self) -> &[usize] {
        &self.column_indices
    }

    pub fn values(&self) -> &[T] {
        &self.values
    }

    /// Number of stored entries (explicit zeros included).
    pub fn non_zeros_count(&self) -> usize {
        self.values.len()
    }

    fn find(&self, row: usize, column: usize) -> std::result::Result<usize, usize> {
        let (start, end) = (self.row_pointers[row], self.row_pointers[row + 1]);
        self.column_indices[start..end]
            .binary_search(&column)
            .map(|k| start + k)
            .map_err(|k| start + k)
    }

    /// Apply `f` to the stored values only.
    pub(crate) fn map_stored(&mut self, f: impl Fn(T) -> T) {
        self.values.iter_mut().for_each(|v| *v = f(*v));
    }
}

fn check_entry(row: usize, rows: usize, column: usize, columns: usize) -> Result<()> {
    if row >= rows {
        return Err(LinalgError::IndexOutOfRange { index: row, bound: rows });
    }
    if column >= columns {
        return Err(LinalgError::IndexOutOfRange { index: column, bound: columns });
    }
    Ok(())
}

fn check_pointers(arg: &'static str, pointers: &[usize], outer: usize, nnz: usize) -> Result<()> {
    if pointers.len() != outer + 1 {
        return Err(LinalgError::invalid(
            arg,
            format!("expected {} pointers, got {}", outer + 1, pointers.len()),
        ));
    }
    if pointers[0] != 0 || pointers[outer] != nnz {
        return Err(LinalgError::invalid(
            arg,
            format!("pointers must start at 0 and end at {nnz}"),
        ));
    }
    if pointers.windows(2).any(|w| w[0] > w[1]) {
        return Err(LinalgError::invalid(arg, "pointers must be non-decreasing"));
    }
    Ok(())
}

impl<T: Scalar> MatrixStorageOps<T> for SparseCompressedRowStorage<T> {
    fn row_count(&self) -> usize {
        self.rows
    }

    fn column_count(&self) -> usize {
        self.columns
    }

    fn flags(&self) -> StorageFlags {
        StorageFlags::FULLY_MUTABLE
    }

    fn at(&self, row: usize, column: usize) -> T {
        match self.find(row, column) {
            Ok(k) => self.values[k],
            Err(_) => T::zero(),
        }
    }

    fn set(&mut self, row: usize, column: usize, value: T) -> Result<()> {
        match self.find(row, column) {
            Ok(k) if value == T::zero() => {
                self.column_indices.remove(k);
                self.values.remove(k);
                self.row_pointers[row + 1..].iter_mut().for_each(|p| *p -= 1);
            }
            Ok(k) => self.values[k] = value,
            Err(_) if value == T::zero() => {}
            Err(k) => {
                self.column_indices.insert(k, column);
                self.values.insert(k, value);
                self.row_pointers[row + 1..].iter_mut().for_each(|p| *p += 1);
            }
        }
        Ok(())
    }

    fn clear(&mut self) {
        self.row_pointers.iter_mut().for_each(|p| *p = 0);
        self.column_indices.clear();
        self.values.clear();
    }

    fn enumerate_non_zero(&self) -> Box<dyn Iterator<Item = (usize, usize, T)> + '_> {
        Box::new((0..self.rows).flat_map(move |i| {
            (self.row_pointers[i]..self.row_pointers[i + 1])
                .map(move |k| (i, self.column_indices[k], self.values[k]))
        }))
    }
}

impl<T: Scalar> MatVec<T> for SparseCompressedRowStorage<T> {
    fn mat_vec(&self, x: &[T], y: &mut [T]) {
        assert_eq!(x.len(), self.columns);
        assert_eq!(y.len(), self.rows);
        for (i, yi) in y.iter_mut().enumerate() {
            let mut sum = T::zero();
            for k in self.row_pointers[i]..self.row_pointers[i + 1] {
                sum += self.values[k] * x[self.column_indices[k]];
            }
            *yi = sum;
        }
    }

    fn transpose_mat_vec(&self, x: &[T], y: &mut [T], conjugate: bool) {
        assert_eq!(x.len(), self.rows);
        assert_eq!(y.len(), self.columns);
        y.iter_mut().for_each(|v| *v = T::zero());
        for (i, &xi) in x.iter().enumerate() {
            for k in self.row_pointers[i]..self.row_pointers[i + 1] {
                let a = if conjugate { self.values[k].conjugate() } else { self.values[k] };
                y[self.column_indices[k]] += a * xi;
            }
        }
    }
}
