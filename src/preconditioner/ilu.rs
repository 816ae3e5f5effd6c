//! ILU(0) factorization with zero fill (Saad §10.3).
//!
//! `L` (unit lower) and `U` share one compressed-row pattern, the non-zero
//! pattern of `A`. Each row keeps its column indices sorted so the update of
//! row `i` by row `k` can look entries up by binary search.

use crate::core::scalar::Scalar;
use crate::error::{LinalgError, Result, Shape};
use crate::matrix::Matrix;
use crate::preconditioner::Preconditioner;
use crate::utils::checks;
use crate::vector::Vector;

#[derive(Debug, Clone, Default)]
pub struct Ilu0Preconditioner<T> {
    row_pointers: Vec<usize>,
    column_indices: Vec<usize>,
    values: Vec<T>,
    /// Position of the diagonal entry of each row in `values`.
    diagonal: Vec<usize>,
}

impl<T: Scalar> Ilu0Preconditioner<T> {
    pub fn new() -> Self {
        Self {
            row_pointers: vec![0],
            column_indices: Vec::new(),
            values: Vec::new(),
            diagonal: Vec::new(),
        }
    }

    fn order(&self) -> usize {
        self.diagonal.len()
    }

    fn row(&self, i: usize) -> std::ops::Range<usize> {
        self.row_pointers[i]..self.row_pointers[i + 1]
    }
}

impl<T: Scalar> Preconditioner<T> for Ilu0Preconditioner<T> {
    fn setup(&mut self, matrix: &Matrix<T>) -> Result<()> {
        let n = matrix.row_count();
        checks::square("matrix", n, matrix.column_count())?;

        let mut rows: Vec<Vec<(usize, T)>> = vec![Vec::new(); n];
        for (i, j, v) in matrix.enumerate_non_zero() {
            rows[i].push((j, v));
        }
        let mut row_pointers = Vec::with_capacity(n + 1);
        let mut column_indices = Vec::new();
        let mut values = Vec::new();
        let mut diagonal = Vec::with_capacity(n);
        row_pointers.push(0);
        for (i, mut row) in rows.into_iter().enumerate() {
            row.sort_by_key(|&(j, _)| j);
            match row.binary_search_by_key(&i, |&(j, _)| j) {
                Ok(pos) => diagonal.push(values.len() + pos),
                Err(_) => return Err(LinalgError::ZeroPivot(i)),
            }
            for (j, v) in row {
                column_indices.push(j);
                values.push(v);
            }
            row_pointers.push(values.len());
        }

        // IKJ variant restricted to the pattern of A.
        for i in 0..n {
            let (start, end) = (row_pointers[i], row_pointers[i + 1]);
            for kk in start..end {
                let k = column_indices[kk];
                if k >= i {
                    break;
                }
                let pivot = values[diagonal[k]];
                if pivot == T::zero() {
                    return Err(LinalgError::ZeroPivot(k));
                }
                values[kk] /= pivot;
                let factor = values[kk];
                let (k_start, k_end) = (row_pointers[k], row_pointers[k + 1]);
                for jj in kk + 1..end {
                    let j = column_indices[jj];
                    if let Ok(pos) = column_indices[k_start..k_end].binary_search(&j) {
                        let ukj = values[k_start + pos];
                        values[jj] -= factor * ukj;
                    }
                }
            }
            if values[diagonal[i]] == T::zero() {
                return Err(LinalgError::ZeroPivot(i));
            }
        }

        *self = Self {
            row_pointers,
            column_indices,
            values,
            diagonal,
        };
        Ok(())
    }

    fn apply(&self, rhs: &Vector<T>, result: &mut Vector<T>) -> Result<()> {
        let n = self.order();
        checks::same_shape("rhs", Shape::vector(n), rhs.shape())?;
        checks::same_shape("result", rhs.shape(), result.shape())?;

        // L y = r
        let mut y = rhs.to_vec();
        for i in 0..n {
            let mut sum = y[i];
            for k in self.row(i).take_while(|&k| self.column_indices[k] < i) {
                sum -= self.values[k] * y[self.column_indices[k]];
            }
            y[i] = sum;
        }
        // U x = y
        for i in (0..n).rev() {
            let mut sum = y[i];
            for k in self.diagonal[i] + 1..self.row_pointers[i + 1] {
                sum -= self.values[k] * y[self.column_indices[k]];
            }
            y[i] = sum / self.values[self.diagonal[i]];
        }
        result.storage_mut().assign_values(&y);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::{MatrixStorage, SparseCompressedRowStorage};
    use approx::assert_abs_diff_eq;

    fn tridiagonal(n: usize) -> Matrix<f64> {
        Matrix::dense_from_fn(n, n, |i, j| match i.abs_diff(j) {
            0 => 4.0,
            1 => -1.0,
            _ => 0.0,
        })
    }

    #[test]
    fn tridiagonal_ilu0_is_exact() {
        // No fill-in happens, so ILU(0) equals the full LU.
        let a = tridiagonal(6);
        let x_true = Vector::dense_from_vec((1..=6).map(|i| i as f64).collect());
        let b = a.multiply_vector(&x_true).unwrap();
        let mut pc = Ilu0Preconditioner::<f64>::new();
        pc.setup(&a).unwrap();
        let mut x = Vector::dense_from_vec(vec![0.0; 6]);
        pc.apply(&b, &mut x).unwrap();
        for (xi, ei) in x.to_vec().into_iter().zip(x_true.to_vec()) {
            assert_abs_diff_eq!(xi, ei, epsilon = 1e-12);
        }
    }

    #[test]
    fn sparse_input_with_unsorted_coordinates() {
        let a = Matrix::from_storage(MatrixStorage::Sparse(
            SparseCompressedRowStorage::from_coordinate(
                2,
                2,
                &[1, 0, 1, 0],
                &[1, 1, 0, 0],
                &[3.0, 1.0, 2.0, 4.0],
            )
            .unwrap(),
        ));
        let mut pc = Ilu0Preconditioner::<f64>::new();
        pc.setup(&a).unwrap();
        // Full pattern: ILU(0) is the exact LU of [[4,1],[2,3]].
        let b = Vector::dense_from_vec(vec![5.0, 5.0]);
        let mut x = Vector::dense_from_vec(vec![0.0, 0.0]);
        pc.apply(&b, &mut x).unwrap();
        assert_abs_diff_eq!(x.to_vec()[0], 1.0, epsilon = 1e-12);
        assert_abs_diff_eq!(x.to_vec()[1], 1.0, epsilon = 1e-12);
    }

    #[test]
    fn missing_diagonal_is_a_zero_pivot() {
        let a = Matrix::dense_from_fn(2, 2, |i, j| if i == j { 0.0 } else { 1.0 });
        let mut pc = Ilu0Preconditioner::<f64>::new();
        assert_eq!(pc.setup(&a).unwrap_err(), LinalgError::ZeroPivot(0));
    }
}
