//! Norms, reductions and the factorization-backed matrix properties.

use num_traits::Zero;

use crate::core::scalar::{RealScalar, Scalar, nan_max};
use crate::core::traits::MatrixStorageOps;
use crate::error::{LinalgError, Result};
use crate::factorization::{Lu, Svd};
use crate::matrix::Matrix;
use crate::storage::{MatrixStorage, Zeros};
use crate::utils::checks;
use crate::vector::Vector;

impl<T: Scalar> Matrix<T> {
    /// Sum of the diagonal of a square matrix.
    pub fn trace(&self) -> Result<T> {
        checks::square("self", self.row_count(), self.column_count())?;
        Ok((0..self.row_count()).map(|i| self.storage.at(i, i)).sum())
    }

    /// Maximum absolute column sum.
    pub fn l1_norm(&self) -> T::Real {
        self.column_magnitude_sums()
            .into_iter()
            .fold(T::Real::zero(), nan_max)
    }

    /// Maximum absolute row sum.
    pub fn infinity_norm(&self) -> T::Real {
        let mut sums = vec![T::Real::zero(); self.row_count()];
        for (i, _, v) in self.storage.enumerate_non_zero() {
            sums[i] += v.magnitude();
        }
        sums.into_iter().fold(T::Real::zero(), nan_max)
    }

    pub fn frobenius_norm(&self) -> T::Real {
        let sum: T::Real = self
            .storage
            .enumerate_non_zero()
            .map(|(_, _, v)| v.magnitude_squared())
            .sum();
        sum.sqrt()
    }

    fn column_magnitude_sums(&self) -> Vec<T::Real> {
        let mut sums = vec![T::Real::zero(); self.column_count()];
        for (_, j, v) in self.storage.enumerate_non_zero() {
            sums[j] += v.magnitude();
        }
        sums
    }

    /// Largest singular value.
    pub fn l2_norm(&self) -> Result<T::Real> {
        Ok(Svd::new(self, false)?.l2_norm())
    }

    /// Ratio of the largest to the smallest singular value.
    pub fn condition_number(&self) -> Result<T::Real> {
        Ok(Svd::new(self, false)?.condition_number())
    }

    /// Numerical rank from the singular values.
    pub fn rank(&self) -> Result<usize> {
        Ok(Svd::new(self, false)?.rank())
    }

    /// Dimension of the null space, `columns - rank`.
    pub fn nullity(&self) -> Result<usize> {
        Ok(self.column_count() - self.rank()?)
    }

    /// Orthonormal basis of the null space.
    pub fn kernel(&self) -> Result<Vec<Vector<T>>> {
        Svd::new(self, true)?.kernel()
    }

    /// Orthonormal basis of the column space.
    pub fn range(&self) -> Result<Vec<Vector<T>>> {
        Svd::new(self, true)?.range()
    }

    pub fn pseudo_inverse(&self) -> Result<Matrix<T>> {
        Svd::new(self, true)?.pseudo_inverse()
    }

    pub fn determinant(&self) -> Result<T> {
        Ok(Lu::new(self)?.determinant())
    }

    /// Inverse of a square, non-singular matrix.
    pub fn inverse(&self) -> Result<Matrix<T>> {
        Lu::new(self)?.inverse()
    }

    /// p-norm of every row.
    pub fn row_norms(&self, p: f64) -> Result<Vec<T::Real>> {
        check_norm_order(p)?;
        Ok(self
            .fold_by_row(T::Real::zero(), |acc, v| accumulate_norm(acc, v, p), Zeros::AllowSkip)
            .into_iter()
            .map(|acc| finish_norm(acc, p))
            .collect())
    }

    /// p-norm of every column.
    pub fn column_norms(&self, p: f64) -> Result<Vec<T::Real>> {
        check_norm_order(p)?;
        Ok(self
            .fold_by_column(T::Real::zero(), |acc, v| accumulate_norm(acc, v, p), Zeros::AllowSkip)
            .into_iter()
            .map(|acc| finish_norm(acc, p))
            .collect())
    }

    pub fn row_sums(&self) -> Vector<T> {
        Vector::dense_from_vec(self.fold_by_row(T::zero(), |acc, v| acc + v, Zeros::AllowSkip))
    }

    pub fn column_sums(&self) -> Vector<T> {
        Vector::dense_from_vec(self.fold_by_column(T::zero(), |acc, v| acc + v, Zeros::AllowSkip))
    }

    /// Fold every row left to right, starting each from `init`.
    ///
    /// With [`Zeros::AllowSkip`] only stored entries are visited. Rows are
    /// independent and are spread over the rayon pool once the matrix holds at
    /// least the builder's `parallel_fold_threshold` elements.
    pub fn fold_by_row<U>(&self, init: U, f: impl Fn(U, T) -> U + Sync + Send, zeros: Zeros) -> Vec<U>
    where
        U: Clone + Send + Sync,
    {
        let row = |i: usize, acc: U| -> U {
            match (&self.storage, zeros) {
                (MatrixStorage::Sparse(s), Zeros::AllowSkip) => {
                    let ptr = s.row_pointers();
                    s.values()[ptr[i]..ptr[i + 1]].iter().fold(acc, |acc, &v| f(acc, v))
                }
                (MatrixStorage::Diagonal(s), Zeros::AllowSkip) => match s.diagonal().get(i) {
                    Some(&d) => f(acc, d),
                    None => acc,
                },
                _ => (0..self.column_count()).fold(acc, |acc, j| f(acc, self.storage.at(i, j))),
            }
        };
        self.fan_out(self.row_count(), init, row)
    }

    /// Fold every column top to bottom, starting each from `init`.
    pub fn fold_by_column<U>(&self, init: U, f: impl Fn(U, T) -> U + Sync + Send, zeros: Zeros) -> Vec<U>
    where
        U: Clone + Send + Sync,
    {
        if let (MatrixStorage::Sparse(s), Zeros::AllowSkip) = (&self.storage, zeros) {
            // Row-major entries visit each column top to bottom.
            let mut out = vec![init; self.column_count()];
            for (_, j, v) in s.enumerate_non_zero() {
                out[j] = f(out[j].clone(), v);
            }
            return out;
        }
        let column = |j: usize, acc: U| -> U {
            match (&self.storage, zeros) {
                (MatrixStorage::Diagonal(s), Zeros::AllowSkip) => match s.diagonal().get(j) {
                    Some(&d) => f(acc, d),
                    None => acc,
                },
                _ => (0..self.row_count()).fold(acc, |acc, i| f(acc, self.storage.at(i, j))),
            }
        };
        self.fan_out(self.column_count(), init, column)
    }

    fn fan_out<U>(&self, len: usize, init: U, body: impl Fn(usize, U) -> U + Sync + Send) -> Vec<U>
    where
        U: Clone + Send + Sync,
    {
        let mut out = vec![init; len];
        #[cfg(feature = "rayon")]
        {
            use crate::context::builder::Builder;
            let threshold = Builder::<T>::instance().options().parallel_fold_threshold;
            if self.row_count() * self.column_count() >= threshold {
                use rayon::prelude::*;
                out.par_iter_mut().enumerate().for_each(|(i, slot)| {
                    *slot = body(i, slot.clone());
                });
                return out;
            }
        }
        for (i, slot) in out.iter_mut().enumerate() {
            *slot = body(i, slot.clone());
        }
        out
    }
}

fn check_norm_order(p: f64) -> Result<()> {
    if p.is_nan() || p < 1.0 {
        return Err(LinalgError::invalid("p", format!("norm order must be at least 1, got {p}")));
    }
    Ok(())
}

fn accumulate_norm<T: Scalar>(acc: T::Real, v: T, p: f64) -> T::Real {
    let m = v.magnitude();
    if p.is_infinite() {
        nan_max(acc, m)
    } else if p == 1.0 {
        acc + m
    } else if p == 2.0 {
        acc + m * m
    } else {
        acc + m.pow(T::Real::from_f64(p))
    }
}

fn finish_norm<R: RealScalar>(acc: R, p: f64) -> R {
    if p.is_infinite() || p == 1.0 {
        acc
    } else if p == 2.0 {
        acc.sqrt()
    } else {
        acc.pow(R::one() / R::from_f64(p))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::{DiagonalMatrixStorage, SparseCompressedRowStorage, StorageKind};
    use approx::assert_abs_diff_eq;

    fn sample() -> Matrix<f64> {
        Matrix::dense_from_fn(2, 3, |i, j| [[1.0, -2.0, 3.0], [-4.0, 5.0, -6.0]][i][j])
    }

    #[test]
    fn entrywise_norms() {
        let a = sample();
        assert_eq!(a.l1_norm(), 9.0);
        assert_eq!(a.infinity_norm(), 15.0);
        assert_abs_diff_eq!(a.frobenius_norm(), 91f64.sqrt(), epsilon = 1e-12);
    }

    #[test]
    fn norms_propagate_nan() {
        let a = Matrix::dense_from_fn(2, 2, |i, j| if (i, j) == (1, 0) { f64::NAN } else { 1.0 });
        assert!(a.l1_norm().is_nan());
        assert!(a.infinity_norm().is_nan());
        assert!(a.frobenius_norm().is_nan());
        let column = a.column_norms(f64::INFINITY).unwrap();
        assert!(column[0].is_nan());
        assert_eq!(column[1], 1.0);
        assert!(a.row_norms(f64::INFINITY).unwrap()[1].is_nan());

        let s = Matrix::from_storage(MatrixStorage::Sparse(
            SparseCompressedRowStorage::from_coordinate(3, 3, &[0, 2], &[0, 2], &[7.0, f64::NAN]).unwrap(),
        ));
        assert!(s.infinity_norm().is_nan());
        assert!(s.l1_norm().is_nan());
    }

    #[test]
    fn nan_max_keeps_nan_in_either_position() {
        assert!(nan_max(f64::NAN, 1.0).is_nan());
        assert!(nan_max(1.0, f64::NAN).is_nan());
        assert_eq!(nan_max(1.0f32, 2.0), 2.0);
    }

    #[test]
    fn trace_needs_a_square_matrix() {
        assert!(sample().trace().is_err());
        let d = Matrix::from_storage(MatrixStorage::Diagonal(
            DiagonalMatrixStorage::from_diagonal(3, 3, vec![1.0, 2.0, 3.0]).unwrap(),
        ));
        assert_eq!(d.trace().unwrap(), 6.0);
        assert_eq!(d.determinant().unwrap(), 6.0);
    }

    #[test]
    fn row_and_column_reductions() {
        let a = sample();
        assert_eq!(a.row_sums().to_vec(), vec![2.0, -5.0]);
        assert_eq!(a.column_sums().to_vec(), vec![-3.0, 3.0, -3.0]);
        assert_eq!(a.row_norms(1.0).unwrap(), vec![6.0, 15.0]);
        assert_eq!(a.column_norms(f64::INFINITY).unwrap(), vec![4.0, 5.0, 6.0]);
        assert_abs_diff_eq!(a.row_norms(2.0).unwrap()[0], 14f64.sqrt(), epsilon = 1e-12);
        assert!(a.row_norms(0.5).is_err());
    }

    #[test]
    fn sparse_folds_skip_structural_zeros() {
        let s = Matrix::from_storage(MatrixStorage::Sparse(
            SparseCompressedRowStorage::from_coordinate(3, 3, &[0, 2, 2], &[1, 0, 2], &[4.0, 1.0, 2.0]).unwrap(),
        ));
        let visits = s.fold_by_row(0usize, |n, _| n + 1, Zeros::AllowSkip);
        assert_eq!(visits, vec![1, 0, 2]);
        let all = s.fold_by_column(0usize, |n, _| n + 1, Zeros::Include);
        assert_eq!(all, vec![3, 3, 3]);
        assert_eq!(s.column_sums().to_vec(), vec![1.0, 4.0, 2.0]);
    }

    #[test]
    fn large_folds_match_serial_sums() {
        let n = 80;
        let a = Matrix::dense_from_fn(n, n, |i, j| (i + 2 * j) as f64);
        let sums = a.row_sums();
        for i in 0..n {
            let expected: f64 = (0..n).map(|j| (i + 2 * j) as f64).sum();
            assert_eq!(sums.at(i).unwrap(), expected);
        }
    }

    #[test]
    fn svd_backed_properties() {
        let a = Matrix::dense_from_fn(3, 3, |i, j| if j == 2 { (i + 1) as f64 } else { (i * 3 + j) as f64 });
        let full = Matrix::identity(StorageKind::Dense, 3).multiply_scalar(2.0);
        assert_eq!(full.rank().unwrap(), 3);
        assert_eq!(full.nullity().unwrap(), 0);
        assert_abs_diff_eq!(full.l2_norm().unwrap(), 2.0, epsilon = 1e-12);
        assert_abs_diff_eq!(full.condition_number().unwrap(), 1.0, epsilon = 1e-12);
        assert_eq!(a.range().unwrap().len(), a.rank().unwrap());
    }
}
