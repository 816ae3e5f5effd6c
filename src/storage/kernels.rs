//! Numeric kernels over matrix storages.
//!
//! Kernels assume shapes were validated by the caller. They write straight
//! into `result`; if `result` shared memory with an input the output would be
//! corrupted, so the dispatch layer routes aliased calls through a
//! temporary first.

use crate::core::scalar::Scalar;
use crate::core::traits::{MatrixStorageOps, VectorStorageOps};
use crate::error::Result;
use crate::storage::{
    DenseColumnMajorStorage, DiagonalMatrixStorage, MatrixStorage, SparseCompressedRowStorage, StorageKind,
    VectorStorage, Zeros,
};

#[cfg(test)]
thread_local! {
    static KERNEL_CALLS: std::cell::Cell<usize> = const { std::cell::Cell::new(0) };
}

#[inline]
fn note_kernel_call() {
    #[cfg(test)]
    KERNEL_CALLS.with(|c| c.set(c.get() + 1));
}

/// Kernel invocations made on this thread so far.
#[cfg(test)]
pub(crate) fn kernel_calls() -> usize {
    KERNEL_CALLS.with(|c| c.get())
}

/// How an operand enters a product.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Op {
    None,
    Transpose,
    ConjugateTranspose,
}

impl Op {
    /// Shape of `op(a)`.
    pub fn shape<T: Scalar>(self, a: &MatrixStorage<T>) -> (usize, usize) {
        match self {
            Op::None => (a.row_count(), a.column_count()),
            Op::Transpose | Op::ConjugateTranspose => (a.column_count(), a.row_count()),
        }
    }

    #[inline]
    fn at<T: Scalar>(self, a: &MatrixStorage<T>, i: usize, j: usize) -> T {
        match self {
            Op::None => a.at(i, j),
            Op::Transpose => a.at(j, i),
            Op::ConjugateTranspose => a.at(j, i).conjugate(),
        }
    }

    fn entries<T: Scalar>(self, a: &MatrixStorage<T>) -> Vec<(usize, usize, T)> {
        a.enumerate_non_zero()
            .map(|(i, j, v)| match self {
                Op::None => (i, j, v),
                Op::Transpose => (j, i, v),
                Op::ConjugateTranspose => (j, i, v.conjugate()),
            })
            .collect()
    }
}

/// Storage of `kind` holding the column-major `values`. A diagonal target
/// keeps only the diagonal of `values`; callers only ask for one when every
/// off-diagonal value is zero.
fn storage_from_values<T: Scalar>(kind: StorageKind, rows: usize, columns: usize, values: &[T]) -> MatrixStorage<T> {
    match kind {
        StorageKind::Dense => MatrixStorage::Dense(DenseColumnMajorStorage::from_fn(rows, columns, |i, j| values[j * rows + i])),
        StorageKind::Sparse => {
            MatrixStorage::Sparse(SparseCompressedRowStorage::from_fn(rows, columns, |i, j| values[j * rows + i]))
        }
        StorageKind::Diagonal => {
            MatrixStorage::Diagonal(DiagonalMatrixStorage::from_fn(rows, columns, |i| values[i * rows + i]))
        }
    }
}

/// f(a) into fresh storage: `a`'s representation when `f(0) == 0`, dense
/// otherwise.
pub fn mapped<T: Scalar>(a: &MatrixStorage<T>, f: impl Fn(T) -> T) -> MatrixStorage<T> {
    note_kernel_call();
    let keeps_zero = f(T::zero()) == T::zero();
    match a {
        MatrixStorage::Dense(s) => {
            let mut s = s.clone();
            s.values_mut().iter_mut().for_each(|v| *v = f(*v));
            MatrixStorage::Dense(s)
        }
        MatrixStorage::Sparse(s) if keeps_zero => {
            let mut s = s.clone();
            s.map_stored(&f);
            MatrixStorage::Sparse(s)
        }
        MatrixStorage::Diagonal(s) if keeps_zero => {
            let mut s = s.clone();
            s.diagonal_mut().iter_mut().for_each(|v| *v = f(*v));
            MatrixStorage::Diagonal(s)
        }
        _ => MatrixStorage::Dense(DenseColumnMajorStorage::from_fn(a.row_count(), a.column_count(), |i, j| {
            f(a.at(i, j))
        })),
    }
}

/// result ← f(a), keeping `result`'s representation.
pub fn map<T: Scalar>(a: &MatrixStorage<T>, f: impl Fn(T) -> T, result: &mut MatrixStorage<T>) -> Result<()> {
    note_kernel_call();
    if let (MatrixStorage::Dense(a), MatrixStorage::Dense(r)) = (a, &mut *result) {
        for (rv, &av) in r.values_mut().iter_mut().zip(a.values()) {
            *rv = f(av);
        }
        return Ok(());
    }
    let keeps_zero = f(T::zero()) == T::zero();
    if keeps_zero && a.kind() == result.kind() {
        *result = a.clone();
        return result.map_inplace(f, Zeros::AllowSkip);
    }
    let values: Vec<T> = a.to_column_major().into_iter().map(f).collect();
    result.assign_column_major(&values)
}

/// f(a, b) into fresh storage, following [`result_kind`] when `f(0, 0) == 0`
/// and dense otherwise.
pub fn zipped<T: Scalar>(a: &MatrixStorage<T>, b: &MatrixStorage<T>, f: impl Fn(T, T) -> T) -> MatrixStorage<T> {
    note_kernel_call();
    let kind = if f(T::zero(), T::zero()) == T::zero() {
        result_kind(a.kind(), b.kind())
    } else {
        StorageKind::Dense
    };
    if let (MatrixStorage::Dense(a), MatrixStorage::Dense(b)) = (a, b) {
        let mut r = a.clone();
        for (rv, &bv) in r.values_mut().iter_mut().zip(b.values()) {
            *rv = f(*rv, bv);
        }
        return MatrixStorage::Dense(r);
    }
    let values: Vec<T> = a
        .to_column_major()
        .into_iter()
        .zip(b.to_column_major())
        .map(|(x, y)| f(x, y))
        .collect();
    storage_from_values(kind, a.row_count(), a.column_count(), &values)
}

/// result ← f(a, b), keeping `result`'s representation.
pub fn zip_map<T: Scalar>(
    a: &MatrixStorage<T>,
    b: &MatrixStorage<T>,
    f: impl Fn(T, T) -> T,
    result: &mut MatrixStorage<T>,
) -> Result<()> {
    note_kernel_call();
    if let (MatrixStorage::Dense(a), MatrixStorage::Dense(b), MatrixStorage::Dense(r)) = (a, b, &mut *result) {
        for ((rv, &av), &bv) in r.values_mut().iter_mut().zip(a.values()).zip(b.values()) {
            *rv = f(av, bv);
        }
        return Ok(());
    }
    let av = a.to_column_major();
    let bv = b.to_column_major();
    let values: Vec<T> = av.into_iter().zip(bv).map(|(x, y)| f(x, y)).collect();
    result.assign_column_major(&values)
}

/// Column-major values of op(a) · op(b).
fn product_values<T: Scalar>(a: &MatrixStorage<T>, op_a: Op, b: &MatrixStorage<T>, op_b: Op) -> Vec<T> {
    let (m, inner) = op_a.shape(a);
    let (_, n) = op_b.shape(b);
    let mut values = vec![T::zero(); m * n];
    if a.is_dense() && b.is_dense() {
        for j in 0..n {
            for i in 0..m {
                let mut sum = T::zero();
                for k in 0..inner {
                    sum += op_a.at(a, i, k) * op_b.at(b, k, j);
                }
                values[j * m + i] = sum;
            }
        }
        return values;
    }
    let mut b_rows: Vec<Vec<(usize, T)>> = vec![Vec::new(); inner];
    for (k, j, v) in op_b.entries(b) {
        b_rows[k].push((j, v));
    }
    for (i, k, v) in op_a.entries(a) {
        for &(j, w) in &b_rows[k] {
            values[j * m + i] += v * w;
        }
    }
    values
}

/// op(a) · op(b) into fresh storage of [`result_kind`].
pub fn product<T: Scalar>(a: &MatrixStorage<T>, op_a: Op, b: &MatrixStorage<T>, op_b: Op) -> MatrixStorage<T> {
    note_kernel_call();
    let (m, _) = op_a.shape(a);
    let (_, n) = op_b.shape(b);
    let values = product_values(a, op_a, b, op_b);
    storage_from_values(result_kind(a.kind(), b.kind()), m, n, &values)
}

/// result ← op(a) · op(b), keeping `result`'s representation.
pub fn multiply<T: Scalar>(
    a: &MatrixStorage<T>,
    op_a: Op,
    b: &MatrixStorage<T>,
    op_b: Op,
    result: &mut MatrixStorage<T>,
) -> Result<()> {
    note_kernel_call();
    let values = product_values(a, op_a, b, op_b);
    result.assign_column_major(&values)
}

/// y ← op(a) · x.
pub fn mat_vec<T: Scalar>(a: &MatrixStorage<T>, op: Op, x: &[T], y: &mut [T]) {
    use crate::core::traits::MatVec;
    note_kernel_call();
    match op {
        Op::None => a.mat_vec(x, y),
        Op::Transpose => a.transpose_mat_vec(x, y, false),
        Op::ConjugateTranspose => a.transpose_mat_vec(x, y, true),
    }
}

/// result ← f(a), element by element, for vectors.
pub fn vector_map<T: Scalar>(a: &VectorStorage<T>, f: impl Fn(T) -> T, result: &mut VectorStorage<T>) {
    note_kernel_call();
    if let (VectorStorage::Dense(a), VectorStorage::Dense(r)) = (a, &mut *result) {
        for (rv, &av) in r.values_mut().iter_mut().zip(a.values()) {
            *rv = f(av);
        }
        return;
    }
    if f(T::zero()) == T::zero() && a.kind() == result.kind() {
        *result = a.clone();
        result.map_inplace(f, Zeros::AllowSkip);
        return;
    }
    let values: Vec<T> = a.to_vec().into_iter().map(f).collect();
    result.assign_values(&values);
}

/// result ← f(a, b), element by element, for vectors.
pub fn vector_zip_map<T: Scalar>(
    a: &VectorStorage<T>,
    b: &VectorStorage<T>,
    f: impl Fn(T, T) -> T,
    result: &mut VectorStorage<T>,
) {
    note_kernel_call();
    if let (VectorStorage::Dense(a), VectorStorage::Dense(b), VectorStorage::Dense(r)) = (a, b, &mut *result) {
        for ((rv, &av), &bv) in r.values_mut().iter_mut().zip(a.values()).zip(b.values()) {
            *rv = f(av, bv);
        }
        return;
    }
    let values: Vec<T> = a.to_vec().into_iter().zip(b.to_vec()).map(|(x, y)| f(x, y)).collect();
    result.assign_values(&values);
}

/// Σ op(aᵢ) · bᵢ, conjugating `a` when asked.
pub fn dot<T: Scalar>(a: &VectorStorage<T>, b: &VectorStorage<T>, conjugate: bool) -> T {
    note_kernel_call();
    let c = |v: T| if conjugate { v.conjugate() } else { v };
    match (a, b) {
        (VectorStorage::Dense(a), VectorStorage::Dense(b)) => {
            a.values().iter().zip(b.values()).map(|(&x, &y)| c(x) * y).sum()
        }
        (VectorStorage::Sparse(a), b) => a.enumerate_non_zero().map(|(i, x)| c(x) * b.at(i)).sum(),
        (a, VectorStorage::Sparse(b)) => b.enumerate_non_zero().map(|(i, y)| c(a.at(i)) * y).sum(),
    }
}

/// Representation for the result of combining `a` and `b` element-wise or by
/// product: dense if either is dense, diagonal if both are, sparse otherwise.
pub fn result_kind(a: StorageKind, b: StorageKind) -> StorageKind {
    match (a, b) {
        (StorageKind::Dense, _) | (_, StorageKind::Dense) => StorageKind::Dense,
        (StorageKind::Diagonal, StorageKind::Diagonal) => StorageKind::Diagonal,
        _ => StorageKind::Sparse,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::{DenseColumnMajorStorage, DiagonalMatrixStorage, SparseCompressedRowStorage};

    fn dense(rows: usize, cols: usize, f: impl FnMut(usize, usize) -> f64) -> MatrixStorage<f64> {
        MatrixStorage::Dense(DenseColumnMajorStorage::from_fn(rows, cols, f))
    }

    #[test]
    fn dense_product_matches_sparse_product() {
        let a = dense(2, 3, |i, j| (i * 3 + j) as f64 + 1.0);
        let b = dense(3, 2, |i, j| (i as f64) - (j as f64));
        let mut r1 = MatrixStorage::zeros(StorageKind::Dense, 2, 2);
        multiply(&a, Op::None, &b, Op::None, &mut r1).unwrap();

        let sa = MatrixStorage::Sparse(SparseCompressedRowStorage::from_fn(2, 3, |i, j| a.at(i, j)));
        let sb = MatrixStorage::Sparse(SparseCompressedRowStorage::from_fn(3, 2, |i, j| b.at(i, j)));
        let mut r2 = MatrixStorage::zeros(StorageKind::Sparse, 2, 2);
        multiply(&sa, Op::None, &sb, Op::None, &mut r2).unwrap();
        assert_eq!(r1, r2);
    }

    #[test]
    fn transpose_ops_in_product() {
        // aᵀ·a for a = [[1,2],[3,4]] is [[10,14],[14,20]]
        let a = dense(2, 2, |i, j| (i * 2 + j) as f64 + 1.0);
        let mut r = MatrixStorage::zeros(StorageKind::Dense, 2, 2);
        multiply(&a, Op::Transpose, &a, Op::None, &mut r).unwrap();
        assert_eq!(r.to_column_major(), vec![10.0, 14.0, 14.0, 20.0]);
    }

    #[test]
    fn fresh_product_of_diagonals_is_diagonal() {
        let d = MatrixStorage::Diagonal(DiagonalMatrixStorage::from_diagonal(2, 3, vec![2.0, 3.0]).unwrap());
        let e = MatrixStorage::Diagonal(DiagonalMatrixStorage::from_diagonal(3, 2, vec![5.0, 7.0]).unwrap());
        let p = product(&d, Op::None, &e, Op::None);
        assert_eq!(p.kind(), StorageKind::Diagonal);
        assert_eq!(p.to_column_major(), vec![10.0, 0.0, 0.0, 21.0]);
    }

    #[test]
    fn mapped_fills_when_zero_is_not_preserved() {
        let d = MatrixStorage::Diagonal(DiagonalMatrixStorage::from_diagonal(2, 2, vec![1.0, 2.0]).unwrap());
        let r = mapped(&d, |v: f64| v + 1.0);
        assert_eq!(r.kind(), StorageKind::Dense);
        assert_eq!(r.to_column_major(), vec![2.0, 1.0, 1.0, 3.0]);
    }

    #[test]
    fn diagonal_map_stays_diagonal() {
        let d = MatrixStorage::Diagonal(DiagonalMatrixStorage::from_diagonal(2, 2, vec![4.0, 9.0]).unwrap());
        let mut r = MatrixStorage::zeros(StorageKind::Diagonal, 2, 2);
        map(&d, |v: f64| v.sqrt(), &mut r).unwrap();
        assert_eq!(r.kind(), StorageKind::Diagonal);
        assert_eq!(r.at(1, 1), 3.0);
    }

    #[test]
    fn sparse_dot_visits_stored_entries_only() {
        use crate::storage::{DenseVectorStorage, SparseVectorStorage};
        let a = VectorStorage::Sparse(SparseVectorStorage::from_indexed(4, vec![(1, 2.0), (3, -1.0)]).unwrap());
        let b = VectorStorage::Dense(DenseVectorStorage::from_vec(vec![5.0, 3.0, 7.0, 4.0]));
        assert_eq!(dot(&a, &b, false), 2.0);
        assert_eq!(dot(&b, &a, false), 2.0);
    }

    #[test]
    fn result_kind_rules() {
        assert_eq!(result_kind(StorageKind::Sparse, StorageKind::Dense), StorageKind::Dense);
        assert_eq!(result_kind(StorageKind::Diagonal, StorageKind::Diagonal), StorageKind::Diagonal);
        assert_eq!(result_kind(StorageKind::Diagonal, StorageKind::Sparse), StorageKind::Sparse);
    }
}
