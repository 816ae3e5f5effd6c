//! `Builder<T>`: the factory for matrices, vectors and default stop criteria.
//!
//! Every convenience constructor builds a storage and wraps it through
//! [`Builder::matrix`] or [`Builder::vector`], so the constructors never care
//! which representation they end up in. Requests to fill with zero take the
//! plain zero-storage path instead of calling an initializer per element.
//!
//! The builder for an element type is resolved with [`Builder::instance`] and
//! replaced with [`Builder::register`].

use std::fmt;
use std::marker::PhantomData;
use std::sync::Arc;

use rand::Rng;
use rand::distributions::Distribution;

use crate::config::BuilderOptions;
use crate::core::scalar::Scalar;
use crate::error::{LinalgError, Result};
use crate::matrix::Matrix;
use crate::solver::{
    DivergenceStopCriterion, FailureStopCriterion, IterationCountStopCriterion, IterationStopCriterion,
    ResidualStopCriterion,
};
use crate::storage::kernels;
use crate::storage::{
    DenseColumnMajorStorage, DenseVectorStorage, DiagonalMatrixStorage, MatrixStorage, SparseCompressedRowStorage,
    SparseVectorStorage, StorageKind, VectorStorage,
};
use crate::utils::checks;
use crate::vector::Vector;

pub struct Builder<T> {
    options: BuilderOptions,
    _element: PhantomData<fn() -> T>,
}

impl<T> Clone for Builder<T> {
    fn clone(&self) -> Self {
        Self {
            options: self.options.clone(),
            _element: PhantomData,
        }
    }
}

impl<T> fmt::Debug for Builder<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Builder").field("options", &self.options).finish()
    }
}

impl<T: Scalar> Default for Builder<T> {
    fn default() -> Self {
        Self::new()
    }
}

/// Row-major `rows × columns` from a list of equally long rows.
fn rectangular<R: AsRef<[T]>, T>(arg: &'static str, arrays: &[R]) -> Result<(usize, usize)> {
    checks::non_empty(arg, arrays.len())?;
    let width = arrays[0].as_ref().len();
    checks::non_empty(arg, width)?;
    if let Some(k) = arrays.iter().position(|a| a.as_ref().len() != width) {
        return Err(LinalgError::invalid(
            arg,
            format!("array {k} has length {}, expected {width}", arrays[k].as_ref().len()),
        ));
    }
    Ok((arrays.len(), width))
}

fn indexed_entries<T>(
    rows: usize,
    columns: usize,
    entries: impl IntoIterator<Item = (usize, usize, T)>,
) -> Result<Vec<Vec<(usize, T)>>> {
    let mut per_row: Vec<Vec<(usize, T)>> = (0..rows).map(|_| Vec::new()).collect();
    for (i, j, v) in entries {
        checks::index(i, rows)?;
        checks::index(j, columns)?;
        per_row[i].push((j, v));
    }
    Ok(per_row)
}

impl<T: Scalar> Builder<T> {
    /// Builder with the defaults for `T`.
    pub fn new() -> Self {
        Self {
            options: BuilderOptions::for_element(T::ELEMENT_TYPE),
            _element: PhantomData,
        }
    }

    pub fn with_options(options: BuilderOptions) -> Result<Self> {
        options.validate()?;
        Ok(Self {
            options,
            _element: PhantomData,
        })
    }

    pub fn options(&self) -> &BuilderOptions {
        &self.options
    }

    /// The active builder for `T`, created on first use.
    pub fn instance() -> Arc<Builder<T>> {
        T::registry_slot().get()
    }

    /// Make `builder` the active builder for `T`. Matrices built earlier keep
    /// their storage; the replaced builder is returned.
    pub fn register(builder: Builder<T>) -> Arc<Builder<T>> {
        log::info!("registering builder for {}: {:?}", T::ELEMENT_TYPE, builder.options);
        T::registry_slot().replace(builder)
    }

    /// Wrap a storage, whichever representation it is.
    pub fn matrix(&self, storage: MatrixStorage<T>) -> Matrix<T> {
        Matrix::from_storage(storage)
    }

    pub fn vector(&self, storage: VectorStorage<T>) -> Vector<T> {
        Vector::from_storage(storage)
    }

    /// Zero matrix in the representation a combination of `a` and `b` uses:
    /// dense if either is dense, diagonal if both are, sparse otherwise.
    pub fn same_as(&self, a: &Matrix<T>, b: &Matrix<T>, rows: usize, columns: usize) -> Matrix<T> {
        let kind = kernels::result_kind(a.kind(), b.kind());
        self.matrix(MatrixStorage::zeros(kind, rows, columns))
    }

    /// Zero vector, dense if `matrix` is dense and sparse otherwise.
    pub fn same_as_vector(&self, matrix: &Matrix<T>, length: usize) -> Vector<T> {
        let kind = if matrix.is_dense() { StorageKind::Dense } else { StorageKind::Sparse };
        self.vector(VectorStorage::zeros(kind, length))
    }

    // Dense matrices.

    pub fn dense(&self, rows: usize, columns: usize) -> Matrix<T> {
        self.matrix(MatrixStorage::Dense(DenseColumnMajorStorage::new(rows, columns)))
    }

    pub fn dense_filled(&self, rows: usize, columns: usize, value: T) -> Matrix<T> {
        if value == T::zero() {
            return self.dense(rows, columns);
        }
        self.matrix(MatrixStorage::Dense(DenseColumnMajorStorage::filled(rows, columns, value)))
    }

    pub fn dense_from_fn(&self, rows: usize, columns: usize, f: impl FnMut(usize, usize) -> T) -> Matrix<T> {
        self.matrix(MatrixStorage::Dense(DenseColumnMajorStorage::from_fn(rows, columns, f)))
    }

    /// Dense matrix with `value` on the main diagonal.
    pub fn dense_diagonal(&self, rows: usize, columns: usize, value: T) -> Matrix<T> {
        if value == T::zero() {
            return self.dense(rows, columns);
        }
        self.dense_from_fn(rows, columns, |i, j| if i == j { value } else { T::zero() })
    }

    pub fn dense_identity(&self, order: usize) -> Matrix<T> {
        self.dense_diagonal(order, order, T::one())
    }

    /// Copy of a row-major 2-D array.
    pub fn dense_of_array<const C: usize>(&self, array: &[[T; C]]) -> Matrix<T> {
        self.dense_from_fn(array.len(), C, |i, j| array[i][j])
    }

    /// Take ownership of column-major values without copying.
    pub fn dense_of_column_major(&self, rows: usize, columns: usize, values: Vec<T>) -> Result<Matrix<T>> {
        Ok(self.matrix(MatrixStorage::Dense(DenseColumnMajorStorage::from_column_major(
            rows, columns, values,
        )?)))
    }

    pub fn dense_of_indexed(
        &self,
        rows: usize,
        columns: usize,
        entries: impl IntoIterator<Item = (usize, usize, T)>,
    ) -> Result<Matrix<T>> {
        let mut storage = DenseColumnMajorStorage::new(rows, columns);
        for (i, row) in indexed_entries(rows, columns, entries)?.into_iter().enumerate() {
            for (j, v) in row {
                let k = storage.index(i, j);
                storage.values_mut()[k] = v;
            }
        }
        Ok(self.matrix(MatrixStorage::Dense(storage)))
    }

    pub fn dense_of_row_arrays<R: AsRef<[T]>>(&self, rows: &[R]) -> Result<Matrix<T>> {
        let (r, c) = rectangular::<_, T>("rows", rows)?;
        Ok(self.dense_from_fn(r, c, |i, j| rows[i].as_ref()[j]))
    }

    pub fn dense_of_column_arrays<C: AsRef<[T]>>(&self, columns: &[C]) -> Result<Matrix<T>> {
        let (c, r) = rectangular::<_, T>("columns", columns)?;
        Ok(self.dense_from_fn(r, c, |i, j| columns[j].as_ref()[i]))
    }

    pub fn dense_of_row_vectors(&self, rows: &[Vector<T>]) -> Result<Matrix<T>> {
        let arrays: Vec<Vec<T>> = rows.iter().map(Vector::to_vec).collect();
        self.dense_of_row_arrays(&arrays)
    }

    pub fn dense_of_column_vectors(&self, columns: &[Vector<T>]) -> Result<Matrix<T>> {
        let arrays: Vec<Vec<T>> = columns.iter().map(Vector::to_vec).collect();
        self.dense_of_column_arrays(&arrays)
    }

    /// Square dense matrix with `diagonal` on the main diagonal.
    pub fn dense_of_diagonal_vector(&self, diagonal: &Vector<T>) -> Matrix<T> {
        let d = diagonal.to_vec();
        self.dense_from_fn(d.len(), d.len(), |i, j| if i == j { d[i] } else { T::zero() })
    }

    pub fn dense_of_matrix(&self, matrix: &Matrix<T>) -> Matrix<T> {
        let values = matrix.to_column_major();
        self.matrix(MatrixStorage::Dense(DenseColumnMajorStorage::from_fn(
            matrix.row_count(),
            matrix.column_count(),
            |i, j| values[j * matrix.row_count() + i],
        )))
    }

    pub fn dense_random<D, R>(&self, rows: usize, columns: usize, distribution: &D, rng: &mut R) -> Matrix<T>
    where
        D: Distribution<f64> + ?Sized,
        R: Rng + ?Sized,
    {
        self.dense_from_fn(rows, columns, |_, _| T::sample(distribution, &mut *rng))
    }

    // Sparse matrices.

    pub fn sparse(&self, rows: usize, columns: usize) -> Matrix<T> {
        self.matrix(MatrixStorage::Sparse(SparseCompressedRowStorage::new(rows, columns)))
    }

    /// Every element stored with `value`; zero stores nothing.
    pub fn sparse_filled(&self, rows: usize, columns: usize, value: T) -> Matrix<T> {
        if value == T::zero() {
            return self.sparse(rows, columns);
        }
        self.matrix(MatrixStorage::Sparse(SparseCompressedRowStorage::filled(rows, columns, value)))
    }

    pub fn sparse_from_fn(&self, rows: usize, columns: usize, f: impl FnMut(usize, usize) -> T) -> Matrix<T> {
        self.matrix(MatrixStorage::Sparse(SparseCompressedRowStorage::from_fn(rows, columns, f)))
    }

    pub fn sparse_diagonal(&self, rows: usize, columns: usize, value: T) -> Matrix<T> {
        if value == T::zero() {
            return self.sparse(rows, columns);
        }
        self.sparse_from_fn(rows, columns, |i, j| if i == j { value } else { T::zero() })
    }

    pub fn sparse_identity(&self, order: usize) -> Matrix<T> {
        self.sparse_diagonal(order, order, T::one())
    }

    pub fn sparse_of_array<const C: usize>(&self, array: &[[T; C]]) -> Matrix<T> {
        self.sparse_from_fn(array.len(), C, |i, j| array[i][j])
    }

    /// Entries at the same position are summed.
    pub fn sparse_of_indexed(
        &self,
        rows: usize,
        columns: usize,
        entries: impl IntoIterator<Item = (usize, usize, T)>,
    ) -> Result<Matrix<T>> {
        let per_row = indexed_entries(rows, columns, entries)?;
        Ok(self.matrix(MatrixStorage::Sparse(SparseCompressedRowStorage::from_unsorted_rows(
            rows, columns, per_row,
        ))))
    }

    pub fn sparse_of_row_arrays<R: AsRef<[T]>>(&self, rows: &[R]) -> Result<Matrix<T>> {
        let (r, c) = rectangular::<_, T>("rows", rows)?;
        Ok(self.sparse_from_fn(r, c, |i, j| rows[i].as_ref()[j]))
    }

    pub fn sparse_of_column_arrays<C: AsRef<[T]>>(&self, columns: &[C]) -> Result<Matrix<T>> {
        let (c, r) = rectangular::<_, T>("columns", columns)?;
        Ok(self.sparse_from_fn(r, c, |i, j| columns[j].as_ref()[i]))
    }

    pub fn sparse_of_row_vectors(&self, rows: &[Vector<T>]) -> Result<Matrix<T>> {
        let arrays: Vec<Vec<T>> = rows.iter().map(Vector::to_vec).collect();
        self.sparse_of_row_arrays(&arrays)
    }

    pub fn sparse_of_column_vectors(&self, columns: &[Vector<T>]) -> Result<Matrix<T>> {
        let arrays: Vec<Vec<T>> = columns.iter().map(Vector::to_vec).collect();
        self.sparse_of_column_arrays(&arrays)
    }

    pub fn sparse_of_diagonal_vector(&self, diagonal: &Vector<T>) -> Matrix<T> {
        let d = diagonal.to_vec();
        self.sparse_from_fn(d.len(), d.len(), |i, j| if i == j { d[i] } else { T::zero() })
    }

    /// Sparse copy holding the non-zero elements of `matrix`.
    pub fn sparse_of_matrix(&self, matrix: &Matrix<T>) -> Matrix<T> {
        let mut per_row: Vec<Vec<(usize, T)>> = (0..matrix.row_count()).map(|_| Vec::new()).collect();
        for (i, j, v) in matrix.enumerate_non_zero() {
            per_row[i].push((j, v));
        }
        self.matrix(MatrixStorage::Sparse(SparseCompressedRowStorage::from_unsorted_rows(
            matrix.row_count(),
            matrix.column_count(),
            per_row,
        )))
    }

    /// Coordinate (triplet) format. Duplicates are summed, explicit zeros kept.
    pub fn sparse_from_coordinate_format(
        &self,
        rows: usize,
        columns: usize,
        row_indices: &[usize],
        column_indices: &[usize],
        values: &[T],
    ) -> Result<Matrix<T>> {
        Ok(self.matrix(MatrixStorage::Sparse(SparseCompressedRowStorage::from_coordinate(
            rows,
            columns,
            row_indices,
            column_indices,
            values,
        )?)))
    }

    /// Compressed sparse row format. Duplicates are summed, explicit zeros kept.
    pub fn sparse_from_compressed_sparse_row_format(
        &self,
        rows: usize,
        columns: usize,
        row_pointers: &[usize],
        column_indices: &[usize],
        values: &[T],
    ) -> Result<Matrix<T>> {
        Ok(self.matrix(MatrixStorage::Sparse(SparseCompressedRowStorage::from_compressed_row(
            rows,
            columns,
            row_pointers,
            column_indices,
            values,
        )?)))
    }

    /// Compressed sparse column format. Duplicates are summed, explicit zeros kept.
    pub fn sparse_from_compressed_sparse_column_format(
        &self,
        rows: usize,
        columns: usize,
        row_indices: &[usize],
        column_pointers: &[usize],
        values: &[T],
    ) -> Result<Matrix<T>> {
        Ok(self.matrix(MatrixStorage::Sparse(SparseCompressedRowStorage::from_compressed_column(
            rows,
            columns,
            row_indices,
            column_pointers,
            values,
        )?)))
    }

    // Diagonal matrices.

    pub fn diagonal(&self, rows: usize, columns: usize) -> Matrix<T> {
        self.matrix(MatrixStorage::Diagonal(DiagonalMatrixStorage::new(rows, columns)))
    }

    pub fn diagonal_filled(&self, rows: usize, columns: usize, value: T) -> Matrix<T> {
        if value == T::zero() {
            return self.diagonal(rows, columns);
        }
        self.diagonal_from_fn(rows, columns, |_| value)
    }

    /// `f(i)` at `(i, i)`.
    pub fn diagonal_from_fn(&self, rows: usize, columns: usize, f: impl FnMut(usize) -> T) -> Matrix<T> {
        self.matrix(MatrixStorage::Diagonal(DiagonalMatrixStorage::from_fn(rows, columns, f)))
    }

    pub fn diagonal_identity(&self, order: usize) -> Matrix<T> {
        self.diagonal_filled(order, order, T::one())
    }

    /// Takes ownership of the `min(rows, columns)` diagonal values.
    pub fn diagonal_of_diagonal_array(&self, rows: usize, columns: usize, diagonal: Vec<T>) -> Result<Matrix<T>> {
        Ok(self.matrix(MatrixStorage::Diagonal(DiagonalMatrixStorage::from_diagonal(
            rows, columns, diagonal,
        )?)))
    }

    pub fn diagonal_of_diagonal_vector(&self, diagonal: &Vector<T>) -> Matrix<T> {
        let d = diagonal.to_vec();
        self.diagonal_from_fn(d.len(), d.len(), |i| d[i])
    }

    pub fn diagonal_random<D, R>(&self, rows: usize, columns: usize, distribution: &D, rng: &mut R) -> Matrix<T>
    where
        D: Distribution<f64> + ?Sized,
        R: Rng + ?Sized,
    {
        self.diagonal_from_fn(rows, columns, |_| T::sample(distribution, &mut *rng))
    }

    // Vectors.

    pub fn dense_vector(&self, length: usize) -> Vector<T> {
        self.vector(VectorStorage::Dense(DenseVectorStorage::new(length)))
    }

    pub fn dense_vector_filled(&self, length: usize, value: T) -> Vector<T> {
        if value == T::zero() {
            return self.dense_vector(length);
        }
        self.dense_vector_of_vec(vec![value; length])
    }

    pub fn dense_vector_from_fn(&self, length: usize, f: impl FnMut(usize) -> T) -> Vector<T> {
        self.dense_vector_of_vec((0..length).map(f).collect())
    }

    pub fn dense_vector_of_slice(&self, values: &[T]) -> Vector<T> {
        self.dense_vector_of_vec(values.to_vec())
    }

    /// Take ownership of `values` without copying.
    pub fn dense_vector_of_vec(&self, values: Vec<T>) -> Vector<T> {
        self.vector(VectorStorage::Dense(DenseVectorStorage::from_vec(values)))
    }

    pub fn dense_vector_of_indexed(
        &self,
        length: usize,
        entries: impl IntoIterator<Item = (usize, T)>,
    ) -> Result<Vector<T>> {
        let mut values = vec![T::zero(); length];
        for (i, v) in entries {
            checks::index(i, length)?;
            values[i] = v;
        }
        Ok(self.dense_vector_of_vec(values))
    }

    pub fn dense_vector_of_vector(&self, vector: &Vector<T>) -> Vector<T> {
        self.dense_vector_of_vec(vector.to_vec())
    }

    pub fn dense_vector_random<D, R>(&self, length: usize, distribution: &D, rng: &mut R) -> Vector<T>
    where
        D: Distribution<f64> + ?Sized,
        R: Rng + ?Sized,
    {
        self.dense_vector_from_fn(length, |_| T::sample(distribution, &mut *rng))
    }

    pub fn sparse_vector(&self, length: usize) -> Vector<T> {
        self.vector(VectorStorage::Sparse(SparseVectorStorage::new(length)))
    }

    pub fn sparse_vector_filled(&self, length: usize, value: T) -> Vector<T> {
        if value == T::zero() {
            return self.sparse_vector(length);
        }
        self.vector(VectorStorage::Sparse(SparseVectorStorage::filled(length, value)))
    }

    pub fn sparse_vector_from_fn(&self, length: usize, f: impl FnMut(usize) -> T) -> Vector<T> {
        self.vector(VectorStorage::Sparse(SparseVectorStorage::from_fn(length, f)))
    }

    pub fn sparse_vector_of_slice(&self, values: &[T]) -> Vector<T> {
        self.sparse_vector_from_fn(values.len(), |i| values[i])
    }

    pub fn sparse_vector_of_indexed(
        &self,
        length: usize,
        entries: impl IntoIterator<Item = (usize, T)>,
    ) -> Result<Vector<T>> {
        Ok(self.vector(VectorStorage::Sparse(SparseVectorStorage::from_indexed(length, entries)?)))
    }

    pub fn sparse_vector_of_vector(&self, vector: &Vector<T>) -> Vector<T> {
        let values = vector.to_vec();
        self.sparse_vector_of_slice(&values)
    }

    /// Stop criteria used when an iterative solve is given none, in order:
    /// failure, divergence, iteration ceiling, residual.
    pub fn iterative_solver_stop_criteria(&self, max_iterations: usize) -> Vec<Box<dyn IterationStopCriterion<T>>> {
        vec![
            Box::new(FailureStopCriterion::new()),
            Box::new(DivergenceStopCriterion::new_unchecked(
                self.options.divergence_max_relative_increase,
                self.options.divergence_minimum_iterations,
            )),
            Box::new(IterationCountStopCriterion::new(max_iterations)),
            Box::new(ResidualStopCriterion::new_unchecked(self.options.residual_tolerance, 0)),
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use num_complex::Complex32;
    use rand::SeedableRng;
    use rand::distributions::Uniform;
    use rand::rngs::StdRng;

    #[test]
    fn zero_fill_takes_the_empty_path() {
        let b = Builder::<f64>::new();
        let s = b.sparse_filled(3, 4, 0.0);
        match s.storage() {
            MatrixStorage::Sparse(s) => assert_eq!(s.non_zeros_count(), 0),
            other => panic!("unexpected storage {other:?}"),
        }
        let v = b.sparse_vector_filled(5, 0.0);
        match v.storage() {
            VectorStorage::Sparse(s) => assert_eq!(s.non_zeros_count(), 0),
            other => panic!("unexpected storage {other:?}"),
        }
        assert_eq!(b.dense_filled(2, 2, 0.0), b.dense(2, 2));
    }

    #[test]
    fn wrap_dispatches_on_the_storage_variant() {
        let b = Builder::<f64>::new();
        let d = b.matrix(MatrixStorage::Diagonal(DiagonalMatrixStorage::new(2, 2)));
        assert_eq!(d.kind(), StorageKind::Diagonal);
        let s = b.matrix(MatrixStorage::Sparse(SparseCompressedRowStorage::new(2, 2)));
        assert_eq!(s.kind(), StorageKind::Sparse);
        assert_eq!(b.same_as(&d, &s, 2, 2).kind(), StorageKind::Sparse);
        assert_eq!(b.same_as(&d, &d, 2, 2).kind(), StorageKind::Diagonal);
        assert_eq!(b.same_as(&b.dense(1, 1), &s, 2, 2).kind(), StorageKind::Dense);
    }

    #[test]
    fn array_constructors_agree() {
        let b = Builder::<f64>::new();
        let from_array = b.dense_of_array(&[[1.0, 2.0, 3.0], [4.0, 5.0, 6.0]]);
        let from_rows = b.dense_of_row_arrays(&[vec![1.0, 2.0, 3.0], vec![4.0, 5.0, 6.0]]).unwrap();
        let from_columns = b.dense_of_column_arrays(&[[1.0, 4.0], [2.0, 5.0], [3.0, 6.0]]).unwrap();
        let from_major = b.dense_of_column_major(2, 3, vec![1.0, 4.0, 2.0, 5.0, 3.0, 6.0]).unwrap();
        assert_eq!(from_array, from_rows);
        assert_eq!(from_array, from_columns);
        assert_eq!(from_array, from_major);
        assert_eq!(b.sparse_of_matrix(&from_array), from_array);
        let indexed = b.dense_of_indexed(2, 3, [(1, 2, 6.0), (0, 0, 1.0)]).unwrap();
        assert_eq!(indexed.at(1, 2).unwrap(), 6.0);
        assert_eq!(indexed.at(0, 1).unwrap(), 0.0);
    }

    #[test]
    fn ragged_or_empty_arrays_are_rejected() {
        let b = Builder::<f64>::new();
        assert!(matches!(
            b.dense_of_row_arrays(&[vec![1.0, 2.0], vec![3.0]]),
            Err(LinalgError::InvalidArgument { arg: "rows", .. })
        ));
        let empty: [Vec<f64>; 0] = [];
        assert!(b.sparse_of_column_arrays(&empty).is_err());
        assert_eq!(
            b.sparse_of_indexed(2, 2, [(2, 0, 1.0)]).unwrap_err(),
            LinalgError::IndexOutOfRange { index: 2, bound: 2 }
        );
    }

    #[test]
    fn identities_in_every_representation_are_equal() {
        let b = Builder::<Complex32>::new();
        let dense = b.dense_identity(3);
        assert_eq!(dense, b.sparse_identity(3));
        assert_eq!(dense, b.diagonal_identity(3));
        assert_eq!(b.options().residual_tolerance, 1e-6);
    }

    #[test]
    fn random_matrices_follow_the_distribution() {
        let b = Builder::<f64>::new();
        let mut rng = StdRng::seed_from_u64(7);
        let m = b.dense_random(4, 5, &Uniform::new(-1.0, 1.0), &mut rng);
        assert!(m.to_column_major().iter().all(|v| (-1.0..1.0).contains(v)));
        let d = b.diagonal_random(3, 3, &Uniform::new(2.0, 3.0), &mut rng);
        assert!(d.diagonal().to_vec().iter().all(|v| (2.0..3.0).contains(v)));
    }

    #[test]
    fn default_criteria_order() {
        let criteria = Builder::<f64>::new().iterative_solver_stop_criteria(25);
        let names: Vec<String> = criteria.iter().map(|c| format!("{c:?}")).collect();
        assert!(names[0].starts_with("FailureStopCriterion"));
        assert!(names[1].starts_with("DivergenceStopCriterion"));
        assert!(names[2].starts_with("IterationCountStopCriterion"));
        assert!(names[3].starts_with("ResidualStopCriterion"));
    }

    #[test]
    fn invalid_options_are_rejected() {
        let options = BuilderOptions {
            residual_tolerance: f64::NAN,
            ..Default::default()
        };
        assert!(Builder::<f64>::with_options(options).is_err());
    }
}
