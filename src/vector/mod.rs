//! `Vector<T>`: a shape-checked handle over dense or sparse vector storage.
//!
//! Arithmetic funnels through a small set of helpers that validate lengths,
//! take the identity shortcuts (adding zero, scaling by one) and only then
//! call into the storage kernels.

use std::hash::{Hash, Hasher};

use num_traits::{One, Zero};

use crate::core::scalar::{RealScalar, Scalar, nan_max};
use crate::core::traits::VectorStorageOps;
use crate::error::{LinalgError, Result, Shape};
use crate::matrix::Matrix;
use crate::storage::kernels;
use crate::storage::{
    DenseColumnMajorStorage, DenseVectorStorage, MatrixStorage, SparseCompressedRowStorage, StorageKind,
    VectorStorage, Zeros,
};
use crate::utils::checks;
use crate::utils::pointwise::pointwise_family;

#[derive(Debug, Clone)]
pub struct Vector<T> {
    storage: VectorStorage<T>,
}

/// A vector argument that may be the result buffer itself.
///
/// `Target` stands for "the vector being written"; the dispatch then computes
/// into a temporary and copies the answer into place afterwards.
#[derive(Debug, Clone, Copy)]
pub enum VectorOperand<'a, T> {
    Other(&'a Vector<T>),
    Target,
}

impl<'a, T> VectorOperand<'a, T> {
    pub(crate) fn resolve(self, target: &'a Vector<T>) -> &'a Vector<T> {
        match self {
            VectorOperand::Other(v) => v,
            VectorOperand::Target => target,
        }
    }
}

impl<T: Scalar> Vector<T> {
    /// Wrap a storage without copying it.
    pub fn from_storage(storage: VectorStorage<T>) -> Self {
        Self { storage }
    }

    pub(crate) fn zeros(kind: StorageKind, length: usize) -> Self {
        Self::from_storage(VectorStorage::zeros(kind, length))
    }

    pub(crate) fn dense_from_vec(values: Vec<T>) -> Self {
        Self::from_storage(VectorStorage::Dense(DenseVectorStorage::from_vec(values)))
    }

    pub fn storage(&self) -> &VectorStorage<T> {
        &self.storage
    }

    pub fn into_storage(self) -> VectorStorage<T> {
        self.storage
    }

    pub(crate) fn storage_mut(&mut self) -> &mut VectorStorage<T> {
        &mut self.storage
    }

    /// Number of elements.
    pub fn count(&self) -> usize {
        self.storage.length()
    }

    pub fn shape(&self) -> Shape {
        Shape::vector(self.count())
    }

    pub fn kind(&self) -> StorageKind {
        self.storage.kind()
    }

    pub fn is_dense(&self) -> bool {
        self.storage.is_dense()
    }

    pub fn at(&self, index: usize) -> Result<T> {
        checks::index(index, self.count())?;
        Ok(self.storage.at(index))
    }

    pub fn set(&mut self, index: usize, value: T) -> Result<()> {
        checks::index(index, self.count())?;
        self.storage.set(index, value);
        Ok(())
    }

    pub fn clear(&mut self) {
        self.storage.clear();
    }

    pub fn to_vec(&self) -> Vec<T> {
        self.storage.to_vec()
    }

    /// Stored non-zero elements as `(index, value)` pairs, in index order.
    pub fn enumerate_non_zero(&self) -> impl Iterator<Item = (usize, T)> + '_ {
        self.storage.enumerate_non_zero()
    }

    /// Copy every element into `target`, keeping the target's representation.
    pub fn copy_to(&self, target: &mut Vector<T>) -> Result<()> {
        checks::same_shape("target", self.shape(), target.shape())?;
        target.storage.copy_from(&self.storage);
        Ok(())
    }

    pub fn sub_vector(&self, index: usize, count: usize) -> Result<Vector<T>> {
        checks::range(index, count, self.count())?;
        let storage = match &self.storage {
            VectorStorage::Dense(s) => {
                VectorStorage::Dense(DenseVectorStorage::from_vec(s.values()[index..index + count].to_vec()))
            }
            VectorStorage::Sparse(s) => VectorStorage::Sparse(crate::storage::SparseVectorStorage::from_fn(
                count,
                |i| s.at(index + i),
            )),
        };
        Ok(Self::from_storage(storage))
    }

    pub fn set_sub_vector(&mut self, index: usize, values: &Vector<T>) -> Result<()> {
        checks::range(index, values.count(), self.count())?;
        for i in 0..values.count() {
            self.storage.set(index + i, values.storage.at(i));
        }
        Ok(())
    }

    /// Single-column matrix holding this vector, in the matching representation.
    pub fn to_column_matrix(&self) -> Matrix<T> {
        let n = self.count();
        let storage = match &self.storage {
            VectorStorage::Dense(s) => MatrixStorage::Dense(DenseColumnMajorStorage::from_fn(n, 1, |i, _| s.at(i))),
            VectorStorage::Sparse(s) => MatrixStorage::Sparse(SparseCompressedRowStorage::from_fn(n, 1, |i, _| s.at(i))),
        };
        Matrix::from_storage(storage)
    }

    pub fn to_row_matrix(&self) -> Matrix<T> {
        let n = self.count();
        let storage = match &self.storage {
            VectorStorage::Dense(s) => MatrixStorage::Dense(DenseColumnMajorStorage::from_fn(1, n, |_, j| s.at(j))),
            VectorStorage::Sparse(s) => MatrixStorage::Sparse(SparseCompressedRowStorage::from_fn(1, n, |_, j| s.at(j))),
        };
        Matrix::from_storage(storage)
    }

    // Pointwise helpers: every element-wise operation below goes through one of these.

    /// New vector with `f` applied to every element. The result keeps this
    /// vector's representation when `f(0) == 0` and is dense otherwise.
    pub fn pointwise_unary(&self, f: impl Fn(T) -> T) -> Vector<T> {
        let kind = if f(T::zero()) == T::zero() { self.kind() } else { StorageKind::Dense };
        let mut result = Self::zeros(kind, self.count());
        kernels::vector_map(&self.storage, f, &mut result.storage);
        result
    }

    pub fn pointwise_unary_into(&self, f: impl Fn(T) -> T, result: &mut Vector<T>) -> Result<()> {
        checks::same_shape("result", self.shape(), result.shape())?;
        kernels::vector_map(&self.storage, f, &mut result.storage);
        Ok(())
    }

    pub fn pointwise_binary(&self, other: &Vector<T>, f: impl Fn(T, T) -> T) -> Result<Vector<T>> {
        checks::same_shape("other", self.shape(), other.shape())?;
        let kind = if f(T::zero(), T::zero()) == T::zero() {
            kernels::result_kind(self.kind(), other.kind())
        } else {
            StorageKind::Dense
        };
        let mut result = Self::zeros(kind, self.count());
        kernels::vector_zip_map(&self.storage, &other.storage, f, &mut result.storage);
        Ok(result)
    }

    pub fn pointwise_binary_into(
        &self,
        other: &Vector<T>,
        f: impl Fn(T, T) -> T,
        result: &mut Vector<T>,
    ) -> Result<()> {
        checks::same_shape("other", self.shape(), other.shape())?;
        checks::same_shape("result", self.shape(), result.shape())?;
        kernels::vector_zip_map(&self.storage, &other.storage, f, &mut result.storage);
        Ok(())
    }

    /// result ← f(a, b) where either argument may be `result` itself.
    pub fn pointwise_binary_operands(
        a: VectorOperand<'_, T>,
        b: VectorOperand<'_, T>,
        f: impl Fn(T, T) -> T,
        result: &mut Vector<T>,
    ) -> Result<()> {
        {
            let target = &*result;
            let (a, b) = (a.resolve(target), b.resolve(target));
            checks::same_shape("other", a.shape(), b.shape())?;
            checks::same_shape("result", a.shape(), target.shape())?;
        }
        match (a, b) {
            (VectorOperand::Other(a), VectorOperand::Other(b)) => {
                kernels::vector_zip_map(&a.storage, &b.storage, f, &mut result.storage);
            }
            _ => {
                log::trace!("operand aliases the result vector; computing into a temporary");
                let temp = {
                    let target = &*result;
                    let mut temp = VectorStorage::zeros(target.kind(), target.count());
                    kernels::vector_zip_map(&a.resolve(target).storage, &b.resolve(target).storage, f, &mut temp);
                    temp
                };
                result.storage = temp;
            }
        }
        Ok(())
    }

    pub fn map(&self, f: impl Fn(T) -> T) -> Vector<T> {
        self.pointwise_unary(f)
    }

    pub fn map_inplace(&mut self, f: impl Fn(T) -> T, zeros: Zeros) {
        self.storage.map_inplace(f, zeros);
    }

    // Scalar arithmetic.

    pub fn add_scalar(&self, scalar: T) -> Vector<T> {
        if scalar == T::zero() {
            return self.clone();
        }
        self.pointwise_unary(|x| x + scalar)
    }

    pub fn add_scalar_into(&self, scalar: T, result: &mut Vector<T>) -> Result<()> {
        if scalar == T::zero() {
            return self.copy_to(result);
        }
        self.pointwise_unary_into(|x| x + scalar, result)
    }

    pub fn subtract_scalar(&self, scalar: T) -> Vector<T> {
        if scalar == T::zero() {
            return self.clone();
        }
        self.pointwise_unary(|x| x - scalar)
    }

    pub fn subtract_scalar_into(&self, scalar: T, result: &mut Vector<T>) -> Result<()> {
        if scalar == T::zero() {
            return self.copy_to(result);
        }
        self.pointwise_unary_into(|x| x - scalar, result)
    }

    /// `scalar - self`, element by element.
    pub fn subtract_from(&self, scalar: T) -> Vector<T> {
        self.pointwise_unary(|x| scalar - x)
    }

    pub fn multiply_scalar(&self, scalar: T) -> Vector<T> {
        if scalar == T::one() {
            return self.clone();
        }
        if scalar == T::zero() {
            return Self::zeros(self.kind(), self.count());
        }
        self.pointwise_unary(|x| x * scalar)
    }

    pub fn multiply_scalar_into(&self, scalar: T, result: &mut Vector<T>) -> Result<()> {
        if scalar == T::one() {
            return self.copy_to(result);
        }
        if scalar == T::zero() {
            checks::same_shape("result", self.shape(), result.shape())?;
            result.clear();
            return Ok(());
        }
        self.pointwise_unary_into(|x| x * scalar, result)
    }

    pub fn divide_scalar(&self, scalar: T) -> Result<Vector<T>> {
        if scalar == T::zero() {
            return Err(LinalgError::DivideByZero);
        }
        if scalar == T::one() {
            return Ok(self.clone());
        }
        Ok(self.pointwise_unary(|x| x / scalar))
    }

    pub fn divide_scalar_into(&self, scalar: T, result: &mut Vector<T>) -> Result<()> {
        if scalar == T::zero() {
            return Err(LinalgError::DivideByZero);
        }
        if scalar == T::one() {
            return self.copy_to(result);
        }
        self.pointwise_unary_into(|x| x / scalar, result)
    }

    /// `scalar / self`, element by element.
    pub fn divide_by(&self, scalar: T) -> Vector<T> {
        self.pointwise_unary(|x| scalar / x)
    }

    /// Euclidean modulus of every element by `divisor`.
    pub fn modulus(&self, divisor: T) -> Result<Vector<T>> {
        real_only::<T>("modulus")?;
        Ok(self.pointwise_unary(|x| modulus_of(x, divisor)))
    }

    /// `dividend mod self`, element by element.
    pub fn modulus_by(&self, dividend: T) -> Result<Vector<T>> {
        real_only::<T>("modulus")?;
        Ok(self.pointwise_unary(|x| modulus_of(dividend, x)))
    }

    pub fn remainder(&self, divisor: T) -> Result<Vector<T>> {
        real_only::<T>("remainder")?;
        Ok(self.pointwise_unary(|x| remainder_of(x, divisor)))
    }

    pub fn remainder_by(&self, dividend: T) -> Result<Vector<T>> {
        real_only::<T>("remainder")?;
        Ok(self.pointwise_unary(|x| remainder_of(dividend, x)))
    }

    pub fn negate(&self) -> Vector<T> {
        self.pointwise_unary(|x| -x)
    }

    pub fn negate_into(&self, result: &mut Vector<T>) -> Result<()> {
        self.pointwise_unary_into(|x| -x, result)
    }

    pub fn conjugate(&self) -> Vector<T> {
        if !T::ELEMENT_TYPE.is_complex() {
            return self.clone();
        }
        self.pointwise_unary(|x| x.conjugate())
    }

    // Vector arithmetic.

    pub fn add(&self, other: &Vector<T>) -> Result<Vector<T>> {
        self.pointwise_binary(other, |x, y| x + y)
    }

    pub fn add_into(&self, other: &Vector<T>, result: &mut Vector<T>) -> Result<()> {
        self.pointwise_binary_into(other, |x, y| x + y, result)
    }

    pub fn subtract(&self, other: &Vector<T>) -> Result<Vector<T>> {
        self.pointwise_binary(other, |x, y| x - y)
    }

    pub fn subtract_into(&self, other: &Vector<T>, result: &mut Vector<T>) -> Result<()> {
        self.pointwise_binary_into(other, |x, y| x - y, result)
    }

    /// self ← self + scale · other
    pub fn add_scaled(&mut self, scale: T, other: &Vector<T>) -> Result<()> {
        checks::same_shape("other", self.shape(), other.shape())?;
        if scale == T::zero() {
            return Ok(());
        }
        match (&mut self.storage, &other.storage) {
            (VectorStorage::Dense(a), VectorStorage::Dense(b)) => {
                for (x, &y) in a.values_mut().iter_mut().zip(b.values()) {
                    *x += scale * y;
                }
            }
            (storage, other) => {
                let mut values = storage.to_vec();
                for (i, y) in other.enumerate_non_zero() {
                    values[i] += scale * y;
                }
                storage.assign_values(&values);
            }
        }
        Ok(())
    }

    pub fn add_assign(&mut self, other: &Vector<T>) -> Result<()> {
        self.add_scaled(T::one(), other)
    }

    pub fn subtract_assign(&mut self, other: &Vector<T>) -> Result<()> {
        self.add_scaled(-T::one(), other)
    }

    /// self ← scalar · self
    pub fn scale_in_place(&mut self, scalar: T) {
        if scalar == T::one() {
            return;
        }
        self.storage.map_inplace(|x| x * scalar, Zeros::AllowSkip);
    }

    pub fn pointwise_multiply(&self, other: &Vector<T>) -> Result<Vector<T>> {
        self.pointwise_binary(other, |x, y| x * y)
    }

    pub fn pointwise_multiply_into(&self, other: &Vector<T>, result: &mut Vector<T>) -> Result<()> {
        self.pointwise_binary_into(other, |x, y| x * y, result)
    }

    pub fn pointwise_divide(&self, other: &Vector<T>) -> Result<Vector<T>> {
        self.pointwise_binary(other, |x, y| x / y)
    }

    pub fn pointwise_divide_into(&self, other: &Vector<T>, result: &mut Vector<T>) -> Result<()> {
        self.pointwise_binary_into(other, |x, y| x / y, result)
    }

    pub fn pointwise_power(&self, exponents: &Vector<T>) -> Result<Vector<T>> {
        self.pointwise_binary(exponents, |x, y| x.pow(y))
    }

    pub fn pointwise_power_scalar(&self, exponent: T) -> Vector<T> {
        self.pointwise_unary(|x| x.pow(exponent))
    }

    pub fn pointwise_modulus(&self, divisors: &Vector<T>) -> Result<Vector<T>> {
        real_only::<T>("modulus")?;
        self.pointwise_binary(divisors, modulus_of)
    }

    pub fn pointwise_remainder(&self, divisors: &Vector<T>) -> Result<Vector<T>> {
        real_only::<T>("remainder")?;
        self.pointwise_binary(divisors, remainder_of)
    }

    /// Element-wise `min(|a|, |b|)`.
    pub fn pointwise_absolute_minimum(&self, other: &Vector<T>) -> Result<Vector<T>> {
        self.pointwise_binary(other, |x, y| T::from_real(x.magnitude().min(y.magnitude())))
    }

    /// Element-wise `max(|a|, |b|)`.
    pub fn pointwise_absolute_maximum(&self, other: &Vector<T>) -> Result<Vector<T>> {
        self.pointwise_binary(other, |x, y| T::from_real(x.magnitude().max(y.magnitude())))
    }

    pub fn pointwise_absolute_minimum_scalar(&self, scalar: T) -> Vector<T> {
        let s = scalar.magnitude();
        self.pointwise_unary(|x| T::from_real(x.magnitude().min(s)))
    }

    pub fn pointwise_absolute_maximum_scalar(&self, scalar: T) -> Vector<T> {
        let s = scalar.magnitude();
        self.pointwise_unary(|x| T::from_real(x.magnitude().max(s)))
    }

    pointwise_family!();

    // Reductions.

    pub fn dot_product(&self, other: &Vector<T>) -> Result<T> {
        checks::same_shape("other", self.shape(), other.shape())?;
        Ok(kernels::dot(&self.storage, &other.storage, false))
    }

    /// Σ conj(selfᵢ) · otherᵢ
    pub fn conjugate_dot_product(&self, other: &Vector<T>) -> Result<T> {
        checks::same_shape("other", self.shape(), other.shape())?;
        Ok(kernels::dot(&self.storage, &other.storage, true))
    }

    /// Dense `self · otherᵀ`.
    pub fn outer_product(&self, other: &Vector<T>) -> Matrix<T> {
        let a = self.to_vec();
        let b = other.to_vec();
        Matrix::from_storage(MatrixStorage::Dense(DenseColumnMajorStorage::from_fn(a.len(), b.len(), |i, j| {
            a[i] * b[j]
        })))
    }

    pub fn sum(&self) -> T {
        self.storage.enumerate_non_zero().map(|(_, v)| v).sum()
    }

    pub fn l1_norm(&self) -> T::Real {
        self.storage.enumerate_non_zero().map(|(_, v)| v.magnitude()).sum()
    }

    pub fn l2_norm(&self) -> T::Real {
        let sum: T::Real = self.storage.enumerate_non_zero().map(|(_, v)| v.magnitude_squared()).sum();
        sum.sqrt()
    }

    pub fn infinity_norm(&self) -> T::Real {
        self.absolute_maximum()
    }

    /// The p-norm for `p >= 1`; `f64::INFINITY` selects the infinity norm.
    pub fn norm(&self, p: f64) -> Result<T::Real> {
        if p.is_nan() || p < 1.0 {
            return Err(LinalgError::invalid("p", format!("norm order must be at least 1, got {p}")));
        }
        Ok(if p == 1.0 {
            self.l1_norm()
        } else if p == 2.0 {
            self.l2_norm()
        } else if p.is_infinite() {
            self.infinity_norm()
        } else {
            let exponent = T::Real::from_f64(p);
            let sum: T::Real = self
                .storage
                .enumerate_non_zero()
                .map(|(_, v)| v.magnitude().pow(exponent))
                .sum();
            sum.pow(T::Real::one() / exponent)
        })
    }

    /// This vector scaled to unit p-norm.
    pub fn normalize(&self, p: f64) -> Result<Vector<T>> {
        let norm = self.norm(p)?;
        if norm == T::Real::zero() {
            return Err(LinalgError::DivideByZero);
        }
        self.divide_scalar(T::from_real(norm))
    }

    pub fn absolute_minimum(&self) -> T::Real {
        self.absolute_minimum_index()
            .map_or(T::Real::zero(), |i| self.storage.at(i).magnitude())
    }

    pub fn absolute_minimum_index(&self) -> Option<usize> {
        let values = self.to_vec();
        let mut best: Option<(usize, T::Real)> = None;
        for (i, v) in values.into_iter().enumerate() {
            let m = v.magnitude();
            if best.is_none_or(|(_, b)| m < b) {
                best = Some((i, m));
            }
        }
        best.map(|(i, _)| i)
    }

    pub fn absolute_maximum(&self) -> T::Real {
        self.storage
            .enumerate_non_zero()
            .map(|(_, v)| v.magnitude())
            .fold(T::Real::zero(), nan_max)
    }

    pub fn absolute_maximum_index(&self) -> Option<usize> {
        let mut best: Option<(usize, T::Real)> = None;
        for i in 0..self.count() {
            let m = self.storage.at(i).magnitude();
            if best.is_none_or(|(_, b)| m > b) {
                best = Some((i, m));
            }
        }
        best.map(|(i, _)| i)
    }
}

impl<T: RealScalar> Vector<T> {
    pub fn minimum(&self) -> Option<T> {
        self.minimum_index().map(|i| self.storage.at(i))
    }

    pub fn minimum_index(&self) -> Option<usize> {
        let values = self.to_vec();
        (0..values.len()).reduce(|best, i| if values[i] < values[best] { i } else { best })
    }

    pub fn maximum(&self) -> Option<T> {
        self.maximum_index().map(|i| self.storage.at(i))
    }

    pub fn maximum_index(&self) -> Option<usize> {
        let values = self.to_vec();
        (0..values.len()).reduce(|best, i| if values[i] > values[best] { i } else { best })
    }

    pub fn pointwise_minimum(&self, other: &Vector<T>) -> Result<Vector<T>> {
        self.pointwise_binary(other, |x, y| x.min(y))
    }

    pub fn pointwise_maximum(&self, other: &Vector<T>) -> Result<Vector<T>> {
        self.pointwise_binary(other, |x, y| x.max(y))
    }

    pub fn pointwise_minimum_scalar(&self, scalar: T) -> Vector<T> {
        self.pointwise_unary(|x| x.min(scalar))
    }

    pub fn pointwise_maximum_scalar(&self, scalar: T) -> Vector<T> {
        self.pointwise_unary(|x| x.max(scalar))
    }
}

pub(crate) fn real_only<T: Scalar>(operation: &str) -> Result<()> {
    if T::ELEMENT_TYPE.is_complex() {
        Err(LinalgError::unsupported(format!("{operation} of {} elements", T::ELEMENT_TYPE)))
    } else {
        Ok(())
    }
}

// Complex element types are rejected by `real_only` before these run.
pub(crate) fn modulus_of<T: Scalar>(x: T, divisor: T) -> T {
    x.modulus(divisor).unwrap_or_else(|_| T::zero())
}

pub(crate) fn remainder_of<T: Scalar>(x: T, divisor: T) -> T {
    x.remainder(divisor).unwrap_or_else(|_| T::zero())
}

impl<T: Scalar> PartialEq for Vector<T> {
    fn eq(&self, other: &Self) -> bool {
        self.storage == other.storage
    }
}

impl<T: Scalar> Hash for Vector<T> {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.count().hash(state);
        let n = self.count().min(25);
        for i in 0..n {
            self.storage.at(i).hash_value(state);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::SparseVectorStorage;
    use approx::assert_abs_diff_eq;
    use num_complex::Complex;

    fn dense(values: &[f64]) -> Vector<f64> {
        Vector::dense_from_vec(values.to_vec())
    }

    fn sparse(length: usize, entries: &[(usize, f64)]) -> Vector<f64> {
        Vector::from_storage(VectorStorage::Sparse(
            SparseVectorStorage::from_indexed(length, entries.iter().copied()).unwrap(),
        ))
    }

    #[test]
    fn add_zero_skips_the_kernel() {
        let v = dense(&[1.0, 2.0]);
        let before = kernels::kernel_calls();
        let w = v.add_scalar(0.0);
        let u = v.multiply_scalar(1.0);
        assert_eq!(kernels::kernel_calls(), before);
        assert_eq!(w, v);
        assert_eq!(u, v);
    }

    #[test]
    fn multiply_by_zero_keeps_representation() {
        let v = sparse(4, &[(1, 2.0)]);
        let z = v.multiply_scalar(0.0);
        assert_eq!(z.kind(), StorageKind::Sparse);
        assert_eq!(z.to_vec(), vec![0.0; 4]);
    }

    #[test]
    fn divide_by_zero_is_an_error() {
        assert_eq!(dense(&[1.0]).divide_scalar(0.0), Err(LinalgError::DivideByZero));
    }

    #[test]
    fn length_mismatch_names_both_lengths() {
        let err = dense(&[1.0, 2.0]).add(&dense(&[1.0, 2.0, 3.0])).unwrap_err();
        let msg = err.to_string();
        assert!(msg.contains('2') && msg.contains('3'), "{msg}");
    }

    #[test]
    fn adding_a_scalar_to_sparse_becomes_dense() {
        let v = sparse(3, &[(0, 1.0)]);
        let w = v.add_scalar(1.0);
        assert_eq!(w.kind(), StorageKind::Dense);
        assert_eq!(w.to_vec(), vec![2.0, 1.0, 1.0]);
    }

    #[test]
    fn aliased_operands_use_a_temporary() {
        let mut v = dense(&[1.0, 2.0, 3.0]);
        let w = dense(&[1.0, 1.0, 1.0]);
        Vector::pointwise_binary_operands(VectorOperand::Target, VectorOperand::Other(&w), |x, y| x * 2.0 + y, &mut v)
            .unwrap();
        assert_eq!(v.to_vec(), vec![3.0, 5.0, 7.0]);
        Vector::pointwise_binary_operands(VectorOperand::Target, VectorOperand::Target, |x, y| x * y, &mut v).unwrap();
        assert_eq!(v.to_vec(), vec![9.0, 25.0, 49.0]);
    }

    #[test]
    fn norms_and_extrema() {
        let v = dense(&[3.0, -4.0, 0.0]);
        assert_abs_diff_eq!(v.l1_norm(), 7.0);
        assert_abs_diff_eq!(v.l2_norm(), 5.0);
        assert_abs_diff_eq!(v.infinity_norm(), 4.0);
        assert_abs_diff_eq!(v.norm(3.0).unwrap(), 91f64.powf(1.0 / 3.0), epsilon = 1e-12);
        assert_eq!(v.absolute_maximum_index(), Some(1));
        assert_eq!(v.absolute_minimum_index(), Some(2));
        assert_eq!(v.minimum(), Some(-4.0));
        assert!(v.norm(0.5).is_err());
    }

    #[test]
    fn norms_propagate_nan() {
        for v in [dense(&[f64::NAN, 1.0]), dense(&[1.0, f64::NAN]), dense(&[5.0, f64::NAN, 2.0])] {
            assert!(v.infinity_norm().is_nan());
            assert!(v.absolute_maximum().is_nan());
            assert!(v.l1_norm().is_nan());
            assert!(v.l2_norm().is_nan());
            assert!(v.norm(3.0).unwrap().is_nan());
        }
    }

    #[test]
    fn conjugate_dot_product_conjugates_left() {
        let a = Vector::dense_from_vec(vec![Complex::new(0.0, 1.0)]);
        assert_eq!(a.dot_product(&a).unwrap(), Complex::new(-1.0, 0.0));
        assert_eq!(a.conjugate_dot_product(&a).unwrap(), Complex::new(1.0, 0.0));
    }

    #[test]
    fn complex_modulus_is_unsupported() {
        let a = Vector::dense_from_vec(vec![Complex::new(1.0f32, 1.0)]);
        assert!(matches!(a.modulus(Complex::new(2.0, 0.0)), Err(LinalgError::Unsupported(_))));
    }

    #[test]
    fn sub_vector_round_trip() {
        let mut v = dense(&[1.0, 2.0, 3.0, 4.0]);
        let s = v.sub_vector(1, 2).unwrap();
        assert_eq!(s.to_vec(), vec![2.0, 3.0]);
        v.set_sub_vector(2, &s).unwrap();
        assert_eq!(v.to_vec(), vec![1.0, 2.0, 2.0, 3.0]);
        assert!(v.sub_vector(3, 2).is_err());
    }

    #[test]
    fn outer_product_shape() {
        let m = dense(&[1.0, 2.0]).outer_product(&dense(&[3.0, 4.0, 5.0]));
        assert_eq!((m.row_count(), m.column_count()), (2, 3));
        assert_eq!(m.at(1, 2).unwrap(), 10.0);
    }
}
