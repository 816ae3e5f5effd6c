//! Arithmetic dispatch for `Matrix<T>`.
//!
//! Every entry point validates shapes first, then takes the identity
//! shortcuts, and only then reaches a storage kernel. Methods taking `&self`,
//! `&other` and `&mut result` cannot alias by construction; the
//! `*_operands` forms accept [`Operand::Target`] for "the result itself" and
//! route such calls through a temporary.

use crate::core::scalar::{RealScalar, Scalar};
use crate::core::traits::MatrixStorageOps;
use crate::error::{LinalgError, Result, Shape};
use crate::matrix::Matrix;
use crate::storage::kernels::{self, Op};
use crate::storage::{StorageKind, VectorStorage, Zeros};
use crate::utils::checks;
use crate::utils::pointwise::pointwise_family;
use crate::vector::{Vector, VectorOperand, modulus_of, real_only, remainder_of};

/// A matrix argument that may be the result buffer itself.
#[derive(Debug, Clone, Copy)]
pub enum Operand<'a, T> {
    Other(&'a Matrix<T>),
    Target,
}

impl<'a, T> Operand<'a, T> {
    fn resolve(self, target: &'a Matrix<T>) -> &'a Matrix<T> {
        match self {
            Operand::Other(m) => m,
            Operand::Target => target,
        }
    }
}

impl<T: Scalar> Matrix<T> {
    // Pointwise helpers.

    /// New matrix with `f` applied to every element.
    pub fn pointwise_unary(&self, f: impl Fn(T) -> T) -> Matrix<T> {
        Matrix::from_storage(kernels::mapped(&self.storage, f))
    }

    /// result ← f(self). Fails if `result`'s representation cannot hold the output.
    pub fn pointwise_unary_into(&self, f: impl Fn(T) -> T, result: &mut Matrix<T>) -> Result<()> {
        checks::same_shape("result", self.shape(), result.shape())?;
        kernels::map(&self.storage, f, &mut result.storage)
    }

    pub fn pointwise_binary(&self, other: &Matrix<T>, f: impl Fn(T, T) -> T) -> Result<Matrix<T>> {
        checks::same_shape("other", self.shape(), other.shape())?;
        Ok(Matrix::from_storage(kernels::zipped(&self.storage, &other.storage, f)))
    }

    pub fn pointwise_binary_into(
        &self,
        other: &Matrix<T>,
        f: impl Fn(T, T) -> T,
        result: &mut Matrix<T>,
    ) -> Result<()> {
        checks::same_shape("other", self.shape(), other.shape())?;
        checks::same_shape("result", self.shape(), result.shape())?;
        kernels::zip_map(&self.storage, &other.storage, f, &mut result.storage)
    }

    /// result ← f(a, b) where either argument may be `result` itself.
    pub fn pointwise_binary_operands(
        a: Operand<'_, T>,
        b: Operand<'_, T>,
        f: impl Fn(T, T) -> T,
        result: &mut Matrix<T>,
    ) -> Result<()> {
        {
            let target = &*result;
            let (a, b) = (a.resolve(target), b.resolve(target));
            checks::same_shape("other", a.shape(), b.shape())?;
            checks::same_shape("result", a.shape(), target.shape())?;
        }
        match (a, b) {
            (Operand::Other(a), Operand::Other(b)) => kernels::zip_map(&a.storage, &b.storage, f, &mut result.storage),
            _ => {
                log::trace!("operand aliases the result matrix; computing into a temporary");
                let temp = {
                    let target = &*result;
                    kernels::zipped(&a.resolve(target).storage, &b.resolve(target).storage, f)
                };
                result.storage.copy_from(&temp)
            }
        }
    }

    pub fn map(&self, f: impl Fn(T) -> T) -> Matrix<T> {
        self.pointwise_unary(f)
    }

    /// Apply `f` in place. Fails, leaving the matrix unchanged, when the
    /// representation cannot hold the output.
    pub fn map_inplace(&mut self, f: impl Fn(T) -> T, zeros: Zeros) -> Result<()> {
        self.storage.map_inplace(f, zeros)
    }

    // Scalar arithmetic.

    pub fn add_scalar(&self, scalar: T) -> Matrix<T> {
        if scalar == T::zero() {
            return self.clone();
        }
        self.pointwise_unary(|x| x + scalar)
    }

    pub fn add_scalar_into(&self, scalar: T, result: &mut Matrix<T>) -> Result<()> {
        if scalar == T::zero() {
            return self.copy_to(result);
        }
        self.pointwise_unary_into(|x| x + scalar, result)
    }

    pub fn subtract_scalar(&self, scalar: T) -> Matrix<T> {
        if scalar == T::zero() {
            return self.clone();
        }
        self.pointwise_unary(|x| x - scalar)
    }

    pub fn subtract_scalar_into(&self, scalar: T, result: &mut Matrix<T>) -> Result<()> {
        if scalar == T::zero() {
            return self.copy_to(result);
        }
        self.pointwise_unary_into(|x| x - scalar, result)
    }

    /// `scalar - self`, element by element.
    pub fn subtract_from(&self, scalar: T) -> Matrix<T> {
        self.pointwise_unary(|x| scalar - x)
    }

    pub fn multiply_scalar(&self, scalar: T) -> Matrix<T> {
        if scalar == T::one() {
            return self.clone();
        }
        if scalar == T::zero() {
            return Matrix::zeros(self.kind(), self.row_count(), self.column_count());
        }
        self.pointwise_unary(|x| x * scalar)
    }

    pub fn multiply_scalar_into(&self, scalar: T, result: &mut Matrix<T>) -> Result<()> {
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

    pub fn divide_scalar(&self, scalar: T) -> Result<Matrix<T>> {
        if scalar == T::zero() {
            return Err(LinalgError::DivideByZero);
        }
        if scalar == T::one() {
            return Ok(self.clone());
        }
        Ok(self.pointwise_unary(|x| x / scalar))
    }

    pub fn divide_scalar_into(&self, scalar: T, result: &mut Matrix<T>) -> Result<()> {
        if scalar == T::zero() {
            return Err(LinalgError::DivideByZero);
        }
        if scalar == T::one() {
            return self.copy_to(result);
        }
        self.pointwise_unary_into(|x| x / scalar, result)
    }

    /// `scalar / self`, element by element.
    pub fn divide_by(&self, scalar: T) -> Matrix<T> {
        self.pointwise_unary(|x| scalar / x)
    }

    pub fn modulus(&self, divisor: T) -> Result<Matrix<T>> {
        real_only::<T>("modulus")?;
        Ok(self.pointwise_unary(|x| modulus_of(x, divisor)))
    }

    pub fn modulus_by(&self, dividend: T) -> Result<Matrix<T>> {
        real_only::<T>("modulus")?;
        Ok(self.pointwise_unary(|x| modulus_of(dividend, x)))
    }

    pub fn remainder(&self, divisor: T) -> Result<Matrix<T>> {
        real_only::<T>("remainder")?;
        Ok(self.pointwise_unary(|x| remainder_of(x, divisor)))
    }

    pub fn remainder_by(&self, dividend: T) -> Result<Matrix<T>> {
        real_only::<T>("remainder")?;
        Ok(self.pointwise_unary(|x| remainder_of(dividend, x)))
    }

    pub fn negate(&self) -> Matrix<T> {
        self.pointwise_unary(|x| -x)
    }

    pub fn negate_into(&self, result: &mut Matrix<T>) -> Result<()> {
        self.pointwise_unary_into(|x| -x, result)
    }

    pub fn conjugate(&self) -> Matrix<T> {
        if !T::ELEMENT_TYPE.is_complex() {
            return self.clone();
        }
        self.pointwise_unary(|x| x.conjugate())
    }

    /// Copy every element into `target`, keeping the target's representation.
    pub fn copy_to(&self, target: &mut Matrix<T>) -> Result<()> {
        checks::same_shape("target", self.shape(), target.shape())?;
        target.storage.copy_from(&self.storage)
    }

    // Element-wise matrix arithmetic.

    pub fn add(&self, other: &Matrix<T>) -> Result<Matrix<T>> {
        self.pointwise_binary(other, |x, y| x + y)
    }

    pub fn add_into(&self, other: &Matrix<T>, result: &mut Matrix<T>) -> Result<()> {
        self.pointwise_binary_into(other, |x, y| x + y, result)
    }

    pub fn add_assign(&mut self, other: &Matrix<T>) -> Result<()> {
        Matrix::pointwise_binary_operands(Operand::Target, Operand::Other(other), |x, y| x + y, self)
    }

    pub fn subtract(&self, other: &Matrix<T>) -> Result<Matrix<T>> {
        self.pointwise_binary(other, |x, y| x - y)
    }

    pub fn subtract_into(&self, other: &Matrix<T>, result: &mut Matrix<T>) -> Result<()> {
        self.pointwise_binary_into(other, |x, y| x - y, result)
    }

    pub fn subtract_assign(&mut self, other: &Matrix<T>) -> Result<()> {
        Matrix::pointwise_binary_operands(Operand::Target, Operand::Other(other), |x, y| x - y, self)
    }

    pub fn pointwise_multiply(&self, other: &Matrix<T>) -> Result<Matrix<T>> {
        self.pointwise_binary(other, |x, y| x * y)
    }

    pub fn pointwise_multiply_into(&self, other: &Matrix<T>, result: &mut Matrix<T>) -> Result<()> {
        self.pointwise_binary_into(other, |x, y| x * y, result)
    }

    pub fn pointwise_divide(&self, other: &Matrix<T>) -> Result<Matrix<T>> {
        self.pointwise_binary(other, |x, y| x / y)
    }

    pub fn pointwise_divide_into(&self, other: &Matrix<T>, result: &mut Matrix<T>) -> Result<()> {
        self.pointwise_binary_into(other, |x, y| x / y, result)
    }

    pub fn pointwise_power(&self, exponents: &Matrix<T>) -> Result<Matrix<T>> {
        self.pointwise_binary(exponents, |x, y| x.pow(y))
    }

    pub fn pointwise_power_scalar(&self, exponent: T) -> Matrix<T> {
        self.pointwise_unary(|x| x.pow(exponent))
    }

    pub fn pointwise_modulus(&self, divisors: &Matrix<T>) -> Result<Matrix<T>> {
        real_only::<T>("modulus")?;
        self.pointwise_binary(divisors, modulus_of)
    }

    pub fn pointwise_remainder(&self, divisors: &Matrix<T>) -> Result<Matrix<T>> {
        real_only::<T>("remainder")?;
        self.pointwise_binary(divisors, remainder_of)
    }

    /// Element-wise `min(|a|, |b|)`.
    pub fn pointwise_absolute_minimum(&self, other: &Matrix<T>) -> Result<Matrix<T>> {
        self.pointwise_binary(other, |x, y| T::from_real(x.magnitude().min(y.magnitude())))
    }

    /// Element-wise `max(|a|, |b|)`.
    pub fn pointwise_absolute_maximum(&self, other: &Matrix<T>) -> Result<Matrix<T>> {
        self.pointwise_binary(other, |x, y| T::from_real(x.magnitude().max(y.magnitude())))
    }

    pub fn pointwise_absolute_minimum_scalar(&self, scalar: T) -> Matrix<T> {
        let s = scalar.magnitude();
        self.pointwise_unary(|x| T::from_real(x.magnitude().min(s)))
    }

    pub fn pointwise_absolute_maximum_scalar(&self, scalar: T) -> Matrix<T> {
        let s = scalar.magnitude();
        self.pointwise_unary(|x| T::from_real(x.magnitude().max(s)))
    }

    pointwise_family!();

    // Products.

    /// result ← op_a(a) · op_b(b), where either operand may be `result` itself.
    pub fn multiply_operands(
        a: Operand<'_, T>,
        op_a: Op,
        b: Operand<'_, T>,
        op_b: Op,
        result: &mut Matrix<T>,
    ) -> Result<()> {
        {
            let target = &*result;
            let left = op_a.shape(&a.resolve(target).storage);
            let right = op_b.shape(&b.resolve(target).storage);
            checks::conformable("other", left, right)?;
            checks::same_shape("result", Shape::matrix(left.0, right.1), target.shape())?;
        }
        match (a, b) {
            (Operand::Other(a), Operand::Other(b)) => {
                kernels::multiply(&a.storage, op_a, &b.storage, op_b, &mut result.storage)
            }
            _ => {
                log::trace!("operand aliases the result matrix; multiplying into a temporary");
                let temp = {
                    let target = &*result;
                    kernels::product(&a.resolve(target).storage, op_a, &b.resolve(target).storage, op_b)
                };
                result.storage.copy_from(&temp)
            }
        }
    }

    fn product_with(&self, op_a: Op, other: &Matrix<T>, op_b: Op) -> Result<Matrix<T>> {
        checks::conformable("other", op_a.shape(&self.storage), op_b.shape(&other.storage))?;
        Ok(Matrix::from_storage(kernels::product(&self.storage, op_a, &other.storage, op_b)))
    }

    /// self · other
    pub fn multiply(&self, other: &Matrix<T>) -> Result<Matrix<T>> {
        self.product_with(Op::None, other, Op::None)
    }

    pub fn multiply_into(&self, other: &Matrix<T>, result: &mut Matrix<T>) -> Result<()> {
        Matrix::multiply_operands(Operand::Other(self), Op::None, Operand::Other(other), Op::None, result)
    }

    /// self · otherᵀ
    pub fn transpose_and_multiply(&self, other: &Matrix<T>) -> Result<Matrix<T>> {
        self.product_with(Op::None, other, Op::Transpose)
    }

    pub fn transpose_and_multiply_into(&self, other: &Matrix<T>, result: &mut Matrix<T>) -> Result<()> {
        Matrix::multiply_operands(Operand::Other(self), Op::None, Operand::Other(other), Op::Transpose, result)
    }

    /// selfᵀ · other
    pub fn transpose_this_and_multiply(&self, other: &Matrix<T>) -> Result<Matrix<T>> {
        self.product_with(Op::Transpose, other, Op::None)
    }

    pub fn transpose_this_and_multiply_into(&self, other: &Matrix<T>, result: &mut Matrix<T>) -> Result<()> {
        Matrix::multiply_operands(Operand::Other(self), Op::Transpose, Operand::Other(other), Op::None, result)
    }

    /// self · otherᴴ
    pub fn conjugate_transpose_and_multiply(&self, other: &Matrix<T>) -> Result<Matrix<T>> {
        self.product_with(Op::None, other, Op::ConjugateTranspose)
    }

    pub fn conjugate_transpose_and_multiply_into(&self, other: &Matrix<T>, result: &mut Matrix<T>) -> Result<()> {
        Matrix::multiply_operands(
            Operand::Other(self),
            Op::None,
            Operand::Other(other),
            Op::ConjugateTranspose,
            result,
        )
    }

    /// selfᴴ · other
    pub fn conjugate_transpose_this_and_multiply(&self, other: &Matrix<T>) -> Result<Matrix<T>> {
        self.product_with(Op::ConjugateTranspose, other, Op::None)
    }

    pub fn conjugate_transpose_this_and_multiply_into(
        &self,
        other: &Matrix<T>,
        result: &mut Matrix<T>,
    ) -> Result<()> {
        Matrix::multiply_operands(
            Operand::Other(self),
            Op::ConjugateTranspose,
            Operand::Other(other),
            Op::None,
            result,
        )
    }

    /// self ← self · other
    pub fn multiply_assign(&mut self, other: &Matrix<T>) -> Result<()> {
        Matrix::multiply_operands(Operand::Target, Op::None, Operand::Other(other), Op::None, self)
    }

    /// self ← other · self
    pub fn left_multiply_assign(&mut self, other: &Matrix<T>) -> Result<()> {
        Matrix::multiply_operands(Operand::Other(other), Op::None, Operand::Target, Op::None, self)
    }

    /// self ← self · self
    pub fn square_in_place(&mut self) -> Result<()> {
        Matrix::multiply_operands(Operand::Target, Op::None, Operand::Target, Op::None, self)
    }

    // Matrix–vector products.

    /// result ← op(self) · x, where `x` may be `result` itself.
    pub fn multiply_vector_operands(&self, op: Op, x: VectorOperand<'_, T>, result: &mut Vector<T>) -> Result<()> {
        let (m, n) = op.shape(&self.storage);
        {
            let target = &*result;
            checks::same_shape("vector", Shape::vector(n), x.resolve(target).shape())?;
            checks::same_shape("result", Shape::vector(m), target.shape())?;
        }
        match x {
            VectorOperand::Other(x) => {
                let xs = x.to_vec();
                match result.storage_mut() {
                    VectorStorage::Dense(r) => kernels::mat_vec(&self.storage, op, &xs, r.values_mut()),
                    r => {
                        let mut y = vec![T::zero(); m];
                        kernels::mat_vec(&self.storage, op, &xs, &mut y);
                        r.assign_values(&y);
                    }
                }
            }
            VectorOperand::Target => {
                log::trace!("vector operand aliases the result; multiplying into a temporary");
                let xs = result.to_vec();
                let mut y = vec![T::zero(); m];
                kernels::mat_vec(&self.storage, op, &xs, &mut y);
                result.storage_mut().assign_values(&y);
            }
        }
        Ok(())
    }

    fn mat_vec_new(&self, op: Op, x: &Vector<T>) -> Result<Vector<T>> {
        let (m, _) = op.shape(&self.storage);
        let mut result = Vector::zeros(StorageKind::Dense, m);
        self.multiply_vector_operands(op, VectorOperand::Other(x), &mut result)?;
        Ok(result)
    }

    /// self · x
    pub fn multiply_vector(&self, x: &Vector<T>) -> Result<Vector<T>> {
        self.mat_vec_new(Op::None, x)
    }

    pub fn multiply_vector_into(&self, x: &Vector<T>, result: &mut Vector<T>) -> Result<()> {
        self.multiply_vector_operands(Op::None, VectorOperand::Other(x), result)
    }

    /// x ← self · x
    pub fn multiply_vector_in_place(&self, x: &mut Vector<T>) -> Result<()> {
        self.multiply_vector_operands(Op::None, VectorOperand::Target, x)
    }

    /// selfᵀ · x, which is also xᵀ · self read as a column.
    pub fn transpose_multiply_vector(&self, x: &Vector<T>) -> Result<Vector<T>> {
        self.mat_vec_new(Op::Transpose, x)
    }

    pub fn transpose_multiply_vector_into(&self, x: &Vector<T>, result: &mut Vector<T>) -> Result<()> {
        self.multiply_vector_operands(Op::Transpose, VectorOperand::Other(x), result)
    }

    /// selfᴴ · x
    pub fn conjugate_transpose_multiply_vector(&self, x: &Vector<T>) -> Result<Vector<T>> {
        self.mat_vec_new(Op::ConjugateTranspose, x)
    }

    pub fn conjugate_transpose_multiply_vector_into(&self, x: &Vector<T>, result: &mut Vector<T>) -> Result<()> {
        self.multiply_vector_operands(Op::ConjugateTranspose, VectorOperand::Other(x), result)
    }

    /// xᵀ · self
    pub fn left_multiply_vector(&self, x: &Vector<T>) -> Result<Vector<T>> {
        self.transpose_multiply_vector(x)
    }

    // Power and Kronecker product.

    /// self^exponent by repeated squaring.
    pub fn power(&self, exponent: i32) -> Result<Matrix<T>> {
        checks::square("self", self.row_count(), self.column_count())?;
        if exponent < 0 {
            return Err(LinalgError::invalid(
                "exponent",
                format!("must be non-negative, got {exponent}"),
            ));
        }
        let n = self.row_count();
        match exponent {
            0 => return Ok(Matrix::identity(self.kind(), n)),
            1 => return Ok(self.clone()),
            2 => return self.multiply(self),
            _ => {}
        }

        let mut acc: Option<Matrix<T>> = None;
        let mut base = self.clone();
        let mut scratch = Matrix::zeros(self.kind(), n, n);
        let mut e = exponent as u32;
        loop {
            if e & 1 == 1 {
                acc = Some(match acc {
                    None => base.clone(),
                    Some(current) => {
                        current.multiply_into(&base, &mut scratch)?;
                        std::mem::replace(&mut scratch, current)
                    }
                });
            }
            e >>= 1;
            if e == 0 {
                break;
            }
            base.multiply_into(&base, &mut scratch)?;
            std::mem::swap(&mut base, &mut scratch);
        }
        Ok(acc.unwrap_or(base))
    }

    /// self ⊗ other: block `(i, j)` of the result is `self[i, j] · other`.
    pub fn kronecker_product(&self, other: &Matrix<T>) -> Result<Matrix<T>> {
        let (m, n) = (self.row_count(), self.column_count());
        let (p, q) = (other.row_count(), other.column_count());
        let kind = if self.is_dense() || other.is_dense() {
            StorageKind::Dense
        } else {
            StorageKind::Sparse
        };
        let mut result = Matrix::zeros(kind, m * p, n * q);
        if p == 0 || q == 0 {
            return Ok(result);
        }
        for j in 0..n {
            for i in 0..m {
                let block = other.multiply_scalar(self.storage.at(i, j));
                result.set_sub_matrix(i * p, j * q, &block)?;
            }
        }
        Ok(result)
    }
}

impl<T: RealScalar> Matrix<T> {
    pub fn pointwise_minimum(&self, other: &Matrix<T>) -> Result<Matrix<T>> {
        self.pointwise_binary(other, |x, y| x.min(y))
    }

    pub fn pointwise_maximum(&self, other: &Matrix<T>) -> Result<Matrix<T>> {
        self.pointwise_binary(other, |x, y| x.max(y))
    }

    pub fn pointwise_minimum_scalar(&self, scalar: T) -> Matrix<T> {
        self.pointwise_unary(|x| x.min(scalar))
    }

    pub fn pointwise_maximum_scalar(&self, scalar: T) -> Matrix<T> {
        self.pointwise_unary(|x| x.max(scalar))
    }

    /// Element-wise `atan2(self, other)`.
    pub fn pointwise_atan2(&self, other: &Matrix<T>) -> Result<Matrix<T>> {
        self.pointwise_binary(other, |y, x| y.atan2(x))
    }
}
