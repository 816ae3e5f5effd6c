//! Householder QR factorization for matrices with at least as many rows as columns.

use faer::linalg::solvers::Qr as QrFactor;
use num_traits::One;

use crate::core::scalar::Scalar;
use crate::error::{LinalgError, Result};
use crate::factorization::{Solve, diagonal, from_field, solve_lstsq_with, to_field};
use crate::matrix::Matrix;

/// Which factors to keep.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum QrMethod {
    /// `Q` is `m × m` and `R` is `m × n`.
    #[default]
    Full,
    /// `Q` is `m × n` and `R` is `n × n`.
    Thin,
}

#[derive(Debug, Clone)]
pub struct Qr<T: Scalar> {
    factor: QrFactor<T::Field>,
    /// Diagonal of `R`.
    pivots: Vec<T>,
    rows: usize,
    columns: usize,
    method: QrMethod,
}

impl<T: Scalar> Qr<T> {
    pub fn new(a: &Matrix<T>, method: QrMethod) -> Result<Self> {
        let (m, n) = (a.row_count(), a.column_count());
        if m < n {
            return Err(LinalgError::invalid(
                "matrix",
                format!("QR needs at least as many rows as columns, got {m}x{n}"),
            ));
        }
        let factor = QrFactor::<T::Field>::new(to_field(a).as_ref());
        let pivots = diagonal::<T>(factor.R());
        Ok(Self {
            factor,
            pivots,
            rows: m,
            columns: n,
            method,
        })
    }

    pub fn method(&self) -> QrMethod {
        self.method
    }

    /// Orthonormal factor; `m × m` for [`QrMethod::Full`], `m × n` for [`QrMethod::Thin`].
    pub fn q(&self) -> Result<Matrix<T>> {
        match self.method {
            QrMethod::Full => from_field(self.factor.compute_Q().as_ref()),
            QrMethod::Thin => from_field(self.factor.compute_thin_Q().as_ref()),
        }
    }

    /// Upper triangular factor; `m × n` for [`QrMethod::Full`], `n × n` for [`QrMethod::Thin`].
    pub fn r(&self) -> Result<Matrix<T>> {
        match self.method {
            QrMethod::Full => from_field(self.factor.R()),
            QrMethod::Thin => from_field(self.factor.thin_R()),
        }
    }

    /// Whether no diagonal entry of `R` is zero.
    pub fn is_full_rank(&self) -> bool {
        self.pivots.iter().all(|r| *r != T::zero())
    }

    /// Absolute determinant of a square matrix, `|det R|`.
    pub fn absolute_determinant(&self) -> Result<T::Real> {
        if self.rows != self.columns {
            return Err(LinalgError::unsupported("determinant of a non-square matrix"));
        }
        Ok(self.pivots.iter().fold(T::Real::one(), |acc, r| acc * r.magnitude()))
    }
}

impl<T: Scalar> Solve<T> for Qr<T> {
    fn input_len(&self) -> usize {
        self.rows
    }

    fn output_len(&self) -> usize {
        self.columns
    }

    /// Least-squares solution when the system is overdetermined.
    fn solve_column(&self, b: &[T]) -> Result<Vec<T>> {
        if let Some(k) = self.pivots.iter().position(|r| *r == T::zero()) {
            return Err(LinalgError::ZeroPivot(k));
        }
        Ok(solve_lstsq_with(&self.factor, b, self.columns))
    }
}
