//! Preconditioners for iterative solvers.
//!
//! This module defines the [`Preconditioner`] trait and the identity, Jacobi
//! and ILU(0) implementations.

use crate::core::scalar::Scalar;
use crate::error::Result;
use crate::matrix::Matrix;
use crate::vector::Vector;

/// A preconditioner M ≈ A⁻¹.
pub trait Preconditioner<T: Scalar> {
    /// Setup/factorize from A. Solvers call this once before iterating.
    fn setup(&mut self, _matrix: &Matrix<T>) -> Result<()> {
        Ok(())
    }

    /// Apply M⁻¹ to `rhs`, writing the approximate solution to `result`.
    fn apply(&self, rhs: &Vector<T>, result: &mut Vector<T>) -> Result<()>;
}

pub mod unit;
pub mod jacobi;
pub mod ilu;

pub use ilu::Ilu0Preconditioner;
pub use jacobi::DiagonalPreconditioner;
pub use unit::UnitPreconditioner;
