//! Iterative solvers and the convergence controller that drives them.
//!
//! A solver implements [`IterativeSolver`] and reports progress to a
//! [`SolverIterator`] once per iteration. The iterator owns the stop criteria
//! and turns their verdicts into one [`IterationStatus`]; the solver stops as
//! soon as that status is terminal. Non-convergence is reported through the
//! status, never as an error.

use crate::core::scalar::Scalar;
use crate::error::{Result, Shape};
use crate::matrix::Matrix;
use crate::preconditioner::Preconditioner;
use crate::utils::checks;
use crate::vector::Vector;

pub mod status;
pub use status::IterationStatus;

pub mod criteria;
pub use criteria::{
    DivergenceStopCriterion, FailureStopCriterion, IterationCountStopCriterion, IterationStopCriterion,
    ResidualStopCriterion,
};

pub mod iterator;
pub use iterator::SolverIterator;

pub mod bicgstab;
pub use bicgstab::BiCgStab;

pub mod cg;
pub use cg::ConjugateGradient;

/// An iterative method for `A·x = b`.
pub trait IterativeSolver<T: Scalar> {
    /// Iterate on `result` (taken as the initial guess) until `iterator`
    /// reports a terminal status.
    ///
    /// Implementations call [`Preconditioner::setup`] once with `matrix`
    /// before iterating, and check the status of the initial guess as
    /// iteration 0.
    fn solve(
        &mut self,
        matrix: &Matrix<T>,
        input: &Vector<T>,
        result: &mut Vector<T>,
        iterator: &mut SolverIterator<T>,
        preconditioner: &mut dyn Preconditioner<T>,
    ) -> Result<()>;
}

/// Square `matrix`, `input` of its row count and `result` of its column count.
pub(crate) fn check_system<T: Scalar>(matrix: &Matrix<T>, input: &Vector<T>, result: &Vector<T>) -> Result<()> {
    checks::square("matrix", matrix.row_count(), matrix.column_count())?;
    checks::same_shape("input", Shape::vector(matrix.row_count()), input.shape())?;
    checks::same_shape("result", Shape::vector(matrix.column_count()), result.shape())
}

/// `residual ← b - A·x`.
pub(crate) fn true_residual<T: Scalar>(
    matrix: &Matrix<T>,
    x: &Vector<T>,
    b: &Vector<T>,
    residual: &mut Vector<T>,
) -> Result<()> {
    matrix.multiply_vector_into(x, residual)?;
    residual.scale_in_place(-T::one());
    residual.add_assign(b)
}
