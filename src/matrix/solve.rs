//! Decomposition entry points, direct solves and the iterative-solve controller.

use crate::context::Builder;
use crate::core::scalar::Scalar;
use crate::error::{LinalgError, Result, Shape};
use crate::factorization::{Cholesky, Evd, GramSchmidt, Lu, Qr, QrMethod, Solve, Svd, Symmetricity};
use crate::matrix::Matrix;
use crate::preconditioner::{Preconditioner, UnitPreconditioner};
use crate::solver::{IterationStatus, IterationStopCriterion, IterativeSolver, SolverIterator, check_system};
use crate::storage::StorageKind;
use crate::utils::checks;
use crate::vector::Vector;

impl<T: Scalar> Matrix<T> {
    pub fn lu(&self) -> Result<Lu<T>> {
        Lu::new(self)
    }

    pub fn qr(&self, method: QrMethod) -> Result<Qr<T>> {
        Qr::new(self, method)
    }

    pub fn gram_schmidt(&self) -> Result<GramSchmidt<T>> {
        GramSchmidt::new(self)
    }

    pub fn cholesky(&self) -> Result<Cholesky<T>> {
        Cholesky::new(self)
    }

    pub fn svd(&self, compute_vectors: bool) -> Result<Svd<T>> {
        Svd::new(self, compute_vectors)
    }

    pub fn evd(&self, symmetricity: Symmetricity) -> Result<Evd<T>> {
        Evd::new(self, symmetricity)
    }

    fn direct_solver(&self) -> Result<Box<dyn Solve<T>>> {
        if self.is_square() {
            log::debug!("solving {}x{} system with LU", self.row_count(), self.column_count());
            Ok(Box::new(self.lu()?))
        } else {
            log::debug!("solving {}x{} system with thin QR", self.row_count(), self.column_count());
            Ok(Box::new(self.qr(QrMethod::Thin)?))
        }
    }

    /// `x` with `A·x = b`: LU for square matrices, least squares through QR
    /// for tall ones. Wide matrices are rejected.
    pub fn solve(&self, input: &Vector<T>) -> Result<Vector<T>> {
        checks::same_shape("input", Shape::vector(self.row_count()), input.shape())?;
        self.direct_solver()?.solve(input)
    }

    pub fn solve_into(&self, input: &Vector<T>, result: &mut Vector<T>) -> Result<()> {
        checks::same_shape("result", Shape::vector(self.column_count()), result.shape())?;
        self.solve(input)?.copy_to(result)
    }

    /// `X` with `A·X = B`, column by column.
    pub fn solve_matrix(&self, input: &Matrix<T>) -> Result<Matrix<T>> {
        if input.row_count() != self.row_count() {
            return Err(LinalgError::DimensionMismatch {
                param: "input",
                left: Shape::matrix(self.row_count(), input.column_count()),
                right: input.shape(),
            });
        }
        self.direct_solver()?.solve_matrix(input)
    }

    /// Run `solver` on `A·x = b` with `result` as the initial guess.
    ///
    /// The iterator is reset first. Non-convergence is not an error: the
    /// returned status says whether `result` can be trusted.
    pub fn try_solve_iterative(
        &self,
        input: &Vector<T>,
        result: &mut Vector<T>,
        solver: &mut dyn IterativeSolver<T>,
        iterator: &mut SolverIterator<T>,
        preconditioner: &mut dyn Preconditioner<T>,
    ) -> Result<IterationStatus> {
        check_system(self, input, result)?;
        iterator.reset();
        solver.solve(self, input, result, iterator, preconditioner)?;
        Ok(iterator.status())
    }

    /// Solve every column of `input` separately, each with a fresh copy of
    /// `iterator` and a zero initial guess. Returns the most severe status.
    ///
    /// `result` is only written once every column has been solved.
    pub fn try_solve_iterative_matrix(
        &self,
        input: &Matrix<T>,
        result: &mut Matrix<T>,
        solver: &mut dyn IterativeSolver<T>,
        iterator: &SolverIterator<T>,
        preconditioner: &mut dyn Preconditioner<T>,
    ) -> Result<IterationStatus> {
        checks::square("matrix", self.row_count(), self.column_count())?;
        if input.row_count() != self.row_count() {
            return Err(LinalgError::DimensionMismatch {
                param: "input",
                left: Shape::matrix(self.row_count(), input.column_count()),
                right: input.shape(),
            });
        }
        checks::same_shape(
            "result",
            Shape::matrix(self.column_count(), input.column_count()),
            result.shape(),
        )?;

        let mut solutions = Matrix::zeros(StorageKind::Dense, self.column_count(), input.column_count());
        let mut status = IterationStatus::Continue;
        for j in 0..input.column_count() {
            let b = input.column(j)?;
            let mut x = Vector::zeros(StorageKind::Dense, self.column_count());
            let mut column_iterator = iterator.fresh();
            solver.solve(self, &b, &mut x, &mut column_iterator, preconditioner)?;
            log::debug!("column {j}: {}", column_iterator.status());
            solutions.set_column(j, &x)?;
            status = status.max(column_iterator.status());
        }
        solutions.copy_to(result)?;
        Ok(status)
    }

    /// Iterative solve from a zero initial guess.
    ///
    /// Without `criteria` the builder's default set is used, capped at its
    /// `max_iterations`; without a preconditioner the identity is used.
    pub fn solve_iterative(
        &self,
        input: &Vector<T>,
        solver: &mut dyn IterativeSolver<T>,
        criteria: Option<Vec<Box<dyn IterationStopCriterion<T>>>>,
        preconditioner: Option<&mut dyn Preconditioner<T>>,
    ) -> Result<(Vector<T>, IterationStatus)> {
        let mut result = Vector::zeros(StorageKind::Dense, self.column_count());
        let mut iterator = SolverIterator::new(criteria.unwrap_or_else(default_criteria));
        let mut unit = UnitPreconditioner;
        let preconditioner: &mut dyn Preconditioner<T> = match preconditioner {
            Some(p) => p,
            None => &mut unit,
        };
        let status = self.try_solve_iterative(input, &mut result, solver, &mut iterator, preconditioner)?;
        Ok((result, status))
    }

    pub fn solve_iterative_matrix(
        &self,
        input: &Matrix<T>,
        solver: &mut dyn IterativeSolver<T>,
        criteria: Option<Vec<Box<dyn IterationStopCriterion<T>>>>,
        preconditioner: Option<&mut dyn Preconditioner<T>>,
    ) -> Result<(Matrix<T>, IterationStatus)> {
        let mut result = Matrix::zeros(StorageKind::Dense, self.column_count(), input.column_count());
        let iterator = SolverIterator::new(criteria.unwrap_or_else(default_criteria));
        let mut unit = UnitPreconditioner;
        let preconditioner: &mut dyn Preconditioner<T> = match preconditioner {
            Some(p) => p,
            None => &mut unit,
        };
        let status = self.try_solve_iterative_matrix(input, &mut result, solver, &iterator, preconditioner)?;
        Ok((result, status))
    }
}

fn default_criteria<T: Scalar>() -> Vec<Box<dyn IterationStopCriterion<T>>> {
    let builder = Builder::<T>::instance();
    builder.iterative_solver_stop_criteria(builder.options().max_iterations)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::preconditioner::DiagonalPreconditioner;
    use crate::solver::{BiCgStab, IterationCountStopCriterion, ResidualStopCriterion};
    use approx::assert_abs_diff_eq;

    fn system() -> Matrix<f64> {
        Matrix::dense_from_fn(3, 3, |i, j| [[5.0, 1.0, 0.0], [2.0, 6.0, 1.0], [0.0, 1.0, 4.0]][i][j])
    }

    #[test]
    fn identity_solve_is_exact() {
        let a = Matrix::<f64>::identity(StorageKind::Dense, 3);
        let b = Vector::dense_from_vec(vec![1.0, 2.0, 3.0]);
        assert_eq!(a.solve(&b).unwrap().to_vec(), vec![1.0, 2.0, 3.0]);
    }

    #[test]
    fn tall_systems_use_least_squares() {
        // Fit y = 1 + 2t through exact samples.
        let a = Matrix::dense_from_fn(4, 2, |i, j| if j == 0 { 1.0 } else { i as f64 });
        let b = Vector::dense_from_vec(vec![1.0, 3.0, 5.0, 7.0]);
        let x = a.solve(&b).unwrap().to_vec();
        assert_abs_diff_eq!(x[0], 1.0, epsilon = 1e-10);
        assert_abs_diff_eq!(x[1], 2.0, epsilon = 1e-10);
        let wide = a.transpose();
        assert!(matches!(
            wide.solve(&Vector::dense_from_vec(vec![1.0, 2.0])),
            Err(LinalgError::InvalidArgument { .. })
        ));
    }

    #[test]
    fn solve_matrix_checks_rows() {
        let a = system();
        let b = Matrix::dense_from_fn(2, 2, |_, _| 1.0);
        assert!(matches!(a.solve_matrix(&b), Err(LinalgError::DimensionMismatch { .. })));
        let i3 = Matrix::identity(StorageKind::Dense, 3);
        let inverse = a.solve_matrix(&i3).unwrap();
        let product = a.multiply(&inverse).unwrap();
        for (p, e) in product.to_column_major().into_iter().zip(i3.to_column_major()) {
            assert_abs_diff_eq!(p, e, epsilon = 1e-12);
        }
    }

    #[test]
    fn try_solve_resets_the_iterator() {
        let a = system();
        let b = Vector::dense_from_vec(vec![1.0, 2.0, 3.0]);
        let mut x = Vector::zeros(StorageKind::Dense, 3);
        let mut it = SolverIterator::new(vec![
            Box::new(IterationCountStopCriterion::new(50)),
            Box::new(ResidualStopCriterion::new(1e-12, 0).unwrap()),
        ]);
        it.cancel();
        let status = a
            .try_solve_iterative(&b, &mut x, &mut BiCgStab, &mut it, &mut DiagonalPreconditioner::<f64>::new())
            .unwrap();
        assert_eq!(status, IterationStatus::Converged);
        let direct = a.solve(&b).unwrap();
        for (xi, di) in x.to_vec().into_iter().zip(direct.to_vec()) {
            assert_abs_diff_eq!(xi, di, epsilon = 1e-10);
        }
    }

    #[test]
    fn matrix_right_hand_sides_solve_per_column() {
        let a = system();
        let b = Matrix::dense_from_fn(3, 2, |i, j| (i + j) as f64 + 1.0);
        let (x, status) = a.solve_iterative_matrix(&b, &mut BiCgStab, None, None).unwrap();
        assert_eq!(status, IterationStatus::Converged);
        let back = a.multiply(&x).unwrap();
        for (p, e) in back.to_column_major().into_iter().zip(b.to_column_major()) {
            assert_abs_diff_eq!(p, e, epsilon = 1e-9);
        }
    }

    /// Copies the right-hand side into the result, then errors once `good_columns` are used up.
    struct BreaksAfter {
        good_columns: usize,
    }

    impl IterativeSolver<f64> for BreaksAfter {
        fn solve(
            &mut self,
            _matrix: &Matrix<f64>,
            input: &Vector<f64>,
            result: &mut Vector<f64>,
            iterator: &mut SolverIterator<f64>,
            _preconditioner: &mut dyn Preconditioner<f64>,
        ) -> Result<()> {
            if self.good_columns == 0 {
                return Err(LinalgError::SolveError("breakdown".into()));
            }
            self.good_columns -= 1;
            input.copy_to(result)?;
            iterator.determine_status(0, result, input, &Vector::zeros(StorageKind::Dense, input.count()))?;
            Ok(())
        }
    }

    #[test]
    fn failed_column_leaves_result_untouched() {
        let a = Matrix::<f64>::identity(StorageKind::Dense, 2);
        let b = Matrix::dense_from_fn(2, 3, |i, j| (i + 2 * j) as f64 + 1.0);
        let mut result = Matrix::dense_from_fn(2, 3, |_, _| -7.0);
        let iterator = SolverIterator::<f64>::new(vec![Box::new(ResidualStopCriterion::new(1e-12, 0).unwrap())]);
        let err = a
            .try_solve_iterative_matrix(
                &b,
                &mut result,
                &mut BreaksAfter { good_columns: 1 },
                &iterator,
                &mut UnitPreconditioner,
            )
            .unwrap_err();
        assert!(matches!(err, LinalgError::SolveError(_)));
        assert!(result.to_column_major().iter().all(|&v| v == -7.0));

        let status = a
            .try_solve_iterative_matrix(
                &b,
                &mut result,
                &mut BreaksAfter { good_columns: 3 },
                &iterator,
                &mut UnitPreconditioner,
            )
            .unwrap();
        assert_eq!(status, IterationStatus::Converged);
        assert_eq!(result.to_column_major(), b.to_column_major());
    }

    #[test]
    fn mismatched_system_fails_before_iterating() {
        let a = system();
        let b = Vector::dense_from_vec(vec![1.0, 2.0]);
        let err = a.solve_iterative(&b, &mut BiCgStab, None, None).unwrap_err();
        assert!(matches!(err, LinalgError::DimensionMismatch { param: "input", .. }));
    }
}
