//! Right-preconditioned BiCGStab (van der Vorst 1992; Saad §7.4.2).

use crate::core::scalar::Scalar;
use crate::error::{LinalgError, Result};
use crate::matrix::Matrix;
use crate::preconditioner::Preconditioner;
use crate::solver::{IterativeSolver, SolverIterator, check_system, true_residual};
use crate::storage::StorageKind;
use crate::vector::Vector;

/// Stabilized bi-conjugate gradients for general square systems.
#[derive(Debug, Clone, Copy, Default)]
pub struct BiCgStab;

impl BiCgStab {
    pub fn new() -> Self {
        Self
    }
}

impl<T: Scalar> IterativeSolver<T> for BiCgStab {
    fn solve(
        &mut self,
        matrix: &Matrix<T>,
        input: &Vector<T>,
        result: &mut Vector<T>,
        iterator: &mut SolverIterator<T>,
        preconditioner: &mut dyn Preconditioner<T>,
    ) -> Result<()> {
        check_system(matrix, input, result)?;
        preconditioner.setup(matrix)?;
        let n = input.count();
        let dense = || Vector::<T>::zeros(StorageKind::Dense, n);

        let mut r = dense();
        true_residual(matrix, result, input, &mut r)?;
        if iterator.determine_status(0, result, input, &r)?.is_terminal() {
            return Ok(());
        }

        // Shadow residual.
        let r_hat = r.clone();
        let (mut p, mut v) = (dense(), dense());
        let (mut p_hat, mut s_hat, mut t) = (dense(), dense(), dense());
        let mut rho_prev = T::one();
        let mut alpha = T::one();
        let mut omega = T::one();

        for k in 1.. {
            let rho = r_hat.conjugate_dot_product(&r)?;
            if rho == T::zero() {
                return breakdown(k, "rho", matrix, input, result, &mut r, iterator);
            }

            // p = r + β (p - ω v)
            if k == 1 {
                r.copy_to(&mut p)?;
            } else {
                let beta = (rho / rho_prev) * (alpha / omega);
                p.add_scaled(-omega, &v)?;
                p.scale_in_place(beta);
                p.add_assign(&r)?;
            }

            preconditioner.apply(&p, &mut p_hat)?;
            matrix.multiply_vector_into(&p_hat, &mut v)?;
            let denominator = r_hat.conjugate_dot_product(&v)?;
            if denominator == T::zero() {
                return breakdown(k, "r̂ᴴv", matrix, input, result, &mut r, iterator);
            }
            alpha = rho / denominator;

            // s = r - α v, kept in r.
            r.add_scaled(-alpha, &v)?;
            preconditioner.apply(&r, &mut s_hat)?;
            matrix.multiply_vector_into(&s_hat, &mut t)?;
            let tt = t.conjugate_dot_product(&t)?;
            omega = if tt == T::zero() {
                T::zero()
            } else {
                t.conjugate_dot_product(&r)? / tt
            };

            result.add_scaled(alpha, &p_hat)?;
            result.add_scaled(omega, &s_hat)?;
            r.add_scaled(-omega, &t)?;

            if iterator.determine_status(k, result, input, &r)?.is_terminal() {
                return Ok(());
            }
            if omega == T::zero() {
                return breakdown(k, "omega", matrix, input, result, &mut r, iterator);
            }
            rho_prev = rho;
        }
        Ok(())
    }
}

/// Recheck with the true residual; a breakdown is only an error when the
/// iterate is not already acceptable.
fn breakdown<T: Scalar>(
    iteration: usize,
    quantity: &str,
    matrix: &Matrix<T>,
    input: &Vector<T>,
    result: &Vector<T>,
    residual: &mut Vector<T>,
    iterator: &mut SolverIterator<T>,
) -> Result<()> {
    true_residual(matrix, result, input, residual)?;
    if iterator.determine_status(iteration, result, input, residual)?.is_terminal() {
        return Ok(());
    }
    Err(LinalgError::SolveError(format!(
        "BiCGStab breakdown at iteration {iteration}: {quantity} vanished"
    )))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::preconditioner::UnitPreconditioner;
    use crate::solver::{FailureStopCriterion, IterationCountStopCriterion, IterationStatus, ResidualStopCriterion};
    use approx::assert_abs_diff_eq;
    use num_complex::Complex64;

    fn iterator<T: Scalar>() -> SolverIterator<T> {
        SolverIterator::new(vec![
            Box::new(FailureStopCriterion::new()),
            Box::new(IterationCountStopCriterion::new(100)),
            Box::new(ResidualStopCriterion::new(1e-12, 0).unwrap()),
        ])
    }

    // Diagonally dominant, non-symmetric.
    fn nonsym_3x3() -> (Matrix<f64>, Vector<f64>) {
        let a = Matrix::dense_from_fn(3, 3, |i, j| if i == j { 10.0 } else { (i + 2 * j) as f64 + 1.0 });
        let x_true = Vector::dense_from_vec(vec![1.0, 2.0, 3.0]);
        let b = a.multiply_vector(&x_true).unwrap();
        (a, b)
    }

    #[test]
    fn bicgstab_solves_well_conditioned_nonsym() {
        let (a, b) = nonsym_3x3();
        let mut x = Vector::zeros(StorageKind::Dense, 3);
        let mut it = iterator();
        BiCgStab::new().solve(&a, &b, &mut x, &mut it, &mut UnitPreconditioner).unwrap();
        assert_eq!(it.status(), IterationStatus::Converged);
        for (xi, ei) in x.to_vec().into_iter().zip([1.0, 2.0, 3.0]) {
            assert_abs_diff_eq!(xi, ei, epsilon = 1e-8);
        }
    }

    #[test]
    fn exact_initial_guess_stops_at_iteration_zero() {
        let (a, b) = nonsym_3x3();
        let mut x = Vector::dense_from_vec(vec![1.0, 2.0, 3.0]);
        let mut it = SolverIterator::new(vec![Box::new(ResidualStopCriterion::new(1e-12, 0).unwrap())]);
        BiCgStab::new().solve(&a, &b, &mut x, &mut it, &mut UnitPreconditioner).unwrap();
        assert_eq!(it.status(), IterationStatus::Converged);
        assert_eq!(x.to_vec(), vec![1.0, 2.0, 3.0]);
    }

    #[test]
    fn complex_system() {
        let a = Matrix::dense_from_fn(3, 3, |i, j| {
            if i == j {
                Complex64::new(8.0, 1.0)
            } else {
                Complex64::new((i + j) as f64, (i as f64) - (j as f64))
            }
        });
        let x_true = Vector::dense_from_vec(vec![
            Complex64::new(1.0, -1.0),
            Complex64::new(0.5, 2.0),
            Complex64::new(-3.0, 0.0),
        ]);
        let b = a.multiply_vector(&x_true).unwrap();
        let mut x = Vector::zeros(StorageKind::Dense, 3);
        let mut it = iterator();
        BiCgStab::new().solve(&a, &b, &mut x, &mut it, &mut UnitPreconditioner).unwrap();
        assert_eq!(it.status(), IterationStatus::Converged);
        for (xi, ei) in x.to_vec().into_iter().zip(x_true.to_vec()) {
            assert_abs_diff_eq!((xi - ei).norm(), 0.0, epsilon = 1e-8);
        }
    }

    #[test]
    fn shapes_are_checked_before_iterating() {
        let (a, b) = nonsym_3x3();
        let mut x = Vector::zeros(StorageKind::Dense, 2);
        let err = BiCgStab::new()
            .solve(&a, &b, &mut x, &mut iterator(), &mut UnitPreconditioner)
            .unwrap_err();
        assert!(matches!(err, LinalgError::DimensionMismatch { param: "result", .. }));
    }
}
