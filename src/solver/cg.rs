//! Preconditioned Conjugate Gradient per Saad §9.2.

use num_traits::Zero;

use crate::core::scalar::Scalar;
use crate::error::{LinalgError, Result};
use crate::matrix::Matrix;
use crate::preconditioner::Preconditioner;
use crate::solver::{IterativeSolver, SolverIterator, check_system, true_residual};
use crate::storage::StorageKind;
use crate::vector::Vector;

/// CG for Hermitian positive definite systems.
///
/// Stops with [`LinalgError::IndefiniteMatrix`] as soon as a search
/// direction has `Re(pᴴAp) ≤ 0`.
#[derive(Debug, Clone, Copy, Default)]
pub struct ConjugateGradient;

impl ConjugateGradient {
    pub fn new() -> Self {
        Self
    }
}

impl<T: Scalar> IterativeSolver<T> for ConjugateGradient {
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

        let mut r = Vector::zeros(StorageKind::Dense, n);
        true_residual(matrix, result, input, &mut r)?;
        if iterator.determine_status(0, result, input, &r)?.is_terminal() {
            return Ok(());
        }

        let mut z = Vector::zeros(StorageKind::Dense, n);
        let mut q = Vector::zeros(StorageKind::Dense, n);
        preconditioner.apply(&r, &mut z)?;
        let mut p = z.clone();
        let mut rz = r.conjugate_dot_product(&z)?;

        for k in 1.. {
            if rz != T::zero() {
                matrix.multiply_vector_into(&p, &mut q)?;
                let pq = p.conjugate_dot_product(&q)?;
                if pq.real() <= T::Real::zero() {
                    return Err(LinalgError::IndefiniteMatrix);
                }
                let alpha = rz / pq;
                result.add_scaled(alpha, &p)?;
                r.add_scaled(-alpha, &q)?;
            }
            // A zero residual leaves nothing to update; the criteria decide.

            if iterator.determine_status(k, result, input, &r)?.is_terminal() {
                return Ok(());
            }

            preconditioner.apply(&r, &mut z)?;
            let rz_next = r.conjugate_dot_product(&z)?;
            if rz != T::zero() {
                // p = z + β p
                p.scale_in_place(rz_next / rz);
                p.add_assign(&z)?;
            } else {
                z.copy_to(&mut p)?;
            }
            rz = rz_next;
        }
        Ok(())
    }
}
