// Jacobi preconditioner implementation

use crate::core::scalar::Scalar;
use crate::error::{LinalgError, Result, Shape};
use crate::matrix::Matrix;
use crate::preconditioner::Preconditioner;
use crate::utils::checks;
use crate::vector::Vector;

/// Jacobi preconditioner: M⁻¹ = D⁻¹
#[derive(Debug, Clone, Default)]
pub struct DiagonalPreconditioner<T> {
    inv_diag: Vec<T>,
}

impl<T: Scalar> DiagonalPreconditioner<T> {
    /// new with empty state; the solver calls `setup`.
    pub fn new() -> Self {
        Self { inv_diag: Vec::new() }
    }
}

impl<T: Scalar> Preconditioner<T> for DiagonalPreconditioner<T> {
    fn setup(&mut self, matrix: &Matrix<T>) -> Result<()> {
        checks::square("matrix", matrix.row_count(), matrix.column_count())?;
        self.inv_diag = matrix
            .diagonal()
            .to_vec()
            .into_iter()
            .enumerate()
            .map(|(i, d)| if d == T::zero() { Err(LinalgError::ZeroPivot(i)) } else { Ok(T::one() / d) })
            .collect::<Result<_>>()?;
        Ok(())
    }

    fn apply(&self, rhs: &Vector<T>, result: &mut Vector<T>) -> Result<()> {
        checks::same_shape("rhs", Shape::vector(self.inv_diag.len()), rhs.shape())?;
        checks::same_shape("result", rhs.shape(), result.shape())?;
        let values: Vec<T> = rhs
            .to_vec()
            .into_iter()
            .zip(&self.inv_diag)
            .map(|(r, &d)| r * d)
            .collect();
        result.storage_mut().assign_values(&values);
        Ok(())
    }
}
