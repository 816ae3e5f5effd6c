// Identity preconditioner, the default for iterative solves

use crate::core::scalar::Scalar;
use crate::error::Result;
use crate::preconditioner::Preconditioner;
use crate::vector::Vector;

/// M⁻¹ = I
#[derive(Debug, Clone, Copy, Default)]
pub struct UnitPreconditioner;

impl<T: Scalar> Preconditioner<T> for UnitPreconditioner {
    fn apply(&self, rhs: &Vector<T>, result: &mut Vector<T>) -> Result<()> {
        rhs.copy_to(result)
    }
}
