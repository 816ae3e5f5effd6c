//! Eigenvalue decomposition `A = V Λ Vᴴ` of symmetric / Hermitian matrices.

use faer::Side;
use faer::linalg::solvers::{EvdError, SelfAdjointEigen};
use num_traits::{One, Zero};

use crate::core::scalar::{RealScalar, Scalar};
use crate::error::{LinalgError, Result};
use crate::factorization::{Solve, from_field, solve_with, to_field};
use crate::matrix::Matrix;
use crate::storage::{DiagonalMatrixStorage, MatrixStorage};
use crate::utils::checks;

/// What the caller knows about the matrix symmetry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Symmetricity {
    /// Detect from the matrix.
    #[default]
    Unknown,
    Symmetric,
    Hermitian,
    Asymmetric,
}

#[derive(Debug, Clone)]
pub struct Evd<T: Scalar> {
    factor: SelfAdjointEigen<T::Field>,
    eigenvalues: Vec<T::Real>,
    order: usize,
    symmetricity: Symmetricity,
}

impl<T: Scalar> Evd<T> {
    pub fn new(a: &Matrix<T>, symmetricity: Symmetricity) -> Result<Self> {
        checks::square("matrix", a.row_count(), a.column_count())?;
        if symmetricity == Symmetricity::Asymmetric || !a.is_hermitian() {
            return Err(LinalgError::unsupported(
                "eigenvalue decomposition of matrices that are not symmetric or Hermitian",
            ));
        }
        let symmetricity = if T::ELEMENT_TYPE.is_complex() {
            Symmetricity::Hermitian
        } else {
            Symmetricity::Symmetric
        };

        let factor = SelfAdjointEigen::<T::Field>::new(to_field(a).as_ref(), Side::Lower).map_err(evd_failed)?;
        let s = factor.S().column_vector();
        let eigenvalues = (0..s.nrows()).map(|k| T::from_field(s[k]).real()).collect();

        Ok(Self {
            factor,
            eigenvalues,
            order: a.row_count(),
            symmetricity,
        })
    }

    /// Eigenvalues in ascending order.
    pub fn eigenvalues(&self) -> &[T::Real] {
        &self.eigenvalues
    }

    /// Orthonormal eigenvectors as columns, in the order of [`Evd::eigenvalues`].
    pub fn eigenvectors(&self) -> Result<Matrix<T>> {
        from_field(self.factor.U())
    }

    /// `Λ` as a diagonal matrix.
    pub fn d(&self) -> Result<Matrix<T>> {
        let diagonal = self.eigenvalues.iter().map(|&l| T::from_real(l)).collect();
        Ok(Matrix::from_storage(MatrixStorage::Diagonal(DiagonalMatrixStorage::from_diagonal(
            self.order, self.order, diagonal,
        )?)))
    }

    pub fn symmetricity(&self) -> Symmetricity {
        self.symmetricity
    }

    pub fn determinant(&self) -> T::Real {
        self.eigenvalues.iter().fold(T::Real::one(), |acc, &l| acc * l)
    }

    fn tolerance(&self) -> T::Real {
        let max = self
            .eigenvalues
            .iter()
            .fold(T::Real::zero(), |acc, l| acc.max(l.magnitude()));
        T::Real::from_usize(self.order) * max * <T::Real as RealScalar>::epsilon()
    }

    /// Number of eigenvalues that are not numerically zero.
    pub fn rank(&self) -> usize {
        let tol = self.tolerance();
        self.eigenvalues.iter().filter(|l| l.magnitude() > tol).count()
    }

    pub fn is_full_rank(&self) -> bool {
        self.rank() == self.order
    }
}

impl<T: Scalar> Solve<T> for Evd<T> {
    fn input_len(&self) -> usize {
        self.order
    }

    fn output_len(&self) -> usize {
        self.order
    }

    /// `x = V Λ⁻¹ Vᴴ b`.
    fn solve_column(&self, b: &[T]) -> Result<Vec<T>> {
        if !self.is_full_rank() {
            return Err(LinalgError::SolveError("matrix is singular".into()));
        }
        Ok(solve_with(&self.factor, b, self.order))
    }
}

fn evd_failed(e: EvdError) -> LinalgError {
    LinalgError::FactorError(format!("eigenvalue decomposition failed: {e:?}"))
}
