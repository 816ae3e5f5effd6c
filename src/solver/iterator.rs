//! Combines several stop criteria into one verdict per iteration.

use crate::core::scalar::Scalar;
use crate::error::Result;
use crate::solver::IterationStatus;
use crate::solver::criteria::IterationStopCriterion;
use crate::vector::Vector;

/// Drives the stop criteria of one iterative solve.
///
/// Every call to [`SolverIterator::determine_status`] asks each criterion for
/// its verdict and keeps the most severe one. Once the status is terminal the
/// solver is expected to stop; [`SolverIterator::cancel`] forces that from the
/// caller side.
#[derive(Debug, Clone)]
pub struct SolverIterator<T: Scalar> {
    criteria: Vec<Box<dyn IterationStopCriterion<T>>>,
    status: IterationStatus,
}

impl<T: Scalar> SolverIterator<T> {
    pub fn new(criteria: Vec<Box<dyn IterationStopCriterion<T>>>) -> Self {
        Self {
            criteria,
            status: IterationStatus::Continue,
        }
    }

    pub fn criteria(&self) -> &[Box<dyn IterationStopCriterion<T>>] {
        &self.criteria
    }

    pub fn status(&self) -> IterationStatus {
        self.status
    }

    /// Ask every criterion about the current iterate.
    ///
    /// An iterator without criteria never stops on its own. A cancelled
    /// iterator stays cancelled until [`SolverIterator::reset`].
    pub fn determine_status(
        &mut self,
        iteration: usize,
        solution: &Vector<T>,
        source: &Vector<T>,
        residual: &Vector<T>,
    ) -> Result<IterationStatus> {
        if self.status == IterationStatus::Cancelled {
            return Ok(self.status);
        }
        let mut status = IterationStatus::Continue;
        for criterion in &mut self.criteria {
            status = status.max(criterion.determine_status(iteration, solution, source, residual)?);
        }
        if status.is_terminal() {
            let verdicts: Vec<IterationStatus> = self.criteria.iter().map(|c| c.status()).collect();
            log::debug!("iteration {iteration}: {status} (criteria: {verdicts:?})");
        }
        self.status = status;
        Ok(status)
    }

    /// Make the next status check report [`IterationStatus::Cancelled`].
    pub fn cancel(&mut self) {
        self.status = IterationStatus::Cancelled;
    }

    pub fn reset(&mut self) {
        self.status = IterationStatus::Continue;
        for criterion in &mut self.criteria {
            criterion.reset();
        }
    }

    /// A reset copy sharing no state with `self`.
    pub fn fresh(&self) -> Self {
        let mut copy = self.clone();
        copy.reset();
        copy
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::solver::criteria::{FailureStopCriterion, IterationCountStopCriterion, ResidualStopCriterion};

    fn v(values: &[f64]) -> Vector<f64> {
        Vector::dense_from_vec(values.to_vec())
    }

    fn iterator() -> SolverIterator<f64> {
        SolverIterator::new(vec![
            Box::new(IterationCountStopCriterion::new(5)),
            Box::new(ResidualStopCriterion::new(1e-8, 0).unwrap()),
            Box::new(FailureStopCriterion::new()),
        ])
    }

    #[test]
    fn most_severe_verdict_wins() {
        let mut it = iterator();
        let b = v(&[1.0]);
        let tiny = v(&[1e-12]);
        // Converged and out of iterations at once.
        assert_eq!(
            it.determine_status(5, &b, &b, &tiny).unwrap(),
            IterationStatus::StoppedWithoutConvergence
        );
        let nan = v(&[f64::NAN]);
        assert_eq!(it.determine_status(6, &nan, &b, &tiny).unwrap(), IterationStatus::Failed);
    }

    #[test]
    fn cancel_sticks_until_reset() {
        let mut it = iterator();
        let b = v(&[1.0]);
        it.cancel();
        assert_eq!(it.determine_status(1, &b, &b, &b).unwrap(), IterationStatus::Cancelled);
        it.reset();
        assert_eq!(it.determine_status(1, &b, &b, &b).unwrap(), IterationStatus::Continue);
    }

    #[test]
    fn fresh_copies_do_not_share_state() {
        let mut it = iterator();
        let b = v(&[1.0]);
        it.determine_status(5, &b, &b, &b).unwrap();
        let copy = it.fresh();
        assert_eq!(copy.status(), IterationStatus::Continue);
        assert_eq!(copy.criteria().len(), 3);
        assert!(copy.criteria().iter().all(|c| c.status() == IterationStatus::Continue));
        assert_eq!(it.status(), IterationStatus::StoppedWithoutConvergence);
    }
}
