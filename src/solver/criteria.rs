//! Stop criteria for iterative solves.
//!
//! A criterion inspects the current iterate once per iteration and reports an
//! [`IterationStatus`]. Criteria keep whatever history they need between
//! calls; [`IterationStopCriterion::reset`] clears it so one criterion can be
//! reused for another solve.

use std::collections::VecDeque;
use std::fmt;

use num_traits::Zero;

use crate::core::scalar::Scalar;
use crate::error::{LinalgError, Result};
use crate::solver::IterationStatus;
use crate::utils::checks;
use crate::vector::Vector;

pub trait IterationStopCriterion<T: Scalar>: Send + fmt::Debug {
    /// Judge the iterate after `iteration` completed iterations.
    ///
    /// `source` is the right-hand side, `residual` is `source - A·solution`.
    fn determine_status(
        &mut self,
        iteration: usize,
        solution: &Vector<T>,
        source: &Vector<T>,
        residual: &Vector<T>,
    ) -> Result<IterationStatus>;

    /// Verdict of the most recent check.
    fn status(&self) -> IterationStatus;

    /// Forget all history and return to [`IterationStatus::Continue`].
    fn reset(&mut self);

    fn clone_box(&self) -> Box<dyn IterationStopCriterion<T>>;
}

impl<T: Scalar> Clone for Box<dyn IterationStopCriterion<T>> {
    fn clone(&self) -> Self {
        self.clone_box()
    }
}

fn check_lengths<T: Scalar>(solution: &Vector<T>, source: &Vector<T>, residual: &Vector<T>) -> Result<()> {
    checks::same_shape("solution", source.shape(), solution.shape())?;
    checks::same_shape("residual", source.shape(), residual.shape())
}

/// Fails the solve as soon as the solution or the residual holds NaN or ∞.
#[derive(Debug, Clone, Default)]
pub struct FailureStopCriterion {
    status: IterationStatus,
}

impl FailureStopCriterion {
    pub fn new() -> Self {
        Self::default()
    }
}

impl<T: Scalar> IterationStopCriterion<T> for FailureStopCriterion {
    fn determine_status(
        &mut self,
        _iteration: usize,
        solution: &Vector<T>,
        source: &Vector<T>,
        residual: &Vector<T>,
    ) -> Result<IterationStatus> {
        check_lengths(solution, source, residual)?;
        let broken = |v: &Vector<T>| v.enumerate_non_zero().any(|(_, x)| !x.is_finite());
        self.status = if broken(residual) || broken(solution) {
            IterationStatus::Failed
        } else {
            IterationStatus::Continue
        };
        Ok(self.status)
    }

    fn status(&self) -> IterationStatus {
        self.status
    }

    fn reset(&mut self) {
        self.status = IterationStatus::Continue;
    }

    fn clone_box(&self) -> Box<dyn IterationStopCriterion<T>> {
        Box::new(Self::new())
    }
}

/// Stops once `iteration` reaches the ceiling.
#[derive(Debug, Clone)]
pub struct IterationCountStopCriterion {
    maximum: usize,
    status: IterationStatus,
}

impl IterationCountStopCriterion {
    pub fn new(maximum: usize) -> Self {
        Self {
            maximum,
            status: IterationStatus::Continue,
        }
    }

    pub fn maximum(&self) -> usize {
        self.maximum
    }
}

impl<T: Scalar> IterationStopCriterion<T> for IterationCountStopCriterion {
    fn determine_status(
        &mut self,
        iteration: usize,
        _solution: &Vector<T>,
        _source: &Vector<T>,
        _residual: &Vector<T>,
    ) -> Result<IterationStatus> {
        self.status = if iteration >= self.maximum {
            IterationStatus::StoppedWithoutConvergence
        } else {
            IterationStatus::Continue
        };
        Ok(self.status)
    }

    fn status(&self) -> IterationStatus {
        self.status
    }

    fn reset(&mut self) {
        self.status = IterationStatus::Continue;
    }

    fn clone_box(&self) -> Box<dyn IterationStopCriterion<T>> {
        Box::new(Self::new(self.maximum))
    }
}

/// Reports divergence when the residual ℓ2 norm has grown by at least
/// `maximum_relative_increase` on each of the last `minimum_iterations` steps.
#[derive(Debug, Clone)]
pub struct DivergenceStopCriterion {
    maximum_relative_increase: f64,
    minimum_iterations: usize,
    history: VecDeque<f64>,
    last_iteration: Option<usize>,
    status: IterationStatus,
}

impl DivergenceStopCriterion {
    /// `maximum_relative_increase` must be positive and finite; at least three
    /// iterations are needed to see a trend.
    pub fn new(maximum_relative_increase: f64, minimum_iterations: usize) -> Result<Self> {
        if !(maximum_relative_increase.is_finite() && maximum_relative_increase > 0.0) {
            return Err(LinalgError::invalid(
                "maximum_relative_increase",
                format!("must be positive and finite, got {maximum_relative_increase}"),
            ));
        }
        if minimum_iterations < 3 {
            return Err(LinalgError::invalid(
                "minimum_iterations",
                format!("must be at least 3, got {minimum_iterations}"),
            ));
        }
        Ok(Self::new_unchecked(maximum_relative_increase, minimum_iterations))
    }

    pub(crate) fn new_unchecked(maximum_relative_increase: f64, minimum_iterations: usize) -> Self {
        Self {
            maximum_relative_increase,
            minimum_iterations,
            history: VecDeque::with_capacity(minimum_iterations + 1),
            last_iteration: None,
            status: IterationStatus::Continue,
        }
    }

    fn is_diverging(&self) -> bool {
        if self.history.len() <= self.minimum_iterations {
            return false;
        }
        let factor = 1.0 + self.maximum_relative_increase;
        self.history
            .iter()
            .zip(self.history.iter().skip(1))
            .all(|(&before, &after)| after >= before * factor)
    }
}

impl<T: Scalar> IterationStopCriterion<T> for DivergenceStopCriterion {
    fn determine_status(
        &mut self,
        iteration: usize,
        solution: &Vector<T>,
        source: &Vector<T>,
        residual: &Vector<T>,
    ) -> Result<IterationStatus> {
        check_lengths(solution, source, residual)?;
        if self.last_iteration.is_some_and(|last| iteration <= last) {
            // A new solve started with this criterion.
            self.history.clear();
        }
        self.last_iteration = Some(iteration);

        let norm = residual.l2_norm();
        let norm = <T::Real as crate::core::scalar::RealScalar>::to_f64(norm);
        if self.history.len() == self.minimum_iterations + 1 {
            self.history.pop_front();
        }
        self.history.push_back(norm);
        log::trace!(
            "divergence check at iteration {iteration}: residual {norm:e}, {} norms tracked",
            self.history.len()
        );

        self.status = if self.is_diverging() {
            IterationStatus::Diverged
        } else {
            IterationStatus::Continue
        };
        Ok(self.status)
    }

    fn status(&self) -> IterationStatus {
        self.status
    }

    fn reset(&mut self) {
        self.history.clear();
        self.last_iteration = None;
        self.status = IterationStatus::Continue;
    }

    fn clone_box(&self) -> Box<dyn IterationStopCriterion<T>> {
        Box::new(Self::new_unchecked(self.maximum_relative_increase, self.minimum_iterations))
    }
}

/// Converges once `‖r‖∞ ≤ tolerance · ‖b‖∞` (or `‖r‖∞ ≤ tolerance` when
/// `b = 0`) has held on more than `minimum_iterations_below_maximum`
/// consecutive checks. A NaN or infinite residual fails the solve.
#[derive(Debug, Clone)]
pub struct ResidualStopCriterion {
    tolerance: f64,
    minimum_iterations_below_maximum: usize,
    iterations_below: usize,
    last_iteration: Option<usize>,
    status: IterationStatus,
}

impl ResidualStopCriterion {
    pub fn new(tolerance: f64, minimum_iterations_below_maximum: usize) -> Result<Self> {
        if !(tolerance.is_finite() && tolerance >= 0.0) {
            return Err(LinalgError::invalid(
                "tolerance",
                format!("must be non-negative and finite, got {tolerance}"),
            ));
        }
        Ok(Self::new_unchecked(tolerance, minimum_iterations_below_maximum))
    }

    pub(crate) fn new_unchecked(tolerance: f64, minimum_iterations_below_maximum: usize) -> Self {
        Self {
            tolerance,
            minimum_iterations_below_maximum,
            iterations_below: 0,
            last_iteration: None,
            status: IterationStatus::Continue,
        }
    }

    pub fn tolerance(&self) -> f64 {
        self.tolerance
    }
}

impl<T: Scalar> IterationStopCriterion<T> for ResidualStopCriterion {
    fn determine_status(
        &mut self,
        iteration: usize,
        solution: &Vector<T>,
        source: &Vector<T>,
        residual: &Vector<T>,
    ) -> Result<IterationStatus> {
        check_lengths(solution, source, residual)?;
        if self.last_iteration.is_some_and(|last| iteration <= last) {
            self.iterations_below = 0;
        }
        self.last_iteration = Some(iteration);

        let source_norm = source.infinity_norm();
        if !source_norm.is_finite() {
            self.status = IterationStatus::Indeterminate;
            return Ok(self.status);
        }
        let residual_norm = residual.infinity_norm();
        if !residual_norm.is_finite() {
            self.iterations_below = 0;
            self.status = IterationStatus::Failed;
            return Ok(self.status);
        }
        let tolerance = T::Real::from_f64(self.tolerance);
        let bound = if source_norm == T::Real::zero() {
            tolerance
        } else {
            tolerance * source_norm
        };

        if residual_norm <= bound {
            self.iterations_below += 1;
        } else {
            self.iterations_below = 0;
        }
        self.status = if self.iterations_below > self.minimum_iterations_below_maximum {
            IterationStatus::Converged
        } else {
            IterationStatus::Continue
        };
        Ok(self.status)
    }

    fn status(&self) -> IterationStatus {
        self.status
    }

    fn reset(&mut self) {
        self.iterations_below = 0;
        self.last_iteration = None;
        self.status = IterationStatus::Continue;
    }

    fn clone_box(&self) -> Box<dyn IterationStopCriterion<T>> {
        let mut fresh = self.clone();
        IterationStopCriterion::<T>::reset(&mut fresh);
        Box::new(fresh)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn v(values: &[f64]) -> Vector<f64> {
        Vector::dense_from_vec(values.to_vec())
    }

    #[test]
    fn iteration_ceiling() {
        let mut c = IterationCountStopCriterion::new(3);
        let x = v(&[0.0]);
        assert_eq!(c.determine_status(2, &x, &x, &x).unwrap(), IterationStatus::Continue);
        assert_eq!(c.determine_status(3, &x, &x, &x).unwrap(), IterationStatus::StoppedWithoutConvergence);
        IterationStopCriterion::<f64>::reset(&mut c);
        assert_eq!(IterationStopCriterion::<f64>::status(&c), IterationStatus::Continue);
    }

    #[test]
    fn failure_on_nan() {
        let mut c = FailureStopCriterion::new();
        let good = v(&[1.0, 2.0]);
        let bad = v(&[1.0, f64::NAN]);
        assert_eq!(c.determine_status(1, &good, &good, &good).unwrap(), IterationStatus::Continue);
        assert_eq!(c.determine_status(2, &bad, &good, &good).unwrap(), IterationStatus::Failed);
        assert_eq!(c.determine_status(3, &good, &good, &bad).unwrap(), IterationStatus::Failed);
    }

    #[test]
    fn residual_needs_consecutive_hits() {
        let mut c = ResidualStopCriterion::new(1e-3, 1).unwrap();
        let b = v(&[10.0, -2.0]);
        let x = v(&[0.0, 0.0]);
        let small = v(&[1e-3, 0.0]);
        let large = v(&[1.0, 0.0]);
        assert_eq!(c.determine_status(1, &x, &b, &small).unwrap(), IterationStatus::Continue);
        assert_eq!(c.determine_status(2, &x, &b, &large).unwrap(), IterationStatus::Continue);
        assert_eq!(c.determine_status(3, &x, &b, &small).unwrap(), IterationStatus::Continue);
        assert_eq!(c.determine_status(4, &x, &b, &small).unwrap(), IterationStatus::Converged);
    }

    #[test]
    fn residual_with_zero_source_uses_absolute_tolerance() {
        let mut c = ResidualStopCriterion::new(1e-6, 0).unwrap();
        let zero = v(&[0.0, 0.0]);
        assert_eq!(c.determine_status(1, &zero, &zero, &v(&[1e-7, 0.0])).unwrap(), IterationStatus::Converged);
        let inf = v(&[f64::INFINITY, 0.0]);
        assert_eq!(c.determine_status(2, &zero, &inf, &zero).unwrap(), IterationStatus::Indeterminate);
    }

    #[test]
    fn non_finite_residual_fails() {
        let mut c = ResidualStopCriterion::new(1e-6, 0).unwrap();
        let ones = v(&[1.0, 1.0]);
        assert_eq!(c.determine_status(1, &ones, &ones, &v(&[f64::NAN, f64::NAN])).unwrap(), IterationStatus::Failed);
        assert_eq!(c.determine_status(2, &ones, &ones, &v(&[0.0, f64::NAN])).unwrap(), IterationStatus::Failed);
        assert_eq!(c.determine_status(3, &ones, &ones, &v(&[f64::INFINITY, 0.0])).unwrap(), IterationStatus::Failed);
        // A finite residual afterwards starts a fresh streak.
        assert_eq!(c.determine_status(4, &ones, &ones, &v(&[0.0, 0.0])).unwrap(), IterationStatus::Converged);
    }

    #[test]
    fn divergence_needs_a_sustained_rise() {
        let mut c = DivergenceStopCriterion::new(0.5, 3).unwrap();
        let x = v(&[0.0]);
        let mut norm = 1.0;
        let mut last = IterationStatus::Continue;
        for it in 1..=4 {
            last = c.determine_status(it, &x, &x, &v(&[norm])).unwrap();
            norm *= 2.0;
        }
        assert_eq!(last, IterationStatus::Diverged);

        // A dip breaks the streak.
        IterationStopCriterion::<f64>::reset(&mut c);
        for (it, r) in [1.0, 2.0, 1.5, 3.0].into_iter().enumerate() {
            last = c.determine_status(it + 1, &x, &x, &v(&[r])).unwrap();
        }
        assert_eq!(last, IterationStatus::Continue);
        assert!(DivergenceStopCriterion::new(0.0, 3).is_err());
        assert!(DivergenceStopCriterion::new(0.1, 2).is_err());
    }

    #[test]
    fn mismatched_lengths_are_rejected() {
        let mut c = FailureStopCriterion::new();
        let err = c.determine_status(1, &v(&[1.0]), &v(&[1.0, 2.0]), &v(&[1.0, 2.0])).unwrap_err();
        assert!(matches!(err, LinalgError::DimensionMismatch { param: "solution", .. }));
    }
}
