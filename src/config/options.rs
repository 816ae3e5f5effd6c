//! Options carried by a [`Builder`](crate::context::Builder).
//!
//! `BuilderOptions` holds the defaults a builder hands out: the tolerance of
//! the residual criterion in the default stop-criteria set, the divergence
//! detector's parameters, the iteration ceiling for solves started without
//! explicit criteria, and the size above which row/column folds fan out to
//! worker threads.

use crate::core::scalar::ElementType;
use crate::error::{LinalgError, Result};

/// Tolerances and defaults for one element type.
#[derive(Debug, Clone, PartialEq)]
pub struct BuilderOptions {
    /// Relative tolerance of the default residual stop criterion
    pub residual_tolerance: f64,

    /// Relative growth per step the divergence detector treats as divergent
    pub divergence_max_relative_increase: f64,

    /// Consecutive growing steps before divergence is reported
    pub divergence_minimum_iterations: usize,

    /// Element count above which `fold_by_row`/`fold_by_column` run in parallel
    pub parallel_fold_threshold: usize,

    /// Iteration ceiling used when an iterative solve is given no criteria
    pub max_iterations: usize,
}

impl BuilderOptions {
    /// Defaults suited to the precision of `element`.
    pub fn for_element(element: ElementType) -> Self {
        let residual_tolerance = if element.is_single_precision() { 1e-6 } else { 1e-12 };
        Self {
            residual_tolerance,
            ..Self::default()
        }
    }

    /// Reject values the default stop criteria cannot work with.
    pub fn validate(&self) -> Result<()> {
        if !(self.residual_tolerance.is_finite() && self.residual_tolerance >= 0.0) {
            return Err(LinalgError::invalid(
                "residual_tolerance",
                format!("must be non-negative and finite, got {}", self.residual_tolerance),
            ));
        }
        if !(self.divergence_max_relative_increase.is_finite() && self.divergence_max_relative_increase > 0.0) {
            return Err(LinalgError::invalid(
                "divergence_max_relative_increase",
                format!("must be positive and finite, got {}", self.divergence_max_relative_increase),
            ));
        }
        if self.divergence_minimum_iterations < 3 {
            return Err(LinalgError::invalid(
                "divergence_minimum_iterations",
                format!("must be at least 3, got {}", self.divergence_minimum_iterations),
            ));
        }
        Ok(())
    }
}

impl Default for BuilderOptions {
    fn default() -> Self {
        Self {
            residual_tolerance: 1e-12,
            divergence_max_relative_increase: 0.08,
            divergence_minimum_iterations: 10,
            parallel_fold_threshold: 4096,
            max_iterations: 1000,
        }
    }
}
