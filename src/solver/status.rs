//! Verdicts reported by stop criteria and iterators.

use std::fmt;

/// Outcome of checking an iterate against the stop criteria.
///
/// Variants are declared from least to most severe, so `Ord` ranks them:
/// when several criteria fire in the same round, [`IterationStatus::max`]
/// of their verdicts is the overall status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub enum IterationStatus {
    /// Keep iterating.
    #[default]
    Continue,
    Converged,
    /// The iteration ceiling was reached before convergence.
    StoppedWithoutConvergence,
    /// Convergence cannot be judged, e.g. the right-hand side norm is not finite.
    Indeterminate,
    Cancelled,
    Diverged,
    Failed,
}

impl IterationStatus {
    /// Whether the solve should stop.
    pub fn is_terminal(self) -> bool {
        self != IterationStatus::Continue
    }

    pub fn is_converged(self) -> bool {
        self == IterationStatus::Converged
    }
}

impl fmt::Display for IterationStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            IterationStatus::Continue => "continue",
            IterationStatus::Converged => "converged",
            IterationStatus::StoppedWithoutConvergence => "stopped without convergence",
            IterationStatus::Indeterminate => "indeterminate",
            IterationStatus::Cancelled => "cancelled",
            IterationStatus::Diverged => "diverged",
            IterationStatus::Failed => "failed",
        };
        f.write_str(s)
    }
}
