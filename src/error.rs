use std::fmt;
use thiserror::Error;

/// Shape of a matrix or vector operand, used in error messages.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Shape {
    Matrix { rows: usize, columns: usize },
    Vector(usize),
}

impl Shape {
    pub fn matrix(rows: usize, columns: usize) -> Self {
        Shape::Matrix { rows, columns }
    }

    pub fn vector(length: usize) -> Self {
        Shape::Vector(length)
    }
}

impl fmt::Display for Shape {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Shape::Matrix { rows, columns } => write!(f, "{rows}x{columns}"),
            Shape::Vector(length) => write!(f, "{length}"),
        }
    }
}

// Unified error type for linalg-core

#[derive(Error, Debug, Clone, PartialEq)]
pub enum LinalgError {
    #[error("dimensions do not match for `{param}`: {left} vs {right}")]
    DimensionMismatch {
        param: &'static str,
        left: Shape,
        right: Shape,
    },
    #[error("not supported: {0}")]
    Unsupported(String),
    #[error("invalid argument `{arg}`: {reason}")]
    InvalidArgument { arg: &'static str, reason: String },
    #[error("index {index} out of range (must be less than {bound})")]
    IndexOutOfRange { index: usize, bound: usize },
    #[error("attempted to divide by zero")]
    DivideByZero,
    #[error("zero pivot at row {0}")]
    ZeroPivot(usize),
    #[error("matrix is not positive definite")]
    NotPositiveDefinite,
    #[error("indefinite matrix detected (p^H A p <= 0)")]
    IndefiniteMatrix,
    #[error("factorization error: {0}")]
    FactorError(String),
    #[error("solve error: {0}")]
    SolveError(String),
}

impl LinalgError {
    pub(crate) fn invalid(arg: &'static str, reason: impl Into<String>) -> Self {
        LinalgError::InvalidArgument {
            arg,
            reason: reason.into(),
        }
    }

    pub(crate) fn unsupported(what: impl Into<String>) -> Self {
        LinalgError::Unsupported(what.into())
    }
}

pub type Result<T> = std::result::Result<T, LinalgError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn dimension_mismatch_names_both_shapes() {
        let err = LinalgError::DimensionMismatch {
            param: "other",
            left: Shape::matrix(2, 3),
            right: Shape::matrix(3, 2),
        };
        let msg = err.to_string();
        assert!(msg.contains("2x3"), "{msg}");
        assert!(msg.contains("3x2"), "{msg}");
        assert!(msg.contains("other"), "{msg}");
    }

    #[test]
    fn vector_shape_displays_length() {
        assert_eq!(Shape::vector(7).to_string(), "7");
    }
}
