//! Shape, index and argument validation shared by the dispatch layer.
//!
//! Every check runs before any mutation, so a failing call leaves all of its
//! operands untouched.

use crate::error::{LinalgError, Result, Shape};

/// Fails unless `left` and `right` are the same shape.
pub(crate) fn same_shape(param: &'static str, left: Shape, right: Shape) -> Result<()> {
    if left == right {
        Ok(())
    } else {
        Err(LinalgError::DimensionMismatch { param, left, right })
    }
}

/// Fails unless `rows == columns`.
pub(crate) fn square(param: &'static str, rows: usize, columns: usize) -> Result<()> {
    if rows == columns {
        Ok(())
    } else {
        Err(LinalgError::DimensionMismatch {
            param,
            left: Shape::matrix(rows, columns),
            right: Shape::matrix(columns, rows),
        })
    }
}

/// Fails unless the inner dimensions of a product agree.
pub(crate) fn conformable(param: &'static str, left: (usize, usize), right: (usize, usize)) -> Result<()> {
    if left.1 == right.0 {
        Ok(())
    } else {
        Err(LinalgError::DimensionMismatch {
            param,
            left: Shape::matrix(left.0, left.1),
            right: Shape::matrix(right.0, right.1),
        })
    }
}

pub(crate) fn index(index: usize, bound: usize) -> Result<()> {
    if index < bound {
        Ok(())
    } else {
        Err(LinalgError::IndexOutOfRange { index, bound })
    }
}

/// Fails when a half-open range `start..start + count` runs past `bound`.
pub(crate) fn range(start: usize, count: usize, bound: usize) -> Result<()> {
    if count == 0 {
        return Err(LinalgError::invalid("count", "must be positive"));
    }
    match start.checked_add(count) {
        Some(end) if end <= bound => Ok(()),
        _ => Err(LinalgError::IndexOutOfRange {
            index: start.saturating_add(count) - 1,
            bound,
        }),
    }
}

pub(crate) fn non_empty(arg: &'static str, len: usize) -> Result<()> {
    if len == 0 {
        Err(LinalgError::invalid(arg, "must not be empty"))
    } else {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn range_checks_end_against_bound() {
        assert!(range(1, 2, 3).is_ok());
        assert_eq!(range(2, 2, 3), Err(LinalgError::IndexOutOfRange { index: 3, bound: 3 }));
        assert!(matches!(range(0, 0, 3), Err(LinalgError::InvalidArgument { .. })));
    }

    #[test]
    fn square_names_both_orientations() {
        let msg = square("matrix", 2, 3).unwrap_err().to_string();
        assert!(msg.contains("2x3") && msg.contains("3x2"), "{msg}");
    }
}
