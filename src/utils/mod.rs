//! Utilities shared across modules.

pub(crate) mod checks;
pub(crate) mod pointwise;
