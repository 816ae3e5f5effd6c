//! Context module: the per-element-type factory.
//!
//! Modules:
//! - [`builder`]: the `Builder<T>` factory for matrices, vectors and default stop criteria.
//! - [`registry`]: the process-wide slot holding the active builder of each element type.
//!
//! # Example
//! ```rust
//! use linalg_core::context::build;
//!
//! let b = build::<f64>();
//! let identity = b.dense_identity(3);
//! let x = b.dense_vector_of_slice(&[1.0, 2.0, 3.0]);
//! assert_eq!(identity.solve(&x).unwrap(), x);
//! ```

pub mod builder;
pub mod registry;

pub use builder::Builder;

use std::sync::Arc;

use crate::core::scalar::Scalar;

/// Shorthand for [`Builder::instance`].
pub fn build<T: Scalar>() -> Arc<Builder<T>> {
    Builder::instance()
}
