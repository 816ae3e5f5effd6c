//! Element traits and storage capability traits.

pub mod scalar;
pub mod traits;

pub use scalar::{ElementType, RealScalar, Scalar};
pub use traits::{MatVec, MatrixStorageOps, VectorStorageOps};
