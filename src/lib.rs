//! linalg-core: element-generic matrices and vectors over Faer-style storage
//!
//! This crate provides dense, sparse and diagonal matrices and vectors over
//! `f64`, `f32`, `Complex<f64>` and `Complex<f32>`, with shape-checked and
//! aliasing-safe arithmetic, dense factorizations, and a convergence
//! controller that drives iterative solvers through pluggable stop criteria
//! and preconditioners.

pub mod config;
pub mod context;
pub mod core;
pub mod error;
pub mod factorization;
pub mod matrix;
pub mod preconditioner;
pub mod solver;
pub mod storage;
pub mod utils;
pub mod vector;

// Re-exports for convenience
pub use config::*;
pub use context::{Builder, build};
pub use self::core::*;
pub use error::*;
pub use factorization::{Cholesky, Evd, GramSchmidt, Lu, Qr, QrMethod, Solve, Svd, Symmetricity};
pub use matrix::{Matrix, Op, Operand};
pub use preconditioner::*;
pub use solver::*;
pub use storage::{MatrixStorage, StorageFlags, StorageKind, VectorStorage, Zeros};
pub use vector::{Vector, VectorOperand};
