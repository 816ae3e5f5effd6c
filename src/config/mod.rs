//! Configuration for builders and solver defaults.

pub mod options;
pub use options::BuilderOptions;
