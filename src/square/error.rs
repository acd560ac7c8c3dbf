//! Error types for the arithmetic square solver.
//!
//! The search itself cannot fail: every input is a constant of the puzzle. The
//! errors here cover the edges of the crate instead, namely assignments typed in
//! by a user, custom layouts built by library callers, and the worker pool used
//! by the parallel solver.

use thiserror::Error;

/// Main error type for solver operations.
#[derive(Debug, Error)]
pub enum SquareError {
    /// An assignment has the wrong length, a value out of range or a repeated value.
    #[error("Invalid assignment: {0}")]
    InvalidAssignment(String),

    /// A layout references cells outside the grid or binds a cell twice.
    #[error("Invalid layout: {0}")]
    InvalidLayout(String),

    /// The rayon thread pool for the parallel solver could not be built.
    #[error("Failed to build worker pool: {0}")]
    ThreadPool(#[from] rayon::ThreadPoolBuildError),
}

/// Result type alias for solver operations.
pub type Result<T> = std::result::Result<T, SquareError>;
