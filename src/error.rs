//! # Error Types
//!
//! This module defines the error types for the solver. The taxonomy is
//! deliberately small: configuration problems are caught before any
//! evaluation begins, evaluation problems discard the current generation
//! without persisting it, and storage problems never leave a partially
//! written state behind.
//!
//! ## Examples
//!
//! Using the `Result` type:
//!
//! ```rust
//! use gensolve::error::{Result, SolverError};
//!
//! fn check_rate(rate: f64) -> Result<()> {
//!     if !(0.0..=1.0).contains(&rate) {
//!         return Err(SolverError::Configuration(format!(
//!             "mutation rate must be in [0, 1], got {}",
//!             rate
//!         )));
//!     }
//!     Ok(())
//! }
//! ```

use thiserror::Error;

/// Represents errors that can occur while running the solver.
///
/// None of these are retried internally; they are surfaced to the caller,
/// who may rerun the solver against the same storage target to resume from
/// the last successfully persisted generation.
#[derive(Error, Debug)]
pub enum SolverError {
    /// Invalid static configuration (bad parameter ranges, parent/solution
    /// count mismatch). Always detected before any evaluation begins.
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// The objective function failed or produced an unusable score for the
    /// candidate at `index`. The whole batch is discarded; the generation is
    /// never persisted with a substituted fitness.
    #[error("Evaluation error for candidate {index}: {message}")]
    Evaluation { index: usize, message: String },

    /// Load or save failure against the storage target. The previously
    /// persisted state remains intact.
    #[error("Storage error: {0}")]
    Storage(String),
}

impl From<std::io::Error> for SolverError {
    fn from(err: std::io::Error) -> Self {
        SolverError::Storage(err.to_string())
    }
}

impl From<csv::Error> for SolverError {
    fn from(err: csv::Error) -> Self {
        SolverError::Storage(err.to_string())
    }
}

/// A specialized Result type for solver operations.
///
/// This type is a convenience wrapper around `std::result::Result` with the
/// error type fixed to `SolverError`.
pub type Result<T> = std::result::Result<T, SolverError>;
