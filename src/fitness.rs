//! # Fitness Function and Batch Evaluation
//!
//! The solver never inspects the objective function; it only requires a pure
//! mapping from a parameter vector to a scalar, cheap to share across worker
//! threads. Batch evaluation runs candidates in parallel with rayon and
//! reassembles results into input order, so downstream ranking is
//! deterministic regardless of which worker finished first.

use std::panic::{self, AssertUnwindSafe};

use rayon::prelude::*;

use crate::error::{Result, SolverError};
use crate::population::Candidate;

/// The objective to be minimized.
///
/// Implementations must be pure: the score for a given parameter vector must
/// not depend on evaluation order, other in-flight evaluations, or any
/// unsynchronized external state, since a batch may evaluate candidates
/// concurrently. Lower scores are better.
pub trait FitnessFunction: Send + Sync {
    /// Scores one parameter vector. Must return a finite value; non-finite
    /// scores (and panics) fail the whole batch.
    fn evaluate(&self, params: &[f64]) -> f64;
}

impl<F> FitnessFunction for F
where
    F: Fn(&[f64]) -> f64 + Send + Sync,
{
    fn evaluate(&self, params: &[f64]) -> f64 {
        self(params)
    }
}

fn score_one<F: FitnessFunction>(fitness_fun: &F, index: usize, params: &[f64]) -> Result<f64> {
    let outcome = panic::catch_unwind(AssertUnwindSafe(|| fitness_fun.evaluate(params)));
    match outcome {
        Ok(score) if score.is_finite() => Ok(score),
        Ok(score) => Err(SolverError::Evaluation {
            index,
            message: format!("Non-finite fitness score encountered: {}", score),
        }),
        Err(_) => Err(SolverError::Evaluation {
            index,
            message: "Objective function panicked".to_string(),
        }),
    }
}

/// Evaluates a batch of candidates, returning `scores[i]` for
/// `candidates[i]` regardless of completion order.
///
/// Batches of at least `parallel_threshold` candidates are evaluated on the
/// rayon thread pool; smaller batches are evaluated sequentially, where the
/// pool overhead would dominate. A single failing evaluation discards the
/// whole batch: no default fitness is ever substituted, since a corrupted
/// score would silently corrupt ranking and every downstream generation.
pub fn evaluate_batch<F: FitnessFunction>(
    candidates: &[Candidate],
    fitness_fun: &F,
    parallel_threshold: usize,
) -> Result<Vec<f64>> {
    if candidates.len() >= parallel_threshold {
        candidates
            .par_iter()
            .enumerate()
            .map(|(index, candidate)| score_one(fitness_fun, index, &candidate.params))
            .collect()
    } else {
        candidates
            .iter()
            .enumerate()
            .map(|(index, candidate)| score_one(fitness_fun, index, &candidate.params))
            .collect()
    }
}
