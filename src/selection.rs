//! # Selection
//!
//! Ranking of an evaluated generation and elitist parent selection. Lower
//! fitness is better throughout. Ranking uses a stable sort, so candidates
//! with equal fitness keep their pre-sort order and the outcome is
//! reproducible for a fixed seed.

use std::cmp::Ordering;

use crate::error::{Result, SolverError};
use crate::population::Candidate;

/// Sorts a generation ascending by fitness, best first.
///
/// Every candidate must already carry a finite fitness; after a successful
/// batch evaluation that is guaranteed, but the ranker checks rather than
/// letting an unevaluated candidate sort arbitrarily. Applying `rank` to an
/// already ranked generation is a no-op.
pub fn rank(mut generation: Vec<Candidate>) -> Result<Vec<Candidate>> {
    for (index, candidate) in generation.iter().enumerate() {
        match candidate.fitness {
            Some(fitness) if fitness.is_finite() => {}
            Some(fitness) => {
                return Err(SolverError::Evaluation {
                    index,
                    message: format!("Non-finite fitness score encountered: {}", fitness),
                })
            }
            None => {
                return Err(SolverError::Evaluation {
                    index,
                    message: "Candidate has no fitness assigned".to_string(),
                })
            }
        }
    }

    // Stable sort: ties keep original position
    generation.sort_by(|a, b| {
        a.fitness
            .partial_cmp(&b.fitness)
            .unwrap_or(Ordering::Equal)
    });

    Ok(generation)
}

/// Selects the `num_parents` best candidates of a ranked generation, in
/// ranked order.
pub fn select_parents(ranked: &[Candidate], num_parents: usize) -> Result<Vec<Candidate>> {
    if num_parents < 2 {
        return Err(SolverError::Configuration(format!(
            "At least two parents are required for crossover, got {}",
            num_parents
        )));
    }
    if num_parents > ranked.len() {
        return Err(SolverError::Configuration(format!(
            "Cannot select {} parents from a generation of {}",
            num_parents,
            ranked.len()
        )));
    }

    Ok(ranked[..num_parents].to_vec())
}
