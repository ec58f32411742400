//! # Breeding
//!
//! Crossover, mutation, and the reproduction step that builds the next
//! generation from the selected parents.
//!
//! Crossover is a uniform per-index coin flip: every offspring coordinate is
//! taken verbatim from one of the two parents, so offspring are always
//! traceable to their parents. Mutation replaces a coordinate, with
//! independent probability `mutation_rate`, by a fresh uniform draw from
//! that index's range, which keeps every coordinate in bounds by
//! construction. Both operators are deterministic for a fixed seed.

use crate::error::{Result, SolverError};
use crate::population::{Candidate, ParamRange};
use crate::rng::RandomNumberGenerator;

/// Combines two parent vectors into one offspring vector, choosing each
/// coordinate from either parent with equal probability.
pub fn crossover(
    parent_a: &[f64],
    parent_b: &[f64],
    rng: &mut RandomNumberGenerator,
) -> Vec<f64> {
    parent_a
        .iter()
        .zip(parent_b.iter())
        .map(|(&a, &b)| if rng.chance(0.5) { a } else { b })
        .collect()
}

/// Perturbs a vector: each coordinate is independently replaced, with
/// probability `mutation_rate`, by a fresh uniform draw from its range.
pub fn mutate(
    params: &[f64],
    ranges: &[ParamRange],
    mutation_rate: f64,
    rng: &mut RandomNumberGenerator,
) -> Vec<f64> {
    params
        .iter()
        .zip(ranges.iter())
        .map(|(&value, range)| {
            if rng.chance(mutation_rate) {
                range.sample(rng)
            } else {
                value
            }
        })
        .collect()
}

/// Builds the next, unevaluated generation of `num_solutions` candidates.
///
/// Slot 0 carries the rank-0 parent forward unmodified (elitism), which
/// guarantees the best fitness never regresses between generations. The
/// remaining slots are offspring of two distinct parents, sampled with
/// replacement across pairs, crossed over and then mutated. The elite's
/// fitness is cleared like everyone else's: every generation is re-evaluated
/// in full.
pub fn reproduce(
    parents: &[Candidate],
    num_solutions: usize,
    ranges: &[ParamRange],
    mutation_rate: f64,
    rng: &mut RandomNumberGenerator,
) -> Result<Vec<Candidate>> {
    if parents.len() < 2 {
        return Err(SolverError::Configuration(format!(
            "At least two parents are required for crossover, got {}",
            parents.len()
        )));
    }
    for (index, parent) in parents.iter().enumerate() {
        if parent.params.len() != ranges.len() {
            return Err(SolverError::Configuration(format!(
                "Parent {} has {} parameters but {} ranges were given",
                index,
                parent.params.len(),
                ranges.len()
            )));
        }
    }

    let mut next_generation = Vec::with_capacity(num_solutions);
    next_generation.push(Candidate::unevaluated(parents[0].params.clone()));

    while next_generation.len() < num_solutions {
        let first = rng.index(parents.len());
        // Draw the second parent from the remaining indices
        let mut second = rng.index(parents.len() - 1);
        if second >= first {
            second += 1;
        }

        let child = crossover(&parents[first].params, &parents[second].params, rng);
        let child = mutate(&child, ranges, mutation_rate, rng);
        next_generation.push(Candidate::unevaluated(child));
    }

    next_generation.truncate(num_solutions);
    Ok(next_generation)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ranges(n: usize) -> Vec<ParamRange> {
        vec![ParamRange::new(-5.0, 5.0); n]
    }

    #[test]
    fn test_crossover_coordinates_come_from_a_parent() {
        let parent_a = vec![1.0, 2.0, 3.0, 4.0];
        let parent_b = vec![5.0, 6.0, 7.0, 8.0];
        let mut rng = RandomNumberGenerator::from_seed(3);

        for _ in 0..50 {
            let child = crossover(&parent_a, &parent_b, &mut rng);
            assert_eq!(child.len(), 4);
            for (i, &value) in child.iter().enumerate() {
                assert!(value == parent_a[i] || value == parent_b[i]);
            }
        }
    }

    #[test]
    fn test_mutate_stays_in_bounds() {
        let params = vec![0.0, 0.0, 0.0];
        let ranges = ranges(3);
        let mut rng = RandomNumberGenerator::from_seed(9);

        for _ in 0..50 {
            let mutated = mutate(&params, &ranges, 1.0, &mut rng);
            for (value, range) in mutated.iter().zip(ranges.iter()) {
                assert!(range.contains(*value));
            }
        }
    }

    #[test]
    fn test_mutate_zero_rate_is_identity() {
        let params = vec![1.0, -2.0, 3.5];
        let mut rng = RandomNumberGenerator::from_seed(9);
        let mutated = mutate(&params, &ranges(3), 0.0, &mut rng);

        assert_eq!(mutated, params);
    }

    #[test]
    fn test_reproduce_carries_elite_unmodified() {
        let parents = vec![
            Candidate::evaluated(vec![1.0, 1.0], 2.0),
            Candidate::evaluated(vec![-3.0, 4.0], 25.0),
        ];
        let mut rng = RandomNumberGenerator::from_seed(11);
        let next = reproduce(&parents, 6, &ranges(2), 0.5, &mut rng).unwrap();

        assert_eq!(next.len(), 6);
        assert_eq!(next[0].params, parents[0].params);
        // The elite is re-evaluated like everyone else
        assert!(next.iter().all(|c| c.fitness.is_none()));
    }

    #[test]
    fn test_reproduce_offspring_in_bounds() {
        let parents = vec![
            Candidate::evaluated(vec![-5.0, 5.0], 50.0),
            Candidate::evaluated(vec![5.0, -5.0], 50.0),
            Candidate::evaluated(vec![0.0, 0.0], 0.0),
        ];
        let ranges = ranges(2);
        let mut rng = RandomNumberGenerator::from_seed(13);
        let next = reproduce(&parents, 20, &ranges, 0.3, &mut rng).unwrap();

        for candidate in &next {
            for (value, range) in candidate.params.iter().zip(ranges.iter()) {
                assert!(range.contains(*value));
            }
        }
    }

    #[test]
    fn test_reproduce_is_deterministic_for_fixed_seed() {
        let parents = vec![
            Candidate::evaluated(vec![1.0, 2.0], 5.0),
            Candidate::evaluated(vec![3.0, 4.0], 25.0),
            Candidate::evaluated(vec![-1.0, -2.0], 5.0),
        ];
        let ranges = ranges(2);

        let mut rng1 = RandomNumberGenerator::from_seed(99);
        let mut rng2 = RandomNumberGenerator::from_seed(99);
        let next1 = reproduce(&parents, 10, &ranges, 0.2, &mut rng1).unwrap();
        let next2 = reproduce(&parents, 10, &ranges, 0.2, &mut rng2).unwrap();

        assert_eq!(next1, next2);
    }

    #[test]
    fn test_reproduce_rejects_single_parent() {
        let parents = vec![Candidate::evaluated(vec![1.0], 1.0)];
        let mut rng = RandomNumberGenerator::from_seed(1);

        assert!(matches!(
            reproduce(&parents, 4, &ranges(1), 0.1, &mut rng),
            Err(SolverError::Configuration(_))
        ));
    }

    #[test]
    fn test_reproduce_rejects_range_length_mismatch() {
        let parents = vec![
            Candidate::evaluated(vec![1.0, 2.0], 1.0),
            Candidate::evaluated(vec![3.0, 4.0], 2.0),
        ];
        let mut rng = RandomNumberGenerator::from_seed(1);

        assert!(reproduce(&parents, 4, &ranges(3), 0.1, &mut rng).is_err());
    }
}
