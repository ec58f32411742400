//! # Population Types
//!
//! Core data types of the solver: parameter ranges, candidates, the
//! best-ever ledger, and the persisted run state, plus initial population
//! sampling.
//!
//! A candidate's parameter vector is positional: index `i` of every vector
//! means the same parameter across the whole run, and `param_ranges[i]`
//! bounds both initial sampling and mutation for that index.

use crate::error::{Result, SolverError};
use crate::rng::RandomNumberGenerator;

/// Inclusive bounds for one parameter index.
///
/// Used only to sample the initial population and to bound mutation; the
/// objective function itself is free to reject values however it likes.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ParamRange {
    pub min: f64,
    pub max: f64,
}

impl ParamRange {
    pub fn new(min: f64, max: f64) -> Self {
        Self { min, max }
    }

    /// Checks that the bounds are finite and ordered.
    pub fn validate(&self) -> Result<()> {
        if !self.min.is_finite() || !self.max.is_finite() {
            return Err(SolverError::Configuration(format!(
                "Parameter range bounds must be finite, got ({}, {})",
                self.min, self.max
            )));
        }
        if self.min > self.max {
            return Err(SolverError::Configuration(format!(
                "Parameter range minimum ({}) exceeds maximum ({})",
                self.min, self.max
            )));
        }
        Ok(())
    }

    /// Draws a value uniformly from this range.
    pub fn sample(&self, rng: &mut RandomNumberGenerator) -> f64 {
        if self.min == self.max {
            self.min
        } else {
            rng.uniform(self.min, self.max)
        }
    }

    pub fn contains(&self, value: f64) -> bool {
        value >= self.min && value <= self.max
    }
}

/// One parameter vector plus its fitness, if it has been evaluated.
///
/// Lower fitness is better. A candidate is immutable once its fitness is
/// assigned; reproduction always emits unevaluated candidates, and even the
/// elite carried forward between generations is re-evaluated, since the
/// objective function is not assumed to cache by identity.
#[derive(Debug, Clone, PartialEq)]
pub struct Candidate {
    pub params: Vec<f64>,
    pub fitness: Option<f64>,
}

impl Candidate {
    /// Creates a candidate that has not been scored yet.
    pub fn unevaluated(params: Vec<f64>) -> Self {
        Self {
            params,
            fitness: None,
        }
    }

    /// Creates a candidate with its fitness assigned.
    pub fn evaluated(params: Vec<f64>, fitness: f64) -> Self {
        Self {
            params,
            fitness: Some(fitness),
        }
    }
}

/// Append-only ledger entry: the best candidate of one completed generation.
#[derive(Debug, Clone, PartialEq)]
pub struct BestRecord {
    pub generation: usize,
    pub params: Vec<f64>,
    pub fitness: f64,
}

/// The externally persisted unit: the latest ranked generation and the
/// best-ever ledger. This is everything a later run needs to resume.
#[derive(Debug, Clone, PartialEq)]
pub struct RunState {
    /// Latest ranked generation, best first, all fitness-assigned.
    pub population: Vec<Candidate>,
    /// One entry per completed generation, in generation order.
    pub ledger: Vec<BestRecord>,
}

impl RunState {
    /// Returns the lowest fitness recorded in the ledger so far.
    pub fn all_time_best(&self) -> Option<f64> {
        self.ledger
            .iter()
            .map(|record| record.fitness)
            .fold(None, |best, f| match best {
                Some(b) if b <= f => Some(b),
                _ => Some(f),
            })
    }
}

/// Validates a full set of parameter ranges.
pub fn validate_ranges(ranges: &[ParamRange]) -> Result<()> {
    for (index, range) in ranges.iter().enumerate() {
        range.validate().map_err(|e| {
            SolverError::Configuration(format!("Invalid range for parameter {}: {}", index, e))
        })?;
    }
    Ok(())
}

/// Samples a fresh, unevaluated population of `num_solutions` candidates,
/// each parameter drawn independently and uniformly from its range.
pub fn init_population(
    ranges: &[ParamRange],
    num_solutions: usize,
    rng: &mut RandomNumberGenerator,
) -> Result<Vec<Candidate>> {
    validate_ranges(ranges)?;

    let population = (0..num_solutions)
        .map(|_| {
            let params = ranges.iter().map(|range| range.sample(rng)).collect();
            Candidate::unevaluated(params)
        })
        .collect();

    Ok(population)
}
