//! # SolverOptions
//!
//! Static configuration for a solver run: generation count, population
//! shape, parent count, parameter ranges, mutation rate, and the batch size
//! at which fitness evaluation switches to the parallel path.
//!
//! ## Example
//!
//! ```rust
//! use gensolve::evolution::SolverOptions;
//! use gensolve::population::ParamRange;
//!
//! let options = SolverOptions::builder()
//!     .num_generations(20)
//!     .param_ranges(vec![ParamRange::new(-5.0, 5.0); 2])
//!     .num_solutions(10)
//!     .num_parents(4)
//!     .mutation_rate(0.1)
//!     .build();
//!
//! assert!(options.validate().is_ok());
//! ```

use crate::error::{Result, SolverError};
use crate::population::{validate_ranges, ParamRange};

/// Configuration options for a solver run.
///
/// `param_ranges` doubles as the parameter-count declaration: its length is
/// the dimensionality of every vector in the run. The ranges are only
/// consulted to seed a fresh population and to bound mutation; a resumed run
/// keeps the persisted population.
#[derive(Debug, Clone)]
pub struct SolverOptions {
    num_generations: usize,
    param_ranges: Vec<ParamRange>,
    num_solutions: usize,
    num_parents: usize,
    mutation_rate: f64,
    /// Minimum batch size for parallel fitness evaluation
    parallel_threshold: usize,
}

impl SolverOptions {
    pub fn new(
        num_generations: usize,
        param_ranges: Vec<ParamRange>,
        num_solutions: usize,
        num_parents: usize,
    ) -> Self {
        Self {
            num_generations,
            param_ranges,
            num_solutions,
            num_parents,
            mutation_rate: 0.1,
            parallel_threshold: 8,
        }
    }

    pub fn get_num_generations(&self) -> usize {
        self.num_generations
    }

    pub fn get_param_ranges(&self) -> &[ParamRange] {
        &self.param_ranges
    }

    pub fn get_num_params(&self) -> usize {
        self.param_ranges.len()
    }

    pub fn get_num_solutions(&self) -> usize {
        self.num_solutions
    }

    pub fn get_num_parents(&self) -> usize {
        self.num_parents
    }

    pub fn get_mutation_rate(&self) -> f64 {
        self.mutation_rate
    }

    /// Returns the minimum batch size for parallel fitness evaluation.
    pub fn get_parallel_threshold(&self) -> usize {
        self.parallel_threshold
    }

    /// Checks every static constraint, before any evaluation has begun.
    pub fn validate(&self) -> Result<()> {
        if self.num_generations == 0 {
            return Err(SolverError::Configuration(
                "Number of generations cannot be zero".to_string(),
            ));
        }
        if self.param_ranges.is_empty() {
            return Err(SolverError::Configuration(
                "At least one parameter range is required".to_string(),
            ));
        }
        if self.num_solutions == 0 {
            return Err(SolverError::Configuration(
                "Population size cannot be zero".to_string(),
            ));
        }
        if self.num_parents < 2 {
            return Err(SolverError::Configuration(format!(
                "At least two parents are required for crossover, got {}",
                self.num_parents
            )));
        }
        if self.num_parents > self.num_solutions {
            return Err(SolverError::Configuration(format!(
                "Number of parents ({}) cannot exceed population size ({})",
                self.num_parents, self.num_solutions
            )));
        }
        if !(0.0..=1.0).contains(&self.mutation_rate) {
            return Err(SolverError::Configuration(format!(
                "Mutation rate must be in [0, 1], got {}",
                self.mutation_rate
            )));
        }
        validate_ranges(&self.param_ranges)
    }

    /// Returns a builder for creating a `SolverOptions` instance.
    pub fn builder() -> SolverOptionsBuilder {
        SolverOptionsBuilder::default()
    }
}

/// Builder for `SolverOptions`.
///
/// Provides a fluent interface for constructing `SolverOptions` instances.
/// Unset fields fall back to defaults; `SolverOptions::validate` is the
/// place where an inconsistent combination is rejected.
#[derive(Debug, Clone, Default)]
pub struct SolverOptionsBuilder {
    num_generations: Option<usize>,
    param_ranges: Option<Vec<ParamRange>>,
    num_solutions: Option<usize>,
    num_parents: Option<usize>,
    mutation_rate: Option<f64>,
    parallel_threshold: Option<usize>,
}

impl SolverOptionsBuilder {
    /// Sets the number of generations to run.
    pub fn num_generations(mut self, value: usize) -> Self {
        self.num_generations = Some(value);
        self
    }

    /// Sets the parameter ranges (and thereby the parameter count).
    pub fn param_ranges(mut self, value: Vec<ParamRange>) -> Self {
        self.param_ranges = Some(value);
        self
    }

    /// Sets the population size.
    pub fn num_solutions(mut self, value: usize) -> Self {
        self.num_solutions = Some(value);
        self
    }

    /// Sets the number of parents selected each generation.
    pub fn num_parents(mut self, value: usize) -> Self {
        self.num_parents = Some(value);
        self
    }

    /// Sets the per-index mutation probability.
    pub fn mutation_rate(mut self, value: f64) -> Self {
        self.mutation_rate = Some(value);
        self
    }

    /// Sets the minimum batch size for parallel fitness evaluation.
    pub fn parallel_threshold(mut self, value: usize) -> Self {
        self.parallel_threshold = Some(value);
        self
    }

    /// Builds the `SolverOptions` instance.
    pub fn build(self) -> SolverOptions {
        SolverOptions {
            num_generations: self.num_generations.unwrap_or(100),
            param_ranges: self.param_ranges.unwrap_or_default(),
            num_solutions: self.num_solutions.unwrap_or(20),
            num_parents: self.num_parents.unwrap_or(4),
            mutation_rate: self.mutation_rate.unwrap_or(0.1),
            parallel_threshold: self.parallel_threshold.unwrap_or(8),
        }
    }
}
