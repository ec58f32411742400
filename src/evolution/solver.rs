//! # Solver
//!
//! The generation loop. One run drives
//! `INIT -> (EVALUATE -> RANK -> PERSIST -> REPRODUCE) x num_generations`,
//! resuming from the storage target when a previous run left state behind.
//!
//! Persistence is a hard synchronization point: reproduction never starts
//! before the ranked generation and its ledger entry are durably saved, so
//! the last persisted generation is always complete, ranked, and valid, and
//! a failed or interrupted run can simply be rerun against the same target.

use tracing::{debug, info};

use crate::breeding::reproduce;
use crate::error::Result;
use crate::fitness::{evaluate_batch, FitnessFunction};
use crate::population::{init_population, BestRecord, Candidate};
use crate::rng::RandomNumberGenerator;
use crate::selection::{rank, select_parents};
use crate::store::CsvStore;

use super::options::SolverOptions;

/// The outcome of a completed run.
#[derive(Debug, Clone, PartialEq)]
pub struct SolveReport {
    /// The best candidate ever recorded, including resumed history.
    pub best: Candidate,
    /// Number of generations executed by this run.
    pub generations_run: usize,
    /// The full best-ever ledger, one entry per completed generation.
    pub ledger: Vec<BestRecord>,
}

/// Drives the evolution of a population against a fitness function, with
/// durable per-generation persistence.
pub struct Solver<F: FitnessFunction> {
    options: SolverOptions,
    fitness_fun: F,
    store: CsvStore,
}

impl<F: FitnessFunction> Solver<F> {
    pub fn new(options: SolverOptions, fitness_fun: F, store: CsvStore) -> Self {
        Self {
            options,
            fitness_fun,
            store,
        }
    }

    pub fn options(&self) -> &SolverOptions {
        &self.options
    }

    /// Runs the configured number of generations and returns the best
    /// candidate ever recorded.
    ///
    /// # Errors
    ///
    /// - `Configuration` if the options are inconsistent; checked before any
    ///   evaluation or storage access.
    /// - `Evaluation` if the fitness function fails for any candidate; the
    ///   current generation is discarded, the previously persisted state
    ///   stays valid.
    /// - `Storage` if loading or saving the run state fails.
    pub fn run(&self, rng: &mut RandomNumberGenerator) -> Result<SolveReport> {
        self.options.validate()?;

        let num_params = self.options.get_num_params();
        let num_solutions = self.options.get_num_solutions();

        let (mut population, mut ledger) =
            match self.store.load(num_params, num_solutions)? {
                Some(state) => {
                    info!(
                        target = %self.store.path().display(),
                        completed_generations = state.ledger.len(),
                        "Resuming from persisted run state"
                    );
                    // Persisted fitness values are deliberately discarded:
                    // every generation is re-evaluated in full.
                    let population = state
                        .population
                        .into_iter()
                        .map(|candidate| Candidate::unevaluated(candidate.params))
                        .collect();
                    (population, state.ledger)
                }
                None => {
                    info!(
                        target = %self.store.path().display(),
                        "No persisted state found, seeding initial population"
                    );
                    let population =
                        init_population(self.options.get_param_ranges(), num_solutions, rng)?;
                    (population, Vec::new())
                }
            };

        let num_generations = self.options.get_num_generations();
        for step in 0..num_generations {
            let generation = ledger.len();
            info!(
                generation,
                step = step + 1,
                of = num_generations,
                "Running generation"
            );

            let scores = evaluate_batch(
                &population,
                &self.fitness_fun,
                self.options.get_parallel_threshold(),
            )?;
            let evaluated: Vec<Candidate> = population
                .into_iter()
                .zip(scores)
                .map(|(candidate, score)| Candidate::evaluated(candidate.params, score))
                .collect();

            let ranked = rank(evaluated)?;

            let best = &ranked[0];
            let best_fitness = best.fitness.unwrap_or(f64::INFINITY);
            let improved = ledger
                .iter()
                .map(|record| record.fitness)
                .all(|f| best_fitness < f);
            debug!(generation, best_fitness, improved, "Generation ranked");

            ledger.push(BestRecord {
                generation,
                params: best.params.clone(),
                fitness: best_fitness,
            });
            self.store.save(&ranked, &ledger)?;

            // The final generation ends at the persist; there is no
            // successor to breed for
            if step + 1 == num_generations {
                break;
            }

            let parents = select_parents(&ranked, self.options.get_num_parents())?;
            population = reproduce(
                &parents,
                num_solutions,
                self.options.get_param_ranges(),
                self.options.get_mutation_rate(),
                rng,
            )?;
        }

        // The ledger is non-empty here: num_generations is validated > 0
        let best_record = ledger
            .iter()
            .min_by(|a, b| a.fitness.total_cmp(&b.fitness))
            .cloned()
            .expect("ledger has one entry per completed generation");

        Ok(SolveReport {
            best: Candidate::evaluated(best_record.params, best_record.fitness),
            generations_run: num_generations,
            ledger,
        })
    }
}
