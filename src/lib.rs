pub mod breeding;
pub mod error;
pub mod evolution;
pub mod fitness;
pub mod population;
pub mod rng;
pub mod selection;
pub mod store;

// Re-export commonly used types for convenience
pub use error::{Result, SolverError};
pub use evolution::{SolveReport, Solver, SolverOptions};
pub use fitness::FitnessFunction;
pub use population::{BestRecord, Candidate, ParamRange, RunState};
pub use store::CsvStore;
