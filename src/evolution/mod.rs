pub mod options;
pub mod solver;

pub use options::{SolverOptions, SolverOptionsBuilder};
pub use solver::{SolveReport, Solver};
