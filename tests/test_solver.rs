use gensolve::{
    error::SolverError,
    evolution::{Solver, SolverOptions},
    population::{init_population, ParamRange},
    rng::RandomNumberGenerator,
    store::CsvStore,
};
use tempfile::tempdir;

fn init_tracing() {
    let _ = tracing_subscriber::fmt().with_test_writer().try_init();
}

fn sum_of_squares(params: &[f64]) -> f64 {
    params.iter().map(|x| x * x).sum()
}

fn sphere_options(num_generations: usize) -> SolverOptions {
    SolverOptions::builder()
        .num_generations(num_generations)
        .param_ranges(vec![ParamRange::new(-5.0, 5.0); 2])
        .num_solutions(10)
        .num_parents(4)
        .mutation_rate(0.1)
        .build()
}

#[test]
fn test_sphere_function_converges() {
    init_tracing();
    let dir = tempdir().unwrap();
    let store = CsvStore::new(dir.path().join("run"));
    let solver = Solver::new(sphere_options(20), sum_of_squares, store);
    let mut rng = RandomNumberGenerator::from_seed(42);

    let report = solver.run(&mut rng).unwrap();

    assert_eq!(report.generations_run, 20);
    assert_eq!(report.ledger.len(), 20);

    // Elitism: the recorded best never regresses
    for window in report.ledger.windows(2) {
        assert!(window[1].fitness <= window[0].fitness);
    }

    // And the run actually made progress from the random seed population
    let first = report.ledger.first().unwrap().fitness;
    let last = report.ledger.last().unwrap().fitness;
    assert!(last < first);
    assert_eq!(report.best.fitness, Some(last));
}

#[test]
fn test_single_parent_fails_before_any_evaluation() {
    let dir = tempdir().unwrap();
    let store = CsvStore::new(dir.path().join("run"));
    let options = SolverOptions::builder()
        .num_generations(5)
        .param_ranges(vec![ParamRange::new(-5.0, 5.0); 2])
        .num_solutions(10)
        .num_parents(1)
        .build();

    // An objective that must never be called
    let untouchable = |_: &[f64]| -> f64 { panic!("objective should not be evaluated") };
    let solver = Solver::new(options, untouchable, store);
    let mut rng = RandomNumberGenerator::from_seed(1);

    match solver.run(&mut rng) {
        Err(SolverError::Configuration(msg)) => {
            assert!(msg.contains("At least two parents"));
        }
        _ => panic!("Expected Configuration error"),
    }

    // Nothing was persisted either
    let store = CsvStore::new(dir.path().join("run"));
    assert!(store.load(2, 10).unwrap().is_none());
}

#[test]
fn test_more_parents_than_solutions_fails() {
    let dir = tempdir().unwrap();
    let store = CsvStore::new(dir.path().join("run"));
    let options = SolverOptions::builder()
        .num_generations(5)
        .param_ranges(vec![ParamRange::new(-5.0, 5.0); 2])
        .num_solutions(4)
        .num_parents(8)
        .build();

    let untouchable = |_: &[f64]| -> f64 { panic!("objective should not be evaluated") };
    let solver = Solver::new(options, untouchable, store);
    let mut rng = RandomNumberGenerator::from_seed(1);

    assert!(matches!(
        solver.run(&mut rng),
        Err(SolverError::Configuration(_))
    ));
}

#[test]
fn test_fixed_seed_runs_are_identical() {
    let dir_a = tempdir().unwrap();
    let dir_b = tempdir().unwrap();

    let run = |dir: &std::path::Path| {
        let store = CsvStore::new(dir.join("run"));
        let solver = Solver::new(sphere_options(10), sum_of_squares, store);
        let mut rng = RandomNumberGenerator::from_seed(7);
        solver.run(&mut rng).unwrap()
    };

    let report_a = run(dir_a.path());
    let report_b = run(dir_b.path());

    assert_eq!(report_a.ledger, report_b.ledger);
    assert_eq!(report_a.best, report_b.best);

    // The persisted states must match bit for bit too
    let state_a = CsvStore::new(dir_a.path().join("run"))
        .load(2, 10)
        .unwrap()
        .unwrap();
    let state_b = CsvStore::new(dir_b.path().join("run"))
        .load(2, 10)
        .unwrap()
        .unwrap();
    assert_eq!(state_a, state_b);
}

#[test]
fn test_resumed_run_extends_the_ledger() {
    init_tracing();
    let dir = tempdir().unwrap();
    let target = dir.path().join("run");

    let first = Solver::new(
        sphere_options(5),
        sum_of_squares,
        CsvStore::new(&target),
    );
    let mut rng = RandomNumberGenerator::from_seed(21);
    let report = first.run(&mut rng).unwrap();
    assert_eq!(report.ledger.len(), 5);

    let second = Solver::new(
        sphere_options(5),
        sum_of_squares,
        CsvStore::new(&target),
    );
    let report = second.run(&mut rng).unwrap();

    assert_eq!(report.generations_run, 5);
    assert_eq!(report.ledger.len(), 10);
    for (index, record) in report.ledger.iter().enumerate() {
        assert_eq!(record.generation, index);
    }
    // Still non-increasing across the resume boundary
    for window in report.ledger.windows(2) {
        assert!(window[1].fitness <= window[0].fitness);
    }
}

#[test]
fn test_final_generation_consumes_no_breeding_randomness() {
    let dir = tempdir().unwrap();
    let store = CsvStore::new(dir.path().join("run"));
    let solver = Solver::new(sphere_options(1), sum_of_squares, store);
    let mut rng = RandomNumberGenerator::from_seed(42);

    solver.run(&mut rng).unwrap();

    // A single-generation run only seeds the population; once the final
    // generation is persisted no further randomness is drawn, so the RNG
    // stream matches one that stopped at seeding
    let mut reference = RandomNumberGenerator::from_seed(42);
    let ranges = vec![ParamRange::new(-5.0, 5.0); 2];
    init_population(&ranges, 10, &mut reference).unwrap();

    assert_eq!(
        rng.fetch_uniform(0.0, 1.0, 4),
        reference.fetch_uniform(0.0, 1.0, 4)
    );
}

#[test]
fn test_every_persisted_coordinate_stays_in_range() {
    let dir = tempdir().unwrap();
    let store = CsvStore::new(dir.path().join("run"));
    let ranges = vec![ParamRange::new(-5.0, 5.0), ParamRange::new(0.0, 2.0)];
    let options = SolverOptions::builder()
        .num_generations(15)
        .param_ranges(ranges.clone())
        .num_solutions(8)
        .num_parents(3)
        .mutation_rate(0.4)
        .build();

    let solver = Solver::new(options, sum_of_squares, store);
    let mut rng = RandomNumberGenerator::from_seed(5);
    solver.run(&mut rng).unwrap();

    let state = CsvStore::new(dir.path().join("run"))
        .load(2, 8)
        .unwrap()
        .unwrap();
    for candidate in &state.population {
        for (value, range) in candidate.params.iter().zip(ranges.iter()) {
            assert!(range.contains(*value));
        }
    }
    for record in &state.ledger {
        for (value, range) in record.params.iter().zip(ranges.iter()) {
            assert!(range.contains(*value));
        }
    }
}
