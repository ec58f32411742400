//! # Population Store
//!
//! Durable, resumable persistence of the run state as two CSV tables inside
//! a snapshot directory under the storage target:
//!
//! - `snapshot-<n>/population.csv` holds the latest ranked generation, best
//!   first, columns `p0..p{k-1},fitness`.
//! - `snapshot-<n>/ledger.csv` holds the best-ever record, one row per
//!   completed generation, columns `generation,p0..p{k-1},fitness`.
//!
//! `<n>` is the number of completed generations the snapshot records. A save
//! writes both tables into a hidden staging directory and publishes them
//! with a single rename, so a failed save never touches the previous
//! snapshot, and a load can only ever observe a snapshot that was written as
//! one unit. On load the two tables are cross-checked against each other;
//! a snapshot whose population and ledger disagree is rejected rather than
//! returned as valid state. The store is the only component that translates
//! between the in-memory and on-disk forms.

use std::fs;
use std::path::{Path, PathBuf};

use tracing::info;

use crate::error::{Result, SolverError};
use crate::population::{BestRecord, Candidate, RunState};

const POPULATION_FILE: &str = "population.csv";
const LEDGER_FILE: &str = "ledger.csv";
const SNAPSHOT_PREFIX: &str = "snapshot-";
const STAGING_PREFIX: &str = ".staging-";

/// CSV-backed store for a single storage target.
///
/// Exactly one solver may use a target at a time; concurrent runs against
/// the same target are not supported.
#[derive(Debug, Clone)]
pub struct CsvStore {
    root: PathBuf,
}

impl CsvStore {
    /// Creates a store for the given target directory. Nothing is touched on
    /// disk until the first save.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { root: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.root
    }

    /// Loads the most recently persisted run state, or `None` if no prior
    /// run exists for this target.
    ///
    /// The newest snapshot must be internally consistent: both tables
    /// present, ledger length matching the snapshot index, and the ledger's
    /// last entry matching the population's rank-0 row. Anything else is a
    /// `Storage` error, never a silently mixed `RunState`.
    pub fn load(&self, num_params: usize, num_solutions: usize) -> Result<Option<RunState>> {
        let (index, snapshot) = match self.latest_snapshot()? {
            Some(found) => found,
            None => return Ok(None),
        };

        let population_path = snapshot.join(POPULATION_FILE);
        if !population_path.exists() {
            return Err(SolverError::Storage(format!(
                "Snapshot {} has no population table",
                snapshot.display()
            )));
        }
        let ledger_path = snapshot.join(LEDGER_FILE);
        if !ledger_path.exists() {
            return Err(SolverError::Storage(format!(
                "Snapshot {} has no ledger",
                snapshot.display()
            )));
        }

        let population = read_population(&population_path, num_params, num_solutions)?;
        let ledger = read_ledger(&ledger_path, num_params)?;

        if ledger.len() != index {
            return Err(SolverError::Storage(format!(
                "Snapshot {} records {} completed generations but its ledger has {} entries",
                snapshot.display(),
                index,
                ledger.len()
            )));
        }
        if let Some(last) = ledger.last() {
            let rank0 = &population[0];
            if rank0.params != last.params || rank0.fitness != Some(last.fitness) {
                return Err(SolverError::Storage(format!(
                    "Snapshot {} population and ledger disagree on the best candidate",
                    snapshot.display()
                )));
            }
        }

        info!(
            target = %self.root.display(),
            generations = ledger.len(),
            "Loaded persisted run state"
        );

        Ok(Some(RunState { population, ledger }))
    }

    /// Persists the ranked generation and the full ledger in one unit.
    ///
    /// Both tables are written into a staging directory and published with a
    /// single rename. The previous snapshot is removed only after the new
    /// one is live, so any failure along the way leaves the prior state
    /// loadable.
    pub fn save(&self, population: &[Candidate], ledger: &[BestRecord]) -> Result<()> {
        if population.is_empty() {
            return Err(SolverError::Storage(
                "Refusing to persist an empty generation".to_string(),
            ));
        }
        for (rank, candidate) in population.iter().enumerate() {
            if candidate.fitness.is_none() {
                return Err(SolverError::Storage(format!(
                    "Refusing to persist unevaluated candidate at rank {}",
                    rank
                )));
            }
        }
        let last = ledger.last().ok_or_else(|| {
            SolverError::Storage(
                "Refusing to persist a generation with an empty ledger".to_string(),
            )
        })?;
        if population[0].params != last.params || population[0].fitness != Some(last.fitness) {
            return Err(SolverError::Storage(
                "Ledger's last entry does not match the generation's best candidate".to_string(),
            ));
        }

        fs::create_dir_all(&self.root)?;

        let index = ledger.len();
        let num_params = population[0].params.len();
        let staging = self.root.join(format!("{}{}", STAGING_PREFIX, index));
        if staging.exists() {
            fs::remove_dir_all(&staging)?;
        }
        fs::create_dir_all(&staging)?;

        write_population(&staging.join(POPULATION_FILE), population, num_params)?;
        write_ledger(&staging.join(LEDGER_FILE), ledger, num_params)?;

        let snapshot = self.snapshot_dir(index);
        if snapshot.exists() {
            fs::remove_dir_all(&snapshot)?;
        }
        // Single-rename publication: the snapshot either exists in full or
        // not at all
        fs::rename(&staging, &snapshot)?;

        self.remove_stale(index)?;
        Ok(())
    }

    fn snapshot_dir(&self, index: usize) -> PathBuf {
        self.root.join(format!("{}{}", SNAPSHOT_PREFIX, index))
    }

    /// Finds the newest published snapshot, ignoring staging leftovers and
    /// anything that is not a snapshot directory.
    fn latest_snapshot(&self) -> Result<Option<(usize, PathBuf)>> {
        if !self.root.exists() {
            return Ok(None);
        }

        let mut latest: Option<(usize, PathBuf)> = None;
        for entry in fs::read_dir(&self.root)? {
            let entry = entry?;
            if !entry.file_type()?.is_dir() {
                continue;
            }
            let name = entry.file_name();
            let name = match name.to_str() {
                Some(name) => name,
                None => continue,
            };
            let index = match name
                .strip_prefix(SNAPSHOT_PREFIX)
                .and_then(|rest| rest.parse::<usize>().ok())
            {
                Some(index) => index,
                None => continue,
            };
            if latest.as_ref().map_or(true, |(best, _)| index > *best) {
                latest = Some((index, entry.path()));
            }
        }

        Ok(latest)
    }

    /// Removes snapshots older than `keep` and any staging leftovers. Runs
    /// only after the new snapshot is live.
    fn remove_stale(&self, keep: usize) -> Result<()> {
        for entry in fs::read_dir(&self.root)? {
            let entry = entry?;
            let name = entry.file_name();
            let name = match name.to_str() {
                Some(name) => name,
                None => continue,
            };
            let stale_snapshot = name
                .strip_prefix(SNAPSHOT_PREFIX)
                .and_then(|rest| rest.parse::<usize>().ok())
                .map_or(false, |index| index < keep);
            if stale_snapshot || name.starts_with(STAGING_PREFIX) {
                fs::remove_dir_all(entry.path())?;
            }
        }
        Ok(())
    }
}

fn read_population(
    path: &Path,
    num_params: usize,
    num_solutions: usize,
) -> Result<Vec<Candidate>> {
    let mut reader = csv::Reader::from_path(path)?;
    let mut population = Vec::with_capacity(num_solutions);

    for (row, record) in reader.records().enumerate() {
        let record = record?;
        if record.len() != num_params + 1 {
            return Err(SolverError::Storage(format!(
                "Population row {} has {} columns, expected {}",
                row,
                record.len(),
                num_params + 1
            )));
        }

        let mut values = parse_row(&record, path, row)?;
        let fitness = values.pop().unwrap_or_default();
        if !fitness.is_finite() {
            return Err(SolverError::Storage(format!(
                "Population row {} has non-finite fitness {}",
                row, fitness
            )));
        }
        population.push(Candidate::evaluated(values, fitness));
    }

    if population.len() != num_solutions {
        return Err(SolverError::Storage(format!(
            "Population table has {} rows, expected {}",
            population.len(),
            num_solutions
        )));
    }

    Ok(population)
}

fn read_ledger(path: &Path, num_params: usize) -> Result<Vec<BestRecord>> {
    let mut reader = csv::Reader::from_path(path)?;
    let mut ledger = Vec::new();

    for (row, record) in reader.records().enumerate() {
        let record = record?;
        if record.len() != num_params + 2 {
            return Err(SolverError::Storage(format!(
                "Ledger row {} has {} columns, expected {}",
                row,
                record.len(),
                num_params + 2
            )));
        }

        let generation: usize = record[0].parse().map_err(|_| {
            SolverError::Storage(format!(
                "Ledger row {} has invalid generation index '{}'",
                row, &record[0]
            ))
        })?;
        if generation != row {
            return Err(SolverError::Storage(format!(
                "Ledger row {} records generation {}, expected a contiguous ledger",
                row, generation
            )));
        }

        let tail = csv::StringRecord::from_iter(record.iter().skip(1));
        let mut values = parse_row(&tail, path, row)?;
        let fitness = values.pop().unwrap_or_default();
        if !fitness.is_finite() {
            return Err(SolverError::Storage(format!(
                "Ledger row {} has non-finite fitness {}",
                row, fitness
            )));
        }
        ledger.push(BestRecord {
            generation,
            params: values,
            fitness,
        });
    }

    Ok(ledger)
}

fn write_population(path: &Path, population: &[Candidate], num_params: usize) -> Result<()> {
    let mut writer = csv::Writer::from_path(path)?;
    writer.write_record(param_header(num_params).chain(["fitness".to_string()]))?;

    for candidate in population {
        let fitness = candidate.fitness.unwrap_or_default();
        writer.write_record(
            candidate
                .params
                .iter()
                .map(|v| v.to_string())
                .chain([fitness.to_string()]),
        )?;
    }

    writer.flush()?;
    Ok(())
}

fn write_ledger(path: &Path, ledger: &[BestRecord], num_params: usize) -> Result<()> {
    let mut writer = csv::Writer::from_path(path)?;
    writer.write_record(
        ["generation".to_string()]
            .into_iter()
            .chain(param_header(num_params))
            .chain(["fitness".to_string()]),
    )?;

    for record in ledger {
        writer.write_record(
            [record.generation.to_string()]
                .into_iter()
                .chain(record.params.iter().map(|v| v.to_string()))
                .chain([record.fitness.to_string()]),
        )?;
    }

    writer.flush()?;
    Ok(())
}

fn param_header(num_params: usize) -> impl Iterator<Item = String> {
    (0..num_params).map(|i| format!("p{}", i))
}

fn parse_row(record: &csv::StringRecord, path: &Path, row: usize) -> Result<Vec<f64>> {
    record
        .iter()
        .map(|field| {
            field.parse::<f64>().map_err(|_| {
                SolverError::Storage(format!(
                    "Invalid numeric value '{}' at row {} of {}",
                    field,
                    row,
                    path.display()
                ))
            })
        })
        .collect()
}
