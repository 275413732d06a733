use super::pivot::{self, PivotReport};
use super::search::{self, Decision};
use crate::config::Config;
use crate::error::{TpResult, TransportError};
use crate::problem::Table;
use serde::Serialize;
use strum_macros::{Display, EnumString};
use tracing::{info, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
pub enum State {
    Searching,
    Converged,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, EnumString, Serialize)]
#[strum(serialize_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum Termination {
    /// No loop with negative marginal cost remains.
    Converged,
    /// `max_pivots` was reached first.
    PivotLimit,
    /// The progress callback asked to stop.
    Aborted,
}

#[derive(Debug, Clone, Default)]
pub struct OptimizationOptions {
    pub num_threads: Option<usize>,
    pub max_pivots: Option<usize>,
}

impl From<&Config> for OptimizationOptions {
    fn from(cfg: &Config) -> Self {
        Self {
            num_threads: cfg.solver.threads,
            max_pivots: cfg.solver.max_pivots,
        }
    }
}

#[derive(Debug, Clone)]
pub struct OptimizationResult {
    pub table: Table,
    pub termination: Termination,
    pub initial_cost: u64,
    pub final_cost: u64,
    pub history: Vec<PivotReport>,
}

impl OptimizationResult {
    pub fn pivots(&self) -> usize {
        self.history.len()
    }
}

/// A trait for receiving updates after every accepted pivot.
/// Boolean return value indicates if the search should continue (true) or abort (false).
pub trait ProgressCallback: Send + Sync {
    fn on_pivot(&self, iteration: usize, report: &PivotReport, table: &Table) -> bool;
}

impl<F> ProgressCallback for F
where
    F: Fn(usize, &PivotReport, &Table) -> bool + Send + Sync,
{
    fn on_pivot(&self, iteration: usize, report: &PivotReport, table: &Table) -> bool {
        self(iteration, report, table)
    }
}

pub struct NoProgress;

impl ProgressCallback for NoProgress {
    fn on_pivot(&self, _: usize, _: &PivotReport, _: &Table) -> bool {
        true
    }
}

pub struct Optimizer {
    options: OptimizationOptions,
    pool: Option<rayon::ThreadPool>,
}

impl Optimizer {
    pub fn new(options: OptimizationOptions) -> TpResult<Self> {
        let pool = match options.num_threads {
            Some(n) => Some(
                rayon::ThreadPoolBuilder::new()
                    .num_threads(n)
                    .build()
                    .map_err(|e| TransportError::Config(format!("Thread pool: {}", e)))?,
            ),
            None => None,
        };
        Ok(Self { options, pool })
    }

    /// Runs stepping-stone iterations on `table` until no improving loop remains.
    pub fn run<CB: ProgressCallback>(&self, mut table: Table, callback: CB) -> TpResult<OptimizationResult> {
        let initial_cost = table.total_cost();
        let mut history: Vec<PivotReport> = Vec::new();
        let mut state = State::Searching;

        info!(
            "🔍 Stepping-stone search on {}x{} table (cost {})",
            table.rows(),
            table.cols(),
            initial_cost
        );

        let termination = loop {
            if state == State::Converged {
                break Termination::Converged;
            }

            if let Some(limit) = self.options.max_pivots {
                if history.len() >= limit {
                    warn!("⚠️  Pivot limit {} reached before convergence", limit);
                    break Termination::PivotLimit;
                }
            }

            match self.search(&table)? {
                Decision::Optimal => state = State::Converged,
                Decision::Improve(choice) => {
                    let report = pivot::apply(&mut table, &choice);
                    let iteration = history.len() + 1;
                    info!(
                        "Pivot #{}: enter {} leave {} | shift {} x {} | cost {}",
                        iteration,
                        report.entering,
                        report.leaving,
                        report.quantity,
                        report.marginal_cost,
                        table.total_cost()
                    );

                    let keep_going = callback.on_pivot(iteration, &report, &table);
                    history.push(report);
                    if !keep_going {
                        break Termination::Aborted;
                    }
                }
            }
        };

        let final_cost = table.total_cost();
        info!(
            "✅ {} after {} pivot(s): cost {} -> {}",
            termination,
            history.len(),
            initial_cost,
            final_cost
        );

        Ok(OptimizationResult {
            table,
            termination,
            initial_cost,
            final_cost,
            history,
        })
    }

    fn search(&self, table: &Table) -> TpResult<Decision> {
        match &self.pool {
            Some(pool) => pool.install(|| search::search(table)),
            None => search::search(table),
        }
    }
}

/// Optimizes with default options on rayon's global pool.
pub fn optimize(table: Table) -> TpResult<OptimizationResult> {
    Optimizer::new(OptimizationOptions::default())?.run(table, NoProgress)
}
