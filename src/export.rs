use crate::error::{TpResult, TransportError};
use crate::loader::EMPTY_TOKEN;
use crate::optimizer::{OptimizationResult, PivotReport, Termination};
use crate::problem::{Problem, Position, Table};
use serde::Serialize;
use std::fs::File;
use std::io::Write;
use std::path::Path;

/// Writes `table` in the solution-file layout, followed by its total cost.
/// The output loads back as an initial solution.
pub fn write_solution<W: Write>(
    writer: W,
    problem: &Problem,
    table: &Table,
    delimiter: u8,
) -> TpResult<()> {
    let mut wtr = csv::WriterBuilder::new()
        .delimiter(delimiter)
        .flexible(true)
        .from_writer(writer);

    let margins = problem.margins();
    let mut header = vec![margins.corner.clone()];
    header.extend(problem.destinations().iter().cloned());
    header.push(margins.supply.clone());
    wtr.write_record(&header)?;

    for (row, label) in problem.sources().iter().enumerate() {
        let mut record = vec![label.clone()];
        for col in 0..problem.cols() {
            let entry = match table.slot(Position::new(row, col)).quantity() {
                Some(q) => q.to_string(),
                None => EMPTY_TOKEN.to_string(),
            };
            record.push(entry);
        }
        record.push(problem.supply()[row].to_string());
        wtr.write_record(&record)?;
    }

    let mut demand = vec![margins.demand.clone()];
    demand.extend(problem.demand().iter().map(u64::to_string));
    wtr.write_record(&demand)?;

    let mut inner = wtr
        .into_inner()
        .map_err(|e| TransportError::Io(e.into_error()))?;
    writeln!(inner)?;
    writeln!(inner, "Total costs: {}", table.total_cost())?;
    inner.flush()?;
    Ok(())
}

pub fn write_solution_to_path<P: AsRef<Path>>(
    path: P,
    problem: &Problem,
    table: &Table,
    delimiter: u8,
) -> TpResult<()> {
    let file = File::create(path)?;
    write_solution(file, problem, table, delimiter)
}

#[derive(Debug, Clone, Serialize)]
pub struct AllocationEntry {
    pub source: String,
    pub destination: String,
    pub quantity: u64,
    pub unit_cost: u64,
}

/// Machine-readable outcome of a run.
#[derive(Debug, Clone, Serialize)]
pub struct Summary {
    pub termination: Termination,
    pub pivots: usize,
    pub initial_cost: u64,
    pub final_cost: u64,
    pub allocations: Vec<AllocationEntry>,
    pub history: Vec<PivotReport>,
}

impl Summary {
    pub fn new(problem: &Problem, result: &OptimizationResult) -> Self {
        let allocations = result
            .table
            .occupied()
            .map(|c| AllocationEntry {
                source: problem.sources()[c.pos.row].clone(),
                destination: problem.destinations()[c.pos.col].clone(),
                quantity: c.quantity,
                unit_cost: c.cost,
            })
            .collect();

        Self {
            termination: result.termination,
            pivots: result.pivots(),
            initial_cost: result.initial_cost,
            final_cost: result.final_cost,
            allocations,
            history: result.history.clone(),
        }
    }

    pub fn to_json(&self) -> TpResult<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}
