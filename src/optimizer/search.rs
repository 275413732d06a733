use super::cycle::find_loop;
use super::marginal::{evaluate, MarginalCost};
use crate::error::TpResult;
use crate::problem::{Position, Table};
use rayon::prelude::*;
use tracing::debug;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Decision {
    Improve(MarginalCost),
    Optimal,
}

/// Loop discovery and evaluation for a single unallocated cell.
pub fn evaluate_cell(table: &Table, pos: Position) -> TpResult<MarginalCost> {
    find_loop(table, pos).and_then(evaluate)
}

/// Evaluates every unallocated cell in parallel.
///
/// Workers only read `table`. The collect is the barrier: it returns once all
/// of them are done, in row-major order of the entering cell, or the first
/// structural error encountered.
pub fn evaluate_all(table: &Table) -> TpResult<Vec<MarginalCost>> {
    let empties: Vec<Position> = table.empty_positions().collect();
    empties
        .par_iter()
        .map(|&pos| evaluate_cell(table, pos))
        .collect()
}

/// Most negative marginal cost; ties go to the earliest candidate.
pub fn select_best(candidates: Vec<MarginalCost>) -> Option<MarginalCost> {
    candidates
        .into_iter()
        .filter(|c| c.is_improving())
        .fold(None, |best, c| match best {
            Some(b) if b.cost <= c.cost => Some(b),
            _ => Some(c),
        })
}

pub fn search(table: &Table) -> TpResult<Decision> {
    let candidates = evaluate_all(table)?;
    debug!("Evaluated {} empty cells", candidates.len());

    Ok(match select_best(candidates) {
        Some(best) => Decision::Improve(best),
        None => Decision::Optimal,
    })
}
