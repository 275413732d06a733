use crate::error::{TpResult, TransportError};
use crate::problem::{Cell, Position, Table};
use serde::Serialize;
use strum_macros::Display;
use tracing::debug;

/// Direction of flow change at a loop position: even indices gain, odd indices give up.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, Serialize)]
pub enum Sign {
    #[strum(serialize = "+")]
    Plus,
    #[strum(serialize = "-")]
    Minus,
}

impl Sign {
    pub fn at(index: usize) -> Self {
        if index % 2 == 0 {
            Sign::Plus
        } else {
            Sign::Minus
        }
    }
}

/// A closed stepping-stone path. The first cell is the unallocated (entering)
/// cell; consecutive cells alternately share a row and a column, and the last
/// cell shares a column with the first.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ClosedLoop {
    cells: Vec<Cell>,
}

impl ClosedLoop {
    pub fn cells(&self) -> &[Cell] {
        &self.cells
    }

    pub fn entering(&self) -> &Cell {
        &self.cells[0]
    }

    pub fn signed(&self) -> impl Iterator<Item = (Sign, &Cell)> + '_ {
        self.cells.iter().enumerate().map(|(i, c)| (Sign::at(i), c))
    }

    pub fn positions(&self) -> Vec<Position> {
        self.cells.iter().map(|c| c.pos).collect()
    }
}

/// Finds the unique closed loop through the unallocated cell at `start`.
///
/// The candidate is added to the occupied cells, then every cell lacking a row
/// partner or a column partner is discarded until nothing changes. On a
/// spanning-tree table the survivors are exactly the loop, which is then
/// walked from the candidate: row partner first, column partner next, and so on.
pub fn find_loop(table: &Table, start: Position) -> TpResult<ClosedLoop> {
    if table.slot(start).is_occupied() {
        return Err(TransportError::structure(
            start,
            "loop requested for an occupied cell",
        ));
    }

    let candidate = Cell {
        pos: start,
        quantity: 0,
        cost: table.cost(start),
    };

    // Row-major throughout, so partner lookup is a row-major scan.
    let mut survivors: Vec<Cell> = table.occupied().copied().collect();
    let at = survivors.partition_point(|c| c.pos < start);
    survivors.insert(at, candidate);

    loop {
        let before = survivors.len();
        let kept: Vec<Cell> = survivors
            .iter()
            .filter(|c| row_partner(c, &survivors).is_some() && col_partner(c, &survivors).is_some())
            .copied()
            .collect();
        survivors = kept;
        if survivors.len() == before {
            break;
        }
    }

    if !survivors.iter().any(|c| c.pos == start) {
        return Err(TransportError::structure(
            start,
            "no closed loop through this cell; occupied cells are not connected",
        ));
    }
    if survivors.len() < 4 || survivors.len() % 2 != 0 {
        return Err(TransportError::structure(
            start,
            format!("pruning left {} cells, not a simple loop", survivors.len()),
        ));
    }

    let mut path: Vec<Cell> = Vec::with_capacity(survivors.len());
    let mut current = candidate;
    for step in 0..survivors.len() {
        if path.iter().any(|c| c.pos == current.pos) {
            return Err(TransportError::structure(
                start,
                format!(
                    "walk revisited {} after {} of {} cells; occupied cells contain more than one cycle",
                    current.pos,
                    step,
                    survivors.len()
                ),
            ));
        }
        path.push(current);

        let next = if step % 2 == 0 {
            row_partner(&current, &survivors)
        } else {
            col_partner(&current, &survivors)
        };
        current = *next.ok_or_else(|| {
            TransportError::structure(start, format!("walk stuck at {}", current.pos))
        })?;
    }

    if current.pos != start {
        return Err(TransportError::structure(
            start,
            format!("walk ended at {} instead of closing", current.pos),
        ));
    }

    debug!("Loop for {}: {} cells", start, path.len());
    Ok(ClosedLoop { cells: path })
}

fn row_partner<'a>(cell: &Cell, set: &'a [Cell]) -> Option<&'a Cell> {
    set.iter().find(|other| cell.shares_row(other))
}

fn col_partner<'a>(cell: &Cell, set: &'a [Cell]) -> Option<&'a Cell> {
    set.iter().find(|other| cell.shares_col(other))
}
