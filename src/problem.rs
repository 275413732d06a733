use crate::error::{TpResult, TransportError};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Row-major coordinates of a cell: `row` indexes sources, `col` destinations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Position {
    pub row: usize,
    pub col: usize,
}

impl Position {
    pub const fn new(row: usize, col: usize) -> Self {
        Self { row, col }
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.row, self.col)
    }
}

/// An allocation: how much is shipped through a cell and what one unit costs there.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Cell {
    pub pos: Position,
    pub quantity: u64,
    pub cost: u64,
}

impl Cell {
    pub fn shares_row(&self, other: &Cell) -> bool {
        self.pos != other.pos && self.pos.row == other.pos.row
    }

    pub fn shares_col(&self, other: &Cell) -> bool {
        self.pos != other.pos && self.pos.col == other.pos.col
    }
}

/// A table slot. `Occupied` with quantity 0 is a basic cell carrying no flow,
/// which is not the same thing as `Empty`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Slot {
    #[default]
    Empty,
    Occupied(Cell),
}

impl Slot {
    pub fn is_occupied(&self) -> bool {
        matches!(self, Slot::Occupied(_))
    }

    pub fn cell(&self) -> Option<&Cell> {
        match self {
            Slot::Occupied(cell) => Some(cell),
            Slot::Empty => None,
        }
    }

    pub fn quantity(&self) -> Option<u64> {
        self.cell().map(|c| c.quantity)
    }
}

/// Labels of the header corner, the supply column and the demand row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MarginLabels {
    pub corner: String,
    pub supply: String,
    pub demand: String,
}

impl Default for MarginLabels {
    fn default() -> Self {
        Self {
            corner: "Source".into(),
            supply: "Supply".into(),
            demand: "Demand".into(),
        }
    }
}

/// Rejects instances whose arithmetic could leave the `i64` range.
///
/// With T = total supply and C = max(largest unit cost, 1), every quantity is at
/// most T and a loop has at most M+N cells, so requiring C * T * (M+N) <= i64::MAX
/// bounds total cost, marginal costs and per-pivot deltas.
fn check_magnitude(costs: &[Vec<u64>], supply: &[u64], demand: &[u64]) -> TpResult<()> {
    let too_large = |what: &str| {
        TransportError::Validation(format!(
            "{} too large: costs x quantities must stay within {}",
            what,
            i64::MAX
        ))
    };

    let total_supply = supply
        .iter()
        .try_fold(0u64, |acc, &s| acc.checked_add(s))
        .ok_or_else(|| too_large("Total supply"))?;
    demand
        .iter()
        .try_fold(0u64, |acc, &d| acc.checked_add(d))
        .ok_or_else(|| too_large("Total demand"))?;

    let max_cost = costs.iter().flatten().copied().max().unwrap_or(0).max(1);
    let span = (supply.len() + demand.len()) as u64;

    match max_cost
        .checked_mul(total_supply)
        .and_then(|v| v.checked_mul(span))
    {
        Some(bound) if bound <= i64::MAX as u64 => Ok(()),
        _ => Err(too_large(&format!(
            "Instance (largest cost {}, total supply {})",
            max_cost, total_supply
        ))),
    }
}

/// The immutable instance: cost matrix, supply per source, demand per destination.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Problem {
    costs: Vec<Vec<u64>>,
    supply: Vec<u64>,
    demand: Vec<u64>,
    sources: Vec<String>,
    destinations: Vec<String>,
    margins: MarginLabels,
}

impl Problem {
    pub fn new(costs: Vec<Vec<u64>>, supply: Vec<u64>, demand: Vec<u64>) -> TpResult<Self> {
        if supply.is_empty() || demand.is_empty() {
            return Err(TransportError::Validation(
                "Problem needs at least one source and one destination".into(),
            ));
        }
        if costs.len() != supply.len() {
            return Err(TransportError::Validation(format!(
                "Cost matrix has {} rows but there are {} sources",
                costs.len(),
                supply.len()
            )));
        }
        if let Some((i, row)) = costs
            .iter()
            .enumerate()
            .find(|(_, row)| row.len() != demand.len())
        {
            return Err(TransportError::Validation(format!(
                "Cost row {} has {} entries but there are {} destinations",
                i,
                row.len(),
                demand.len()
            )));
        }

        check_magnitude(&costs, &supply, &demand)?;

        let sources = (1..=supply.len()).map(|i| format!("Source{}", i)).collect();
        let destinations = (1..=demand.len()).map(|j| format!("Dest{}", j)).collect();

        Ok(Self {
            costs,
            supply,
            demand,
            sources,
            destinations,
            margins: MarginLabels::default(),
        })
    }

    pub fn with_labels(mut self, sources: Vec<String>, destinations: Vec<String>) -> TpResult<Self> {
        if sources.len() != self.rows() || destinations.len() != self.cols() {
            return Err(TransportError::Validation(format!(
                "Expected {} source and {} destination labels, got {} and {}",
                self.rows(),
                self.cols(),
                sources.len(),
                destinations.len()
            )));
        }
        self.sources = sources;
        self.destinations = destinations;
        Ok(self)
    }

    pub fn with_margins(mut self, margins: MarginLabels) -> Self {
        self.margins = margins;
        self
    }

    pub fn margins(&self) -> &MarginLabels {
        &self.margins
    }

    pub fn rows(&self) -> usize {
        self.supply.len()
    }

    pub fn cols(&self) -> usize {
        self.demand.len()
    }

    /// Number of occupied cells in a basic feasible solution.
    pub fn basis_size(&self) -> usize {
        self.rows() + self.cols() - 1
    }

    pub fn cost(&self, pos: Position) -> u64 {
        self.costs[pos.row][pos.col]
    }

    pub fn costs(&self) -> &[Vec<u64>] {
        &self.costs
    }

    pub fn supply(&self) -> &[u64] {
        &self.supply
    }

    pub fn demand(&self) -> &[u64] {
        &self.demand
    }

    pub fn sources(&self) -> &[String] {
        &self.sources
    }

    pub fn destinations(&self) -> &[String] {
        &self.destinations
    }

    pub fn is_balanced(&self) -> bool {
        self.supply.iter().sum::<u64>() == self.demand.iter().sum::<u64>()
    }
}

/// The allocation table mutated by the optimizer.
///
/// Slots and unit costs are stored flattened in row-major order. The table keeps
/// its own copy of the cost matrix so loop discovery and evaluation only need
/// a shared reference to it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Table {
    rows: usize,
    cols: usize,
    costs: Vec<u64>,
    slots: Vec<Slot>,
}

impl Table {
    /// Builds the initial table from `allocations[row][col]` (`None` = unallocated)
    /// and fails fast unless it is a basic feasible solution of `problem`.
    pub fn from_allocations(problem: &Problem, allocations: &[Vec<Option<u64>>]) -> TpResult<Self> {
        let (rows, cols) = (problem.rows(), problem.cols());
        if allocations.len() != rows {
            return Err(TransportError::Validation(format!(
                "Initial solution has {} rows, expected {}",
                allocations.len(),
                rows
            )));
        }

        let costs: Vec<u64> = problem.costs().iter().flatten().copied().collect();
        let mut slots = Vec::with_capacity(rows * cols);

        for (row, line) in allocations.iter().enumerate() {
            if line.len() != cols {
                return Err(TransportError::Validation(format!(
                    "Initial solution row {} has {} entries, expected {}",
                    row,
                    line.len(),
                    cols
                )));
            }
            for (col, entry) in line.iter().enumerate() {
                // Keeps row and column sums below the bound checked by Problem::new
                if let Some(quantity) = entry.filter(|&q| q > problem.supply()[row]) {
                    return Err(TransportError::Validation(format!(
                        "Cell {} holds {} but row {} only supplies {}",
                        Position::new(row, col),
                        quantity,
                        row,
                        problem.supply()[row]
                    )));
                }
                let slot = match entry {
                    Some(quantity) => Slot::Occupied(Cell {
                        pos: Position::new(row, col),
                        quantity: *quantity,
                        cost: costs[row * cols + col],
                    }),
                    None => Slot::Empty,
                };
                slots.push(slot);
            }
        }

        let table = Self {
            rows,
            cols,
            costs,
            slots,
        };
        table.check_basis()?;
        table.check_totals(problem)?;
        Ok(table)
    }

    #[inline(always)]
    fn index(&self, pos: Position) -> usize {
        debug_assert!(pos.row < self.rows && pos.col < self.cols);
        pos.row * self.cols + pos.col
    }

    pub fn rows(&self) -> usize {
        self.rows
    }

    pub fn cols(&self) -> usize {
        self.cols
    }

    pub fn basis_size(&self) -> usize {
        self.rows + self.cols - 1
    }

    pub fn cost(&self, pos: Position) -> u64 {
        self.costs[self.index(pos)]
    }

    pub fn slot(&self, pos: Position) -> &Slot {
        &self.slots[self.index(pos)]
    }

    pub(crate) fn set(&mut self, pos: Position, slot: Slot) {
        let idx = self.index(pos);
        self.slots[idx] = slot;
    }

    /// Occupied cells in row-major order.
    pub fn occupied(&self) -> impl Iterator<Item = &Cell> + '_ {
        self.slots.iter().filter_map(Slot::cell)
    }

    /// Unallocated positions in row-major order.
    pub fn empty_positions(&self) -> impl Iterator<Item = Position> + '_ {
        let cols = self.cols;
        self.slots
            .iter()
            .enumerate()
            .filter(|(_, s)| !s.is_occupied())
            .map(move |(i, _)| Position::new(i / cols, i % cols))
    }

    pub fn occupied_count(&self) -> usize {
        self.slots.iter().filter(|s| s.is_occupied()).count()
    }

    /// The M+N-1 precondition. Checked once when the table is built.
    pub fn check_basis(&self) -> TpResult<()> {
        let found = self.occupied_count();
        let expected = self.basis_size();
        if found != expected {
            return Err(TransportError::Degenerate { expected, found });
        }
        Ok(())
    }

    pub fn row_total(&self, row: usize) -> u64 {
        self.slots[row * self.cols..(row + 1) * self.cols]
            .iter()
            .filter_map(Slot::quantity)
            .sum()
    }

    pub fn col_total(&self, col: usize) -> u64 {
        (0..self.rows)
            .filter_map(|row| self.slot(Position::new(row, col)).quantity())
            .sum()
    }

    /// Verifies that every row ships its supply and every column receives its demand.
    pub fn check_totals(&self, problem: &Problem) -> TpResult<()> {
        for (row, &supply) in problem.supply().iter().enumerate() {
            let shipped = self.row_total(row);
            if shipped != supply {
                return Err(TransportError::Validation(format!(
                    "Row {} ships {} but its supply is {}",
                    row, shipped, supply
                )));
            }
        }
        for (col, &demand) in problem.demand().iter().enumerate() {
            let received = self.col_total(col);
            if received != demand {
                return Err(TransportError::Validation(format!(
                    "Column {} receives {} but its demand is {}",
                    col, received, demand
                )));
            }
        }
        Ok(())
    }

    /// Sum of quantity x unit cost over the occupied cells.
    pub fn total_cost(&self) -> u64 {
        self.occupied().map(|c| c.quantity * c.cost).sum()
    }

    /// Whether the occupied cells, read as edges between source and destination
    /// nodes, form a spanning tree. Diagnostic only; the optimizer relies on the
    /// count check alone.
    pub fn is_spanning_tree(&self) -> bool {
        if self.occupied_count() != self.basis_size() {
            return false;
        }
        let mut sets = DisjointSets::new(self.rows + self.cols);
        self.occupied()
            .all(|c| sets.union(c.pos.row, self.rows + c.pos.col))
    }

    pub fn to_allocations(&self) -> Vec<Vec<Option<u64>>> {
        self.slots
            .chunks(self.cols)
            .map(|row| row.iter().map(Slot::quantity).collect())
            .collect()
    }
}

struct DisjointSets {
    parent: Vec<usize>,
}

impl DisjointSets {
    fn new(n: usize) -> Self {
        Self {
            parent: (0..n).collect(),
        }
    }

    fn find(&mut self, mut x: usize) -> usize {
        while self.parent[x] != x {
            self.parent[x] = self.parent[self.parent[x]];
            x = self.parent[x];
        }
        x
    }

    /// Returns false when `a` and `b` were already connected.
    fn union(&mut self, a: usize, b: usize) -> bool {
        let (ra, rb) = (self.find(a), self.find(b));
        if ra == rb {
            return false;
        }
        self.parent[ra] = rb;
        true
    }
}
