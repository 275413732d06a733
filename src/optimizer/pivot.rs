use super::cycle::Sign;
use super::marginal::MarginalCost;
use crate::problem::{Cell, Position, Slot, Table};
use serde::Serialize;
use tracing::{debug, warn};

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PivotReport {
    pub entering: Position,
    pub leaving: Position,
    pub quantity: u64,
    pub marginal_cost: i64,
    pub cost_delta: i64,
    pub loop_len: usize,
    /// Other "-" cells that hit zero and were kept as zero-quantity basic cells.
    pub stalled: Vec<Position>,
}

/// Shifts `choice.quantity` around the chosen loop.
///
/// New slot values are computed for the whole loop before anything is written
/// back. Only the leaving cell becomes `Empty`; the entering cell always becomes
/// `Occupied`, so the occupied count stays at M+N-1 even for degenerate pivots.
pub fn apply(table: &mut Table, choice: &MarginalCost) -> PivotReport {
    let w = choice.quantity;
    let leaving = choice.leaving.pos;
    let mut stalled = Vec::new();

    let updates: Vec<(Position, Slot)> = choice
        .path
        .signed()
        .map(|(sign, cell)| {
            let quantity = match sign {
                Sign::Plus => cell.quantity + w,
                Sign::Minus => {
                    debug_assert!(cell.quantity >= w);
                    cell.quantity - w
                }
            };
            let slot = if cell.pos == leaving {
                Slot::Empty
            } else {
                if sign == Sign::Minus && quantity == 0 {
                    stalled.push(cell.pos);
                }
                Slot::Occupied(Cell { quantity, ..*cell })
            };
            (cell.pos, slot)
        })
        .collect();

    for (pos, slot) in updates {
        table.set(pos, slot);
    }
    debug_assert_eq!(table.occupied_count(), table.basis_size());

    if !stalled.is_empty() {
        warn!(
            "Degenerate pivot at {}: {} other cell(s) reached zero and stay basic",
            choice.entering(),
            stalled.len()
        );
    }
    debug!(
        "Pivot {} -> {}: shifted {} around {} cells",
        choice.entering(),
        leaving,
        w,
        choice.path.cells().len()
    );

    PivotReport {
        entering: choice.entering(),
        leaving,
        quantity: w,
        marginal_cost: choice.cost,
        cost_delta: choice.cost_delta(),
        loop_len: choice.path.cells().len(),
        stalled,
    }
}
