use super::cycle::{ClosedLoop, Sign};
use crate::error::{TpResult, TransportError};
use crate::problem::{Cell, Position};
use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MarginalCost {
    /// Net unit-cost change of shifting one unit around the loop.
    pub cost: i64,
    /// Largest quantity that can be shifted before a "-" cell goes negative.
    pub quantity: u64,
    /// The "-" cell that empties out if this loop is pivoted.
    pub leaving: Cell,
    pub path: ClosedLoop,
}

impl MarginalCost {
    pub fn entering(&self) -> Position {
        self.path.entering().pos
    }

    pub fn is_improving(&self) -> bool {
        self.cost < 0
    }

    /// Change in total cost when the full `quantity` is shifted.
    pub fn cost_delta(&self) -> i64 {
        self.cost * self.quantity as i64
    }
}

/// Signed cost of a loop plus its bottleneck "-" cell (first one in loop order on ties).
pub fn evaluate(path: ClosedLoop) -> TpResult<MarginalCost> {
    let mut cost: i64 = 0;
    let mut leaving: Option<Cell> = None;

    for (sign, cell) in path.signed() {
        match sign {
            Sign::Plus => cost += cell.cost as i64,
            Sign::Minus => {
                cost -= cell.cost as i64;
                if leaving.map_or(true, |l| cell.quantity < l.quantity) {
                    leaving = Some(*cell);
                }
            }
        }
    }

    let leaving = leaving.ok_or_else(|| {
        TransportError::structure(path.entering().pos, "loop has no leaving cell")
    })?;

    Ok(MarginalCost {
        cost,
        quantity: leaving.quantity,
        leaving,
        path,
    })
}
