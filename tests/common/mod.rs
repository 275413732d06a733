#![allow(dead_code)] // Not every test binary uses every helper

use steppingstone::problem::{Problem, Table};

/// Unallocated cell in allocation literals.
pub const X: Option<u64> = None;

pub fn build(
    costs: &[&[u64]],
    supply: &[u64],
    demand: &[u64],
    alloc: &[&[Option<u64>]],
) -> (Problem, Table) {
    let problem = Problem::new(
        costs.iter().map(|r| r.to_vec()).collect(),
        supply.to_vec(),
        demand.to_vec(),
    )
    .expect("valid problem");
    let allocations: Vec<Vec<Option<u64>>> = alloc.iter().map(|r| r.to_vec()).collect();
    let table = Table::from_allocations(&problem, &allocations).expect("valid initial table");
    (problem, table)
}

/// 2x2 instance whose initial table is already optimal (cost 220).
pub fn optimal_2x2() -> (Problem, Table) {
    build(
        &[&[4, 6], &[8, 4]],
        &[20, 30],
        &[25, 25],
        &[&[Some(20), X], &[Some(5), Some(25)]],
    )
}

/// 3x3 staircase start (cost 205). Empty-cell marginal costs:
/// (0,1) = +3, (0,2) = +3, (1,2) = -3, (2,0) = +4.
/// Pivoting (1,2) shifts 15, empties (1,1) and reaches the optimum (cost 160).
pub fn staircase_3x3() -> (Problem, Table) {
    build(
        &[&[1, 5, 6], &[2, 3, 1], &[7, 4, 5]],
        &[10, 20, 30],
        &[15, 25, 20],
        &[
            &[Some(10), X, X],
            &[Some(5), Some(15), X],
            &[X, Some(10), Some(20)],
        ],
    )
}

/// Northwest-corner start that always has exactly M+N-1 occupied cells:
/// when a row and a column run out together, a zero is placed below.
pub fn northwest_corner(supply: &[u64], demand: &[u64]) -> Vec<Vec<Option<u64>>> {
    let (m, n) = (supply.len(), demand.len());
    let mut s = supply.to_vec();
    let mut d = demand.to_vec();
    let mut grid = vec![vec![None; n]; m];
    let (mut i, mut j) = (0, 0);

    while i < m && j < n {
        let q = s[i].min(d[j]);
        grid[i][j] = Some(q);
        s[i] -= q;
        d[j] -= q;
        if i == m - 1 && j == n - 1 {
            break;
        }
        if s[i] == 0 && i < m - 1 {
            i += 1;
        } else {
            j += 1;
        }
    }
    grid
}

pub fn assert_feasible(problem: &Problem, table: &Table) {
    assert_eq!(
        table.occupied_count(),
        problem.basis_size(),
        "occupied count drifted from M+N-1"
    );
    for (row, &s) in problem.supply().iter().enumerate() {
        assert_eq!(table.row_total(row), s, "row {} does not ship its supply", row);
    }
    for (col, &d) in problem.demand().iter().enumerate() {
        assert_eq!(table.col_total(col), d, "column {} does not receive its demand", col);
    }
}
