mod common;

use common::{assert_feasible, build, optimal_2x2, staircase_3x3, X};
use std::sync::Mutex;
use steppingstone::error::TransportError;
use steppingstone::optimizer::pivot;
use steppingstone::optimizer::{
    optimize, search, Decision, NoProgress, OptimizationOptions, Optimizer, PivotReport, Termination,
};
use steppingstone::problem::{Position, Problem, Slot, Table};

#[test]
fn test_already_optimal_converges_without_pivots() {
    let (problem, table) = optimal_2x2();
    assert_eq!(table.total_cost(), 220);

    let result = optimize(table.clone()).unwrap();

    assert_eq!(result.termination, Termination::Converged);
    assert_eq!(result.pivots(), 0);
    assert_eq!(result.final_cost, 220);
    assert_eq!(result.table, table);
    assert_feasible(&problem, &result.table);
}

#[test]
fn test_single_improving_pivot() {
    let (problem, mut table) = staircase_3x3();
    let before = table.total_cost();
    assert_eq!(before, 205);

    let choice = match search(&table).unwrap() {
        Decision::Improve(choice) => choice,
        Decision::Optimal => panic!("expected an improving loop"),
    };
    assert_eq!(choice.entering(), Position::new(1, 2));
    assert_eq!(choice.cost, -3);
    assert_eq!(choice.quantity, 15);

    let report = pivot::apply(&mut table, &choice);

    assert_eq!(report.cost_delta, -45);
    assert_eq!(before - table.total_cost(), 45);
    assert_eq!(*table.slot(Position::new(1, 1)), Slot::Empty);
    assert_eq!(table.slot(Position::new(1, 2)).quantity(), Some(15));
    assert_eq!(table.slot(Position::new(2, 1)).quantity(), Some(25));
    assert_eq!(table.slot(Position::new(2, 2)).quantity(), Some(5));
    assert!(report.stalled.is_empty());
    assert_feasible(&problem, &table);
}

#[test]
fn test_driver_reaches_optimum() {
    let (problem, table) = staircase_3x3();
    let result = optimize(table).unwrap();

    assert_eq!(result.termination, Termination::Converged);
    assert_eq!(result.pivots(), 1);
    assert_eq!(result.initial_cost, 205);
    assert_eq!(result.final_cost, 160);
    assert_eq!(
        result.table.to_allocations(),
        vec![
            vec![Some(10), None, None],
            vec![Some(5), None, Some(15)],
            vec![None, Some(25), Some(5)],
        ]
    );
    assert!(result.table.is_spanning_tree());
    assert_feasible(&problem, &result.table);
}

#[test]
fn test_rerun_on_converged_table_is_noop() {
    let (_, table) = staircase_3x3();
    let first = optimize(table).unwrap();
    let second = optimize(first.table.clone()).unwrap();

    assert_eq!(second.pivots(), 0);
    assert_eq!(second.table, first.table);
    assert_eq!(second.final_cost, first.final_cost);
}

#[test]
fn test_missing_basic_cell_fails_before_solving() {
    let problem = Problem::new(vec![vec![4, 6], vec![8, 4]], vec![20, 30], vec![20, 30]).unwrap();
    let err = Table::from_allocations(&problem, &[vec![Some(20), None], vec![None, Some(30)]])
        .unwrap_err();

    assert!(matches!(
        err,
        TransportError::Degenerate {
            expected: 3,
            found: 2
        }
    ));
}

#[test]
fn test_explicit_zero_counts_as_occupied() {
    let (problem, table) = build(
        &[&[4, 6], &[8, 4]],
        &[20, 30],
        &[20, 30],
        &[&[Some(20), Some(0)], &[X, Some(30)]],
    );
    assert_eq!(table.occupied_count(), 3);
    assert_feasible(&problem, &table);
}

#[test]
fn test_degenerate_pivot_keeps_basis_size() {
    // Loop for (0,2): +(0,2) -(0,0) +(1,0) -(1,1) +(2,1) -(2,2).
    // (0,0) and (2,2) both hold 10, so shifting 10 zeroes two "-" cells.
    let (problem, table) = build(
        &[&[5, 5, 1], &[5, 5, 9], &[9, 5, 5]],
        &[10, 30, 20],
        &[20, 30, 10],
        &[
            &[Some(10), X, X],
            &[Some(10), Some(20), X],
            &[X, Some(10), Some(10)],
        ],
    );

    let mut reports: Vec<PivotReport> = Vec::new();
    let mut table = table;
    while let Decision::Improve(choice) = search(&table).unwrap() {
        let report = pivot::apply(&mut table, &choice);
        assert_feasible(&problem, &table);
        reports.push(report);
        assert!(reports.len() < 50, "pivoting did not settle");
    }

    let first = &reports[0];
    assert_eq!(first.entering, Position::new(0, 2));
    assert_eq!(first.leaving, Position::new(0, 0));
    assert_eq!(first.stalled, vec![Position::new(2, 2)]);
    assert!(table.is_spanning_tree());
}

#[test]
fn test_callback_sees_every_intermediate_table() {
    let (problem, table) = staircase_3x3();
    let seen = Mutex::new(Vec::new());

    let callback = |iteration: usize, report: &PivotReport, table: &Table| {
        assert_feasible(&problem, table);
        seen.lock().unwrap().push((iteration, report.entering, table.total_cost()));
        true
    };
    let result = Optimizer::new(OptimizationOptions::default())
        .unwrap()
        .run(table, callback)
        .unwrap();

    assert_eq!(result.termination, Termination::Converged);
    assert_eq!(
        seen.into_inner().unwrap(),
        vec![(1, Position::new(1, 2), 160)]
    );
}

#[test]
fn test_callback_can_abort() {
    let (_, table) = staircase_3x3();
    let result = Optimizer::new(OptimizationOptions::default())
        .unwrap()
        .run(table, |_: usize, _: &PivotReport, _: &Table| false)
        .unwrap();

    assert_eq!(result.termination, Termination::Aborted);
    assert_eq!(result.pivots(), 1);
}

#[test]
fn test_pivot_limit_stops_early() {
    let (_, table) = staircase_3x3();
    let options = OptimizationOptions {
        num_threads: Some(2),
        max_pivots: Some(0),
    };
    let result = Optimizer::new(options).unwrap().run(table.clone(), NoProgress).unwrap();

    assert_eq!(result.termination, Termination::PivotLimit);
    assert_eq!(result.pivots(), 0);
    assert_eq!(result.table, table);
}

#[test]
fn test_termination_names() {
    assert_eq!(Termination::PivotLimit.to_string(), "pivot_limit");
    assert_eq!("converged".parse::<Termination>().unwrap(), Termination::Converged);
}
