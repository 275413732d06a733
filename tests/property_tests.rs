mod common;

use common::{assert_feasible, northwest_corner};
use proptest::prelude::*;
use std::sync::Mutex;
use steppingstone::optimizer::{
    evaluate_all, OptimizationOptions, Optimizer, PivotReport, Termination,
};
use steppingstone::problem::{Problem, Table};

// --- STRATEGIES ---

prop_compose! {
    /// Balanced instance: demand is a random split of the total supply.
    fn arb_instance()(m in 2usize..6, n in 2usize..6)(
        costs in proptest::collection::vec(proptest::collection::vec(0u64..30, n), m),
        supply in proptest::collection::vec(1u64..40, m),
        cuts in proptest::collection::vec(0u64..1000, n - 1),
    ) -> (Vec<Vec<u64>>, Vec<u64>, Vec<u64>) {
        let total: u64 = supply.iter().sum();
        let mut points: Vec<u64> = cuts.iter().map(|c| c * total / 1000).collect();
        points.push(0);
        points.push(total);
        points.sort_unstable();
        let demand = points.windows(2).map(|w| w[1] - w[0]).collect();
        (costs, supply, demand)
    }
}

fn setup((costs, supply, demand): (Vec<Vec<u64>>, Vec<u64>, Vec<u64>)) -> (Problem, Table) {
    let start = northwest_corner(&supply, &demand);
    let problem = Problem::new(costs, supply, demand).unwrap();
    let table = Table::from_allocations(&problem, &start).unwrap();
    (problem, table)
}

fn capped() -> Optimizer {
    Optimizer::new(OptimizationOptions {
        num_threads: Some(2),
        max_pivots: Some(200),
    })
    .unwrap()
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(200))]

    #[test]
    fn test_invariants_hold_after_every_pivot(instance in arb_instance()) {
        let (problem, table) = setup(instance);
        let costs = Mutex::new(vec![table.total_cost()]);

        let callback = |_: usize, report: &PivotReport, table: &Table| {
            assert_feasible(&problem, table);
            let mut costs = costs.lock().unwrap();
            let previous = *costs.last().unwrap();
            let current = table.total_cost();
            assert!(report.marginal_cost < 0);
            assert_eq!(current as i64 - previous as i64, report.cost_delta);
            if report.quantity > 0 {
                assert!(current < previous, "positive shift on a negative loop must lower cost");
            }
            costs.push(current);
            true
        };
        let result = capped().run(table, callback).unwrap();

        let costs = costs.into_inner().unwrap();
        prop_assert!(costs.windows(2).all(|w| w[1] <= w[0]));
        prop_assert_eq!(result.final_cost, *costs.last().unwrap());
        assert_feasible(&problem, &result.table);
    }

    #[test]
    fn test_converged_tables_have_no_negative_loop(instance in arb_instance()) {
        let (problem, table) = setup(instance);
        let result = capped().run(table, steppingstone::optimizer::NoProgress).unwrap();
        prop_assume!(result.termination == Termination::Converged);

        let candidates = evaluate_all(&result.table).unwrap();
        prop_assert!(candidates.iter().all(|c| c.cost >= 0));
        prop_assert!(result.table.is_spanning_tree());

        let again = capped().run(result.table.clone(), steppingstone::optimizer::NoProgress).unwrap();
        prop_assert_eq!(again.pivots(), 0);
        prop_assert_eq!(&again.table, &result.table);
        assert_feasible(&problem, &again.table);
    }

    #[test]
    fn test_every_empty_cell_has_a_loop(instance in arb_instance()) {
        let (_, table) = setup(instance);
        let candidates = evaluate_all(&table).unwrap();

        prop_assert_eq!(candidates.len(), table.empty_positions().count());
        for c in &candidates {
            prop_assert!(c.path.cells().len() >= 4 && c.path.cells().len() % 2 == 0);
            prop_assert!(c.path.cells()[1..].iter().all(|cell| table.slot(cell.pos).is_occupied()));
        }
    }
}
