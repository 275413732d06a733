use crate::reports;
use clap::Args;
use steppingstone::config::Config;
use steppingstone::error::TpResult;
use steppingstone::optimizer::{evaluate_all, select_best};
use steppingstone::problem::{Problem, Table};

#[derive(Args, Debug, Clone)]
pub struct ValidateArgs {
    #[command(flatten)]
    pub config: Config,
}

pub fn run(problem: &Problem, table: &Table) -> TpResult<()> {
    println!("\n🔎 === INITIAL SOLUTION AUDIT === 🔎");
    reports::print_allocation("INITIAL", problem, table);

    println!(
        "Occupied cells: {} / {} | Spanning tree: {}",
        table.occupied_count(),
        table.basis_size(),
        if table.is_spanning_tree() { "yes" } else { "NO" }
    );

    let candidates = evaluate_all(table)?;
    reports::print_marginal_costs(problem, &candidates);

    match select_best(candidates) {
        Some(best) => println!(
            "\n⚠️  Not optimal: entering {} (marginal cost {}) can shift {} and save {}",
            reports::cell_label(problem, best.entering()),
            best.cost,
            best.quantity,
            -best.cost_delta()
        ),
        None => println!("\n✅ No loop has a negative marginal cost: the solution is optimal."),
    }
    Ok(())
}
