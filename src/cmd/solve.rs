use crate::reports;
use clap::Args;
use std::time::Instant;
use steppingstone::config::Config;
use steppingstone::error::TpResult;
use steppingstone::export::{self, Summary};
use steppingstone::optimizer::{OptimizationOptions, Optimizer, PivotReport, Termination};
use steppingstone::problem::{Problem, Table};
use tracing::{debug, info, warn};

#[derive(Args, Debug, Clone)]
pub struct SolveArgs {
    #[command(flatten)]
    pub config: Config,

    /// Write the optimized table to this file
    #[arg(short, long)]
    pub output: Option<String>,

    /// Print a JSON summary instead of tables
    #[arg(long, default_value_t = false)]
    pub json: bool,

    /// Also print every pivot that was applied
    #[arg(long, default_value_t = false)]
    pub history: bool,
}

pub fn run(args: SolveArgs, config: &Config, problem: &Problem, table: Table) -> TpResult<()> {
    let options = OptimizationOptions::from(config);
    if let Some(n) = options.num_threads {
        info!("🧵 Evaluating loops on {} worker threads", n);
    }

    let optimizer = Optimizer::new(options)?;
    let start = Instant::now();

    let callback = |iteration: usize, report: &PivotReport, table: &Table| {
        debug!(
            "Iteration {}: {} of {} cells occupied, cost {}",
            iteration,
            table.occupied_count(),
            table.basis_size(),
            table.total_cost()
        );
        if !report.stalled.is_empty() {
            debug!("Stalled cells: {:?}", report.stalled);
        }
        true
    };
    let result = optimizer.run(table, callback)?;
    info!("⏱️  Finished in {:.2?}", start.elapsed());

    if result.termination != Termination::Converged {
        warn!("⚠️  Stopped early ({}); table may not be optimal", result.termination);
    }

    if args.json {
        println!("{}", Summary::new(problem, &result).to_json()?);
    } else {
        println!("\n=== 🏆 FINAL RESULT ===");
        println!(
            "Pivots: {} | Initial cost: {} | Final cost: {}",
            result.pivots(),
            result.initial_cost,
            result.final_cost
        );
        reports::print_allocation("OPTIMIZED", problem, &result.table);
        if args.history {
            reports::print_history(problem, &result.history);
        }
    }

    if let Some(path) = &args.output {
        export::write_solution_to_path(path, problem, &result.table, config.input.delimiter_byte()?)?;
        info!("💾 Solution written to {}", path);
    }

    Ok(())
}
