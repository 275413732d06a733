use clap::{CommandFactory, FromArgMatches, Parser, Subcommand};
use steppingstone::config::Config;
use steppingstone::error::TpResult;
use steppingstone::loader;
use std::process;
use tracing::{error, info, Level};

mod cmd;
mod reports;

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    #[arg(global = true, short, long, default_value = "data/problem.txt")]
    problem: String,

    #[arg(global = true, short, long, default_value = "data/solution.txt")]
    solution: String,

    /// JSON file with solver and input settings
    #[arg(global = true, long)]
    config: Option<String>,

    #[arg(global = true, long, default_value_t = false)]
    debug: bool,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Optimize the initial solution
    Solve(cmd::solve::SolveArgs),
    /// Check the initial solution and print every loop's marginal cost
    Validate(cmd::validate::ValidateArgs),
}

fn main() {
    let matches = Cli::command().get_matches();
    let cli = Cli::from_arg_matches(&matches).unwrap_or_else(|e| e.exit());

    let level = if cli.debug { Level::DEBUG } else { Level::INFO };
    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    if let Err(e) = run(cli, &matches) {
        error!("❌ FATAL: {}", e);
        process::exit(1);
    }
}

fn run(cli: Cli, matches: &clap::ArgMatches) -> TpResult<()> {
    // Arguments like --max-pivots live inside the subcommand's matches, not the root.
    let (cli_config, sub_matches) = match &cli.command {
        Commands::Solve(args) => (&args.config, matches.subcommand_matches("solve")),
        Commands::Validate(args) => (&args.config, matches.subcommand_matches("validate")),
    };

    let config = match (&cli.config, sub_matches) {
        (Some(path), Some(sub)) => {
            info!("⚙️  Loading config from: {}", path);
            let mut file_config = Config::load_from_file(path)?;
            file_config.merge_from_cli(cli_config, sub);
            file_config
        }
        _ => cli_config.clone(),
    };

    let delimiter = config.input.delimiter_byte()?;

    info!("📂 Loading problem: {}", cli.problem);
    let problem = loader::load_problem_from_path(&cli.problem, delimiter)?;

    info!("📂 Loading initial solution: {}", cli.solution);
    let table = loader::load_solution_from_path(&cli.solution, &problem, delimiter)?;

    match cli.command {
        Commands::Solve(args) => cmd::solve::run(args, &config, &problem, table),
        Commands::Validate(_) => cmd::validate::run(&problem, &table),
    }
}
