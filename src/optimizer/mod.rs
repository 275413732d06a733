pub mod cycle;
pub mod marginal;
pub mod pivot;
pub mod runner;
pub mod search;

pub use self::cycle::{find_loop, ClosedLoop, Sign};
pub use self::marginal::{evaluate, MarginalCost};
pub use self::pivot::PivotReport;
pub use self::runner::{
    optimize, NoProgress, OptimizationOptions, OptimizationResult, Optimizer, ProgressCallback,
    State, Termination,
};
pub use self::search::{evaluate_all, search, select_best, Decision};
