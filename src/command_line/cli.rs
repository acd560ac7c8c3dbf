#![allow(clippy::cast_precision_loss)]

use clap::{Args, Parser, Subcommand};
use square_solver::square::assignment::Assignment;
use square_solver::square::configs::SearchConfig;
use square_solver::square::error::Result;
use square_solver::square::expr::Division;
use square_solver::square::layout::{CELLS, Layout};
use square_solver::square::search::{SearchOutcome, SearchStats};
use square_solver::square::solver::{Solver, SolverType};
use tikv_jemalloc_ctl::{epoch, stats};
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

/// Defines the command-line interface for the square solver.
///
/// Uses `clap` for parsing arguments.
#[derive(Parser, Debug)]
#[command(
    name = "square-solver",
    version,
    about = "Solves the 4x4 arithmetic square puzzle"
)]
pub(crate) struct Cli {
    /// Specifies the subcommand to execute. Without one the puzzle is solved.
    #[clap(subcommand)]
    pub command: Option<Commands>,

    /// Common options applicable when no subcommand is given.
    #[command(flatten)]
    pub common: CommonOptions,
}

/// Enumerates the available subcommands.
#[derive(Subcommand, Debug)]
pub(crate) enum Commands {
    /// Search for every solution of the puzzle.
    Solve {
        /// Common options for this subcommand.
        #[command(flatten)]
        common: CommonOptions,
    },

    /// Check one assignment against the eight equations.
    Verify {
        /// The sixteen values, cell 0 through cell 15.
        #[arg(required = true, num_args = CELLS)]
        values: Vec<u8>,

        /// How `/` treats inexact quotients.
        #[arg(long, value_enum, default_value_t = Division::Truncating)]
        division: Division,
    },

    /// Generate shell completion scripts.
    Completions {
        /// The shell to generate completions for.
        #[arg(value_enum)]
        shell: clap_complete::Shell,
    },
}

/// Defines options shared by the search commands.
#[derive(Args, Debug, Default, Clone)]
pub(crate) struct CommonOptions {
    /// Enable debug output: the layout, and every solution as it is found.
    #[arg(short, long, default_value_t = false)]
    pub(crate) debug: bool,

    /// Skip the statistics table after solving.
    #[arg(long, default_value_t = false)]
    pub(crate) no_stats: bool,

    /// Skip the periodic progress lines.
    #[arg(long, default_value_t = false)]
    pub(crate) no_progress: bool,

    /// Also print each solution as a grid.
    #[arg(short, long, default_value_t = false)]
    pub(crate) print_solution: bool,

    /// Specifies the search strategy.
    #[arg(long, value_enum, default_value_t = SolverType::Sequential)]
    pub(crate) solver: SolverType,

    /// Worker threads for the parallel solver.
    #[arg(long)]
    pub(crate) threads: Option<usize>,

    /// How `/` treats inexact quotients, in pruning and verification.
    #[arg(long, value_enum, default_value_t = Division::Truncating)]
    pub(crate) division: Division,
}

impl CommonOptions {
    /// Builds the search configuration these options describe.
    pub(crate) fn config(&self) -> SearchConfig {
        let config = SearchConfig::default()
            .with_division(self.division)
            .with_progress(!self.no_progress);
        match self.threads {
            Some(threads) => config.with_threads(threads),
            None => config,
        }
    }
}

/// Installs the tracing subscriber. `RUST_LOG` wins over the default level.
pub(crate) fn init_logging(debug: bool) {
    let default = if debug { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default)),
        )
        .with_target(false)
        .init();
}

/// Solves the puzzle and reports solutions and statistics.
///
/// # Errors
///
/// If the solver cannot acquire its worker pool.
pub(crate) fn solve_and_report(common: &CommonOptions) -> Result<()> {
    let layout = Layout::bletchley();
    let config = common.config();

    debug!("layout:\n{layout}");

    let outcome = common.solver.to_impl().solve(&layout, &config)?;

    print_solutions(&outcome, &layout, common.print_solution);

    if !common.no_stats {
        print_stats(&outcome.stats, &layout, common.solver, memory_usage());
    }

    Ok(())
}

/// Checks one assignment and prints a per-equation report.
///
/// Returns whether every equation holds.
///
/// # Errors
///
/// If `values` is not a permutation of 1..=16.
pub(crate) fn verify_assignment(values: &[u8], division: Division) -> Result<bool> {
    let layout = Layout::bletchley();
    let assignment = Assignment::parse(values, layout.cells())?;
    let verdict = layout.check(&assignment, division);

    println!("{}\n", assignment.grid(layout.side()));
    for check in &verdict.checks {
        println!("{check}");
    }

    let ok = verdict.all_hold();
    println!("\n{}", if ok { "SOLUTION" } else { "NOT A SOLUTION" });
    Ok(ok)
}

/// Prints every solution as a sequence of 16 values, optionally as a grid.
pub(crate) fn print_solutions(outcome: &SearchOutcome, layout: &Layout, grid: bool) {
    println!("The found solutions are:");
    for solution in &outcome.solutions {
        println!("{solution}");
        if grid {
            println!("{}\n", solution.grid(layout.side()));
        }
    }
    if outcome.solutions.is_empty() {
        info!("search finished without a solution");
    }
}

/// Allocated and resident memory in MiB, if jemalloc reports them.
fn memory_usage() -> Option<(f64, f64)> {
    epoch::advance().ok()?;
    let allocated = stats::allocated::mib().ok()?.read().ok()?;
    let resident = stats::resident::mib().ok()?.read().ok()?;
    Some((
        allocated as f64 / (1024.0 * 1024.0),
        resident as f64 / (1024.0 * 1024.0),
    ))
}

/// Helper function to print a single statistic line in a formatted table row.
pub(crate) fn stat_line(label: &str, value: impl std::fmt::Display) {
    println!("|  {label:<28} {value:>18}  |");
}

/// Helper function to print a statistic line that includes a rate (value/second).
pub(crate) fn stat_line_with_rate(label: &str, value: u64, elapsed: f64) {
    let rate = if elapsed > 0.0 {
        value as f64 / elapsed
    } else {
        0.0
    };
    println!("|  {label:<20} {value:>12} ({rate:>9.0}/sec)  |");
}

/// Prints a summary of problem and search statistics.
pub(crate) fn print_stats(
    s: &SearchStats,
    layout: &Layout,
    solver: SolverType,
    memory: Option<(f64, f64)>,
) {
    let elapsed_secs = s.elapsed.as_secs_f64();

    println!("\n=======================[ Problem Statistics ]=========================");
    stat_line("Cells", layout.cells());
    stat_line("Equations", layout.equations().len());
    stat_line("Decision groups", layout.groups().len());
    stat_line("Solver", solver);

    println!("========================[ Search Statistics ]========================");
    for (depth, group) in layout.groups().iter().enumerate() {
        let tried = s.bindings.get(depth).copied().unwrap_or(0);
        let rejected = s.rejections.get(depth).copied().unwrap_or(0);
        stat_line(
            &format!("Group {depth} ({})", group.name()),
            format!("{rejected}/{tried} cut"),
        );
    }
    stat_line_with_rate("Completions", s.completions, elapsed_secs);
    stat_line_with_rate("Candidates", s.candidates, elapsed_secs);
    stat_line("Solutions", s.solutions);
    stat_line("Progress lines", s.progress_lines);
    if let Some((allocated, resident)) = memory {
        stat_line("Memory usage (MiB)", format!("{allocated:.2}"));
        stat_line("Resident memory (MiB)", format!("{resident:.2}"));
    }
    stat_line("Wall time (s)", format!("{elapsed_secs:.3}"));
    println!("=====================================================================");
}
