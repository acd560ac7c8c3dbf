//! # square-solver
//!
//! Command-line front end for the 4x4 arithmetic square puzzle: place the
//! numbers 1 to 16 in a grid so that four row equations and four column
//! equations hold, each evaluated with `*` and `/` binding tighter than `+`
//! and `-`.
//!
//! ## Usage
//!
//! ```sh
//! square-solver [OPTIONS] [SUBCOMMAND]
//! ```
//!
//! Without a subcommand the full search runs with the given options.
//!
//! 1.  **`solve`**: enumerate every solution.
//!     ```sh
//!     square-solver solve --solver parallel --threads 8
//!     ```
//!
//! 2.  **`verify`**: check one assignment, cells listed row by row.
//!     ```sh
//!     square-solver verify 7 3 16 5 11 4 10 8 9 1 12 13 6 15 2 14
//!     ```
//!
//! 3.  **`completions`**: print a shell completion script.
//!     ```sh
//!     square-solver completions bash
//!     ```
//!
//! ### Search options
//!
//! -   `-d, --debug`: log the layout and each solution as it is found.
//! -   `--no-stats`: skip the statistics table.
//! -   `--no-progress`: skip the periodic progress lines.
//! -   `-p, --print-solution`: also print each solution as a grid.
//! -   `--solver <sequential|parallel>`: search strategy (default `sequential`).
//! -   `--threads <N>`: worker threads for the parallel solver.
//! -   `--division <truncating|exact>`: how `/` treats inexact quotients.
//!
//! `RUST_LOG` overrides the log level chosen by `--debug`.

use crate::command_line::cli::{
    Cli, Commands, init_logging, solve_and_report, verify_assignment,
};
use clap::{CommandFactory, Parser};
use std::process::ExitCode;
use tracing::error;

mod command_line;

/// Global allocator using `tikv-jemallocator`, which also backs the memory
/// figures in the statistics table.
#[global_allocator]
static GLOBAL: tikv_jemallocator::Jemalloc = tikv_jemallocator::Jemalloc;

fn main() -> ExitCode {
    let cli = Cli::parse();

    let debug = match &cli.command {
        Some(Commands::Solve { common }) => common.debug,
        _ => cli.common.debug,
    };
    init_logging(debug);

    let result = match cli.command {
        None => solve_and_report(&cli.common).map(|()| true),
        Some(Commands::Solve { common }) => solve_and_report(&common).map(|()| true),
        Some(Commands::Verify { values, division }) => verify_assignment(&values, division),
        Some(Commands::Completions { shell }) => {
            let mut cmd = Cli::command();
            let name = cmd.get_name().to_string();
            clap_complete::generate(shell, &mut cmd, name, &mut std::io::stdout());
            Ok(true)
        }
    };

    match result {
        Ok(true) => ExitCode::SUCCESS,
        Ok(false) => ExitCode::FAILURE,
        Err(e) => {
            error!("{e}");
            ExitCode::FAILURE
        }
    }
}
