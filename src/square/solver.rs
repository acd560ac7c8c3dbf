#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
//! Solver front-ends over the enumerator.
//!
//! [`Sequential`] runs the search on the calling thread. [`Parallel`] splits
//! the admitted bindings of the first decision group across a rayon pool;
//! each worker keeps its own solution set, and the sets are concatenated in
//! root order so the result matches the sequential discovery order.

use crate::square::configs::SearchConfig;
use crate::square::error::Result;
use crate::square::layout::Layout;
use crate::square::search::{Search, SearchOutcome};
use clap::ValueEnum;
use rayon::prelude::*;
use std::fmt::{Debug, Display};
use std::time::Instant;
use tracing::info;

/// Common interface of the solvers.
pub trait Solver: Debug {
    /// Finds every assignment of `layout` satisfying all its equations.
    ///
    /// # Errors
    ///
    /// Solvers that need external resources (a thread pool) report failures
    /// to acquire them.
    fn solve(&self, layout: &Layout, config: &SearchConfig) -> Result<SearchOutcome>;
}

/// Single-threaded depth-first search.
#[derive(Debug, Clone, Copy, Default)]
pub struct Sequential;

impl Solver for Sequential {
    fn solve(&self, layout: &Layout, config: &SearchConfig) -> Result<SearchOutcome> {
        info!(solver = "sequential", division = %config.division, "starting search");
        Ok(Search::new(layout, config).run())
    }
}

/// Depth-first search with the first decision group fanned out over rayon.
#[derive(Debug, Clone, Copy, Default)]
pub struct Parallel;

impl Solver for Parallel {
    fn solve(&self, layout: &Layout, config: &SearchConfig) -> Result<SearchOutcome> {
        let start = Instant::now();

        let mut builder = rayon::ThreadPoolBuilder::new();
        if let Some(threads) = config.threads {
            builder = builder.num_threads(threads);
        }
        let pool = builder.build()?;

        let mut head = Search::new(layout, config);
        let roots = head.roots();
        let mut outcome = head.finish();
        info!(
            solver = "parallel",
            division = %config.division,
            roots = roots.len(),
            threads = pool.current_num_threads(),
            "starting search"
        );

        let parts: Vec<SearchOutcome> = pool.install(|| {
            roots
                .into_par_iter()
                .map(|root| Search::new(layout, config).run_from(root, 1))
                .collect()
        });
        for part in parts {
            outcome.absorb(part);
        }

        outcome.stats.elapsed = start.elapsed();
        Ok(outcome)
    }
}

/// Solver selection for the command line.
#[derive(Debug, Clone, PartialEq, Eq, Copy, Hash, Default, ValueEnum)]
pub enum SolverType {
    /// Single-threaded search.
    #[default]
    Sequential,
    /// Rayon-parallel search over the first decision group.
    Parallel,
}

impl Display for SolverType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Sequential => write!(f, "sequential"),
            Self::Parallel => write!(f, "parallel"),
        }
    }
}

impl SolverType {
    /// Converts the selection to a concrete solver.
    #[must_use]
    pub const fn to_impl(self) -> SolverImpls {
        match self {
            Self::Sequential => SolverImpls::Sequential(Sequential),
            Self::Parallel => SolverImpls::Parallel(Parallel),
        }
    }
}

/// Enum dispatch over the available solvers.
#[derive(Debug, Clone, Copy)]
pub enum SolverImpls {
    /// See [`Sequential`].
    Sequential(Sequential),
    /// See [`Parallel`].
    Parallel(Parallel),
}

impl Solver for SolverImpls {
    fn solve(&self, layout: &Layout, config: &SearchConfig) -> Result<SearchOutcome> {
        match self {
            Self::Sequential(s) => s.solve(layout, config),
            Self::Parallel(s) => s.solve(layout, config),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::square::assignment::Assignment;
    use crate::square::expr::{Division, Equation, Op};
    use crate::square::layout::{DecisionGroup, KNOWN_SOLUTION};
    use itertools::Itertools;

    fn distinct_pair(v: &[u8], _: Division) -> bool {
        v[0] == v[1]
    }

    fn small_layout() -> Layout {
        let equations = vec![
            Equation::new("a", 0, [(Op::Mul, 1), (Op::Div, 2), (Op::Add, 3)], 7),
            Equation::new("b", 3, [(Op::Add, 4), (Op::Sub, 5)], 2),
        ];
        let groups = vec![
            DecisionGroup::new("first", [0, 1], [0, 1], distinct_pair),
            DecisionGroup::new("second", [3, 4], [3, 4], distinct_pair),
        ];
        Layout::new(3, 6, equations, groups).unwrap()
    }

    #[test]
    fn test_parallel_matches_sequential() {
        let layout = small_layout();
        let config = SearchConfig::default().with_threads(3);

        let seq = SolverType::Sequential.to_impl().solve(&layout, &config).unwrap();
        let par = SolverType::Parallel.to_impl().solve(&layout, &config).unwrap();

        assert_eq!(seq.solutions, par.solutions);
        assert_eq!(seq.stats.candidates, par.stats.candidates);
        assert_eq!(seq.stats.bindings, par.stats.bindings);
        assert_eq!(seq.stats.rejections, par.stats.rejections);
        assert_eq!(seq.stats.solutions, 10);
    }

    #[test]
    fn test_parallel_idempotent_as_set() {
        let layout = small_layout();
        let config = SearchConfig::default();
        let a = Parallel.solve(&layout, &config).unwrap();
        let b = Parallel.solve(&layout, &config).unwrap();
        let set = |o: &SearchOutcome| o.solutions.iter().cloned().sorted().collect::<Vec<Assignment>>();
        assert_eq!(set(&a), set(&b));
    }

    #[test]
    fn test_parallel_with_no_groups() {
        let layout = Layout::new(3, 6, small_layout().equations().to_vec(), vec![]).unwrap();
        let config = SearchConfig::default();
        let par = Parallel.solve(&layout, &config).unwrap();
        let seq = Sequential.solve(&layout, &config).unwrap();
        assert_eq!(par.solutions, seq.solutions);
        assert_eq!(par.stats.candidates, 720);
    }

    #[test]
    #[ignore = "walks the full space, roughly 3e8 candidates"]
    fn test_parallel_full_search() {
        let layout = Layout::bletchley();
        let config = SearchConfig::default().with_progress(false);
        let outcome = Parallel.solve(&layout, &config).unwrap();
        assert_eq!(outcome.solutions, vec![Assignment::from(KNOWN_SOLUTION)]);
    }

    #[test]
    fn test_solver_type_display_round_trips() {
        for t in [SolverType::Sequential, SolverType::Parallel] {
            assert_eq!(SolverType::from_str(&t.to_string(), true), Ok(t));
        }
    }
}
