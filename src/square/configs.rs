#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
//! Search configuration.

use crate::square::expr::Division;

/// Knobs shared by every solver.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchConfig {
    /// How `/` treats inexact quotients, in both pruning and verification.
    pub division: Division,
    /// Worker threads for the parallel solver; `None` lets rayon decide.
    pub threads: Option<usize>,
    /// Whether to log progress lines while searching.
    pub progress: bool,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            division: Division::Truncating,
            threads: None,
            progress: true,
        }
    }
}

impl SearchConfig {
    /// Sets the division mode.
    #[must_use]
    pub const fn with_division(mut self, division: Division) -> Self {
        self.division = division;
        self
    }

    /// Sets the number of worker threads, at least one.
    #[must_use]
    pub fn with_threads(mut self, threads: usize) -> Self {
        self.threads = Some(threads.max(1));
        self
    }

    /// Enables or disables progress lines.
    #[must_use]
    pub const fn with_progress(mut self, progress: bool) -> Self {
        self.progress = progress;
        self
    }
}
