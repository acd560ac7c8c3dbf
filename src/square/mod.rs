#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
//! The arithmetic square: data model, pruning oracle, enumerator and verifier.

/// Complete and partial assignments, and the value bitmask.
pub mod assignment;
/// Search configuration.
pub mod configs;
/// Error type.
pub mod error;
/// Equations, operators and division modes.
pub mod expr;
/// The puzzle layout and the verifier.
pub mod layout;
mod progress;
/// Arithmetic bounds used to prune the search.
pub mod pruning;
/// The backtracking enumerator.
pub mod search;
/// Sequential and parallel solvers.
pub mod solver;
