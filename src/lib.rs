#![warn(missing_docs)]
//! This crate solves the 4x4 arithmetic square puzzle: place the numbers 1 to 16
//! in a grid so that four row equations and four column equations, mixing
//! `+ - * /` with the usual precedence, all hold.
//!
//! The search binds ten cells pair by pair, pruning each pair with bounds
//! derived from its equation, then permutes the last six values and verifies
//! every candidate against all eight equations.

/// The `square` module holds the puzzle layout, the pruning oracle, the search
/// enumerator and the solution verifier.
pub mod square;
