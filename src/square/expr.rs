#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
//! Row and column equations and their evaluation.
//!
//! An equation is a first operand followed by `(operator, cell)` terms and a
//! target. Evaluation honours the usual precedence: runs of `*` and `/` are
//! folded left to right into a single additive term, and the additive terms
//! are then summed with their signs.

use crate::square::assignment::Cell;
use clap::ValueEnum;
use smallvec::SmallVec;
use std::fmt::Display;

/// Binary operator between two cells of an equation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Op {
    /// `+`
    Add,
    /// `-`
    Sub,
    /// `*`
    Mul,
    /// `/`
    Div,
}

impl Op {
    /// Whether the operator binds tighter than `+` and `-`.
    #[must_use]
    pub const fn is_multiplicative(self) -> bool {
        matches!(self, Self::Mul | Self::Div)
    }

    /// The operator's symbol.
    #[must_use]
    pub const fn symbol(self) -> char {
        match self {
            Self::Add => '+',
            Self::Sub => '-',
            Self::Mul => '*',
            Self::Div => '/',
        }
    }
}

impl Display for Op {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.symbol())
    }
}

/// How `/` treats a quotient that is not a whole number.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, ValueEnum)]
pub enum Division {
    /// Integer division truncating toward zero; remainders are discarded.
    #[default]
    Truncating,
    /// Only whole quotients are allowed; a remainder fails the equation.
    Exact,
}

impl Division {
    /// Divides `lhs` by `rhs`, or returns `None` for a zero divisor or an
    /// inexact quotient under [`Division::Exact`].
    #[must_use]
    pub const fn apply(self, lhs: i64, rhs: i64) -> Option<i64> {
        if rhs == 0 {
            return None;
        }
        match self {
            Self::Truncating => Some(lhs / rhs),
            Self::Exact => {
                if lhs % rhs == 0 {
                    Some(lhs / rhs)
                } else {
                    None
                }
            }
        }
    }
}

impl Display for Division {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Truncating => write!(f, "truncating"),
            Self::Exact => write!(f, "exact"),
        }
    }
}

/// A fixed arithmetic expression over grid cells with a target value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Equation {
    name: &'static str,
    first: Cell,
    terms: SmallVec<[(Op, Cell); 3]>,
    target: i64,
}

impl Equation {
    /// Creates `first <op> cell <op> cell ... = target`.
    #[must_use]
    pub fn new(
        name: &'static str,
        first: Cell,
        terms: impl IntoIterator<Item = (Op, Cell)>,
        target: i64,
    ) -> Self {
        Self {
            name,
            first,
            terms: terms.into_iter().collect(),
            target,
        }
    }

    /// Human readable name, e.g. `row 1`.
    #[must_use]
    pub const fn name(&self) -> &'static str {
        self.name
    }

    /// The value the left-hand side must equal.
    #[must_use]
    pub const fn target(&self) -> i64 {
        self.target
    }

    /// Every cell the equation reads, in order.
    pub fn cells(&self) -> impl Iterator<Item = Cell> + '_ {
        std::iter::once(self.first).chain(self.terms.iter().map(|&(_, cell)| cell))
    }

    /// Evaluates the left-hand side over `values`, indexed by cell.
    ///
    /// Returns `None` when a division fails under `division`.
    #[must_use]
    pub fn evaluate(&self, values: &[u8], division: Division) -> Option<i64> {
        let mut total = 0;
        let mut sign = 1;
        let mut term = i64::from(values[self.first]);

        for &(op, cell) in &self.terms {
            let value = i64::from(values[cell]);
            match op {
                Op::Mul => term *= value,
                Op::Div => term = division.apply(term, value)?,
                Op::Add | Op::Sub => {
                    total += sign * term;
                    sign = if op == Op::Add { 1 } else { -1 };
                    term = value;
                }
            }
        }

        Some(total + sign * term)
    }

    /// Whether the left-hand side equals the target.
    #[must_use]
    pub fn holds(&self, values: &[u8], division: Division) -> bool {
        self.evaluate(values, division) == Some(self.target)
    }
}

impl Display for Equation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "p{}", self.first)?;
        for (op, cell) in &self.terms {
            write!(f, " {op} p{cell}")?;
        }
        write!(f, " = {}", self.target)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn values(v: &[u8]) -> Vec<u8> {
        v.to_vec()
    }

    #[test]
    fn test_multiplication_binds_tighter() {
        // 2 + 3 * 4 = 14, not 20
        let eq = Equation::new("t", 0, [(Op::Add, 1), (Op::Mul, 2)], 14);
        assert_eq!(eq.evaluate(&values(&[2, 3, 4]), Division::Truncating), Some(14));
        assert!(eq.holds(&values(&[2, 3, 4]), Division::Truncating));
    }

    #[test]
    fn test_subtraction_after_product() {
        // 8 + 2 * 5 - 3 = 15
        let eq = Equation::new("t", 0, [(Op::Add, 1), (Op::Mul, 2), (Op::Sub, 3)], 15);
        assert_eq!(eq.evaluate(&values(&[8, 2, 5, 3]), Division::Truncating), Some(15));
    }

    #[test]
    fn test_leading_subtraction_chain() {
        // 7 - 11 + 9 + 6 = 11
        let eq = Equation::new("t", 0, [(Op::Sub, 1), (Op::Add, 2), (Op::Add, 3)], 11);
        assert!(eq.holds(&values(&[7, 11, 9, 6]), Division::Truncating));
    }

    #[test]
    fn test_division_left_to_right() {
        // 16 + 10 * 12 / 2 = 76
        let eq = Equation::new("t", 0, [(Op::Add, 1), (Op::Mul, 2), (Op::Div, 3)], 76);
        assert_eq!(eq.evaluate(&values(&[16, 10, 12, 2]), Division::Exact), Some(76));
    }

    #[test]
    fn test_truncating_and_exact_division() {
        // 1 + 7 * 3 / 2 truncates to 1 + 10
        let eq = Equation::new("t", 0, [(Op::Add, 1), (Op::Mul, 2), (Op::Div, 3)], 11);
        let v = values(&[1, 7, 3, 2]);
        assert_eq!(eq.evaluate(&v, Division::Truncating), Some(11));
        assert!(eq.holds(&v, Division::Truncating));
        assert_eq!(eq.evaluate(&v, Division::Exact), None);
        assert!(!eq.holds(&v, Division::Exact));
    }

    #[test]
    fn test_division_by_zero() {
        assert_eq!(Division::Truncating.apply(4, 0), None);
        assert_eq!(Division::Exact.apply(4, 0), None);
    }

    #[test]
    fn test_cells_and_display() {
        let eq = Equation::new("row 1", 0, [(Op::Add, 1), (Op::Add, 2), (Op::Mul, 3)], 90);
        assert_eq!(eq.cells().collect::<Vec<_>>(), vec![0, 1, 2, 3]);
        assert_eq!(eq.to_string(), "p0 + p1 + p2 * p3 = 90");
    }
}
