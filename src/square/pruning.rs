#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
//! Cheap necessary conditions used to cut the search before the permutation
//! stage.
//!
//! Each equation of the puzzle has one dominant multiplicative sub-term. The
//! remaining terms of that equation are small additive values whose extremes
//! are fixed by the value range `1..=16`, so the sub-term itself must lie in a
//! narrow window. The windows are hard-coded below; [`Bound::balancing`]
//! recomputes them from first principles and the tests check the two agree.
//!
//! Every `reject_*` function returns `true` when the values can never be
//! extended to a full solution.

use crate::square::assignment::ValueSet;
use crate::square::expr::Division;

/// Inclusive window a sub-term must fall in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Bound {
    /// Smallest admissible value.
    pub min: i64,
    /// Largest admissible value.
    pub max: i64,
}

impl Bound {
    /// Creates the window `[min, max]`.
    #[must_use]
    pub const fn new(min: i64, max: i64) -> Self {
        Self { min, max }
    }

    /// Whether `value` lies inside the window.
    #[must_use]
    pub const fn contains(self, value: i64) -> bool {
        self.min <= value && value <= self.max
    }

    /// Window for a sub-term `x` in `x + rest = target`, where `rest` is known
    /// to lie in `[rest_min, rest_max]`. Products of positive values are never
    /// negative, so the lower end is clamped at zero.
    #[must_use]
    pub const fn balancing(target: i64, rest_min: i64, rest_max: i64) -> Self {
        let min = target - rest_max;
        Self::new(if min < 0 { 0 } else { min }, target - rest_min)
    }
}

/// Extremes of `a + b` for distinct `a`, `b` in `1..=max`.
#[must_use]
pub const fn pair_sum_extremes(max: u8) -> (i64, i64) {
    let max = max as i64;
    (1 + 2, max + (max - 1))
}

/// Extremes of `a - b` for distinct `a`, `b` in `1..=max`.
#[must_use]
pub const fn pair_difference_extremes(max: u8) -> (i64, i64) {
    let max = max as i64;
    (1 - max, max - 1)
}

/// Extremes of a single value in `1..=max`.
#[must_use]
pub const fn single_extremes(max: u8) -> (i64, i64) {
    (1, max as i64)
}

/// `p2 * p3` in `p0 + p1 + p2 * p3 = 90`.
pub const ROW_FIRST_PRODUCT: Bound = Bound::new(59, 87);
/// `p9 * p10` in `p8 + p9 * p10 - p11 = 8`.
pub const ROW_THIRD_PRODUCT: Bound = Bound::new(0, 23);
/// `p12 * p13` in `p12 * p13 + p14 + p15 = 106`.
pub const ROW_FOURTH_PRODUCT: Bound = Bound::new(75, 103);
/// `p1 * p5` in `p1 * p5 - p9 + p13 = 26`.
pub const COL_SECOND_PRODUCT: Bound = Bound::new(11, 41);
/// `p6 * p10 / p14` in `p2 + p6 * p10 / p14 = 76`.
pub const COL_THIRD_QUOTIENT: Bound = Bound::new(60, 75);

const fn product(a: u8, b: u8) -> i64 {
    a as i64 * b as i64
}

/// Row 1: rejects `(p2, p3)` when equal or when the product is out of range.
#[must_use]
pub const fn reject_row_first(a: u8, b: u8) -> bool {
    a == b || !ROW_FIRST_PRODUCT.contains(product(a, b))
}

/// Row 3: rejects `(p9, p10)` when equal or when the product exceeds 23.
#[must_use]
pub const fn reject_row_third(a: u8, b: u8) -> bool {
    a == b || !ROW_THIRD_PRODUCT.contains(product(a, b))
}

/// Row 4: rejects `(p12, p13)` when equal or when the product is out of range.
#[must_use]
pub const fn reject_row_fourth(a: u8, b: u8) -> bool {
    a == b || !ROW_FOURTH_PRODUCT.contains(product(a, b))
}

/// Column 2: rejects `(p1, p5)` when equal or when the product is out of range.
#[must_use]
pub const fn reject_col_second(a: u8, b: u8) -> bool {
    a == b || !COL_SECOND_PRODUCT.contains(product(a, b))
}

/// Column 3: rejects `(p6, p10, p14)` when the divisor equals the first factor
/// or the truncated quotient is out of range.
#[must_use]
pub const fn reject_col_third(a: u8, b: u8, c: u8) -> bool {
    reject_col_third_with(a, b, c, Division::Truncating)
}

/// [`reject_col_third`] under a chosen division mode. With
/// [`Division::Exact`] an inexact quotient is rejected too.
#[must_use]
pub const fn reject_col_third_with(a: u8, b: u8, c: u8, division: Division) -> bool {
    if a == c {
        return true;
    }
    match division.apply(product(a, b), c as i64) {
        Some(q) => !COL_THIRD_QUOTIENT.contains(q),
        None => true,
    }
}

/// The shared-value predicate: `true` if a newly chosen group repeats a value
/// within itself or shares one with anything bound earlier.
#[must_use]
pub fn clashes(previous: ValueSet, chosen: &[u8]) -> bool {
    let set = ValueSet::from_values(chosen);
    set.len() != chosen.len() || !previous.is_disjoint(set)
}

// Adapters with the `DecisionGroup` signature; `values` holds the group's read
// cells in declaration order.

pub(crate) fn row_first_group(values: &[u8], _: Division) -> bool {
    reject_row_first(values[0], values[1])
}

pub(crate) fn row_third_group(values: &[u8], _: Division) -> bool {
    reject_row_third(values[0], values[1])
}

pub(crate) fn row_fourth_group(values: &[u8], _: Division) -> bool {
    reject_row_fourth(values[0], values[1])
}

pub(crate) fn col_second_group(values: &[u8], _: Division) -> bool {
    reject_col_second(values[0], values[1])
}

pub(crate) fn col_third_group(values: &[u8], division: Division) -> bool {
    reject_col_third_with(values[0], values[1], values[2], division)
}
