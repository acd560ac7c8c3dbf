#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
//! Complete and partial assignments of values to grid cells.
//!
//! An [`Assignment`] holds one value per cell and is what the verifier checks
//! and what ends up in the solution set. A [`PartialAssignment`] is the
//! search-time buffer: only some cells are bound, and the set of values already
//! taken is tracked alongside so that clashes can be rejected with one mask
//! operation.

use crate::square::error::{Result, SquareError};
use core::ops::{Index, IndexMut};
use itertools::Itertools;
use smallvec::SmallVec;
use std::fmt::Display;

/// Cell index, `row * side + column`.
pub type Cell = usize;

/// A set of small positive values, stored as a bitmask.
///
/// Bit `v` is set when value `v` is a member. Values must lie in `1..=31`,
/// which comfortably covers the `1..=16` range of the puzzle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Hash)]
pub struct ValueSet(u32);

impl ValueSet {
    /// The empty set.
    pub const EMPTY: Self = Self(0);

    /// Builds a set from a slice of values. Repeated values collapse.
    #[must_use]
    pub fn from_values(values: &[u8]) -> Self {
        values.iter().fold(Self::EMPTY, |set, &v| set.with(v))
    }

    /// The set `{1, ..., max}`.
    #[must_use]
    pub const fn full(max: u8) -> Self {
        Self(((1u32 << max) - 1) << 1)
    }

    /// Returns a copy of this set with `value` added.
    #[must_use]
    pub const fn with(self, value: u8) -> Self {
        Self(self.0 | (1 << value))
    }

    /// Whether `value` is a member.
    #[must_use]
    pub const fn contains(self, value: u8) -> bool {
        self.0 & (1 << value) != 0
    }

    /// Number of members.
    #[must_use]
    pub const fn len(self) -> usize {
        self.0.count_ones() as usize
    }

    /// Whether the set has no members.
    #[must_use]
    pub const fn is_empty(self) -> bool {
        self.0 == 0
    }

    /// Set union.
    #[must_use]
    pub const fn union(self, other: Self) -> Self {
        Self(self.0 | other.0)
    }

    /// Whether the two sets share no value.
    #[must_use]
    pub const fn is_disjoint(self, other: Self) -> bool {
        self.0 & other.0 == 0
    }

    /// The values of `{1, ..., max}` that are not in this set.
    #[must_use]
    pub const fn complement_within(self, max: u8) -> Self {
        Self(Self::full(max).0 & !self.0)
    }

    /// Members in ascending order.
    #[must_use]
    pub fn values(self) -> SmallVec<[u8; 16]> {
        (1..32u8).filter(|&v| self.contains(v)).collect()
    }
}

/// A complete assignment: one value per cell, indexed by cell.
///
/// Construction through [`Assignment::new`] is unchecked so the search can
/// build candidates cheaply; use [`Assignment::parse`] for values that come
/// from outside the crate.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Assignment(SmallVec<[u8; 16]>);

impl Assignment {
    /// Wraps the given values without validation.
    #[must_use]
    pub fn new(values: impl IntoIterator<Item = u8>) -> Self {
        Self(values.into_iter().collect())
    }

    /// Validates that `values` is a permutation of `1..=values.len()`.
    ///
    /// # Errors
    ///
    /// Returns [`SquareError::InvalidAssignment`] if `values` has the wrong
    /// length, holds a value outside `1..=len`, or repeats a value.
    pub fn parse(values: &[u8], cells: usize) -> Result<Self> {
        if values.len() != cells {
            return Err(SquareError::InvalidAssignment(format!(
                "expected {cells} values, got {}",
                values.len()
            )));
        }

        let max = u8::try_from(cells).unwrap_or(u8::MAX);
        if let Some(v) = values.iter().find(|&&v| v == 0 || v > max) {
            return Err(SquareError::InvalidAssignment(format!(
                "value {v} is outside 1..={max}"
            )));
        }

        if let Some(v) = values.iter().duplicates().next() {
            return Err(SquareError::InvalidAssignment(format!(
                "value {v} appears more than once"
            )));
        }

        Ok(Self::new(values.iter().copied()))
    }

    /// Number of cells.
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Whether the assignment has no cells.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// The values in cell order.
    #[must_use]
    pub fn values(&self) -> &[u8] {
        &self.0
    }

    /// Whether every value of `1..=len` appears exactly once.
    #[must_use]
    pub fn is_permutation(&self) -> bool {
        let Ok(max) = u8::try_from(self.len()) else {
            return false;
        };
        if max > 31 {
            return false;
        }
        self.0.iter().all(|&v| (1..=max).contains(&v))
            && ValueSet::from_values(&self.0) == ValueSet::full(max)
    }

    /// Renders the assignment as a grid with `side` values per row.
    #[must_use]
    pub fn grid(&self, side: usize) -> String {
        self.0
            .chunks(side.max(1))
            .map(|row| row.iter().map(|v| format!("{v:>3}")).join(""))
            .join("\n")
    }
}

impl Index<Cell> for Assignment {
    type Output = u8;

    fn index(&self, index: Cell) -> &Self::Output {
        &self.0[index]
    }
}

impl IndexMut<Cell> for Assignment {
    fn index_mut(&mut self, index: Cell) -> &mut Self::Output {
        &mut self.0[index]
    }
}

impl From<[u8; 16]> for Assignment {
    fn from(values: [u8; 16]) -> Self {
        Self::new(values)
    }
}

impl From<Assignment> for Vec<u8> {
    fn from(assignment: Assignment) -> Self {
        assignment.0.into_vec()
    }
}

impl TryFrom<Vec<u8>> for Assignment {
    type Error = SquareError;

    fn try_from(values: Vec<u8>) -> Result<Self> {
        let cells = values.len();
        Self::parse(&values, cells)
    }
}

impl Display for Assignment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{}]", self.0.iter().join(", "))
    }
}

/// Search-time binding of a subset of cells.
///
/// `used` always equals the set of values held by bound cells; groups are
/// assigned and released as a unit so the mask never has to un-count a value.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct PartialAssignment {
    cells: SmallVec<[Option<u8>; 16]>,
    used: ValueSet,
}

impl PartialAssignment {
    /// An assignment over `cells` cells with nothing bound.
    #[must_use]
    pub fn new(cells: usize) -> Self {
        Self {
            cells: smallvec::smallvec![None; cells],
            used: ValueSet::EMPTY,
        }
    }

    /// The value bound to `cell`, if any.
    #[must_use]
    pub fn get(&self, cell: Cell) -> Option<u8> {
        self.cells.get(cell).copied().flatten()
    }

    /// Values held by bound cells.
    #[must_use]
    pub const fn used(&self) -> ValueSet {
        self.used
    }

    /// Number of bound cells.
    #[must_use]
    pub fn bound_count(&self) -> usize {
        self.cells.iter().filter(|c| c.is_some()).count()
    }

    /// Binds `cells[i]` to `values[i]` and returns the previous value mask for
    /// [`PartialAssignment::release`].
    pub fn assign(&mut self, cells: &[Cell], values: &[u8]) -> ValueSet {
        let previous = self.used;
        for (&cell, &value) in cells.iter().zip(values) {
            self.cells[cell] = Some(value);
        }
        self.used = previous.union(ValueSet::from_values(values));
        previous
    }

    /// Unbinds `cells` and restores the value mask saved by `assign`.
    pub fn release(&mut self, cells: &[Cell], previous: ValueSet) {
        for &cell in cells {
            self.cells[cell] = None;
        }
        self.used = previous;
    }

    /// Cells with no value yet, in ascending order.
    #[must_use]
    pub fn free_cells(&self) -> SmallVec<[Cell; 16]> {
        self.cells
            .iter()
            .enumerate()
            .filter_map(|(i, c)| c.is_none().then_some(i))
            .collect()
    }

    /// A complete assignment with free cells set to zero.
    #[must_use]
    pub fn fill(&self) -> Assignment {
        Assignment::new(self.cells.iter().map(|c| c.unwrap_or(0)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_value_set_complement() {
        let used = ValueSet::from_values(&[1, 5, 16]);
        let rest = used.complement_within(16);
        assert_eq!(rest.len(), 13);
        assert!(!rest.contains(1));
        assert!(!rest.contains(16));
        assert!(rest.contains(2));
        assert!(used.is_disjoint(rest));
        assert_eq!(used.union(rest), ValueSet::full(16));
    }

    #[test]
    fn test_value_set_values_sorted() {
        let set = ValueSet::from_values(&[9, 3, 12, 3]);
        assert_eq!(set.values().as_slice(), &[3, 9, 12]);
        assert_eq!(set.len(), 3);
    }

    #[test]
    fn test_parse_rejects_duplicates() {
        let err = Assignment::parse(&[1, 2, 2, 4], 4).unwrap_err();
        assert!(matches!(err, SquareError::InvalidAssignment(_)));
    }

    #[test]
    fn test_parse_rejects_out_of_range() {
        assert!(Assignment::parse(&[1, 2, 3, 5], 4).is_err());
        assert!(Assignment::parse(&[0, 1, 2, 3], 4).is_err());
    }

    #[test]
    fn test_parse_rejects_wrong_length() {
        assert!(Assignment::parse(&[1, 2, 3], 4).is_err());
    }

    #[test]
    fn test_is_permutation() {
        let ok = Assignment::new([2, 4, 1, 3]);
        assert!(ok.is_permutation());
        let repeated = Assignment::new([2, 2, 1, 3]);
        assert!(!repeated.is_permutation());
    }

    #[test]
    fn test_partial_assign_and_release() {
        let mut partial = PartialAssignment::new(4);
        let saved = partial.assign(&[1, 3], &[4, 2]);
        assert_eq!(partial.get(1), Some(4));
        assert_eq!(partial.get(0), None);
        assert_eq!(partial.bound_count(), 2);
        assert_eq!(partial.free_cells().as_slice(), &[0, 2]);
        assert_eq!(partial.fill().values(), &[0, 4, 0, 2]);

        partial.release(&[1, 3], saved);
        assert_eq!(partial, PartialAssignment::new(4));
    }

    #[test]
    fn test_display_and_grid() {
        let a = Assignment::new([1, 2, 3, 4]);
        assert_eq!(a.to_string(), "[1, 2, 3, 4]");
        assert_eq!(a.grid(2), "  1  2\n  3  4");
    }
}
