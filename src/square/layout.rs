#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
//! The puzzle as data: equations, decision groups and the progress probe.
//!
//! ```text
//! p0  + p1  + p2  * p3  = 90
//! -     *     +     +
//! p4  + p5  + p6  + p7  = 33
//! +     -     *     +
//! p8  + p9  * p10 - p11 = 8
//! +     +     /     -
//! p12 * p13 + p14 + p15 = 106
//! =     =     =     =
//! 11    26    76    12
//! ```
//!
//! [`Layout::bletchley`] builds this square. Smaller layouts can be built with
//! [`Layout::new`], which the tests use to compare the search against brute
//! force.

use crate::square::assignment::{Assignment, Cell, PartialAssignment};
use crate::square::error::{Result, SquareError};
use crate::square::expr::{Division, Equation, Op};
use crate::square::pruning;
use itertools::Itertools;
use smallvec::SmallVec;
use std::fmt::Display;

/// Grid side of the shipped puzzle.
pub const SIDE: usize = 4;

/// Number of cells of the shipped puzzle.
pub const CELLS: usize = SIDE * SIDE;

/// Row targets, top to bottom.
pub const ROW_TARGETS: [i64; SIDE] = [90, 33, 8, 106];

/// Column targets, left to right.
pub const COLUMN_TARGETS: [i64; SIDE] = [11, 26, 76, 12];

/// The solution reported for the shipped puzzle.
pub const KNOWN_SOLUTION: [u8; CELLS] = [7, 3, 16, 5, 11, 4, 10, 8, 9, 1, 12, 13, 6, 15, 2, 14];

/// Signature of a group's pruning predicate: the values of the group's read
/// cells and the division mode in effect. Returns `true` to reject.
pub type RejectFn = fn(&[u8], Division) -> bool;

/// Cells bound together by one level of the search, plus the predicate that
/// prunes them.
#[derive(Debug, Clone)]
pub struct DecisionGroup {
    name: &'static str,
    binds: SmallVec<[Cell; 3]>,
    reads: SmallVec<[Cell; 3]>,
    reject: RejectFn,
}

impl DecisionGroup {
    /// A group binding `binds` (enumerated in nested order, first cell
    /// outermost) whose predicate sees the values of `reads`.
    #[must_use]
    pub fn new(
        name: &'static str,
        binds: impl IntoIterator<Item = Cell>,
        reads: impl IntoIterator<Item = Cell>,
        reject: RejectFn,
    ) -> Self {
        Self {
            name,
            binds: binds.into_iter().collect(),
            reads: reads.into_iter().collect(),
            reject,
        }
    }

    /// Label used in logs and statistics.
    #[must_use]
    pub const fn name(&self) -> &'static str {
        self.name
    }

    /// Cells bound by this group.
    #[must_use]
    pub fn binds(&self) -> &[Cell] {
        &self.binds
    }

    /// Cells whose values the predicate reads.
    #[must_use]
    pub fn reads(&self) -> &[Cell] {
        &self.reads
    }

    /// Applies the predicate to the current binding. A read cell that is not
    /// bound yet never causes a rejection.
    #[must_use]
    pub fn rejects(&self, partial: &PartialAssignment, division: Division) -> bool {
        let values: Option<SmallVec<[u8; 3]>> =
            self.reads.iter().map(|&cell| partial.get(cell)).collect();
        values.is_some_and(|v| (self.reject)(&v, division))
    }
}

/// Which cell's changes trigger a progress line, and which cells the line
/// reports.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProgressProbe {
    /// A new value in this cell emits a progress line.
    pub watch: Cell,
    /// Cells whose current values are included in the line.
    pub report: SmallVec<[Cell; 4]>,
}

/// Outcome of checking one equation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EquationCheck {
    /// Equation name.
    pub name: &'static str,
    /// Evaluated left-hand side, `None` if a division failed.
    pub value: Option<i64>,
    /// Required value.
    pub target: i64,
}

impl EquationCheck {
    /// Whether the equation is satisfied.
    #[must_use]
    pub fn holds(&self) -> bool {
        self.value == Some(self.target)
    }
}

impl Display for EquationCheck {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mark = if self.holds() { "ok" } else { "FAIL" };
        match self.value {
            Some(v) => write!(f, "{:<9} {v:>5} (target {:>4})  {mark}", self.name, self.target),
            None => write!(f, "{:<9} {:>5} (target {:>4})  {mark}", self.name, "n/a", self.target),
        }
    }
}

/// Per-equation verdict for a complete assignment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Verdict {
    /// One entry per equation, in layout order.
    pub checks: Vec<EquationCheck>,
}

impl Verdict {
    /// Whether every equation holds.
    #[must_use]
    pub fn all_hold(&self) -> bool {
        self.checks.iter().all(EquationCheck::holds)
    }

    /// The equations that do not hold.
    pub fn failures(&self) -> impl Iterator<Item = &EquationCheck> {
        self.checks.iter().filter(|c| !c.holds())
    }
}

/// A square puzzle: cell count, equations, and the order in which the search
/// binds cells.
#[derive(Debug, Clone)]
pub struct Layout {
    side: usize,
    cells: usize,
    equations: Vec<Equation>,
    groups: Vec<DecisionGroup>,
    progress: Option<ProgressProbe>,
}

impl Layout {
    /// Builds and validates a layout over `cells` cells taking the values
    /// `1..=cells`. `side` is only used to render grids.
    ///
    /// # Errors
    ///
    /// Returns [`SquareError::InvalidLayout`] if there are more than 31 cells,
    /// an equation or group references a cell outside the grid, two groups
    /// bind the same cell, or a predicate reads a cell not bound by its own
    /// or an earlier group.
    pub fn new(
        side: usize,
        cells: usize,
        equations: Vec<Equation>,
        groups: Vec<DecisionGroup>,
    ) -> Result<Self> {
        if cells == 0 || cells > 31 {
            return Err(SquareError::InvalidLayout(format!(
                "{cells} cells is outside the supported range 1..=31"
            )));
        }

        for eq in &equations {
            if let Some(cell) = eq.cells().find(|&c| c >= cells) {
                return Err(SquareError::InvalidLayout(format!(
                    "{} references cell {cell} of {cells}",
                    eq.name()
                )));
            }
        }

        let mut bound = PartialAssignment::new(cells);
        for group in &groups {
            if group.binds().is_empty() {
                return Err(SquareError::InvalidLayout(format!(
                    "group {} binds no cells",
                    group.name()
                )));
            }
            if let Some(&cell) = group.binds().iter().find(|&&c| c >= cells) {
                return Err(SquareError::InvalidLayout(format!(
                    "group {} binds cell {cell} of {cells}",
                    group.name()
                )));
            }
            if !group.binds().iter().all_unique() {
                return Err(SquareError::InvalidLayout(format!(
                    "group {} binds a cell twice",
                    group.name()
                )));
            }
            if let Some(&cell) = group.binds().iter().find(|&&c| bound.get(c).is_some()) {
                return Err(SquareError::InvalidLayout(format!(
                    "cell {cell} is bound twice (again by group {})",
                    group.name()
                )));
            }
            // Placeholder values only mark cells as bound for the reads check.
            let marks: SmallVec<[u8; 3]> = group.binds().iter().map(|_| 1).collect();
            bound.assign(group.binds(), &marks);

            if let Some(&cell) = group
                .reads()
                .iter()
                .find(|&&c| c >= cells || bound.get(c).is_none())
            {
                return Err(SquareError::InvalidLayout(format!(
                    "group {} reads cell {cell} before it is bound",
                    group.name()
                )));
            }
        }

        Ok(Self {
            side,
            cells,
            equations,
            groups,
            progress: None,
        })
    }

    /// Attaches a progress probe.
    #[must_use]
    pub fn with_progress(mut self, probe: ProgressProbe) -> Self {
        self.progress = Some(probe);
        self
    }

    /// The 4x4 square with its eight equations and five pruned decision
    /// groups.
    #[must_use]
    pub fn bletchley() -> Self {
        use Op::{Add, Div, Mul, Sub};

        let [r1, r2, r3, r4] = ROW_TARGETS;
        let [c1, c2, c3, c4] = COLUMN_TARGETS;

        let equations = vec![
            Equation::new("row 1", 0, [(Add, 1), (Add, 2), (Mul, 3)], r1),
            Equation::new("row 2", 4, [(Add, 5), (Add, 6), (Add, 7)], r2),
            Equation::new("row 3", 8, [(Add, 9), (Mul, 10), (Sub, 11)], r3),
            Equation::new("row 4", 12, [(Mul, 13), (Add, 14), (Add, 15)], r4),
            Equation::new("column 1", 0, [(Sub, 4), (Add, 8), (Add, 12)], c1),
            Equation::new("column 2", 1, [(Mul, 5), (Sub, 9), (Add, 13)], c2),
            Equation::new("column 3", 2, [(Add, 6), (Mul, 10), (Div, 14)], c3),
            Equation::new("column 4", 3, [(Add, 7), (Add, 11), (Sub, 15)], c4),
        ];

        let groups = vec![
            DecisionGroup::new("row 1", [2, 3], [2, 3], pruning::row_first_group),
            DecisionGroup::new("row 4", [12, 13], [12, 13], pruning::row_fourth_group),
            DecisionGroup::new("column 2", [1, 5], [1, 5], pruning::col_second_group),
            DecisionGroup::new("row 3", [9, 10], [9, 10], pruning::row_third_group),
            DecisionGroup::new("column 3", [6, 14], [6, 10, 14], pruning::col_third_group),
        ];

        Self {
            side: SIDE,
            cells: CELLS,
            equations,
            groups,
            progress: None,
        }
        .with_progress(ProgressProbe {
            watch: 12,
            report: smallvec::smallvec![2, 3, 12],
        })
    }

    /// Grid side, for display.
    #[must_use]
    pub const fn side(&self) -> usize {
        self.side
    }

    /// Number of cells.
    #[must_use]
    pub const fn cells(&self) -> usize {
        self.cells
    }

    /// Largest value; values run over `1..=max_value`.
    #[must_use]
    #[allow(clippy::cast_possible_truncation)]
    pub const fn max_value(&self) -> u8 {
        // `new` caps the cell count at 31.
        self.cells as u8
    }

    /// Equations in declaration order.
    #[must_use]
    pub fn equations(&self) -> &[Equation] {
        &self.equations
    }

    /// Decision groups in search order.
    #[must_use]
    pub fn groups(&self) -> &[DecisionGroup] {
        &self.groups
    }

    /// The progress probe, if any.
    #[must_use]
    pub const fn progress(&self) -> Option<&ProgressProbe> {
        self.progress.as_ref()
    }

    /// Hot-path verifier: `true` if every equation holds for `values`.
    #[must_use]
    pub fn is_solution(&self, values: &[u8], division: Division) -> bool {
        self.equations.iter().all(|eq| eq.holds(values, division))
    }

    /// Evaluates every equation and reports each result.
    #[must_use]
    pub fn check(&self, assignment: &Assignment, division: Division) -> Verdict {
        let checks = self
            .equations
            .iter()
            .map(|eq| EquationCheck {
                name: eq.name(),
                value: eq.evaluate(assignment.values(), division),
                target: eq.target(),
            })
            .collect();
        Verdict { checks }
    }
}

impl Display for Layout {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        for eq in &self.equations {
            writeln!(f, "{:<9} {eq}", eq.name())?;
        }
        for (depth, group) in self.groups.iter().enumerate() {
            let cells = group.binds().iter().map(|c| format!("p{c}")).join(", ");
            writeln!(f, "group {depth}: {} binds {cells}", group.name())?;
        }
        Ok(())
    }
}
