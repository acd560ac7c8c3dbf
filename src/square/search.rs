#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
//! The backtracking enumerator.
//!
//! The search walks the layout's decision groups in order. At each level every
//! tuple of values for the group's cells is tried (first cell outermost, in
//! ascending order), and tuples that repeat a value, clash with an earlier
//! group, or fail the group's predicate are dropped. Once every group is bound
//! the values nobody has taken are permuted over the free cells, and each
//! complete candidate is handed to the verifier.
//!
//! For the shipped puzzle this binds ten cells through five pair groups and
//! permutes the last six values, 720 candidates per surviving binding.

use crate::square::assignment::{Assignment, PartialAssignment, ValueSet};
use crate::square::configs::SearchConfig;
use crate::square::layout::{DecisionGroup, Layout};
use crate::square::progress::Progress;
use crate::square::pruning;
use smallvec::SmallVec;
use std::ops::AddAssign;
use std::time::{Duration, Instant};
use tracing::{debug, trace};

/// Counters collected during a search.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct SearchStats {
    /// Value tuples tried, per decision group.
    pub bindings: Vec<u64>,
    /// Value tuples rejected, per decision group.
    pub rejections: Vec<u64>,
    /// Bindings that survived every group and reached the permutation stage.
    pub completions: u64,
    /// Complete candidates passed to the verifier.
    pub candidates: u64,
    /// Candidates accepted by the verifier.
    pub solutions: usize,
    /// Progress lines logged.
    pub progress_lines: u64,
    /// Wall-clock time of the search.
    pub elapsed: Duration,
}

impl SearchStats {
    /// Zeroed counters for a layout with `groups` decision groups.
    #[must_use]
    pub fn new(groups: usize) -> Self {
        Self {
            bindings: vec![0; groups],
            rejections: vec![0; groups],
            ..Self::default()
        }
    }
}

impl AddAssign<&Self> for SearchStats {
    /// Sums the counters; `elapsed` is left alone since workers overlap.
    fn add_assign(&mut self, other: &Self) {
        if self.bindings.len() < other.bindings.len() {
            self.bindings.resize(other.bindings.len(), 0);
            self.rejections.resize(other.rejections.len(), 0);
        }
        for (mine, theirs) in self.bindings.iter_mut().zip(&other.bindings) {
            *mine += theirs;
        }
        for (mine, theirs) in self.rejections.iter_mut().zip(&other.rejections) {
            *mine += theirs;
        }
        self.completions += other.completions;
        self.candidates += other.candidates;
        self.solutions += other.solutions;
        self.progress_lines += other.progress_lines;
    }
}

/// Solutions in discovery order, with the statistics of the run.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct SearchOutcome {
    /// Every accepted assignment, in the order it was found.
    pub solutions: Vec<Assignment>,
    /// Search counters.
    pub stats: SearchStats,
}

impl SearchOutcome {
    /// Appends another outcome's solutions and adds its counters.
    pub fn absorb(&mut self, other: Self) {
        self.stats += &other.stats;
        self.solutions.extend(other.solutions);
    }
}

/// Every tuple of `width` values in `1..=max`, last position varying fastest.
#[derive(Debug, Clone)]
struct Bindings {
    current: SmallVec<[u8; 3]>,
    max: u8,
    done: bool,
}

impl Bindings {
    fn new(width: usize, max: u8) -> Self {
        Self {
            current: smallvec::smallvec![1; width],
            max,
            done: max == 0,
        }
    }
}

impl Iterator for Bindings {
    type Item = SmallVec<[u8; 3]>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }
        let item = self.current.clone();

        let mut i = self.current.len();
        loop {
            if i == 0 {
                self.done = true;
                break;
            }
            i -= 1;
            if self.current[i] < self.max {
                self.current[i] += 1;
                break;
            }
            self.current[i] = 1;
        }

        Some(item)
    }
}

/// Visits every ordering of `values[k..]`, swapping in place.
fn permute<F: FnMut(&[u8])>(values: &mut [u8], k: usize, visit: &mut F) {
    if k == values.len() {
        visit(values);
        return;
    }
    for i in k..values.len() {
        values.swap(k, i);
        permute(values, k + 1, visit);
        values.swap(k, i);
    }
}

/// One run of the enumerator over a layout.
///
/// A `Search` owns its solution set and counters; nothing is shared with
/// other runs, so independent searches can run on separate threads.
#[derive(Debug)]
pub struct Search<'a> {
    layout: &'a Layout,
    config: &'a SearchConfig,
    stats: SearchStats,
    solutions: Vec<Assignment>,
    progress: Progress<'a>,
}

impl<'a> Search<'a> {
    /// Prepares a search; nothing runs until [`Search::run`].
    #[must_use]
    pub fn new(layout: &'a Layout, config: &'a SearchConfig) -> Self {
        Self {
            layout,
            config,
            stats: SearchStats::new(layout.groups().len()),
            solutions: Vec::new(),
            progress: Progress::new(layout.progress(), config.progress),
        }
    }

    /// Searches the whole space.
    #[must_use]
    pub fn run(self) -> SearchOutcome {
        let partial = PartialAssignment::new(self.layout.cells());
        self.run_from(partial, 0)
    }

    /// Searches below `partial`, starting at decision group `depth`. Groups
    /// before `depth` are assumed to be bound already.
    #[must_use]
    pub fn run_from(mut self, mut partial: PartialAssignment, depth: usize) -> SearchOutcome {
        let start = Instant::now();
        self.descend(&mut partial, depth);
        self.stats.elapsed = start.elapsed();
        self.finish()
    }

    /// Admitted bindings of the first decision group, each as its own partial
    /// assignment. With no groups this is the single empty binding.
    pub fn roots(&mut self) -> Vec<PartialAssignment> {
        let layout = self.layout;
        let mut partial = PartialAssignment::new(layout.cells());
        let Some(group) = layout.groups().first() else {
            return vec![partial];
        };

        let mut roots = Vec::new();
        for values in Bindings::new(group.binds().len(), layout.max_value()) {
            if let Some(previous) = self.try_bind(&mut partial, group, 0, &values) {
                roots.push(partial.clone());
                partial.release(group.binds(), previous);
            }
        }
        roots
    }

    /// Ends the search and hands back what it found.
    #[must_use]
    pub fn finish(mut self) -> SearchOutcome {
        self.stats.solutions = self.solutions.len();
        self.stats.progress_lines = self.progress.lines();

        for (depth, group) in self.layout.groups().iter().enumerate() {
            trace!(
                depth,
                group = group.name(),
                tried = self.stats.bindings[depth],
                rejected = self.stats.rejections[depth],
                "group counters"
            );
        }

        SearchOutcome {
            solutions: self.solutions,
            stats: self.stats,
        }
    }

    fn descend(&mut self, partial: &mut PartialAssignment, depth: usize) {
        let layout = self.layout;
        let Some(group) = layout.groups().get(depth) else {
            self.complete(partial);
            return;
        };

        for values in Bindings::new(group.binds().len(), layout.max_value()) {
            if let Some(previous) = self.try_bind(partial, group, depth, &values) {
                self.progress.observe(partial, self.solutions.len());
                self.descend(partial, depth + 1);
                partial.release(group.binds(), previous);
            }
        }
    }

    /// Binds `values` to the group's cells if they pass the oracle, returning
    /// the value mask to restore on release.
    fn try_bind(
        &mut self,
        partial: &mut PartialAssignment,
        group: &DecisionGroup,
        depth: usize,
        values: &[u8],
    ) -> Option<ValueSet> {
        self.stats.bindings[depth] += 1;

        if pruning::clashes(partial.used(), values) {
            self.stats.rejections[depth] += 1;
            return None;
        }

        let previous = partial.assign(group.binds(), values);
        if group.rejects(partial, self.config.division) {
            partial.release(group.binds(), previous);
            self.stats.rejections[depth] += 1;
            return None;
        }

        Some(previous)
    }

    /// Permutes the untaken values over the free cells and verifies each
    /// resulting candidate.
    fn complete(&mut self, partial: &PartialAssignment) {
        let layout = self.layout;
        let division = self.config.division;
        let free = partial.free_cells();
        let mut remaining = partial.used().complement_within(layout.max_value()).values();
        debug_assert_eq!(free.len(), remaining.len());

        let mut candidate = partial.fill();
        let stats = &mut self.stats;
        let solutions = &mut self.solutions;
        stats.completions += 1;

        permute(&mut remaining, 0, &mut |perm| {
            for (&cell, &value) in free.iter().zip(perm) {
                candidate[cell] = value;
            }
            stats.candidates += 1;

            if layout.is_solution(candidate.values(), division) {
                debug!(solution = %candidate, "found solution");
                solutions.push(candidate.clone());
            }
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::square::expr::{Division, Equation, Op};
    use crate::square::layout::{CELLS, KNOWN_SOLUTION};
    use itertools::Itertools;

    fn never(_: &[u8], _: Division) -> bool {
        false
    }

    fn equal_pair(v: &[u8], _: Division) -> bool {
        v[0] == v[1]
    }

    /// `p0 * p1 + p2 + p3 = 9`: `p2 + p3` lies in 3..=7, so the product in 2..=6.
    fn product_window(v: &[u8], _: Division) -> bool {
        v[0] == v[1] || !(2..=6).contains(&(v[0] * v[1]))
    }

    fn inexact(v: &[u8], division: Division) -> bool {
        division
            .apply(i64::from(v[0]) * i64::from(v[1]), i64::from(v[2]))
            .is_none()
    }

    fn single_equation() -> Layout {
        let eq = Equation::new("row", 0, [(Op::Mul, 1), (Op::Add, 2), (Op::Add, 3)], 9);
        let group = DecisionGroup::new("row", [0, 1], [0, 1], product_window);
        Layout::new(2, 4, vec![eq], vec![group]).unwrap()
    }

    /// `p0 * p1 / p2 + p3 = 7` and `p3 + p4 - p5 = 2` over 1..=6.
    fn two_equations() -> Layout {
        let equations = vec![
            Equation::new("a", 0, [(Op::Mul, 1), (Op::Div, 2), (Op::Add, 3)], 7),
            Equation::new("b", 3, [(Op::Add, 4), (Op::Sub, 5)], 2),
        ];
        let groups = vec![
            DecisionGroup::new("pair", [0, 1], [0, 1], equal_pair),
            DecisionGroup::new("divisor", [2], [0, 1, 2], inexact),
        ];
        Layout::new(3, 6, equations, groups).unwrap()
    }

    fn brute_force(layout: &Layout, division: Division) -> Vec<Assignment> {
        (1..=layout.max_value())
            .permutations(layout.cells())
            .filter(|p| layout.is_solution(p, division))
            .map(Assignment::new)
            .sorted()
            .collect()
    }

    fn sorted(outcome: &SearchOutcome) -> Vec<Assignment> {
        outcome.solutions.iter().cloned().sorted().collect()
    }

    #[test]
    fn test_bindings_nested_order() {
        let all: Vec<Vec<u8>> = Bindings::new(2, 3).map(|b| b.to_vec()).collect();
        assert_eq!(all.len(), 9);
        assert_eq!(all[0], vec![1, 1]);
        assert_eq!(all[1], vec![1, 2]);
        assert_eq!(all[3], vec![2, 1]);
        assert_eq!(all[8], vec![3, 3]);
    }

    #[test]
    fn test_permute_visits_every_ordering_once() {
        let mut values = [1, 2, 3, 4];
        let mut seen = Vec::new();
        permute(&mut values, 0, &mut |p| seen.push(p.to_vec()));
        assert_eq!(seen.len(), 24);
        assert!(seen.iter().all_unique());
        assert_eq!(values, [1, 2, 3, 4]);
    }

    #[test]
    fn test_single_equation_matches_brute_force() {
        let layout = single_equation();
        let config = SearchConfig::default();
        let outcome = Search::new(&layout, &config).run();

        let expected = brute_force(&layout, Division::Truncating);
        assert_eq!(expected.len(), 12);
        assert_eq!(sorted(&outcome), expected);
        assert_eq!(outcome.stats.solutions, 12);
        assert_eq!(outcome.stats.bindings, vec![16]);
    }

    #[test]
    fn test_two_equations_match_brute_force_in_both_modes() {
        let layout = two_equations();
        for (division, count) in [(Division::Truncating, 10), (Division::Exact, 6)] {
            let config = SearchConfig::default().with_division(division);
            let outcome = Search::new(&layout, &config).run();
            let expected = brute_force(&layout, division);
            assert_eq!(expected.len(), count, "{division}");
            assert_eq!(sorted(&outcome), expected, "{division}");
        }
    }

    #[test]
    fn test_no_groups_is_plain_brute_force() {
        let layout = Layout::new(
            2,
            4,
            single_equation().equations().to_vec(),
            vec![],
        )
        .unwrap();
        let config = SearchConfig::default();
        let outcome = Search::new(&layout, &config).run();
        assert_eq!(outcome.stats.completions, 1);
        assert_eq!(outcome.stats.candidates, 24);
        assert_eq!(sorted(&outcome), brute_force(&layout, Division::Truncating));
    }

    #[test]
    fn test_solutions_are_permutations() {
        let layout = two_equations();
        let config = SearchConfig::default();
        let outcome = Search::new(&layout, &config).run();
        assert!(!outcome.solutions.is_empty());
        assert!(outcome.solutions.iter().all(Assignment::is_permutation));
        assert!(outcome.solutions.iter().all_unique());
    }

    #[test]
    fn test_search_is_deterministic() {
        let layout = two_equations();
        let config = SearchConfig::default();
        let first = Search::new(&layout, &config).run();
        let second = Search::new(&layout, &config).run();
        assert_eq!(first.solutions, second.solutions);
        assert_eq!(first.stats.candidates, second.stats.candidates);
    }

    #[test]
    fn test_roots_then_run_from_matches_run() {
        let layout = two_equations();
        let config = SearchConfig::default();
        let whole = Search::new(&layout, &config).run();

        let mut head = Search::new(&layout, &config);
        let roots = head.roots();
        let mut merged = head.finish();
        for root in roots {
            merged.absorb(Search::new(&layout, &config).run_from(root, 1));
        }
        assert_eq!(merged.solutions, whole.solutions);
        assert_eq!(merged.stats.candidates, whole.stats.candidates);
        assert_eq!(merged.stats.bindings, whole.stats.bindings);
    }

    #[test]
    fn test_duplicate_values_never_reach_completion() {
        let eq = Equation::new("sum", 0, [(Op::Add, 1)], 3);
        let group = DecisionGroup::new("pair", [0, 1], [0, 1], never);
        let layout = Layout::new(2, 4, vec![eq], vec![group]).unwrap();
        let config = SearchConfig::default();
        let outcome = Search::new(&layout, &config).run();
        // 16 tuples, 4 of them repeat a value
        assert_eq!(outcome.stats.rejections, vec![4]);
        assert_eq!(outcome.stats.completions, 12);
        assert!(outcome.solutions.iter().all(Assignment::is_permutation));
    }

    #[test]
    fn test_known_binding_completes_to_known_solution() {
        let layout = Layout::bletchley();
        let config = SearchConfig::default().with_progress(false);

        let mut partial = PartialAssignment::new(CELLS);
        for group in layout.groups() {
            let values: Vec<u8> = group.binds().iter().map(|&c| KNOWN_SOLUTION[c]).collect();
            assert!(!pruning::clashes(partial.used(), &values), "{}", group.name());
            partial.assign(group.binds(), &values);
            assert!(!group.rejects(&partial, config.division), "{}", group.name());
        }

        let outcome = Search::new(&layout, &config).run_from(partial, layout.groups().len());
        assert_eq!(outcome.stats.candidates, 720);
        assert_eq!(outcome.solutions, vec![Assignment::from(KNOWN_SOLUTION)]);
    }

    #[test]
    fn test_fixed_outer_pair_finds_known_solution() {
        // Pin (p2, p3) = (16, 5) and search the rest of the space.
        let layout = Layout::bletchley();
        let config = SearchConfig::default().with_progress(false);
        let mut partial = PartialAssignment::new(CELLS);
        partial.assign(&[2, 3], &[16, 5]);

        let outcome = Search::new(&layout, &config).run_from(partial, 1);
        assert_eq!(outcome.stats.completions, 11_640);
        assert_eq!(outcome.solutions, vec![Assignment::from(KNOWN_SOLUTION)]);
    }

    #[test]
    #[ignore = "walks the full space, roughly 3e8 candidates"]
    fn test_full_search_reports_known_solution() {
        let layout = Layout::bletchley();
        let config = SearchConfig::default().with_progress(false);
        let outcome = Search::new(&layout, &config).run();
        assert_eq!(outcome.stats.completions, 421_080);
        assert_eq!(outcome.solutions, vec![Assignment::from(KNOWN_SOLUTION)]);
    }
}
