#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
//! Periodic progress lines.
//!
//! A line is logged each time the probe's watched cell takes a new value. For
//! the shipped puzzle that is `p12`, the first cell of the second decision
//! group, which gives roughly one line per thousandth of the search. The
//! timestamp comes from the tracing subscriber.

use crate::square::assignment::PartialAssignment;
use crate::square::layout::ProgressProbe;
use smallvec::SmallVec;
use tracing::info;

/// Tracks the last reported value of the watched cell.
#[derive(Debug, Clone)]
pub(crate) struct Progress<'a> {
    probe: Option<&'a ProgressProbe>,
    last: Option<u8>,
    lines: u64,
}

impl<'a> Progress<'a> {
    pub(crate) const fn new(probe: Option<&'a ProgressProbe>, enabled: bool) -> Self {
        Self {
            probe: if enabled { probe } else { None },
            last: None,
            lines: 0,
        }
    }

    /// Logs a line if the watched cell changed since the last call.
    pub(crate) fn observe(&mut self, partial: &PartialAssignment, found: usize) {
        let Some(probe) = self.probe else {
            return;
        };

        let current = partial.get(probe.watch);
        if current.is_none() || current == self.last {
            return;
        }
        self.last = current;
        self.lines += 1;

        let combination: SmallVec<[u8; 4]> = probe
            .report
            .iter()
            .filter_map(|&cell| partial.get(cell))
            .collect();
        info!(
            combination = ?combination.as_slice(),
            solutions = found,
            "last checked combination"
        );
    }

    pub(crate) const fn lines(&self) -> u64 {
        self.lines
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn probe() -> ProgressProbe {
        ProgressProbe {
            watch: 2,
            report: smallvec::smallvec![0, 2],
        }
    }

    #[test]
    fn test_reports_only_on_change() {
        let probe = probe();
        let mut progress = Progress::new(Some(&probe), true);
        let mut partial = PartialAssignment::new(4);

        progress.observe(&partial, 0);
        assert_eq!(progress.lines(), 0);

        let saved = partial.assign(&[2], &[3]);
        progress.observe(&partial, 0);
        progress.observe(&partial, 0);
        assert_eq!(progress.lines(), 1);

        partial.release(&[2], saved);
        partial.assign(&[2], &[4]);
        progress.observe(&partial, 1);
        assert_eq!(progress.lines(), 2);
    }

    #[test]
    fn test_disabled_is_silent() {
        let probe = probe();
        let mut progress = Progress::new(Some(&probe), false);
        let mut partial = PartialAssignment::new(4);
        partial.assign(&[2], &[1]);
        progress.observe(&partial, 0);
        assert_eq!(progress.lines(), 0);
    }
}
