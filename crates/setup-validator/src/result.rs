//! Aggregate pass/fail counters for one validation run.

use crate::case::Verdict;
use serde::Serialize;
use std::ops::AddAssign;
use std::process::ExitCode;

/// Counters for a run or for a single group's contribution to it.
///
/// Fields are private so `total == passed + failed` always holds; values
/// only change through [`record`] and [`merge`].
///
/// [`record`]: RunResult::record
/// [`merge`]: RunResult::merge
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct RunResult {
    total: usize,
    passed: usize,
    failed: usize,
}

impl RunResult {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a result from pass/fail counts; the total is derived.
    #[must_use]
    pub fn from_counts(passed: usize, failed: usize) -> Self {
        Self {
            total: passed + failed,
            passed,
            failed,
        }
    }

    #[must_use]
    pub fn total(&self) -> usize {
        self.total
    }

    #[must_use]
    pub fn passed(&self) -> usize {
        self.passed
    }

    #[must_use]
    pub fn failed(&self) -> usize {
        self.failed
    }

    /// Count one executed case.
    pub fn record(&mut self, verdict: Verdict) {
        self.total += 1;
        match verdict {
            Verdict::Pass => self.passed += 1,
            Verdict::Fail => self.failed += 1,
        }
    }

    /// Fold another result (typically a group delta) into this one.
    pub fn merge(&mut self, other: RunResult) {
        self.total += other.total;
        self.passed += other.passed;
        self.failed += other.failed;
    }

    /// True when no case failed. An empty run is successful.
    #[must_use]
    pub fn is_success(&self) -> bool {
        self.failed == 0
    }

    /// Process exit status for callers such as CI pipelines: 0 iff nothing failed.
    #[must_use]
    pub fn exit_status(&self) -> u8 {
        u8::from(!self.is_success())
    }

    #[must_use]
    pub fn exit_code(&self) -> ExitCode {
        ExitCode::from(self.exit_status())
    }
}

impl AddAssign for RunResult {
    fn add_assign(&mut self, rhs: Self) {
        self.merge(rhs);
    }
}
