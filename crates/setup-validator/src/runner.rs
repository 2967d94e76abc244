//! Sequential test runner.
//!
//! Cases run one at a time in registration order. Each predicate is invoked
//! exactly once; execution errors and panics count as an observed failure and
//! the run always continues to the end of the registry.

use crate::case::{Outcome, TestCase, Verdict};
use crate::registry::{Registry, TestGroup};
use crate::reporter::{CaseReport, Reporter};
use crate::result::RunResult;
use futures::FutureExt;
use std::panic::AssertUnwindSafe;
use tokio::time::Instant;
use tracing::{debug, info, warn};

/// Drives a registry through a [`Reporter`].
///
/// The accumulator lives in the runner rather than in any global state and is
/// reset at the start of every [`run`](Runner::run).
pub struct Runner<R: Reporter> {
    reporter: R,
    totals: RunResult,
}

impl<R: Reporter> Runner<R> {
    pub fn new(reporter: R) -> Self {
        Self {
            reporter,
            totals: RunResult::default(),
        }
    }

    /// Run every group in order and emit the summary.
    pub async fn run(&mut self, registry: &Registry) -> RunResult {
        self.totals = RunResult::default();

        if registry.is_empty() {
            warn!(
                target: "validator.runner",
                groups = registry.groups().len(),
                "No test cases registered; run is trivially successful"
            );
        }

        for group in registry.groups() {
            let delta = self.run_group(group).await;
            self.totals += delta;
        }

        info!(
            target: "validator.runner",
            total = self.totals.total(),
            passed = self.totals.passed(),
            failed = self.totals.failed(),
            "Validation run finished"
        );
        self.reporter.run_finished(&self.totals);

        self.totals
    }

    /// Run one group and return its contribution to the totals.
    ///
    /// Does not touch the runner's accumulator; [`run`](Runner::run) folds the
    /// returned delta.
    pub async fn run_group(&mut self, group: &TestGroup) -> RunResult {
        let mut delta = RunResult::default();
        self.reporter.group_started(group.label());

        for case in group.cases() {
            let report = execute(group.label(), case).await;
            delta.record(report.verdict);
            self.reporter.case_finished(&report);
        }

        delta
    }

    /// Totals of the most recent run.
    pub fn totals(&self) -> RunResult {
        self.totals
    }

    pub fn reporter(&self) -> &R {
        &self.reporter
    }

    pub fn into_reporter(self) -> R {
        self.reporter
    }
}

async fn execute(group: &str, case: &TestCase) -> CaseReport {
    let started = Instant::now();

    let observed = match AssertUnwindSafe(case.predicate().check())
        .catch_unwind()
        .await
    {
        Ok(Ok(outcome)) => outcome,
        Ok(Err(e)) => {
            warn!(
                target: "validator.runner",
                group = %group,
                case = %case.name(),
                error = %e,
                "Predicate failed to execute; treating as failure"
            );
            Outcome::Failure
        }
        Err(payload) => {
            warn!(
                target: "validator.runner",
                group = %group,
                case = %case.name(),
                panic = panic_message(payload.as_ref()),
                "Predicate panicked; treating as failure"
            );
            Outcome::Failure
        }
    };

    let verdict = Verdict::judge(case.expected(), observed);
    let elapsed = started.elapsed();

    debug!(
        target: "validator.runner",
        group = %group,
        case = %case.name(),
        expected = ?case.expected(),
        observed = ?observed,
        verdict = %verdict,
        elapsed_ms = u64::try_from(elapsed.as_millis()).unwrap_or(u64::MAX),
        "Test case finished"
    );

    CaseReport {
        group: group.to_string(),
        name: case.name().to_string(),
        expected: case.expected(),
        observed,
        verdict,
        elapsed,
    }
}

fn panic_message(payload: &(dyn std::any::Any + Send)) -> &str {
    payload
        .downcast_ref::<&str>()
        .copied()
        .or_else(|| payload.downcast_ref::<String>().map(String::as_str))
        .unwrap_or("non-string panic payload")
}
