//! Streaming progress and summary output.
//!
//! The console report goes to stdout line by line as cases finish, so someone
//! watching a slow cluster validation sees live progress. Diagnostics go
//! through `tracing` on stderr and never mix with this output.

use crate::case::{Expectation, Outcome, Verdict};
use crate::result::RunResult;
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::io::{self, Write};
use std::time::Duration;
use uuid::Uuid;

/// Everything known about a case once it has run.
#[derive(Debug, Clone)]
pub struct CaseReport {
    pub group: String,
    pub name: String,
    pub expected: Expectation,
    pub observed: Outcome,
    pub verdict: Verdict,
    pub elapsed: Duration,
}

/// Receives run events from the runner.
pub trait Reporter {
    fn group_started(&mut self, label: &str);

    fn case_finished(&mut self, report: &CaseReport);

    fn run_finished(&mut self, result: &RunResult);
}

/// Human-readable reporter.
///
/// ```text
/// == cluster connectivity ==
/// [SUCCESS] kubectl can reach the cluster
/// [ERROR] all nodes are Ready
///
/// Total:  2
/// Passed: 1
/// Failed: 1
/// ```
pub struct ConsoleReporter<W: Write> {
    out: W,
}

impl ConsoleReporter<io::Stdout> {
    pub fn stdout() -> Self {
        Self::new(io::stdout())
    }
}

impl<W: Write> ConsoleReporter<W> {
    pub fn new(out: W) -> Self {
        Self { out }
    }

    pub fn into_inner(self) -> W {
        self.out
    }

    fn emit(&mut self, line: &str) {
        let result = writeln!(self.out, "{line}").and_then(|()| self.out.flush());
        if let Err(e) = result {
            tracing::warn!(target: "validator.reporter", error = %e, "Failed to write report line");
        }
    }
}

impl<W: Write> Reporter for ConsoleReporter<W> {
    fn group_started(&mut self, label: &str) {
        self.emit(&format!("== {label} =="));
    }

    fn case_finished(&mut self, report: &CaseReport) {
        let line = match (report.verdict, report.expected) {
            (Verdict::Pass, Expectation::Failure) => {
                format!("[SUCCESS] {} (expected failure)", report.name)
            }
            (Verdict::Pass, Expectation::Success) => format!("[SUCCESS] {}", report.name),
            (Verdict::Fail, Expectation::Failure) => {
                format!("[ERROR] {} (expected failure, but succeeded)", report.name)
            }
            (Verdict::Fail, Expectation::Success) => format!("[ERROR] {}", report.name),
        };
        self.emit(&line);
    }

    fn run_finished(&mut self, result: &RunResult) {
        self.emit("");
        self.emit(&format!("Total:  {}", result.total()));
        self.emit(&format!("Passed: {}", result.passed()));
        self.emit(&format!("Failed: {}", result.failed()));
    }
}

/// Machine-readable run summary.
#[derive(Debug, Clone, Serialize)]
pub struct JsonSummary {
    pub run_id: Uuid,
    pub finished_at: DateTime<Utc>,
    #[serde(flatten)]
    pub result: RunResult,
    pub failed_cases: Vec<String>,
}

/// Wraps another reporter and collects the data for a [`JsonSummary`].
///
/// The id given to [`new`](SummaryReporter::new) stamps the first run; each
/// later run through the same reporter gets a fresh id.
pub struct SummaryReporter<R> {
    inner: R,
    run_id: Uuid,
    failed_cases: Vec<String>,
    summary: Option<JsonSummary>,
}

impl<R: Reporter> SummaryReporter<R> {
    pub fn new(inner: R, run_id: Uuid) -> Self {
        Self {
            inner,
            run_id,
            failed_cases: Vec::new(),
            summary: None,
        }
    }

    /// Id the next finished run will carry.
    pub fn run_id(&self) -> Uuid {
        self.run_id
    }

    /// Summary of the last finished run, if any.
    pub fn summary(&self) -> Option<&JsonSummary> {
        self.summary.as_ref()
    }

    pub fn into_inner(self) -> R {
        self.inner
    }
}

impl<R: Reporter> Reporter for SummaryReporter<R> {
    fn group_started(&mut self, label: &str) {
        self.inner.group_started(label);
    }

    fn case_finished(&mut self, report: &CaseReport) {
        if report.verdict == Verdict::Fail {
            self.failed_cases
                .push(format!("{}: {}", report.group, report.name));
        }
        self.inner.case_finished(report);
    }

    fn run_finished(&mut self, result: &RunResult) {
        self.inner.run_finished(result);
        self.summary = Some(JsonSummary {
            run_id: self.run_id,
            finished_at: Utc::now(),
            result: *result,
            failed_cases: std::mem::take(&mut self.failed_cases),
        });
        self.run_id = Uuid::new_v4();
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used, clippy::indexing_slicing)]
mod tests {
    use super::*;

    fn report(name: &str, expected: Expectation, observed: Outcome) -> CaseReport {
        CaseReport {
            group: "security".to_string(),
            name: name.to_string(),
            expected,
            observed,
            verdict: Verdict::judge(expected, observed),
            elapsed: Duration::from_millis(3),
        }
    }

    #[test]
    fn test_console_lines() {
        let mut reporter = ConsoleReporter::new(Vec::new());
        reporter.group_started("security");
        reporter.case_finished(&report("secret exists", Expectation::Success, Outcome::Success));
        reporter.case_finished(&report("anonymous denied", Expectation::Failure, Outcome::Failure));
        reporter.case_finished(&report("rbac enabled", Expectation::Success, Outcome::Failure));
        reporter.run_finished(&RunResult::from_counts(2, 1));

        let output = String::from_utf8(reporter.into_inner()).unwrap();
        let lines: Vec<&str> = output.lines().collect();
        assert_eq!(lines[0], "== security ==");
        assert_eq!(lines[1], "[SUCCESS] secret exists");
        assert_eq!(lines[2], "[SUCCESS] anonymous denied (expected failure)");
        assert_eq!(lines[3], "[ERROR] rbac enabled");
        assert!(output.contains("Total:  3"));
        assert!(output.contains("Passed: 2"));
        assert!(output.contains("Failed: 1"));
    }

    #[test]
    fn test_unexpected_success_is_flagged() {
        let mut reporter = ConsoleReporter::new(Vec::new());
        reporter.case_finished(&report("anonymous denied", Expectation::Failure, Outcome::Success));
        let output = String::from_utf8(reporter.into_inner()).unwrap();
        assert_eq!(
            output.trim_end(),
            "[ERROR] anonymous denied (expected failure, but succeeded)"
        );
    }

    #[test]
    fn test_summary_reporter_collects_failures() {
        let run_id = Uuid::new_v4();
        let mut reporter = SummaryReporter::new(ConsoleReporter::new(Vec::new()), run_id);
        reporter.case_finished(&report("ok", Expectation::Success, Outcome::Success));
        reporter.case_finished(&report("broken", Expectation::Success, Outcome::Failure));
        assert!(reporter.summary().is_none());

        reporter.run_finished(&RunResult::from_counts(1, 1));

        let summary = reporter.summary().expect("summary after run");
        assert_eq!(summary.run_id, run_id);
        assert_eq!(summary.failed_cases, vec!["security: broken".to_string()]);

        let json = serde_json::to_value(summary).unwrap();
        assert_eq!(json["total"], 2);
        assert_eq!(json["failed"], 1);
        assert_eq!(json["failed_cases"][0], "security: broken");

        let console = String::from_utf8(reporter.into_inner().into_inner()).unwrap();
        assert!(console.contains("[ERROR] broken"));
    }

    #[test]
    fn test_each_run_gets_its_own_id() {
        let first_id = Uuid::new_v4();
        let mut reporter = SummaryReporter::new(ConsoleReporter::new(Vec::new()), first_id);

        reporter.run_finished(&RunResult::from_counts(1, 0));
        let first = reporter.summary().unwrap().run_id;
        assert_eq!(first, first_id);
        assert_ne!(reporter.run_id(), first_id);

        let upcoming = reporter.run_id();
        reporter.run_finished(&RunResult::from_counts(1, 0));
        let second = reporter.summary().unwrap().run_id;
        assert_eq!(second, upcoming);
        assert_ne!(second, first);
    }
}
