//! # Validator Test Utilities
//!
//! Shared test utilities for the setup validator.
//!
//! This crate provides:
//! - Fake predicates with scripted outcomes and call counting
//! - A recording reporter that keeps every event for assertions
//! - Registry builders for the common test shapes
//!
//! ## Usage
//!
//! ```rust,ignore
//! use validator_test_utils::*;
//!
//! #[tokio::test]
//! async fn test_example() {
//!     let registry = registry_of(vec![group_of("a", &[(true, true), (false, false)])]);
//!     let (result, reporter) = run_recorded(&registry).await;
//!     assert_eq!(result.total(), 2);
//!     assert_eq!(reporter.lines().len(), 2);
//! }
//! ```

pub mod fake_predicate;
pub mod recording_reporter;

// Re-export commonly used items
pub use fake_predicate::{FakePredicate, Step};
pub use recording_reporter::{RecordedEvent, RecordingReporter};

use setup_validator::{Registry, RunResult, Runner, TestCase, TestGroup};

/// Build a test case from `(predicate_succeeds, expect_success)`.
pub fn case_of(name: &str, succeeds: bool, expect_success: bool) -> TestCase {
    let predicate = if succeeds {
        FakePredicate::succeeding()
    } else {
        FakePredicate::failing()
    };
    if expect_success {
        TestCase::expect_success(name, predicate).expect("valid test case")
    } else {
        TestCase::expect_failure(name, predicate).expect("valid test case")
    }
}

/// Build a group whose cases are named `<label>-<index>`.
pub fn group_of(label: &str, cases: &[(bool, bool)]) -> TestGroup {
    cases
        .iter()
        .enumerate()
        .fold(TestGroup::new(label), |group, (i, &(succeeds, expect))| {
            group.with_case(case_of(&format!("{label}-{i}"), succeeds, expect))
        })
}

pub fn registry_of(groups: Vec<TestGroup>) -> Registry {
    groups.into_iter().fold(Registry::new(), Registry::with_group)
}

/// Run a registry with a fresh `RecordingReporter`.
pub async fn run_recorded(registry: &Registry) -> (RunResult, RecordingReporter) {
    let mut runner = Runner::new(RecordingReporter::default());
    let result = runner.run(registry).await;
    (result, runner.into_reporter())
}
