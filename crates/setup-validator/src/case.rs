//! Test case model.
//!
//! A `TestCase` pairs an opaque [`Predicate`] with the outcome its author
//! expects. Comparing the two produces a [`Verdict`]. An expected failure that
//! really fails is a pass: several cluster checks assert that something is
//! *denied* (anonymous access, for example) and rely on this inversion.

use crate::errors::{Result, ValidatorError};
use crate::predicate::Predicate;
use serde::{Deserialize, Serialize};
use std::fmt;

/// What a predicate observed when it was invoked.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Outcome {
    Success,
    Failure,
}

impl Outcome {
    /// Map a boolean signal onto an outcome.
    #[must_use]
    pub fn from_bool(ok: bool) -> Self {
        if ok {
            Outcome::Success
        } else {
            Outcome::Failure
        }
    }
}

/// The outcome a test author asserts should occur.
///
/// Deserializes from the `"success"` / `"failure"` literals used by the
/// shell-based check definitions.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Expectation {
    #[default]
    Success,
    Failure,
}

impl Expectation {
    /// Whether the observed outcome is the one that was asserted.
    #[must_use]
    pub fn matches(self, observed: Outcome) -> bool {
        matches!(
            (self, observed),
            (Expectation::Success, Outcome::Success) | (Expectation::Failure, Outcome::Failure)
        )
    }
}

/// Result of comparing an observed outcome against the expectation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Verdict {
    Pass,
    Fail,
}

impl Verdict {
    #[must_use]
    pub fn judge(expected: Expectation, observed: Outcome) -> Self {
        if expected.matches(observed) {
            Verdict::Pass
        } else {
            Verdict::Fail
        }
    }
}

impl fmt::Display for Verdict {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Verdict::Pass => write!(f, "PASS"),
            Verdict::Fail => write!(f, "FAIL"),
        }
    }
}

/// A single named check.
///
/// Immutable once constructed; the runner only borrows it.
pub struct TestCase {
    name: String,
    predicate: Box<dyn Predicate>,
    expected: Expectation,
}

impl TestCase {
    /// Create a test case.
    ///
    /// # Errors
    ///
    /// Returns `ValidatorError::EmptyCaseName` if `name` is blank.
    pub fn new(
        name: impl Into<String>,
        predicate: impl Predicate + 'static,
        expected: Expectation,
    ) -> Result<Self> {
        let name = name.into();
        if name.trim().is_empty() {
            return Err(ValidatorError::EmptyCaseName);
        }
        Ok(Self {
            name,
            predicate: Box::new(predicate),
            expected,
        })
    }

    /// Shorthand for a case expected to succeed.
    ///
    /// # Errors
    ///
    /// Returns `ValidatorError::EmptyCaseName` if `name` is blank.
    pub fn expect_success(
        name: impl Into<String>,
        predicate: impl Predicate + 'static,
    ) -> Result<Self> {
        Self::new(name, predicate, Expectation::Success)
    }

    /// Shorthand for a case expected to fail.
    ///
    /// # Errors
    ///
    /// Returns `ValidatorError::EmptyCaseName` if `name` is blank.
    pub fn expect_failure(
        name: impl Into<String>,
        predicate: impl Predicate + 'static,
    ) -> Result<Self> {
        Self::new(name, predicate, Expectation::Failure)
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn expected(&self) -> Expectation {
        self.expected
    }

    pub fn predicate(&self) -> &dyn Predicate {
        self.predicate.as_ref()
    }
}

impl fmt::Debug for TestCase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TestCase")
            .field("name", &self.name)
            .field("predicate", &self.predicate.describe())
            .field("expected", &self.expected)
            .finish()
    }
}
