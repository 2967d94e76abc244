//! Test registry: ordered groups of test cases.
//!
//! A registry is plain configuration. It can be built in code (see
//! [`checks`](crate::checks)) or loaded from a JSON manifest so CI pipelines
//! can declare extra checks without recompiling.

use crate::case::{Expectation, TestCase};
use crate::command::{CommandPredicate, CommandSpec};
use crate::errors::{Result, ValidatorError};
use crate::eventual::Eventually;
use serde::Deserialize;
use std::path::Path;
use std::time::Duration;

/// A labelled, ordered collection of related test cases.
#[derive(Debug)]
pub struct TestGroup {
    label: String,
    cases: Vec<TestCase>,
}

impl TestGroup {
    pub fn new(label: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            cases: Vec::new(),
        }
    }

    #[must_use]
    pub fn with_case(mut self, case: TestCase) -> Self {
        self.cases.push(case);
        self
    }

    pub fn push(&mut self, case: TestCase) {
        self.cases.push(case);
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    pub fn cases(&self) -> &[TestCase] {
        &self.cases
    }

    pub fn len(&self) -> usize {
        self.cases.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cases.is_empty()
    }
}

/// Ordered collection of groups handed to the runner.
#[derive(Debug, Default)]
pub struct Registry {
    groups: Vec<TestGroup>,
}

impl Registry {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_group(mut self, group: TestGroup) -> Self {
        self.groups.push(group);
        self
    }

    pub fn push(&mut self, group: TestGroup) {
        self.groups.push(group);
    }

    pub fn groups(&self) -> &[TestGroup] {
        &self.groups
    }

    /// Total number of cases across all groups.
    pub fn case_count(&self) -> usize {
        self.groups.iter().map(TestGroup::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.case_count() == 0
    }
}

/// On-disk registry description.
#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Manifest {
    #[serde(default)]
    pub groups: Vec<ManifestGroup>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ManifestGroup {
    pub label: String,
    #[serde(default)]
    pub cases: Vec<ManifestCase>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ManifestCase {
    pub name: String,
    pub command: CommandSpec,
    #[serde(default)]
    pub expect: Expectation,
    /// Per-invocation timeout; falls back to the configured default.
    #[serde(default)]
    pub timeout_seconds: Option<u64>,
    /// Poll the command until it succeeds for up to this many seconds.
    #[serde(default)]
    pub eventually_seconds: Option<u64>,
}

impl Manifest {
    /// Parse a manifest from a JSON string.
    ///
    /// # Errors
    ///
    /// Returns `ValidatorError::ManifestParse` on malformed JSON or unknown fields.
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Read and parse a manifest file.
    ///
    /// # Errors
    ///
    /// Returns `ValidatorError::ManifestRead` if the file cannot be read, or
    /// `ValidatorError::ManifestParse` if it is not a valid manifest.
    pub fn from_path(path: &Path) -> Result<Self> {
        let json = std::fs::read_to_string(path).map_err(|source| ValidatorError::ManifestRead {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json(&json)
    }

    /// Build command-backed test cases from the manifest.
    ///
    /// # Errors
    ///
    /// Returns an error for blank case names or empty commands.
    pub fn into_registry(self, default_timeout: Duration) -> Result<Registry> {
        let mut registry = Registry::new();

        for group in self.groups {
            let mut test_group = TestGroup::new(group.label);

            for case in group.cases {
                case.command.validate(&case.name)?;

                let timeout = case
                    .timeout_seconds
                    .map_or(default_timeout, Duration::from_secs);
                let command = CommandPredicate::new(case.command).with_timeout(timeout);

                let test_case = match case.eventually_seconds {
                    Some(secs) => TestCase::new(
                        case.name,
                        Eventually::new(command, Duration::from_secs(secs)),
                        case.expect,
                    )?,
                    None => TestCase::new(case.name, command, case.expect)?,
                };
                test_group.push(test_case);
            }

            registry.push(test_group);
        }

        Ok(registry)
    }
}
