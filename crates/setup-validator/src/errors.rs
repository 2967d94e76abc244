//! Setup validator error types.
//!
//! Two families are kept apart on purpose: `ValidatorError` covers problems
//! building a registry (before anything runs), `PredicateError` covers a single
//! check failing to execute. The runner never surfaces a `PredicateError` to the
//! caller; it records it as an observed failure and moves on.

use std::io;
use std::path::PathBuf;
use std::time::Duration;
use thiserror::Error;

/// Errors raised while assembling a validation registry.
#[derive(Debug, Error)]
pub enum ValidatorError {
    /// A test case was given an empty or whitespace-only name.
    #[error("Test case name must not be empty")]
    EmptyCaseName,

    /// A command check was declared without a program to run.
    #[error("Command for test case '{case}' is empty")]
    EmptyCommand { case: String },

    /// The checks manifest could not be read.
    #[error("Failed to read checks manifest {path}: {source}")]
    ManifestRead {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// The checks manifest is not valid JSON or has an unexpected shape.
    #[error("Invalid checks manifest: {0}")]
    ManifestParse(#[from] serde_json::Error),

    /// Configuration value out of range.
    #[error("Configuration error: {0}")]
    Configuration(String),
}

/// Errors raised while executing a single predicate.
#[derive(Debug, Error)]
pub enum PredicateError {
    /// The external program could not be started (e.g. not installed).
    #[error("Failed to spawn '{program}': {source}")]
    Spawn {
        program: String,
        #[source]
        source: io::Error,
    },

    /// The command did not finish within its allotted time.
    #[error("'{program}' timed out after {after:?}")]
    TimedOut { program: String, after: Duration },

    /// Any other I/O failure while waiting on the command.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
}

/// Result type alias using `ValidatorError`
pub type Result<T> = std::result::Result<T, ValidatorError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_command_names_case() {
        let err = ValidatorError::EmptyCommand {
            case: "argocd server ready".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "Command for test case 'argocd server ready' is empty"
        );
    }

    #[test]
    fn test_timed_out_display() {
        let err = PredicateError::TimedOut {
            program: "kubectl".to_string(),
            after: Duration::from_secs(5),
        };
        assert_eq!(err.to_string(), "'kubectl' timed out after 5s");
    }
}
