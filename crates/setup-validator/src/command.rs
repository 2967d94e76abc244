//! External command predicates.
//!
//! Every built-in cluster check boils down to "run this CLI and look at the
//! exit status". Commands can be given as a shell string (run through `sh -c`,
//! matching how the setup scripts declare checks) or as an explicit argv.

use crate::case::Outcome;
use crate::errors::{PredicateError, Result, ValidatorError};
use crate::predicate::Predicate;
use serde::{Deserialize, Serialize};
use std::process::Stdio;
use std::time::Duration;
use tokio::process::Command;

/// Maximum number of stderr characters kept in debug logs for a failing command.
const STDERR_LOG_LIMIT: usize = 512;

/// How a command is declared.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum CommandSpec {
    /// Shell command line, run via `sh -c`.
    Shell(String),
    /// Program followed by its arguments, executed directly.
    Argv(Vec<String>),
}

impl CommandSpec {
    /// Reject commands with nothing to run.
    ///
    /// # Errors
    ///
    /// Returns `ValidatorError::EmptyCommand` naming `case`.
    pub fn validate(&self, case: &str) -> Result<()> {
        let empty = match self {
            CommandSpec::Shell(line) => line.trim().is_empty(),
            CommandSpec::Argv(args) => args.first().map_or(true, |p| p.trim().is_empty()),
        };
        if empty {
            return Err(ValidatorError::EmptyCommand {
                case: case.to_string(),
            });
        }
        Ok(())
    }

    /// Name of the program actually spawned.
    pub fn program(&self) -> &str {
        match self {
            CommandSpec::Shell(_) => "sh",
            CommandSpec::Argv(args) => args.first().map_or("", String::as_str),
        }
    }

    fn to_command(&self) -> Command {
        match self {
            CommandSpec::Shell(line) => {
                let mut command = Command::new("sh");
                command.arg("-c").arg(line);
                command
            }
            CommandSpec::Argv(args) => {
                let mut iter = args.iter();
                let mut command = Command::new(iter.next().map_or("", String::as_str));
                command.args(iter);
                command
            }
        }
    }
}

impl std::fmt::Display for CommandSpec {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CommandSpec::Shell(line) => write!(f, "{line}"),
            CommandSpec::Argv(args) => write!(f, "{}", args.join(" ")),
        }
    }
}

/// Runs an external command; exit status 0 is success.
#[derive(Debug, Clone)]
pub struct CommandPredicate {
    spec: CommandSpec,
    timeout: Option<Duration>,
}

impl CommandPredicate {
    pub fn new(spec: CommandSpec) -> Self {
        Self {
            spec,
            timeout: None,
        }
    }

    pub fn shell(line: impl Into<String>) -> Self {
        Self::new(CommandSpec::Shell(line.into()))
    }

    pub fn argv<I, S>(args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::new(CommandSpec::Argv(args.into_iter().map(Into::into).collect()))
    }

    /// Kill the command and report `PredicateError::TimedOut` after `timeout`.
    #[must_use]
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    pub fn spec(&self) -> &CommandSpec {
        &self.spec
    }

    pub fn timeout(&self) -> Option<Duration> {
        self.timeout
    }
}

#[async_trait::async_trait]
impl Predicate for CommandPredicate {
    async fn check(&self) -> std::result::Result<Outcome, PredicateError> {
        let program = self.spec.program().to_string();

        let child = self
            .spec
            .to_command()
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()
            .map_err(|source| PredicateError::Spawn {
                program: program.clone(),
                source,
            })?;

        let output = match self.timeout {
            Some(after) => tokio::time::timeout(after, child.wait_with_output())
                .await
                .map_err(|_| PredicateError::TimedOut {
                    program: program.clone(),
                    after,
                })??,
            None => child.wait_with_output().await?,
        };

        let outcome = Outcome::from_bool(output.status.success());
        if outcome == Outcome::Failure {
            let stderr = String::from_utf8_lossy(&output.stderr);
            let stderr: String = stderr.trim().chars().take(STDERR_LOG_LIMIT).collect();
            tracing::debug!(
                target: "validator.command",
                command = %self.spec,
                status = ?output.status.code(),
                stderr = %stderr,
                "Command exited unsuccessfully"
            );
        }

        Ok(outcome)
    }

    fn describe(&self) -> String {
        self.spec.to_string()
    }
}
