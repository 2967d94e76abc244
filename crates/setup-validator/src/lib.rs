//! Setup Validator
//!
//! Declarative assertion runner used to validate the local kind + ArgoCD
//! environment after the setup scripts have run.
//!
//! A [`Registry`] holds ordered [`TestGroup`]s of [`TestCase`]s. Each case pairs
//! an opaque [`Predicate`] with the outcome its author expects. The [`Runner`]
//! invokes every predicate once, in order, compares observed against expected,
//! streams a line per case to a [`Reporter`] and returns a [`RunResult`]. The
//! process exit status is 0 if and only if nothing failed.
//!
//! # Usage
//!
//! ```bash
//! # Built-in suite against the default cluster
//! validate-setup
//!
//! # Also check that two ArgoCD applications are Synced
//! VALIDATE_APPLICATIONS=guestbook,nginx validate-setup
//!
//! # Custom checks from a manifest, JSON summary for CI
//! VALIDATE_CHECKS_FILE=checks.json VALIDATE_JSON_SUMMARY=true validate-setup
//! ```

#![warn(clippy::pedantic)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::module_name_repetitions)]

pub mod case;
pub mod checks;
pub mod command;
pub mod config;
pub mod errors;
pub mod eventual;
pub mod predicate;
pub mod registry;
pub mod reporter;
pub mod result;
pub mod runner;

pub use case::{Expectation, Outcome, TestCase, Verdict};
pub use command::{CommandPredicate, CommandSpec};
pub use errors::{PredicateError, ValidatorError};
pub use eventual::Eventually;
pub use predicate::{FnPredicate, Predicate};
pub use registry::{Manifest, Registry, TestGroup};
pub use reporter::{CaseReport, ConsoleReporter, JsonSummary, Reporter, SummaryReporter};
pub use result::RunResult;
pub use runner::Runner;
