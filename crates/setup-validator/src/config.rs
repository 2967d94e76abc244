//! Setup validator configuration.
//!
//! Configuration is loaded from environment variables so the binary can be
//! driven from the Makefile and CI without flags.

use std::collections::HashMap;
use std::env;
use std::path::PathBuf;
use std::time::Duration;
use thiserror::Error;

/// Default kind cluster name created by the setup scripts.
pub const DEFAULT_CLUSTER_NAME: &str = "argocd-poc";

/// Default namespace ArgoCD is installed into.
pub const DEFAULT_ARGOCD_NAMESPACE: &str = "argocd";

/// Default per-command timeout in seconds.
pub const DEFAULT_COMMAND_TIMEOUT_SECONDS: u64 = 60;

/// Default time allowed for an ArgoCD application to report Synced.
pub const DEFAULT_SYNC_TIMEOUT_SECONDS: u64 = 120;

/// Log filter used when `RUST_LOG` is unset.
///
/// Runner, command and reporter events log under `validator.*` targets, not
/// the crate path, so that prefix must be listed on its own.
pub const DEFAULT_LOG_FILTER: &str = "setup_validator=info,validate_setup=info,validator=info";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Invalid configuration value: {0}")]
    InvalidValue(String),
}

/// Inputs for the built-in cluster checks.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChecksConfig {
    /// kind cluster name (kubectl context is `kind-<name>`).
    pub cluster_name: String,

    /// Namespace ArgoCD runs in.
    pub argocd_namespace: String,

    /// ArgoCD `Application` resources expected to exist and be Synced.
    pub applications: Vec<String>,

    /// Timeout applied to every individual command.
    pub command_timeout: Duration,

    /// How long to poll an application for `Synced`.
    pub sync_timeout: Duration,
}

impl Default for ChecksConfig {
    fn default() -> Self {
        Self {
            cluster_name: DEFAULT_CLUSTER_NAME.to_string(),
            argocd_namespace: DEFAULT_ARGOCD_NAMESPACE.to_string(),
            applications: Vec::new(),
            command_timeout: Duration::from_secs(DEFAULT_COMMAND_TIMEOUT_SECONDS),
            sync_timeout: Duration::from_secs(DEFAULT_SYNC_TIMEOUT_SECONDS),
        }
    }
}

/// Setup validator configuration.
#[derive(Debug, Clone)]
pub struct Config {
    /// JSON manifest with checks to run instead of the built-in suite.
    pub checks_file: Option<PathBuf>,

    /// Parameters for the built-in suite.
    pub checks: ChecksConfig,

    /// Print a JSON summary after the console report.
    pub json_summary: bool,

    /// Emit logs as JSON.
    pub log_json: bool,
}

impl Config {
    /// Load configuration from environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_vars(&env::vars().collect())
    }

    /// Load configuration from a `HashMap` (for testing).
    pub fn from_vars(vars: &HashMap<String, String>) -> Result<Self, ConfigError> {
        let checks_file = vars
            .get("VALIDATE_CHECKS_FILE")
            .filter(|s| !s.trim().is_empty())
            .map(PathBuf::from);

        let cluster_name = vars
            .get("VALIDATE_CLUSTER_NAME")
            .cloned()
            .unwrap_or_else(|| DEFAULT_CLUSTER_NAME.to_string());

        let argocd_namespace = vars
            .get("VALIDATE_ARGOCD_NAMESPACE")
            .cloned()
            .unwrap_or_else(|| DEFAULT_ARGOCD_NAMESPACE.to_string());

        let applications = vars
            .get("VALIDATE_APPLICATIONS")
            .map(|s| {
                s.split(',')
                    .map(str::trim)
                    .filter(|app| !app.is_empty())
                    .map(ToString::to_string)
                    .collect()
            })
            .unwrap_or_default();

        let command_timeout_seconds = parse_seconds(
            vars,
            "VALIDATE_COMMAND_TIMEOUT_SECONDS",
            DEFAULT_COMMAND_TIMEOUT_SECONDS,
        )?;

        let sync_timeout_seconds = parse_seconds(
            vars,
            "VALIDATE_SYNC_TIMEOUT_SECONDS",
            DEFAULT_SYNC_TIMEOUT_SECONDS,
        )?;

        let json_summary = parse_bool(vars, "VALIDATE_JSON_SUMMARY")?;
        let log_json = parse_bool(vars, "VALIDATE_LOG_JSON")?;

        Ok(Config {
            checks_file,
            checks: ChecksConfig {
                cluster_name,
                argocd_namespace,
                applications,
                command_timeout: Duration::from_secs(command_timeout_seconds),
                sync_timeout: Duration::from_secs(sync_timeout_seconds),
            },
            json_summary,
            log_json,
        })
    }
}

fn parse_seconds(
    vars: &HashMap<String, String>,
    key: &str,
    default: u64,
) -> Result<u64, ConfigError> {
    let Some(raw) = vars.get(key) else {
        return Ok(default);
    };
    match raw.trim().parse::<u64>() {
        Ok(0) => Err(ConfigError::InvalidValue(format!(
            "{key} must be greater than 0"
        ))),
        Ok(secs) => Ok(secs),
        Err(e) => Err(ConfigError::InvalidValue(format!(
            "{key} must be a number of seconds, got '{raw}': {e}"
        ))),
    }
}

fn parse_bool(vars: &HashMap<String, String>, key: &str) -> Result<bool, ConfigError> {
    match vars.get(key).map(|s| s.trim().to_ascii_lowercase()).as_deref() {
        None | Some("" | "0" | "false" | "no") => Ok(false),
        Some("1" | "true" | "yes") => Ok(true),
        Some(other) => Err(ConfigError::InvalidValue(format!(
            "{key} must be a boolean, got '{other}'"
        ))),
    }
}
