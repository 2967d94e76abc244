//! validate-setup
//!
//! Runs the validation suite against the local kind + ArgoCD environment and
//! exits 0 only if every check passed.
//!
//! # Flow
//!
//! 1. Load configuration from environment
//! 2. Initialize tracing (stderr, optional JSON)
//! 3. Build the registry (manifest file or built-in checks)
//! 4. Run every case sequentially, streaming results to stdout
//! 5. Print the summary (and JSON summary if enabled), set the exit code

#![warn(clippy::pedantic)]

use std::process::ExitCode;

use setup_validator::checks::default_registry;
use setup_validator::config::{Config, DEFAULT_LOG_FILTER};
use setup_validator::errors::ValidatorError;
use setup_validator::{ConsoleReporter, Manifest, Registry, Runner, SummaryReporter};
use tracing::{error, info, info_span, Instrument};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use uuid::Uuid;

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    let config = match Config::from_env() {
        Ok(config) => config,
        Err(e) => {
            init_tracing(false);
            error!("Failed to load configuration: {}", e);
            return ExitCode::FAILURE;
        }
    };

    init_tracing(config.log_json);

    info!(
        checks_file = ?config.checks_file,
        cluster_name = %config.checks.cluster_name,
        argocd_namespace = %config.checks.argocd_namespace,
        applications = config.checks.applications.len(),
        command_timeout_seconds = config.checks.command_timeout.as_secs(),
        "Configuration loaded successfully"
    );

    let registry = match build_registry(&config) {
        Ok(registry) => registry,
        Err(e) => {
            error!(error = %e, "Failed to build validation registry");
            return ExitCode::FAILURE;
        }
    };

    let run_id = Uuid::new_v4();
    info!(
        %run_id,
        groups = registry.groups().len(),
        cases = registry.case_count(),
        "Starting validation run"
    );

    let mut runner = Runner::new(SummaryReporter::new(ConsoleReporter::stdout(), run_id));
    let result = runner
        .run(&registry)
        .instrument(info_span!("validation_run", %run_id))
        .await;

    if config.json_summary {
        if let Some(summary) = runner.reporter().summary() {
            match serde_json::to_string(summary) {
                Ok(json) => println!("{json}"),
                Err(e) => error!(error = %e, "Failed to serialize JSON summary"),
            }
        }
    }

    result.exit_code()
}

fn build_registry(config: &Config) -> Result<Registry, ValidatorError> {
    match &config.checks_file {
        Some(path) => {
            info!(path = %path.display(), "Loading checks manifest");
            Manifest::from_path(path)?.into_registry(config.checks.command_timeout)
        }
        None => default_registry(&config.checks),
    }
}

fn init_tracing(json: bool) {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| DEFAULT_LOG_FILTER.into());

    let registry = tracing_subscriber::registry().with(filter);
    if json {
        registry
            .with(
                tracing_subscriber::fmt::layer()
                    .json()
                    .with_writer(std::io::stderr),
            )
            .init();
    } else {
        registry
            .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
            .init();
    }
}
