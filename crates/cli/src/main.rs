//! cubesolve CLI entry point.
//!
//! This binary is the composition root for the entire system. Responsibilities:
//!
//! 1. **Parse configuration**: load `cubesolve.toml` (or `--config`) and apply
//!    environment overrides.
//! 2. **Wire observability**: configure `tracing-subscriber` with a JSON or
//!    pretty layer on stderr and, when an endpoint is configured, an
//!    OpenTelemetry OTLP exporter. All `tracing` spans and structured events
//!    emitted by every crate in the workspace flow through these layers.
//! 3. **Construct infrastructure**: create the concrete oracles
//!    (`GeminiVisionOracle`, `HttpSolvingOracle` or `CommandSolvingOracle`)
//!    and inject them into the pipeline.
//! 4. **Run the subcommand**: `solve`, `scan`, or `scan-solve`, printing one
//!    JSON document on stdout.

mod commands;
mod config;
mod observability;
mod upload;

use std::process::ExitCode;

use clap::Parser;

use crate::commands::Cli;
use crate::config::CliConfig;

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    let config = match CliConfig::load(cli.config.as_deref()) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Error: {e}");
            return ExitCode::from(2);
        }
    };

    let telemetry = match observability::init(config.log_format, config.otlp_endpoint.as_deref()) {
        Ok(telemetry) => telemetry,
        Err(e) => {
            eprintln!("Error: {e:#}");
            return ExitCode::from(2);
        }
    };

    let status = match commands::run(cli.command, &config).await {
        Ok(status) => status,
        Err(e) => {
            tracing::error!(error = %format!("{e:#}"), "Command failed");
            eprintln!("Error: {e:#}");
            ExitCode::from(2)
        }
    };

    telemetry.shutdown();
    status
}
