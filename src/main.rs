//! depwise - Changelog-aware dependency upgrader CLI tool
//!
//! Checks every dependency in a package.json against the npm registry,
//! classifies each upgrade from its changelog, optionally patches affected
//! source files, and updates the manifest for the approved risk tiers.

use clap::Parser;
use depwise::cli::CliArgs;
use depwise::config::Config;
use depwise::error::AppError;
use depwise::orchestrator::{Collaborators, Orchestrator};
use depwise::output::{create_formatter, OutputConfig};
use depwise::progress::LogWriter;
use std::io::{self, Write};
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

/// Exit status when interrupted before a report could be produced
const EXIT_INTERRUPTED: u8 = 130;

#[tokio::main]
async fn main() -> ExitCode {
    let args = CliArgs::parse();
    init_tracing(&args);

    // Credentials are validated before the manifest is touched
    let config = match Config::from_env(args.model.as_deref()) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Error: {}", e);
            return ExitCode::FAILURE;
        }
    };

    match run(args, config).await {
        Ok(exit_code) => exit_code,
        Err(e) => {
            eprintln!("Error: {:#}", e);
            ExitCode::FAILURE
        }
    }
}

/// Install the stderr tracing subscriber; `RUST_LOG` overrides the CLI level
fn init_tracing(args: &CliArgs) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("depwise={}", args.log_level())));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(LogWriter::default)
        .with_target(false)
        .without_time()
        .init();
}

/// Main application logic
async fn run(args: CliArgs, config: Config) -> anyhow::Result<ExitCode> {
    if args.verbose {
        eprintln!("depwise v{}", env!("CARGO_PKG_VERSION"));
        eprintln!("Manifest: {}", args.manifest.display());
        eprintln!("Model: {}", config.llm.model);
        if args.dry_run {
            eprintln!("Mode: dry-run");
        }
    }

    let collaborators = Collaborators::from_config(&config, args.interactive())?;
    let output_config = OutputConfig::from_cli(args.json, args.verbose, args.quiet);
    let json = args.json;
    let orchestrator = Orchestrator::new(args, collaborators);

    // Previews and diffs go to stderr when stdout carries JSON
    let result = if json {
        orchestrator.run(&mut io::stderr()).await
    } else {
        orchestrator.run(&mut io::stdout()).await
    };

    let report = match result {
        Ok(report) => report,
        Err(AppError::Interrupted) => {
            eprintln!("\nInterrupted.");
            return Ok(ExitCode::from(EXIT_INTERRUPTED));
        }
        Err(e) => {
            eprintln!("Error: {}", e);
            return Ok(ExitCode::FAILURE);
        }
    };

    let formatter = create_formatter(output_config);
    let mut stdout = io::stdout().lock();
    formatter.format(&report, &mut stdout)?;
    stdout.flush()?;

    Ok(ExitCode::SUCCESS)
}
