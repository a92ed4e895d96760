//! binup - keeps binaries installed with `go install` up to date
//!
//! With no arguments every binary in the Go binary directories is checked
//! against the module proxy and the outdated ones are reinstalled.

use binup::cli::CliArgs;
use binup::config::Config;
use binup::orchestrator::{Orchestrator, EXIT_FAILURE};
use binup::output::{create_formatter, OutputConfig};
use clap::Parser;
use std::io::{self, IsTerminal, Write};
use std::process::ExitCode;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

#[tokio::main]
async fn main() -> ExitCode {
    let args = CliArgs::parse();

    init_tracing(args.verbose, args.quiet);

    // Run the main logic and handle errors
    match run(args).await {
        Ok(exit_code) => exit_code,
        Err(e) => {
            eprintln!("Error: {}", e);
            ExitCode::from(EXIT_FAILURE)
        }
    }
}

/// Initialize tracing on stderr; `RUST_LOG` overrides the flags
fn init_tracing(verbose: bool, quiet: bool) {
    let level = if quiet {
        "error"
    } else if verbose {
        "debug"
    } else {
        "info"
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    tracing_subscriber::registry()
        .with(fmt::layer().with_target(false).with_writer(io::stderr))
        .with(filter)
        .init();
}

/// Main application logic
async fn run(args: CliArgs) -> anyhow::Result<ExitCode> {
    let config = Config::load(&args)?;

    tracing::debug!("binup v{}", env!("CARGO_PKG_VERSION"));
    tracing::debug!("Mode: {}", config.mode);
    tracing::debug!("Proxy: {}", config.proxy);
    if config.targets.is_empty() {
        for dir in &config.bin_dirs {
            tracing::debug!("Binary directory: {}", dir.display());
        }
    }

    let output_config = OutputConfig::from_config(&config).with_color(io::stdout().is_terminal());
    let orchestrator = Orchestrator::new(config)?;
    let result = orchestrator.run().await?;

    // Output results
    let formatter = create_formatter(output_config);
    let mut stdout = io::stdout().lock();
    formatter.format(&result, &mut stdout)?;
    stdout.flush()?;

    Ok(result.process_exit_code())
}
