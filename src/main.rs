//! Timeit - time a command repeatedly and report running statistics
//!
//! Entry point for the command line tool.

use anyhow::{Context, Result};
use clap::Parser;
use timeit::cli::Cli;
use timeit::config::TimeitConfig;
use timeit::runner::{self, CommandRunner};
use timeit::Accumulator;
use tracing::{info, warn};

fn main() -> Result<()> {
    // Initialize logging; stdout is reserved for the JSON report
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env().add_directive("timeit=info".parse()?),
        )
        .init();

    let cli = Cli::parse();

    let config = match &cli.config {
        Some(path) => TimeitConfig::load_from(path)
            .with_context(|| format!("loading config {}", path.display()))?,
        None => TimeitConfig::load(),
    };
    let settings = cli.resolve(&config).context("resolving settings")?;
    let runner = CommandRunner::new(&cli.command)?;

    let session = match &cli.state {
        Some(path) => runner::load_state(path)?,
        None => Accumulator::new(),
    }
    .into_shared();
    let mut acc = Accumulator::chained_to(&session).with_export_flags(settings.flags);

    info!(
        program = runner.program(),
        iterations = settings.iterations,
        warmup = settings.warmup,
        timeit_version = timeit::VERSION,
        "Starting"
    );
    runner.warmup(settings.warmup)?;
    let outcome = runner.time_into(&mut acc, settings.iterations);

    // Samples recorded before a failure are kept in the session
    if let Some(path) = &cli.state {
        runner::save_state(path, &session.borrow())?;
    }
    let summary = outcome?;

    let report = if settings.pretty {
        acc.to_json_pretty()?
    } else {
        acc.to_json()?
    };
    println!("{}", report);

    if summary.failures > 0 {
        warn!(
            failures = summary.failures,
            runs = summary.runs,
            "Some runs exited with a non-zero status"
        );
    }
    Ok(())
}
