//! tvm-fixtures binary
//!
//! Runs fixture files or directories and exits non-zero if any case fails.

mod cli;

use anyhow::{bail, Result};
use cli::Cli;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};
use tvm_fixtures::{FixtureRunner, TestStats};

fn main() -> Result<()> {
    let cli = Cli::parse_args();

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&cli.log_level));

    tracing_subscriber::registry()
        .with(fmt::layer())
        .with(filter)
        .init();

    let runner = FixtureRunner::new(cli.verbose);
    let mut stats = TestStats::new();
    for path in &cli.paths {
        tracing::info!("Running {:?}", path);
        stats.merge(runner.run_path(path)?);
    }

    stats.print_summary();

    if !stats.all_passed() {
        bail!("{} of {} fixtures failed", stats.failed, stats.total);
    }
    Ok(())
}
