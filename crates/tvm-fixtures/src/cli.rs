//! CLI argument parsing for tvm-fixtures

use clap::Parser;
use std::path::PathBuf;

/// Run transient storage fixtures
#[derive(Parser, Debug, Clone)]
#[command(name = "tvm-fixtures")]
#[command(about = "Run transient storage JSON fixtures")]
#[command(version)]
pub struct Cli {
    /// Fixture files or directories (searched recursively for .json)
    #[arg(required = true)]
    pub paths: Vec<PathBuf>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, default_value = "info")]
    pub log_level: String,

    /// Log every passing case
    #[arg(short, long)]
    pub verbose: bool,
}

impl Cli {
    /// Parse CLI arguments
    pub fn parse_args() -> Self {
        Self::parse()
    }
}
