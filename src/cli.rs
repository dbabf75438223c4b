//! CLI argument parsing module for lockgraph

use crate::lockfile::{LockfileKind, LockfileOptions};
use clap::Parser;
use std::path::PathBuf;

/// Parse a lockfile kind: short name (`npm`, `yarn`, `pnpm`, `bundler`, `maven`) or file name
fn parse_lockfile_kind(s: &str) -> Result<LockfileKind, String> {
    LockfileKind::from_name(s).ok_or_else(|| {
        let known: Vec<&str> = LockfileKind::all().iter().map(|k| k.as_str()).collect();
        format!("unknown lockfile kind: {} (expected one of {})", s, known.join(", "))
    })
}

/// Lockfile dependency normalizer
#[derive(Parser, Debug, Clone)]
#[command(
    name = "lockgraph",
    version,
    about = "Normalizes npm, Yarn, pnpm, Bundler and Maven lockfiles into one dependency list"
)]
pub struct CliArgs {
    /// Project directory or lockfile (default: current directory)
    #[arg(default_value = ".")]
    pub path: PathBuf,

    /// Include transitive dependencies (marked non-direct)
    #[arg(short, long)]
    pub transitive: bool,

    /// Parse as this lockfile kind instead of detecting it by file name
    #[arg(long, value_name = "KIND", value_parser = parse_lockfile_kind)]
    pub lockfile: Option<LockfileKind>,

    /// Output results in JSON format
    #[arg(long)]
    pub json: bool,

    /// Enable verbose output
    #[arg(short, long)]
    pub verbose: bool,
}

impl CliArgs {
    /// Lockfile options selected on the command line
    pub fn lockfile_options(&self) -> LockfileOptions {
        LockfileOptions::new().with_transitive(self.transitive)
    }
}
