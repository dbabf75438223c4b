//! lockgraph - Lockfile dependency normalizer CLI tool
//!
//! This tool reads one lockfile and prints its dependencies in one model:
//! - npm (package-lock.json)
//! - Yarn classic and Berry (yarn.lock)
//! - pnpm (pnpm-lock.yaml)
//! - Bundler (Gemfile.lock)
//! - Maven (`mvn dependency:list` output)

use clap::Parser;
use lockgraph::cli::CliArgs;
use lockgraph::output::{create_formatter, OutputConfig};
use lockgraph::scanner::Scanner;
use std::io::{self, IsTerminal, Write};
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

fn main() -> ExitCode {
    let args = CliArgs::parse();
    init_tracing(args.verbose);

    match run(args) {
        Ok(exit_code) => exit_code,
        Err(e) => {
            eprintln!("Error: {}", e);
            ExitCode::FAILURE
        }
    }
}

/// Logs go to stderr; `RUST_LOG` overrides the level picked by `--verbose`
fn init_tracing(verbose: bool) {
    let default_level = if verbose { "debug" } else { "warn" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .with_target(false)
        .init();
}

/// Main application logic
fn run(args: CliArgs) -> anyhow::Result<ExitCode> {
    if args.verbose {
        eprintln!("lockgraph v{}", env!("CARGO_PKG_VERSION"));
        eprintln!("Target: {}", args.path.display());
    }

    let scanner = Scanner::new(args.lockfile_options()).with_kind(args.lockfile);
    let result = scanner.scan(&args.path)?;

    if result.dependencies.is_empty() && !args.transitive && result.manifest.is_none() {
        eprintln!(
            "No direct dependencies found in {}; use --transitive to list every resolved package",
            result.lockfile.path.display()
        );
    }

    let color = io::stdout().is_terminal();
    let output_config = OutputConfig::from_cli(args.json, args.verbose).with_color(color);
    let formatter = create_formatter(output_config);

    let mut stdout = io::stdout().lock();
    formatter.format(&result, &mut stdout)?;
    stdout.flush()?;

    Ok(ExitCode::SUCCESS)
}
