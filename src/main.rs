//! # Main — CLI Entry Point
//!
//! Parses flags, initialises logging and hands off to [`cli::run_search`].
//!
//! ## Options
//!
//! - `--file` / `-f`: output file, created or truncated.
//! - `--timeout` / `-t`: run-wide deadline in seconds, measured from process start.
//!   Zero or negative means the deadline has already passed.
//! - `--range` / `-r`: `start:end`, repeatable, at least one.
//! - `--threads`: tokio worker threads (defaults to all logical cores).
//! - `--progress-interval`: seconds between progress lines (0 disables).
//!
//! Logging goes to stderr; `LOG_FORMAT=json` switches to JSON lines and
//! `RUST_LOG` sets the filter (default `info`).

mod cli;

use anyhow::Result;
use clap::Parser;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

use find_primes::deadline::Deadline;

#[global_allocator]
static GLOBAL: mimalloc::MiMalloc = mimalloc::MiMalloc;

#[derive(Parser)]
#[command(
    name = "find_primes",
    about = "Find prime numbers in given ranges",
    long_about = "A console utility to find prime numbers in specified ranges and output them to a file."
)]
struct Cli {
    /// Output file name
    #[arg(short = 'f', long)]
    file: PathBuf,

    /// Timeout in seconds (zero or negative expires immediately)
    #[arg(short = 't', long, allow_negative_numbers = true)]
    timeout: i64,

    /// Number range in format start:end (repeatable)
    #[arg(short = 'r', long = "range", required = true, allow_hyphen_values = true)]
    ranges: Vec<String>,

    /// Number of tokio worker threads (defaults to all logical cores)
    #[arg(long)]
    threads: Option<usize>,

    /// Seconds between progress log lines (0 to disable)
    #[arg(long, default_value_t = 30)]
    progress_interval: u64,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    // Timeout runs from process start, not from runtime construction.
    let deadline = Deadline::after(cli.timeout());

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let log_format = std::env::var("LOG_FORMAT").unwrap_or_default();
    if log_format == "json" {
        tracing_subscriber::fmt()
            .json()
            .with_env_filter(filter)
            .with_writer(std::io::stderr)
            .with_target(false)
            .init();
    } else {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_writer(std::io::stderr)
            .with_target(false)
            .init();
    }

    cli::run_search(&cli, deadline)
}
