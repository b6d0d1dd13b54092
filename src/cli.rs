//! # CLI Execution
//!
//! Kept out of `main.rs` so the entry point stays small: builds the
//! [`SearchConfig`], the tokio runtime and the signal handler, runs the
//! pipeline and prints the outcome line.

use anyhow::Result;
use find_primes::deadline::Deadline;
use find_primes::pipeline::{self, SearchConfig};
use std::time::Duration;
use tracing::{info, warn};

use super::Cli;

impl Cli {
    /// `--timeout` as a duration; negative values clamp to zero.
    pub(crate) fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout.max(0) as u64)
    }

    fn search_config(&self) -> SearchConfig {
        SearchConfig {
            output: self.file.clone(),
            timeout: self.timeout(),
            ranges: self.ranges.clone(),
            progress_interval: Some(Duration::from_secs(self.progress_interval)),
        }
    }
}

/// Run the search and print exactly one outcome line on stdout. Every
/// outcome, including timeout and write failure, exits with status 0.
pub fn run_search(cli: &Cli, deadline: Deadline) -> Result<()> {
    let config = cli.search_config();
    let rt = build_runtime(cli.threads)?;

    let report = rt.block_on(async {
        tokio::spawn(cancel_on_signal(deadline.clone()));
        pipeline::run_with_deadline(&config, deadline).await
    });

    if !report.range_errors.is_empty() {
        warn!(
            skipped = report.range_errors.len(),
            total = config.ranges.len(),
            "some ranges were skipped"
        );
    }
    info!(
        elapsed = format_args!("{:.3}s", report.elapsed.as_secs_f64()),
        "search finished"
    );
    println!("{}", report.outcome);

    // Workers still in flight are not waited for.
    rt.shutdown_background();
    Ok(())
}

fn build_runtime(threads: Option<usize>) -> Result<tokio::runtime::Runtime> {
    let mut builder = tokio::runtime::Builder::new_multi_thread();
    builder.enable_all();
    if let Some(n) = threads.filter(|&n| n > 0) {
        builder.worker_threads(n);
    }
    Ok(builder.build()?)
}

/// SIGINT/SIGTERM cancel the run explicitly, which resolves as `Cancelled`.
async fn cancel_on_signal(deadline: Deadline) {
    let ctrl_c = tokio::signal::ctrl_c();
    #[cfg(unix)]
    {
        let mut sigterm =
            match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
                Ok(s) => s,
                Err(e) => {
                    warn!(error = %e, "failed to install SIGTERM handler");
                    let _ = ctrl_c.await;
                    info!("received SIGINT, cancelling");
                    deadline.cancel();
                    return;
                }
            };
        tokio::select! {
            _ = ctrl_c => info!("received SIGINT, cancelling"),
            _ = sigterm.recv() => info!("received SIGTERM, cancelling"),
            _ = deadline.done() => return,
        }
    }
    #[cfg(not(unix))]
    {
        tokio::select! {
            _ = ctrl_c => info!("received SIGINT, cancelling"),
            _ = deadline.done() => return,
        }
    }
    deadline.cancel();
}
