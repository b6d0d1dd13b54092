//! # Pipeline — Fan-out, Fan-in and Outcome Resolution
//!
//! One run wires up:
//!
//! | Task | Role |
//! |------|------|
//! | writer | sole consumer of the result stream, owns the output file |
//! | writer supervisor | forwards the writer's result as an error or a completion signal |
//! | range workers | one per input range, producers on the result stream |
//! | worker supervisor | joins all workers, then drops the last sender to close the stream |
//! | progress reporter | optional periodic status line |
//!
//! The run resolves on whichever fires first: the deadline, an error from the
//! writer, or the completion signal. `tokio::select!` picks randomly among
//! branches that are ready at the same time, so a run finishing right at the
//! deadline may report either outcome. Tasks still in flight at resolution are
//! not awaited; cancelling the deadline makes them wind down on their own.

use std::fmt;
use std::path::PathBuf;
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};
use tokio::sync::{mpsc, oneshot};
use tokio::task::JoinSet;
use tracing::{debug, error, info, warn};

use crate::deadline::{Deadline, DeadlineError};
use crate::progress::Progress;
use crate::range::RangeError;
use crate::worker::scan_range;
use crate::writer::{write_results, WriteError};
use crate::RESULT_CAPACITY;

/// Immutable run configuration, built once from the command line.
#[derive(Clone, Debug)]
pub struct SearchConfig {
    pub output: PathBuf,
    pub timeout: Duration,
    pub ranges: Vec<String>,
    /// `None` disables the periodic progress line.
    pub progress_interval: Option<Duration>,
}

/// Terminal classification of a run. Exactly one is produced per run.
#[derive(Debug)]
pub enum Outcome {
    TimedOut,
    Cancelled,
    Failed(WriteError),
    Completed { written: u64 },
}

impl Outcome {
    fn from_deadline(cause: DeadlineError) -> Self {
        match cause {
            DeadlineError::Exceeded => Outcome::TimedOut,
            DeadlineError::Cancelled => Outcome::Cancelled,
        }
    }
}

impl fmt::Display for Outcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Outcome::TimedOut => write!(f, "Operation timed out"),
            Outcome::Cancelled => write!(f, "Operation was cancelled"),
            Outcome::Failed(e) => write!(f, "Error occurred: error writing results: {e}"),
            Outcome::Completed { .. } => write!(f, "All results processed and written"),
        }
    }
}

/// A range that was skipped because its text did not parse.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RangeFailure {
    pub spec: String,
    pub error: RangeError,
}

#[derive(Debug)]
pub struct RunReport {
    pub outcome: Outcome,
    /// Range failures recorded before the run resolved.
    pub range_errors: Vec<RangeFailure>,
    pub elapsed: Duration,
}

/// Run the whole search with a deadline derived from `config.timeout`.
pub async fn run(config: &SearchConfig) -> RunReport {
    run_with_deadline(config, Deadline::after(config.timeout)).await
}

/// Run the whole search against an existing deadline. The caller may hold a
/// clone of `deadline` to cancel the run from outside.
pub async fn run_with_deadline(config: &SearchConfig, deadline: Deadline) -> RunReport {
    let started = Instant::now();
    let progress = Progress::new();
    let range_errors: Arc<Mutex<Vec<RangeFailure>>> = Arc::default();

    let (result_tx, result_rx) = mpsc::channel::<i64>(RESULT_CAPACITY);
    let (error_tx, mut error_rx) = mpsc::channel::<WriteError>(1);
    let (done_tx, done_rx) = oneshot::channel::<u64>();

    let reporter = config
        .progress_interval
        .filter(|every| !every.is_zero())
        .map(|every| progress.start_reporter(every, deadline.clone()));

    // Writer and its supervisor
    let writer = {
        let path = config.output.clone();
        let deadline = deadline.clone();
        let progress = Arc::clone(&progress);
        tokio::spawn(async move { write_results(&path, &deadline, result_rx, &progress).await })
    };
    tokio::spawn(async move {
        match writer.await {
            Ok(Ok(written)) => {
                let _ = done_tx.send(written);
            }
            // The deadline branch reports this one.
            Ok(Err(WriteError::Interrupted(cause))) => {
                debug!(%cause, "writer stopped by deadline");
            }
            Ok(Err(e)) => {
                let _ = error_tx.try_send(e);
            }
            Err(join_err) => {
                let _ = error_tx.try_send(WriteError::Panicked(join_err.to_string()));
            }
        }
    });

    // Range workers and their supervisor
    let mut workers = JoinSet::new();
    for spec in &config.ranges {
        let spec = spec.clone();
        let deadline = deadline.clone();
        let results = result_tx.clone();
        let progress = Arc::clone(&progress);
        let range_errors = Arc::clone(&range_errors);
        workers.spawn(async move {
            if let Err(error) = scan_range(&spec, &deadline, &results, &progress).await {
                warn!(range = %spec, %error, "skipping range");
                if let Ok(mut errors) = range_errors.lock() {
                    errors.push(RangeFailure { spec, error });
                }
            }
        });
    }
    tokio::spawn(async move {
        while let Some(joined) = workers.join_next().await {
            if let Err(e) = joined {
                error!(error = %e, "range worker failed");
            }
        }
        // Last sender: the writer sees end-of-input once this drops.
        drop(result_tx);
        debug!("all range workers finished");
    });

    info!(
        ranges = config.ranges.len(),
        output = %config.output.display(),
        timeout_secs = config.timeout.as_secs(),
        "search running"
    );

    let outcome = tokio::select! {
        cause = deadline.done() => Outcome::from_deadline(cause),
        Some(e) = error_rx.recv() => Outcome::Failed(e),
        Ok(written) = done_rx => Outcome::Completed { written },
    };

    // Release anything still blocked on the deadline.
    deadline.cancel();
    if let Some(handle) = reporter {
        handle.abort();
    }
    progress.print_status();

    let range_errors = range_errors
        .lock()
        .map(|errors| errors.clone())
        .unwrap_or_default();

    RunReport {
        outcome,
        range_errors,
        elapsed: started.elapsed(),
    }
}
