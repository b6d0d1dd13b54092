//! # Writer — Single Consumer of the Result Stream
//!
//! The writer is the only task that touches the output file. It creates (or
//! truncates) the file, then writes one decimal line per received prime until
//! the stream closes, the deadline fires, or a write fails.
//!
//! Every line is flushed to the OS before the next value is taken, so a
//! failing write stops the loop at that line as [`WriteError::Write`] and
//! nothing counted as written is left in a userspace buffer.
//!
//! The file is synced on every exit path. A failure there is
//! never dropped: on an otherwise clean run it becomes [`WriteError::Close`],
//! and when another error is already being returned both are kept in
//! [`WriteError::CloseAfter`].

use std::io;
use std::path::{Path, PathBuf};
use std::sync::atomic::Ordering;
use tokio::fs::File;
use tokio::io::AsyncWriteExt;
use tokio::sync::mpsc;
use tracing::debug;

use crate::deadline::{Deadline, DeadlineError};
use crate::progress::Progress;

#[derive(Debug, thiserror::Error)]
pub enum WriteError {
    #[error("error creating output file {}: {source}", .path.display())]
    Create {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("error writing to file: {0}")]
    Write(#[source] io::Error),
    #[error("error closing file: {0}")]
    Close(#[source] io::Error),
    #[error("{cause}; error closing file: {source}")]
    CloseAfter {
        cause: Box<WriteError>,
        #[source]
        source: io::Error,
    },
    #[error(transparent)]
    Interrupted(#[from] DeadlineError),
    #[error("writer task failed: {0}")]
    Panicked(String),
}

impl WriteError {
    /// The deadline error if the writer stopped only because the run was
    /// cancelled or timed out.
    pub fn interruption(&self) -> Option<DeadlineError> {
        match self {
            WriteError::Interrupted(cause) => Some(*cause),
            _ => None,
        }
    }
}

/// Drain `results` into `path`, returning the number of lines written.
pub async fn write_results(
    path: &Path,
    deadline: &Deadline,
    mut results: mpsc::Receiver<i64>,
    progress: &Progress,
) -> Result<u64, WriteError> {
    let file = File::create(path).await.map_err(|source| WriteError::Create {
        path: path.to_path_buf(),
        source,
    })?;
    let mut out = file;

    let drained = drain(&mut out, deadline, &mut results, progress).await;
    let closed = close(out).await;

    match (drained, closed) {
        (Ok(written), Ok(())) => {
            debug!(path = %path.display(), written, "output file closed");
            Ok(written)
        }
        (Ok(_), Err(source)) => Err(WriteError::Close(source)),
        (Err(e), Ok(())) => Err(e),
        (Err(e), Err(source)) => Err(WriteError::CloseAfter {
            cause: Box::new(e),
            source,
        }),
    }
}

async fn drain(
    out: &mut File,
    deadline: &Deadline,
    results: &mut mpsc::Receiver<i64>,
    progress: &Progress,
) -> Result<u64, WriteError> {
    let mut written = 0u64;
    loop {
        tokio::select! {
            cause = deadline.done() => return Err(cause.into()),
            next = results.recv() => {
                let Some(prime) = next else {
                    return Ok(written);
                };
                write_line(out, prime).await.map_err(WriteError::Write)?;
                written += 1;
                progress.written.fetch_add(1, Ordering::Relaxed);
            }
        }
    }
}

// tokio's File hands writes to a blocking thread; the flush waits for that
// write and surfaces its error.
async fn write_line(out: &mut File, prime: i64) -> io::Result<()> {
    out.write_all(format!("{prime}\n").as_bytes()).await?;
    out.flush().await
}

async fn close(mut out: File) -> io::Result<()> {
    out.flush().await?;
    match out.sync_all().await {
        // pipes and character devices cannot be fsynced
        Err(e) if e.kind() == io::ErrorKind::InvalidInput => Ok(()),
        other => other,
    }
}
