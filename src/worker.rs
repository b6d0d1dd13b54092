//! # Worker — Scan One Range for Primes
//!
//! Each input range gets its own worker task. The worker parses the range
//! text, walks it in ascending order and sends every prime it finds into the
//! shared result stream. Primes from one worker therefore arrive in ascending
//! order; nothing is guaranteed across workers.
//!
//! The deadline is polled before every primality test, and every send races
//! against [`Deadline::done`], so a worker stuck behind a full stream still
//! exits promptly on timeout. A parse failure affects only this range and is
//! returned to the caller rather than aborting the run.

use std::sync::atomic::Ordering;
use tokio::sync::mpsc;
use tracing::debug;

use crate::deadline::Deadline;
use crate::is_prime;
use crate::progress::Progress;
use crate::range::{Range, RangeError};

/// Values tested between progress flushes and cooperative yields.
const BATCH: u64 = 4096;

/// Summary of one worker's pass over its range.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RangeScan {
    pub range: Range,
    pub tested: u64,
    pub found: u64,
    /// False when the scan stopped early (deadline fired or writer gone).
    pub finished: bool,
}

pub async fn scan_range(
    spec: &str,
    deadline: &Deadline,
    results: &mpsc::Sender<i64>,
    progress: &Progress,
) -> Result<RangeScan, RangeError> {
    let range: Range = spec.parse()?;
    let mut scan = RangeScan {
        range,
        tested: 0,
        found: 0,
        finished: true,
    };
    let mut pending = 0u64;

    for n in range.values() {
        if deadline.is_cancelled() {
            debug!(range = %range, at = n, "range scan interrupted");
            scan.finished = false;
            break;
        }
        scan.tested += 1;
        pending += 1;
        if is_prime(n) {
            let sent = tokio::select! {
                _ = deadline.done() => false,
                sent = results.send(n) => sent.is_ok(),
            };
            if !sent {
                debug!(range = %range, at = n, "result stream unavailable");
                scan.finished = false;
                break;
            }
            scan.found += 1;
            progress.found.fetch_add(1, Ordering::Relaxed);
        }
        if pending == BATCH {
            progress.tested.fetch_add(pending, Ordering::Relaxed);
            pending = 0;
            tokio::task::yield_now().await;
        }
    }
    progress.tested.fetch_add(pending, Ordering::Relaxed);

    debug!(
        range = %range,
        tested = scan.tested,
        found = scan.found,
        finished = scan.finished,
        "range scan done"
    );
    Ok(scan)
}
