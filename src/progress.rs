//! # Progress — Atomic Run Counters
//!
//! Counters shared between the range workers, the writer and the background
//! reporter. Workers add to `tested` and `found` in batches, the writer bumps
//! `written` once per line. All updates are relaxed atomics; the reporter
//! only needs an approximate snapshot.
//!
//! ## Background Reporter
//!
//! [`Progress::start_reporter`] spawns a tokio task that logs a status line
//! every interval until the run's [`Deadline`] fires.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::task::JoinHandle;
use tracing::info;

use crate::deadline::Deadline;

#[derive(Debug)]
pub struct Progress {
    pub tested: AtomicU64,
    pub found: AtomicU64,
    pub written: AtomicU64,
    start: Instant,
}

/// Point-in-time copy of the counters.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Snapshot {
    pub tested: u64,
    pub found: u64,
    pub written: u64,
}

impl Progress {
    pub fn new() -> Arc<Self> {
        Arc::new(Progress {
            tested: AtomicU64::new(0),
            found: AtomicU64::new(0),
            written: AtomicU64::new(0),
            start: Instant::now(),
        })
    }

    pub fn snapshot(&self) -> Snapshot {
        Snapshot {
            tested: self.tested.load(Ordering::Relaxed),
            found: self.found.load(Ordering::Relaxed),
            written: self.written.load(Ordering::Relaxed),
        }
    }

    pub fn start_reporter(self: &Arc<Self>, every: Duration, deadline: Deadline) -> JoinHandle<()> {
        let progress = Arc::clone(self);
        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(every);
            // first tick completes immediately
            ticker.tick().await;
            loop {
                tokio::select! {
                    _ = deadline.done() => break,
                    _ = ticker.tick() => progress.print_status(),
                }
            }
        })
    }

    /// Log one status line. `queued` is primes found but not yet on disk.
    pub fn print_status(&self) {
        let snap = self.snapshot();
        let secs = self.start.elapsed().as_secs_f64();
        info!(
            tested = snap.tested,
            found = snap.found,
            queued = snap.queued(),
            per_sec = snap.rate(secs),
            elapsed = format_args!("{secs:.1}s"),
            "scan status"
        );
    }
}

impl Snapshot {
    pub fn queued(&self) -> u64 {
        self.found.saturating_sub(self.written)
    }

    /// Values tested per second, 0 until a full second has passed.
    pub fn rate(&self, secs: f64) -> u64 {
        if secs < 1.0 {
            return 0;
        }
        (self.tested as f64 / secs) as u64
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::thread;

    #[test]
    fn counters_start_at_zero() {
        let p = Progress::new();
        assert_eq!(
            p.snapshot(),
            Snapshot {
                tested: 0,
                found: 0,
                written: 0
            }
        );
    }

    #[test]
    fn snapshot_reflects_updates() {
        let p = Progress::new();
        p.tested.fetch_add(10, Ordering::Relaxed);
        p.found.fetch_add(4, Ordering::Relaxed);
        p.written.fetch_add(3, Ordering::Relaxed);
        let snap = p.snapshot();
        assert_eq!((snap.tested, snap.found, snap.written), (10, 4, 3));
    }

    /// 8 threads x 1000 increments must land exactly on 8000.
    #[test]
    fn concurrent_increments_are_accurate() {
        let p = Progress::new();
        let threads: Vec<_> = (0..8)
            .map(|_| {
                let p = Arc::clone(&p);
                thread::spawn(move || {
                    for _ in 0..1000 {
                        p.tested.fetch_add(1, Ordering::Relaxed);
                    }
                })
            })
            .collect();
        for t in threads {
            t.join().unwrap();
        }
        assert_eq!(p.tested.load(Ordering::Relaxed), 8000);
    }

    #[test]
    fn queued_is_found_minus_written() {
        let snap = Snapshot {
            tested: 100,
            found: 25,
            written: 20,
        };
        assert_eq!(snap.queued(), 5);
        // written can briefly lead found between the two relaxed loads
        let skewed = Snapshot { written: 30, ..snap };
        assert_eq!(skewed.queued(), 0);
    }

    #[test]
    fn rate_waits_for_a_full_second() {
        let snap = Snapshot {
            tested: 5_000,
            found: 0,
            written: 0,
        };
        assert_eq!(snap.rate(0.0), 0);
        assert_eq!(snap.rate(0.5), 0);
        assert_eq!(snap.rate(2.0), 2_500);
    }

    #[test]
    fn print_status_with_zero_elapsed_does_not_panic() {
        let p = Progress::new();
        p.print_status();
    }

    #[tokio::test(start_paused = true)]
    async fn reporter_stops_when_deadline_fires() {
        let p = Progress::new();
        let deadline = Deadline::after(Duration::from_secs(95));
        let handle = p.start_reporter(Duration::from_secs(30), deadline.clone());
        handle.await.unwrap();
        assert!(deadline.is_cancelled());
    }

    #[tokio::test(start_paused = true)]
    async fn reporter_stops_on_explicit_cancel() {
        let p = Progress::new();
        let deadline = Deadline::after(Duration::from_secs(3600));
        let handle = p.start_reporter(Duration::from_secs(1), deadline.clone());
        tokio::time::sleep(Duration::from_secs(5)).await;
        deadline.cancel();
        handle.await.unwrap();
    }
}
