//! # Deadline — Shared Cancellation for a Run
//!
//! One [`Deadline`] is created per run and cloned into every worker, the
//! writer and the progress reporter. It fires either when the wall-clock
//! expiry passes or when [`Deadline::cancel`] is called (e.g. on SIGINT),
//! whichever comes first, and remembers which of the two it was.
//!
//! Cancellation is cooperative: loops poll [`Deadline::is_cancelled`] between
//! iterations, and blocking channel operations race against
//! [`Deadline::done`] inside `tokio::select!`.

use std::sync::{Arc, OnceLock};
use std::time::Duration;
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;

const FAR_FUTURE: Duration = Duration::from_secs(86_400 * 365 * 30);

/// Why a deadline fired.
#[derive(Clone, Copy, Debug, PartialEq, Eq, thiserror::Error)]
pub enum DeadlineError {
    #[error("deadline exceeded")]
    Exceeded,
    #[error("operation cancelled")]
    Cancelled,
}

#[derive(Clone, Debug)]
pub struct Deadline {
    inner: Arc<Inner>,
}

#[derive(Debug)]
struct Inner {
    expires_at: Instant,
    token: CancellationToken,
    cause: OnceLock<DeadlineError>,
}

impl Deadline {
    /// Deadline that expires `timeout` from now. A zero timeout is already
    /// expired; a timeout too large to represent is clamped to ~30 years.
    pub fn after(timeout: Duration) -> Self {
        let now = Instant::now();
        let expires_at = now
            .checked_add(timeout)
            .unwrap_or_else(|| now + FAR_FUTURE);
        Self::at(expires_at)
    }

    pub fn at(expires_at: Instant) -> Self {
        Deadline {
            inner: Arc::new(Inner {
                expires_at,
                token: CancellationToken::new(),
                cause: OnceLock::new(),
            }),
        }
    }

    pub fn expires_at(&self) -> Instant {
        self.inner.expires_at
    }

    /// Cancel explicitly. Cancelling after expiry still reports `Exceeded`;
    /// repeated calls keep the first cause.
    pub fn cancel(&self) {
        let expired = Instant::now() >= self.inner.expires_at;
        self.inner.cause.get_or_init(|| {
            if expired {
                DeadlineError::Exceeded
            } else {
                DeadlineError::Cancelled
            }
        });
        self.inner.token.cancel();
    }

    /// The cause, once the deadline has fired.
    pub fn error(&self) -> Option<DeadlineError> {
        if let Some(cause) = self.inner.cause.get() {
            return Some(*cause);
        }
        if Instant::now() >= self.inner.expires_at {
            return Some(*self.inner.cause.get_or_init(|| DeadlineError::Exceeded));
        }
        None
    }

    /// Non-blocking check.
    pub fn is_cancelled(&self) -> bool {
        self.error().is_some()
    }

    /// Resolves once the deadline has fired, yielding the cause.
    pub async fn done(&self) -> DeadlineError {
        tokio::select! {
            _ = self.inner.token.cancelled() => {}
            _ = tokio::time::sleep_until(self.inner.expires_at) => {}
        }
        self.error().unwrap_or(DeadlineError::Exceeded)
    }
}
