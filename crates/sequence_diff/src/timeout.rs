use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::{Duration, Instant};

/// Polled by the diff algorithms between units of work. Once it reports
/// `false` the computation gives up and returns the trivial result.
pub trait Timeout {
    fn is_valid(&self) -> bool;
}

/// Never expires.
#[derive(Debug, Clone, Copy, Default)]
pub struct InfiniteTimeout;

impl Timeout for InfiniteTimeout {
    fn is_valid(&self) -> bool {
        true
    }
}

/// Expires a fixed duration after creation and stays expired.
#[derive(Debug)]
pub struct DateTimeout {
    /// `None` when the deadline lies beyond what `Instant` can represent.
    deadline: Option<Instant>,
    expired: AtomicBool,
}

impl DateTimeout {
    /// A zero duration is already expired.
    pub fn new(duration: Duration) -> Self {
        Self {
            deadline: Instant::now().checked_add(duration),
            expired: AtomicBool::new(duration.is_zero()),
        }
    }
}

impl Timeout for DateTimeout {
    fn is_valid(&self) -> bool {
        if self.expired.load(Ordering::Relaxed) {
            return false;
        }
        let Some(deadline) = self.deadline else {
            return true;
        };
        if Instant::now() < deadline {
            return true;
        }
        self.expired.store(true, Ordering::Relaxed);
        false
    }
}

/// Expires when any clone of the flag is cancelled, typically from another
/// thread.
#[derive(Debug, Clone, Default)]
pub struct CancellationFlag {
    cancelled: Arc<AtomicBool>,
}

impl CancellationFlag {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::Release);
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::Acquire)
    }
}

impl Timeout for CancellationFlag {
    fn is_valid(&self) -> bool {
        !self.is_cancelled()
    }
}
