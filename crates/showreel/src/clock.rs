//! Clocks for timed pauses
//!
//! Every suspension point of a cycle goes through a [`Clock`]. The
//! [`TokioClock`] really sleeps; the [`FakeClock`] advances virtual time
//! instantly and yields to the runtime, so whole cycles replay in
//! microseconds while still interleaving with other tasks.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

/// Which kind of clock is driving the demo
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ClockKind {
    /// Wall-clock sleeps via tokio
    Real,
    /// Virtual time, advanced by each sleep
    Virtual,
}

/// Source of timed pauses
#[async_trait]
pub trait Clock: Send + Sync + std::fmt::Debug {
    /// Suspend the current task for `duration`
    async fn sleep(&self, duration: Duration);

    /// Time elapsed since the clock was created
    fn elapsed(&self) -> Duration;

    /// Which kind of clock this is
    fn kind(&self) -> ClockKind;

    /// Suspend for a number of milliseconds
    async fn sleep_ms(&self, ms: u64) {
        self.sleep(Duration::from_millis(ms)).await;
    }
}

/// Thread-safe clock handle
pub type SharedClock = Arc<dyn Clock>;

/// Clock backed by `tokio::time::sleep`
#[derive(Debug, Clone)]
pub struct TokioClock {
    started: Instant,
}

impl TokioClock {
    /// Create a new real clock
    #[must_use]
    pub fn new() -> Self {
        Self {
            started: Instant::now(),
        }
    }

    /// Create a shared handle
    #[must_use]
    pub fn shared() -> SharedClock {
        Arc::new(Self::new())
    }
}

impl Default for TokioClock {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Clock for TokioClock {
    async fn sleep(&self, duration: Duration) {
        if !duration.is_zero() {
            tokio::time::sleep(duration).await;
        }
    }

    fn elapsed(&self) -> Duration {
        self.started.elapsed()
    }

    fn kind(&self) -> ClockKind {
        ClockKind::Real
    }
}

/// Virtual clock for deterministic tests
///
/// Sleeping fast-forwards the virtual time and yields once, so concurrent
/// tasks still observe each other at every pause.
#[derive(Debug, Default)]
pub struct FakeClock {
    /// Virtual time in milliseconds since creation
    current_ms: AtomicU64,
    /// Number of sleeps taken
    sleeps: AtomicU64,
}

impl FakeClock {
    /// Create a new fake clock at time zero
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a shared fake clock
    #[must_use]
    pub fn shared() -> Arc<Self> {
        Arc::new(Self::new())
    }

    /// Current virtual time in milliseconds
    #[must_use]
    pub fn now_ms(&self) -> u64 {
        self.current_ms.load(Ordering::SeqCst)
    }

    /// Number of sleeps taken so far
    #[must_use]
    pub fn sleep_count(&self) -> u64 {
        self.sleeps.load(Ordering::SeqCst)
    }

    /// Fast-forward virtual time by duration
    pub fn fast_forward(&self, duration: Duration) {
        self.current_ms
            .fetch_add(duration.as_millis() as u64, Ordering::SeqCst);
    }

    /// Fast-forward virtual time by milliseconds
    pub fn fast_forward_ms(&self, ms: u64) {
        self.fast_forward(Duration::from_millis(ms));
    }
}

#[async_trait]
impl Clock for FakeClock {
    async fn sleep(&self, duration: Duration) {
        self.fast_forward(duration);
        self.sleeps.fetch_add(1, Ordering::SeqCst);
        tokio::task::yield_now().await;
    }

    fn elapsed(&self) -> Duration {
        Duration::from_millis(self.now_ms())
    }

    fn kind(&self) -> ClockKind {
        ClockKind::Virtual
    }
}
